//! convertwithmoss - command-line conversion of multisample presets.
//!
//! Maps the format prefixes to plugins, configures the pipeline and
//! drives it to completion. The exit code is always 0; errors and
//! cancellations are reported on standard error.

mod cli_args;
mod console;

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use moss_convert::{ConversionOptions, ConversionPipeline, RenameTable};
use moss_core::{MultisampleSource, PerformanceSource};
use moss_formats::notify::Notifier;
use moss_formats::{Detector, FormatRegistry, SourceConsumers};

use cli_args::{Cli, ConversionType};
use console::ConsoleNotifier;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // Help and version go to stdout, parse errors to stderr;
            // either way the exit code stays 0.
            let _ = error.print();
            return ExitCode::SUCCESS;
        }
    };

    if let Err(error) = run(cli) {
        eprintln!("{}: {error:#}", "error".red());
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<()> {
    let registry = FormatRegistry::standard();
    let available = || registry.prefixes().collect::<Vec<_>>().join(", ");

    let mut detector = registry
        .create_detector(&cli.source_format)
        .with_context(|| {
            format!(
                "unknown source format '{}' (available: {})",
                cli.source_format,
                available()
            )
        })?;
    let mut creator = registry
        .create_creator(&cli.destination_format)
        .with_context(|| {
            format!(
                "unknown destination format '{}' (available: {})",
                cli.destination_format,
                available()
            )
        })?;

    let mut parameters = parse_parameters(cli.parameters.as_deref())?;
    detector.settings_mut().check_settings_cli(&mut parameters)?;
    creator.settings_mut().check_settings_cli(&mut parameters)?;
    for key in parameters.keys() {
        eprintln!("{}: unknown parameter '{key}'", "warning".yellow());
    }

    let rename = match &cli.rename {
        Some(path) => RenameTable::from_csv_file(path)
            .with_context(|| format!("cannot read rename table {}", path.display()))?,
        None => RenameTable::empty(),
    };

    if !cli.source_folder.is_dir() {
        bail!("source folder does not exist: {}", cli.source_folder.display());
    }

    if cli.analyse && cli.json {
        return analyse_json(detector.as_ref(), &cli);
    }

    let options = ConversionOptions {
        detect_performances: cli.conversion_type == ConversionType::Performance,
        wants_multiple_files: cli.library.is_some(),
        create_folder_structure: !cli.flat,
        only_analyse: cli.analyse,
        library_name: cli.library.clone().unwrap_or_default(),
    };
    let pipeline = Arc::new(
        ConversionPipeline::new(detector, creator, options).with_rename_table(rename),
    );
    let notifier = Arc::new(ConsoleNotifier::new());

    // Detection runs on a single worker; this thread blocks on the
    // completion flag signaled through the notifier.
    let worker = {
        let pipeline = pipeline.clone();
        let notifier = notifier.clone();
        let source_folder = cli.source_folder.clone();
        let destination_folder = cli.destination_folder.clone();
        thread::spawn(move || {
            pipeline.run(&source_folder, &destination_folder, notifier.as_ref());
        })
    };
    while !notifier.is_finished() {
        thread::sleep(Duration::from_millis(10));
    }
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("conversion worker panicked"))?;
    Ok(())
}

/// Runs the detector directly and prints one JSON document per source.
fn analyse_json(detector: &dyn Detector, cli: &Cli) -> Result<()> {
    struct ErrorsOnly;
    impl Notifier for ErrorsOnly {
        fn log(&self, _message_id: &str, _params: &[&str]) {}

        fn log_error(&self, message_id: &str, params: &[&str]) {
            eprintln!("{}: {}", "error".red(), console::render(message_id, params));
        }
    }

    let failed = std::cell::Cell::new(false);
    let mut on_multisample = |source: MultisampleSource| {
        match serde_json::to_string(&source) {
            Ok(json) => println!("{json}"),
            Err(_) => failed.set(true),
        }
    };
    let mut on_performance = |performance: PerformanceSource| {
        match serde_json::to_string(&performance) {
            Ok(json) => println!("{json}"),
            Err(_) => failed.set(true),
        }
    };
    let mut consumers = SourceConsumers {
        multisample: &mut on_multisample,
        performance: &mut on_performance,
    };
    detector.detect(
        &cli.source_folder,
        &mut consumers,
        cli.conversion_type == ConversionType::Performance,
        &ErrorsOnly,
    );
    if failed.get() {
        bail!("failed to serialize a detected source");
    }
    Ok(())
}

/// Parses `key1=value1,key2=value2,...` into a map.
///
/// A comma-separated chunk without `=` continues the previous value, so
/// list-valued parameters like `leftChannels=_L,-L` stay intact.
fn parse_parameters(text: Option<&str>) -> Result<HashMap<String, String>> {
    let mut parameters = HashMap::new();
    let Some(text) = text else {
        return Ok(parameters);
    };
    let mut current_key: Option<String> = None;
    for entry in text.split(',').filter(|e| !e.trim().is_empty()) {
        if let Some((key, value)) = entry.split_once('=') {
            let key = key.trim().to_string();
            parameters.insert(key.clone(), value.trim().to_string());
            current_key = Some(key);
        } else {
            let Some(key) = &current_key else {
                bail!("invalid parameter '{entry}', expected key=value");
            };
            let value = parameters.get_mut(key).expect("key was just inserted");
            value.push(',');
            value.push_str(entry.trim());
        }
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameters() {
        let parameters = parse_parameters(Some("a=1,b=two, c = 3 ")).unwrap();
        assert_eq!(parameters.get("a").map(String::as_str), Some("1"));
        assert_eq!(parameters.get("b").map(String::as_str), Some("two"));
        assert_eq!(parameters.get("c").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_parse_parameters_keeps_list_values_together() {
        let parameters =
            parse_parameters(Some("leftChannels=_L,-L,rightChannels=_R,-R")).unwrap();
        assert_eq!(
            parameters.get("leftChannels").map(String::as_str),
            Some("_L,-L")
        );
        assert_eq!(
            parameters.get("rightChannels").map(String::as_str),
            Some("_R,-R")
        );
    }

    #[test]
    fn test_parse_parameters_rejects_missing_value() {
        assert!(parse_parameters(Some("novalue")).is_err());
    }

    #[test]
    fn test_parse_parameters_empty() {
        assert!(parse_parameters(None).unwrap().is_empty());
        assert!(parse_parameters(Some("")).unwrap().is_empty());
    }
}
