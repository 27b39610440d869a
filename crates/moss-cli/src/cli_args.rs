//! CLI argument definitions for convertwithmoss.
//!
//! All `#[derive(Parser)]` types are defined here, keeping `main.rs`
//! focused on wiring the pipeline.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// convertwithmoss - convert multisample presets between formats
#[derive(Parser)]
#[command(name = "convertwithmoss")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Source format prefix (e.g. sfz, korgmultisample)
    #[arg(short = 's', long = "source-format")]
    pub source_format: String,

    /// Destination format prefix
    #[arg(short = 'd', long = "destination-format")]
    pub destination_format: String,

    /// What to convert
    #[arg(short = 't', long = "type", value_enum, default_value_t = ConversionType::Preset)]
    pub conversion_type: ConversionType,

    /// Analyse only; no output is written
    #[arg(short = 'a', long = "analyse")]
    pub analyse: bool,

    /// Flatten: do not mirror the source folder structure
    #[arg(short = 'f', long = "flat")]
    pub flat: bool,

    /// Collect everything into one library with the given name
    #[arg(short = 'l', long = "library")]
    pub library: Option<String>,

    /// Format specific parameters: key1=value1,key2=value2,...
    #[arg(short = 'p', long = "parameters")]
    pub parameters: Option<String>,

    /// CSV rename table with two columns: old name,new name
    #[arg(short = 'r', long = "rename")]
    pub rename: Option<PathBuf>,

    /// With --analyse: print one JSON document per detected source
    #[arg(long)]
    pub json: bool,

    /// The folder to scan for source presets
    pub source_folder: PathBuf,

    /// The folder output is written to
    pub destination_folder: PathBuf,
}

/// Whether presets or performances are converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ConversionType {
    /// Convert single instruments.
    Preset,
    /// Convert performances (multiple instruments on MIDI channels).
    Performance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_minimal_invocation() {
        let cli = Cli::try_parse_from([
            "convertwithmoss",
            "-s",
            "sfz",
            "-d",
            "korgmultisample",
            "/in",
            "/out",
        ])
        .unwrap();
        assert_eq!(cli.source_format, "sfz");
        assert_eq!(cli.destination_format, "korgmultisample");
        assert_eq!(cli.conversion_type, ConversionType::Preset);
        assert!(!cli.analyse);
        assert!(!cli.flat);
        assert!(cli.library.is_none());
        assert!(cli.parameters.is_none());
        assert!(cli.rename.is_none());
        assert_eq!(cli.source_folder, PathBuf::from("/in"));
        assert_eq!(cli.destination_folder, PathBuf::from("/out"));
    }

    #[test]
    fn test_cli_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "convertwithmoss",
            "-s",
            "samplefile",
            "-d",
            "sfz",
            "-t",
            "performance",
            "-a",
            "-f",
            "-l",
            "MyLib",
            "-p",
            "leftChannels=_L,rightChannels=_R",
            "-r",
            "rename.csv",
            "/in",
            "/out",
        ])
        .unwrap();
        assert_eq!(cli.conversion_type, ConversionType::Performance);
        assert!(cli.analyse);
        assert!(cli.flat);
        assert_eq!(cli.library.as_deref(), Some("MyLib"));
        assert_eq!(cli.parameters.as_deref(), Some("leftChannels=_L,rightChannels=_R"));
        assert_eq!(cli.rename.as_deref(), Some(std::path::Path::new("rename.csv")));
    }

    #[test]
    fn test_cli_requires_formats_and_folders() {
        assert!(Cli::try_parse_from(["convertwithmoss", "/in", "/out"]).is_err());
        assert!(Cli::try_parse_from(["convertwithmoss", "-s", "sfz", "-d", "sfz"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_type() {
        let result = Cli::try_parse_from([
            "convertwithmoss",
            "-s",
            "sfz",
            "-d",
            "sfz",
            "-t",
            "bank",
            "/in",
            "/out",
        ]);
        assert!(result.is_err());
    }
}
