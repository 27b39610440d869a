//! The conversion pipeline.
//!
//! One [`Detector`] walks the source tree and produces sources; the
//! pipeline sanitizes names, applies the rename table and the default
//! envelopes, then either collects sources for a library, reports them
//! (analyse mode) or hands them to one [`Creator`]. All progress and all
//! errors flow through the [`Notifier`]; no error escapes the pipeline
//! boundary.

pub mod error;
pub mod rename;

pub use error::{PipelineError, PipelineResult};
pub use rename::RenameTable;

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use moss_core::envelope::default_envelope_for_category;
use moss_core::naming::sanitize_filename;
use moss_core::{MultisampleSource, PerformanceSource};
use moss_formats::notify::{
    Notifier, IDS_NOTIFY_CANCELLED, IDS_NOTIFY_COLLECTING, IDS_NOTIFY_ERROR,
    IDS_NOTIFY_NOTHING_DETECTED, IDS_NOTIFY_OK, IDS_NOTIFY_RENAMED,
    IDS_NOTIFY_RENAME_NOT_DEFINED, IDS_NOTIFY_STORING_LIBRARY,
};
use moss_formats::{Creator, Detector, FormatError, SourceConsumers};

/// Flags controlling one conversion run.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Ask the detector for performances in addition to multisamples.
    pub detect_performances: bool,
    /// Collect all sources and bundle them into a library at the end.
    pub wants_multiple_files: bool,
    /// Mirror the source folder structure below the output folder.
    pub create_folder_structure: bool,
    /// Only analyse; do not write any output.
    pub only_analyse: bool,
    /// Library name; when empty, the first source's name is used.
    pub library_name: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            detect_performances: false,
            wants_multiple_files: false,
            create_folder_structure: true,
            only_analyse: false,
            library_name: String::new(),
        }
    }
}

/// Drives one detector/creator pair over a source tree.
pub struct ConversionPipeline {
    detector: Box<dyn Detector>,
    creator: Box<dyn Creator>,
    rename: RenameTable,
    options: ConversionOptions,
}

impl ConversionPipeline {
    /// Creates a pipeline without a rename table.
    pub fn new(
        detector: Box<dyn Detector>,
        creator: Box<dyn Creator>,
        options: ConversionOptions,
    ) -> Self {
        Self {
            detector,
            creator,
            rename: RenameTable::empty(),
            options,
        }
    }

    /// Sets the rename table.
    pub fn with_rename_table(mut self, rename: RenameTable) -> Self {
        self.rename = rename;
        self
    }

    /// Requests cancellation of detector and creator. Detection stops at
    /// the next file boundary; no further output file is started.
    pub fn cancel_execution(&self) {
        self.detector.cancel();
        self.creator.cancel();
    }

    /// Reads the cancellation state.
    pub fn is_cancelled(&self) -> bool {
        self.detector.is_cancelled() || self.creator.is_cancelled()
    }

    /// Runs detection over `source_folder` and conversion into
    /// `out_folder`. Signals `finished` on the notifier exactly once.
    pub fn run(&self, source_folder: &Path, out_folder: &Path, notifier: &dyn Notifier) {
        self.creator.clear_cancelled();
        notifier.update_button_states(false);

        let mut multisample_batch: Vec<MultisampleSource> = Vec::new();
        let mut performance_batch: Vec<PerformanceSource> = Vec::new();
        let detected_any = Cell::new(false);

        {
            let mut on_multisample = |source: MultisampleSource| {
                detected_any.set(true);
                self.process_multisample(source, out_folder, &mut multisample_batch, notifier);
            };
            let mut on_performance = |performance: PerformanceSource| {
                detected_any.set(true);
                self.process_performance(performance, out_folder, &mut performance_batch, notifier);
            };
            let mut consumers = SourceConsumers {
                multisample: &mut on_multisample,
                performance: &mut on_performance,
            };
            self.detector.detect(
                source_folder,
                &mut consumers,
                self.options.detect_performances,
                notifier,
            );
        }

        let cancelled = self.is_cancelled();
        if !cancelled && !self.options.only_analyse {
            self.emit_libraries(out_folder, multisample_batch, performance_batch, notifier);
        }

        if cancelled {
            notifier.log(IDS_NOTIFY_CANCELLED, &[]);
        } else if !detected_any.get() {
            notifier.log_error(IDS_NOTIFY_NOTHING_DETECTED, &[]);
        }
        notifier.update_button_states(true);
        notifier.finished(cancelled);
    }

    fn process_multisample(
        &self,
        mut source: MultisampleSource,
        out_folder: &Path,
        batch: &mut Vec<MultisampleSource>,
        notifier: &dyn Notifier,
    ) {
        if self.is_cancelled() {
            return;
        }
        sanitize_zone_names(&mut source);
        self.apply_rename(&mut source.name, notifier);
        apply_default_envelopes(&mut source);

        if self.options.wants_multiple_files {
            notifier.log(IDS_NOTIFY_COLLECTING, &[&source.name]);
            batch.push(source);
        } else if self.options.only_analyse {
            notifier.log(IDS_NOTIFY_OK, &[&source.name]);
        } else {
            let destination = self.destination_folder(out_folder, &source.sub_path);
            let result = fs::create_dir_all(&destination)
                .map_err(FormatError::from)
                .and_then(|_| self.creator.create_preset(&destination, &source, notifier));
            match result {
                Ok(()) => notifier.log(IDS_NOTIFY_OK, &[&source.name]),
                Err(error) => notifier.log_error_cause(IDS_NOTIFY_ERROR, &error),
            }
        }
    }

    fn process_performance(
        &self,
        mut performance: PerformanceSource,
        out_folder: &Path,
        batch: &mut Vec<PerformanceSource>,
        notifier: &dyn Notifier,
    ) {
        if self.is_cancelled() {
            return;
        }
        for instrument in &mut performance.instruments {
            sanitize_zone_names(&mut instrument.multisample);
            apply_default_envelopes(&mut instrument.multisample);
        }
        self.apply_rename(&mut performance.name, notifier);

        if self.options.wants_multiple_files {
            notifier.log(IDS_NOTIFY_COLLECTING, &[&performance.name]);
            batch.push(performance);
        } else if self.options.only_analyse {
            notifier.log(IDS_NOTIFY_OK, &[&performance.name]);
        } else {
            let destination = self.destination_folder(out_folder, &performance.sub_path);
            let result = fs::create_dir_all(&destination)
                .map_err(FormatError::from)
                .and_then(|_| {
                    self.creator
                        .create_performance(&destination, &performance, notifier)
                });
            match result {
                Ok(()) => notifier.log(IDS_NOTIFY_OK, &[&performance.name]),
                Err(error) => notifier.log_error_cause(IDS_NOTIFY_ERROR, &error),
            }
        }
    }

    fn emit_libraries(
        &self,
        out_folder: &Path,
        multisamples: Vec<MultisampleSource>,
        performances: Vec<PerformanceSource>,
        notifier: &dyn Notifier,
    ) {
        if !multisamples.is_empty() {
            let name = self.library_name(|| multisamples[0].name.clone());
            notifier.log(IDS_NOTIFY_STORING_LIBRARY, &[&name]);
            if let Err(error) =
                self.creator
                    .create_preset_library(out_folder, &multisamples, &name, notifier)
            {
                notifier.log_error_cause(IDS_NOTIFY_ERROR, &error);
            }
        }
        if !performances.is_empty() {
            let name = self.library_name(|| performances[0].name.clone());
            notifier.log(IDS_NOTIFY_STORING_LIBRARY, &[&name]);
            if let Err(error) = self.creator.create_performance_library(
                out_folder,
                &performances,
                &name,
                notifier,
            ) {
                notifier.log_error_cause(IDS_NOTIFY_ERROR, &error);
            }
        }
    }

    fn library_name(&self, fallback: impl FnOnce() -> String) -> String {
        if self.options.library_name.is_empty() {
            fallback()
        } else {
            self.options.library_name.clone()
        }
    }

    fn apply_rename(&self, name: &mut String, notifier: &dyn Notifier) {
        if self.rename.is_empty() {
            return;
        }
        match self.rename.lookup(name) {
            Some(target) => {
                notifier.log(IDS_NOTIFY_RENAMED, &[name, target]);
                *name = target.to_string();
            }
            None => notifier.log(IDS_NOTIFY_RENAME_NOT_DEFINED, &[name]),
        }
    }

    fn destination_folder(&self, out_folder: &Path, sub_path: &[String]) -> PathBuf {
        if !self.options.create_folder_structure {
            return out_folder.to_path_buf();
        }
        let mut destination = out_folder.to_path_buf();
        for segment in sub_path {
            destination.push(sanitize_filename(segment));
        }
        destination
    }
}

fn sanitize_zone_names(source: &mut MultisampleSource) {
    for group in &mut source.groups {
        for zone in &mut group.zones {
            zone.name = sanitize_filename(&zone.name);
        }
    }
}

fn apply_default_envelopes(source: &mut MultisampleSource) {
    let envelope = default_envelope_for_category(&source.metadata.category);
    for group in &mut source.groups {
        for zone in &mut group.zones {
            if !zone.amplitude_envelope.envelope.is_set() {
                zone.amplitude_envelope.envelope = envelope;
            }
        }
    }
}
