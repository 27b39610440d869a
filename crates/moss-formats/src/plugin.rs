//! Detector and creator contracts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use moss_core::naming::sanitize_filename;
use moss_core::{MultisampleSource, PerformanceSource};
use walkdir::WalkDir;

use crate::error::{FormatError, FormatResult};
use crate::notify::{Notifier, IDS_NOTIFY_ERROR, IDS_NOTIFY_SKIPPED};
use crate::settings::Settings;

/// Shared cancellation flag of a plugin.
///
/// Detectors check it between files, creators before starting a new
/// output file; an in-progress write is allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Clears the flag for the next run.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    /// Reads the flag.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The consumers a detector pushes detected sources into, synchronously,
/// in detection order.
pub struct SourceConsumers<'a> {
    /// Receives each detected multisample.
    pub multisample: &'a mut dyn FnMut(MultisampleSource),
    /// Receives each detected performance.
    pub performance: &'a mut dyn FnMut(PerformanceSource),
}

/// Reads instrument sources out of a folder tree.
///
/// Implementations are `Send + Sync` so cancellation can be requested
/// from another thread while a detection runs.
pub trait Detector: Send + Sync {
    /// Display name of the format.
    fn name(&self) -> &'static str;

    /// Lowercase CLI prefix of the format.
    fn prefix(&self) -> &'static str;

    /// The mutable settings surface of this detector.
    fn settings_mut(&mut self) -> &mut dyn Settings;

    /// Recursively walks `source_folder` and pushes every detected
    /// source to the matching consumer before continuing the walk.
    ///
    /// Malformed files are logged and skipped; the walk never stops for
    /// one bad file. The cancellation flag is checked between files.
    fn detect(
        &self,
        source_folder: &Path,
        consumers: &mut SourceConsumers<'_>,
        detect_performances: bool,
        notifier: &dyn Notifier,
    );

    /// Requests the walk to stop at the next file boundary.
    fn cancel(&self);

    /// Reads the cancellation flag.
    fn is_cancelled(&self) -> bool;
}

/// Writes instrument sources in a specific format.
pub trait Creator: Send + Sync {
    /// Display name of the format.
    fn name(&self) -> &'static str;

    /// Lowercase CLI prefix of the format.
    fn prefix(&self) -> &'static str;

    /// The mutable settings surface of this creator.
    fn settings_mut(&mut self) -> &mut dyn Settings;

    /// Writes one preset (and its samples) into `out_folder`.
    fn create_preset(
        &self,
        out_folder: &Path,
        source: &MultisampleSource,
        notifier: &dyn Notifier,
    ) -> FormatResult<()>;

    /// Writes one performance into `out_folder`.
    ///
    /// Formats without a performance representation report
    /// [`FormatError::PerformanceNotSupported`].
    fn create_performance(
        &self,
        out_folder: &Path,
        performance: &PerformanceSource,
        notifier: &dyn Notifier,
    ) -> FormatResult<()> {
        let _ = (out_folder, performance, notifier);
        Err(FormatError::PerformanceNotSupported(self.name()))
    }

    /// Bundles collected presets into a library.
    ///
    /// Formats without a native library container emit every source into
    /// a subfolder named after the library. Errors on a single source
    /// are logged and the batch continues.
    fn create_preset_library(
        &self,
        out_folder: &Path,
        sources: &[MultisampleSource],
        library_name: &str,
        notifier: &dyn Notifier,
    ) -> FormatResult<()> {
        let folder = out_folder.join(sanitize_filename(library_name));
        fs::create_dir_all(&folder)?;
        for source in sources {
            if self.is_cancelled() {
                return Err(FormatError::Cancelled);
            }
            if let Err(error) = self.create_preset(&folder, source, notifier) {
                notifier.log_error_cause(IDS_NOTIFY_ERROR, &error);
            }
        }
        Ok(())
    }

    /// Bundles collected performances into a library.
    fn create_performance_library(
        &self,
        out_folder: &Path,
        performances: &[PerformanceSource],
        library_name: &str,
        notifier: &dyn Notifier,
    ) -> FormatResult<()> {
        let folder = out_folder.join(sanitize_filename(library_name));
        fs::create_dir_all(&folder)?;
        for performance in performances {
            if self.is_cancelled() {
                return Err(FormatError::Cancelled);
            }
            if let Err(error) = self.create_performance(&folder, performance, notifier) {
                notifier.log_error_cause(IDS_NOTIFY_ERROR, &error);
            }
        }
        Ok(())
    }

    /// Requests that no further output file is started.
    fn cancel(&self);

    /// Clears the cancellation flag for the next run.
    fn clear_cancelled(&self);

    /// Reads the cancellation flag.
    fn is_cancelled(&self) -> bool;
}

/// Walks `folder` and hands every file whose name ends with one of
/// `endings` (case-insensitive) to `handle_file`.
///
/// Files are visited in a stable sorted order. Errors from a single file
/// are logged and the walk continues; the cancellation flag is checked
/// between files.
pub fn walk_source_files(
    folder: &Path,
    endings: &[&str],
    cancel: &CancelFlag,
    notifier: &dyn Notifier,
    mut handle_file: impl FnMut(&Path) -> FormatResult<()>,
) {
    let walker = WalkDir::new(folder)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    for entry in walker {
        if cancel.is_cancelled() {
            return;
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                let text = error.to_string();
                notifier.log_error(IDS_NOTIFY_ERROR, &[&text]);
                continue;
            }
        };
        if !entry.file_type().is_file() || !matches_ending(entry.path(), endings) {
            continue;
        }
        if let Err(error) = handle_file(entry.path()) {
            let path = entry.path().display().to_string();
            let text = error.to_string();
            notifier.log_error(IDS_NOTIFY_SKIPPED, &[&path, &text]);
        }
    }
}

fn matches_ending(path: &Path, endings: &[&str]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let lower = name.to_lowercase();
    endings.iter().any(|e| lower.ends_with(&e.to_lowercase()))
}

/// The path segments of `file`'s parent folder below `root`, used for
/// mirroring the folder structure on the output side.
pub fn sub_path_of(root: &Path, file: &Path) -> Vec<String> {
    let parent = file.parent().unwrap_or(root);
    parent
        .strip_prefix(root)
        .map(|relative| {
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Writes a sample zone's audio as a WAV file into `folder`.
pub fn write_zone_sample(
    folder: &Path,
    zone: &moss_core::SampleZone,
) -> FormatResult<PathBuf> {
    let data = zone
        .sample_data
        .as_ref()
        .ok_or_else(|| FormatError::malformed(format!("zone {} has no sample data", zone.name)))?;
    let file_name = format!("{}.wav", sanitize_filename(&zone.name));
    let path = folder.join(&file_name);
    let mut out = std::io::BufWriter::new(fs::File::create(&path)?);
    data.write_sample(&mut out)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NullNotifier;

    #[test]
    fn test_cancel_flag() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
        flag.cancel();
        assert!(flag.is_cancelled());
        let clone = flag.clone();
        assert!(clone.is_cancelled());
        flag.clear();
        assert!(!clone.is_cancelled());
    }

    #[test]
    fn test_walk_matches_endings_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.SFZ"), b"x").unwrap();
        std::fs::write(dir.path().join("b.sfz"), b"x").unwrap();
        std::fs::write(dir.path().join("c.wav"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/d.sfz"), b"x").unwrap();

        let mut seen = Vec::new();
        walk_source_files(
            dir.path(),
            &[".sfz"],
            &CancelFlag::new(),
            &NullNotifier,
            |path| {
                seen.push(path.file_name().unwrap().to_string_lossy().into_owned());
                Ok(())
            },
        );
        seen.sort();
        assert_eq!(seen, vec!["a.SFZ", "b.sfz", "d.sfz"]);
    }

    #[test]
    fn test_walk_continues_after_file_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.sfz"), b"x").unwrap();
        std::fs::write(dir.path().join("b.sfz"), b"x").unwrap();

        let mut count = 0;
        walk_source_files(
            dir.path(),
            &[".sfz"],
            &CancelFlag::new(),
            &NullNotifier,
            |_| {
                count += 1;
                Err(FormatError::malformed("bad file"))
            },
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn test_walk_stops_when_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..10 {
            std::fs::write(dir.path().join(format!("f{i}.sfz")), b"x").unwrap();
        }

        let cancel = CancelFlag::new();
        let mut count = 0;
        walk_source_files(dir.path(), &[".sfz"], &cancel, &NullNotifier, |_| {
            count += 1;
            cancel.cancel();
            Ok(())
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn test_sub_path_of() {
        let root = Path::new("/src");
        assert_eq!(
            sub_path_of(root, Path::new("/src/a/b/file.sfz")),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(sub_path_of(root, Path::new("/src/file.sfz")).is_empty());
        assert!(sub_path_of(root, Path::new("/elsewhere/file.sfz")).is_empty());
    }
}
