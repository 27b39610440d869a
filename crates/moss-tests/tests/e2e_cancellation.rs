//! Cancellation mid-detection (scenario: cancel after the first
//! collected source; the walk stops between files and no library is
//! written).

use std::sync::{Arc, Mutex, OnceLock};

use moss_convert::{ConversionOptions, ConversionPipeline};
use moss_core::{Group, MultisampleSource, SampleZone};
use moss_formats::korg::KorgmultisampleCreator;
use moss_formats::notify::{Notifier, IDS_NOTIFY_COLLECTING};
use moss_formats::{Creator, FormatRegistry, NullNotifier};
use moss_tests::write_mono_wav;

/// Cancels the pipeline on the first `collecting` log, as a frontend
/// cancel button would.
#[derive(Default)]
struct CancelOnFirstCollect {
    pipeline: OnceLock<Arc<ConversionPipeline>>,
    collecting_seen: Mutex<usize>,
    finished_calls: Mutex<Vec<bool>>,
}

impl Notifier for CancelOnFirstCollect {
    fn log(&self, message_id: &str, _params: &[&str]) {
        if message_id == IDS_NOTIFY_COLLECTING {
            *self.collecting_seen.lock().unwrap() += 1;
            if let Some(pipeline) = self.pipeline.get() {
                pipeline.cancel_execution();
            }
        }
    }

    fn log_error(&self, _message_id: &str, _params: &[&str]) {}

    fn finished(&self, cancelled: bool) {
        self.finished_calls.lock().unwrap().push(cancelled);
    }
}

#[test]
fn test_cancel_stops_between_files_and_skips_library() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    // Many small presets; detection must stop long before the end.
    let creator = KorgmultisampleCreator::new();
    let sample = src.path().join("Tone.wav");
    write_mono_wav(&sample, 100, None);
    for index in 0..50 {
        let mut zone = SampleZone::new("Tone");
        zone.stop = 100;
        zone.sample_data = Some(Arc::new(moss_file::FileSampleData::new(&sample)));
        let mut group = Group::new("Layer");
        group.zones.push(zone);
        let mut source = MultisampleSource::new(src.path(), format!("Preset {index:03}"));
        source.groups.push(group);
        creator.create_preset(src.path(), &source, &NullNotifier).unwrap();
    }

    let registry = FormatRegistry::standard();
    let options = ConversionOptions {
        wants_multiple_files: true,
        library_name: "Lib".to_string(),
        ..ConversionOptions::default()
    };
    let pipeline = Arc::new(ConversionPipeline::new(
        registry.create_detector("korgmultisample").unwrap(),
        registry.create_creator("sfz").unwrap(),
        options,
    ));

    let notifier = CancelOnFirstCollect::default();
    notifier.pipeline.set(pipeline.clone()).ok().unwrap();
    pipeline.run(src.path(), out.path(), &notifier);

    // The first source was collected, the cancel took effect between
    // files, and nothing was written.
    assert_eq!(*notifier.collecting_seen.lock().unwrap(), 1);
    assert!(pipeline.is_cancelled());
    assert_eq!(notifier.finished_calls.lock().unwrap().as_slice(), &[true]);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}
