//! Shared helpers for the end-to-end tests.

use std::path::Path;
use std::sync::Mutex;

use moss_file::wav::{FormatChunk, SampleChunk, WavFile, WavLoop};
use moss_formats::Notifier;

/// Writes a mono 16-bit 44.1 kHz WAV with a ramp payload.
pub fn write_mono_wav(path: &Path, frames: u32, unity_note: Option<u32>) {
    let data: Vec<u8> = (0..frames).flat_map(|i| (i as i16).to_le_bytes()).collect();
    let mut wav = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), data);
    if let Some(note) = unity_note {
        wav.sample_chunk = Some(SampleChunk::new(note, 44_100));
    }
    wav.write_file(path).expect("test WAV is writable");
}

/// Writes a mono WAV with one forward loop in the sampler chunk.
pub fn write_mono_wav_with_loop(path: &Path, frames: u32, note: u32, start: u32, end: u32) {
    let data: Vec<u8> = (0..frames).flat_map(|i| (i as i16).to_le_bytes()).collect();
    let mut wav = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), data);
    let mut smpl = SampleChunk::new(note, 44_100);
    smpl.loops.push(WavLoop {
        identifier: 0,
        loop_type: 0,
        start,
        end,
        fraction: 0,
        play_count: 0,
    });
    wav.sample_chunk = Some(smpl);
    wav.write_file(path).expect("test WAV is writable");
}

/// Records every notifier event for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    /// (message ID, joined params) per log or log_error call.
    pub events: Mutex<Vec<(String, String)>>,
    /// One entry per `finished` call.
    pub finished_calls: Mutex<Vec<bool>>,
}

impl RecordingNotifier {
    /// Counts events with the given message ID.
    pub fn count(&self, message_id: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == message_id)
            .count()
    }

    /// True if any event with the ID carries the parameter text.
    pub fn has_event_with(&self, message_id: &str, needle: &str) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|(id, params)| id == message_id && params.contains(needle))
    }
}

impl Notifier for RecordingNotifier {
    fn log(&self, message_id: &str, params: &[&str]) {
        self.events
            .lock()
            .unwrap()
            .push((message_id.to_string(), params.join("|")));
    }

    fn log_error(&self, message_id: &str, params: &[&str]) {
        self.log(message_id, params);
    }

    fn finished(&self, cancelled: bool) {
        self.finished_calls.lock().unwrap().push(cancelled);
    }
}
