//! Channel-configuration detection and split-stereo recombination.
//!
//! Some sample libraries ship stereo instruments as two mono files per
//! zone, hard-panned fully left and right. Detection classifies a zone
//! set; recombination pairs the mono zones and merges their PCM into
//! interleaved stereo.

use std::cmp::Ordering;
use std::sync::Arc;

use moss_core::naming::common_prefix;
use moss_core::{Group, SampleZone};

use crate::error::{FileError, FileResult};
use crate::sample_data::{load_zone_wav, MemorySampleData};
use crate::wav::WavFile;

/// The channel layout of a zone set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelConfiguration {
    /// All zones are mono and not hard panned.
    Mono,
    /// All zones are stereo.
    Stereo,
    /// All zones are mono and every zone is hard panned left or right.
    SplitStereo,
    /// Zones disagree on mono versus stereo.
    Mixed,
}

/// Classifies the channel configuration of all zones in the groups.
pub fn detect_channel_configuration(groups: &[Group]) -> FileResult<ChannelConfiguration> {
    let mut any_mono = false;
    let mut any_stereo = false;
    let mut all_hard_panned = true;

    for zone in groups.iter().flat_map(|g| g.zones.iter()) {
        let Some(data) = &zone.sample_data else {
            continue;
        };
        let metadata = data.audio_metadata()?;
        if metadata.is_mono() {
            any_mono = true;
            if zone.panorama.abs() < 1.0 {
                all_hard_panned = false;
            }
        } else {
            any_stereo = true;
        }
    }

    Ok(if any_mono && any_stereo {
        ChannelConfiguration::Mixed
    } else if any_stereo {
        ChannelConfiguration::Stereo
    } else if all_hard_panned && any_mono {
        ChannelConfiguration::SplitStereo
    } else {
        ChannelConfiguration::Mono
    })
}

/// Combines the hard-panned mono zones of a group into stereo zones.
///
/// Zones panned fully left pair with zones panned right by sorting both
/// sides on their mapping attributes; paired zones must agree on loops
/// and audio properties. Each pair becomes a single centered zone backed
/// by an in-memory stereo WAV named with the common prefix of the pair.
pub fn combine_split_stereo_zones(group: &mut Group) -> FileResult<()> {
    let zones = std::mem::take(&mut group.zones);
    let (mut left, mut right): (Vec<SampleZone>, Vec<SampleZone>) =
        zones.into_iter().partition(|z| z.panorama <= -1.0);

    if left.len() != right.len() {
        group.zones = left.into_iter().chain(right).collect();
        return Err(FileError::combination(format!(
            "unequal split-stereo counts: {} left, {} right",
            group.zones.iter().filter(|z| z.panorama <= -1.0).count(),
            group.zones.iter().filter(|z| z.panorama > -1.0).count()
        )));
    }

    left.sort_by(compare_zone_attributes);
    right.sort_by(compare_zone_attributes);

    let mut combined = Vec::with_capacity(left.len());
    for (l, r) in left.into_iter().zip(right.into_iter()) {
        combined.push(combine_pair(l, r)?);
    }
    group.zones = combined;
    Ok(())
}

/// The attribute tuple that aligns left and right zones of a pair.
fn compare_zone_attributes(a: &SampleZone, b: &SampleZone) -> Ordering {
    (a.key_root, a.key_low, a.key_high)
        .cmp(&(b.key_root, b.key_low, b.key_high))
        .then_with(|| {
            (a.note_crossfade_low, a.note_crossfade_high)
                .cmp(&(b.note_crossfade_low, b.note_crossfade_high))
        })
        .then_with(|| {
            (a.velocity_low, a.velocity_high).cmp(&(b.velocity_low, b.velocity_high))
        })
        .then_with(|| {
            (a.velocity_crossfade_low, a.velocity_crossfade_high)
                .cmp(&(b.velocity_crossfade_low, b.velocity_crossfade_high))
        })
        .then_with(|| (a.start, a.stop).cmp(&(b.start, b.stop)))
        .then_with(|| a.tune.total_cmp(&b.tune))
        .then_with(|| a.trigger.cmp(&b.trigger))
        .then_with(|| a.name.cmp(&b.name))
}

fn combine_pair(left: SampleZone, right: SampleZone) -> FileResult<SampleZone> {
    ensure_pairable(&left, &right)?;

    let left_wav = load_zone_wav(&left)?;
    let right_wav = load_zone_wav(&right)?;
    let stereo = WavFile::combine(&left_wav, &right_wav)?;

    let name = match common_prefix(&left.name, &right.name) {
        prefix if prefix.is_empty() => left.name.clone(),
        prefix => prefix,
    };

    let mut zone = left;
    zone.name = name;
    zone.panorama = 0.0;
    zone.sample_data = Some(Arc::new(MemorySampleData::new(stereo)));
    Ok(zone)
}

fn ensure_pairable(left: &SampleZone, right: &SampleZone) -> FileResult<()> {
    if left.loops.len() != right.loops.len() {
        return Err(FileError::combination(format!(
            "loop counts differ between {} and {}",
            left.name, right.name
        )));
    }
    for (a, b) in left.loops.iter().zip(right.loops.iter()) {
        if a.loop_type != b.loop_type || a.start != b.start || a.end != b.end {
            return Err(FileError::combination(format!(
                "loops differ between {} and {}",
                left.name, right.name
            )));
        }
    }

    let left_meta = left
        .sample_data
        .as_ref()
        .ok_or_else(|| FileError::combination(format!("{} has no sample data", left.name)))?
        .audio_metadata()?;
    let right_meta = right
        .sample_data
        .as_ref()
        .ok_or_else(|| FileError::combination(format!("{} has no sample data", right.name)))?
        .audio_metadata()?;
    if left_meta.frame_count != right_meta.frame_count
        || left_meta.bits_per_sample != right_meta.bits_per_sample
        || left_meta.sample_rate != right_meta.sample_rate
    {
        return Err(FileError::combination(format!(
            "audio properties differ between {} and {}",
            left.name, right.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::{FormatChunk, SampleChunk, WavLoop};
    use moss_core::SampleLoop;

    fn mono_zone(name: &str, pan: f64, pcm: Vec<u8>) -> SampleZone {
        let mut wav = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), pcm);
        let mut smpl = SampleChunk::new(60, 44_100);
        smpl.loops.push(WavLoop {
            identifier: 0,
            loop_type: 0,
            start: 0,
            end: 1,
            fraction: 0,
            play_count: 0,
        });
        wav.sample_chunk = Some(smpl);

        let mut zone = SampleZone::new(name);
        zone.panorama = pan;
        zone.stop = 2;
        zone.loops.push(SampleLoop::forwards(0, 1));
        zone.sample_data = Some(Arc::new(MemorySampleData::new(wav)));
        zone
    }

    fn stereo_zone(name: &str) -> SampleZone {
        let wav = WavFile::from_pcm(FormatChunk::pcm(2, 44_100, 16), vec![0u8; 8]);
        let mut zone = SampleZone::new(name);
        zone.sample_data = Some(Arc::new(MemorySampleData::new(wav)));
        zone
    }

    fn group_of(zones: Vec<SampleZone>) -> Group {
        let mut group = Group::new("G");
        group.zones = zones;
        group
    }

    #[test]
    fn test_detect_mono() {
        let groups = vec![group_of(vec![mono_zone("a", 0.0, vec![0; 4])])];
        assert_eq!(
            detect_channel_configuration(&groups).unwrap(),
            ChannelConfiguration::Mono
        );
    }

    #[test]
    fn test_detect_stereo() {
        let groups = vec![group_of(vec![stereo_zone("a")])];
        assert_eq!(
            detect_channel_configuration(&groups).unwrap(),
            ChannelConfiguration::Stereo
        );
    }

    #[test]
    fn test_detect_mixed() {
        let groups = vec![group_of(vec![
            mono_zone("a", 0.0, vec![0; 4]),
            stereo_zone("b"),
        ])];
        assert_eq!(
            detect_channel_configuration(&groups).unwrap(),
            ChannelConfiguration::Mixed
        );
    }

    #[test]
    fn test_detect_split_stereo() {
        let groups = vec![group_of(vec![
            mono_zone("a_L", -1.0, vec![0; 4]),
            mono_zone("a_R", 1.0, vec![0; 4]),
        ])];
        assert_eq!(
            detect_channel_configuration(&groups).unwrap(),
            ChannelConfiguration::SplitStereo
        );
    }

    #[test]
    fn test_combine_produces_centered_stereo_zone() {
        let mut group = group_of(vec![
            mono_zone("Piano_L", -1.0, vec![1, 0, 2, 0]),
            mono_zone("Piano_R", 1.0, vec![3, 0, 4, 0]),
        ]);
        combine_split_stereo_zones(&mut group).unwrap();

        assert_eq!(group.zones.len(), 1);
        let zone = &group.zones[0];
        assert_eq!(zone.name, "Piano");
        assert_eq!(zone.panorama, 0.0);
        assert_eq!(zone.loops, vec![SampleLoop::forwards(0, 1)]);

        let metadata = zone.sample_data.as_ref().unwrap().audio_metadata().unwrap();
        assert_eq!(metadata.channels, 2);
        assert_eq!(metadata.frame_count, 2);

        let wav = load_zone_wav(zone).unwrap();
        assert_eq!(wav.data, vec![1, 0, 3, 0, 2, 0, 4, 0]);
    }

    #[test]
    fn test_combine_rejects_unequal_counts() {
        let mut group = group_of(vec![
            mono_zone("a_L", -1.0, vec![0; 4]),
            mono_zone("a_R", 1.0, vec![0; 4]),
            mono_zone("b_R", 1.0, vec![0; 4]),
        ]);
        let error = combine_split_stereo_zones(&mut group).unwrap_err();
        assert!(matches!(error, FileError::CombinationNotPossible(_)));
        // The group keeps its zones on failure.
        assert_eq!(group.zones.len(), 3);
    }

    #[test]
    fn test_combine_pairs_by_attributes() {
        let mut low_l = mono_zone("Low_L", -1.0, vec![1, 0]);
        low_l.key_root = Some(48);
        low_l.stop = 1;
        low_l.loops.clear();
        let mut wav = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![1, 0]);
        wav.sample_chunk = None;
        low_l.sample_data = Some(Arc::new(MemorySampleData::new(wav)));

        let mut high_l = low_l.clone();
        high_l.name = "High_L".into();
        high_l.key_root = Some(72);

        let mut low_r = low_l.clone();
        low_r.name = "Low_R".into();
        low_r.panorama = 1.0;

        let mut high_r = high_l.clone();
        high_r.name = "High_R".into();
        high_r.panorama = 1.0;

        // Deliberately interleaved ordering.
        let mut group = group_of(vec![high_l, low_r, low_l, high_r]);
        combine_split_stereo_zones(&mut group).unwrap();

        assert_eq!(group.zones.len(), 2);
        assert_eq!(group.zones[0].name, "Low");
        assert_eq!(group.zones[1].name, "High");
    }
}
