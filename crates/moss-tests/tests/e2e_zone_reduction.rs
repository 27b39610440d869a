//! Zone reduction under coverage preservation (scenario: 128 per-key
//! zones shrink to at most 16 without changing reachable cells).

use moss_core::reduce::{reduce_zones, CoverageMask};
use moss_core::{Group, SampleZone};

fn per_key_zones() -> Vec<Group> {
    let mut group = Group::new("G");
    for key in 0u8..=127 {
        let mut zone = SampleZone::new(format!("Key {key}"));
        zone.key_low = key;
        zone.key_high = key;
        zone.key_root = Some(key);
        zone.velocity_low = 1;
        zone.velocity_high = 127;
        group.zones.push(zone);
    }
    vec![group]
}

#[test]
fn test_reduce_128_zones_to_16() {
    let mut groups = per_key_zones();
    let mask_before = CoverageMask::of_groups(&groups);
    assert_eq!(mask_before.count(), 128 * 127);

    reduce_zones(&mut groups, 16);

    let total: usize = groups.iter().map(|g| g.zones.len()).sum();
    assert!(total <= 16, "still {total} zones");
    assert_eq!(CoverageMask::of_groups(&groups), mask_before);

    // Every merge was horizontal: key-adjacent with the full velocity
    // range intact.
    for zone in &groups[0].zones {
        assert_eq!((zone.velocity_low, zone.velocity_high), (1, 127));
    }

    // The zones still tile the keyboard without overlap.
    let mut zones: Vec<_> = groups[0].zones.iter().collect();
    zones.sort_by_key(|z| z.key_low);
    let mut next_key = 0u16;
    for zone in zones {
        assert_eq!(u16::from(zone.key_low), next_key);
        next_key = u16::from(zone.key_high) + 1;
    }
    assert_eq!(next_key, 128);
}

#[test]
fn test_reduce_monotonically_decreases_without_coverage_change() {
    let mut groups = per_key_zones();
    let mask = CoverageMask::of_groups(&groups);
    let mut previous = 128usize;
    for target in [64usize, 32, 16, 8] {
        reduce_zones(&mut groups, target);
        let total: usize = groups.iter().map(|g| g.zones.len()).sum();
        assert!(total <= target);
        assert!(total <= previous);
        assert_eq!(CoverageMask::of_groups(&groups), mask);
        previous = total;
    }
}

#[test]
fn test_reduce_across_groups_counts_all_zones() {
    // Two groups of 4 velocity layers each; the limit applies to the
    // total, merges stay inside their group.
    let mut groups = Vec::new();
    for g in 0..2 {
        let mut group = Group::new(format!("G{g}"));
        for layer in 0..4u16 {
            let mut zone = SampleZone::new(format!("g{g} l{layer}"));
            zone.velocity_low = (layer * 32 + 1) as u8;
            zone.velocity_high = ((layer + 1) * 32).min(127) as u8;
            group.zones.push(zone);
        }
        groups.push(group);
    }
    let mask = CoverageMask::of_groups(&groups);

    reduce_zones(&mut groups, 2);
    let total: usize = groups.iter().map(|g| g.zones.len()).sum();
    assert_eq!(total, 2);
    assert_eq!(groups[0].zones.len(), 1);
    assert_eq!(groups[1].zones.len(), 1);
    assert_eq!(CoverageMask::of_groups(&groups), mask);
}
