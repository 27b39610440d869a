//! Zone groups, trigger types and play logic.

use serde::Serialize;

use crate::zone::SampleZone;

/// The event that starts playback of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub enum Trigger {
    /// Play on note-on.
    #[default]
    Attack,
    /// Play on note-off.
    Release,
    /// Play only on the first note of a phrase.
    First,
    /// Play only on legato transitions.
    Legato,
}

/// Whether a zone always plays or participates in round robin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlayLogic {
    /// The zone plays on every matching note.
    #[default]
    Always,
    /// Consecutive note-ons cycle through zones sharing a sequence position.
    RoundRobin,
}

/// A named collection of zones sharing a trigger type.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Group {
    /// Group name.
    pub name: String,
    /// The trigger shared by the group's zones.
    pub trigger: Trigger,
    /// The zones of this group.
    pub zones: Vec<SampleZone>,
}

impl Group {
    /// Creates an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger: Trigger::Attack,
            zones: Vec::new(),
        }
    }

    /// A group is a round-robin group iff every zone is round robin and
    /// all zones share the same sequence position.
    pub fn is_round_robin(&self) -> bool {
        let mut zones = self.zones.iter();
        let Some(first) = zones.next() else {
            return false;
        };
        if first.play_logic != PlayLogic::RoundRobin {
            return false;
        }
        zones.all(|z| {
            z.play_logic == PlayLogic::RoundRobin && z.sequence_position == first.sequence_position
        })
    }

    /// The lowest velocity of any zone, 1 when the group is empty.
    pub fn lowest_velocity(&self) -> u8 {
        self.zones.iter().map(|z| z.velocity_low).min().unwrap_or(1)
    }

    /// The highest velocity of any zone, 127 when the group is empty.
    pub fn highest_velocity(&self) -> u8 {
        self.zones.iter().map(|z| z.velocity_high).max().unwrap_or(127)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group_is_not_round_robin() {
        assert!(!Group::new("G").is_round_robin());
    }

    #[test]
    fn test_round_robin_requires_shared_sequence_position() {
        let mut group = Group::new("G");
        let mut a = SampleZone::new("a");
        a.play_logic = PlayLogic::RoundRobin;
        a.sequence_position = Some(1);
        let mut b = a.clone();
        b.name = "b".into();
        group.zones.push(a);
        group.zones.push(b);
        assert!(group.is_round_robin());

        group.zones[1].sequence_position = Some(2);
        assert!(!group.is_round_robin());

        group.zones[1].sequence_position = Some(1);
        group.zones[1].play_logic = PlayLogic::Always;
        assert!(!group.is_round_robin());
    }

    #[test]
    fn test_velocity_aggregates() {
        let mut group = Group::new("G");
        let mut a = SampleZone::new("a");
        a.velocity_low = 30;
        a.velocity_high = 80;
        let mut b = SampleZone::new("b");
        b.velocity_low = 81;
        b.velocity_high = 127;
        group.zones.push(a);
        group.zones.push(b);
        assert_eq!(group.lowest_velocity(), 30);
        assert_eq!(group.highest_velocity(), 127);
    }
}
