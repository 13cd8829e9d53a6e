//! Sequence step definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Toggle class of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StepKind {
    /// Long gesture: four toggle intervals
    Large,
    /// Short gesture: two toggle intervals
    Small,
}

impl StepKind {
    /// Number of toggle intervals before the signal turns off
    pub const fn toggle_target(self) -> u8 {
        match self {
            StepKind::Large => 4,
            StepKind::Small => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StepKind::Large => "Large Cycle",
            StepKind::Small => "Small Cycle",
        }
    }
}

/// One scripted gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Step {
    pub kind: StepKind,
    /// Silence after the signal turns off (ms)
    pub post_delay_ms: u32,
}

impl Step {
    pub const fn large(post_delay_ms: u32) -> Self {
        Self {
            kind: StepKind::Large,
            post_delay_ms,
        }
    }

    pub const fn small(post_delay_ms: u32) -> Self {
        Self {
            kind: StepKind::Small,
            post_delay_ms,
        }
    }

    /// Time from step entry until the next step can start
    pub fn duration_ms(&self, toggle_interval_ms: u32) -> u64 {
        u64::from(self.kind.toggle_target()) * u64::from(toggle_interval_ms)
            + u64::from(self.post_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_targets() {
        assert_eq!(StepKind::Large.toggle_target(), 4);
        assert_eq!(StepKind::Small.toggle_target(), 2);
    }

    #[test]
    fn test_duration() {
        assert_eq!(Step::large(1000).duration_ms(300), 2200);
        assert_eq!(Step::small(0).duration_ms(300), 600);
    }
}
