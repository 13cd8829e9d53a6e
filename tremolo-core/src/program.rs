//! Named sequence programs
//!
//! Fixed gesture scripts the firmware can select by name. Timings are plain
//! data; callers with different needs build their own step lists.

use crate::config::SequencerConfig;
use crate::sequencer::Step;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Full setup: three long gestures, three short ones, and a final long one
const FULL_SETUP: [Step; 7] = [
    Step::large(2000),
    Step::large(2000),
    Step::large(2000),
    Step::small(2000),
    Step::small(2000),
    Step::small(2000),
    Step::large(0),
];

/// Known sequence programs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SequenceKind {
    /// Complete device setup
    FullSetup,
}

impl SequenceKind {
    /// Every program, in menu order
    pub const ALL: [SequenceKind; 1] = [SequenceKind::FullSetup];

    /// Identifier used in configuration files
    pub const fn name(self) -> &'static str {
        match self {
            SequenceKind::FullSetup => "full-setup",
        }
    }

    /// Look up a program by its identifier
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn steps(self) -> &'static [Step] {
        match self {
            SequenceKind::FullSetup => &FULL_SETUP,
        }
    }

    /// Time the program takes when polled without lag
    pub fn nominal_duration_ms(self, config: &SequencerConfig) -> u64 {
        self.steps()
            .iter()
            .map(|step| step.duration_ms(config.toggle_interval_ms))
            .sum()
    }
}
