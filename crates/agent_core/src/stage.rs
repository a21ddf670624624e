use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pipeline stages reported by the agent, in execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Interpret,
    Fetch,
    Convert,
    Viz,
    Finish,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Interpret,
        Stage::Fetch,
        Stage::Convert,
        Stage::Viz,
        Stage::Finish,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Completion percentage: position in the sequence scaled to 0..=100.
    pub fn percent(self) -> u8 {
        (self.index() * 100 / (Self::ALL.len() - 1)) as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Interpret => "interpret",
            Stage::Fetch => "fetch",
            Stage::Convert => "convert",
            Stage::Viz => "viz",
            Stage::Finish => "finish",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Finish
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage `{0}`")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// How the tracker treats a step that points backwards in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Jump to whatever stage the server reports, including regressions.
    #[default]
    Permissive,
    /// Ignore steps that would move the pointer backwards.
    Strict,
}

impl TransitionPolicy {
    pub fn allows(self, from: Stage, to: Stage) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => to >= from,
        }
    }
}
