//! Challenge progression.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a verification attempt currently stands.
///
/// Steps advance strictly forward; any disruption returns the whole
/// attempt to [`ChallengeStep::Center`]. The two terminal steps only
/// leave via an explicit reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeStep {
    /// Waiting for the face to settle inside the center box.
    Center,
    /// Counting deliberate blinks against a timeout.
    Blink,
    /// Holding a head turn to the subject's right.
    TurnRight,
    /// Holding a head turn to the subject's left.
    TurnLeft,
    Smile,
    /// Waiting for a frontal frame to photograph.
    Capture,
    Done,
    Failed,
}

impl ChallengeStep {
    pub fn is_terminal(self) -> bool {
        matches!(self, ChallengeStep::Done | ChallengeStep::Failed)
    }
}

impl fmt::Display for ChallengeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChallengeStep::Center => "center",
            ChallengeStep::Blink => "blink",
            ChallengeStep::TurnRight => "turn-right",
            ChallengeStep::TurnLeft => "turn-left",
            ChallengeStep::Smile => "smile",
            ChallengeStep::Capture => "capture",
            ChallengeStep::Done => "done",
            ChallengeStep::Failed => "failed",
        };
        write!(f, "{name}")
    }
}
