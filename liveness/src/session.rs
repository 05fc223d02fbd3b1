//! Per-attempt session state.

use idgate_types::{PhotoRef, Timestamp, Viewport};
use serde::{Deserialize, Serialize};

use crate::step::ChallengeStep;

pub(crate) const CENTER_PROMPT: &str = "Center your face inside the box";

/// Mutable state of one verification attempt.
///
/// Progress flags only ever go from `false` to `true` within an attempt;
/// the sole way back is [`LivenessSession::reset`], which clears them all
/// together and bumps the generation so that any in-flight photo capture
/// is recognized as stale when it lands.
#[derive(Clone, Debug, PartialEq)]
pub struct LivenessSession {
    pub step: ChallengeStep,
    pub viewport: Viewport,
    pub centered: bool,
    pub blink_passed: bool,
    pub turn_right_passed: bool,
    pub turn_left_passed: bool,
    pub smile_passed: bool,
    pub blink_count: u32,
    /// Armed while the face must hold still inside the box.
    pub settle_deadline: Option<Timestamp>,
    /// Armed while blinks are being counted.
    pub blink_deadline: Option<Timestamp>,
    /// Armed while a head turn is being held.
    pub turn_deadline: Option<Timestamp>,
    pub capture_pending: bool,
    pub captured_photo: Option<PhotoRef>,
    pub generation: u64,
    pub message: String,
}

impl LivenessSession {
    pub fn new(viewport: Viewport) -> Self {
        LivenessSession {
            step: ChallengeStep::Center,
            viewport,
            centered: false,
            blink_passed: false,
            turn_right_passed: false,
            turn_left_passed: false,
            smile_passed: false,
            blink_count: 0,
            settle_deadline: None,
            blink_deadline: None,
            turn_deadline: None,
            capture_pending: false,
            captured_photo: None,
            generation: 0,
            message: CENTER_PROMPT.to_string(),
        }
    }

    /// Returns the attempt to its initial state, keeping the viewport and
    /// advancing the generation.
    pub fn reset(&mut self) {
        let viewport = self.viewport;
        let generation = self.generation;
        *self = LivenessSession::new(viewport);
        self.generation = generation + 1;
    }

    /// Earliest armed deadline, the next instant the session must be
    /// re-evaluated even without a frame.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        [self.settle_deadline, self.blink_deadline, self.turn_deadline]
            .into_iter()
            .flatten()
            .min()
    }

    /// Immutable snapshot for consumers.
    pub fn status(&self) -> LivenessStatus {
        LivenessStatus {
            step: self.step,
            message: self.message.clone(),
            flags: ChallengeFlags {
                centered: self.centered,
                blink_passed: self.blink_passed,
                turn_right_passed: self.turn_right_passed,
                turn_left_passed: self.turn_left_passed,
                smile_passed: self.smile_passed,
            },
            captured_photo_ref: self.captured_photo.clone(),
        }
    }
}

/// Which individual challenges have been passed so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeFlags {
    pub centered: bool,
    pub blink_passed: bool,
    pub turn_right_passed: bool,
    pub turn_left_passed: bool,
    pub smile_passed: bool,
}

/// Snapshot of an attempt, published after every state change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessStatus {
    pub step: ChallengeStep,
    pub message: String,
    pub flags: ChallengeFlags,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub captured_photo_ref: Option<PhotoRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> LivenessSession {
        LivenessSession::new(Viewport::new(400.0, 800.0))
    }

    #[test]
    fn new_session_is_blank() {
        let s = session();
        assert_eq!(s.step, ChallengeStep::Center);
        assert_eq!(s.blink_count, 0);
        assert_eq!(s.generation, 0);
        assert!(s.next_deadline().is_none());
        assert_eq!(s.message, CENTER_PROMPT);
    }

    #[test]
    fn reset_clears_progress_and_bumps_generation() {
        let mut s = session();
        s.step = ChallengeStep::Smile;
        s.blink_passed = true;
        s.blink_count = 3;
        s.turn_deadline = Some(Timestamp::new(5_000));
        s.capture_pending = true;

        s.reset();
        assert_eq!(s.step, ChallengeStep::Center);
        assert!(!s.blink_passed);
        assert_eq!(s.blink_count, 0);
        assert!(s.next_deadline().is_none());
        assert!(!s.capture_pending);
        assert_eq!(s.generation, 1);
        assert_eq!(s.viewport, Viewport::new(400.0, 800.0));

        s.reset();
        assert_eq!(s.generation, 2);
    }

    #[test]
    fn next_deadline_picks_the_earliest() {
        let mut s = session();
        s.settle_deadline = Some(Timestamp::new(900));
        s.blink_deadline = Some(Timestamp::new(400));
        assert_eq!(s.next_deadline(), Some(Timestamp::new(400)));
    }

    #[test]
    fn status_serializes_camel_case_and_omits_missing_photo() {
        let s = session();
        let json = serde_json::to_string(&s.status()).unwrap();
        assert!(json.contains("\"blinkPassed\":false"));
        assert!(json.contains("\"step\":\"center\""));
        assert!(!json.contains("capturedPhotoRef"));

        let mut s = session();
        s.captured_photo = Some(PhotoRef::new("shot.jpg"));
        let json = serde_json::to_string(&s.status()).unwrap();
        assert!(json.contains("capturedPhotoRef"));
    }
}
