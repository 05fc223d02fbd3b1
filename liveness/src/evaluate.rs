//! Frame and timer evaluation.
//!
//! The evaluator is a pure reducer over [`LivenessSession`]: detector
//! frames and deadline wakeups come in with explicit timestamps, state
//! transitions and at most one side-effect request come out. All actual
//! I/O (the camera) stays behind [`Command`].

use idgate_types::{FaceFrame, PhotoRef, Timestamp};

use crate::config::LivenessConfig;
use crate::geometry::face_centered;
use crate::session::{LivenessSession, CENTER_PROMPT};
use crate::step::ChallengeStep;

/// Side effect requested by the reducer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Photograph the subject. The result must come back through
    /// [`Evaluator::finish_capture`] carrying the same generation.
    RequestPhoto { generation: u64 },
}

/// Result of an attempted photograph.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureOutcome {
    Captured(PhotoRef),
    Failed(String),
}

/// Applies frames and elapsed deadlines to a session.
#[derive(Clone, Debug)]
pub struct Evaluator {
    config: LivenessConfig,
}

impl Evaluator {
    pub fn new(config: LivenessConfig) -> Self {
        Evaluator { config }
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    /// Feeds one detector report into the session.
    ///
    /// A frame stamped past an armed deadline sees that deadline applied
    /// first, so the outcome does not depend on whether the timer wakeup
    /// or the frame was delivered first.
    pub fn observe(
        &self,
        session: &mut LivenessSession,
        faces: &[FaceFrame],
        now: Timestamp,
    ) -> Option<Command> {
        if session.step.is_terminal() {
            return None;
        }
        self.expire(session, now);
        if session.step.is_terminal() {
            return None;
        }

        let face = match faces {
            [face] => face,
            _ => {
                self.face_count_disruption(session);
                return None;
            }
        };

        if !face_centered(&face.bounds, session.viewport, self.config.center_margin) {
            // Drifting out of the box undoes the attempt, but only once a
            // centered position had been established.
            if session.centered {
                session.reset();
            }
            return None;
        }
        session.centered = true;

        match session.step {
            ChallengeStep::Center => self.advance_center(session, now),
            ChallengeStep::Blink => self.advance_blink(session, face),
            ChallengeStep::TurnRight => {
                self.advance_turn(session, face.yaw < -self.config.turn_yaw_deg, now)
            }
            ChallengeStep::TurnLeft => {
                self.advance_turn(session, face.yaw > self.config.turn_yaw_deg, now)
            }
            ChallengeStep::Smile => self.advance_smile(session, face),
            ChallengeStep::Capture => return self.advance_capture(session, face),
            ChallengeStep::Done | ChallengeStep::Failed => {}
        }
        None
    }

    /// Applies every deadline that has elapsed by `now`.
    ///
    /// Transitions chain within one call: a settle hold that elapsed long
    /// ago arms the blink window at its own instant, and that window may
    /// itself already be over.
    pub fn expire(&self, session: &mut LivenessSession, now: Timestamp) {
        if session.step == ChallengeStep::Center {
            if let Some(at) = session.settle_deadline {
                if at.has_elapsed(now) {
                    session.settle_deadline = None;
                    self.begin_blink(session, at);
                }
            }
        }
        if session.step == ChallengeStep::Blink {
            if let Some(at) = session.blink_deadline {
                if at.has_elapsed(now) {
                    session.blink_deadline = None;
                    session.step = ChallengeStep::Failed;
                    session.message = "Blink challenge failed, try again".to_string();
                }
            }
        }
        if session.step == ChallengeStep::TurnRight {
            if let Some(at) = session.turn_deadline {
                if at.has_elapsed(now) {
                    session.turn_deadline = None;
                    session.turn_right_passed = true;
                    session.step = ChallengeStep::TurnLeft;
                    session.message = "Good, now turn left and hold".to_string();
                }
            }
        }
        if session.step == ChallengeStep::TurnLeft {
            if let Some(at) = session.turn_deadline {
                if at.has_elapsed(now) {
                    session.turn_deadline = None;
                    session.turn_left_passed = true;
                    session.step = ChallengeStep::Smile;
                    session.message = "Great, now smile".to_string();
                }
            }
        }
    }

    /// Lands the result of a requested photograph.
    ///
    /// Results from before a reset carry an old generation and are
    /// dropped without touching the session.
    pub fn finish_capture(
        &self,
        session: &mut LivenessSession,
        generation: u64,
        outcome: CaptureOutcome,
    ) {
        if generation != session.generation || session.step != ChallengeStep::Capture {
            return;
        }
        session.capture_pending = false;
        match outcome {
            CaptureOutcome::Captured(photo) => {
                session.captured_photo = Some(photo);
                session.step = ChallengeStep::Done;
                session.message = "Verification complete".to_string();
            }
            CaptureOutcome::Failed(_) => {
                session.step = ChallengeStep::Failed;
                session.message = "Photo capture failed, try again".to_string();
            }
        }
    }

    /// A frame with zero or several faces. Past the centering step this
    /// voids the attempt entirely.
    fn face_count_disruption(&self, session: &mut LivenessSession) {
        if session.step == ChallengeStep::Center {
            session.settle_deadline = None;
            session.centered = false;
            session.message = CENTER_PROMPT.to_string();
        } else {
            session.reset();
        }
    }

    fn advance_center(&self, session: &mut LivenessSession, now: Timestamp) {
        if session.settle_deadline.is_none() {
            session.settle_deadline = Some(now.saturating_add_ms(self.config.settle_ms));
            session.message = format!(
                "Face centered. Get ready to blink {} times",
                self.config.blinks_required
            );
        }
    }

    fn begin_blink(&self, session: &mut LivenessSession, at: Timestamp) {
        session.step = ChallengeStep::Blink;
        session.blink_count = 0;
        session.blink_deadline = Some(at.saturating_add_ms(self.config.blink_timeout_ms));
        session.message = format!(
            "Please blink {} times within {} seconds",
            self.config.blinks_required,
            self.config.blink_timeout_ms / 1000
        );
    }

    fn advance_blink(&self, session: &mut LivenessSession, face: &FaceFrame) {
        // Both probabilities must be present; an unassessable eye never
        // counts as closed.
        let (Some(left), Some(right)) = (face.left_eye_open, face.right_eye_open) else {
            return;
        };
        if left < self.config.eye_closed_threshold && right < self.config.eye_closed_threshold {
            session.blink_count += 1;
            if session.blink_count >= self.config.blinks_required {
                session.blink_deadline = None;
                session.blink_passed = true;
                session.step = ChallengeStep::TurnRight;
                session.message = format!(
                    "{} blinks done, now turn right and hold",
                    session.blink_count
                );
            } else {
                session.message = format!(
                    "Blink detected ({}/{})",
                    session.blink_count, self.config.blinks_required
                );
            }
        }
    }

    fn advance_turn(&self, session: &mut LivenessSession, holding: bool, now: Timestamp) {
        if holding {
            if session.turn_deadline.is_none() {
                session.turn_deadline = Some(now.saturating_add_ms(self.config.turn_hold_ms));
            }
        } else {
            // Any non-qualifying frame breaks the hold.
            session.turn_deadline = None;
        }
    }

    fn advance_smile(&self, session: &mut LivenessSession, face: &FaceFrame) {
        if face
            .smiling
            .is_some_and(|p| p > self.config.smile_threshold)
        {
            session.smile_passed = true;
            session.step = ChallengeStep::Capture;
            session.message = "Perfect, now look straight at the camera".to_string();
        }
    }

    fn advance_capture(&self, session: &mut LivenessSession, face: &FaceFrame) -> Option<Command> {
        if session.capture_pending {
            return None;
        }
        if face.yaw.abs() < self.config.capture_max_yaw_deg
            && face.roll.abs() < self.config.capture_max_roll_deg
        {
            session.capture_pending = true;
            Some(Command::RequestPhoto {
                generation: session.generation,
            })
        } else {
            session.message = "Face the camera directly for the final photo".to_string();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_types::{BoundingBox, Viewport};

    fn ts(ms: u64) -> Timestamp {
        Timestamp::new(ms)
    }

    fn centered_bounds() -> BoundingBox {
        // Center point (200, 400), well inside the margin region.
        BoundingBox::new(150.0, 350.0, 100.0, 100.0)
    }

    fn off_center_bounds() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 40.0, 40.0)
    }

    fn neutral() -> FaceFrame {
        FaceFrame::neutral(centered_bounds())
    }

    fn blink_frame() -> FaceFrame {
        FaceFrame {
            left_eye_open: Some(0.1),
            right_eye_open: Some(0.1),
            ..neutral()
        }
    }

    fn turned(yaw: f64) -> FaceFrame {
        FaceFrame { yaw, ..neutral() }
    }

    fn smile_frame(p: f64) -> FaceFrame {
        FaceFrame {
            smiling: Some(p),
            ..neutral()
        }
    }

    fn setup() -> (Evaluator, LivenessSession) {
        (
            Evaluator::new(LivenessConfig::default()),
            LivenessSession::new(Viewport::new(400.0, 800.0)),
        )
    }

    /// Drives a fresh session to the blink step. Settle ends at 1500ms.
    fn drive_to_blink(ev: &Evaluator, s: &mut LivenessSession) {
        ev.observe(s, &[neutral()], ts(1_000));
        assert_eq!(s.step, ChallengeStep::Center);
        assert_eq!(s.settle_deadline, Some(ts(1_500)));
        ev.expire(s, ts(1_500));
        assert_eq!(s.step, ChallengeStep::Blink);
    }

    fn drive_to_turn_right(ev: &Evaluator, s: &mut LivenessSession) {
        drive_to_blink(ev, s);
        for i in 0..3 {
            ev.observe(s, &[blink_frame()], ts(2_000 + i * 100));
        }
        assert_eq!(s.step, ChallengeStep::TurnRight);
    }

    fn drive_to_smile(ev: &Evaluator, s: &mut LivenessSession) {
        drive_to_turn_right(ev, s);
        ev.observe(s, &[turned(-25.0)], ts(3_000));
        ev.expire(s, ts(4_000));
        assert_eq!(s.step, ChallengeStep::TurnLeft);
        ev.observe(s, &[turned(25.0)], ts(4_100));
        ev.expire(s, ts(5_100));
        assert_eq!(s.step, ChallengeStep::Smile);
    }

    fn drive_to_capture(ev: &Evaluator, s: &mut LivenessSession) {
        drive_to_smile(ev, s);
        ev.observe(s, &[smile_frame(0.9)], ts(5_200));
        assert_eq!(s.step, ChallengeStep::Capture);
    }

    #[test]
    fn settle_hold_gates_the_blink_step() {
        let (ev, mut s) = setup();
        ev.observe(&mut s, &[neutral()], ts(1_000));
        assert_eq!(s.step, ChallengeStep::Center);
        assert!(s.centered);

        ev.expire(&mut s, ts(1_499));
        assert_eq!(s.step, ChallengeStep::Center);

        ev.expire(&mut s, ts(1_500));
        assert_eq!(s.step, ChallengeStep::Blink);
        // The blink window opens at the settle instant.
        assert_eq!(s.blink_deadline, Some(ts(16_500)));
    }

    #[test]
    fn settle_does_not_rearm_on_later_frames() {
        let (ev, mut s) = setup();
        ev.observe(&mut s, &[neutral()], ts(1_000));
        ev.observe(&mut s, &[neutral()], ts(1_200));
        assert_eq!(s.settle_deadline, Some(ts(1_500)));
    }

    #[test]
    fn off_center_before_centering_is_a_no_op() {
        let (ev, mut s) = setup();
        ev.observe(&mut s, &[FaceFrame::neutral(off_center_bounds())], ts(100));
        assert_eq!(s.step, ChallengeStep::Center);
        assert!(!s.centered);
        assert_eq!(s.generation, 0);
    }

    #[test]
    fn drifting_off_center_after_centering_resets() {
        let (ev, mut s) = setup();
        ev.observe(&mut s, &[neutral()], ts(1_000));
        assert!(s.centered);
        ev.observe(&mut s, &[FaceFrame::neutral(off_center_bounds())], ts(1_200));
        assert_eq!(s.step, ChallengeStep::Center);
        assert!(!s.centered);
        assert!(s.settle_deadline.is_none());
        assert_eq!(s.generation, 1);
    }

    #[test]
    fn vanishing_face_during_settle_disarms_without_reset() {
        let (ev, mut s) = setup();
        ev.observe(&mut s, &[neutral()], ts(1_000));
        ev.observe(&mut s, &[], ts(1_200));
        assert_eq!(s.step, ChallengeStep::Center);
        assert!(!s.centered);
        assert!(s.settle_deadline.is_none());
        assert_eq!(s.generation, 0);

        // The settle hold must restart from scratch.
        ev.observe(&mut s, &[neutral()], ts(1_300));
        assert_eq!(s.settle_deadline, Some(ts(1_800)));
    }

    #[test]
    fn blinks_count_per_closed_frame() {
        let (ev, mut s) = setup();
        drive_to_blink(&ev, &mut s);

        ev.observe(&mut s, &[blink_frame()], ts(2_000));
        assert_eq!(s.blink_count, 1);
        assert_eq!(s.message, "Blink detected (1/3)");

        ev.observe(&mut s, &[neutral()], ts(2_100));
        assert_eq!(s.blink_count, 1);

        ev.observe(&mut s, &[blink_frame()], ts(2_200));
        ev.observe(&mut s, &[blink_frame()], ts(2_300));
        assert_eq!(s.step, ChallengeStep::TurnRight);
        assert!(s.blink_passed);
        assert!(s.blink_deadline.is_none());
    }

    #[test]
    fn unassessable_eyes_never_count_as_closed() {
        let (ev, mut s) = setup();
        drive_to_blink(&ev, &mut s);
        let missing = FaceFrame {
            left_eye_open: None,
            right_eye_open: Some(0.1),
            ..neutral()
        };
        ev.observe(&mut s, &[missing], ts(2_000));
        assert_eq!(s.blink_count, 0);
    }

    #[test]
    fn one_open_eye_is_not_a_blink() {
        let (ev, mut s) = setup();
        drive_to_blink(&ev, &mut s);
        let wink = FaceFrame {
            left_eye_open: Some(0.1),
            right_eye_open: Some(0.9),
            ..neutral()
        };
        ev.observe(&mut s, &[wink], ts(2_000));
        assert_eq!(s.blink_count, 0);
    }

    #[test]
    fn blink_timeout_fails_the_attempt() {
        let (ev, mut s) = setup();
        drive_to_blink(&ev, &mut s);
        ev.observe(&mut s, &[blink_frame()], ts(2_000));

        ev.expire(&mut s, ts(16_500));
        assert_eq!(s.step, ChallengeStep::Failed);
        assert!(!s.blink_passed);
        assert_eq!(s.message, "Blink challenge failed, try again");

        // Terminal: further frames are ignored entirely.
        let before = s.clone();
        assert!(ev.observe(&mut s, &[blink_frame()], ts(17_000)).is_none());
        assert_eq!(s, before);
    }

    #[test]
    fn late_frame_applies_the_deadline_first() {
        let (ev, mut s) = setup();
        drive_to_blink(&ev, &mut s);
        // Frame stamped past the blink window: the timeout wins the race
        // and the blink in the frame is never counted.
        ev.observe(&mut s, &[blink_frame()], ts(16_600));
        assert_eq!(s.step, ChallengeStep::Failed);
        assert_eq!(s.blink_count, 0);
    }

    #[test]
    fn chained_deadlines_apply_in_one_call() {
        let (ev, mut s) = setup();
        ev.observe(&mut s, &[neutral()], ts(1_000));
        // Way past both the settle hold and the blink window it opens.
        ev.expire(&mut s, ts(60_000));
        assert_eq!(s.step, ChallengeStep::Failed);
    }

    #[test]
    fn turn_right_requires_a_sustained_hold() {
        let (ev, mut s) = setup();
        drive_to_turn_right(&ev, &mut s);

        ev.observe(&mut s, &[turned(-25.0)], ts(3_000));
        assert_eq!(s.turn_deadline, Some(ts(4_000)));
        ev.observe(&mut s, &[turned(-25.0)], ts(3_500));
        assert_eq!(s.turn_deadline, Some(ts(4_000)));

        ev.expire(&mut s, ts(4_000));
        assert_eq!(s.step, ChallengeStep::TurnLeft);
        assert!(s.turn_right_passed);
        assert!(s.turn_deadline.is_none());
    }

    #[test]
    fn interrupted_turn_restarts_the_hold() {
        let (ev, mut s) = setup();
        drive_to_turn_right(&ev, &mut s);

        ev.observe(&mut s, &[turned(-25.0)], ts(3_000));
        ev.observe(&mut s, &[turned(0.0)], ts(3_400));
        assert!(s.turn_deadline.is_none());

        ev.observe(&mut s, &[turned(-25.0)], ts(3_600));
        assert_eq!(s.turn_deadline, Some(ts(4_600)));
        ev.expire(&mut s, ts(4_000));
        assert_eq!(s.step, ChallengeStep::TurnRight);
        ev.expire(&mut s, ts(4_600));
        assert_eq!(s.step, ChallengeStep::TurnLeft);
    }

    #[test]
    fn turn_thresholds_are_strict_and_signed() {
        let (ev, mut s) = setup();
        drive_to_turn_right(&ev, &mut s);

        // Wrong direction and exact threshold both fail to arm.
        ev.observe(&mut s, &[turned(25.0)], ts(3_000));
        assert!(s.turn_deadline.is_none());
        ev.observe(&mut s, &[turned(-20.0)], ts(3_100));
        assert!(s.turn_deadline.is_none());
        ev.observe(&mut s, &[turned(-20.1)], ts(3_200));
        assert!(s.turn_deadline.is_some());
    }

    #[test]
    fn smile_advances_on_a_single_frame() {
        let (ev, mut s) = setup();
        drive_to_smile(&ev, &mut s);

        ev.observe(&mut s, &[smile_frame(0.7)], ts(5_200));
        assert_eq!(s.step, ChallengeStep::Smile);
        ev.observe(&mut s, &[FaceFrame { smiling: None, ..neutral() }], ts(5_250));
        assert_eq!(s.step, ChallengeStep::Smile);

        ev.observe(&mut s, &[smile_frame(0.71)], ts(5_300));
        assert_eq!(s.step, ChallengeStep::Capture);
        assert!(s.smile_passed);
    }

    #[test]
    fn capture_waits_for_a_frontal_pose() {
        let (ev, mut s) = setup();
        drive_to_capture(&ev, &mut s);

        assert!(ev.observe(&mut s, &[turned(15.0)], ts(5_300)).is_none());
        assert_eq!(s.message, "Face the camera directly for the final photo");
        let tilted = FaceFrame { roll: 12.0, ..neutral() };
        assert!(ev.observe(&mut s, &[tilted], ts(5_350)).is_none());

        let cmd = ev.observe(&mut s, &[neutral()], ts(5_400));
        assert_eq!(cmd, Some(Command::RequestPhoto { generation: 0 }));
        assert!(s.capture_pending);

        // No second request while one is outstanding.
        assert!(ev.observe(&mut s, &[neutral()], ts(5_450)).is_none());
    }

    #[test]
    fn capture_success_completes_the_attempt() {
        let (ev, mut s) = setup();
        drive_to_capture(&ev, &mut s);
        ev.observe(&mut s, &[neutral()], ts(5_400));

        ev.finish_capture(&mut s, 0, CaptureOutcome::Captured(PhotoRef::new("face.jpg")));
        assert_eq!(s.step, ChallengeStep::Done);
        assert_eq!(s.message, "Verification complete");
        assert_eq!(s.captured_photo, Some(PhotoRef::new("face.jpg")));

        let status = s.status();
        assert!(status.flags.centered);
        assert!(status.flags.blink_passed);
        assert!(status.flags.turn_right_passed);
        assert!(status.flags.turn_left_passed);
        assert!(status.flags.smile_passed);
    }

    #[test]
    fn capture_failure_fails_the_attempt() {
        let (ev, mut s) = setup();
        drive_to_capture(&ev, &mut s);
        ev.observe(&mut s, &[neutral()], ts(5_400));

        ev.finish_capture(&mut s, 0, CaptureOutcome::Failed("camera busy".to_string()));
        assert_eq!(s.step, ChallengeStep::Failed);
        assert_eq!(s.message, "Photo capture failed, try again");
        assert!(s.captured_photo.is_none());
    }

    #[test]
    fn stale_capture_results_are_discarded() {
        let (ev, mut s) = setup();
        drive_to_capture(&ev, &mut s);
        let cmd = ev.observe(&mut s, &[neutral()], ts(5_400));
        assert_eq!(cmd, Some(Command::RequestPhoto { generation: 0 }));

        // Face lost while the capture is in flight: full reset.
        ev.observe(&mut s, &[], ts(5_500));
        assert_eq!(s.step, ChallengeStep::Center);
        assert_eq!(s.generation, 1);
        assert!(!s.capture_pending);

        // The old capture result lands afterwards and must change nothing.
        let before = s.clone();
        ev.finish_capture(&mut s, 0, CaptureOutcome::Captured(PhotoRef::new("late.jpg")));
        assert_eq!(s, before);
        assert!(s.captured_photo.is_none());
    }

    #[test]
    fn extra_faces_reset_past_the_centering_step() {
        let (ev, mut s) = setup();
        drive_to_turn_right(&ev, &mut s);
        ev.observe(&mut s, &[turned(-25.0)], ts(3_000));
        assert!(s.turn_deadline.is_some());

        ev.observe(&mut s, &[neutral(), neutral()], ts(3_100));
        assert_eq!(s.step, ChallengeStep::Center);
        assert!(!s.blink_passed);
        assert_eq!(s.blink_count, 0);
        assert!(s.next_deadline().is_none());
        assert_eq!(s.generation, 1);
        assert_eq!(s.message, CENTER_PROMPT);
    }

    #[test]
    fn reset_attempt_runs_the_full_course_again() {
        let (ev, mut s) = setup();
        drive_to_turn_right(&ev, &mut s);
        ev.observe(&mut s, &[], ts(3_000));
        assert_eq!(s.generation, 1);

        // Second pass all the way to capture; the command carries the new
        // generation.
        ev.observe(&mut s, &[neutral()], ts(10_000));
        ev.expire(&mut s, ts(10_500));
        assert_eq!(s.step, ChallengeStep::Blink);
        for i in 0..3 {
            ev.observe(&mut s, &[blink_frame()], ts(11_000 + i * 100));
        }
        ev.observe(&mut s, &[turned(-25.0)], ts(12_000));
        ev.expire(&mut s, ts(13_000));
        ev.observe(&mut s, &[turned(25.0)], ts(13_100));
        ev.expire(&mut s, ts(14_100));
        ev.observe(&mut s, &[smile_frame(0.9)], ts(14_200));
        let cmd = ev.observe(&mut s, &[neutral()], ts(14_300));
        assert_eq!(cmd, Some(Command::RequestPhoto { generation: 1 }));

        ev.finish_capture(&mut s, 1, CaptureOutcome::Captured(PhotoRef::new("face.jpg")));
        assert_eq!(s.step, ChallengeStep::Done);
    }

    #[test]
    fn next_deadline_tracks_the_active_challenge() {
        let (ev, mut s) = setup();
        assert!(s.next_deadline().is_none());

        ev.observe(&mut s, &[neutral()], ts(1_000));
        assert_eq!(s.next_deadline(), Some(ts(1_500)));

        ev.expire(&mut s, ts(1_500));
        assert_eq!(s.next_deadline(), Some(ts(16_500)));

        for i in 0..3 {
            ev.observe(&mut s, &[blink_frame()], ts(2_000 + i * 100));
        }
        assert!(s.next_deadline().is_none());

        ev.observe(&mut s, &[turned(-25.0)], ts(3_000));
        assert_eq!(s.next_deadline(), Some(ts(4_000)));
    }

    #[test]
    fn done_session_ignores_everything_until_reset() {
        let (ev, mut s) = setup();
        drive_to_capture(&ev, &mut s);
        ev.observe(&mut s, &[neutral()], ts(5_400));
        ev.finish_capture(&mut s, 0, CaptureOutcome::Captured(PhotoRef::new("face.jpg")));

        let before = s.clone();
        assert!(ev.observe(&mut s, &[], ts(6_000)).is_none());
        ev.expire(&mut s, ts(60_000));
        ev.finish_capture(&mut s, 0, CaptureOutcome::Failed("late".to_string()));
        assert_eq!(s, before);

        s.reset();
        assert_eq!(s.step, ChallengeStep::Center);
        assert_eq!(s.generation, 1);
        assert!(s.captured_photo.is_none());
    }
}
