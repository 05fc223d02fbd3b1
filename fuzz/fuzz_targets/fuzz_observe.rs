#![no_main]

use libfuzzer_sys::fuzz_target;

use idgate_liveness::{
    CaptureOutcome, ChallengeStep, Evaluator, LivenessConfig, LivenessSession,
};
use idgate_types::{BoundingBox, FaceFrame, PhotoRef, Timestamp, Viewport};

// Fuzz the challenge reducer with arbitrary op streams. Whatever the
// stream does, the session must stay inside its legal envelope: no panic,
// generations only grow, the blink count stays bounded, and a photo is
// present exactly in the Done step.
fuzz_target!(|input: (u64, Vec<(u8, u16)>)| {
    let (seed, ops) = input;

    let evaluator = Evaluator::new(LivenessConfig::default());
    let mut session = LivenessSession::new(Viewport::new(400.0, 800.0));
    let mut now = seed % 1_000_000;

    for (op, dt) in ops {
        now = now.saturating_add(u64::from(dt));
        let at = Timestamp::new(now);

        let centered = FaceFrame::neutral(BoundingBox::new(150.0, 350.0, 100.0, 100.0));
        match op % 12 {
            0 => drop(evaluator.observe(&mut session, &[], at)),
            1 => drop(evaluator.observe(&mut session, &[centered], at)),
            2 => drop(evaluator.observe(&mut session, &[centered, centered], at)),
            3 => {
                let off = FaceFrame::neutral(BoundingBox::new(0.0, 0.0, 40.0, 40.0));
                drop(evaluator.observe(&mut session, &[off], at));
            }
            4 => {
                let blink = FaceFrame {
                    left_eye_open: Some(0.1),
                    right_eye_open: Some(0.1),
                    ..centered
                };
                drop(evaluator.observe(&mut session, &[blink], at));
            }
            5 => {
                let right = FaceFrame {
                    yaw: -25.0,
                    ..centered
                };
                drop(evaluator.observe(&mut session, &[right], at));
            }
            6 => {
                let left = FaceFrame { yaw: 25.0, ..centered };
                drop(evaluator.observe(&mut session, &[left], at));
            }
            7 => {
                let smile = FaceFrame {
                    smiling: Some(0.9),
                    ..centered
                };
                drop(evaluator.observe(&mut session, &[smile], at));
            }
            8 => evaluator.expire(&mut session, at),
            9 => evaluator.finish_capture(
                &mut session,
                session.generation,
                CaptureOutcome::Captured(PhotoRef::new("fuzz.jpg")),
            ),
            10 => evaluator.finish_capture(
                &mut session,
                session.generation.wrapping_add(1),
                CaptureOutcome::Captured(PhotoRef::new("stale.jpg")),
            ),
            _ => evaluator.finish_capture(
                &mut session,
                session.generation,
                CaptureOutcome::Failed("fuzzed failure".to_string()),
            ),
        }

        assert!(session.blink_count <= evaluator.config().blinks_required);
        assert_eq!(
            session.captured_photo.is_some(),
            session.step == ChallengeStep::Done
        );
        if session.step == ChallengeStep::Done {
            assert_eq!(session.captured_photo, Some(PhotoRef::new("fuzz.jpg")));
        }

        let _ = session.next_deadline();
        let _ = session.status();
    }
});
