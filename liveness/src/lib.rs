//! Liveness challenge engine.
//!
//! A session walks a fixed gauntlet of camera challenges (center, blink,
//! head turns, smile) and ends with a frontal photo capture. The engine
//! here is deliberately I/O-free: [`Evaluator`] consumes timestamped
//! detector frames and deadline wakeups, mutates a [`LivenessSession`],
//! and asks for side effects through [`Command`].

pub mod config;
pub mod evaluate;
pub mod geometry;
pub mod session;
pub mod step;

pub use config::LivenessConfig;
pub use evaluate::{CaptureOutcome, Command, Evaluator};
pub use geometry::{face_centered, CenterBox};
pub use session::{ChallengeFlags, LivenessSession, LivenessStatus};
pub use step::ChallengeStep;
