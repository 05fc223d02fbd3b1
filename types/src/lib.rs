//! Fundamental types for the idgate verification engines.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: timestamps, the clock seam, screen geometry, face-pose
//! measurements, and the captured-photo reference.

pub mod clock;
pub mod face;
pub mod geometry;
pub mod photo;
pub mod time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use face::{FaceFrame, FrameReport};
pub use geometry::{BoundingBox, Viewport};
pub use photo::PhotoRef;
pub use time::Timestamp;
