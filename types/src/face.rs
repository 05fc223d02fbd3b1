//! Face-pose measurements delivered by the external detector.
//!
//! One [`FrameReport`] arrives per processed video frame and carries zero or
//! more detected faces. Probabilities are in `[0, 1]`; a detector that could
//! not assess a classification omits it entirely rather than reporting 0.

use crate::{BoundingBox, Timestamp};
use serde::{Deserialize, Serialize};

/// One detected face in one video frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceFrame {
    /// Where the face sits in screen coordinates.
    pub bounds: BoundingBox,
    /// Probability the left eye is open, if assessable.
    pub left_eye_open: Option<f64>,
    /// Probability the right eye is open, if assessable.
    pub right_eye_open: Option<f64>,
    /// Probability the face is smiling, if assessable.
    pub smiling: Option<f64>,
    /// Head yaw in degrees. Negative values are a turn to the subject's right.
    pub yaw: f64,
    /// Head roll (tilt) in degrees.
    pub roll: f64,
}

impl FaceFrame {
    /// A frontal face at the given position with open eyes and no smile.
    pub fn neutral(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            left_eye_open: Some(1.0),
            right_eye_open: Some(1.0),
            smiling: Some(0.0),
            yaw: 0.0,
            roll: 0.0,
        }
    }
}

/// The detector's full output for one video frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub faces: Vec<FaceFrame>,
    /// When the frame was captured, stamped by the producer.
    pub at: Timestamp,
}

impl FrameReport {
    pub fn new(faces: Vec<FaceFrame>, at: Timestamp) -> Self {
        Self { faces, at }
    }

    /// The single detected face, when the count is exactly one.
    pub fn sole_face(&self) -> Option<&FaceFrame> {
        match self.faces.as_slice() {
            [face] => Some(face),
            _ => None,
        }
    }
}
