//! Challenge thresholds and timings.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LivenessConfig {
    /// Eye-open probability below which an eye counts as closed.
    #[serde(default = "default_eye_closed_threshold")]
    pub eye_closed_threshold: f64,
    #[serde(default = "default_blinks_required")]
    pub blinks_required: u32,
    /// Window for completing all required blinks.
    #[serde(default = "default_blink_timeout_ms")]
    pub blink_timeout_ms: u64,
    /// Hold after the face first centers, so a passing face does not
    /// start the challenge.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Yaw magnitude in degrees that counts as a head turn.
    #[serde(default = "default_turn_yaw_deg")]
    pub turn_yaw_deg: f64,
    /// How long a turn must be held without interruption.
    #[serde(default = "default_turn_hold_ms")]
    pub turn_hold_ms: u64,
    #[serde(default = "default_smile_threshold")]
    pub smile_threshold: f64,
    /// Pose limits for the final photograph.
    #[serde(default = "default_capture_max_yaw_deg")]
    pub capture_max_yaw_deg: f64,
    #[serde(default = "default_capture_max_roll_deg")]
    pub capture_max_roll_deg: f64,
    /// Fraction of the center box left as margin on every edge.
    #[serde(default = "default_center_margin")]
    pub center_margin: f64,
    /// Depth of the frame queue feeding the service loop.
    #[serde(default = "default_frame_channel_capacity")]
    pub frame_channel_capacity: usize,
}

fn default_eye_closed_threshold() -> f64 {
    0.35
}

fn default_blinks_required() -> u32 {
    3
}

fn default_blink_timeout_ms() -> u64 {
    15_000
}

fn default_settle_ms() -> u64 {
    500
}

fn default_turn_yaw_deg() -> f64 {
    20.0
}

fn default_turn_hold_ms() -> u64 {
    1_000
}

fn default_smile_threshold() -> f64 {
    0.7
}

fn default_capture_max_yaw_deg() -> f64 {
    10.0
}

fn default_capture_max_roll_deg() -> f64 {
    10.0
}

fn default_center_margin() -> f64 {
    0.15
}

fn default_frame_channel_capacity() -> usize {
    32
}

impl Default for LivenessConfig {
    fn default() -> Self {
        LivenessConfig {
            eye_closed_threshold: default_eye_closed_threshold(),
            blinks_required: default_blinks_required(),
            blink_timeout_ms: default_blink_timeout_ms(),
            settle_ms: default_settle_ms(),
            turn_yaw_deg: default_turn_yaw_deg(),
            turn_hold_ms: default_turn_hold_ms(),
            smile_threshold: default_smile_threshold(),
            capture_max_yaw_deg: default_capture_max_yaw_deg(),
            capture_max_roll_deg: default_capture_max_roll_deg(),
            center_margin: default_center_margin(),
            frame_channel_capacity: default_frame_channel_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_challenge_tuning() {
        let config = LivenessConfig::default();
        assert_eq!(config.eye_closed_threshold, 0.35);
        assert_eq!(config.blinks_required, 3);
        assert_eq!(config.blink_timeout_ms, 15_000);
        assert_eq!(config.settle_ms, 500);
        assert_eq!(config.turn_yaw_deg, 20.0);
        assert_eq!(config.turn_hold_ms, 1_000);
        assert_eq!(config.smile_threshold, 0.7);
        assert_eq!(config.center_margin, 0.15);
    }
}
