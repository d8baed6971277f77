//! Editor tunables.

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Editor configuration. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of history entries, baseline included.
    pub history_limit: usize,
    /// Offset applied to duplicated and pasted shapes, on both axes.
    pub paste_offset: f64,
    pub default_safe_area: Size,
    /// Tween length used when a shape has no animation record.
    pub default_tween_duration: f64,
    /// Length of the "jump to keyframe values" tween.
    pub instant_tween_duration: f64,
    /// Frames to wait for renderer nodes before giving up.
    pub ready_poll_frames: u32,
    /// Attempts per frame when capturing a bitmap fails transiently.
    pub frame_capture_retries: u32,
    pub default_fps: u32,
    pub autosave_interval_secs: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 1000,
            paste_offset: 20.0,
            default_safe_area: Size::new(1080.0, 1080.0),
            default_tween_duration: 0.5,
            instant_tween_duration: 0.001,
            ready_poll_frames: 120,
            frame_capture_retries: 3,
            default_fps: 30,
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
