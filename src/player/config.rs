use crate::{foundation::core::TargetFrame, layout::fit::ContentMode};

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
/// What stays on screen after a finite loop count runs out without clearing.
pub enum FillMode {
    /// Keep the frame the sequence ended on.
    #[default]
    Forward,
    /// Rewind to the first frame.
    Backward,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
/// Player behavior settings.
pub struct PlayerConfig {
    /// Loop limit; `0` loops forever.
    pub loops: u32,
    /// Hide the surface when playback stops unless the caller says otherwise.
    pub clears_after_stop: bool,
    /// End-of-sequence behavior when not clearing.
    pub fill_mode: FillMode,
    /// Content fitting policy.
    pub content_mode: ContentMode,
    /// Clip content to the target frame size.
    pub clips_to_bounds: bool,
    /// Destination rectangle.
    pub frame: TargetFrame,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            loops: 0,
            clears_after_stop: true,
            fill_mode: FillMode::Forward,
            content_mode: ContentMode::AspectFit,
            clips_to_bounds: false,
            frame: TargetFrame::default(),
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON config document. Missing fields take defaults.
    pub fn from_json(s: &str) -> crate::PlayerResult<Self> {
        serde_json::from_str(s).map_err(|e| crate::PlayerError::validation(format!("config: {e}")))
    }
}
