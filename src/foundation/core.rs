use crate::foundation::error::{PlayerError, PlayerResult};

pub use kurbo::{Affine, Rect, Size, Vec2};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

impl FrameIndex {
    pub const ZERO: Self = Self(0);

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Animation frame rate as declared by the video item.
///
/// Kept as a float because source files may declare fractional rates; construction rejects
/// anything that is not finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Fps(f64);

impl Fps {
    pub fn new(fps: f64) -> PlayerResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(PlayerError::validation(format!(
                "fps must be finite and > 0 (got {fps})"
            )));
        }
        Ok(Self(fps))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Whole milliseconds per animation frame, truncated.
    pub fn frame_interval_ms(self) -> f64 {
        (1000.0 / self.0).floor()
    }

    /// Slack subtracted from every re-armed deadline (two host ticks scaled to this rate).
    pub fn catch_up_ms(self) -> f64 {
        (60.0 / self.0) * 2.0
    }
}

impl TryFrom<f64> for Fps {
    type Error = PlayerError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}

impl From<Fps> for f64 {
    fn from(v: Fps) -> Self {
        v.0
    }
}

/// Caller-chosen destination rectangle in host coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TargetFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TargetFrame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn is_degenerate(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
