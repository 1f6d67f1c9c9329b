use crate::foundation::{
    core::{Fps, FrameIndex, Rect, Size},
    error::{PlayerError, PlayerResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A parsed, immutable animation description.
///
/// A video item is produced by a [`crate::VideoParser`] and handed to the player wholesale. The
/// player never mutates it; loading a new animation replaces the whole item.
pub struct VideoItem {
    /// Native canvas size the sprites were authored against.
    pub canvas: Size,
    /// Target animation frame rate.
    pub fps: Fps,
    /// Number of frames in one loop. Must be `>= 1`.
    pub frame_count: u32,
    /// Sprite layers in draw order (later sprites draw over earlier ones).
    #[serde(default)]
    pub sprites: Vec<SpriteDescriptor>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// One visual layer of an animation.
pub struct SpriteDescriptor {
    /// Layer name used to look up dynamic image/text overrides.
    pub image_key: String,
    /// Optional key of a sprite used as this sprite's matte.
    #[serde(default)]
    pub matte_key: Option<String>,
    /// Per-frame state. May be shorter than the item's frame count; the renderer decides what a
    /// missing frame means.
    #[serde(default)]
    pub frames: Vec<SpriteFrame>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Sprite state at a single frame.
pub struct SpriteFrame {
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Layout box in canvas coordinates.
    #[serde(default = "default_layout")]
    pub layout: Rect,
    /// Row-major 2x3 affine `[a, b, c, d, tx, ty]`.
    #[serde(default = "default_transform")]
    pub transform: [f64; 6],
}

impl Default for SpriteFrame {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            layout: default_layout(),
            transform: default_transform(),
        }
    }
}

fn default_alpha() -> f64 {
    1.0
}

fn default_layout() -> Rect {
    Rect::ZERO
}

fn default_transform() -> [f64; 6] {
    [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
}

impl VideoItem {
    /// Build and validate a video item.
    pub fn new(
        canvas: Size,
        fps: f64,
        frame_count: u32,
        sprites: Vec<SpriteDescriptor>,
    ) -> PlayerResult<Self> {
        let item = Self {
            canvas,
            fps: Fps::new(fps)?,
            frame_count,
            sprites,
        };
        item.validate()?;
        Ok(item)
    }

    /// Check structural invariants the player relies on.
    pub fn validate(&self) -> PlayerResult<()> {
        if self.frame_count == 0 {
            return Err(PlayerError::validation("frame_count must be >= 1"));
        }
        Fps::new(self.fps.as_f64())?;
        let Size { width, height } = self.canvas;
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(PlayerError::validation(format!(
                "canvas must be finite and non-negative (got {width}x{height})"
            )));
        }
        Ok(())
    }

    /// Whether `frame` addresses a frame of this item.
    pub fn contains(&self, frame: FrameIndex) -> bool {
        frame.0 < self.frame_count
    }

    /// Last addressable frame.
    pub fn last_frame(&self) -> FrameIndex {
        FrameIndex(self.frame_count.saturating_sub(1))
    }

    /// Look up a sprite by its image key.
    pub fn sprite(&self, image_key: &str) -> Option<&SpriteDescriptor> {
        self.sprites.iter().find(|s| s.image_key == image_key)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/video_item.rs"]
mod tests;
