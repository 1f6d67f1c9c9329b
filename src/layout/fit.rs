//! Content fitting: maps the animation canvas into a caller-chosen target frame.

use crate::foundation::{
    core::{Affine, Size, TargetFrame},
    error::{PlayerError, PlayerResult},
};

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
/// Policy for fitting content into a target frame.
pub enum ContentMode {
    /// Stretch each axis independently to the frame size.
    Fill,
    /// Uniform scale so the whole content is visible, centered on the cross axis.
    #[default]
    AspectFit,
    /// Uniform scale so the frame is fully covered, centered on the cross axis.
    AspectFill,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Scale + translate produced by [`fit`]. Recomputed on every render pass.
pub struct FitTransform {
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// Horizontal translation, including the target frame's origin.
    pub translate_x: f64,
    /// Vertical translation, including the target frame's origin.
    pub translate_y: f64,
}

impl Default for FitTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FitTransform {
    /// No scaling, no translation.
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Equivalent [`Affine`] (`scale` then `translate`).
    pub fn to_affine(self) -> Affine {
        Affine::new([
            self.scale_x,
            0.0,
            0.0,
            self.scale_y,
            self.translate_x,
            self.translate_y,
        ])
    }

    /// Size of `content` once this transform is applied.
    pub fn scaled_size(self, content: Size) -> Size {
        Size::new(content.width * self.scale_x, content.height * self.scale_y)
    }
}

/// Compute the transform that places `content` inside `frame` according to `mode`.
///
/// Fails with [`PlayerError::InvalidGeometry`] when the content has a zero (or non-finite)
/// dimension. A degenerate target frame is legal: `Fill` scales to zero on the empty axis. The
/// aspect modes scale to zero when one side is zero, and fall back to an identity scale anchored
/// at the frame origin when both are.
pub fn fit(content: Size, frame: TargetFrame, mode: ContentMode) -> PlayerResult<FitTransform> {
    if !(content.width.is_finite() && content.height.is_finite())
        || content.width <= 0.0
        || content.height <= 0.0
    {
        return Err(PlayerError::invalid_geometry(format!(
            "content size must be positive (got {}x{})",
            content.width, content.height
        )));
    }

    let (scale_x, scale_y, tx, ty) = match mode {
        ContentMode::Fill => (
            frame.width / content.width,
            frame.height / content.height,
            0.0,
            0.0,
        ),
        ContentMode::AspectFit | ContentMode::AspectFill => {
            let content_ratio = content.width / content.height;
            // 0x0 has no ratio; a single zero side yields 0 or infinity and scales to zero.
            let frame_ratio = frame.width / frame.height;
            if frame_ratio.is_nan() {
                return Ok(FitTransform {
                    translate_x: frame.x,
                    translate_y: frame.y,
                    ..FitTransform::IDENTITY
                });
            }
            let match_width = match mode {
                ContentMode::AspectFit => content_ratio >= frame_ratio,
                _ => content_ratio <= frame_ratio,
            };
            if match_width {
                let scale = frame.width / content.width;
                (scale, scale, 0.0, (frame.height - content.height * scale) / 2.0)
            } else {
                let scale = frame.height / content.height;
                (scale, scale, (frame.width - content.width * scale) / 2.0, 0.0)
            }
        }
    };

    let out = FitTransform {
        scale_x,
        scale_y,
        translate_x: frame.x + tx,
        translate_y: frame.y + ty,
    };
    if ![out.scale_x, out.scale_y, out.translate_x, out.translate_y]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(PlayerError::invalid_geometry("fit produced non-finite values"));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
