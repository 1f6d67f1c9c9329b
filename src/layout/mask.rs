//! Clip masking for the player surface.

use crate::foundation::core::{Rect, TargetFrame};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Rectangular clip in content-local coordinates (origin at `0,0`).
pub struct MaskDescriptor {
    /// Clip width, tracks the target frame width.
    pub width: f64,
    /// Clip height, tracks the target frame height.
    pub height: f64,
}

impl MaskDescriptor {
    /// Clip rectangle `[0, 0, width, height]`.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn same_size(self, frame: TargetFrame) -> bool {
        self.width == frame.width && self.height == frame.height
    }
}

/// Decide the clip for the next render pass.
///
/// Returns `None` when clipping is off. When it is on and `previous` already has the frame's
/// size, `previous` is returned as-is so callers can skip rebuilding the clip shape.
pub fn compute_mask(
    clips_to_bounds: bool,
    frame: TargetFrame,
    previous: Option<MaskDescriptor>,
) -> Option<MaskDescriptor> {
    if !clips_to_bounds {
        return None;
    }
    match previous {
        Some(prev) if prev.same_size(frame) => Some(prev),
        _ => Some(MaskDescriptor {
            width: frame.width,
            height: frame.height,
        }),
    }
}

/// Whether `next` differs from `previous` enough to require rebuilding the host clip shape.
pub fn mask_changed(previous: Option<MaskDescriptor>, next: Option<MaskDescriptor>) -> bool {
    previous != next
}

#[cfg(test)]
#[path = "../../tests/unit/layout/mask.rs"]
mod tests;
