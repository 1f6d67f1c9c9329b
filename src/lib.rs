//! spriteplay drives playback of frame-based sprite animations.
//!
//! A parsed animation ([`VideoItem`]) is handed to a [`Player`], which paces frame advances off a
//! host tick source, fits the animation canvas into a caller-chosen [`TargetFrame`], optionally
//! clips it, and delegates drawing to a host [`Renderer`] before notifying observers.
//!
//! # Pieces
//!
//! 1. **Fit**: `canvas + target frame + ContentMode -> FitTransform` ([`fit`])
//! 2. **Mask**: `clips_to_bounds + target frame -> Option<MaskDescriptor>` ([`compute_mask`])
//! 3. **Clock**: host ticks -> frame advances, loop counting, termination ([`PlaybackClock`])
//! 4. **Overrides**: per-layer image/text substitutions ([`DynamicOverrideStore`])
//! 5. **Player**: load/play/pause/stop/seek plus the `on_*` hooks ([`Player`])
//!
//! The parser, renderer, display surface and tick source are collaborators supplied by the host
//! through the traits in this crate. [`JsonVideoParser`] and [`SharedTicker`] are small
//! reference implementations.
#![forbid(unsafe_code)]

mod foundation;
mod layout;
mod model;
mod overrides;
mod parse;
mod playback;
mod player;

pub use foundation::core::{Affine, Fps, FrameIndex, Rect, Size, TargetFrame, Vec2};
pub use foundation::error::{PlayerError, PlayerResult};
pub use layout::fit::{ContentMode, FitTransform, fit};
pub use layout::mask::{MaskDescriptor, compute_mask, mask_changed};
pub use model::video_item::{SpriteDescriptor, SpriteFrame, VideoItem};
pub use overrides::store::{
    DEFAULT_TEXT_COLOR, DEFAULT_TEXT_SIZE, DynamicOverrideStore, ImageSource, LayerOverrides,
    TextInput, TextStyle, TextStyleInput,
};
pub use parse::json::JsonVideoParser;
pub use playback::clock::{
    ClockPhase, ClockTiming, PlaybackClock, PlaybackState, TickOutcome, frame_for_fraction,
};
pub use playback::ticker::{HOST_TICK_HZ, SharedTicker, TickSource, TickSubscription};
pub use player::collab::{
    DisplaySurface, LayerHandle, LoadCompletion, LoadId, LoadReply, LoadSource, Renderer,
    VideoParser,
};
pub use player::config::{FillMode, PlayerConfig};
pub use player::controller::Player;
