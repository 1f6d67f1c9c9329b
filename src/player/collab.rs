//! Collaborator seams: parsing, layer rendering and the host display surface.

use std::path::PathBuf;
use std::sync::mpsc;

use crate::{
    foundation::{
        core::{Affine, FrameIndex},
        error::PlayerError,
    },
    layout::mask::MaskDescriptor,
    model::video_item::{SpriteDescriptor, VideoItem},
    overrides::store::LayerOverrides,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Opaque handle to a layer materialized by a [`Renderer`].
pub struct LayerHandle(pub u64);

/// Turns sprite descriptors into layers and paints frames.
pub trait Renderer {
    /// Materialize a layer for `sprite`, merging in any overrides for its key.
    ///
    /// Called once per sprite, in draw order, every time the player rebuilds its layers.
    fn request_layer(&mut self, sprite: &SpriteDescriptor, overrides: LayerOverrides<'_>)
    -> LayerHandle;

    /// Paint every current layer at `frame`.
    fn draw_frame(&mut self, frame: FrameIndex);
}

/// Drawable container the player owns while attached.
pub trait DisplaySurface {
    /// Drop every child layer.
    fn remove_all_layers(&mut self);

    /// Append a child layer on top of the existing ones.
    fn add_layer(&mut self, layer: LayerHandle);

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Replace the content transform.
    fn set_transform(&mut self, transform: Affine);

    /// Install or remove the clip. Only called when the clip actually changes.
    fn set_mask(&mut self, mask: Option<MaskDescriptor>);

    /// Whether the surface is attached to a live display (repaints are skipped otherwise).
    fn is_attached(&self) -> bool {
        true
    }

    /// Ask the host to repaint.
    fn request_repaint(&mut self) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Where a parser should read an animation from.
pub enum LoadSource {
    /// Local file.
    Path(PathBuf),
    /// URL or other locator the parser understands.
    Url(String),
    /// In-memory bytes.
    Bytes(Vec<u8>),
}

impl From<PathBuf> for LoadSource {
    fn from(v: PathBuf) -> Self {
        Self::Path(v)
    }
}

impl From<&str> for LoadSource {
    fn from(v: &str) -> Self {
        Self::Url(v.to_owned())
    }
}

impl From<Vec<u8>> for LoadSource {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifies one [`crate::Player::load`] call.
pub struct LoadId(pub u64);

/// Completed load, waiting to be applied by [`crate::Player::poll_loads`].
#[derive(Debug)]
pub struct LoadCompletion {
    /// Load this result belongs to.
    pub id: LoadId,
    /// Parsed item or failure reason.
    pub result: Result<VideoItem, PlayerError>,
}

/// One-shot reply channel handed to a [`VideoParser`].
///
/// The parser may reply from any thread, immediately or later. Dropping the reply without
/// answering leaves the load pending forever.
#[derive(Debug)]
pub struct LoadReply {
    id: LoadId,
    tx: mpsc::Sender<LoadCompletion>,
}

impl LoadReply {
    pub(crate) fn new(id: LoadId, tx: mpsc::Sender<LoadCompletion>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> LoadId {
        self.id
    }

    /// Deliver a parsed item.
    pub fn succeed(self, item: VideoItem) {
        self.send(Ok(item));
    }

    /// Deliver a failure.
    pub fn fail(self, err: PlayerError) {
        self.send(Err(err));
    }

    /// Deliver either outcome.
    pub fn send(self, result: Result<VideoItem, PlayerError>) {
        // The player may already be gone; nothing is waiting then.
        let _ = self.tx.send(LoadCompletion {
            id: self.id,
            result,
        });
    }
}

/// Parses animation sources into [`VideoItem`]s.
pub trait VideoParser {
    /// Start parsing `source`; answer exactly once through `reply`.
    fn parse(&self, source: LoadSource, reply: LoadReply);
}
