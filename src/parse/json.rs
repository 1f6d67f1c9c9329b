//! JSON video-item parser.
//!
//! Reads a video item serialized with Serde (the same shape as [`VideoItem`]) from a file or
//! in-memory bytes. Binary animation archives are out of scope; hosts plug their own
//! [`VideoParser`] for those.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    foundation::error::{PlayerError, PlayerResult},
    model::video_item::VideoItem,
    player::collab::{LoadReply, LoadSource, VideoParser},
};

/// Parses [`LoadSource::Path`] and [`LoadSource::Bytes`] synchronously and replies before
/// returning. URLs are rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonVideoParser;

impl JsonVideoParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse and validate a video item from JSON bytes.
    pub fn parse_bytes(bytes: &[u8]) -> PlayerResult<VideoItem> {
        let item: VideoItem = serde_json::from_slice(bytes)
            .map_err(|e| PlayerError::parse(format!("video item JSON: {e}")))?;
        item.validate()?;
        Ok(item)
    }

    /// Parse and validate a video item from a JSON file.
    pub fn parse_file(path: &Path) -> PlayerResult<VideoItem> {
        let f = File::open(path).with_context(|| format!("open video item '{}'", path.display()))?;
        let item: VideoItem = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| PlayerError::parse(format!("'{}': {e}", path.display())))?;
        item.validate()?;
        Ok(item)
    }
}

impl VideoParser for JsonVideoParser {
    fn parse(&self, source: LoadSource, reply: LoadReply) {
        let result = match &source {
            LoadSource::Path(p) => Self::parse_file(p),
            LoadSource::Bytes(b) => Self::parse_bytes(b),
            LoadSource::Url(u) => Err(PlayerError::parse(format!(
                "JSON parser cannot fetch '{u}'"
            ))),
        };
        reply.send(result);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/parse/json.rs"]
mod tests;
