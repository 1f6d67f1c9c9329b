/// Convenience result type used across spriteplay.
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Error taxonomy used by the player and its pure helpers.
///
/// Only [`PlayerError::Parse`] and [`PlayerError::Validation`] ever reach callers, through the
/// player's error hook. The remaining variants are absorbed at the player boundary and logged.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// The parser collaborator could not produce a video item.
    #[error("parse error: {0}")]
    Parse(String),

    /// A video item or configuration value is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Content fitting would divide by zero or produce non-finite values.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A seek target outside `[0, frame_count)`.
    #[error("seek out of range: frame {frame} not in [0, {frame_count})")]
    OutOfRangeSeek {
        /// Requested frame.
        frame: i64,
        /// Frame count of the loaded item.
        frame_count: u32,
    },

    /// An image override transform that is not exactly six components.
    #[error("invalid override transform: expected 6 components, got {0}")]
    InvalidOverrideTransform(usize),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlayerError {
    /// Build a [`PlayerError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`PlayerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlayerError::InvalidGeometry`] value.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
