//! Engine error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::sprite::SpriteId;

/// Errors reported by the sprite world
///
/// Geometry is never an error: degenerate rectangles are clamped to zero
/// size and become collision-inert.
#[derive(Debug, Error)]
pub enum SpriteError {
    /// The handle does not name a live sprite (removed, or invalidated by a world reset)
    #[error("Invalid sprite handle: {0:?}")]
    InvalidHandle(SpriteId),

    /// The world configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Loading or saving a configuration file failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type used throughout the engine
pub type SpriteResult<T> = Result<T, SpriteError>;
