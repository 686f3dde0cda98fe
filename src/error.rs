//! Construction-time configuration errors.
//!
//! Everything in this crate is total once built: sampling, collision and
//! integration never fail. The only failure surface is a bad configuration
//! handed to a constructor, reported here so it can be caught at load time
//! instead of silently producing degenerate terrain.

use thiserror::Error;

/// A rejected terrain, collision or body configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("world size must be finite and positive (got {0})")]
    InvalidSize(f64),

    #[error("invalid biome profile `{profile}`: {reason}")]
    InvalidProfile {
        profile: String,
        reason: &'static str,
    },

    #[error("feature {index} is invalid: {reason}")]
    InvalidFeature { index: usize, reason: &'static str },

    #[error("collision sphere {index} is invalid: {reason}")]
    InvalidSphere { index: usize, reason: &'static str },

    #[error("invalid body config: {0}")]
    InvalidBody(&'static str),
}
