//! Error types for Xytopia.

use thiserror::Error;

/// Top-level error type for Xytopia operations.
#[derive(Debug, Error)]
pub enum XytopiaError {
    /// World configuration or generation errors
    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// Engine surface errors
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    /// Scene lifecycle errors
    #[error("Scene error: {0}")]
    Scene(String),
}

/// World grid and generator errors.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Grid dimensions cannot hold road, crust and bedrock bands
    #[error("world of {width}x{height} tiles is too small (need at least {min_height} rows)")]
    InvalidDimensions {
        /// Requested width in tiles
        width: usize,
        /// Requested height in tiles
        height: usize,
        /// Minimum height the generator needs
        min_height: usize,
    },

    /// A generator probability was outside 0..=1
    #[error("probability `{name}` = {value} is outside 0..=1")]
    InvalidProbability {
        /// Config field name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A min/max range was inverted
    #[error("range `{name}` has min {min} > max {max}")]
    InvalidRange {
        /// Config field name
        name: &'static str,
        /// Range minimum
        min: usize,
        /// Range maximum
        max: usize,
    },
}

/// Engine surface (stage, physics) errors.
#[derive(Debug, Error)]
pub enum StageError {
    /// Handle does not refer to a live resource
    #[error("unknown {kind} handle #{id}")]
    UnknownHandle {
        /// Resource kind name
        kind: &'static str,
        /// Raw handle id
        id: u32,
    },

    /// Texture was not declared by the scene's asset manifest
    #[error("texture `{0}` was not prepared")]
    MissingTexture(String),
}

/// Result type alias for Xytopia operations.
pub type XytopiaResult<T> = Result<T, XytopiaError>;
