//! # Xytopia Common
//!
//! Shared types used across the Xytopia crates:
//! - 2D vector and rectangle math
//! - Tile/world coordinate conversion
//! - Common error type
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod math;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::math::*;
}

pub use prelude::*;
