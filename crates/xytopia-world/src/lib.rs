//! # Xytopia World
//!
//! The tile world the avatar explores.
//!
//! This crate handles:
//! - The occupancy grid (`Empty` / `Solid` cells)
//! - Procedural terrain generation (road, crust, rolling underground, caves, islands)
//! - Seedable random sources
//! - Block-variant classification and static tile placement

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod generation;
pub mod grid;
pub mod random;
pub mod tiles;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::generation::*;
    pub use crate::grid::*;
    pub use crate::random::*;
    pub use crate::tiles::*;
}

pub use prelude::*;
