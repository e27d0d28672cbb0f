//! # Xytopia Gameplay
//!
//! Everything the visitor interacts with:
//! - Input mapping (arrows and A/D/W, Enter/Space, `P`, zoom keys, wheel, pointer)
//! - The composed avatar and its controller
//! - The follow camera with clamped zoom
//! - The shell signal bus
//! - Welcome and World scenes and the scene director

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod avatar;
pub mod camera_rig;
pub mod director;
pub mod events;
pub mod input;
pub mod scenes;
pub mod settings;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::avatar::*;
    pub use crate::camera_rig::*;
    pub use crate::director::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::scenes::*;
    pub use crate::settings::*;
}

pub use prelude::*;
