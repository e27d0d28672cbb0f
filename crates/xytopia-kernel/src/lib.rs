//! # Xytopia Kernel
//!
//! The engine capability surface the scenes are written against.
//!
//! - `Stage`: sprites, text, tweens, timers and input listeners, addressed
//!   through typed handles
//! - `HeadlessStage`: in-memory stage driven by `advance(dt)`
//! - `ArcadePhysics`: gravity, static tile bodies, dynamic AABB bodies
//! - `Camera`: follow/zoom/bounds and screen-world transforms

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod camera;
pub mod handles;
pub mod physics;
pub mod stage;
pub mod tween;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::camera::*;
    pub use crate::handles::*;
    pub use crate::physics::*;
    pub use crate::stage::*;
    pub use crate::tween::*;
}

pub use prelude::*;
