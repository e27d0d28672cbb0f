//! Typed handles for engine-owned resources.

use std::fmt;

/// Kind of engine resource a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Image or text object
    Sprite,
    /// Physics body (static or dynamic)
    Body,
    /// Property interpolation
    Tween,
    /// Periodic timer
    Timer,
    /// Input listener registration
    Listener,
}

impl ResourceKind {
    /// Lowercase name for logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sprite => "sprite",
            Self::Body => "body",
            Self::Tween => "tween",
            Self::Timer => "timer",
            Self::Listener => "listener",
        }
    }
}

/// Untyped handle, used where resources of mixed kinds are tracked together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    /// Resource kind
    pub kind: ResourceKind,
    /// Raw id, unique per kind
    pub id: u32,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.name(), self.id)
    }
}

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Raw id.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl From<$name> for Handle {
            fn from(value: $name) -> Self {
                Handle {
                    kind: ResourceKind::$kind,
                    id: value.0,
                }
            }
        }
    };
}

typed_handle!(
    /// Handle to a sprite or text object.
    SpriteId => Sprite
);
typed_handle!(
    /// Handle to a physics body.
    BodyId => Body
);
typed_handle!(
    /// Handle to a running tween.
    TweenId => Tween
);
typed_handle!(
    /// Handle to a periodic timer.
    TimerId => Timer
);
typed_handle!(
    /// Handle to an input listener registration.
    ListenerId => Listener
);

/// Live resource counts, used to check that scene teardown leaks nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    /// Live sprites and text objects
    pub sprites: usize,
    /// Live physics bodies
    pub bodies: usize,
    /// Running tweens
    pub tweens: usize,
    /// Active timers
    pub timers: usize,
    /// Registered input listeners
    pub listeners: usize,
}

impl ResourceCounts {
    /// Sum of all counts.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.sprites + self.bodies + self.tweens + self.timers + self.listeners
    }
}

/// Allocates increasing ids per resource kind.
#[derive(Debug, Default, Clone)]
pub(crate) struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> u32 {
        self.next = self.next.wrapping_add(1);
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_handle_converts() {
        let handle: Handle = TweenId(7).into();
        assert_eq!(handle.kind, ResourceKind::Tween);
        assert_eq!(handle.id, 7);
        assert_eq!(handle.to_string(), "tween#7");
    }

    #[test]
    fn test_ids_start_at_one() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next(), 1);
        assert_eq!(ids.next(), 2);
    }
}
