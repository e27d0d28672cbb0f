//! Time-driven property interpolation.
//!
//! Tweens are fire-and-forget: the stage advances them every frame and drops
//! finite ones when they complete. Repeat-forever tweens run until released.

use crate::handles::SpriteId;

/// Sprite property a tween drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    /// World X position
    X,
    /// World Y position
    Y,
    /// Uniform scale
    Scale,
    /// Rotation in radians
    Rotation,
    /// Opacity
    Alpha,
    /// Horizontal texture scroll of a tiled sprite
    TileX,
    /// Vertical texture scroll of a tiled sprite
    TileY,
}

/// Easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    /// Constant rate
    #[default]
    Linear,
    /// Sine ease in and out
    SineInOut,
    /// Quadratic ease out
    Power2Out,
}

impl Ease {
    /// Maps linear progress `t` in `0..=1` onto the curve.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
            Ease::Power2Out => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// How many times a tween plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Play once
    #[default]
    Once,
    /// Play `n` extra times
    Times(u32),
    /// Loop until released
    Forever,
}

/// Tween description.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    /// Sprite being animated
    pub target: SpriteId,
    /// Property being animated
    pub property: TweenProperty,
    /// End value
    pub to: f32,
    /// Duration of one forward pass in milliseconds
    pub duration_ms: f32,
    /// Wait before the first pass in milliseconds
    pub delay_ms: f32,
    /// Easing curve
    pub ease: Ease,
    /// Play backwards after each forward pass
    pub yoyo: bool,
    /// Repeat mode
    pub repeat: Repeat,
}

impl Tween {
    /// A single forward pass to `to` over `duration_ms`.
    #[must_use]
    pub fn to(target: SpriteId, property: TweenProperty, to: f32, duration_ms: f32) -> Self {
        Self {
            target,
            property,
            to,
            duration_ms,
            delay_ms: 0.0,
            ease: Ease::Linear,
            yoyo: false,
            repeat: Repeat::Once,
        }
    }

    /// Sets the easing curve.
    #[must_use]
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Plays backwards after each forward pass.
    #[must_use]
    pub fn yoyo(mut self) -> Self {
        self.yoyo = true;
        self
    }

    /// Sets the repeat mode.
    #[must_use]
    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Delays the start.
    #[must_use]
    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// A tween in flight.
#[derive(Debug, Clone)]
pub struct ActiveTween {
    tween: Tween,
    /// Captured when the delay elapses
    from: Option<f32>,
    elapsed_ms: f32,
    plays_left: Option<u32>,
}

/// Result of advancing a tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenStep {
    /// Still waiting out the delay
    Waiting,
    /// New property value; the tween continues
    Running(f32),
    /// Final property value; the tween is done
    Finished(f32),
}

impl ActiveTween {
    /// Starts a tween.
    #[must_use]
    pub fn new(tween: Tween) -> Self {
        let plays_left = match tween.repeat {
            Repeat::Once => Some(0),
            Repeat::Times(n) => Some(n),
            Repeat::Forever => None,
        };
        Self {
            tween,
            from: None,
            elapsed_ms: 0.0,
            plays_left,
        }
    }

    /// Tween description.
    #[must_use]
    pub const fn tween(&self) -> &Tween {
        &self.tween
    }

    /// Advances by `dt_ms`. `current` is the property's present value, used
    /// as the start value once the delay has elapsed.
    pub fn advance(&mut self, dt_ms: f32, current: f32) -> TweenStep {
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms < self.tween.delay_ms {
            return TweenStep::Waiting;
        }
        let from = *self.from.get_or_insert(current);

        let pass_ms = self.tween.duration_ms.max(f32::EPSILON);
        let cycle_ms = if self.tween.yoyo { pass_ms * 2.0 } else { pass_ms };
        let mut t = self.elapsed_ms - self.tween.delay_ms;

        while t >= cycle_ms {
            match self.plays_left {
                Some(0) => {
                    let end = if self.tween.yoyo { from } else { self.tween.to };
                    return TweenStep::Finished(end);
                },
                Some(ref mut n) => *n -= 1,
                None => {},
            }
            t -= cycle_ms;
            self.elapsed_ms -= cycle_ms;
        }

        let forward = if t <= pass_ms { t / pass_ms } else { 2.0 - t / pass_ms };
        let eased = self.tween.ease.apply(forward);
        TweenStep::Running(from + (self.tween.to - from) * eased)
    }
}
