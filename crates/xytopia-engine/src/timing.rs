//! Fixed-timestep accumulator for the frame loop.

/// Most fixed updates run for a single frame.
const MAX_UPDATES_PER_FRAME: u32 = 10;

/// Splits variable frame deltas into fixed simulation steps.
#[derive(Debug, Clone)]
pub struct FixedStep {
    /// Fixed timestep delta in seconds
    fixed_dt: f32,
    /// Maximum frame delta accepted, to prevent a spiral of death
    max_dt: f32,
    /// Unsimulated time carried between frames
    accumulator: f32,
    /// Fixed updates run so far
    total_steps: u64,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl FixedStep {
    /// Create an accumulator stepping `fixed_dt` seconds at a time.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt: fixed_dt.max(0.001),
            max_dt: 0.25,
            accumulator: 0.0,
            total_steps: 0,
        }
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Accumulate a frame delta.
    /// Returns the number of fixed updates that should be performed.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, self.max_dt);
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_UPDATES_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind after the cap: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        self.total_steps += u64::from(count);
        count
    }

    /// Fraction of a step left in the accumulator, for interpolation.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.fixed_dt
    }

    /// Fixed updates run since creation or the last reset.
    #[must_use]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Reset timing (after the view changes).
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
