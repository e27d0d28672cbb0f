//! Scene director: owns the running scene and switches between scenes.
//!
//! Every switch tears the old scene down, releases whatever it still holds
//! and builds the new one from scratch, so repeated visits never accumulate
//! sprites, bodies, tweens, timers or listeners.

use tracing::{debug, info, warn};
use xytopia_common::{XytopiaError, XytopiaResult};
use xytopia_kernel::{ResourceCounts, Stage};

use crate::events::SignalBus;
use crate::input::Input;
use crate::scenes::{
    AssetManifest, Scene, SceneCommand, SceneContext, SceneKey, WelcomeScene, WorldScene,
};
use crate::settings::GameSettings;

/// Record of a scene switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTransition {
    /// Scene left
    pub from: SceneKey,
    /// Scene entered
    pub to: SceneKey,
}

/// Runs one scene at a time.
#[derive(Debug)]
pub struct SceneDirector {
    ctx: SceneContext,
    current: Box<dyn Scene>,
    history: Vec<SceneTransition>,
    max_history: usize,
}

fn build(key: SceneKey) -> Box<dyn Scene> {
    match key {
        SceneKey::Welcome => Box::new(WelcomeScene::new()),
        SceneKey::World => Box::new(WorldScene::new()),
    }
}

impl SceneDirector {
    /// Creates a director and starts the Welcome scene.
    pub fn new(
        stage: Box<dyn Stage>,
        signals: SignalBus,
        settings: GameSettings,
    ) -> XytopiaResult<Self> {
        Self::starting_at(stage, signals, settings, SceneKey::Welcome)
    }

    /// Creates a director and starts `first` directly.
    pub fn starting_at(
        stage: Box<dyn Stage>,
        signals: SignalBus,
        settings: GameSettings,
        first: SceneKey,
    ) -> XytopiaResult<Self> {
        let ctx = SceneContext::new(stage, signals, settings);
        let mut director = Self {
            ctx,
            current: build(first),
            history: Vec::new(),
            max_history: 50,
        };
        director.enter()?;
        Ok(director)
    }

    /// Key of the running scene.
    #[must_use]
    pub fn current(&self) -> SceneKey {
        self.current.key()
    }

    /// The running scene, for inspection.
    #[must_use]
    pub fn scene(&self) -> &dyn Scene {
        self.current.as_ref()
    }

    /// Shared context.
    #[must_use]
    pub const fn context(&self) -> &SceneContext {
        &self.ctx
    }

    /// Past switches, oldest first.
    #[must_use]
    pub fn history(&self) -> &[SceneTransition] {
        &self.history
    }

    /// Live resources across stage and physics.
    #[must_use]
    pub fn counts(&self) -> ResourceCounts {
        self.ctx.counts()
    }

    /// Runs one fixed step: the scene tick, then stage tweens and timers.
    pub fn tick(&mut self, raw: &Input, dt: f32) -> XytopiaResult<SceneCommand> {
        let input = raw.gated(self.ctx.stage.as_ref());
        let command = self.current.tick(&mut self.ctx, &input, dt)?;
        self.ctx.stage.advance(dt);
        self.ctx.time_ms += dt * 1000.0;

        if let SceneCommand::Switch(target) = command {
            self.switch_to(target)?;
        }
        Ok(command)
    }

    /// Switches scene, rejecting transitions the current scene does not allow.
    pub fn switch_to(&mut self, target: SceneKey) -> XytopiaResult<()> {
        let from = self.current();
        if !from.can_transition_to(target) {
            warn!(%from, to = %target, "Rejected scene switch");
            return Err(XytopiaError::Scene(format!(
                "invalid transition from {from} to {target}"
            )));
        }
        self.replace(target)
    }

    /// Tears down whatever is running and starts a fresh World.
    pub fn restart_world(&mut self) -> XytopiaResult<()> {
        self.replace(SceneKey::World)
    }

    /// Tears down the running scene and releases its resources.
    pub fn shutdown(&mut self) {
        self.leave();
    }

    fn replace(&mut self, target: SceneKey) -> XytopiaResult<()> {
        let from = self.current();
        self.leave();
        self.current = build(target);
        self.history.push(SceneTransition { from, to: target });
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }
        info!(%from, to = %target, "Scene switch");
        self.enter()
    }

    fn enter(&mut self) -> XytopiaResult<()> {
        let mut manifest = AssetManifest::default();
        self.current.prepare_assets(&mut manifest);
        self.ctx.load(&manifest);
        self.ctx.time_ms = 0.0;
        self.current.initialize(&mut self.ctx)
    }

    fn leave(&mut self) {
        self.current.teardown(&mut self.ctx);
        let released = self.ctx.release_scene_resources();
        debug!(scene = %self.current(), released, "Scene torn down");
    }
}
