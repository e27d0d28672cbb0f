//! Scene lifecycle and the per-scene resource ledger.
//!
//! A scene declares its textures, builds itself on a [`SceneContext`], is
//! ticked once per fixed step and finally tears down. Everything it
//! acquires through the context is recorded in [`SceneResources`] so the
//! director can release it all on exit, whatever the scene forgot.

mod welcome;
mod world;

pub use welcome::{ButtonAction, WelcomeScene};
pub use world::WorldScene;

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;
use xytopia_common::{StageError, TileCoord, Vec2, XytopiaResult};
use xytopia_world::WorldGrid;
use xytopia_kernel::{
    ArcadePhysics, BodyId, Handle, ListenerId, ListenerKind, ResourceCounts, SpriteDesc,
    SpriteId, Stage, TimerId, Tween, TweenId,
};

use crate::events::{ShellSignal, SignalBus};
use crate::input::Input;
use crate::settings::GameSettings;

/// Scene identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    /// Title screen
    Welcome,
    /// Explorable tile world
    World,
}

impl SceneKey {
    /// Returns display name for the scene.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::World => "World",
        }
    }

    /// Returns scenes this scene may switch to.
    #[must_use]
    pub const fn valid_transitions(self) -> &'static [SceneKey] {
        match self {
            Self::Welcome => &[Self::World],
            Self::World => &[Self::World],
        }
    }

    /// Checks if switching to `target` is allowed.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.valid_transitions().contains(&target)
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What a scene wants after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    /// Keep running
    Stay,
    /// Tear down and start another scene
    Switch(SceneKey),
}

/// Textures a scene needs prepared before it initializes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    textures: BTreeSet<String>,
}

impl AssetManifest {
    /// Declares a texture.
    pub fn texture(&mut self, key: &str) -> &mut Self {
        self.textures.insert(key.to_string());
        self
    }

    /// Declared textures, sorted.
    pub fn textures(&self) -> impl Iterator<Item = &str> {
        self.textures.iter().map(String::as_str)
    }

    /// Whether `key` was declared.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.textures.contains(key)
    }
}

/// Handles acquired by the running scene.
#[derive(Debug, Default)]
pub struct SceneResources {
    handles: Vec<Handle>,
    bodies: Vec<BodyId>,
}

impl SceneResources {
    /// Records a stage handle.
    pub fn track(&mut self, handle: impl Into<Handle>) {
        self.handles.push(handle.into());
    }

    /// Records a physics body.
    pub fn track_body(&mut self, body: BodyId) {
        self.bodies.push(body);
    }

    /// Number of recorded handles and bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len() + self.bodies.len()
    }

    /// Whether nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases everything, newest first. Returns how many resources were
    /// still live.
    pub fn release_all(&mut self, stage: &mut dyn Stage, physics: &mut ArcadePhysics) -> usize {
        let mut released = 0;
        for handle in self.handles.drain(..).rev() {
            released += usize::from(stage.release(handle));
        }
        for body in self.bodies.drain(..).rev() {
            released += usize::from(physics.release(body));
        }
        released
    }
}

/// Everything a scene can touch.
pub struct SceneContext {
    /// Rendering and scheduling surface
    pub stage: Box<dyn Stage>,
    /// Physics world
    pub physics: ArcadePhysics,
    /// Outbound shell signals
    pub signals: SignalBus,
    /// Session random source
    pub rng: fastrand::Rng,
    /// Gameplay settings
    pub settings: GameSettings,
    /// Game time since the current scene started, in milliseconds
    pub time_ms: f32,
    resources: SceneResources,
}

impl fmt::Debug for SceneContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneContext")
            .field("counts", &self.counts())
            .field("time_ms", &self.time_ms)
            .field("tracked", &self.resources.len())
            .finish_non_exhaustive()
    }
}

impl SceneContext {
    /// Creates a context. The physics world is sized from the settings.
    #[must_use]
    pub fn new(stage: Box<dyn Stage>, signals: SignalBus, settings: GameSettings) -> Self {
        let rng = xytopia_world::session_rng(settings.seed);
        let physics = ArcadePhysics::new(settings.gravity, settings.tile_size);
        Self {
            stage,
            physics,
            signals,
            rng,
            settings,
            time_ms: 0.0,
            resources: SceneResources::default(),
        }
    }

    /// Prepares every texture in `manifest`.
    pub fn load(&mut self, manifest: &AssetManifest) {
        for key in manifest.textures() {
            self.stage.prepare_texture(key);
        }
    }

    /// Spawns a tracked sprite.
    pub fn spawn(&mut self, desc: SpriteDesc) -> Result<SpriteId, StageError> {
        let id = self.stage.spawn(desc)?;
        self.resources.track(id);
        Ok(id)
    }

    /// Starts a tracked tween. Use for tweens that may outlive the scene
    /// (repeat-forever loops).
    pub fn tween(&mut self, tween: Tween) -> Result<TweenId, StageError> {
        let id = self.stage.add_tween(tween)?;
        self.resources.track(id);
        Ok(id)
    }

    /// Starts a short untracked tween; it ends on its own or with its target.
    pub fn fire_tween(&mut self, tween: Tween) -> Result<TweenId, StageError> {
        self.stage.add_tween(tween)
    }

    /// Starts a tracked periodic timer.
    pub fn timer(&mut self, period_ms: f32) -> TimerId {
        let id = self.stage.add_timer(period_ms);
        self.resources.track(id);
        id
    }

    /// Registers a tracked input listener.
    pub fn listen(&mut self, kind: ListenerKind) -> ListenerId {
        let id = self.stage.listen(kind);
        self.resources.track(id);
        id
    }

    /// Adds a tracked static tile body.
    pub fn add_static_tile(&mut self, tile: TileCoord) -> BodyId {
        let id = self.physics.add_static_tile(tile);
        self.resources.track_body(id);
        id
    }

    /// Adopts handles created outside the context helpers.
    pub fn adopt(&mut self, handles: impl IntoIterator<Item = Handle>) {
        for handle in handles {
            self.resources.track(handle);
        }
    }

    /// Adopts a body created outside the context helpers.
    pub fn adopt_body(&mut self, body: BodyId) {
        self.resources.track_body(body);
    }

    /// Publishes a shell signal.
    pub fn signal(&mut self, signal: ShellSignal) {
        self.signals.publish(signal);
    }

    /// Live stage and physics resources.
    #[must_use]
    pub fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            bodies: self.physics.body_count(),
            ..self.stage.counts()
        }
    }

    /// Releases everything the current scene acquired.
    pub fn release_scene_resources(&mut self) -> usize {
        let released = self
            .resources
            .release_all(self.stage.as_mut(), &mut self.physics);
        debug!(released, remaining = ?self.counts(), "Scene resources released");
        released
    }

    /// Viewport center in screen coordinates.
    #[must_use]
    pub fn viewport_center(&self) -> Vec2 {
        let (w, h) = self.settings.viewport;
        Vec2::new(w as f32 / 2.0, h as f32 / 2.0)
    }
}

/// Scene lifecycle.
pub trait Scene: fmt::Debug {
    /// Scene identifier.
    fn key(&self) -> SceneKey;

    /// Declares the textures the scene uses.
    fn prepare_assets(&self, manifest: &mut AssetManifest);

    /// Builds the scene.
    fn initialize(&mut self, ctx: &mut SceneContext) -> XytopiaResult<()>;

    /// Advances one fixed step of `dt` seconds.
    fn tick(&mut self, ctx: &mut SceneContext, input: &Input, dt: f32)
        -> XytopiaResult<SceneCommand>;

    /// Drops scene state. Resources acquired through the context are
    /// released afterwards by the director.
    fn teardown(&mut self, ctx: &mut SceneContext);

    /// Terrain of the running visit, for scenes that have one.
    fn grid(&self) -> Option<&WorldGrid> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xytopia_kernel::HeadlessStage;

    fn context() -> SceneContext {
        SceneContext::new(
            Box::new(HeadlessStage::new()),
            SignalBus::default(),
            GameSettings::default(),
        )
    }

    #[test]
    fn test_transitions() {
        assert!(SceneKey::Welcome.can_transition_to(SceneKey::World));
        assert!(SceneKey::World.can_transition_to(SceneKey::World));
        assert!(!SceneKey::World.can_transition_to(SceneKey::Welcome));
    }

    #[test]
    fn test_manifest_dedupes() {
        let mut manifest = AssetManifest::default();
        manifest.texture("b").texture("a").texture("b");
        assert_eq!(manifest.textures().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(manifest.contains("a"));
    }

    #[test]
    fn test_release_all_clears_everything() {
        let mut ctx = context();
        let sprite = ctx
            .spawn(SpriteDesc::text("hi", Vec2::ZERO, Vec2::new(10.0, 10.0)))
            .expect("text");
        ctx.tween(Tween::to(sprite, xytopia_kernel::TweenProperty::X, 5.0, 100.0))
            .expect("tween");
        ctx.timer(500.0);
        ctx.listen(ListenerKind::Keyboard);
        ctx.add_static_tile(TileCoord::new(0, 0));
        assert_eq!(ctx.counts().total(), 5);

        assert_eq!(ctx.release_scene_resources(), 5);
        assert_eq!(ctx.counts(), ResourceCounts::default());
        assert_eq!(ctx.release_scene_resources(), 0);
    }
}
