//! The explorable tile world.

use tracing::info;
use xytopia_common::{Rect, StageError, Vec2, XytopiaResult};
use xytopia_kernel::{Camera, ListenerKind, SpriteDesc, SpriteId, Stage};
use xytopia_world::{
    BlockVariant, TerrainGenerator, TilePlacement, TileRenderer, TileSink, TileStats, WorldGrid,
};

use super::{AssetManifest, Scene, SceneCommand, SceneContext, SceneKey};
use crate::avatar::AvatarController;
use crate::camera_rig::CameraController;
use crate::events::ShellSignal;
use crate::input::Input;

/// Registers each placed block as a sprite plus a static body.
struct StageTiles<'a> {
    ctx: &'a mut SceneContext,
    sprites: &'a mut Vec<SpriteId>,
}

impl TileSink for StageTiles<'_> {
    fn place_static(&mut self, placement: &TilePlacement) -> Result<(), StageError> {
        let size = Vec2::new(placement.size, placement.size);
        let id = self.ctx.spawn(SpriteDesc::image(
            placement.variant.texture_key(),
            placement.center,
            size,
        ))?;
        self.sprites.push(id);
        self.ctx.add_static_tile(placement.coord);
        Ok(())
    }
}

/// World scene: generated terrain, the avatar and the follow camera.
#[derive(Debug, Default)]
pub struct WorldScene {
    grid: Option<WorldGrid>,
    avatar: Option<AvatarController>,
    camera: Option<CameraController>,
    tiles: Vec<SpriteId>,
    visible_tiles: usize,
    stats: TileStats,
}

impl WorldScene {
    /// Creates the scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Avatar of the current visit.
    #[must_use]
    pub const fn avatar(&self) -> Option<&AvatarController> {
        self.avatar.as_ref()
    }

    /// Camera of the current visit.
    #[must_use]
    pub const fn camera(&self) -> Option<&CameraController> {
        self.camera.as_ref()
    }

    /// Tiles inside the camera view after the last tick.
    #[must_use]
    pub const fn visible_tiles(&self) -> usize {
        self.visible_tiles
    }

    /// Block counts from the last render.
    #[must_use]
    pub const fn tile_stats(&self) -> TileStats {
        self.stats
    }

    /// Standing spot on the street surface in the middle of the world.
    fn spawn_point(grid: &WorldGrid, ctx: &SceneContext) -> Vec2 {
        let tile = ctx.settings.tile_size;
        let surface_y = grid.layout().surface_level as f32 * tile;
        Vec2::new(
            grid.width() as f32 * tile / 2.0,
            surface_y - ctx.settings.avatar.half_height - 1.0,
        )
    }
}

impl Scene for WorldScene {
    fn key(&self) -> SceneKey {
        SceneKey::World
    }

    fn prepare_assets(&self, manifest: &mut AssetManifest) {
        for key in BlockVariant::all_texture_keys() {
            manifest.texture(key);
        }
    }

    fn initialize(&mut self, ctx: &mut SceneContext) -> XytopiaResult<()> {
        let settings = ctx.settings.clone();
        let generator = TerrainGenerator::new(
            settings.generator.clone(),
            settings.world_width,
            settings.world_height,
        )?;
        let grid = generator.generate(&mut ctx.rng);

        let (world_w, world_h) = settings.world_extent();
        let bounds = Rect::new(0.0, 0.0, world_w, world_h);
        ctx.physics.set_bounds(bounds);

        let mut variety = fastrand::Rng::with_seed(ctx.rng.u64(..));
        self.stats = TileRenderer::new(settings.tile_size).render(
            &grid,
            &mut variety,
            &mut StageTiles {
                ctx: &mut *ctx,
                sprites: &mut self.tiles,
            },
        )?;

        let spawn = Self::spawn_point(&grid, ctx);
        let avatar = AvatarController::spawn(
            settings.avatar.clone(),
            spawn,
            &mut ctx.physics,
            ctx.stage.as_mut(),
        )?;
        ctx.adopt(avatar.avatar().sprite_handles());
        ctx.adopt_body(avatar.avatar().body());

        let mut camera = CameraController::new(settings.camera.clone(), settings.viewport, bounds);
        camera.start_follow(spawn);
        self.visible_tiles = cull_tiles(&self.tiles, camera.camera(), ctx.stage.as_mut())?;

        ctx.listen(ListenerKind::Keyboard);
        ctx.listen(ListenerKind::Wheel);

        info!(
            width = grid.width(),
            height = grid.height(),
            blocks = self.stats.total(),
            "World scene ready"
        );
        self.grid = Some(grid);
        self.avatar = Some(avatar);
        self.camera = Some(camera);
        Ok(())
    }

    fn tick(
        &mut self,
        ctx: &mut SceneContext,
        input: &Input,
        dt: f32,
    ) -> XytopiaResult<SceneCommand> {
        if input.view_portfolio {
            ctx.signal(ShellSignal::ViewPortfolio);
        }

        let (Some(avatar), Some(camera)) = (self.avatar.as_mut(), self.camera.as_mut()) else {
            return Ok(SceneCommand::Stay);
        };

        camera.handle_input(input);
        avatar.tick(input, &mut ctx.physics, ctx.stage.as_mut(), ctx.time_ms)?;
        ctx.physics.step(dt);

        if let Some(body) = ctx.physics.body(avatar.avatar().body()) {
            camera.follow(body.center);
        }
        self.visible_tiles = cull_tiles(&self.tiles, camera.camera(), ctx.stage.as_mut())?;
        Ok(SceneCommand::Stay)
    }

    fn teardown(&mut self, _ctx: &mut SceneContext) {
        self.grid = None;
        self.avatar = None;
        self.camera = None;
        self.tiles.clear();
        self.visible_tiles = 0;
        self.stats = TileStats::default();
    }

    fn grid(&self) -> Option<&WorldGrid> {
        self.grid.as_ref()
    }
}

/// Shows only the tiles inside the camera view. Returns how many are shown.
fn cull_tiles(
    tiles: &[SpriteId],
    camera: &Camera,
    stage: &mut dyn Stage,
) -> Result<usize, StageError> {
    let mut shown = 0;
    for &id in tiles {
        let sprite = stage.sprite_mut(id)?;
        sprite.visible = camera.is_rect_visible(&sprite.footprint());
        shown += usize::from(sprite.visible);
    }
    Ok(shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SignalBus;
    use crate::settings::GameSettings;
    use xytopia_kernel::HeadlessStage;

    const DT: f32 = 1.0 / 60.0;

    fn ready() -> (WorldScene, SceneContext, crossbeam_channel::Receiver<ShellSignal>) {
        let mut signals = SignalBus::default();
        let rx = signals.subscribe();
        let settings = GameSettings {
            world_width: 48,
            world_height: 40,
            seed: Some(5),
            ..GameSettings::default()
        };
        let mut ctx = SceneContext::new(Box::new(HeadlessStage::new()), signals, settings);
        let mut scene = WorldScene::new();
        let mut manifest = AssetManifest::default();
        scene.prepare_assets(&mut manifest);
        ctx.load(&manifest);
        scene.initialize(&mut ctx).expect("initialize");
        (scene, ctx, rx)
    }

    fn run(scene: &mut WorldScene, ctx: &mut SceneContext, input: &Input, frames: usize) {
        for _ in 0..frames {
            scene.tick(ctx, input, DT).expect("tick");
            ctx.time_ms += DT * 1000.0;
        }
    }

    #[test]
    fn test_every_solid_cell_is_placed() {
        let (scene, ctx, _rx) = ready();
        let grid = scene.grid().expect("grid");
        let counts = ctx.counts();
        assert_eq!(scene.tile_stats().total(), grid.count_solid());
        // Blocks plus six avatar parts; blocks plus the avatar body.
        assert_eq!(counts.sprites, grid.count_solid() + 6);
        assert_eq!(counts.bodies, grid.count_solid() + 1);
        assert_eq!(counts.listeners, 2);
    }

    #[test]
    fn test_avatar_lands_on_street() {
        let (mut scene, mut ctx, _rx) = ready();
        run(&mut scene, &mut ctx, &Input::default(), 30);
        let body_id = scene.avatar().expect("avatar").avatar().body();
        let body = ctx.physics.body(body_id).expect("body");
        assert!(body.blocked_down());
        let surface = scene.grid().expect("grid").layout().surface_level as f32 * 32.0;
        assert!((body.aabb().max_y - surface).abs() < 0.01);
    }

    #[test]
    fn test_walking_right_moves_camera_gradually() {
        let (mut scene, mut ctx, _rx) = ready();
        run(&mut scene, &mut ctx, &Input::default(), 10);
        let start = scene.camera().expect("camera").camera().position;
        let right = Input {
            right: true,
            ..Input::default()
        };
        run(&mut scene, &mut ctx, &right, 1);
        let after_one = scene.camera().expect("camera").camera().position;
        assert!(after_one.x >= start.x);
        assert!(after_one.x - start.x < 300.0 * DT);
    }

    #[test]
    fn test_only_tiles_in_view_are_shown() {
        let (mut scene, mut ctx, _rx) = ready();
        run(&mut scene, &mut ctx, &Input::default(), 5);
        let view = scene.camera().expect("camera").camera().visible_bounds();

        let shown = scene.visible_tiles();
        assert!(shown > 0);
        assert!(shown < scene.tile_stats().total());
        for &id in &scene.tiles {
            let sprite = ctx.stage.sprite(id).expect("tile");
            assert_eq!(sprite.visible, view.overlaps(&sprite.footprint()));
        }
    }

    #[test]
    fn test_zoom_stays_in_range() {
        let (mut scene, mut ctx, _rx) = ready();
        let wheel = Input {
            wheel_y: -100_000.0,
            ..Input::default()
        };
        run(&mut scene, &mut ctx, &wheel, 3);
        let zoom = scene.camera().expect("camera").zoom_level();
        assert!((zoom - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_portfolio_key_emits_once_per_press() {
        let (mut scene, mut ctx, rx) = ready();
        let press = Input {
            view_portfolio: true,
            ..Input::default()
        };
        scene.tick(&mut ctx, &press, DT).expect("tick");
        scene.tick(&mut ctx, &Input::default(), DT).expect("tick");
        assert_eq!(rx.try_recv().ok(), Some(ShellSignal::ViewPortfolio));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_teardown_and_release_leave_nothing() {
        let (mut scene, mut ctx, _rx) = ready();
        run(&mut scene, &mut ctx, &Input::default(), 5);
        scene.teardown(&mut ctx);
        ctx.release_scene_resources();
        assert_eq!(ctx.counts().total(), 0);
        assert!(scene.grid().is_none());
    }
}
