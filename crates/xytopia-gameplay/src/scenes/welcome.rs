//! Title screen.

use tracing::info;
use xytopia_common::{StageError, Vec2, XytopiaResult};
use xytopia_kernel::{
    Ease, ListenerKind, Repeat, SpriteDesc, SpriteId, TimerId, Tween, TweenProperty,
};

use super::{AssetManifest, Scene, SceneCommand, SceneContext, SceneKey};
use crate::events::ShellSignal;
use crate::input::Input;

const BACKGROUND_TEXTURE: &str = "mid_part1";
const PARTICLE_TEXTURE: &str = "most_top_all_adjacent";
const PARTICLE_COUNT: usize = 10;
const BLINK_MS: f32 = 500.0;
const HOVER_MS: f32 = 150.0;

/// What a title-screen button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Start the world scene
    EnterWorld,
    /// Ask the shell for the portfolio
    ViewPortfolio,
}

#[derive(Debug)]
struct Button {
    action: ButtonAction,
    background: SpriteId,
    label: SpriteId,
    fill: u32,
    hovered: bool,
}

/// Title screen with the ENTER WORLD and VIEW PORTFOLIO buttons.
#[derive(Debug, Default)]
pub struct WelcomeScene {
    title: Option<SpriteId>,
    prompt: Option<SpriteId>,
    blink: Option<TimerId>,
    buttons: Vec<Button>,
}

impl WelcomeScene {
    /// Creates the scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Title text sprite, while the scene is live.
    #[must_use]
    pub const fn title(&self) -> Option<SpriteId> {
        self.title
    }

    /// Center of a button's background, while the scene is live.
    #[must_use]
    pub fn button_center(&self, ctx: &SceneContext, action: ButtonAction) -> Option<Vec2> {
        let button = self.buttons.iter().find(|b| b.action == action)?;
        ctx.stage.sprite(button.background).map(|s| s.position)
    }

    fn add_button(
        &mut self,
        ctx: &mut SceneContext,
        action: ButtonAction,
        text: &str,
        center: Vec2,
        fill: u32,
    ) -> Result<(), StageError> {
        let background = ctx.spawn(
            SpriteDesc::rectangle(fill, center, Vec2::new(280.0, 60.0))
                .alpha(0.8)
                .depth(20),
        )?;
        let label = ctx.spawn(SpriteDesc::text(text, center, text_size(text, 20.0)).depth(21))?;
        self.buttons.push(Button {
            action,
            background,
            label,
            fill,
            hovered: false,
        });
        Ok(())
    }

    fn spawn_particles(&mut self, ctx: &mut SceneContext) -> Result<(), StageError> {
        let (w, h) = ctx.settings.viewport;
        for _ in 0..PARTICLE_COUNT {
            let position = Vec2::new(
                ctx.rng.f32() * w as f32,
                ctx.rng.f32() * h as f32,
            );
            let tint = ctx.rng.u32(0x004A_9EFF..=0x0087_CEEB);
            let particle = ctx.spawn(
                SpriteDesc::image(PARTICLE_TEXTURE, position, Vec2::new(64.0, 64.0))
                    .scale(0.1)
                    .alpha(0.3)
                    .tint(tint),
            )?;

            let duration = ctx.rng.u32(3000..=6000) as f32;
            let delay = ctx.rng.u32(0..=2000) as f32;
            let targets = [
                (TweenProperty::X, position.x + ctx.rng.i32(-50..=50) as f32),
                (TweenProperty::Y, position.y + ctx.rng.i32(-30..=30) as f32),
                (TweenProperty::Rotation, ctx.rng.f32() - 0.5),
            ];
            for (property, to) in targets {
                ctx.tween(
                    Tween::to(particle, property, to, duration)
                        .ease(Ease::SineInOut)
                        .yoyo()
                        .repeat(Repeat::Forever)
                        .delay(delay),
                )?;
            }
        }
        Ok(())
    }

    fn update_hover(&mut self, ctx: &mut SceneContext, pointer: Vec2) -> Result<(), StageError> {
        for button in &mut self.buttons {
            let over = ctx
                .stage
                .sprite(button.background)
                .is_some_and(|s| s.visible && s.footprint().contains(pointer));
            if over == button.hovered {
                continue;
            }
            button.hovered = over;
            let (scale, alpha) = if over { (1.1, 1.0) } else { (1.0, 0.8) };
            for target in [button.background, button.label] {
                ctx.fire_tween(
                    Tween::to(target, TweenProperty::Scale, scale, HOVER_MS).ease(Ease::Power2Out),
                )?;
            }
            let background = ctx.stage.sprite_mut(button.background)?;
            background.alpha = alpha;
            background.tint = button.fill;
        }
        Ok(())
    }

    fn clicked(&self, input: &Input) -> Option<ButtonAction> {
        if !input.click {
            return None;
        }
        self.buttons.iter().find(|b| b.hovered).map(|b| b.action)
    }
}

/// Rough text extent for a font size.
fn text_size(text: &str, font_px: f32) -> Vec2 {
    Vec2::new(text.chars().count() as f32 * font_px * 0.6, font_px * 1.2)
}

impl Scene for WelcomeScene {
    fn key(&self) -> SceneKey {
        SceneKey::Welcome
    }

    fn prepare_assets(&self, manifest: &mut AssetManifest) {
        manifest.texture(BACKGROUND_TEXTURE).texture(PARTICLE_TEXTURE);
    }

    fn initialize(&mut self, ctx: &mut SceneContext) -> XytopiaResult<()> {
        let (w, h) = ctx.settings.viewport;
        let (w, h) = (w as f32, h as f32);
        let center = ctx.viewport_center();

        ctx.listen(ListenerKind::Keyboard);
        ctx.listen(ListenerKind::Pointer);

        let background = ctx.spawn(
            SpriteDesc::tiled(BACKGROUND_TEXTURE, center, Vec2::new(w, h))
                .alpha(0.1)
                .tint(0x004A_9EFF)
                .depth(-10),
        )?;
        for (property, to) in [(TweenProperty::TileX, 100.0), (TweenProperty::TileY, 50.0)] {
            ctx.tween(Tween::to(background, property, to, 20_000.0).repeat(Repeat::Forever))?;
        }
        ctx.spawn(
            SpriteDesc::rectangle(0x001A_1A2E, center, Vec2::new(w, h))
                .alpha(0.8)
                .depth(-5),
        )?;

        let title_pos = Vec2::new(w / 2.0, h * 0.25);
        let title = ctx.spawn(SpriteDesc::text("XYTOPIA", title_pos, text_size("XYTOPIA", 64.0)))?;
        ctx.tween(
            Tween::to(title, TweenProperty::Y, title_pos.y - 10.0, 2000.0)
                .ease(Ease::SineInOut)
                .yoyo()
                .repeat(Repeat::Forever),
        )?;
        self.title = Some(title);

        let subtitle = "Interactive Portfolio Experience";
        ctx.spawn(SpriteDesc::text(
            subtitle,
            Vec2::new(w / 2.0, h * 0.35),
            text_size(subtitle, 24.0),
        ))?;

        self.add_button(
            ctx,
            ButtonAction::EnterWorld,
            "ENTER WORLD",
            Vec2::new(w / 2.0, h * 0.55),
            0x004C_AF50,
        )?;
        self.add_button(
            ctx,
            ButtonAction::ViewPortfolio,
            "VIEW PORTFOLIO",
            Vec2::new(w / 2.0, h * 0.7),
            0x0021_96F3,
        )?;

        let prompt = "Press ENTER to start";
        self.prompt = Some(ctx.spawn(SpriteDesc::text(
            prompt,
            Vec2::new(w / 2.0, h * 0.85),
            text_size(prompt, 16.0),
        ))?);
        self.blink = Some(ctx.timer(BLINK_MS));

        self.spawn_particles(ctx)?;
        info!(sprites = ctx.counts().sprites, "Welcome scene ready");
        Ok(())
    }

    fn tick(
        &mut self,
        ctx: &mut SceneContext,
        input: &Input,
        _dt: f32,
    ) -> XytopiaResult<SceneCommand> {
        if let (Some(timer), Some(prompt)) = (self.blink, self.prompt) {
            if ctx.stage.take_timer_fires(timer) % 2 == 1 {
                let sprite = ctx.stage.sprite_mut(prompt)?;
                sprite.visible = !sprite.visible;
            }
        }

        self.update_hover(ctx, input.pointer)?;
        let clicked = self.clicked(input);

        if input.view_portfolio || clicked == Some(ButtonAction::ViewPortfolio) {
            ctx.signal(ShellSignal::ViewPortfolio);
        }
        if input.confirm || clicked == Some(ButtonAction::EnterWorld) {
            return Ok(SceneCommand::Switch(SceneKey::World));
        }
        Ok(SceneCommand::Stay)
    }

    fn teardown(&mut self, _ctx: &mut SceneContext) {
        self.title = None;
        self.prompt = None;
        self.blink = None;
        self.buttons.clear();
    }
}
