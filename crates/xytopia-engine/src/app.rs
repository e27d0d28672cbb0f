//! Headless application loop.
//!
//! Runs the shell for a fixed number of frames. Each frame injects the
//! scripted input due on it, then advances the game in fixed steps.

use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};
use xytopia_gameplay::{InputManager, MouseButton, SceneKey};
use xytopia_kernel::ResourceCounts;

use crate::config::EngineConfig;
use crate::script::{DemoScript, ScriptEvent};
use crate::shell::{AppView, Shell};
use crate::timing::FixedStep;

/// Frames between periodic status lines.
const STATUS_INTERVAL: u32 = 120;

/// What a run ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames run
    pub frames: u32,
    /// Fixed steps simulated
    pub steps: u64,
    /// Times the portfolio view was opened
    pub portfolio_visits: u32,
    /// View shown on the last frame
    pub final_view: AppView,
    /// Scene running on the last frame, if the game was mounted
    pub final_scene: Option<SceneKey>,
    /// Live resources after shutdown
    pub leftover: ResourceCounts,
}

/// Loads the configuration and runs the application.
pub fn run() -> Result<RunSummary> {
    let mut config = EngineConfig::load();
    config.validate();
    run_with(&config)
}

/// Writes the default configuration to `path` so it can be edited.
pub fn write_default_config(path: &Path) -> Result<()> {
    EngineConfig::default().save_to(path)?;
    Ok(())
}

/// Runs the application with `config`.
pub fn run_with(config: &EngineConfig) -> Result<RunSummary> {
    info!(
        width = config.game.world_width,
        height = config.game.world_height,
        frames = config.frames,
        seed = ?config.game.seed,
        "Starting headless run"
    );

    let mut shell = Shell::new(config.game.clone(), config.signal_capacity)?;
    let mut script = config.script.clone().map_or_else(
        || DemoScript::tour(config.game.viewport),
        DemoScript::new,
    );
    let mut input = InputManager::new();
    for rebind in &config.bindings {
        debug!(action = ?rebind.action, keys = ?rebind.keys, "Rebinding");
        input.rebind(rebind.action, rebind.binding());
    }
    let mut timing = FixedStep::new(config.fixed_timestep);

    for frame in 0..config.frames {
        for event in script.due(frame) {
            apply(event, &mut input, &mut shell, &mut timing)?;
        }

        for _ in 0..timing.accumulate(config.frame_time) {
            shell.frame(&input.process(), timing.fixed_dt())?;
            input.end_frame();
        }

        if frame % STATUS_INTERVAL == 0 {
            debug!(
                frame,
                view = ?shell.view(),
                scene = ?shell.scene(),
                counts = ?shell.live_counts(),
                alpha = timing.alpha(),
                "Frame"
            );
        }
    }
    debug!(unplayed = script.remaining(), "Script finished");

    let final_view = shell.view();
    let final_scene = shell.scene();
    shell.shutdown();

    Ok(RunSummary {
        frames: config.frames,
        steps: timing.total_steps(),
        portfolio_visits: shell.portfolio_visits(),
        final_view,
        final_scene,
        leftover: shell.live_counts(),
    })
}

fn apply(
    event: ScriptEvent,
    input: &mut InputManager,
    shell: &mut Shell,
    timing: &mut FixedStep,
) -> Result<()> {
    match event {
        ScriptEvent::KeyDown { key } => input.update_key(key, true),
        ScriptEvent::KeyUp { key } => input.update_key(key, false),
        ScriptEvent::Pointer { x, y } => input.update_pointer(x, y),
        ScriptEvent::MouseDown => input.update_mouse_button(MouseButton::Left, true),
        ScriptEvent::MouseUp => input.update_mouse_button(MouseButton::Left, false),
        ScriptEvent::Wheel { delta } => input.update_wheel(delta),
        ScriptEvent::PortfolioButton => shell.request_portfolio(),
        ScriptEvent::BackToGame => {
            shell.back_to_game()?;
            timing.reset();
        },
    }
    Ok(())
}
