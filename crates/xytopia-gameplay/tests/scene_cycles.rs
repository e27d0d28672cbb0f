//! Scene flow end to end against the headless stage.

use proptest::prelude::*;
use xytopia_gameplay::{
    CameraConfig, CameraController, GameSettings, Input, Scene, SceneDirector, SceneKey,
    ShellSignal, SignalBus,
};
use xytopia_common::{Rect, Vec2};
use xytopia_kernel::HeadlessStage;

const DT: f32 = 1.0 / 60.0;

fn settings(seed: u64) -> GameSettings {
    GameSettings {
        world_width: 48,
        world_height: 32,
        seed: Some(seed),
        ..GameSettings::default()
    }
}

fn press(f: impl FnOnce(&mut Input)) -> Input {
    let mut input = Input::default();
    f(&mut input);
    input
}

fn start(
    seed: u64,
    first: SceneKey,
) -> (SceneDirector, crossbeam_channel::Receiver<ShellSignal>) {
    let mut bus = SignalBus::default();
    let shell = bus.subscribe();
    let director =
        SceneDirector::starting_at(Box::new(HeadlessStage::new()), bus, settings(seed), first)
            .expect("start");
    (director, shell)
}

/// Walks right for a second, presses `P` once and checks for one signal.
fn play_world_then_leave(
    director: &mut SceneDirector,
    shell: &crossbeam_channel::Receiver<ShellSignal>,
) {
    for _ in 0..60 {
        director
            .tick(&press(|i| i.right = true), DT)
            .expect("world tick");
    }
    director
        .tick(&press(|i| i.view_portfolio = true), DT)
        .expect("portfolio");
    assert_eq!(shell.try_recv().ok(), Some(ShellSignal::ViewPortfolio));
    assert!(shell.try_recv().is_err());

    // Switching to the portfolio view tears the game down.
    director.shutdown();
    assert_eq!(director.counts().total(), 0);
}

#[test]
fn welcome_world_portfolio_cycles_do_not_leak() {
    // First visit: Welcome, then World.
    let (mut director, shell) = start(3, SceneKey::Welcome);
    for frame in 0..30 {
        let y = if frame % 2 == 0 { 422.0 } else { 0.0 };
        director
            .tick(&press(|i| i.pointer = Vec2::new(512.0, y)), DT)
            .expect("welcome tick");
    }
    director
        .tick(&press(|i| i.view_portfolio = true), DT)
        .expect("portfolio");
    assert_eq!(shell.try_recv().ok(), Some(ShellSignal::ViewPortfolio));

    director
        .tick(&press(|i| i.confirm = true), DT)
        .expect("enter");
    assert_eq!(director.current(), SceneKey::World);
    let mut previous = director.scene().grid().cloned().expect("grid");
    let world_counts = director.counts();
    play_world_then_leave(&mut director, &shell);

    // Every return from the portfolio re-enters a fresh World.
    for visit in 1..4 {
        let (mut director, shell) = start(3 + visit, SceneKey::World);
        assert_eq!(director.current(), SceneKey::World);
        let counts = director.counts();
        assert_eq!(counts.listeners, world_counts.listeners, "visit {visit}");
        assert_eq!(counts.timers, 0, "visit {visit}");
        assert_eq!(counts.tweens, 0, "visit {visit}");

        let grid = director.scene().grid().cloned().expect("grid");
        assert_ne!(grid, previous, "visit {visit}");
        previous = grid;

        play_world_then_leave(&mut director, &shell);
    }
}

#[test]
fn restart_world_releases_previous_visit() {
    let mut director =
        SceneDirector::new(Box::new(HeadlessStage::new()), SignalBus::default(), settings(8))
            .expect("start");
    director.tick(&press(|i| i.confirm = true), DT).expect("enter");
    for _ in 0..10 {
        for _ in 0..10 {
            director.tick(&Input::default(), DT).expect("tick");
        }
        director.restart_world().expect("restart");
        let counts = director.counts();
        assert_eq!(counts.listeners, 2);
        assert_eq!(counts.timers, 0);
        assert_eq!(counts.tweens, 0);
    }
}

proptest! {
    #[test]
    fn prop_zoom_never_leaves_range(deltas in proptest::collection::vec(-1000.0f32..1000.0, 1..50)) {
        let mut rig = CameraController::new(
            CameraConfig::default(),
            (1024, 768),
            Rect::new(0.0, 0.0, 3200.0, 1600.0),
        );
        for delta in deltas {
            rig.zoom(delta);
            let zoom = rig.zoom_level();
            prop_assert!((1.2..=2.0).contains(&zoom), "zoom {}", zoom);
        }
    }
}
