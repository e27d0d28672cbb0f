//! The application shell: swaps between the game surface and the portfolio
//! view.
//!
//! The game opens on Welcome. Leaving for the portfolio tears the game down
//! completely; coming back mounts a new one straight into World with a new
//! terrain grid. The shell listens to the game's [`SignalBus`] and also
//! offers its own always-visible Portfolio button.

use crossbeam_channel::Receiver;
use tracing::{debug, info};
use xytopia_common::XytopiaResult;
use xytopia_gameplay::{GameSettings, Input, SceneDirector, SceneKey, ShellSignal, SignalBus};
use xytopia_kernel::{HeadlessStage, ResourceCounts};

/// Which view the shell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    /// The running game
    Game,
    /// The conventional resume page
    Portfolio,
}

/// A mounted game and the shell's end of its signal bus.
#[derive(Debug)]
struct GameSurface {
    director: SceneDirector,
    signals: Receiver<ShellSignal>,
}

/// Owns the current view and the game surface while it is mounted.
#[derive(Debug)]
pub struct Shell {
    settings: GameSettings,
    signal_capacity: usize,
    view: AppView,
    game: Option<GameSurface>,
    mounts: u64,
    portfolio_visits: u32,
}

impl Shell {
    /// Creates a shell showing a freshly mounted game.
    pub fn new(settings: GameSettings, signal_capacity: usize) -> XytopiaResult<Self> {
        let mut shell = Self {
            settings,
            signal_capacity,
            view: AppView::Game,
            game: None,
            mounts: 0,
            portfolio_visits: 0,
        };
        shell.game = Some(shell.mount(SceneKey::Welcome)?);
        Ok(shell)
    }

    /// Current view.
    #[must_use]
    pub const fn view(&self) -> AppView {
        self.view
    }

    /// Scene director of the mounted game.
    #[must_use]
    pub fn director(&self) -> Option<&SceneDirector> {
        self.game.as_ref().map(|game| &game.director)
    }

    /// Running scene, if the game is mounted.
    #[must_use]
    pub fn scene(&self) -> Option<SceneKey> {
        self.director().map(SceneDirector::current)
    }

    /// Times the portfolio view was opened.
    #[must_use]
    pub const fn portfolio_visits(&self) -> u32 {
        self.portfolio_visits
    }

    /// Live resources of the mounted game; zero while unmounted.
    #[must_use]
    pub fn live_counts(&self) -> ResourceCounts {
        self.director()
            .map(SceneDirector::counts)
            .unwrap_or_default()
    }

    /// Runs one fixed step of the game, then reacts to its signals.
    pub fn frame(&mut self, input: &Input, dt: f32) -> XytopiaResult<()> {
        if let Some(game) = self.game.as_mut() {
            game.director.tick(input, dt)?;
        }
        self.poll_signals();
        Ok(())
    }

    /// Drains pending signals. Returns how many were handled.
    pub fn poll_signals(&mut self) -> usize {
        let pending: Vec<ShellSignal> = self
            .game
            .as_ref()
            .map(|game| game.signals.try_iter().collect())
            .unwrap_or_default();

        for signal in &pending {
            match signal {
                ShellSignal::ViewPortfolio => self.show_portfolio(),
            }
        }
        pending.len()
    }

    /// The always-visible Portfolio button.
    pub fn request_portfolio(&mut self) {
        self.show_portfolio();
    }

    /// Unmounts the game and shows the portfolio. Idempotent.
    pub fn show_portfolio(&mut self) {
        self.unmount();
        if self.view != AppView::Portfolio {
            self.view = AppView::Portfolio;
            self.portfolio_visits += 1;
            info!(visits = self.portfolio_visits, "Showing portfolio");
        }
    }

    /// "Back to Game": mounts a fresh game straight into World.
    pub fn back_to_game(&mut self) -> XytopiaResult<()> {
        if self.view == AppView::Game {
            return Ok(());
        }
        self.game = Some(self.mount(SceneKey::World)?);
        self.view = AppView::Game;
        info!("Back to game");
        Ok(())
    }

    /// Tears down the game if it is mounted.
    pub fn shutdown(&mut self) {
        self.unmount();
    }

    /// Mounts a new game on `first`. A configured seed is advanced per
    /// mount so every visit gets its own grid.
    fn mount(&mut self, first: SceneKey) -> XytopiaResult<GameSurface> {
        let mut bus = SignalBus::new(self.signal_capacity);
        let signals = bus.subscribe();
        let settings = GameSettings {
            seed: self.settings.seed.map(|seed| seed.wrapping_add(self.mounts)),
            ..self.settings.clone()
        };
        self.mounts += 1;
        let director =
            SceneDirector::starting_at(Box::new(HeadlessStage::new()), bus, settings, first)?;
        Ok(GameSurface { director, signals })
    }

    fn unmount(&mut self) {
        if let Some(mut game) = self.game.take() {
            game.director.shutdown();
            debug!(remaining = ?game.director.counts(), "Game unmounted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn shell() -> Shell {
        let settings = GameSettings {
            world_width: 40,
            world_height: 32,
            seed: Some(21),
            ..GameSettings::default()
        };
        Shell::new(settings, 4).expect("shell")
    }

    fn pressed(f: impl FnOnce(&mut Input)) -> Input {
        let mut input = Input::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_starts_in_game_on_welcome() {
        let shell = shell();
        assert_eq!(shell.view(), AppView::Game);
        assert_eq!(shell.scene(), Some(SceneKey::Welcome));
        assert!(shell.live_counts().sprites > 0);
    }

    #[test]
    fn test_p_in_world_switches_to_portfolio() {
        let mut shell = shell();
        shell
            .frame(&pressed(|i| i.confirm = true), DT)
            .expect("frame");
        assert_eq!(shell.scene(), Some(SceneKey::World));

        shell
            .frame(&pressed(|i| i.view_portfolio = true), DT)
            .expect("frame");
        assert_eq!(shell.view(), AppView::Portfolio);
        assert_eq!(shell.portfolio_visits(), 1);
        assert!(shell.director().is_none());
        assert_eq!(shell.live_counts(), ResourceCounts::default());
    }

    #[test]
    fn test_portfolio_button_works_from_any_scene() {
        let mut shell = shell();
        shell.request_portfolio();
        assert_eq!(shell.view(), AppView::Portfolio);
        shell.request_portfolio();
        assert_eq!(shell.portfolio_visits(), 1);
    }

    #[test]
    fn test_back_to_game_reenters_world_with_new_grid() {
        let mut shell = shell();
        shell
            .frame(&pressed(|i| i.confirm = true), DT)
            .expect("frame");
        let first_grid = shell
            .director()
            .and_then(|d| d.scene().grid().cloned())
            .expect("first grid");
        shell.request_portfolio();

        shell.back_to_game().expect("back");
        assert_eq!(shell.view(), AppView::Game);
        assert_eq!(shell.scene(), Some(SceneKey::World));
        let director = shell.director().expect("director");
        assert!(director.history().is_empty());
        let second_grid = director.scene().grid().expect("second grid");
        assert_ne!(second_grid, &first_grid);
    }

    #[test]
    fn test_each_return_mounts_a_clean_world() {
        let mut shell = shell();
        shell.request_portfolio();
        shell.back_to_game().expect("back");
        let counts = shell.live_counts();
        assert_eq!(counts.listeners, 2);
        assert_eq!(counts.timers, 0);

        for _ in 0..3 {
            shell
                .frame(&pressed(|i| i.view_portfolio = true), DT)
                .expect("frame");
            assert_eq!(shell.view(), AppView::Portfolio);
            assert_eq!(shell.live_counts(), ResourceCounts::default());
            shell.back_to_game().expect("back");
            assert_eq!(shell.scene(), Some(SceneKey::World));
            assert_eq!(shell.live_counts().listeners, counts.listeners);
        }
        assert_eq!(shell.portfolio_visits(), 4);
    }

    #[test]
    fn test_back_to_game_while_playing_is_noop() {
        let mut shell = shell();
        shell
            .frame(&pressed(|i| i.confirm = true), DT)
            .expect("frame");
        shell.back_to_game().expect("back");
        assert_eq!(shell.scene(), Some(SceneKey::World));
    }

    #[test]
    fn test_frames_in_portfolio_do_nothing() {
        let mut shell = shell();
        shell.request_portfolio();
        shell
            .frame(&pressed(|i| i.confirm = true), DT)
            .expect("frame");
        assert_eq!(shell.view(), AppView::Portfolio);
        assert_eq!(shell.poll_signals(), 0);
    }
}
