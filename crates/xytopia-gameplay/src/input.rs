//! Input handling: raw key/mouse state, rebindable actions, and the
//! per-frame [`Input`] snapshot the scenes consume.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use xytopia_common::Vec2;
use xytopia_kernel::{ListenerKind, Stage};

/// Key codes the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// P key
    P,
    /// W key
    W,
    /// Space bar
    Space,
    /// Enter/Return
    Enter,
    /// Escape
    Escape,
    /// `=` / `+` key
    Equals,
    /// `-` key
    Minus,
    /// Up arrow
    Up,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse button codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
}

/// Up/down state of one key or button, with the edges seen this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Latch {
    /// Currently down
    pub down: bool,
    /// Went down since the last [`Latch::settle`]
    pub went_down: bool,
    /// Went up since the last [`Latch::settle`]
    pub went_up: bool,
}

impl Latch {
    /// Records the raw state. Repeats of the same state add no edge.
    pub fn set(&mut self, down: bool) {
        if down != self.down {
            self.went_down |= down;
            self.went_up |= !down;
        }
        self.down = down;
    }

    /// Forgets the edges; the held state stays.
    pub fn settle(&mut self) {
        self.went_down = false;
        self.went_up = false;
    }
}

/// Game actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Walk left (A / Left arrow)
    MoveLeft,
    /// Walk right (D / Right arrow)
    MoveRight,
    /// Jump (W / Up arrow)
    MoveUp,
    /// Enter the world (Enter / Space)
    Confirm,
    /// Ask the shell to show the portfolio (P)
    ViewPortfolio,
    /// Zoom in one step (`=`)
    ZoomIn,
    /// Zoom out one step (`-`)
    ZoomOut,
}

/// Processed input state for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Input {
    /// Left held
    pub left: bool,
    /// Right held
    pub right: bool,
    /// Up held
    pub up: bool,
    /// Confirm pressed this frame
    pub confirm: bool,
    /// Portfolio key pressed this frame
    pub view_portfolio: bool,
    /// Zoom-in key pressed this frame
    pub zoom_in: bool,
    /// Zoom-out key pressed this frame
    pub zoom_out: bool,
    /// Wheel movement this frame, positive scrolls down
    pub wheel_y: f32,
    /// Pointer position in screen coordinates
    pub pointer: Vec2,
    /// Left button pressed this frame
    pub click: bool,
}

impl Input {
    /// Drops the channels the stage has no listener for.
    ///
    /// A scene only sees keyboard, wheel or pointer input after registering
    /// a listener for it, and loses it again once the listener is released.
    #[must_use]
    pub fn gated(&self, stage: &dyn Stage) -> Self {
        let mut input = self.clone();
        if !stage.is_listening(ListenerKind::Keyboard) {
            input.left = false;
            input.right = false;
            input.up = false;
            input.confirm = false;
            input.view_portfolio = false;
            input.zoom_in = false;
            input.zoom_out = false;
        }
        if !stage.is_listening(ListenerKind::Wheel) {
            input.wheel_y = 0.0;
        }
        if !stage.is_listening(ListenerKind::Pointer) {
            input.click = false;
        }
        input
    }
}

/// Keys that trigger an action; any one of them counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    keys: Vec<KeyCode>,
}

impl KeyBinding {
    /// Binding to the given keys.
    #[must_use]
    pub fn of(keys: &[KeyCode]) -> Self {
        Self {
            keys: keys.to_vec(),
        }
    }

    /// Bound keys.
    pub fn keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys.iter().copied()
    }

    /// Whether `key` is bound.
    #[must_use]
    pub fn contains(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }
}

const DEFAULT_BINDINGS: [(Action, &[KeyCode]); 7] = [
    (Action::MoveLeft, &[KeyCode::A, KeyCode::Left]),
    (Action::MoveRight, &[KeyCode::D, KeyCode::Right]),
    (Action::MoveUp, &[KeyCode::W, KeyCode::Up]),
    (Action::Confirm, &[KeyCode::Enter, KeyCode::Space]),
    (Action::ViewPortfolio, &[KeyCode::P]),
    (Action::ZoomIn, &[KeyCode::Equals]),
    (Action::ZoomOut, &[KeyCode::Minus]),
];

/// Collects raw device events and turns them into one [`Input`] per step.
#[derive(Debug)]
pub struct InputManager {
    keys: HashMap<KeyCode, Latch>,
    buttons: HashMap<MouseButton, Latch>,
    bindings: HashMap<Action, KeyBinding>,
    pointer: Vec2,
    wheel_y: f32,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Manager with the default bindings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            buttons: HashMap::new(),
            bindings: DEFAULT_BINDINGS
                .iter()
                .map(|&(action, keys)| (action, KeyBinding::of(keys)))
                .collect(),
            pointer: Vec2::ZERO,
            wheel_y: 0.0,
        }
    }

    /// Replaces the keys bound to `action`.
    pub fn rebind(&mut self, action: Action, binding: KeyBinding) {
        self.bindings.insert(action, binding);
    }

    /// Keys bound to `action`.
    #[must_use]
    pub fn binding(&self, action: Action) -> Option<&KeyBinding> {
        self.bindings.get(&action)
    }

    /// Key went down or up.
    pub fn update_key(&mut self, key: KeyCode, down: bool) {
        self.keys.entry(key).or_default().set(down);
    }

    /// Mouse button went down or up.
    pub fn update_mouse_button(&mut self, button: MouseButton, down: bool) {
        self.buttons.entry(button).or_default().set(down);
    }

    /// Pointer moved (screen space).
    pub fn update_pointer(&mut self, screen_x: f32, screen_y: f32) {
        self.pointer = Vec2::new(screen_x, screen_y);
    }

    /// Wheel scrolled; deltas add up until [`InputManager::end_frame`].
    pub fn update_wheel(&mut self, delta_y: f32) {
        self.wheel_y += delta_y;
    }

    /// Drops edges and wheel movement after a step consumed them.
    pub fn end_frame(&mut self) {
        self.keys
            .values_mut()
            .chain(self.buttons.values_mut())
            .for_each(Latch::settle);
        self.wheel_y = 0.0;
    }

    fn key(&self, key: KeyCode) -> Latch {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    fn any_key(&self, action: Action, test: impl Fn(Latch) -> bool) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|binding| binding.keys().any(|key| test(self.key(key))))
    }

    /// Snapshot for one step. Movement is level-triggered; the rest fire on
    /// the frame the key goes down.
    #[must_use]
    pub fn process(&self) -> Input {
        let held = |action| self.any_key(action, |latch| latch.down);
        let tapped = |action| self.any_key(action, |latch| latch.went_down);
        Input {
            left: held(Action::MoveLeft),
            right: held(Action::MoveRight),
            up: held(Action::MoveUp),
            confirm: tapped(Action::Confirm),
            view_portfolio: tapped(Action::ViewPortfolio),
            zoom_in: tapped(Action::ZoomIn),
            zoom_out: tapped(Action::ZoomOut),
            wheel_y: self.wheel_y,
            pointer: self.pointer,
            click: self
                .buttons
                .get(&MouseButton::Left)
                .is_some_and(|latch| latch.went_down),
        }
    }
}
