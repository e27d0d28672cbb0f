//! Scripted input for the headless frame loop.
//!
//! A script is a list of raw input events keyed by frame number. The
//! built-in tour walks through the whole flow: hover and click ENTER WORLD,
//! walk, jump and zoom, press `P`, come back into a fresh world, then use
//! the shell's Portfolio button.

use serde::{Deserialize, Serialize};
use xytopia_gameplay::KeyCode;

/// One raw input event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Key pressed
    KeyDown {
        /// Key
        key: KeyCode,
    },
    /// Key released
    KeyUp {
        /// Key
        key: KeyCode,
    },
    /// Pointer moved to a screen position
    Pointer {
        /// Screen x
        x: f32,
        /// Screen y
        y: f32,
    },
    /// Left button pressed
    MouseDown,
    /// Left button released
    MouseUp,
    /// Wheel scrolled; positive scrolls down
    Wheel {
        /// Scroll amount
        delta: f32,
    },
    /// The shell's always-visible Portfolio button
    PortfolioButton,
    /// The portfolio view's "Back to Game" button
    BackToGame,
}

/// An event and the frame it fires on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Frame number, counted from zero
    pub frame: u32,
    /// Event to inject
    #[serde(flatten)]
    pub event: ScriptEvent,
}

impl ScriptStep {
    pub(crate) const fn at(frame: u32, event: ScriptEvent) -> Self {
        Self { frame, event }
    }
}

/// Replays script steps in frame order.
#[derive(Debug, Clone, Default)]
pub struct DemoScript {
    steps: Vec<ScriptStep>,
    cursor: usize,
}

impl DemoScript {
    /// Creates a script; steps are sorted by frame, keeping the order of
    /// steps that share a frame.
    #[must_use]
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|step| step.frame);
        Self { steps, cursor: 0 }
    }

    /// The built-in tour for a viewport of `(width, height)` pixels.
    #[must_use]
    pub fn tour(viewport: (u32, u32)) -> Self {
        use ScriptEvent::{
            BackToGame, KeyDown, KeyUp, MouseDown, MouseUp, Pointer, PortfolioButton, Wheel,
        };

        let (w, h) = (viewport.0 as f32, viewport.1 as f32);
        let enter_button = Pointer {
            x: w / 2.0,
            y: h * 0.55,
        };

        Self::new(vec![
            // Welcome: hover, then click ENTER WORLD
            ScriptStep::at(20, enter_button),
            ScriptStep::at(40, MouseDown),
            ScriptStep::at(42, MouseUp),
            // World: walk right, jump, zoom
            ScriptStep::at(100, KeyDown { key: KeyCode::D }),
            ScriptStep::at(220, KeyUp { key: KeyCode::D }),
            ScriptStep::at(230, KeyDown { key: KeyCode::W }),
            ScriptStep::at(240, KeyUp { key: KeyCode::W }),
            ScriptStep::at(260, KeyDown { key: KeyCode::Equals }),
            ScriptStep::at(262, KeyUp { key: KeyCode::Equals }),
            ScriptStep::at(270, Wheel { delta: 300.0 }),
            // Portfolio by key, then back
            ScriptStep::at(320, KeyDown { key: KeyCode::P }),
            ScriptStep::at(322, KeyUp { key: KeyCode::P }),
            ScriptStep::at(380, BackToGame),
            // Fresh world: walk left, then the shell button
            ScriptStep::at(480, KeyDown { key: KeyCode::A }),
            ScriptStep::at(560, KeyUp { key: KeyCode::A }),
            ScriptStep::at(580, PortfolioButton),
        ])
    }

    /// Events due on `frame`. Steps for earlier frames that were never
    /// drained are returned too.
    pub fn due(&mut self, frame: u32) -> Vec<ScriptEvent> {
        let start = self.cursor;
        while self
            .steps
            .get(self.cursor)
            .is_some_and(|step| step.frame <= frame)
        {
            self.cursor += 1;
        }
        self.steps[start..self.cursor]
            .iter()
            .map(|step| step.event)
            .collect()
    }

    /// Steps not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len() - self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_replay_in_frame_order() {
        let mut script = DemoScript::new(vec![
            ScriptStep::at(5, ScriptEvent::MouseUp),
            ScriptStep::at(1, ScriptEvent::MouseDown),
            ScriptStep::at(5, ScriptEvent::PortfolioButton),
        ]);
        assert!(script.due(0).is_empty());
        assert_eq!(script.due(1), vec![ScriptEvent::MouseDown]);
        assert!(script.due(4).is_empty());
        assert_eq!(
            script.due(5),
            vec![ScriptEvent::MouseUp, ScriptEvent::PortfolioButton]
        );
        assert_eq!(script.remaining(), 0);
    }

    #[test]
    fn test_skipped_frames_are_not_lost() {
        let mut script = DemoScript::new(vec![ScriptStep::at(3, ScriptEvent::MouseDown)]);
        assert_eq!(script.due(10), vec![ScriptEvent::MouseDown]);
    }

    #[test]
    fn test_tour_targets_enter_button() {
        let mut script = DemoScript::tour((1000, 800));
        assert_eq!(
            script.due(20),
            vec![ScriptEvent::Pointer { x: 500.0, y: 440.0 }]
        );
        assert!(script.remaining() > 0);
    }

    #[test]
    fn test_steps_parse_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            script: Vec<ScriptStep>,
        }

        let text = r#"
            [[script]]
            frame = 3
            kind = "key_down"
            key = "Enter"

            [[script]]
            frame = 9
            kind = "back_to_game"
        "#;
        let wrapper: Wrapper = toml::from_str(text).expect("parse");
        assert_eq!(
            wrapper.script,
            vec![
                ScriptStep::at(3, ScriptEvent::KeyDown { key: KeyCode::Enter }),
                ScriptStep::at(9, ScriptEvent::BackToGame),
            ]
        );
    }
}
