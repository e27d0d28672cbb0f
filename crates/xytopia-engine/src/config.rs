//! Engine configuration.
//!
//! Frame loop timing, the demo input script, key rebinding and the nested
//! gameplay settings.
//! Configuration is read from `xytopia.toml` beside the executable, or from
//! the path in `$XYTOPIA_CONFIG`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use xytopia_gameplay::{Action, GameSettings, KeyBinding, KeyCode};

use crate::script::ScriptStep;

/// Configuration file name.
const CONFIG_FILE: &str = "xytopia.toml";

/// Environment variable overriding the configuration path.
const CONFIG_ENV: &str = "XYTOPIA_CONFIG";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Loop Settings ===
    /// Fixed simulation step in seconds
    pub fixed_timestep: f32,
    /// Simulated wall time per rendered frame in seconds
    pub frame_time: f32,
    /// Frames to run before exiting
    pub frames: u32,
    /// Queue depth of each shell signal subscriber
    pub signal_capacity: usize,

    // === Demo Input ===
    /// Scripted input; the built-in tour when unset
    pub script: Option<Vec<ScriptStep>>,

    // === Controls ===
    /// Replacement keys for individual actions
    pub bindings: Vec<BindingOverride>,

    // === Gameplay ===
    /// Viewport, world, avatar and camera settings
    pub game: GameSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            frame_time: 1.0 / 60.0,
            frames: 600,
            signal_capacity: 16,
            script: None,
            bindings: Vec::new(),
            game: GameSettings::default(),
        }
    }
}

/// Keys to use for one action instead of its defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingOverride {
    /// Rebound action
    pub action: Action,
    /// New keys; replaces all defaults for the action
    pub keys: Vec<KeyCode>,
}

impl BindingOverride {
    /// The override as an input binding.
    #[must_use]
    pub fn binding(&self) -> KeyBinding {
        KeyBinding::of(&self.keys)
    }
}

impl EngineConfig {
    /// Load configuration from `$XYTOPIA_CONFIG` or beside the executable.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Falls back to defaults when the file is missing or invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                return Self::default();
            },
            Err(e) => {
                warn!("Cannot read {}: {e}", path.display());
                return Self::default();
            },
        };

        toml::from_str::<Self>(&contents).map_or_else(
            |e| {
                warn!("Invalid config {}: {e}", path.display());
                Self::default()
            },
            |config| {
                info!("Loaded config from {}", path.display());
                config
            },
        )
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// `$XYTOPIA_CONFIG`, else `xytopia.toml` next to the executable, else
    /// the working directory.
    fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE)))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Loop
        self.fixed_timestep = self.fixed_timestep.clamp(0.001, 0.1);
        self.frame_time = self.frame_time.clamp(0.001, 0.25);
        self.frames = self.frames.clamp(1, 1_000_000);
        self.signal_capacity = self.signal_capacity.clamp(1, 1024);

        // Viewport
        let (w, h) = self.game.viewport;
        self.game.viewport = (w.clamp(320, 7680), h.clamp(240, 4320));

        // World
        self.game.world_width = self.game.world_width.clamp(1, 4096);
        self.game.world_height = self.game.world_height.clamp(24, 4096);
        self.game.tile_size = self.game.tile_size.clamp(4.0, 256.0);
        self.game.gravity = self.game.gravity.clamp(0.0, 5000.0);

        // Controls
        self.bindings.retain(|o| {
            if o.keys.is_empty() {
                warn!("Ignoring empty binding for {:?}", o.action);
            }
            !o.keys.is_empty()
        });
    }
}
