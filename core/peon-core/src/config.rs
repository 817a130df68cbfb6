//! Runtime configuration (`~/.peon-pet/config.toml`).
//!
//! Every field has a default, so a missing file or a partial file both load.
//!
//! ```toml
//! [sessions]
//! hot_window_ms = 30000
//! warm_window_ms = 120000
//! max_sessions = 10
//!
//! [animation]
//! skin = "laptop"
//! reaction_loops = 2
//! ```

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PetError, Result};
use crate::skin::DEFAULT_SKIN;

const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".peon-pet/config.toml";
const DEFAULT_STATE_RELATIVE_PATH: &str = ".peon-pet/state.json";

pub const DEFAULT_HOT_WINDOW_MS: u64 = 30_000;
pub const DEFAULT_WARM_WINDOW_MS: u64 = 120_000;
pub const DEFAULT_PRUNE_AFTER_MS: u64 = 10 * 60_000;
pub const DEFAULT_MAX_SESSIONS: usize = 5;
pub const DEFAULT_RESTART_MERGE_WINDOW_MS: u64 = 5_000;

pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 300;
pub const DEFAULT_REACTION_LOOPS: u32 = 1;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seen within this window ⇒ hot (actively working).
    pub hot_window_ms: u64,
    /// Seen within this window ⇒ warm (open but quiet).
    pub warm_window_ms: u64,
    /// Sessions silent longer than this leave the roster.
    pub prune_after_ms: u64,
    pub max_sessions: usize,
    /// A lone session seen this recently is folded into a new SessionStart.
    pub restart_merge_window_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hot_window_ms: DEFAULT_HOT_WINDOW_MS,
            warm_window_ms: DEFAULT_WARM_WINDOW_MS,
            prune_after_ms: DEFAULT_PRUNE_AFTER_MS,
            max_sessions: DEFAULT_MAX_SESSIONS,
            restart_merge_window_ms: DEFAULT_RESTART_MERGE_WINDOW_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub skin: String,
    pub idle_timeout_ms: u64,
    pub settle_delay_ms: u64,
    /// Times a reaction plays before settling. 0 behaves like 1.
    pub reaction_loops: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            skin: DEFAULT_SKIN.to_string(),
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            reaction_loops: DEFAULT_REACTION_LOOPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub frame_interval_ms: u64,
    /// Defaults to `~/.peon-pet/state.json`.
    pub state_file: Option<PathBuf>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            state_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetConfig {
    pub sessions: SessionConfig,
    pub animation: AnimationConfig,
    pub poll: PollConfig,
}

impl PetConfig {
    pub fn validate(&self) -> Result<()> {
        let sessions = &self.sessions;
        if sessions.hot_window_ms >= sessions.warm_window_ms {
            return Err(PetError::InvalidConfig(format!(
                "hot_window_ms ({}) must be shorter than warm_window_ms ({})",
                sessions.hot_window_ms, sessions.warm_window_ms
            )));
        }
        if sessions.max_sessions == 0 {
            return Err(PetError::InvalidConfig(
                "max_sessions must be at least 1".to_string(),
            ));
        }
        if sessions.prune_after_ms < sessions.warm_window_ms {
            return Err(PetError::InvalidConfig(format!(
                "prune_after_ms ({}) must not be shorter than warm_window_ms ({})",
                sessions.prune_after_ms, sessions.warm_window_ms
            )));
        }
        if self.poll.interval_ms == 0 || self.poll.frame_interval_ms == 0 {
            return Err(PetError::InvalidConfig(
                "poll intervals must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn state_file_path(&self) -> Option<PathBuf> {
        self.poll
            .state_file
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(DEFAULT_STATE_RELATIVE_PATH)))
    }
}

/// Returns the path to the default config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_RELATIVE_PATH))
}

/// Loads and validates the config; a missing file yields defaults.
pub fn load_config(path: Option<PathBuf>) -> Result<PetConfig> {
    let path = match path.or_else(default_config_path) {
        Some(path) => path,
        None => return Ok(PetConfig::default()),
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file missing; using defaults");
        return Ok(PetConfig::default());
    }

    let config = parse_config_file(&path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<PetConfig> {
    let content = fs::read_to_string(path).map_err(|source| PetError::Io {
        context: format!("reading {}", path.display()),
        source,
    })?;
    toml::from_str::<PetConfig>(&content).map_err(|err| PetError::ConfigMalformed {
        path: path.to_path_buf(),
        details: err.to_string(),
    })
}
