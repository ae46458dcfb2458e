//! Configuration management for walkthru.
//!
//! Loads configuration from ${WALKTHRU_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::camera::Viewport;
use crate::host::Theme;
use crate::model::PlaybackMode;
use crate::walkthrough::WalkthroughOptions;

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for walkthru configuration and logs.
    //!
    //! WALKTHRU_HOME resolution order:
    //! 1. WALKTHRU_HOME environment variable (if set)
    //! 2. ~/.config/walkthru (default)
    //! 3. ./.walkthru when no home directory can be determined

    use std::path::PathBuf;

    pub fn walkthru_home() -> PathBuf {
        if let Ok(home) = std::env::var("WALKTHRU_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".walkthru"),
            |h| h.join(".config").join("walkthru"),
        )
    }

    pub fn config_path() -> PathBuf {
        walkthru_home().join("config.toml")
    }

    /// Directory for the interactive session's log file.
    pub fn logs_dir() -> PathBuf {
        walkthru_home().join("logs")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Virtual clock multiplier.
    pub speed: f64,
    /// Auto mode only.
    pub auto_loop: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            auto_loop: true,
        }
    }
}

/// Optional overrides of the per-mode gating defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatingConfig {
    pub wait_for_accept: Option<bool>,
    pub wait_for_insert: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            width: viewport.width,
            height: viewport.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: PlaybackMode,
    pub theme: Option<Theme>,
    pub log_level: String,
    pub tick_ms: u64,
    pub playback: PlaybackConfig,
    pub gating: GatingConfig,
    pub camera: CameraConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::Guided,
            theme: None,
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            tick_ms: Self::DEFAULT_TICK_MS,
            playback: PlaybackConfig::default(),
            gating: GatingConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_LOG_LEVEL: &str = "info";
    const DEFAULT_TICK_MS: u64 = 33;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };
        config
            .validate()
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.playback.speed.is_finite() && self.playback.speed > 0.0) {
            anyhow::bail!("playback.speed must be positive, got {}", self.playback.speed);
        }
        if self.tick_ms == 0 {
            anyhow::bail!("tick_ms must be at least 1");
        }
        if !(self.camera.width > 0.0 && self.camera.height > 0.0) {
            anyhow::bail!(
                "camera size must be positive, got {}x{}",
                self.camera.width,
                self.camera.height
            );
        }
        Ok(())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename).
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Orchestrator options for `mode` with this config's overrides applied.
    pub fn walkthrough_options(&self, mode: PlaybackMode) -> WalkthroughOptions {
        WalkthroughOptions {
            mode,
            wait_for_accept: self.gating.wait_for_accept,
            wait_for_insert: self.gating.wait_for_insert,
            auto_loop: mode == PlaybackMode::Auto && self.playback.auto_loop,
        }
    }

    /// The effective settings, defaults included, as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.camera.width, self.camera.height)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.mode, PlaybackMode::Guided);
        assert_eq!(config.tick(), Duration::from_millis(33));
    }

    #[test]
    fn test_effective_toml_reloads_to_the_same_config() {
        let config = Config {
            mode: PlaybackMode::Auto,
            theme: Some(Theme::Light),
            ..Config::default()
        };
        let text = config.to_toml().unwrap();
        assert!(text.contains("mode = \"auto\""));
        assert!(text.contains("theme = \"light\""));
        assert!(text.contains("[playback]"));

        let reloaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "mode = \"auto\"\n[gating]\nwait_for_accept = true\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.mode, PlaybackMode::Auto);
        assert_eq!(config.gating.wait_for_accept, Some(true));
        assert_eq!(config.gating.wait_for_insert, None);
        assert!((config.playback.speed - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("mode = \"guided\""));
        assert!(contents.contains("# wait_for_accept ="));
        assert!(!config_path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();
        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[playback]\nspeed = 0.0\n").unwrap();
        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("playback.speed"));
    }

    #[test]
    fn test_options_apply_overrides_and_loop_only_in_auto() {
        let mut config = Config::default();
        config.gating.wait_for_insert = Some(false);

        let guided = config.walkthrough_options(PlaybackMode::Guided);
        assert!(guided.wait_for_accept());
        assert!(!guided.wait_for_insert());
        assert!(!guided.auto_loop);

        let auto = config.walkthrough_options(PlaybackMode::Auto);
        assert!(!auto.wait_for_accept());
        assert!(auto.auto_loop);
    }
}
