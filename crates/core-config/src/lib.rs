//! Configuration loading and parsing.
//!
//! Parse `edwin.toml` (or an override path provided by the binary)
//! extracting `[text] tab_stop` and `[scroll] wheel_lines`. Both default
//! when absent and both are floored at 1: a zero tab stop would make the
//! layout pen divide by zero and a zero wheel step would turn the wheel
//! off silently. Unknown fields are ignored (TOML deserialization
//! tolerance) so the file can grow without breaking older binaries.
//!
//! A missing file and an unparseable file both land on defaults; the
//! latter is logged. Configuration can never stop the editor from coming
//! up.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TextConfig {
    /// Tab stop interval in runes.
    #[serde(default = "TextConfig::default_tab_stop")]
    pub tab_stop: u32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            tab_stop: Self::default_tab_stop(),
        }
    }
}

impl TextConfig {
    const fn default_tab_stop() -> u32 {
        8
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ScrollConfig {
    /// Display lines moved per mouse wheel notch.
    #[serde(default = "ScrollConfig::default_wheel_lines")]
    pub wheel_lines: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            wheel_lines: Self::default_wheel_lines(),
        }
    }
}

impl ScrollConfig {
    const fn default_wheel_lines() -> u32 {
        3
    }
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl Config {
    /// Floor both settings at 1, logging anything that had to move.
    fn sanitize(mut self) -> Self {
        if self.text.tab_stop == 0 {
            warn!(target: "config", field = "text.tab_stop", "config_value_floored");
            self.text.tab_stop = 1;
        }
        if self.scroll.wheel_lines == 0 {
            warn!(target: "config", field = "scroll.wheel_lines", "config_value_floored");
            self.scroll.wheel_lines = 1;
        }
        self
    }
}

/// Best-effort config path following platform conventions (XDG / AppData
/// Roaming): a local `edwin.toml` wins over the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("edwin.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("edwin").join("edwin.toml");
    }
    // Final fallback relative filename.
    PathBuf::from("edwin.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(cfg) => Ok(cfg.sanitize()),
            Err(e) => {
                warn!(
                    target: "config",
                    path = %path.display(),
                    error = %e,
                    "config_parse_failed"
                );
                Ok(Config::default())
            }
        },
        Err(_) => Ok(Config::default()),
    }
}
