//! Application-level configuration loading, including the runtime team colors set.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "JAWEB_BACK_CONFIG_PATH";
/// Fallback color returned when the colors set is empty.
const DEFAULT_COLOR: &str = "#2563EB";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    colors: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to a baked-in default colors set.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        count = app_config.colors.len(),
                        "loaded team colors set from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Return the display color for the team at `index`, cycling through the
    /// colors set so every team always receives a value.
    pub fn team_color_for(&self, index: usize) -> String {
        self.colors
            .get(index % self.colors.len().max(1))
            .cloned()
            .unwrap_or_else(|| DEFAULT_COLOR.to_owned())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            colors: default_colors(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    colors: Vec<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let colors = value
            .colors
            .into_iter()
            .filter(|color| !color.trim().is_empty())
            .collect::<Vec<_>>();

        if colors.is_empty() {
            Self::default()
        } else {
            Self { colors }
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in colors set shipped with the binary.
fn default_colors() -> Vec<String> {
    vec![
        "#FF5733".to_owned(),
        "#33A8FF".to_owned(),
        "#33FF57".to_owned(),
        "#D433FF".to_owned(),
        "#FFDA33".to_owned(),
        "#FF33A8".to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_cycle_past_the_end_of_the_set() {
        let config = AppConfig::default();
        assert_eq!(config.team_color_for(0), config.team_color_for(6));
        assert_eq!(config.team_color_for(1), config.team_color_for(7));
    }

    #[test]
    fn empty_raw_config_falls_back_to_defaults() {
        let config: AppConfig = RawConfig { colors: vec![] }.into();
        assert_eq!(config.team_color_for(0), "#FF5733");
    }
}
