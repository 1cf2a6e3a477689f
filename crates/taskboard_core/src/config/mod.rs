use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKBOARD_CONFIG_PATH";
const DEFAULT_REFRESH_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;213m",
            muted: "\x1b[38;5;245m",
            reset: "\x1b[0m",
        },
        Some("system") => Palette {
            accent: "\x1b[35m",
            muted: "\x1b[2m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            muted: "",
            reset: "",
        },
    }
}

/// Lower-snake-cases a theme name and folds the aliases the settings dialog
/// offers (`light`, `dark`) onto the palette names.
pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonicalize_key(raw);
    if cleaned.is_empty() {
        return Some("default".into());
    }

    match cleaned.as_str() {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Lowercases ASCII alphanumerics and collapses every other run of
/// characters into a single `_`.
pub fn canonicalize_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

/// How the store generates task ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStyle {
    #[default]
    Random,
    Sequential,
}

impl IdStyle {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match canonicalize_key(raw).as_str() {
            "random" | "uuid" => Ok(Self::Random),
            "sequential" | "counter" => Ok(Self::Sequential),
            other => Err(AppError::invalid_input(format!(
                "ids must be random or sequential, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Option<String>,
    pub notifications: bool,
    pub auto_archive: bool,
    pub refresh_delay_ms: u64,
    pub ids: IdStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            notifications: true,
            auto_archive: false,
            refresh_delay_ms: DEFAULT_REFRESH_DELAY_MS,
            ids: IdStyle::default(),
        }
    }
}

impl Config {
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub notifications: Option<bool>,
    pub auto_archive: Option<bool>,
    pub refresh_delay_ms: Option<u64>,
    pub ids: Option<IdStyle>,
}

impl ConfigOverrides {
    /// Whether any override changes how the store itself is built.
    pub fn affects_store(&self) -> bool {
        self.refresh_delay_ms.is_some() || self.ids.is_some()
    }

    /// Applies one `KEY=VALUE` pair. Key names are canonicalized, so
    /// `Auto-Archive` and `auto_archive` are the same field.
    pub fn apply(&mut self, raw: &str) -> Result<(), AppError> {
        let (key_raw, value_raw) = raw
            .trim()
            .split_once('=')
            .ok_or_else(|| AppError::invalid_input("override must be in KEY=VALUE format"))?;
        let key = canonicalize_key(key_raw);
        let value = value_raw.trim();

        match key.as_str() {
            "" => return Err(AppError::invalid_input("override key cannot be empty")),
            "theme" => self.theme = Some(value.to_string()),
            "notifications" => self.notifications = Some(parse_bool(&key, value)?),
            "auto_archive" => self.auto_archive = Some(parse_bool(&key, value)?),
            "refresh_delay_ms" => {
                let delay = value.parse::<u64>().map_err(|_| {
                    AppError::invalid_input(format!(
                        "refresh_delay_ms must be a whole number of milliseconds, got '{value}'"
                    ))
                })?;
                self.refresh_delay_ms = Some(delay);
            }
            "ids" => self.ids = Some(IdStyle::parse(value)?),
            other => {
                return Err(AppError::invalid_input(format!(
                    "unknown config field '{other}'"
                )));
            }
        }

        Ok(())
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = Self::default();
        for pair in pairs {
            overrides.apply(pair.as_ref())?;
        }
        Ok(overrides)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AppError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(AppError::invalid_input(format!(
            "{key} must be true or false, got '{value}'"
        ))),
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskboard")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskboard")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref() {
        merged.theme = canonical_theme_name(theme);
    }
    if let Some(notifications) = overrides.notifications {
        merged.notifications = notifications;
    }
    if let Some(auto_archive) = overrides.auto_archive {
        merged.auto_archive = auto_archive;
    }
    if let Some(delay) = overrides.refresh_delay_ms {
        merged.refresh_delay_ms = delay;
    }
    if let Some(ids) = overrides.ids {
        merged.ids = ids;
    }
    merged
}
