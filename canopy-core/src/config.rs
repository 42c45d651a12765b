use crate::{
    constants::{DEFAULT_ASSISTANT_COMMAND, DEFAULT_UPDATE_CHECK_INTERVAL_MINUTES},
    paths,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub fn config_file() -> Result<PathBuf> {
    Ok(paths::config_dir()?.join("config.toml"))
}

/// Every section is optional; an empty file is a valid config.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How switched-to sessions are launched by the shell wrapper.
    #[serde(default)]
    pub session: SessionConfig,

    /// Background release check.
    #[serde(default)]
    pub update: UpdateConfig,

    /// Color theme configuration.
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Command the wrapper runs in a new session when auto-launch is on. For example:
    /// ```toml
    /// [session]
    /// assistant_command = "claude --continue"
    /// ```
    #[serde(default = "SessionConfig::default_assistant_command")]
    pub assistant_command: String,
    /// Whether switching launches the assistant. `--no-claude` overrides this to false.
    #[serde(default = "default_true")]
    pub auto_launch: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            assistant_command: Self::default_assistant_command(),
            auto_launch: true,
        }
    }
}

impl SessionConfig {
    fn default_assistant_command() -> String {
        DEFAULT_ASSISTANT_COMMAND.to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct UpdateConfig {
    #[serde(default = "default_true")]
    pub check: bool,
    /// Minimum time between two background checks.
    #[serde(default = "UpdateConfig::default_interval_minutes")]
    pub interval_minutes: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            check: true,
            interval_minutes: Self::default_interval_minutes(),
        }
    }
}

impl UpdateConfig {
    fn default_interval_minutes() -> u64 {
        DEFAULT_UPDATE_CHECK_INTERVAL_MINUTES
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    /// Titles, focused borders and the current-worktree marker (default: "magenta").
    #[serde(
        default = "ThemeConfig::default_accent",
        deserialize_with = "deserialize_color"
    )]
    pub accent: ThemeColor,
    /// Background of the selected row and help key names (default: "blue").
    #[serde(
        default = "ThemeConfig::default_selection",
        deserialize_with = "deserialize_color"
    )]
    pub selection: ThemeColor,
    /// Tag of a detached tmux session (default: "cyan").
    #[serde(
        default = "ThemeConfig::default_session",
        deserialize_with = "deserialize_color"
    )]
    pub session: ThemeColor,
    /// Tag of a tmux session with a client attached (default: "green").
    #[serde(
        default = "ThemeConfig::default_attached",
        deserialize_with = "deserialize_color"
    )]
    pub attached: ThemeColor,
    /// Status notices and the focused branch-name input (default: "green").
    #[serde(
        default = "ThemeConfig::default_notice",
        deserialize_with = "deserialize_color"
    )]
    pub notice: ThemeColor,
    /// Update-available notice (default: "yellow").
    #[serde(
        default = "ThemeConfig::default_update",
        deserialize_with = "deserialize_color"
    )]
    pub update: ThemeColor,
    /// Errors and the delete confirmation warning (default: "red").
    #[serde(
        default = "ThemeConfig::default_error",
        deserialize_with = "deserialize_color"
    )]
    pub error: ThemeColor,
    /// Paths, hints and placeholders (default: "gray").
    #[serde(
        default = "ThemeConfig::default_muted",
        deserialize_with = "deserialize_color"
    )]
    pub muted: ThemeColor,
    /// Unfocused borders (default: "gray").
    #[serde(
        default = "ThemeConfig::default_border",
        deserialize_with = "deserialize_color"
    )]
    pub border: ThemeColor,
    /// Text of the selected row (default: "white").
    #[serde(
        default = "ThemeConfig::default_highlight_fg",
        deserialize_with = "deserialize_color"
    )]
    pub highlight_fg: ThemeColor,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent: Self::default_accent(),
            selection: Self::default_selection(),
            session: Self::default_session(),
            attached: Self::default_attached(),
            notice: Self::default_notice(),
            update: Self::default_update(),
            error: Self::default_error(),
            muted: Self::default_muted(),
            border: Self::default_border(),
            highlight_fg: Self::default_highlight_fg(),
        }
    }
}

impl ThemeConfig {
    fn default_accent() -> ThemeColor {
        ThemeColor::Named(NamedColor::Magenta)
    }
    fn default_selection() -> ThemeColor {
        ThemeColor::Named(NamedColor::Blue)
    }
    fn default_session() -> ThemeColor {
        ThemeColor::Named(NamedColor::Cyan)
    }
    fn default_attached() -> ThemeColor {
        ThemeColor::Named(NamedColor::Green)
    }
    fn default_notice() -> ThemeColor {
        ThemeColor::Named(NamedColor::Green)
    }
    fn default_update() -> ThemeColor {
        ThemeColor::Named(NamedColor::Yellow)
    }
    fn default_error() -> ThemeColor {
        ThemeColor::Named(NamedColor::Red)
    }
    fn default_muted() -> ThemeColor {
        ThemeColor::Named(NamedColor::Gray)
    }
    fn default_border() -> ThemeColor {
        ThemeColor::Named(NamedColor::Gray)
    }
    fn default_highlight_fg() -> ThemeColor {
        ThemeColor::Named(NamedColor::White)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeColor {
    Named(NamedColor),
    Rgb(u8, u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
}

impl NamedColor {
    const ALL: [(&'static str, NamedColor); 9] = [
        ("black", NamedColor::Black),
        ("blue", NamedColor::Blue),
        ("cyan", NamedColor::Cyan),
        ("gray", NamedColor::Gray),
        ("green", NamedColor::Green),
        ("magenta", NamedColor::Magenta),
        ("red", NamedColor::Red),
        ("white", NamedColor::White),
        ("yellow", NamedColor::Yellow),
    ];

    pub fn as_str(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(_, color)| *color == self)
            .map_or("gray", |(name, _)| name)
    }
}

impl std::fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(n) => f.write_str(n.as_str()),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl ThemeColor {
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Self::Rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        let lower = s.to_lowercase();
        let lookup = if lower == "grey" { "gray" } else { &lower };
        NamedColor::ALL
            .iter()
            .find(|(name, _)| *name == lookup)
            .map(|(_, color)| Self::Named(*color))
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<ThemeColor, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ThemeColor::parse(&s).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid color '{s}': expected a named color (black, red, green, yellow, blue, magenta, cyan, white, gray/grey) or hex (#rrggbb)"
        ))
    })
}

pub fn load_config_from_str(s: &str) -> Result<Config> {
    let config: Config = toml::from_str(s)?;
    Ok(config)
}

/// Load the config file.
///
/// Without an override a missing default file yields the defaults; an explicitly
/// requested file must exist.
pub fn load_config(config_override: Option<&Path>) -> Result<Config> {
    let config_file = match config_override {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            path.to_path_buf()
        }
        None => {
            let path = config_file()?;
            if !path.exists() {
                log::debug!("no config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            path
        }
    };
    let contents = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed to read {}", config_file.display()))?;
    load_config_from_str(&contents)
        .with_context(|| format!("Invalid config in {}", config_file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.session.assistant_command, "claude");
        assert!(config.session.auto_launch);
        assert!(config.update.check);
        assert_eq!(config.update.interval(), Duration::from_secs(600));
        assert_eq!(config.theme.accent, ThemeColor::Named(NamedColor::Magenta));
    }

    #[test]
    fn test_full_config() {
        let config = load_config_from_str(
            r##"
[session]
assistant_command = "claude --continue"
auto_launch = false

[update]
check = false
interval_minutes = 60

[theme]
accent = "blue"
attached = "#ff00ff"
"##,
        )
        .unwrap();
        assert_eq!(config.session.assistant_command, "claude --continue");
        assert!(!config.session.auto_launch);
        assert!(!config.update.check);
        assert_eq!(config.update.interval_minutes, 60);
        assert_eq!(config.theme.accent, ThemeColor::Named(NamedColor::Blue));
        assert_eq!(config.theme.attached, ThemeColor::Rgb(255, 0, 255));
        assert_eq!(config.theme.session, ThemeColor::Named(NamedColor::Cyan));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(load_config_from_str("search_dirs = []").is_err());
        assert!(load_config_from_str("[session]\nsplit_command = \"hx\"").is_err());
    }

    #[test]
    fn test_theme_invalid_color_rejected() {
        let err = load_config_from_str("[theme]\naccent = \"notacolor\"")
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid color"), "Error was: {err}");
    }

    #[test]
    fn test_theme_color_parse() {
        assert_eq!(
            ThemeColor::parse("RED"),
            Some(ThemeColor::Named(NamedColor::Red))
        );
        assert_eq!(
            ThemeColor::parse("grey"),
            Some(ThemeColor::Named(NamedColor::Gray))
        );
        assert_eq!(
            ThemeColor::parse("#ff0000"),
            Some(ThemeColor::Rgb(255, 0, 0))
        );
        assert_eq!(ThemeColor::parse("notacolor"), None);
        assert_eq!(ThemeColor::parse("#fff"), None);
        assert_eq!(ThemeColor::parse("#zzzzzz"), None);
        assert_eq!(ThemeColor::parse("#éééé"), None);
    }

    #[test]
    fn test_theme_color_display() {
        assert_eq!(ThemeColor::Named(NamedColor::Cyan).to_string(), "cyan");
        assert_eq!(ThemeColor::Rgb(1, 2, 255).to_string(), "#0102ff");
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.toml");
        let err = load_config(Some(&missing)).unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn test_explicit_config_parse_error_names_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[update]\ninterval_minutes = \"soon\"").unwrap();
        let err = format!("{:#}", load_config(Some(&path)).unwrap_err());
        assert!(err.contains("config.toml"), "Error was: {err}");
    }
}
