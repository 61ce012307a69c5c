use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::comment::CommentRule;

/// FIGlet layout mode, used for both the horizontal and vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "full")]
    Full,
    #[serde(rename = "fitted")]
    Fitted,
    #[serde(rename = "controlled smushing")]
    ControlledSmushing,
    #[serde(rename = "universal smushing")]
    UniversalSmushing,
}

impl Layout {
    pub const ALL: [Layout; 5] = [
        Layout::Default,
        Layout::Full,
        Layout::Fitted,
        Layout::ControlledSmushing,
        Layout::UniversalSmushing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Default => "default",
            Layout::Full => "full",
            Layout::Fitted => "fitted",
            Layout::ControlledSmushing => "controlled smushing",
            Layout::UniversalSmushing => "universal smushing",
        }
    }

    /// Whether glyphs are moved together until they touch.
    pub fn is_kerned(&self) -> bool {
        !matches!(self, Layout::Default | Layout::Full)
    }
}

/// How comment syntax is placed around a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStyle {
    /// Block comment around the whole banner, line comments as fallback
    Block,
    /// Line comment on every line, block comment as fallback
    Line,
    /// Every rule the language defines
    #[default]
    Both,
}

impl CommentStyle {
    pub const ALL: [CommentStyle; 3] = [CommentStyle::Block, CommentStyle::Line, CommentStyle::Both];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStyle::Block => "block",
            CommentStyle::Line => "line",
            CommentStyle::Both => "both",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for Layout {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|layout| layout.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "layout",
                value: s.to_string(),
            })
    }
}

impl FromStr for CommentStyle {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommentStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "comment style",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CommentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial banner settings.
///
/// Used for the process-wide defaults, for named configs and for ad-hoc
/// overrides. Every field is optional; `None` means "not set here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_layout: Option<Layout>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_layout: Option<Layout>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_trailing_whitespace: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_empty_lines: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_line_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_style: Option<CommentStyle>,
}

impl Settings {
    /// Built-in defaults used when nothing is persisted yet.
    pub fn builtin_defaults() -> Self {
        Self {
            font: Some(default_font()),
            horizontal_layout: Some(Layout::Default),
            vertical_layout: Some(Layout::Default),
            trim_trailing_whitespace: Some(true),
            trim_empty_lines: Some(true),
            prefix: Some(String::new()),
            suffix: Some(String::new()),
            per_line_prefix: Some(String::new()),
            comment_style: Some(CommentStyle::Both),
        }
    }

    /// Field-by-field merge: values set on `self` win, everything else falls
    /// back to `defaults`.
    pub fn merged_over(&self, defaults: &Settings) -> Settings {
        Settings {
            font: self.font.clone().or_else(|| defaults.font.clone()),
            horizontal_layout: self.horizontal_layout.or(defaults.horizontal_layout),
            vertical_layout: self.vertical_layout.or(defaults.vertical_layout),
            trim_trailing_whitespace: self
                .trim_trailing_whitespace
                .or(defaults.trim_trailing_whitespace),
            trim_empty_lines: self.trim_empty_lines.or(defaults.trim_empty_lines),
            prefix: self.prefix.clone().or_else(|| defaults.prefix.clone()),
            suffix: self.suffix.clone().or_else(|| defaults.suffix.clone()),
            per_line_prefix: self
                .per_line_prefix
                .clone()
                .or_else(|| defaults.per_line_prefix.clone()),
            comment_style: self.comment_style.or(defaults.comment_style),
        }
    }

    /// Display value of a field addressed by its persisted (camelCase) key.
    ///
    /// Returns `None` for unknown keys; unset fields render as `N/A`.
    pub fn describe_field(&self, key: &str) -> Option<String> {
        fn show<T: ToString>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "N/A".to_string())
        }

        let value = match key {
            "font" => show(&self.font),
            "horizontalLayout" => show(&self.horizontal_layout),
            "verticalLayout" => show(&self.vertical_layout),
            "trimTrailingWhitespace" => show(&self.trim_trailing_whitespace),
            "trimEmptyLines" => show(&self.trim_empty_lines),
            "prefix" => show(&self.prefix),
            "suffix" => show(&self.suffix),
            "perLinePrefix" => show(&self.per_line_prefix),
            "commentStyle" => show(&self.comment_style),
            _ => return None,
        };

        Some(value)
    }
}

pub fn default_font() -> String {
    "standard".to_string()
}

/// Renderer-facing part of a resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FigletConfig {
    pub font: Option<String>,
    pub horizontal_layout: Option<Layout>,
    pub vertical_layout: Option<Layout>,
}

/// Post-processing part of a resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub trim_trailing_whitespace: Option<bool>,
    pub trim_empty_lines: Option<bool>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub per_line_prefix: Option<String>,
    pub comment_style: Option<CommentStyle>,
}

/// Fully merged configuration for a single banner invocation.
///
/// Fields stay `None` only when neither the override nor the defaults set
/// them; the renderer treats those as "off" or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub figlet: FigletConfig,
    pub options: Options,
    pub comment: Option<CommentRule>,
}

impl ResolvedConfig {
    pub fn from_settings(settings: Settings, comment: Option<CommentRule>) -> Self {
        Self {
            figlet: FigletConfig {
                font: settings.font,
                horizontal_layout: settings.horizontal_layout,
                vertical_layout: settings.vertical_layout,
            },
            options: Options {
                trim_trailing_whitespace: settings.trim_trailing_whitespace,
                trim_empty_lines: settings.trim_empty_lines,
                prefix: settings.prefix,
                suffix: settings.suffix,
                per_line_prefix: settings.per_line_prefix,
                comment_style: settings.comment_style,
            },
            comment,
        }
    }

    /// Same configuration with a different font.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.figlet.font = Some(font.into());
        self
    }
}

/// Errors for named configs and the values persisted alongside them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no config found with name '{0}'")]
    NotFound(String),

    #[error("You must provide a name")]
    MissingName,

    #[error("Config with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Provided file path does not contain '.flf'")]
    InvalidCustomFont(String),

    #[error("Given file does not exist: {0}")]
    MissingCustomFont(String),
}

/// Name → partial settings, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedConfigs(IndexMap<String, Settings>);

impl NamedConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Settings> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Settings)> {
        self.0.iter().map(|(name, settings)| (name.as_str(), settings))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add a new config. Names are unique; existing entries are never replaced.
    pub fn insert_new(&mut self, name: &str, settings: Settings) -> Result<(), ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::MissingName);
        }
        if self.contains(name) {
            return Err(ConfigError::DuplicateName(name.to_string()));
        }
        self.0.insert(name.to_string(), settings);
        Ok(())
    }

    /// Picker description for a config.
    ///
    /// Without description keys this is `font:<font>`; otherwise every key is
    /// listed as `key: value | `.
    pub fn describe(&self, name: &str, description_keys: &[String]) -> Option<String> {
        let settings = self.get(name)?;

        if description_keys.is_empty() {
            return Some(format!(
                "font:{}",
                settings.font.as_deref().unwrap_or("N/A")
            ));
        }

        let mut description = String::new();
        for key in description_keys {
            let value = settings
                .describe_field(key)
                .unwrap_or_else(|| "N/A".to_string());
            description.push_str(&format!("{}: {} | ", key, value));
        }
        Some(description)
    }
}

/// Everything persisted under the banner settings namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    /// Process-wide defaults
    #[serde(flatten)]
    pub defaults: Settings,

    #[serde(default)]
    pub favorites: Vec<String>,

    #[serde(default)]
    pub custom_fonts: Vec<String>,

    #[serde(default)]
    pub configs: NamedConfigs,

    #[serde(default)]
    pub config_description_keys: Vec<String>,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            defaults: Settings::builtin_defaults(),
            favorites: Vec::new(),
            custom_fonts: Vec::new(),
            configs: NamedConfigs::new(),
            config_description_keys: Vec::new(),
        }
    }
}

impl StoredSettings {
    /// Add a favorite font. Returns `false` if it was already present.
    pub fn add_favorite(&mut self, font: &str) -> bool {
        push_unique(&mut self.favorites, font)
    }

    /// Remove a favorite font. Returns `false` if it was not present.
    pub fn remove_favorite(&mut self, font: &str) -> bool {
        remove_value(&mut self.favorites, font)
    }

    /// Add a custom font path. Returns `false` if it was already present.
    pub fn add_custom_font(&mut self, path: &str) -> bool {
        push_unique(&mut self.custom_fonts, path)
    }

    /// Remove a custom font path. Returns `false` if it was not present.
    pub fn remove_custom_font(&mut self, path: &str) -> bool {
        remove_value(&mut self.custom_fonts, path)
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|existing| existing == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_value(list: &mut Vec<String>, value: &str) -> bool {
    match list.iter().position(|existing| existing == value) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_override_per_field() {
        let defaults = Settings::builtin_defaults();
        let partial = Settings {
            font: Some("slant".to_string()),
            trim_empty_lines: Some(false),
            ..Settings::default()
        };

        let merged = partial.merged_over(&defaults);
        assert_eq!(merged.font.as_deref(), Some("slant"));
        assert_eq!(merged.trim_empty_lines, Some(false));
        assert_eq!(merged.horizontal_layout, Some(Layout::Default));
        assert_eq!(merged.comment_style, Some(CommentStyle::Both));
    }

    #[test]
    fn test_merge_leaves_missing_fields_unset() {
        let merged = Settings::default().merged_over(&Settings::default());
        assert_eq!(merged, Settings::default());
    }

    #[test]
    fn test_layout_parsing() {
        assert_eq!("fitted".parse::<Layout>().unwrap(), Layout::Fitted);
        assert_eq!(
            "Universal Smushing".parse::<Layout>().unwrap(),
            Layout::UniversalSmushing
        );
        assert!("squashed".parse::<Layout>().is_err());
    }

    #[test]
    fn test_comment_style_parsing_ignores_case() {
        assert_eq!("Block".parse::<CommentStyle>().unwrap(), CommentStyle::Block);
        assert_eq!("LINE".parse::<CommentStyle>().unwrap(), CommentStyle::Line);
    }

    #[test]
    fn test_named_configs_reject_duplicates() {
        let mut configs = NamedConfigs::new();
        configs.insert_new("header", Settings::default()).unwrap();

        let err = configs.insert_new("header", Settings::default()).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateName("header".to_string()));
        assert_eq!(configs.len(), 1);

        assert_eq!(
            configs.insert_new("", Settings::default()).unwrap_err(),
            ConfigError::MissingName
        );
    }

    #[test]
    fn test_describe_config() {
        let mut configs = NamedConfigs::new();
        configs
            .insert_new(
                "big",
                Settings {
                    font: Some("banner3".to_string()),
                    ..Settings::default()
                },
            )
            .unwrap();
        configs.insert_new("plain", Settings::default()).unwrap();

        assert_eq!(configs.describe("big", &[]).unwrap(), "font:banner3");
        assert_eq!(configs.describe("plain", &[]).unwrap(), "font:N/A");

        let keys = vec!["font".to_string(), "commentStyle".to_string()];
        assert_eq!(
            configs.describe("big", &keys).unwrap(),
            "font: banner3 | commentStyle: N/A | "
        );
        assert!(configs.describe("missing", &[]).is_none());
    }

    #[test]
    fn test_favorites_are_unique() {
        let mut stored = StoredSettings::default();
        assert!(stored.add_favorite("slant"));
        assert!(!stored.add_favorite("slant"));
        assert_eq!(stored.favorites, vec!["slant".to_string()]);

        assert!(stored.remove_favorite("slant"));
        assert!(!stored.remove_favorite("slant"));
        assert!(stored.favorites.is_empty());
    }

    #[test]
    fn test_stored_settings_yaml_shape() {
        let yaml = r#"
font: slant
horizontalLayout: controlled smushing
favorites: [standard]
configs:
  header:
    font: banner
    commentStyle: line
"#;
        let stored: StoredSettings = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(stored.defaults.font.as_deref(), Some("slant"));
        assert_eq!(
            stored.defaults.horizontal_layout,
            Some(Layout::ControlledSmushing)
        );
        assert_eq!(stored.defaults.trim_empty_lines, None);
        assert_eq!(stored.favorites, vec!["standard".to_string()]);

        let header = stored.configs.get("header").unwrap();
        assert_eq!(header.comment_style, Some(CommentStyle::Line));
    }
}
