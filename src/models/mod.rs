//! Data models for banner generation.
//!
//! - [`Settings`]: partial banner settings (defaults, named configs, overrides)
//! - [`StoredSettings`]: everything persisted under the settings namespace
//! - [`ResolvedConfig`]: fully merged configuration consumed by the renderer
//! - [`CommentRule`]: line/block comment syntax of a language
//!
//! All persisted structs derive `Serialize`/`Deserialize` with camelCase keys,
//! so a settings file written by hand reads the same as the editor settings it
//! mirrors.

pub mod comment;
pub mod settings;

pub use comment::{CommentRule, LanguageConfiguration};
pub use settings::{
    CommentStyle, ConfigError, FigletConfig, Layout, NamedConfigs, Options, ResolvedConfig,
    Settings, StoredSettings, default_font,
};
