//! Services module - the banner pipeline.
//!
//! Everything here is independent of any particular host: documents, prompts
//! and the settings store are reached through traits, so the same code runs
//! behind the CLI and in tests.
//!
//! # Components
//!
//! - [`FigletBackend`] / [`FigletRs`]: block-letter rendering over `figlet-rs`
//! - [`FontRegistry`]: packaged and user fonts layered over any backend
//! - [`LanguageCommentResolver`]: comment syntax per language id, read from
//!   language configuration files of installed contributions
//! - [`ConfigResolver`]: merges named configs over the defaults
//! - [`BannerRenderer`]: block letters + prefix/suffix + trimming + comments
//! - [`apply_to_selections`]: atomic multi-selection replacement on a
//!   [`TextDocument`]
//!
//! # Usage Example
//!
//! ```ignore
//! use banner_comments::models::{ResolvedConfig, Settings};
//! use banner_comments::services::{BannerRenderer, FigletRs, FontRegistry};
//!
//! let registry = FontRegistry::new(FigletRs::new(), None);
//! let renderer = BannerRenderer::new(&registry);
//! let config = ResolvedConfig::from_settings(Settings::builtin_defaults(), None);
//!
//! let banner = renderer.render("Hello", &config)?;
//! ```

pub mod banner;
pub mod edit;
pub mod figlet;
pub mod fonts;
pub mod language;
pub mod resolver;

pub use banner::{BannerRenderer, CommentPlan};
pub use edit::{
    ApplyError, Buffer, EditBuilder, EditError, LineEnding, Position, Range, Selection,
    TextDocument, TextEdit, apply_to_selections,
};
pub use figlet::{
    BUILTIN_FONT, FONT_FILE_EXTENSION, FigletBackend, FigletRs, FontError, RenderError,
};
pub use fonts::{FontRegistry, strip_font_extension};
pub use language::{
    ContributionSource, EXCLUDED_LANGUAGE_IDS, ExtensionScanner, LanguageCommentResolver,
    LanguageConfigError, LanguageContribution, read_comment_rule,
};
pub use resolver::ConfigResolver;
