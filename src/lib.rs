// Banner Comments - large block-letter banners wrapped in comment syntax
//
// This is the library crate containing the banner pipeline and command surface.
// The binary crate (main.rs) provides the command-line host.

pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;

#[cfg(test)]
mod test_support;

// Re-export commonly used types for convenience
pub use commands::{BannerComments, Command, Editor, Outcome, PickItem, Prompter};
pub use config::{FileSettingsStore, MemorySettingsStore, SettingsStore};
pub use models::{CommentRule, ResolvedConfig, Settings, StoredSettings};
pub use services::{BannerRenderer, FigletRs, FontRegistry};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
