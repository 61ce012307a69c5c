//! Language comment resolution.
//!
//! Editors let any installed extension contribute a language, so one language
//! id may be defined several times. Each contribution may point at a language
//! configuration file whose `comments` entry holds the syntax we need. Those
//! files are JSON with comments, so they are parsed with `json5`.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use thiserror::Error;

use crate::models::{CommentRule, LanguageConfiguration};

/// Language ids that never get comment wrapping.
pub const EXCLUDED_LANGUAGE_IDS: &[&str] = &["plaintext"];

/// One language definition contributed by an installed extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageContribution {
    pub id: String,
    /// File extensions, including the leading dot
    pub extensions: Vec<String>,
    /// Language configuration file, if the contribution names one
    pub configuration: Option<Utf8PathBuf>,
    /// Where the contribution came from (extension directory or name)
    pub source: Option<String>,
}

impl LanguageContribution {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_configuration(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.configuration = Some(path.into());
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

/// Supplies every installed language contribution, in provider order.
pub trait ContributionSource {
    fn contributions(&self) -> Vec<LanguageContribution>;
}

impl ContributionSource for Vec<LanguageContribution> {
    fn contributions(&self) -> Vec<LanguageContribution> {
        self.clone()
    }
}

impl<T: ContributionSource + ?Sized> ContributionSource for &T {
    fn contributions(&self) -> Vec<LanguageContribution> {
        (**self).contributions()
    }
}

/// Errors reading a language configuration file
#[derive(Error, Debug)]
pub enum LanguageConfigError {
    #[error("Failed to read language config {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse language config {path}: {message}")]
    Parse { path: Utf8PathBuf, message: String },
}

/// Read the comment rule from a language configuration file.
///
/// Returns `Ok(None)` when the file has no `comments` entry or it is empty.
pub fn read_comment_rule(path: &Utf8Path) -> Result<Option<CommentRule>, LanguageConfigError> {
    let content = fs::read_to_string(path).map_err(|source| LanguageConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: LanguageConfiguration =
        json5::from_str(&content).map_err(|err| LanguageConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    Ok(config.comments.filter(|rule| !rule.is_empty()))
}

/// Finds the comment rule for a language id among all contributions.
pub struct LanguageCommentResolver<S> {
    source: S,
    excluded: Vec<String>,
}

impl<S: ContributionSource> LanguageCommentResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            excluded: EXCLUDED_LANGUAGE_IDS.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Comment rule for `language_id`, if any contribution defines one.
    ///
    /// With several definitions the first one (in provider order) that has a
    /// non-empty rule wins. Missing or malformed configuration files are
    /// logged and treated as "no rule".
    pub fn comment_rule(&self, language_id: Option<&str>) -> Option<CommentRule> {
        let language_id = language_id?;
        if self.excluded.iter().any(|id| id == language_id) {
            tracing::debug!("Language '{}' is excluded from comment wrapping", language_id);
            return None;
        }

        let configurations: Vec<Utf8PathBuf> = self
            .source
            .contributions()
            .into_iter()
            .filter(|contribution| contribution.id == language_id)
            .filter_map(|contribution| contribution.configuration)
            .collect();

        match configurations.as_slice() {
            [] => {
                tracing::warn!("Language config not found for '{}'", language_id);
                None
            }
            [only] => Self::load(only),
            many => {
                tracing::debug!(
                    "{} language configs define '{}'",
                    many.len(),
                    language_id
                );
                many.iter().find_map(|path| Self::load(path))
            }
        }
    }

    fn load(path: &Utf8Path) -> Option<CommentRule> {
        if !path.exists() {
            tracing::warn!("Language config not found: {}", path);
            return None;
        }

        match read_comment_rule(path) {
            Ok(rule) => rule,
            Err(err) => {
                tracing::warn!("{}", err);
                None
            }
        }
    }

    /// Language id for a file, matched by extension against contributions.
    pub fn language_for_path(&self, path: &Utf8Path) -> Option<String> {
        let extension = format!(".{}", path.extension()?);
        self.source
            .contributions()
            .into_iter()
            .find(|contribution| {
                contribution
                    .extensions
                    .iter()
                    .any(|ext| ext.eq_ignore_ascii_case(&extension))
            })
            .map(|contribution| contribution.id)
    }
}

#[derive(Deserialize)]
struct PackageManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    contributes: Option<Contributes>,
}

#[derive(Deserialize)]
struct Contributes {
    #[serde(default)]
    languages: Vec<ManifestLanguage>,
}

#[derive(Deserialize)]
struct ManifestLanguage {
    id: String,
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    configuration: Option<String>,
}

/// Reads language contributions from installed extension directories.
///
/// Every `<root>/<extension>/package.json` is read; `contributes.languages`
/// entries become contributions with their configuration path resolved
/// against the extension directory. Roots are scanned in the order given and
/// extensions in name order.
#[derive(Debug, Clone, Default)]
pub struct ExtensionScanner {
    roots: Vec<Utf8PathBuf>,
}

impl ExtensionScanner {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a single extension's manifest.
    pub fn read_extension(extension_dir: &Utf8Path) -> Result<Vec<LanguageContribution>> {
        let manifest_path = extension_dir.join("package.json");
        let content = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read extension manifest: {}", manifest_path))?;

        let manifest: PackageManifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse extension manifest: {}", manifest_path))?;

        let source = manifest
            .name
            .unwrap_or_else(|| extension_dir.to_string());

        Ok(manifest
            .contributes
            .map(|contributes| contributes.languages)
            .unwrap_or_default()
            .into_iter()
            .map(|language| LanguageContribution {
                id: language.id,
                extensions: language.extensions,
                configuration: language
                    .configuration
                    .map(|relative| extension_dir.join(relative.trim_start_matches("./"))),
                source: Some(source.clone()),
            })
            .collect())
    }

    fn scan_root(root: &Utf8Path) -> Result<Vec<LanguageContribution>> {
        let mut extension_dirs: Vec<Utf8PathBuf> = root
            .read_dir_utf8()
            .with_context(|| format!("Failed to read extensions directory: {}", root))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.join("package.json").is_file())
            .collect();
        extension_dirs.sort();

        let mut contributions = Vec::new();
        for dir in extension_dirs {
            match Self::read_extension(&dir) {
                Ok(found) => contributions.extend(found),
                Err(err) => tracing::warn!("Skipping extension {}: {:#}", dir, err),
            }
        }
        Ok(contributions)
    }
}

impl ContributionSource for ExtensionScanner {
    fn contributions(&self) -> Vec<LanguageContribution> {
        let mut contributions = Vec::new();
        for root in &self.roots {
            match Self::scan_root(root) {
                Ok(found) => contributions.extend(found),
                Err(err) => tracing::warn!("{:#}", err),
            }
        }
        contributions
    }
}
