//! Font registry: builtin, packaged and user-supplied FIGlet fonts.
//!
//! The registry wraps a [`FigletBackend`] and is itself a backend. Listing and
//! loading consult the packaged and custom font sets first and fall back to
//! the wrapped backend, so anything rendering through the registry sees every
//! known font.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::fs;

use super::figlet::{FONT_FILE_EXTENSION, FigletBackend, FontError, RenderError};
use crate::models::Layout;

/// Strip a trailing `.flf` from a file name or path, if present.
pub fn strip_font_extension(name: &str) -> &str {
    name.strip_suffix(FONT_FILE_EXTENSION).unwrap_or(name)
}

/// Tracks font names from three sources and resolves names to font data.
///
/// Registration is idempotent: adding a name that is already known is a no-op.
#[derive(Debug)]
pub struct FontRegistry<B> {
    backend: B,
    fonts_dir: Option<Utf8PathBuf>,
    packaged: IndexSet<String>,
    custom: IndexSet<String>,
}

impl<B: FigletBackend> FontRegistry<B> {
    /// Create a registry over `backend`. Packaged fonts are loaded from
    /// `fonts_dir` when it is set.
    pub fn new(backend: B, fonts_dir: Option<Utf8PathBuf>) -> Self {
        Self {
            backend,
            fonts_dir,
            packaged: IndexSet::new(),
            custom: IndexSet::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn fonts_dir(&self) -> Option<&Utf8Path> {
        self.fonts_dir.as_deref()
    }

    /// Register packaged fonts from a directory listing. Entries without the
    /// font file extension are ignored.
    pub fn register_packaged_fonts<I, S>(&mut self, listing: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for file in listing {
            if let Some(name) = file.as_ref().strip_suffix(FONT_FILE_EXTENSION) {
                if self.packaged.insert(name.to_string()) {
                    tracing::debug!("Registered packaged font '{}'", name);
                }
            }
        }
    }

    /// Register user fonts by path. The font name is the path without its
    /// extension.
    pub fn register_custom_fonts<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            let name = strip_font_extension(path.as_ref());
            if self.custom.insert(name.to_string()) {
                tracing::debug!("Registered custom font '{}'", name);
            }
        }
    }

    /// Scan the packaged fonts directory and register every font file in it.
    ///
    /// Does nothing when no fonts directory is configured.
    pub fn load_packaged_fonts(&mut self) -> Result<usize> {
        let Some(dir) = self.fonts_dir.clone() else {
            return Ok(0);
        };

        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read fonts directory: {}", dir))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to read entry in {}", dir))?;
            if let Ok(name) = entry.file_name().into_string() {
                files.push(name);
            }
        }
        files.sort();

        let before = self.packaged.len();
        self.register_packaged_fonts(&files);

        tracing::info!(
            "Loaded {} packaged font(s) from {}",
            self.packaged.len() - before,
            dir
        );
        Ok(self.packaged.len() - before)
    }

    pub fn packaged_fonts(&self) -> impl Iterator<Item = &str> {
        self.packaged.iter().map(String::as_str)
    }

    pub fn custom_fonts(&self) -> impl Iterator<Item = &str> {
        self.custom.iter().map(String::as_str)
    }

    /// Builtin, packaged and custom names, in that order.
    ///
    /// Names registered in more than one source are listed once per source.
    pub fn list_available_font_names(&self) -> Vec<String> {
        let mut names = self.backend.list_fonts();
        names.extend(self.packaged.iter().cloned());
        names.extend(self.custom.iter().cloned());
        names
    }

    /// Resolve a font name to font data.
    ///
    /// Packaged fonts load from the fonts directory, custom fonts from their
    /// own path; anything else is delegated to the wrapped backend.
    pub fn resolve_font(&self, name: &str) -> Result<B::Font, FontError> {
        if self.packaged.contains(name) {
            let dir = self.fonts_dir.as_deref().unwrap_or(Utf8Path::new(""));
            let path = dir.join(format!("{}{}", name, FONT_FILE_EXTENSION));
            return self.backend.load_font_file(name, &path);
        }

        if self.custom.contains(name) {
            let path = Utf8PathBuf::from(format!("{}{}", name, FONT_FILE_EXTENSION));
            return self.backend.load_font_file(name, &path);
        }

        self.backend.load_font(name).map_err(|err| {
            tracing::debug!("Backend could not load '{}': {}", name, err);
            FontError::NotFound(name.to_string())
        })
    }
}

impl<B: FigletBackend> FigletBackend for FontRegistry<B> {
    type Font = B::Font;

    fn list_fonts(&self) -> Vec<String> {
        self.list_available_font_names()
    }

    fn load_font(&self, name: &str) -> Result<Self::Font, FontError> {
        self.resolve_font(name)
    }

    fn load_font_file(&self, name: &str, path: &Utf8Path) -> Result<Self::Font, FontError> {
        self.backend.load_font_file(name, path)
    }

    fn render(
        &self,
        text: &str,
        font: &Self::Font,
        horizontal: Layout,
        vertical: Layout,
    ) -> Result<String, RenderError> {
        self.backend.render(text, font, horizontal, vertical)
    }
}
