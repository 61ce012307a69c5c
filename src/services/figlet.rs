//! Large-character rendering capability.
//!
//! [`FigletBackend`] is the seam between banner composition and the library
//! that actually draws block letters. [`FigletRs`] implements it on top of the
//! `figlet-rs` crate; [`crate::services::FontRegistry`] decorates any backend
//! with packaged and user-supplied fonts.

use camino::{Utf8Path, Utf8PathBuf};
use figlet_rs::FIGfont;
use std::fs;
use thiserror::Error;

use crate::models::Layout;

/// Extension of FIGlet font files.
pub const FONT_FILE_EXTENSION: &str = ".flf";

/// Name of the font every FIGlet implementation ships with.
pub const BUILTIN_FONT: &str = "standard";

/// Errors that can occur while locating or loading a font
#[derive(Error, Debug)]
pub enum FontError {
    #[error("Font '{0}' not found")]
    NotFound(String),

    #[error("Failed to read font file {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid font data in '{name}': {message}")]
    Parse { name: String, message: String },
}

/// Errors that can occur while rendering banner text
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Font(#[from] FontError),

    #[error("Font '{0}' has no glyphs to render with")]
    EmptyFont(String),
}

/// Renders short text as multi-line block-letter art.
#[cfg_attr(test, mockall::automock(type Font = String;))]
pub trait FigletBackend {
    /// Loaded font data, opaque to callers.
    type Font;

    /// Names of every font this backend can load by name.
    fn list_fonts(&self) -> Vec<String>;

    /// Load a font by name.
    fn load_font(&self, name: &str) -> Result<Self::Font, FontError>;

    /// Load a font from a `.flf` file on disk.
    fn load_font_file(&self, name: &str, path: &Utf8Path) -> Result<Self::Font, FontError>;

    /// Render `text` with an already loaded font. Lines are separated by `\n`
    /// and the result carries no trailing newline.
    fn render(
        &self,
        text: &str,
        font: &Self::Font,
        horizontal: Layout,
        vertical: Layout,
    ) -> Result<String, RenderError>;
}

/// [`FigletBackend`] backed by `figlet-rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FigletRs;

/// A glyph block: one string per row, all rows for one rendered input line.
type Block = Vec<String>;

impl FigletRs {
    pub fn new() -> Self {
        Self
    }

    fn glyph(font: &FIGfont, ch: char) -> Block {
        font.convert(&ch.to_string())
            .map(|figure| figure.to_string().lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Render a single line of input into a block, joining glyphs according
    /// to the horizontal layout.
    fn render_line(font: &FIGfont, line: &str, layout: Layout) -> Block {
        let height = Self::glyph(font, ' ').len();
        let mut rows: Block = vec![String::new(); height];
        // Word gaps are kept at full width on both sides
        let mut after_gap = true;

        for ch in line.chars() {
            let glyph = Self::glyph(font, ch);
            if glyph.is_empty() {
                tracing::debug!("No glyph for {:?}, skipping", ch);
                continue;
            }
            if rows.len() < glyph.len() {
                let width = rows.first().map_or(0, |row| row.chars().count());
                rows.resize(glyph.len(), " ".repeat(width));
            }

            let gap = glyph.iter().all(|row| is_blank(row));
            let overlap = if layout.is_kerned() && !gap && !after_gap {
                kerning_distance(&rows, &glyph)
            } else {
                0
            };
            join_glyph(&mut rows, &glyph, overlap);
            after_gap = gap;
        }

        rows
    }
}

fn leading_blanks(s: &str) -> usize {
    s.chars().take_while(|c| *c == ' ').count()
}

fn trailing_blanks(s: &str) -> usize {
    s.chars().rev().take_while(|c| *c == ' ').count()
}

fn is_blank(row: &str) -> bool {
    row.chars().all(|c| c == ' ')
}

/// Columns a glyph can move left before touching the block on any row.
fn kerning_distance(rows: &[String], glyph: &[String]) -> usize {
    rows.iter()
        .zip(glyph)
        .map(|(left, right)| {
            if is_blank(right) {
                // Blank glyph rows never touch; bound by the glyph width instead
                trailing_blanks(left) + right.chars().count()
            } else {
                trailing_blanks(left) + leading_blanks(right)
            }
        })
        .min()
        .unwrap_or(0)
}

/// Append `glyph` to `rows`, removing `overlap` blank columns at the seam.
fn join_glyph(rows: &mut [String], glyph: &[String], overlap: usize) {
    for (index, row) in rows.iter_mut().enumerate() {
        let right = glyph.get(index).map(String::as_str).unwrap_or("");
        let from_left = trailing_blanks(row).min(overlap);
        let from_right = (overlap - from_left).min(right.chars().count());

        let keep = row.chars().count() - from_left;
        let mut joined: String = row.chars().take(keep).collect();
        joined.extend(right.chars().skip(from_right));
        *row = joined;
    }
}

/// Stack line blocks, collapsing shared blank rows for kerned vertical layouts.
fn stack_blocks(blocks: Vec<Block>, layout: Layout) -> Block {
    let mut stacked: Block = Vec::new();

    for block in blocks {
        if layout.is_kerned() && !stacked.is_empty() {
            let upper = stacked.iter().rev().take_while(|row| is_blank(row)).count();
            let lower = block.iter().take_while(|row| is_blank(row)).count();
            let overlap = upper.min(lower);
            stacked.truncate(stacked.len() - overlap);
        }
        stacked.extend(block);
    }

    stacked
}

impl FigletBackend for FigletRs {
    type Font = FIGfont;

    fn list_fonts(&self) -> Vec<String> {
        vec![BUILTIN_FONT.to_string()]
    }

    fn load_font(&self, name: &str) -> Result<FIGfont, FontError> {
        if !name.eq_ignore_ascii_case(BUILTIN_FONT) {
            return Err(FontError::NotFound(name.to_string()));
        }

        FIGfont::standard().map_err(|message| FontError::Parse {
            name: name.to_string(),
            message,
        })
    }

    fn load_font_file(&self, name: &str, path: &Utf8Path) -> Result<FIGfont, FontError> {
        let content = fs::read_to_string(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let font = FIGfont::from_content(&content).map_err(|message| FontError::Parse {
            name: name.to_string(),
            message,
        })?;

        tracing::debug!("Loaded font '{}' from {}", name, path);
        Ok(font)
    }

    fn render(
        &self,
        text: &str,
        font: &FIGfont,
        horizontal: Layout,
        vertical: Layout,
    ) -> Result<String, RenderError> {
        let blocks: Vec<Block> = text
            .split('\n')
            .map(|line| Self::render_line(font, line.trim_end_matches('\r'), horizontal))
            .collect();

        if blocks.iter().all(Vec::is_empty) {
            return Err(RenderError::EmptyFont(text.to_string()));
        }

        Ok(stack_blocks(blocks, vertical).join("\n"))
    }
}
