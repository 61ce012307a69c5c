//! Document editing surface and the multi-selection edit applicator.
//!
//! [`TextDocument`] is the seam to whatever holds the text (an editor buffer,
//! a file on disk). [`Buffer`] is the in-memory implementation used by the
//! CLI and in tests.

use std::fmt;
use thiserror::Error;

use super::banner::BannerRenderer;
use super::figlet::{FigletBackend, RenderError};
use crate::models::ResolvedConfig;

/// Zero-based line and character offset. Characters count Unicode scalar
/// values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// Half-open range between two positions, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Build a range, swapping the ends if needed.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A selection as an editor reports it: where it started and where the
/// cursor is now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// A bare cursor at `position`.
    pub fn cursor(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Zero-width selection, i.e. just a cursor.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.active
    }

    pub fn range(&self) -> Range {
        Range::new(self.anchor, self.active)
    }
}

/// A single text replacement. Inserts have an empty range; deletes have empty
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// Errors raised when a set of edits cannot be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Range {0} is outside the document")]
    InvalidRange(Range),

    #[error("Edits overlap at {0}")]
    Overlapping(Range),
}

/// Errors from applying banners to a document
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("Failed to render banner: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to edit document: {0}")]
    Edit(#[from] EditError),
}

/// Collects edits that are committed together.
#[derive(Debug, Clone, Default)]
pub struct EditBuilder {
    edits: Vec<TextEdit>,
}

impl EditBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, at: Position, text: impl Into<String>) -> &mut Self {
        self.replace(Range::new(at, at), text)
    }

    pub fn delete(&mut self, range: Range) -> &mut Self {
        self.replace(range, String::new())
    }

    pub fn replace(&mut self, range: Range, text: impl Into<String>) -> &mut Self {
        self.edits.push(TextEdit {
            range,
            new_text: text.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn build(self) -> Vec<TextEdit> {
        self.edits
    }
}

/// A document that banners can be applied to.
pub trait TextDocument {
    /// Language of the document, if known.
    fn language_id(&self) -> Option<&str>;

    /// Range of a whole line, without its line break.
    fn line_range(&self, line: usize) -> Option<Range>;

    /// Text covered by `range`, with `\n` line breaks.
    fn text_in(&self, range: Range) -> Option<String>;

    /// Apply all edits or none of them.
    ///
    /// Ranges refer to the document before any edit is applied. An insert may
    /// share its position with the start of another edit; any other overlap is
    /// rejected.
    fn apply_edits(&mut self, edits: Vec<TextEdit>) -> Result<(), EditError>;
}

/// Line terminator a [`Buffer`] writes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// The first line break in `text` decides; text without breaks is `Lf`.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(index) if index > 0 && text.as_bytes()[index - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// In-memory [`TextDocument`].
///
/// Text is held with `\n` breaks and converted back to the original line
/// ending by [`Buffer::text`], so inserted banners follow the document's
/// convention.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    text: String,
    line_ending: LineEnding,
    language_id: Option<String>,
}

impl Buffer {
    pub fn new(text: &str) -> Self {
        let line_ending = LineEnding::detect(text);
        Self {
            text: text.replace("\r\n", "\n"),
            line_ending,
            language_id: None,
        }
    }

    pub fn with_language(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = Some(language_id.into());
        self
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Full text using the document's line ending.
    pub fn text(&self) -> String {
        match self.line_ending {
            LineEnding::Lf => self.text.clone(),
            LineEnding::CrLf => self.text.replace('\n', self.line_ending.as_str()),
        }
    }

    fn line(&self, line: usize) -> Option<(usize, &str)> {
        let mut start = 0;
        for (index, content) in self.text.split('\n').enumerate() {
            if index == line {
                return Some((start, content));
            }
            start += content.len() + 1;
        }
        None
    }

    /// Byte offset of a position, if it lies inside the text.
    fn offset_of(&self, position: Position) -> Option<usize> {
        let (start, content) = self.line(position.line)?;
        if position.character == content.chars().count() {
            return Some(start + content.len());
        }
        content
            .char_indices()
            .nth(position.character)
            .map(|(byte, _)| start + byte)
    }

    fn offsets_of(&self, range: Range) -> Result<(usize, usize), EditError> {
        match (self.offset_of(range.start), self.offset_of(range.end)) {
            (Some(start), Some(end)) if start <= end => Ok((start, end)),
            _ => Err(EditError::InvalidRange(range)),
        }
    }
}

impl TextDocument for Buffer {
    fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }

    fn line_range(&self, line: usize) -> Option<Range> {
        let (_, content) = self.line(line)?;
        Some(Range::new(
            Position::new(line, 0),
            Position::new(line, content.chars().count()),
        ))
    }

    fn text_in(&self, range: Range) -> Option<String> {
        let (start, end) = self.offsets_of(range).ok()?;
        Some(self.text[start..end].to_string())
    }

    fn apply_edits(&mut self, edits: Vec<TextEdit>) -> Result<(), EditError> {
        let mut resolved = Vec::with_capacity(edits.len());
        for edit in edits {
            let (start, end) = self.offsets_of(edit.range)?;
            resolved.push((start, end, edit.range, edit.new_text.replace("\r\n", "\n")));
        }

        // Stable: inserts at the same spot keep their submission order
        resolved.sort_by_key(|(start, end, _, _)| (*start, *end));

        for pair in resolved.windows(2) {
            let (_, prev_end, _, _) = &pair[0];
            let (next_start, _, next_range, _) = &pair[1];
            if next_start < prev_end {
                return Err(EditError::Overlapping(*next_range));
            }
        }

        for (start, end, _, new_text) in resolved.into_iter().rev() {
            self.text.replace_range(start..end, &new_text);
        }

        Ok(())
    }
}

/// Replace every selection with a banner, as one atomic edit.
///
/// A collapsed selection stands for its whole line: the line's text is the
/// banner input and the line is replaced. Any other selection is replaced by
/// the banner of its own text. Every banner is rendered before the document is
/// touched, so a render failure leaves the document unchanged.
///
/// # Returns
/// The number of selections replaced
pub fn apply_to_selections<D, B>(
    document: &mut D,
    selections: &[Selection],
    renderer: &BannerRenderer<'_, B>,
    config: &ResolvedConfig,
) -> Result<usize, ApplyError>
where
    D: TextDocument + ?Sized,
    B: FigletBackend,
{
    let mut builder = EditBuilder::new();

    for selection in selections {
        if selection.is_collapsed() {
            let line = selection.active.line;
            let range = document
                .line_range(line)
                .ok_or(EditError::InvalidRange(selection.range()))?;
            let text = document
                .text_in(range)
                .ok_or(EditError::InvalidRange(range))?;

            let banner = renderer.render(&text, config)?;
            builder.delete(range);
            builder.insert(range.start, banner);
        } else {
            let range = selection.range();
            let text = document
                .text_in(range)
                .ok_or(EditError::InvalidRange(range))?;

            let banner = renderer.render(&text, config)?;
            builder.replace(range, banner);
        }
    }

    document.apply_edits(builder.build())?;

    tracing::info!("Applied banner to {} selection(s)", selections.len());
    Ok(selections.len())
}
