//! Banner composition.
//!
//! Turns input text and a [`ResolvedConfig`] into the final banner: block
//! letters from the renderer backend, prefix/suffix lines, trimming, and the
//! language's comment syntax.

use super::figlet::{BUILTIN_FONT, FigletBackend, RenderError};
use crate::models::{CommentRule, CommentStyle, ResolvedConfig};

/// Which comment markers a banner gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommentPlan<'a> {
    /// Block comment open/close markers around the whole banner
    pub block: Option<(&'a str, &'a str)>,
    /// Line comment marker at the start of every line
    pub line: Option<&'a str>,
}

impl<'a> CommentPlan<'a> {
    /// Decide the markers for a style given what the language defines.
    ///
    /// `block` and `line` prefer their own marker and fall back to the other
    /// one; `both` applies each marker the language has.
    pub fn new(style: Option<CommentStyle>, rule: Option<&'a CommentRule>) -> Self {
        let (Some(style), Some(rule)) = (style, rule) else {
            return Self::default();
        };

        let block = rule
            .block_comment
            .as_ref()
            .map(|(open, close)| (open.as_str(), close.as_str()));
        let line = rule.line_comment.as_deref();

        match style {
            CommentStyle::Block if block.is_some() => Self { block, line: None },
            CommentStyle::Block => Self { block: None, line },
            CommentStyle::Line if line.is_some() => Self { block: None, line },
            CommentStyle::Line => Self { block, line: None },
            CommentStyle::Both => Self { block, line },
        }
    }
}

/// Composes banners using a renderer backend.
pub struct BannerRenderer<'a, B> {
    backend: &'a B,
}

impl<'a, B: FigletBackend> BannerRenderer<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Render the banner for `input`.
    ///
    /// Every content line ends with `\n`; the block close marker, when
    /// present, is appended last without a terminator.
    pub fn render(&self, input: &str, config: &ResolvedConfig) -> Result<String, RenderError> {
        let options = &config.options;
        let plan = CommentPlan::new(options.comment_style, config.comment.as_ref());

        let mut line_prefix = String::new();
        if let Some(marker) = plan.line {
            line_prefix.push_str(marker);
        }
        line_prefix.push_str(options.per_line_prefix.as_deref().unwrap_or(""));

        let font_name = config.figlet.font.as_deref().unwrap_or(BUILTIN_FONT);
        let font = self.backend.load_font(font_name)?;
        let art = self.backend.render(
            input,
            &font,
            config.figlet.horizontal_layout.unwrap_or_default(),
            config.figlet.vertical_layout.unwrap_or_default(),
        )?;

        let body = format!(
            "{}\n{}\n{}",
            options.prefix.as_deref().unwrap_or(""),
            art,
            options.suffix.as_deref().unwrap_or("")
        );

        let trim_empty = options.trim_empty_lines.unwrap_or(false);
        let trim_trailing = options.trim_trailing_whitespace.unwrap_or(false);

        let mut banner = String::new();
        if let Some((open, _)) = plan.block {
            banner.push_str(open);
            banner.push('\n');
        }

        for line in body.split('\n') {
            if trim_empty && line.trim().is_empty() {
                continue;
            }
            let line = if trim_trailing { line.trim_end() } else { line };

            banner.push_str(&line_prefix);
            banner.push_str(line);
            banner.push('\n');
        }

        if let Some((_, close)) = plan.block {
            banner.push_str(close);
        }

        tracing::debug!(
            "Rendered banner for {:?} with font '{}' ({} lines)",
            input,
            font_name,
            banner.lines().count()
        );
        Ok(banner)
    }
}
