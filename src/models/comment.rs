use serde::Deserialize;

/// Comment syntax a language defines.
///
/// Either part may be missing. Deserializes from the `comments` object of an
/// editor language configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawCommentRule")]
pub struct CommentRule {
    pub line_comment: Option<String>,
    pub block_comment: Option<(String, String)>,
}

impl CommentRule {
    pub fn line(marker: impl Into<String>) -> Self {
        Self {
            line_comment: Some(marker.into()),
            block_comment: None,
        }
    }

    pub fn block(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            line_comment: None,
            block_comment: Some((open.into(), close.into())),
        }
    }

    pub fn with_block(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.block_comment = Some((open.into(), close.into()));
        self
    }

    /// True when the rule defines neither a line nor a block comment.
    pub fn is_empty(&self) -> bool {
        self.line_comment.is_none() && self.block_comment.is_none()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCommentRule {
    #[serde(default)]
    line_comment: Option<LineCommentDef>,
    #[serde(default)]
    block_comment: Option<(String, String)>,
}

/// `lineComment` is either a plain string or `{ "comment": "//", "noIndent": .. }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LineCommentDef {
    Plain(String),
    Detailed { comment: String },
}

impl From<RawCommentRule> for CommentRule {
    fn from(raw: RawCommentRule) -> Self {
        Self {
            line_comment: raw.line_comment.map(|def| match def {
                LineCommentDef::Plain(marker) => marker,
                LineCommentDef::Detailed { comment } => comment,
            }),
            block_comment: raw.block_comment,
        }
    }
}

/// The part of an editor language configuration file this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageConfiguration {
    #[serde(default)]
    pub comments: Option<CommentRule>,
}
