//! Configuration resolution.
//!
//! Merges partial settings (a named config, or nothing at all) over the
//! process-wide defaults and attaches the comment rule of the target language.

use super::language::{ContributionSource, LanguageCommentResolver};
use crate::models::{ResolvedConfig, Settings};

/// Produces [`ResolvedConfig`]s from the process-wide defaults.
pub struct ConfigResolver<'a, S> {
    defaults: &'a Settings,
    languages: &'a LanguageCommentResolver<S>,
}

impl<'a, S: ContributionSource> ConfigResolver<'a, S> {
    pub fn new(defaults: &'a Settings, languages: &'a LanguageCommentResolver<S>) -> Self {
        Self {
            defaults,
            languages,
        }
    }

    /// The defaults as they are, plus the comment rule for `language_id`.
    pub fn resolve_default(&self, language_id: Option<&str>) -> ResolvedConfig {
        ResolvedConfig::from_settings(
            self.defaults.clone(),
            self.languages.comment_rule(language_id),
        )
    }

    /// Field-by-field merge of `partial` over the defaults.
    ///
    /// The comment rule always comes from `language_id`.
    pub fn resolve_override(&self, partial: &Settings, language_id: Option<&str>) -> ResolvedConfig {
        let merged = partial.merged_over(self.defaults);
        tracing::debug!(
            "Resolved config font={:?} language={:?}",
            merged.font,
            language_id
        );
        ResolvedConfig::from_settings(merged, self.languages.comment_rule(language_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommentStyle, Layout};
    use crate::services::language::LanguageContribution;
    use proptest::prelude::*;

    fn defaults() -> Settings {
        Settings {
            font: Some("standard".to_string()),
            horizontal_layout: Some(Layout::Default),
            vertical_layout: Some(Layout::Default),
            trim_trailing_whitespace: Some(true),
            trim_empty_lines: Some(false),
            prefix: Some(String::new()),
            suffix: Some(String::new()),
            per_line_prefix: Some(" ".to_string()),
            comment_style: Some(CommentStyle::Line),
        }
    }

    #[test]
    fn test_resolve_default_copies_defaults() {
        let defaults = defaults();
        let languages = LanguageCommentResolver::new(Vec::<LanguageContribution>::new());
        let resolver = ConfigResolver::new(&defaults, &languages);

        let config = resolver.resolve_default(None);
        assert_eq!(config.figlet.font.as_deref(), Some("standard"));
        assert_eq!(config.options.per_line_prefix.as_deref(), Some(" "));
        assert_eq!(config.comment, None);
    }

    #[test]
    fn test_override_only_font() {
        let defaults = defaults();
        let languages = LanguageCommentResolver::new(Vec::<LanguageContribution>::new());
        let resolver = ConfigResolver::new(&defaults, &languages);

        let partial = Settings {
            font: Some("slant".to_string()),
            ..Settings::default()
        };
        let config = resolver.resolve_override(&partial, Some("rust"));

        let expected = ResolvedConfig::from_settings(defaults.clone(), None).with_font("slant");
        assert_eq!(config, expected);
    }

    #[test]
    fn test_override_with_absent_defaults_stays_unset() {
        let defaults = Settings::default();
        let languages = LanguageCommentResolver::new(Vec::<LanguageContribution>::new());
        let resolver = ConfigResolver::new(&defaults, &languages);

        let config = resolver.resolve_override(&Settings::default(), None);
        assert_eq!(config.figlet.font, None);
        assert_eq!(config.options.comment_style, None);
    }

    proptest! {
        #[test]
        fn prop_untouched_fields_equal_defaults(
            font in proptest::option::of("[a-z]{1,8}"),
            trim in proptest::option::of(any::<bool>()),
            prefix in proptest::option::of("[ -~]{0,6}"),
        ) {
            let defaults = defaults();
            let languages = LanguageCommentResolver::new(Vec::<LanguageContribution>::new());
            let resolver = ConfigResolver::new(&defaults, &languages);

            let partial = Settings {
                font: font.clone(),
                trim_empty_lines: trim,
                prefix: prefix.clone(),
                ..Settings::default()
            };
            let config = resolver.resolve_override(&partial, None);

            prop_assert_eq!(config.figlet.font, font.or(defaults.font.clone()));
            prop_assert_eq!(config.options.trim_empty_lines, trim.or(defaults.trim_empty_lines));
            prop_assert_eq!(config.options.prefix, prefix.or(defaults.prefix.clone()));
            prop_assert_eq!(config.figlet.horizontal_layout, defaults.horizontal_layout);
            prop_assert_eq!(config.options.suffix, defaults.suffix.clone());
            prop_assert_eq!(config.options.comment_style, defaults.comment_style);
        }
    }
}
