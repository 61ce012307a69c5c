//! Integration tests for banner rendering with the real FIGlet backend
//!
//! These tests verify:
//! - Rendering with the builtin font through the font registry
//! - Comment wrapping driven by language configuration files
//! - Language discovery from extension manifests
//! - Named config overrides
//! - Applying banners to a document buffer

use banner_comments::models::{CommentStyle, Layout, ResolvedConfig, Settings};
use banner_comments::services::{
    BUILTIN_FONT, BannerRenderer, Buffer, ConfigResolver, ContributionSource, ExtensionScanner,
    FigletBackend, FigletRs, FontError, FontRegistry, LanguageCommentResolver,
    LanguageContribution, Position, RenderError, Selection, TextDocument, apply_to_selections,
};
use camino::{Utf8Path, Utf8PathBuf};
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn create_temp_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, path)
}

fn write_language_config(dir: &Utf8Path, file: &str, content: &str) -> Utf8PathBuf {
    let path = dir.join(file);
    fs::write(&path, content).unwrap();
    path
}

fn registry() -> FontRegistry<FigletRs> {
    FontRegistry::new(FigletRs::new(), None)
}

/// Raw art for `text` in the builtin font, default layouts.
fn raw_art(text: &str) -> String {
    let backend = FigletRs::new();
    let font = backend.load_font(BUILTIN_FONT).unwrap();
    backend
        .render(text, &font, Layout::Default, Layout::Default)
        .unwrap()
}

fn resolve<C: ContributionSource>(
    settings: &Settings,
    languages: &LanguageCommentResolver<C>,
    language_id: &str,
) -> ResolvedConfig {
    ConfigResolver::new(settings, languages).resolve_default(Some(language_id))
}

#[test]
fn test_builtin_font_renders_multiple_rows() {
    let art = raw_art("Hi");
    assert!(art.lines().count() > 1);
    assert!(!art.ends_with('\n'));
}

#[test]
fn test_line_comment_banner() {
    let (_temp_dir, dir) = create_temp_dir();
    let config = write_language_config(&dir, "python.json", r##"{"comments": {"lineComment": "#"}}"##);
    let languages = LanguageCommentResolver::new(vec![
        LanguageContribution::new("python").with_configuration(config),
    ]);

    let settings = Settings {
        comment_style: Some(CommentStyle::Line),
        ..Settings::builtin_defaults()
    };
    let resolved = resolve(&settings, &languages, "python");

    let fonts = registry();
    let banner = BannerRenderer::new(&fonts).render("Hi", &resolved).unwrap();

    let expected: String = raw_art("Hi")
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("#{}\n", line.trim_end()))
        .collect();
    assert_eq!(banner, expected);
}

#[test]
fn test_both_style_wraps_block_and_lines() {
    let (_temp_dir, dir) = create_temp_dir();
    let config = write_language_config(
        &dir,
        "c.json",
        r#"{
            // C family
            comments: { lineComment: "//", blockComment: ["/*", "*/"] },
        }"#,
    );
    let languages = LanguageCommentResolver::new(vec![
        LanguageContribution::new("c").with_configuration(config),
    ]);
    let resolved = resolve(&Settings::builtin_defaults(), &languages, "c");

    let fonts = registry();
    let banner = BannerRenderer::new(&fonts).render("C", &resolved).unwrap();

    assert!(banner.starts_with("/*\n"));
    assert!(banner.ends_with("\n*/"));
    let inner: Vec<&str> = banner.lines().skip(1).filter(|line| *line != "*/").collect();
    assert!(!inner.is_empty());
    for line in inner {
        assert!(line.starts_with("//"));
        assert_eq!(line, line.trim_end());
    }
}

#[test]
fn test_unknown_language_renders_plain_art() {
    let languages = LanguageCommentResolver::new(Vec::<LanguageContribution>::new());
    let resolved = resolve(&Settings::builtin_defaults(), &languages, "cobol");
    assert_eq!(resolved.comment, None);

    let fonts = registry();
    let banner = BannerRenderer::new(&fonts).render("Hi", &resolved).unwrap();
    assert!(!banner.contains("//"));
    assert!(banner.lines().all(|line| !line.trim().is_empty()));
}

#[test]
fn test_plaintext_is_never_wrapped() {
    let (_temp_dir, dir) = create_temp_dir();
    let config = write_language_config(&dir, "text.json", r##"{"comments": {"lineComment": "#"}}"##);
    let languages = LanguageCommentResolver::new(vec![
        LanguageContribution::new("plaintext").with_configuration(config),
    ]);

    let resolved = resolve(&Settings::builtin_defaults(), &languages, "plaintext");
    assert_eq!(resolved.comment, None);
}

#[test]
fn test_language_from_extension_manifest() {
    let (_temp_dir, root) = create_temp_dir();
    let extension = root.join("xml-support");
    fs::create_dir_all(extension.join("config")).unwrap();
    fs::write(
        extension.join("package.json"),
        r#"{
            "name": "xml-support",
            "contributes": {
                "languages": [
                    {
                        "id": "xml",
                        "extensions": [".xml", ".xsd"],
                        "configuration": "./config/xml.json"
                    }
                ]
            }
        }"#,
    )
    .unwrap();
    fs::write(
        extension.join("config/xml.json"),
        r#"{"comments": {"blockComment": ["<!--", "-->"]}}"#,
    )
    .unwrap();

    let languages = LanguageCommentResolver::new(ExtensionScanner::new([root]));
    assert_eq!(
        languages.language_for_path(Utf8Path::new("schema.XSD")),
        Some("xml".to_string())
    );

    // Line style falls back to the block markers
    let settings = Settings {
        comment_style: Some(CommentStyle::Line),
        ..Settings::builtin_defaults()
    };
    let resolved = resolve(&settings, &languages, "xml");

    let fonts = registry();
    let banner = BannerRenderer::new(&fonts).render("X", &resolved).unwrap();
    assert!(banner.starts_with("<!--\n"));
    assert!(banner.ends_with("\n-->"));
    assert!(!banner.lines().skip(1).any(|line| line.starts_with("<!--")));
}

#[test]
fn test_named_configs_override_defaults() {
    let (_temp_dir, dir) = create_temp_dir();
    let config = write_language_config(
        &dir,
        "js.json",
        r#"{"comments": {"lineComment": "//", "blockComment": ["/*", "*/"]}}"#,
    );
    let languages = LanguageCommentResolver::new(vec![
        LanguageContribution::new("javascript").with_configuration(config),
    ]);
    let defaults = Settings::builtin_defaults();
    let resolver = ConfigResolver::new(&defaults, &languages);
    let fonts = registry();
    let renderer = BannerRenderer::new(&fonts);

    let empty = resolver.resolve_override(&Settings::default(), Some("javascript"));
    assert_eq!(empty, resolver.resolve_default(Some("javascript")));

    let line_only = resolver.resolve_override(
        &Settings {
            comment_style: Some(CommentStyle::Line),
            prefix: Some("banner".to_string()),
            ..Settings::default()
        },
        Some("javascript"),
    );
    let banner = renderer.render("JS", &line_only).unwrap();
    assert!(banner.starts_with("//banner\n"));
    assert!(!banner.contains("/*"));
    assert!(banner.lines().all(|line| line.starts_with("//")));
}

#[test]
fn test_missing_font_fails() {
    let languages = LanguageCommentResolver::new(Vec::<LanguageContribution>::new());
    let resolved = resolve(&Settings::builtin_defaults(), &languages, "rust").with_font("nope");

    let fonts = registry();
    let result = BannerRenderer::new(&fonts).render("Hi", &resolved);
    assert!(matches!(
        result,
        Err(RenderError::Font(FontError::NotFound(name))) if name == "nope"
    ));
}

#[test]
fn test_custom_font_deleted_after_registration() {
    let (_temp_dir, dir) = create_temp_dir();
    let font_path = dir.join("gone.flf");

    let mut fonts = registry();
    fonts.register_custom_fonts([font_path.as_str()]);

    let name = font_path.as_str().trim_end_matches(".flf");
    assert!(fonts.list_available_font_names().contains(&name.to_string()));
    assert!(matches!(
        fonts.resolve_font(name),
        Err(FontError::Io { path, .. }) if path == font_path
    ));
}

#[test]
fn test_apply_to_collapsed_todo_line() {
    let (_temp_dir, dir) = create_temp_dir();
    let config = write_language_config(&dir, "python.json", r##"{"comments": {"lineComment": "#"}}"##);
    let languages = LanguageCommentResolver::new(vec![
        LanguageContribution::new("python").with_configuration(config),
    ]);
    let resolved = resolve(&Settings::builtin_defaults(), &languages, "python");

    let fonts = registry();
    let renderer = BannerRenderer::new(&fonts);
    let mut buffer = Buffer::new("import os\nTODO\nprint(os.name)\n").with_language("python");
    let before = buffer.line_count();

    let count = apply_to_selections(
        &mut buffer,
        &[Selection::cursor(Position::new(1, 4))],
        &renderer,
        &resolved,
    )
    .unwrap();

    assert_eq!(count, 1);
    assert!(buffer.line_count() > before);

    let text = buffer.text();
    assert!(text.starts_with("import os\n#"));
    assert!(text.ends_with("\nprint(os.name)\n"));
    assert!(!text.contains("TODO"));
    assert_eq!(buffer.language_id(), Some("python"));
}

#[test]
fn test_apply_to_ranged_selection_keeps_crlf() {
    let fonts = registry();
    let renderer = BannerRenderer::new(&fonts);
    let languages = LanguageCommentResolver::new(Vec::<LanguageContribution>::new());
    let resolved = resolve(&Settings::builtin_defaults(), &languages, "plaintext");

    let mut buffer = Buffer::new("say Hi here\r\nend\r\n");
    let selection = Selection::new(Position::new(0, 4), Position::new(0, 6));
    apply_to_selections(&mut buffer, &[selection], &renderer, &resolved).unwrap();

    let text = buffer.text();
    assert!(text.starts_with("say "));
    assert!(text.ends_with("\r\n here\r\nend\r\n"));
    assert!(!text.replace("\r\n", "").contains('\n'));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_trimmed_banners_have_no_blank_lines(text in "[A-Za-z0-9]{1,6}") {
        let languages = LanguageCommentResolver::new(Vec::<LanguageContribution>::new());
        let resolved = resolve(&Settings::builtin_defaults(), &languages, "plaintext");

        let fonts = registry();
        let banner = BannerRenderer::new(&fonts).render(&text, &resolved).unwrap();

        prop_assert!(banner.ends_with('\n'));
        for line in banner.lines() {
            prop_assert!(!line.trim().is_empty());
            prop_assert_eq!(line, line.trim_end());
        }
    }
}
