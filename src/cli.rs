//! Command-line interface for banner-comments.
//!
//! Parses arguments, builds the command surface over a settings file, a
//! fonts directory and installed extension directories, and runs one
//! subcommand.

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use std::fs;

use banner_comments::commands::{BannerComments, Command, Editor, Outcome};
use banner_comments::config::FileSettingsStore;
use banner_comments::services::{
    BannerRenderer, Buffer, ExtensionScanner, FigletRs, FontRegistry, Position, Selection,
    TextDocument, apply_to_selections,
};

use crate::terminal::TerminalPrompter;

type App = BannerComments<FileSettingsStore, ExtensionScanner, FigletRs>;

/// banner-comments - Large block-letter banners wrapped in comment syntax
#[derive(Parser, Debug)]
#[command(name = "banner-comments")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (default: banner-comments/settings.yaml in the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<Utf8PathBuf>,

    /// Directory of packaged .flf fonts
    #[arg(long, global = true, value_name = "DIR")]
    pub fonts_dir: Option<Utf8PathBuf>,

    /// Directory of installed extensions to read language contributions from
    #[arg(long = "extensions-dir", global = true, value_name = "DIR")]
    pub extensions_dirs: Vec<Utf8PathBuf>,

    /// Write rotating log files to this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a banner for TEXT
    Render {
        text: String,

        /// Language id whose comment syntax wraps the banner
        #[arg(long)]
        language: Option<String>,

        /// Font to use instead of the configured one
        #[arg(long)]
        font: Option<String>,

        /// Named config to merge over the defaults
        #[arg(long)]
        config: Option<String>,
    },

    /// Replace lines of FILE with banners of their text
    Apply {
        file: Utf8PathBuf,

        /// 1-based line number; repeat for several lines
        #[arg(long = "line", required = true, value_name = "N")]
        lines: Vec<usize>,

        /// Language id (default: detected from the file extension)
        #[arg(long)]
        language: Option<String>,

        /// Named config to merge over the defaults
        #[arg(long)]
        config: Option<String>,
    },

    /// List every available font
    Fonts,

    /// Run a command interactively by id (e.g. banner-comments.add-new-config)
    Run {
        command: String,

        /// Document for commands that apply banners
        #[arg(long)]
        file: Option<Utf8PathBuf>,

        /// 1-based line number; repeat for several lines
        #[arg(long = "line", value_name = "N")]
        lines: Vec<usize>,

        /// Config name for banner-comments.apply-from-config
        #[arg(long)]
        config: Option<String>,
    },
}

/// Execute the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let mut app = build_app(&cli)?;

    match cli.command {
        Commands::Render {
            text,
            language,
            font,
            config,
        } => {
            let mut resolved = app.resolve(config.as_deref(), language.as_deref())?;
            if let Some(font) = font {
                resolved = resolved.with_font(font);
            }

            let banner = app.render(&text, &resolved)?;
            print!("{}", banner);
            if !banner.ends_with('\n') {
                println!();
            }
            Ok(())
        }

        Commands::Apply {
            file,
            lines,
            language,
            config,
        } => {
            let mut buffer = load_buffer(&app, &file, language)?;
            let selections = cursor_selections(&lines)?;
            let language_id = buffer.language_id().map(str::to_string);
            let resolved = app.resolve(config.as_deref(), language_id.as_deref())?;

            let renderer = BannerRenderer::new(app.fonts());
            let count = apply_to_selections(&mut buffer, &selections, &renderer, &resolved)?;
            save_buffer(&file, &buffer)?;

            eprintln!("Applied {} banner(s) to {}", count, file);
            Ok(())
        }

        Commands::Fonts => {
            for font in app.fonts().list_available_font_names() {
                println!("{}", font);
            }
            Ok(())
        }

        Commands::Run {
            command,
            file,
            lines,
            config,
        } => run_interactive(&mut app, &command, file, &lines, config.as_deref()),
    }
}

fn build_app(cli: &Cli) -> Result<App> {
    let store = match &cli.settings {
        Some(path) => FileSettingsStore::new(path),
        None => FileSettingsStore::at_default_location()?,
    };
    let scanner = ExtensionScanner::new(cli.extensions_dirs.clone());
    let fonts = FontRegistry::new(FigletRs::new(), cli.fonts_dir.clone());

    let mut app = BannerComments::new(store, scanner, fonts);
    app.activate()?;
    Ok(app)
}

fn run_interactive(
    app: &mut App,
    id: &str,
    file: Option<Utf8PathBuf>,
    lines: &[usize],
    config: Option<&str>,
) -> Result<()> {
    let command: Command = id.parse()?;
    if command.needs_editor() && file.is_none() {
        bail!("{} needs a document, pass --file", command);
    }

    let mut buffer = match &file {
        Some(path) => Some(load_buffer(app, path, None)?),
        None => None,
    };
    let selections = if lines.is_empty() {
        vec![Selection::cursor(Position::new(0, 0))]
    } else {
        cursor_selections(lines)?
    };
    let editor = buffer
        .as_mut()
        .map(|buffer| Editor::new(buffer, selections));

    // Prompts are sequential; a single-threaded runtime is all they need
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    let mut prompter = TerminalPrompter::new();
    let outcome = runtime.block_on(app.execute(command.id(), config, &mut prompter, editor))?;
    tracing::debug!("{} finished: {:?}", command, outcome);

    match (outcome, file, buffer) {
        (Outcome::Applied(count), Some(path), Some(buffer)) => {
            save_buffer(&path, &buffer)?;
            eprintln!("Applied {} banner(s) to {}", count, path);
        }
        (Outcome::Updated, _, _) => eprintln!("Settings updated"),
        (Outcome::Cancelled, _, _) => eprintln!("Cancelled"),
        _ => {}
    }
    Ok(())
}

fn load_buffer(app: &App, path: &Utf8Path, language: Option<String>) -> Result<Buffer> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;

    let language = language.or_else(|| app.languages().language_for_path(path));
    let buffer = Buffer::new(&content);
    Ok(match language {
        Some(language) => buffer.with_language(language),
        None => buffer,
    })
}

fn save_buffer(path: &Utf8Path, buffer: &Buffer) -> Result<()> {
    fs::write(path, buffer.text()).with_context(|| format!("Failed to write file: {}", path))?;
    tracing::info!("Wrote {}", path);
    Ok(())
}

/// Cursor selections at the start of each 1-based line.
fn cursor_selections(lines: &[usize]) -> Result<Vec<Selection>> {
    lines
        .iter()
        .map(|&line| match line.checked_sub(1) {
            Some(index) => Ok(Selection::cursor(Position::new(index, 0))),
            None => bail!("Line numbers start at 1"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "banner-comments",
            "--debug",
            "render",
            "Hello",
            "--language",
            "rust",
        ])
        .unwrap();

        assert!(cli.debug);
        assert!(matches!(
            cli.command,
            Commands::Render { ref text, ref language, .. }
                if text == "Hello" && language.as_deref() == Some("rust")
        ));
    }

    #[test]
    fn test_apply_requires_a_line() {
        assert!(Cli::try_parse_from(["banner-comments", "apply", "main.rs"]).is_err());

        let cli = Cli::try_parse_from([
            "banner-comments",
            "apply",
            "main.rs",
            "--line",
            "3",
            "--line",
            "7",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Apply { ref lines, .. } if lines == &[3, 7]));
    }

    #[test]
    fn test_cursor_selections() {
        let selections = cursor_selections(&[1, 4]).unwrap();
        assert_eq!(selections[1], Selection::cursor(Position::new(3, 0)));
        assert!(cursor_selections(&[0]).is_err());
    }
}
