//! Command surface.
//!
//! [`BannerComments`] owns the settings store, the language resolver and the
//! font registry, and exposes every user-facing command. Interaction goes
//! through a [`Prompter`]; documents through [`Editor`]. Failures the user
//! can fix are reported through the prompter and never mutate the document
//! or the settings.

pub mod wizard;

use anyhow::Result;
use async_trait::async_trait;
use camino::Utf8Path;
use std::fmt;
use std::str::FromStr;

use crate::config::SettingsStore;
use crate::models::{ConfigError, ResolvedConfig, StoredSettings};
use crate::services::{
    BannerRenderer, ConfigResolver, ContributionSource, FONT_FILE_EXTENSION, FigletBackend,
    FontRegistry, LanguageCommentResolver, Selection, TextDocument, apply_to_selections,
};

pub use wizard::{ConfigWizard, WizardError, WizardPrompt, WizardStep};

/// One entry of a single-choice picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: String,
}

impl PickItem {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Interactive picker/input surface.
///
/// `None` from [`pick`](Prompter::pick) or [`input`](Prompter::input) means
/// the user dismissed the prompt.
#[async_trait(?Send)]
pub trait Prompter {
    async fn pick(&mut self, placeholder: &str, items: Vec<PickItem>) -> Option<PickItem>;

    async fn input(&mut self, prompt: &str) -> Option<String>;

    fn show_info(&mut self, message: &str);

    fn show_error(&mut self, message: &str);
}

/// The active document and its selections.
pub struct Editor<'a, D: ?Sized> {
    pub document: &'a mut D,
    pub selections: Vec<Selection>,
}

impl<'a, D: TextDocument + ?Sized> Editor<'a, D> {
    pub fn new(document: &'a mut D, selections: Vec<Selection>) -> Self {
        Self {
            document,
            selections,
        }
    }

    pub fn language_id(&self) -> Option<&str> {
        self.document.language_id()
    }
}

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Banners were applied to this many selections
    Applied(usize),
    /// Settings were changed and saved
    Updated,
    /// The user dismissed a prompt, or there was nothing to act on
    Cancelled,
    /// The request was refused; the user has been told why
    Rejected,
}

/// Identifiers of every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Apply,
    ApplyFromList,
    ApplyFromFavorites,
    ApplyFromConfig,
    SetDefaultFont,
    SetDefaultFontFromFavorites,
    AddFontToFavorites,
    AddCurrentFontToFavorites,
    RemoveFontFromFavorites,
    AddCustomFont,
    RemoveCustomFont,
    AddNewConfig,
}

impl Command {
    pub const ALL: [Command; 12] = [
        Command::Apply,
        Command::ApplyFromList,
        Command::ApplyFromFavorites,
        Command::ApplyFromConfig,
        Command::SetDefaultFont,
        Command::SetDefaultFontFromFavorites,
        Command::AddFontToFavorites,
        Command::AddCurrentFontToFavorites,
        Command::RemoveFontFromFavorites,
        Command::AddCustomFont,
        Command::RemoveCustomFont,
        Command::AddNewConfig,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Command::Apply => "banner-comments.apply",
            Command::ApplyFromList => "banner-comments.apply-from-list",
            Command::ApplyFromFavorites => "banner-comments.apply-from-favorites",
            Command::ApplyFromConfig => "banner-comments.apply-from-config",
            Command::SetDefaultFont => "banner-comments.set-default-font",
            Command::SetDefaultFontFromFavorites => {
                "banner-comments.set-default-font-from-favorites"
            }
            Command::AddFontToFavorites => "banner-comments.add-font-to-favorites",
            Command::AddCurrentFontToFavorites => "banner-comments.add-current-font-to-favorites",
            Command::RemoveFontFromFavorites => "banner-comments.remove-font-from-favorites",
            Command::AddCustomFont => "banner-comments.add-custom-font",
            Command::RemoveCustomFont => "banner-comments.remove-custom-font",
            Command::AddNewConfig => "banner-comments.add-new-config",
        }
    }

    /// Whether the command edits the active document.
    pub fn needs_editor(&self) -> bool {
        matches!(
            self,
            Command::Apply
                | Command::ApplyFromList
                | Command::ApplyFromFavorites
                | Command::ApplyFromConfig
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.id() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown command: {}", s))
    }
}

/// Picker items for a list of fonts.
pub fn font_items(fonts: &[String]) -> Vec<PickItem> {
    fonts
        .iter()
        .map(|font| PickItem::new(font.as_str(), format!("Use the {} font", font)))
        .collect()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    match path.strip_prefix('~') {
        Some(rest) => {
            let home = dirs::home_dir()
                .map(|home| home.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{}/{}", home.trim_end_matches('/'), rest.trim_start_matches('/'))
        }
        None => path.to_string(),
    }
}

/// Check a custom font path as typed and return it with `~` expanded.
///
/// The path only has to contain `.flf`. Fonts load from `<name>.flf`, so a
/// path that does not end with the extension is accepted with a warning and
/// will fail when rendered.
pub fn validate_custom_font_path(input: &str) -> Result<String, ConfigError> {
    if !input.contains(FONT_FILE_EXTENSION) {
        return Err(ConfigError::InvalidCustomFont(input.to_string()));
    }

    let path = expand_tilde(input);
    if !Utf8Path::new(&path).is_file() {
        return Err(ConfigError::MissingCustomFont(path));
    }

    if !path.ends_with(FONT_FILE_EXTENSION) {
        tracing::warn!(
            "Custom font {} does not end with {} and cannot be loaded",
            path,
            FONT_FILE_EXTENSION
        );
    }
    Ok(path)
}

/// Every banner command over a settings store, a language contribution
/// source and a font registry.
pub struct BannerComments<S, C, B> {
    store: S,
    languages: LanguageCommentResolver<C>,
    fonts: FontRegistry<B>,
}

impl<S, C, B> BannerComments<S, C, B>
where
    S: SettingsStore,
    C: ContributionSource,
    B: FigletBackend,
{
    pub fn new(store: S, contributions: C, fonts: FontRegistry<B>) -> Self {
        Self {
            store,
            languages: LanguageCommentResolver::new(contributions),
            fonts,
        }
    }

    /// Register packaged fonts and the user's custom fonts.
    pub fn activate(&mut self) -> Result<()> {
        self.fonts.load_packaged_fonts()?;
        self.load_custom_fonts()?;
        tracing::info!(
            "Activated with {} font(s) available",
            self.fonts.list_available_font_names().len()
        );
        Ok(())
    }

    fn load_custom_fonts(&mut self) -> Result<()> {
        let settings = self.store.load()?;
        self.fonts.register_custom_fonts(&settings.custom_fonts);
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn languages(&self) -> &LanguageCommentResolver<C> {
        &self.languages
    }

    pub fn fonts(&self) -> &FontRegistry<B> {
        &self.fonts
    }

    /// Resolve the configuration for a document: the defaults, or a named
    /// config merged over them.
    pub fn resolve(&self, config_name: Option<&str>, language_id: Option<&str>) -> Result<ResolvedConfig> {
        let settings = self.store.load()?;
        let resolver = ConfigResolver::new(&settings.defaults, &self.languages);

        match config_name {
            None => Ok(resolver.resolve_default(language_id)),
            Some(name) => {
                let partial = settings
                    .configs
                    .get(name)
                    .ok_or_else(|| ConfigError::NotFound(name.to_string()))?;
                Ok(resolver.resolve_override(partial, language_id))
            }
        }
    }

    /// Render a banner for `text` without touching a document.
    pub fn render(&self, text: &str, config: &ResolvedConfig) -> Result<String> {
        Ok(BannerRenderer::new(&self.fonts).render(text, config)?)
    }

    /// Run a command by identifier.
    ///
    /// `argument` is the config name for `apply-from-config` and ignored
    /// otherwise.
    pub async fn execute<P, D>(
        &mut self,
        id: &str,
        argument: Option<&str>,
        prompter: &mut P,
        editor: Option<Editor<'_, D>>,
    ) -> Result<Outcome>
    where
        P: Prompter + ?Sized,
        D: TextDocument + ?Sized,
    {
        let command: Command = id.parse()?;
        tracing::debug!("Executing {}", command);

        match command {
            Command::Apply => self.apply(prompter, editor),
            Command::ApplyFromList => self.apply_from_list(prompter, editor).await,
            Command::ApplyFromFavorites => self.apply_from_favorites(prompter, editor).await,
            Command::ApplyFromConfig => self.apply_from_config(prompter, editor, argument).await,
            Command::SetDefaultFont => self.set_default_font(prompter).await,
            Command::SetDefaultFontFromFavorites => {
                self.set_default_font_from_favorites(prompter).await
            }
            Command::AddFontToFavorites => self.add_font_to_favorites(prompter).await,
            Command::AddCurrentFontToFavorites => self.add_current_font_to_favorites(prompter),
            Command::RemoveFontFromFavorites => self.remove_from_favorites(prompter).await,
            Command::AddCustomFont => self.add_custom_font(prompter).await,
            Command::RemoveCustomFont => self.remove_custom_font(prompter).await,
            Command::AddNewConfig => self.add_new_config(prompter).await,
        }
    }

    /// Apply the default configuration to the editor's selections.
    pub fn apply<P, D>(&self, prompter: &mut P, editor: Option<Editor<'_, D>>) -> Result<Outcome>
    where
        P: Prompter + ?Sized,
        D: TextDocument + ?Sized,
    {
        let Some(editor) = editor else {
            return Ok(Outcome::Cancelled);
        };
        let config = self.resolve(None, editor.language_id())?;
        Ok(self.apply_config(prompter, editor, &config))
    }

    /// Pick any available font, then apply the defaults with that font.
    pub async fn apply_from_list<P, D>(
        &self,
        prompter: &mut P,
        editor: Option<Editor<'_, D>>,
    ) -> Result<Outcome>
    where
        P: Prompter + ?Sized,
        D: TextDocument + ?Sized,
    {
        let items = font_items(&self.fonts.list_available_font_names());
        self.apply_with_picked_font(prompter, editor, items).await
    }

    /// Pick a favorite font, then apply the defaults with that font.
    pub async fn apply_from_favorites<P, D>(
        &self,
        prompter: &mut P,
        editor: Option<Editor<'_, D>>,
    ) -> Result<Outcome>
    where
        P: Prompter + ?Sized,
        D: TextDocument + ?Sized,
    {
        let settings = self.store.load()?;
        self.apply_with_picked_font(prompter, editor, font_items(&settings.favorites))
            .await
    }

    async fn apply_with_picked_font<P, D>(
        &self,
        prompter: &mut P,
        editor: Option<Editor<'_, D>>,
        items: Vec<PickItem>,
    ) -> Result<Outcome>
    where
        P: Prompter + ?Sized,
        D: TextDocument + ?Sized,
    {
        let Some(picked) = prompter.pick("font", items).await else {
            return Ok(Outcome::Cancelled);
        };
        let Some(editor) = editor else {
            return Ok(Outcome::Cancelled);
        };

        let config = self
            .resolve(None, editor.language_id())?
            .with_font(picked.label);
        Ok(self.apply_config(prompter, editor, &config))
    }

    /// Apply a named config. With `name` the picker is skipped.
    pub async fn apply_from_config<P, D>(
        &self,
        prompter: &mut P,
        editor: Option<Editor<'_, D>>,
        name: Option<&str>,
    ) -> Result<Outcome>
    where
        P: Prompter + ?Sized,
        D: TextDocument + ?Sized,
    {
        let settings = self.store.load()?;

        let name = match name {
            Some(name) => {
                if !settings.configs.contains(name) || editor.is_none() {
                    prompter.show_info(&ConfigError::NotFound(name.to_string()).to_string());
                    return Ok(Outcome::Rejected);
                }
                name.to_string()
            }
            None => {
                let items = settings
                    .configs
                    .names()
                    .map(|name| {
                        let description = settings
                            .configs
                            .describe(name, &settings.config_description_keys)
                            .unwrap_or_default();
                        PickItem::new(name, description)
                    })
                    .collect();

                let Some(picked) = prompter.pick("config", items).await else {
                    return Ok(Outcome::Cancelled);
                };
                picked.label
            }
        };

        let Some(editor) = editor else {
            return Ok(Outcome::Cancelled);
        };
        let config = self.resolve(Some(&name), editor.language_id())?;
        Ok(self.apply_config(prompter, editor, &config))
    }

    fn apply_config<P, D>(
        &self,
        prompter: &mut P,
        editor: Editor<'_, D>,
        config: &ResolvedConfig,
    ) -> Outcome
    where
        P: Prompter + ?Sized,
        D: TextDocument + ?Sized,
    {
        let renderer = BannerRenderer::new(&self.fonts);
        match apply_to_selections(editor.document, &editor.selections, &renderer, config) {
            Ok(count) => Outcome::Applied(count),
            Err(err) => {
                tracing::warn!("Banner not applied: {}", err);
                prompter.show_error(&err.to_string());
                Outcome::Rejected
            }
        }
    }

    /// Pick a font from the full list and make it the default.
    pub async fn set_default_font<P: Prompter + ?Sized>(&self, prompter: &mut P) -> Result<Outcome> {
        let items = font_items(&self.fonts.list_available_font_names());
        self.set_default_font_from(prompter, items).await
    }

    /// Pick a favorite font and make it the default.
    pub async fn set_default_font_from_favorites<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
    ) -> Result<Outcome> {
        let settings = self.store.load()?;
        self.set_default_font_from(prompter, font_items(&settings.favorites))
            .await
    }

    async fn set_default_font_from<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
        items: Vec<PickItem>,
    ) -> Result<Outcome> {
        let Some(picked) = prompter.pick("font", items).await else {
            return Ok(Outcome::Cancelled);
        };

        self.update(|settings| {
            settings.defaults.font = Some(picked.label.clone());
        })?;
        tracing::info!("Default font set to '{}'", picked.label);
        Ok(Outcome::Updated)
    }

    /// Pick a font from the full list and add it to the favorites.
    pub async fn add_font_to_favorites<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
    ) -> Result<Outcome> {
        let items = font_items(&self.fonts.list_available_font_names());
        let Some(picked) = prompter.pick("font", items).await else {
            return Ok(Outcome::Cancelled);
        };

        let mut settings = self.store.load()?;
        if !settings.add_favorite(&picked.label) {
            prompter.show_info(&format!(
                "Chosen font '{}' already in favorites.",
                picked.label
            ));
            return Ok(Outcome::Rejected);
        }

        self.store.save(&settings)?;
        tracing::info!("Added '{}' to favorites", picked.label);
        Ok(Outcome::Updated)
    }

    /// Add the current default font to the favorites.
    pub fn add_current_font_to_favorites<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
    ) -> Result<Outcome> {
        let mut settings = self.store.load()?;
        let current = settings.defaults.font.clone();

        match current {
            Some(font) if settings.add_favorite(&font) => {
                self.store.save(&settings)?;
                tracing::info!("Added '{}' to favorites", font);
                Ok(Outcome::Updated)
            }
            current => {
                prompter.show_info(&format!(
                    "Current font '{}' is already in favorites.",
                    current.unwrap_or_default()
                ));
                Ok(Outcome::Rejected)
            }
        }
    }

    /// Pick a favorite font and remove it.
    pub async fn remove_from_favorites<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
    ) -> Result<Outcome> {
        let settings = self.store.load()?;
        if settings.favorites.is_empty() {
            prompter.show_info("No fonts in favorites list");
            return Ok(Outcome::Rejected);
        }

        let Some(picked) = prompter.pick("font", font_items(&settings.favorites)).await else {
            return Ok(Outcome::Cancelled);
        };

        self.update(|settings| {
            settings.remove_favorite(&picked.label);
        })?;
        tracing::info!("Removed '{}' from favorites", picked.label);
        Ok(Outcome::Updated)
    }

    /// Ask for a `.flf` path, save it and register the font.
    pub async fn add_custom_font<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Result<Outcome> {
        let Some(input) = prompter.input("file path to .flf font").await else {
            return Ok(Outcome::Cancelled);
        };
        if input.is_empty() {
            return Ok(Outcome::Cancelled);
        }

        let path = match validate_custom_font_path(&input) {
            Ok(path) => path,
            Err(err) => {
                prompter.show_error(&err.to_string());
                return Ok(Outcome::Rejected);
            }
        };

        let mut settings = self.store.load()?;
        if !settings.add_custom_font(&path) {
            prompter.show_info("Custom font already exists");
            return Ok(Outcome::Rejected);
        }

        self.store.save(&settings)?;
        self.fonts.register_custom_fonts(&settings.custom_fonts);
        tracing::info!("Added custom font {}", path);
        Ok(Outcome::Updated)
    }

    /// Pick a custom font path and forget it.
    ///
    /// The font stays registered until the next activation.
    pub async fn remove_custom_font<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
    ) -> Result<Outcome> {
        let settings = self.store.load()?;
        if settings.custom_fonts.is_empty() {
            prompter.show_info("No custom fonts saved");
            return Ok(Outcome::Rejected);
        }

        let items = settings
            .custom_fonts
            .iter()
            .map(|path| PickItem::new(path.as_str(), ""))
            .collect();
        let Some(picked) = prompter.pick("custom font", items).await else {
            return Ok(Outcome::Cancelled);
        };

        self.update(|settings| {
            settings.remove_custom_font(&picked.label);
        })?;
        tracing::info!("Removed custom font {}", picked.label);
        Ok(Outcome::Updated)
    }

    /// Create a named config through the wizard.
    pub async fn add_new_config<P: Prompter + ?Sized>(&self, prompter: &mut P) -> Result<Outcome> {
        let settings = self.store.load()?;
        let wizard = ConfigWizard::new(
            settings.defaults.clone(),
            &settings.configs,
            self.fonts.list_available_font_names(),
        );

        let (name, config) = match wizard.run(prompter).await {
            Ok(created) => created,
            Err(WizardError::Abandoned) => return Ok(Outcome::Cancelled),
            Err(err) => {
                prompter.show_error(&err.to_string());
                return Ok(Outcome::Rejected);
            }
        };

        let mut settings = settings;
        if let Err(err) = settings.configs.insert_new(&name, config) {
            prompter.show_error(&err.to_string());
            return Ok(Outcome::Rejected);
        }

        self.store.save(&settings)?;
        tracing::info!("Created config '{}'", name);
        Ok(Outcome::Updated)
    }

    fn update(&self, change: impl FnOnce(&mut StoredSettings)) -> Result<()> {
        let mut settings = self.store.load()?;
        change(&mut settings);
        self.store.save(&settings)
    }
}
