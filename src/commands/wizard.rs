//! Interactive creation of a named config.
//!
//! The wizard walks a fixed sequence of steps, one per field. Every step
//! consumes exactly one answer; abandoning any prompt ends the whole flow.

use thiserror::Error;

use super::{PickItem, Prompter};
use crate::models::{CommentStyle, ConfigError, Layout, NamedConfigs, Settings};

/// Label of the pick item that keeps a field at its default.
pub const DEFAULT_VALUE_LABEL: &str = "Default Value";

/// Text answer that stands for an explicitly empty string.
pub const EMPTY_TEXT_ANSWER: &str = "''";

/// Steps of the wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    SaveDefaults,
    Name,
    Font,
    HorizontalLayout,
    VerticalLayout,
    TrimTrailingWhitespace,
    TrimEmptyLines,
    Prefix,
    Suffix,
    PerLinePrefix,
    CommentStyle,
    Done,
}

impl WizardStep {
    fn next(self) -> Self {
        match self {
            WizardStep::SaveDefaults => WizardStep::Name,
            WizardStep::Name => WizardStep::Font,
            WizardStep::Font => WizardStep::HorizontalLayout,
            WizardStep::HorizontalLayout => WizardStep::VerticalLayout,
            WizardStep::VerticalLayout => WizardStep::TrimTrailingWhitespace,
            WizardStep::TrimTrailingWhitespace => WizardStep::TrimEmptyLines,
            WizardStep::TrimEmptyLines => WizardStep::Prefix,
            WizardStep::Prefix => WizardStep::Suffix,
            WizardStep::Suffix => WizardStep::PerLinePrefix,
            WizardStep::PerLinePrefix => WizardStep::CommentStyle,
            WizardStep::CommentStyle | WizardStep::Done => WizardStep::Done,
        }
    }
}

/// What the current step asks the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPrompt {
    Pick {
        placeholder: &'static str,
        items: Vec<PickItem>,
    },
    Input {
        prompt: &'static str,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Config creation abandoned")]
    Abandoned,

    #[error(transparent)]
    Invalid(#[from] ConfigError),

    #[error("Unknown choice '{choice}' for {field}")]
    UnknownChoice { field: &'static str, choice: String },
}

/// Linear state machine collecting a new named config.
#[derive(Debug, Clone)]
pub struct ConfigWizard {
    step: WizardStep,
    defaults: Settings,
    existing_names: Vec<String>,
    font_names: Vec<String>,
    save_defaults: bool,
    name: String,
    config: Settings,
}

impl ConfigWizard {
    /// Start a wizard.
    ///
    /// # Arguments
    /// * `defaults` - Current default settings, copied in when the user asks
    ///   to store default values
    /// * `existing` - Configs already saved, for the uniqueness check
    /// * `font_names` - Fonts offered by the font step
    pub fn new(defaults: Settings, existing: &NamedConfigs, font_names: Vec<String>) -> Self {
        Self {
            step: WizardStep::SaveDefaults,
            defaults,
            existing_names: existing.names().map(str::to_string).collect(),
            font_names,
            save_defaults: false,
            name: String::new(),
            config: Settings::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.step == WizardStep::Done
    }

    /// The prompt for the current step, `None` once done.
    pub fn prompt(&self) -> Option<WizardPrompt> {
        let prompt = match self.step {
            WizardStep::SaveDefaults => WizardPrompt::Pick {
                placeholder: "Store default values in config?",
                items: boolean_items(),
            },
            WizardStep::Name => WizardPrompt::Input {
                prompt: "Name for Config",
            },
            WizardStep::Font => WizardPrompt::Pick {
                placeholder: "font",
                items: with_default_item(super::font_items(&self.font_names)),
            },
            WizardStep::HorizontalLayout => WizardPrompt::Pick {
                placeholder: "horizontalLayout",
                items: with_default_item(layout_items()),
            },
            WizardStep::VerticalLayout => WizardPrompt::Pick {
                placeholder: "verticalLayout",
                items: with_default_item(layout_items()),
            },
            WizardStep::TrimTrailingWhitespace => WizardPrompt::Pick {
                placeholder: "trimTrailingWhitespace",
                items: with_default_item(boolean_items()),
            },
            WizardStep::TrimEmptyLines => WizardPrompt::Pick {
                placeholder: "trimEmptyLines",
                items: with_default_item(boolean_items()),
            },
            WizardStep::Prefix => WizardPrompt::Input {
                prompt: "Prefix - '' for empty, leave blank for Default Value",
            },
            WizardStep::Suffix => WizardPrompt::Input {
                prompt: "Suffix - '' for empty, leave blank for Default Value",
            },
            WizardStep::PerLinePrefix => WizardPrompt::Input {
                prompt: "perLinePrefix - '' for empty, leave blank for Default Value",
            },
            WizardStep::CommentStyle => WizardPrompt::Pick {
                placeholder: "commentStyle",
                items: with_default_item(comment_style_items()),
            },
            WizardStep::Done => return None,
        };
        Some(prompt)
    }

    /// Consume the answer to the current step and advance.
    ///
    /// `None` means the user abandoned the prompt. Pick answers are item
    /// labels; text answers are taken as typed.
    pub fn answer(&mut self, answer: Option<&str>) -> Result<WizardStep, WizardError> {
        let Some(answer) = answer else {
            tracing::debug!("Config wizard abandoned at {:?}", self.step);
            return Err(WizardError::Abandoned);
        };

        match self.step {
            WizardStep::SaveDefaults => {
                self.save_defaults = parse_bool("saveDefaults", answer)?;
            }
            WizardStep::Name => {
                if answer.is_empty() {
                    return Err(ConfigError::MissingName.into());
                }
                if self.existing_names.iter().any(|name| name == answer) {
                    return Err(ConfigError::DuplicateName(answer.to_string()).into());
                }
                self.name = answer.to_string();
            }
            WizardStep::Font => {
                self.config.font = self.picked(answer, |d| d.font.clone(), |label| {
                    Ok(label.to_string())
                })?;
            }
            WizardStep::HorizontalLayout => {
                self.config.horizontal_layout =
                    self.picked(answer, |d| d.horizontal_layout, |label| {
                        parse_choice("horizontalLayout", label)
                    })?;
            }
            WizardStep::VerticalLayout => {
                self.config.vertical_layout = self.picked(answer, |d| d.vertical_layout, |label| {
                    parse_choice("verticalLayout", label)
                })?;
            }
            WizardStep::TrimTrailingWhitespace => {
                self.config.trim_trailing_whitespace =
                    self.picked(answer, |d| d.trim_trailing_whitespace, |label| {
                        parse_bool("trimTrailingWhitespace", label)
                    })?;
            }
            WizardStep::TrimEmptyLines => {
                self.config.trim_empty_lines =
                    self.picked(answer, |d| d.trim_empty_lines, |label| {
                        parse_bool("trimEmptyLines", label)
                    })?;
            }
            WizardStep::Prefix => {
                self.config.prefix = self.typed(answer, |d| d.prefix.clone());
            }
            WizardStep::Suffix => {
                self.config.suffix = self.typed(answer, |d| d.suffix.clone());
            }
            WizardStep::PerLinePrefix => {
                self.config.per_line_prefix = self.typed(answer, |d| d.per_line_prefix.clone());
            }
            WizardStep::CommentStyle => {
                self.config.comment_style = self.picked(answer, |d| d.comment_style, |label| {
                    parse_choice::<CommentStyle>("commentStyle", label)
                })?;
            }
            WizardStep::Done => return Ok(WizardStep::Done),
        }

        self.step = self.step.next();
        Ok(self.step)
    }

    /// Name and settings of the finished config, `None` if not done yet.
    pub fn finish(self) -> Option<(String, Settings)> {
        self.is_done().then_some((self.name, self.config))
    }

    /// Drive the wizard to completion with a prompter.
    pub async fn run<P: Prompter + ?Sized>(
        mut self,
        prompter: &mut P,
    ) -> Result<(String, Settings), WizardError> {
        while let Some(prompt) = self.prompt() {
            let answer = match prompt {
                WizardPrompt::Pick { placeholder, items } => {
                    prompter.pick(placeholder, items).await.map(|item| item.label)
                }
                WizardPrompt::Input { prompt } => prompter.input(prompt).await,
            };
            self.answer(answer.as_deref())?;
        }

        self.finish().ok_or(WizardError::Abandoned)
    }

    /// A pick step: the default item keeps the default (or copies it when
    /// storing defaults), anything else is parsed.
    fn picked<T>(
        &self,
        answer: &str,
        default: impl Fn(&Settings) -> Option<T>,
        parse: impl Fn(&str) -> Result<T, WizardError>,
    ) -> Result<Option<T>, WizardError> {
        if answer == DEFAULT_VALUE_LABEL {
            return Ok(self.default_value(default));
        }
        parse(answer).map(Some)
    }

    /// A text step: blank keeps the default, `''` is an empty string.
    fn typed(&self, answer: &str, default: impl Fn(&Settings) -> Option<String>) -> Option<String> {
        match answer {
            "" => self.default_value(default),
            EMPTY_TEXT_ANSWER => Some(String::new()),
            text => Some(text.to_string()),
        }
    }

    fn default_value<T>(&self, default: impl Fn(&Settings) -> Option<T>) -> Option<T> {
        if self.save_defaults {
            default(&self.defaults)
        } else {
            None
        }
    }
}

fn parse_bool(field: &'static str, label: &str) -> Result<bool, WizardError> {
    match label.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(WizardError::UnknownChoice {
            field,
            choice: label.to_string(),
        }),
    }
}

fn parse_choice<T: std::str::FromStr>(field: &'static str, label: &str) -> Result<T, WizardError> {
    label.parse().map_err(|_| WizardError::UnknownChoice {
        field,
        choice: label.to_string(),
    })
}

fn with_default_item(items: Vec<PickItem>) -> Vec<PickItem> {
    let mut all = vec![PickItem::new(DEFAULT_VALUE_LABEL, "")];
    all.extend(items);
    all
}

fn boolean_items() -> Vec<PickItem> {
    vec![PickItem::new("True", ""), PickItem::new("False", "")]
}

fn layout_items() -> Vec<PickItem> {
    Layout::ALL
        .iter()
        .map(|layout| PickItem::new(layout.as_str(), ""))
        .collect()
}

fn comment_style_items() -> Vec<PickItem> {
    vec![
        PickItem::new("Block", "prefer block style comments"),
        PickItem::new("Line", "prefer line style comments"),
        PickItem::new("Both", "always render both style comments"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard() -> ConfigWizard {
        let mut existing = NamedConfigs::new();
        existing.insert_new("header", Settings::default()).unwrap();
        ConfigWizard::new(
            Settings::builtin_defaults(),
            &existing,
            vec!["standard".to_string(), "slant".to_string()],
        )
    }

    fn answer_all(wizard: &mut ConfigWizard, answers: &[&str]) {
        for answer in answers {
            wizard.answer(Some(answer)).unwrap();
        }
    }

    #[test]
    fn test_steps_run_in_order() {
        let mut wizard = wizard();
        assert_eq!(wizard.step(), WizardStep::SaveDefaults);
        assert_eq!(wizard.answer(Some("False")).unwrap(), WizardStep::Name);
        assert_eq!(wizard.answer(Some("banner")).unwrap(), WizardStep::Font);

        let Some(WizardPrompt::Pick { items, .. }) = wizard.prompt() else {
            panic!("font step should be a pick");
        };
        assert_eq!(items[0].label, DEFAULT_VALUE_LABEL);
        assert_eq!(items[2].description, "Use the slant font");
    }

    #[test]
    fn test_explicit_values() {
        let mut wizard = wizard();
        answer_all(
            &mut wizard,
            &[
                "False",
                "big",
                "slant",
                "fitted",
                "Default Value",
                "True",
                "False",
                "''",
                "-- end --",
                "",
                "Line",
            ],
        );

        let (name, config) = wizard.finish().unwrap();
        assert_eq!(name, "big");
        assert_eq!(config.font.as_deref(), Some("slant"));
        assert_eq!(config.horizontal_layout, Some(Layout::Fitted));
        assert_eq!(config.vertical_layout, None);
        assert_eq!(config.trim_trailing_whitespace, Some(true));
        assert_eq!(config.trim_empty_lines, Some(false));
        assert_eq!(config.prefix.as_deref(), Some(""));
        assert_eq!(config.suffix.as_deref(), Some("-- end --"));
        assert_eq!(config.per_line_prefix, None);
        assert_eq!(config.comment_style, Some(CommentStyle::Line));
    }

    #[test]
    fn test_store_defaults_copies_current_defaults() {
        let mut wizard = wizard();
        answer_all(
            &mut wizard,
            &[
                "True",
                "full-defaults",
                "Default Value",
                "Default Value",
                "Default Value",
                "Default Value",
                "Default Value",
                "",
                "",
                "",
                "Default Value",
            ],
        );

        let (_, config) = wizard.finish().unwrap();
        assert_eq!(config, Settings::builtin_defaults());
    }

    #[test]
    fn test_name_validation() {
        let mut wizard = wizard();
        wizard.answer(Some("False")).unwrap();

        assert_eq!(
            wizard.answer(Some("")).unwrap_err(),
            WizardError::Invalid(ConfigError::MissingName)
        );
        assert_eq!(
            wizard.answer(Some("header")).unwrap_err(),
            WizardError::Invalid(ConfigError::DuplicateName("header".to_string()))
        );
        assert_eq!(wizard.step(), WizardStep::Name);
    }

    #[test]
    fn test_abandon_stops_everything() {
        let mut wizard = wizard();
        answer_all(&mut wizard, &["False", "partial", "slant"]);

        assert_eq!(wizard.answer(None).unwrap_err(), WizardError::Abandoned);
        assert!(wizard.finish().is_none());
    }

    #[test]
    fn test_unknown_layout_choice() {
        let mut wizard = wizard();
        answer_all(&mut wizard, &["False", "x", "slant"]);

        assert!(matches!(
            wizard.answer(Some("sideways")),
            Err(WizardError::UnknownChoice { field: "horizontalLayout", .. })
        ));
    }
}
