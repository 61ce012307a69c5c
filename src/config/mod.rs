use crate::models::{Settings, StoredSettings};
use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::RwLock;

/// Directory name used under the platform config directory.
pub const SETTINGS_DIR_NAME: &str = "banner-comments";

/// File name of the persisted settings.
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Persistence for everything under the banner settings namespace.
///
/// Updates are whole-document: callers load, modify and save the complete
/// [`StoredSettings`], so a failed validation never leaves a half-written
/// list behind.
pub trait SettingsStore {
    /// Load the stored settings. Missing values fall back to the built-in
    /// defaults.
    fn load(&self) -> Result<StoredSettings>;

    /// Replace the stored settings.
    fn save(&self, settings: &StoredSettings) -> Result<()>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn load(&self) -> Result<StoredSettings> {
        (**self).load()
    }

    fn save(&self, settings: &StoredSettings) -> Result<()> {
        (**self).save(settings)
    }
}

/// YAML settings file on disk.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: Utf8PathBuf,
}

impl FileSettingsStore {
    /// Create a store backed by the file at `path`.
    ///
    /// # Arguments
    /// * `path` - Settings file (e.g., "~/.config/banner-comments/settings.yaml")
    ///
    /// # Returns
    /// A new FileSettingsStore. The file is not touched until the first save.
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at the platform's per-user config location.
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// `<config dir>/banner-comments/settings.yaml`
    pub fn default_path() -> Result<Utf8PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine the user config directory"))?;
        let config_dir = Utf8PathBuf::try_from(config_dir)
            .context("User config directory is not valid UTF-8")?;

        Ok(config_dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Get the settings file path.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<StoredSettings> {
        if !self.path.exists() {
            tracing::debug!("Settings file not found at {}, using defaults", self.path);
            return Ok(StoredSettings::default());
        }

        let file_contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings: {}", self.path))?;

        let mut settings: StoredSettings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.path))?;
        settings.defaults = settings.defaults.merged_over(&Settings::builtin_defaults());

        tracing::debug!("Loaded settings from {}", self.path);
        Ok(settings)
    }

    fn save(&self, settings: &StoredSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory: {}", parent))?;
            }
        }

        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.path))?;

        tracing::info!("Saved settings to {}", self.path);
        Ok(())
    }
}

/// Settings kept in memory, for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<StoredSettings>,
}

impl MemorySettingsStore {
    pub fn new(settings: StoredSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> Result<StoredSettings> {
        self.load()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<StoredSettings> {
        let settings = self
            .settings
            .read()
            .map_err(|_| anyhow!("Settings lock poisoned"))?;
        Ok(settings.clone())
    }

    fn save(&self, settings: &StoredSettings) -> Result<()> {
        let mut stored = self
            .settings
            .write()
            .map_err(|_| anyhow!("Settings lock poisoned"))?;
        *stored = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommentStyle, Layout};
    use crate::test_support::capture_logs;
    use tempfile::TempDir;

    fn create_test_store() -> (FileSettingsStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let store = FileSettingsStore::new(dir.join("nested").join(SETTINGS_FILE_NAME));
        (store, temp_dir)
    }

    #[test]
    fn test_repeated_loads_stay_quiet() {
        let (store, _temp_dir) = create_test_store();

        let (_, logs) = capture_logs(tracing::Level::INFO, || {
            store.load().unwrap();
            store.load().unwrap();
        });
        assert_eq!(logs, "");

        store.save(&StoredSettings::default()).unwrap();
        let (_, logs) = capture_logs(tracing::Level::INFO, || store.load().unwrap());
        assert_eq!(logs, "");
    }

    #[test]
    fn test_missing_file_gives_builtin_defaults() {
        let (store, _temp_dir) = create_test_store();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, StoredSettings::default());
        assert_eq!(loaded.defaults.font.as_deref(), Some("standard"));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_creates_directory_and_round_trips() {
        let (store, _temp_dir) = create_test_store();

        let mut settings = StoredSettings::default();
        settings.defaults.font = Some("slant".to_string());
        settings.add_favorite("banner3");
        store.save(&settings).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_partial_file_is_completed_with_defaults() {
        let (store, _temp_dir) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "commentStyle: line\nfavorites: [slant]\n").unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.defaults.comment_style, Some(CommentStyle::Line));
        assert_eq!(loaded.defaults.horizontal_layout, Some(Layout::Default));
        assert_eq!(loaded.defaults.trim_empty_lines, Some(true));
        assert_eq!(loaded.favorites, vec!["slant".to_string()]);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let (store, _temp_dir) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "horizontalLayout: sideways\n").unwrap();

        let err = store.load().unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse settings"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySettingsStore::default();
        let mut settings = store.load().unwrap();
        settings.add_custom_font("/fonts/doom.flf");
        store.save(&settings).unwrap();

        assert_eq!(store.snapshot().unwrap().custom_fonts, vec!["/fonts/doom.flf"]);
    }
}
