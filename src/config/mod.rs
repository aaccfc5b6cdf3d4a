use crate::models::{FormConfig, FormSettings};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment};
use std::fs;

/// File name of the form configuration inside the config directory
pub const FORM_CONFIG_FILE: &str = "Contact Form.yaml";

/// Prefix for environment overrides, e.g. `CONTACT_FORM_ENDPOINT__LATENCY_MS=500`
pub const ENV_PREFIX: &str = "CONTACT_FORM";

/// Configuration manager for loading and saving the form's YAML configuration.
///
/// Field rules and messages come only from the YAML file. The `Settings` block can
/// additionally be overridden from the environment.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    form_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            form_config_path: config_dir.join(FORM_CONFIG_FILE),
            config_dir,
        })
    }

    /// Load the form configuration, applying environment overrides from the process
    /// environment.
    ///
    /// # Returns
    /// The loaded FormConfig, or the default contact form if the file doesn't exist
    pub fn load_form_config(&self) -> Result<FormConfig> {
        self.load_form_config_with_env(None)
    }

    /// Load the form configuration, taking environment overrides from `env` instead of
    /// the process environment when it is `Some`.
    pub fn load_form_config_with_env(
        &self,
        env: Option<::config::Map<String, String>>,
    ) -> Result<FormConfig> {
        let mut form_config = self.read_form_config_file()?;
        form_config.settings = apply_env_overrides(&form_config.settings, env)?;
        Ok(form_config)
    }

    fn read_form_config_file(&self) -> Result<FormConfig> {
        if !self.form_config_path.exists() {
            tracing::warn!(
                "Form config file not found at {}, using defaults",
                self.form_config_path
            );
            return Ok(FormConfig::default());
        }

        let file_contents = fs::read_to_string(&self.form_config_path)
            .with_context(|| format!("Failed to read form config: {}", self.form_config_path))?;

        let config: FormConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse form config: {}", self.form_config_path))?;

        tracing::info!(
            "Loaded form config from {} ({} fields)",
            self.form_config_path,
            config.fields.len()
        );
        Ok(config)
    }

    /// Save the form configuration file.
    pub fn save_form_config(&self, config: &FormConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize form config to YAML")?;

        fs::write(&self.form_config_path, yaml_string)
            .with_context(|| format!("Failed to write form config: {}", self.form_config_path))?;

        tracing::info!("Saved form config to {}", self.form_config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the form configuration file path.
    pub fn form_config_path(&self) -> &Utf8Path {
        &self.form_config_path
    }
}

/// Layer `CONTACT_FORM_*` environment variables over the file settings.
///
/// Nested keys use a double underscore: `CONTACT_FORM_NOTIFICATIONS__FAILURE_SECS=8`.
fn apply_env_overrides(
    settings: &FormSettings,
    env: Option<::config::Map<String, String>>,
) -> Result<FormSettings> {
    let layered = Config::builder()
        .add_source(
            Config::try_from(settings).context("Failed to convert settings for layering")?,
        )
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()
        .context("Failed to apply environment overrides")?;

    let settings: FormSettings = layered
        .try_deserialize()
        .context("Invalid setting in environment override")?;

    tracing::debug!("Effective settings: {:?}", settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    fn no_env() -> Option<::config::Map<String, String>> {
        Some(::config::Map::new())
    }

    #[test]
    fn test_create_config_manager() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert!(manager.form_config_path().ends_with(FORM_CONFIG_FILE));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        let config = manager.load_form_config_with_env(no_env()).unwrap();

        assert_eq!(config.fields.len(), 4);
        assert_eq!(config.settings, FormSettings::default());
    }

    #[test]
    fn test_env_override_nested_setting() {
        let (manager, _temp_dir) = create_test_config_manager();
        let env: ::config::Map<String, String> = [
            ("CONTACT_FORM_ENDPOINT__LATENCY_MS".to_string(), "150".to_string()),
            ("CONTACT_FORM_DEBUG_MODE".to_string(), "true".to_string()),
        ]
        .into_iter()
        .collect();

        let config = manager.load_form_config_with_env(Some(env)).unwrap();

        assert_eq!(config.settings.endpoint.latency_ms, 150);
        assert!(config.settings.debug_mode);
        assert_eq!(config.settings.notifications.success_secs, 3);
    }

    #[test]
    fn test_unrelated_env_ignored() {
        let (manager, _temp_dir) = create_test_config_manager();
        let env: ::config::Map<String, String> =
            [("OTHER_APP_DEBUG_MODE".to_string(), "true".to_string())]
                .into_iter()
                .collect();

        let config = manager.load_form_config_with_env(Some(env)).unwrap();
        assert!(!config.settings.debug_mode);
    }
}
