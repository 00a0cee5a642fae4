pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Explicit settings file path
pub const ENV_SETTINGS_PATH: &str = "VPCFLOW_SETTINGS_PATH";
/// Maximum wait for each NAT gateway, in seconds
pub const ENV_NAT_WAIT_TIMEOUT: &str = "VPCFLOW_NAT_WAIT_TIMEOUT";
/// Directory holding `.vpcflow/state.json`
pub const ENV_STATE_DIR: &str = "VPCFLOW_STATE_DIR";
/// Named AWS profile
pub const ENV_PROFILE: &str = "VPCFLOW_PROFILE";

const DEFAULT_NAT_WAIT_TIMEOUT_SECS: u64 = 600;
const SETTINGS_FILE: &str = "settings.yaml";

/// vpcflow's configuration directory (`~/.config/vpcflow`)
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("vpcflow"))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// Locate the settings file
///
/// Search order:
/// 1. `VPCFLOW_SETTINGS_PATH` (must exist when set)
/// 2. `~/.config/vpcflow/settings.yaml`
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    if let Ok(settings_path) = std::env::var(ENV_SETTINGS_PATH) {
        let path = PathBuf::from(settings_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::SettingsNotFound(path));
    }

    let Some(dir) = dirs::config_dir() else {
        return Ok(None);
    };
    let path = dir.join("vpcflow").join(SETTINGS_FILE);
    Ok(path.exists().then_some(path))
}

/// Operational settings
///
/// The network topology itself is fixed; these only tune how a run behaves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub nat_wait_timeout_secs: u64,
    pub state_dir: Option<PathBuf>,
    pub profile: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nat_wait_timeout_secs: DEFAULT_NAT_WAIT_TIMEOUT_SECS,
            state_dir: None,
            profile: None,
        }
    }
}

impl Settings {
    /// Settings file (if any) overlaid with environment variables
    pub fn load() -> Result<Self> {
        let mut settings = match find_settings_file()? {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        settings.apply_env()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(ENV_NAT_WAIT_TIMEOUT) {
            self.nat_wait_timeout_secs =
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_NAT_WAIT_TIMEOUT,
                    value: value.clone(),
                })?;
        }
        if let Ok(value) = std::env::var(ENV_STATE_DIR)
            && !value.is_empty()
        {
            self.state_dir = Some(PathBuf::from(value));
        }
        if let Ok(value) = std::env::var(ENV_PROFILE)
            && !value.is_empty()
        {
            self.profile = Some(value);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.nat_wait_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "nat_wait_timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn nat_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.nat_wait_timeout_secs)
    }

    /// Directory the state file is written under
    pub fn state_root(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_config_dir() {
        let dir = config_dir().unwrap();
        assert!(dir.ends_with("vpcflow"));
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.yaml");
        fs::write(&settings_path, "").unwrap();

        temp_env::with_vars(
            [
                (ENV_SETTINGS_PATH, Some(settings_path.to_str().unwrap())),
                (ENV_NAT_WAIT_TIMEOUT, None),
                (ENV_STATE_DIR, None),
                (ENV_PROFILE, None),
            ],
            || {
                let settings = Settings::load().unwrap();
                assert_eq!(settings, Settings::default());
                assert_eq!(settings.nat_wait_timeout(), Duration::from_secs(600));
            },
        );
    }

    #[test]
    #[serial]
    fn test_load_file_then_env_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.yaml");
        fs::write(
            &settings_path,
            "nat_wait_timeout_secs: 900\nstate_dir: /var/lib/vpcflow\nprofile: skills\n",
        )
        .unwrap();

        temp_env::with_vars(
            [
                (ENV_SETTINGS_PATH, Some(settings_path.to_str().unwrap())),
                (ENV_NAT_WAIT_TIMEOUT, Some("120")),
                (ENV_STATE_DIR, None),
                (ENV_PROFILE, None),
            ],
            || {
                let settings = Settings::load().unwrap();
                assert_eq!(settings.nat_wait_timeout_secs, 120);
                assert_eq!(settings.state_dir, Some(PathBuf::from("/var/lib/vpcflow")));
                assert_eq!(settings.profile.as_deref(), Some("skills"));
                assert_eq!(
                    settings.state_root().unwrap(),
                    PathBuf::from("/var/lib/vpcflow")
                );
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.yaml");
        fs::write(&settings_path, "").unwrap();

        temp_env::with_vars(
            [
                (ENV_SETTINGS_PATH, Some(settings_path.to_str().unwrap())),
                (ENV_NAT_WAIT_TIMEOUT, Some("ten minutes")),
            ],
            || {
                let err = Settings::load().unwrap_err();
                assert!(matches!(
                    err,
                    ConfigError::InvalidValue {
                        key: ENV_NAT_WAIT_TIMEOUT,
                        ..
                    }
                ));
            },
        );
    }

    #[test]
    #[serial]
    fn test_zero_timeout_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.yaml");
        fs::write(&settings_path, "nat_wait_timeout_secs: 0\n").unwrap();

        temp_env::with_vars(
            [
                (ENV_SETTINGS_PATH, Some(settings_path.to_str().unwrap())),
                (ENV_NAT_WAIT_TIMEOUT, None),
            ],
            || {
                assert!(Settings::load().is_err());
            },
        );
    }

    #[test]
    #[serial]
    fn test_missing_settings_path() {
        temp_env::with_var(ENV_SETTINGS_PATH, Some("/nonexistent/settings.yaml"), || {
            let err = find_settings_file().unwrap_err();
            assert!(matches!(err, ConfigError::SettingsNotFound(_)));
        });
    }

    #[test]
    fn test_unknown_field_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.yaml");
        fs::write(&settings_path, "region: us-east-1\n").unwrap();

        let err = Settings::from_file(&settings_path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
