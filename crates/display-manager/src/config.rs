use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const FILE_NAME: &str = "display-config.toml";

/// Serial number to two hex digit input code.
pub type Profile = BTreeMap<String, String>;

/// User settings, keyed by display serial number so they survive reconnects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long `set` waits for a display to report its new input.
    pub input_change_timeout_ms: u64,

    /// The profile loaded most recently, used by `profile toggle`.
    pub last_profile: Option<String>,

    /// Serial number to user chosen display name.
    pub names: BTreeMap<String, String>,

    /// Profile name to the inputs it restores.
    pub profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file:\n{0}")]
    Read(#[source] io::Error),

    #[error("Failed to deserialize config file:\n{0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("Failed to serialize config file:\n{0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file:\n{0}")]
    Write(#[source] io::Error),
}

impl Config {
    /// Loads the config file, `None` if there isn't one yet.
    pub fn try_load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(ConfigError::Read(error)),
        };

        let config: Self = toml::from_str(&contents)?;

        Ok(Some(config))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)?;

        fs::write(path, toml_string.as_bytes()).map_err(ConfigError::Write)
    }

    pub fn file_path(config_dir: &Path) -> PathBuf {
        config_dir.join(FILE_NAME)
    }

    /// The name to show for a display.
    pub fn display_name<'a>(&'a self, serial: &str, friendly_name: &'a str) -> &'a str {
        self.names
            .get(serial)
            .map_or(friendly_name, String::as_str)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_change_timeout_ms: 5000,
            last_profile: None,
            names: BTreeMap::new(),
            profiles: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::{env, fs, process};

    use super::{Config, ConfigError, Profile};

    fn scratch_file(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("display-manager-{}-{name}.toml", process::id()))
    }

    #[test]
    fn missing_file_is_none() {
        let path = scratch_file("missing");
        let _ = fs::remove_file(&path);

        assert!(Config::try_load(&path).unwrap().is_none());
    }

    #[test]
    fn saves_and_loads() {
        let path = scratch_file("round-trip");

        let mut config = Config {
            last_profile: Some("work".to_string()),
            ..Config::default()
        };
        config
            .names
            .insert("7MT0186K1ABL".to_string(), "Left".to_string());
        config.profiles.insert(
            "work".to_string(),
            Profile::from([("7MT0186K1ABL".to_string(), "0F".to_string())]),
        );
        config.save(&path).unwrap();

        let loaded = Config::try_load(&path).unwrap().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let config: Config = toml::from_str("[names]\nABC123 = \"Right\"\n").unwrap();

        assert_eq!(config.input_change_timeout_ms, 5000);
        assert_eq!(config.last_profile, None);
        assert_eq!(config.display_name("ABC123", "DELL U2415"), "Right");
        assert_eq!(config.display_name("XYZ", "DELL U2415"), "DELL U2415");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let path = scratch_file("invalid");
        fs::write(&path, "input_change_timeout_ms = \"soon\"").unwrap();

        let result = Config::try_load(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }
}
