// Configuration store: the access token and default tags, persisted as
// JSON in `<config dir>/config.json` (default `~/.mixcloud`).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
const CONFIG_DIR: &str = ".mixcloud";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    #[serde(rename = "ACCESS_TOKEN")]
    pub access_token: String,
    #[serde(rename = "DEFAULT_TAGS", default)]
    pub default_tags: String,
}

/// Result of looking for a saved configuration.
#[derive(Debug)]
pub enum Loaded {
    Found(Configuration),
    Missing,
    /// The file exists but could not be read as a configuration.
    Invalid(anyhow::Error),
}

/// Location of the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Use `dir` when given, else `~/.mixcloud`.
    pub fn new(dir: Option<PathBuf>) -> Result<Self> {
        let dir = match dir {
            Some(d) => d,
            None => dirs::home_dir()
                .ok_or_else(|| anyhow!("Could not determine your home directory"))?
                .join(CONFIG_DIR),
        };
        Ok(ConfigStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn load(&self) -> Loaded {
        let path = self.path();
        log::debug!("loading configuration from {}", path.display());
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Loaded::Missing,
            Err(e) => {
                return Loaded::Invalid(
                    anyhow::Error::new(e).context(format!("Error reading {}", path.display())),
                )
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => Loaded::Found(config),
            Err(e) => Loaded::Invalid(
                anyhow::Error::new(e).context(format!("Error reading config file {}", path.display())),
            ),
        }
    }

    /// Overwrite the configuration file, creating its directory if needed.
    pub fn save(&self, config: &Configuration) -> Result<()> {
        create_private_dir(&self.dir)?;
        let path = self.path();
        let content = serde_json::to_string_pretty(config)?;
        write_private(&path, content.as_bytes())
            .with_context(|| format!("Unable to save configuration file {}", path.display()))?;
        log::debug!("configuration saved to {}", path.display());
        Ok(())
    }
}

impl Configuration {
    /// Fails unless an access token is present.
    pub fn require_token(&self) -> Result<&str> {
        if self.access_token.trim().is_empty() {
            anyhow::bail!("Access Token configuration missing.");
        }
        Ok(&self.access_token)
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    if dir.is_dir() {
        return Ok(());
    }
    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
        .with_context(|| format!("Unable to create {}", dir.display()))
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Unable to create {}", dir.display()))
}

#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ConfigStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(Some(tmp.path().join("mixcloud"))).unwrap();
        (tmp, store)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_tmp, store) = store();
        let config = Configuration {
            access_token: "tok".into(),
            default_tags: "house,techno".into(),
        };
        store.save(&config).unwrap();
        match store.load() {
            Loaded::Found(loaded) => assert_eq!(loaded, config),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn file_uses_upper_case_keys() {
        let (_tmp, store) = store();
        store
            .save(&Configuration {
                access_token: "tok".into(),
                default_tags: "".into(),
            })
            .unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"ACCESS_TOKEN\": \"tok\""));
        assert!(raw.contains("\"DEFAULT_TAGS\""));
    }

    #[test]
    fn default_tags_are_optional() {
        let (_tmp, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path(), r#"{"ACCESS_TOKEN": "tok"}"#).unwrap();
        match store.load() {
            Loaded::Found(c) => assert_eq!(c.default_tags, ""),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_and_invalid_files() {
        let (_tmp, store) = store();
        assert!(matches!(store.load(), Loaded::Missing));

        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Loaded::Invalid(_)));
    }

    #[test]
    fn empty_token_is_rejected() {
        let config = Configuration::default();
        let err = config.require_token().unwrap_err();
        assert_eq!(err.to_string(), "Access Token configuration missing.");
        let config = Configuration {
            access_token: "tok".into(),
            ..Default::default()
        };
        assert_eq!(config.require_token().unwrap(), "tok");
    }

    #[cfg(unix)]
    #[test]
    fn directory_and_file_are_private() {
        use std::os::unix::fs::PermissionsExt;
        let (_tmp, store) = store();
        store.save(&Configuration::default()).unwrap();
        let dir_mode = fs::metadata(store.dir()).unwrap().permissions().mode() & 0o777;
        let file_mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
        assert_eq!(file_mode, 0o600);
    }

    #[test]
    fn default_dir_is_under_home() {
        if let Some(home) = dirs::home_dir() {
            let store = ConfigStore::new(None).unwrap();
            assert_eq!(store.path(), home.join(".mixcloud").join("config.json"));
        }
    }
}
