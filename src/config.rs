//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json` and contains settings for
//! the application, such as where the SQLite database lives and how many connections to open to
//! it.

use crate::db::Db;
use crate::error::{ErrorType, IntoResult};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const MAX_CONNECTIONS: u32 = 5;
const CONFIG_JSON: &str = "config.json";
const EXPENSES_SQLITE: &str = "expenses.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`. It also
/// owns the database connection pool, which is opened once here and then passed to whatever needs
/// it.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory and:
    /// - Creates and initializes the SQLite database
    /// - Creates an initial `config.json` file with default settings
    ///
    /// `config.json` is written last, so a home whose database could not be created is left
    /// without one and `create` can be run again once the cause is fixed.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/expenses`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    /// - Returns an error if a database already exists in `dir`.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }
        let config_file = ConfigFile::default();
        let sqlite_path = resolve(&root, config_file.sqlite_path());
        let db = Db::init(&sqlite_path, config_file.max_connections)
            .await
            .context("Unable to create SQLite DB")?;

        config_file.save(&config_path).await?;

        debug!("Created expenses home at {}", root.display());
        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `expenses_home` exists and that the config file exists
    /// - load the config file
    /// - open the SQLite database, migrating it if needed
    /// - return the loaded configuration object
    ///
    /// # Errors
    /// Any failure is tagged as `ErrorType::Config`.
    pub async fn load(expenses_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(expenses_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(expenses_home: PathBuf) -> Result<Self> {
        let root = utils::canonicalize(&expenses_home)
            .await
            .context("The expenses home directory is missing, run 'expenses init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = resolve(&root, config_file.sqlite_path());
        let db = Db::load(&sqlite_path, config_file.max_connections)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn max_connections(&self) -> u32 {
        self.config_file.max_connections
    }
}

/// Returns `p` unchanged if it is absolute, otherwise joins it onto `root`.
fn resolve(root: &Path, p: PathBuf) -> PathBuf {
    if p.is_absolute() {
        return p;
    }
    root.join(p)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "max_connections": 5,
///   "sqlite_path": "expenses.sqlite"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Size of the SQLite connection pool
    #[serde(default = "default_max_connections")]
    max_connections: u32,

    /// Path to the SQLite database (optional, relative to config.json or absolute)
    /// Defaults to $EXPENSES_HOME/expenses.sqlite if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    sqlite_path: Option<PathBuf>,
}

fn default_max_connections() -> u32 {
    MAX_CONNECTIONS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            max_connections: MAX_CONNECTIONS,
            sqlite_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the SQLite path. If None, defaults to `expenses.sqlite` relative to the home dir.
    fn sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(EXPENSES_SQLITE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("expenses_home");

        let created = Config::create(&home_dir).await.unwrap();
        assert!(created.config_path().is_file());
        assert!(created.sqlite_path().is_file());
        assert_eq!(created.sqlite_path(), created.root().join(EXPENSES_SQLITE));
        assert_eq!(created.max_connections(), MAX_CONNECTIONS);

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.root(), created.root());
        assert_eq!(loaded.sqlite_path(), created.sqlite_path());
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path()).await.unwrap();
        assert!(Config::create(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_config_create_can_be_retried_after_db_failure() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("expenses_home");
        utils::make_dir(&home_dir).await.unwrap();
        let stray = home_dir.join(EXPENSES_SQLITE);
        utils::write(&stray, "not a database").await.unwrap();

        assert!(Config::create(&home_dir).await.is_err());
        assert!(!home_dir.join(CONFIG_JSON).exists());
        let err = Config::load(&home_dir).await.unwrap_err();
        assert_eq!(crate::error_type(&err), Some(ErrorType::Config));

        tokio::fs::remove_file(&stray).await.unwrap();
        let created = Config::create(&home_dir).await.unwrap();
        assert!(created.config_path().is_file());
        Config::load(&home_dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nowhere")).await.unwrap_err();
        assert_eq!(crate::error_type(&err), Some(ErrorType::Config));
    }

    #[tokio::test]
    async fn test_config_load_custom_sqlite_path() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path().join("a")).await.unwrap();

        // Point a second home directory at the first one's database.
        let other = dir.path().join("b");
        utils::make_dir(&other).await.unwrap();
        let file = ConfigFile {
            sqlite_path: Some(config.sqlite_path().to_path_buf()),
            ..Default::default()
        };
        file.save(other.join(CONFIG_JSON)).await.unwrap();

        let loaded = Config::load(&other).await.unwrap();
        assert_eq!(loaded.sqlite_path(), config.sqlite_path());
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original = ConfigFile {
            max_connections: 2,
            sqlite_path: Some(PathBuf::from("data/expenses.sqlite")),
            ..Default::default()
        };
        original.save(&config_path).await.unwrap();

        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "expenses",
            "config_version": 1
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.max_connections, MAX_CONNECTIONS);
        assert_eq!(config.sqlite_path(), PathBuf::from(EXPENSES_SQLITE));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("sqlite_path"));
    }

    #[test]
    fn test_resolve() {
        let root = Path::new("/home/me/expenses");
        assert_eq!(
            resolve(root, PathBuf::from("db.sqlite")),
            PathBuf::from("/home/me/expenses/db.sqlite")
        );
        assert_eq!(
            resolve(root, PathBuf::from("/var/db.sqlite")),
            PathBuf::from("/var/db.sqlite")
        );
    }
}
