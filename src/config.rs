//! Configuration file handling.
//!
//! The configuration file is stored at `$VCOST_HOME/config.json` and holds the store connection
//! settings: the Google Sheet URL, the worksheet name, the backup settings and the path of the
//! access token file.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult, Res};
use crate::Result;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "vcost";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const SECRETS: &str = ".secrets";
const BACKUPS: &str = ".backups";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";

/// The name of the worksheet holding the records, unless configured otherwise.
pub const DEFAULT_WORKSHEET: &str = "Daten";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$VCOST_HOME` and from there it loads `$VCOST_HOME/config.json`. It provides paths
/// to other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    spreadsheet_id: String,
}

impl Config {
    /// Creates the data directory, its subdirectories and:
    /// - Creates an initial `config.json` file using `sheet_url` along with default settings
    /// - Moves `token_file`, if given, into its default location in the data dir.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/vcost`
    /// - `sheet_url` - The URL of the Google Sheet where the records are stored.
    ///   e.g. https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    /// - `worksheet` - The name of the worksheet (tab) holding the records.
    /// - `token_file` - A JSON file holding an access token for the Sheets API.
    ///
    /// # Errors
    /// - Returns an error if the sheet URL is not a Google Sheets URL.
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        sheet_url: &str,
        worksheet: Option<&str>,
        token_file: Option<&Path>,
    ) -> Res<Self> {
        let spreadsheet_id = extract_spreadsheet_id(sheet_url)?.to_string();

        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;
        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        if let Some(token_file) = token_file {
            utils::rename(token_file, secrets.join(TOKEN_JSON)).await?;
        }

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            sheet_url: sheet_url.to_string(),
            worksheet: worksheet.unwrap_or(DEFAULT_WORKSHEET).to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups,
            secrets,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - validate that the backups and secrets directories exist
    /// - return the loaded configuration object
    ///
    /// # Errors
    /// All errors are of type `ErrorType::Config`.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The home directory is missing, run 'vcost init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "No config file at '{}', run 'vcost init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let spreadsheet_id = extract_spreadsheet_id(&config_file.sheet_url)
            .with_context(|| format!("Invalid sheet_url in {}", config_path.display()))?
            .to_string();

        let backups = root.join(BACKUPS);
        let secrets = root.join(SECRETS);
        for (dir, what) in [(&backups, "backups"), (&secrets, "secrets")] {
            if !dir.is_dir() {
                bail!("The {what} directory is missing '{}'", dir.display())
            }
        }
        let config = Self {
            root,
            backups,
            secrets,
            config_path,
            config_file,
            spreadsheet_id,
        };
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn worksheet(&self) -> &str {
        &self.config_file.worksheet
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves the relative path.
    pub fn token_path(&self) -> PathBuf {
        let p = self.config_file.token_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "vcost",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/1vQx3FhKd8ZpLmA2wTn7cRb5YeUg9JsO4iHk6WtPzVqE",
///   "worksheet": "Daten",
///   "backup_copies": 5,
///   "token_path": ".secrets/token.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "vcost"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL to the Google Sheet
    sheet_url: String,

    /// Name of the worksheet holding the records
    #[serde(default = "default_worksheet")]
    worksheet: String,

    /// Number of backup copies to keep
    backup_copies: u32,

    /// Path to the access token file (optional, relative to config.json or absolute)
    /// Defaults to $VCOST_HOME/.secrets/token.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_worksheet() -> String {
    DEFAULT_WORKSHEET.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: String::new(),
            worksheet: default_worksheet(),
            backup_copies: BACKUP_COPIES,
            token_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or is not a vcost config file
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the token path.
    ///
    /// If the path is relative, it should be interpreted as relative to the config.json file.
    /// If None, defaults to $VCOST_HOME/.secrets/token.json
    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_JSON))
    }
}

/// Returns the ID segment that follows `/d/` in a Google Sheets URL, e.g.
/// `https://docs.google.com/spreadsheets/d/{ID}/edit#gid=0`.
fn extract_spreadsheet_id(url: &str) -> Res<&str> {
    let id = url
        .split_once("/d/")
        .map(|(_, rest)| rest)
        .and_then(|rest| rest.split(['/', '?', '#']).next())
        .filter(|id| !id.is_empty());
    match id {
        Some(id) => Ok(id),
        None => bail!(
            "'{url}' is not a Google Sheets URL, expected \
            https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
        ),
    }
}
