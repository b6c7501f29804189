//! Access to the spreadsheet that serves as the system of record.
//!
//! The `Sheet` trait is a thin abstraction over the Google Sheets values API. `SheetStore`
//! builds the `Store` contract on top of it. Use `store` to get the right implementation for a
//! `Mode`.

mod sheet;
mod sheet_store;
mod test_sheet;
mod token;

use crate::error::{ErrorType, IntoResult, Res};
use crate::store::Store;
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use sheet::GoogleSheet;
use tracing::debug;

pub use sheet_store::SheetStore;
pub(crate) use test_sheet::TestSheet;
#[cfg(test)]
pub(crate) use test_sheet::TestSheetState;

/// When this environment variable is set and non-empty, the program uses an in-memory sheet
/// instead of Google Sheets.
pub const TEST_MODE_ENV: &str = "VCOST_IN_TEST_MODE";

/// Selects the `Sheet` implementation.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Talk to the Google Sheets API.
    #[default]
    Google,
    /// Use a process-local, in-memory sheet seeded with demo data.
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// Returns `Mode::Test` if `VCOST_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// A block of cell values to be written, starting at the top-left cell of `range`, e.g.
/// `Daten!A1`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct SheetRange {
    pub(crate) range: String,
    pub(crate) values: Vec<Vec<String>>,
}

/// The spreadsheet operations the store needs. Rows are returned the way the Sheets API returns
/// them: trailing empty cells and trailing empty rows are omitted.
#[async_trait::async_trait]
pub(crate) trait Sheet: Send {
    /// Gets all formatted values of the worksheet named `sheet_name`.
    async fn get(&mut self, sheet_name: &str) -> Res<Vec<Vec<String>>>;

    /// Clears the values in each of the A1-notation `ranges`.
    async fn clear_ranges(&mut self, ranges: &[&str]) -> Res<()>;

    /// Writes each of the blocks in `data`.
    async fn write_ranges(&mut self, data: &[SheetRange]) -> Res<()>;
}

/// Creates the `Sheet` implementation for `mode`.
pub(crate) async fn sheet(config: &Config, mode: Mode) -> Res<Box<dyn Sheet + Send>> {
    debug!("Creating a {mode} sheet client");
    Ok(match mode {
        Mode::Google => Box::new(GoogleSheet::new(config).await?),
        Mode::Test => Box::new(TestSheet::new(config.spreadsheet_id())),
    })
}

/// Creates the store for the configured worksheet. Failing to construct the client (e.g. no
/// access token) is a configuration error, not a load failure.
pub async fn store(config: &Config, mode: Mode) -> Result<Box<dyn Store + Send>> {
    let sheet = sheet(config, mode).await.pub_result(ErrorType::Config)?;
    Ok(Box::new(SheetStore::new(
        sheet,
        config.worksheet(),
        Some(config.backup()),
    )))
}
