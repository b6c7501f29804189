use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and:
/// - Creates an initial `config.json` file using `sheet_url` along with default settings
/// - Moves `token_file`, if given, into its default location in the data dir.
///
/// # Arguments
/// - `home` - The directory that will be the root of data directory, e.g. `$HOME/vcost`
/// - `sheet_url` - The URL of the Google Sheet where the records are stored.
///   e.g. https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
/// - `worksheet` - The worksheet holding the records, `Daten` when not given.
/// - `token_file` - A JSON file holding an access token for the Sheets API.
///
/// # Errors
/// - Returns an error if the URL is not a Google Sheets URL.
/// - Returns an error if any file operations fail.
pub async fn init(
    home: &Path,
    sheet_url: &str,
    worksheet: Option<&str>,
    token_file: Option<&Path>,
) -> Result<Out<()>> {
    let config = Config::create(home, sheet_url, worksheet, token_file)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the vcost directory at {} for worksheet '{}'",
        config.root().display(),
        config.worksheet()
    )
    .into())
}
