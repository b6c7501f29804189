//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.

use crate::api::token::access_token;
use crate::api::{Sheet, SheetRange};
use crate::error::Res;
use crate::Config;
use anyhow::Context;
use sheets::types::{
    BatchClearValuesRequest, BatchUpdateValuesRequest, DateTimeRenderOption, Dimension,
    ValueInputOption, ValueRange, ValueRenderOption,
};
use std::path::PathBuf;
use tracing::trace;

/// Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet. The
/// access token is re-read before every request so that an externally refreshed token is picked
/// up without restarting.
pub(super) struct GoogleSheet {
    spreadsheet_id: String,
    token_path: PathBuf,
    client: sheets::Client,
}

impl GoogleSheet {
    pub(super) async fn new(config: &Config) -> Res<Self> {
        let token_path = config.token_path();
        let client = create_sheets_client(&token_path).await?;
        Ok(Self {
            spreadsheet_id: config.spreadsheet_id().to_string(),
            token_path,
            client,
        })
    }

    /// Recreates the sheets client with the current access token.
    async fn refresh_client(&mut self) -> Res<()> {
        self.client = create_sheets_client(&self.token_path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&mut self, sheet_name: &str) -> Res<Vec<Vec<String>>> {
        trace!("get for {sheet_name}");
        self.refresh_client().await?;
        let range = format!("{sheet_name}!A:ZZ"); // Get all columns
        let response = self
            .client
            .spreadsheets()
            .values_get(
                &self.spreadsheet_id,
                &range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .with_context(|| format!("Failed to fetch {sheet_name} sheet data"))?;
        Ok(response.body.values)
    }

    async fn clear_ranges(&mut self, ranges: &[&str]) -> Res<()> {
        trace!("clear_ranges for {ranges:?}");
        self.refresh_client().await?;
        let request = BatchClearValuesRequest {
            ranges: ranges.iter().map(|s| s.to_string()).collect(),
        };
        self.client
            .spreadsheets()
            .values_batch_clear(&self.spreadsheet_id, &request)
            .await
            .with_context(|| format!("Failed to clear ranges: {ranges:?}"))?;
        Ok(())
    }

    async fn write_ranges(&mut self, data: &[SheetRange]) -> Res<()> {
        trace!("write_ranges for {} range(s)", data.len());
        self.refresh_client().await?;
        let value_ranges: Vec<ValueRange> = data
            .iter()
            .map(|sr| ValueRange {
                major_dimension: Some(Dimension::Rows),
                range: sr.range.clone(),
                values: sr.values.clone(),
            })
            .collect();

        // USER_ENTERED so that amounts and dates become numbers and dates in the sheet, the same
        // as if they had been typed in.
        let request = BatchUpdateValuesRequest {
            data: value_ranges,
            include_values_in_response: Some(false),
            response_date_time_render_option: None,
            response_value_render_option: None,
            value_input_option: Some(ValueInputOption::UserEntered),
        };

        self.client
            .spreadsheets()
            .values_batch_update(&self.spreadsheet_id, &request)
            .await
            .context("Failed to write ranges")?;
        Ok(())
    }
}

/// Creates a new sheets client with the current access token.
async fn create_sheets_client(token_path: &std::path::Path) -> Res<sheets::Client> {
    let access_token = access_token(token_path).await?;

    // The sheets crate wants OAuth client settings, but they are only needed for its own token
    // refresh, which we never use.
    Ok(sheets::Client::new(
        String::new(), // client_id
        String::new(), // client_secret
        String::new(), // redirect_uri
        access_token,
        String::new(), // refresh_token
    ))
}
