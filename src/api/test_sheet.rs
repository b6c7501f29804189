//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.

use crate::api::{Sheet, SheetRange};
use crate::config::DEFAULT_WORKSHEET;
use crate::error::Res;
use anyhow::{bail, Context};
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tracing::warn;

/// The contents of one in-memory spreadsheet.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub(crate) struct TestSheetState {
    /// Worksheet name -> rows, normalized the way the Sheets API returns them.
    pub(crate) worksheets: BTreeMap<String, Vec<Vec<String>>>,
    /// When set, every write or clear fails, as if the sheet were read-only.
    pub(crate) reject_writes: bool,
}

/// Spreadsheet ID -> contents. Shared across all `TestSheet` instances in the process so that
/// a test can inspect what a store wrote.
fn states() -> MutexGuard<'static, HashMap<String, TestSheetState>> {
    static STATES: OnceLock<Mutex<HashMap<String, TestSheetState>>> = OnceLock::new();
    STATES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An implementation of the `Sheet` trait that does not use Google sheets. The first time a
/// spreadsheet ID is seen, it is seeded with demo data.
pub(crate) struct TestSheet {
    spreadsheet_id: String,
}

impl TestSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>) -> Self {
        let spreadsheet_id = spreadsheet_id.into();
        states()
            .entry(spreadsheet_id.clone())
            .or_insert_with(default_state);
        Self { spreadsheet_id }
    }

    #[cfg(test)]
    pub(crate) fn get_state(&self) -> TestSheetState {
        states()
            .get(&self.spreadsheet_id)
            .cloned()
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn set_state(&self, state: TestSheetState) {
        states().insert(self.spreadsheet_id.clone(), state);
    }

    fn with_writable_worksheet<F>(&self, sheet_name: &str, f: F) -> Res<()>
    where
        F: FnOnce(&mut Vec<Vec<String>>),
    {
        let mut states = states();
        let state = states.entry(self.spreadsheet_id.clone()).or_default();
        if state.reject_writes {
            bail!("The caller does not have permission to write to '{sheet_name}'");
        }
        let rows = state
            .worksheets
            .get_mut(sheet_name)
            .with_context(|| format!("Unable to parse range: worksheet '{sheet_name}' not found"))?;
        f(rows);
        normalize(rows);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, sheet_name: &str) -> Res<Vec<Vec<String>>> {
        states()
            .get(&self.spreadsheet_id)
            .and_then(|state| state.worksheets.get(sheet_name))
            .cloned()
            .with_context(|| format!("Unable to parse range: worksheet '{sheet_name}' not found"))
    }

    async fn clear_ranges(&mut self, ranges: &[&str]) -> Res<()> {
        for range in ranges {
            let (sheet_name, start_row) = parse_a1(range)?;
            self.with_writable_worksheet(&sheet_name, |rows| {
                rows.truncate(start_row - 1);
            })?;
        }
        Ok(())
    }

    async fn write_ranges(&mut self, data: &[SheetRange]) -> Res<()> {
        for sheet_range in data {
            let (sheet_name, start_row) = parse_a1(&sheet_range.range)?;
            self.with_writable_worksheet(&sheet_name, |rows| {
                for (offset, values) in sheet_range.values.iter().enumerate() {
                    let ix = start_row - 1 + offset;
                    if rows.len() <= ix {
                        rows.resize(ix + 1, Vec::new());
                    }
                    // Writes always start at column A and span the full width of the data
                    rows[ix] = values.clone();
                }
            })?;
        }
        Ok(())
    }
}

/// Splits an A1-notation range such as `Daten!A5:ZZ` into the worksheet name and the 1-based
/// first row. Only ranges starting in column A are supported. A range without a row number, such
/// as `Daten!A:ZZ`, starts at row 1.
fn parse_a1(range: &str) -> Res<(String, usize)> {
    let (sheet_name, cells) = range
        .rsplit_once('!')
        .with_context(|| format!("Range '{range}' has no worksheet name"))?;
    let start = cells.split(':').next().unwrap_or(cells);
    let row = start
        .strip_prefix('A')
        .with_context(|| format!("Range '{range}' does not start in column A"))?;
    let start_row = if row.is_empty() {
        1
    } else {
        row.parse::<usize>()
            .with_context(|| format!("Invalid row in range '{range}'"))?
    };
    if start_row == 0 {
        bail!("Invalid row in range '{range}'");
    }
    Ok((sheet_name.to_string(), start_row))
}

/// Drops trailing empty cells from each row and trailing empty rows, like the Sheets API does.
fn normalize(rows: &mut Vec<Vec<String>>) {
    for row in rows.iter_mut() {
        while row.last().is_some_and(|cell| cell.is_empty()) {
            row.pop();
        }
    }
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
}

/// Provides the seed data from this module.
fn default_state() -> TestSheetState {
    let rows = load_csv(RECORD_DATA).unwrap_or_else(|e| {
        warn!("Unable to load the seed data, starting empty: {e:#}");
        Vec::new()
    });
    let mut worksheets = BTreeMap::new();
    worksheets.insert(DEFAULT_WORKSHEET.to_string(), rows);
    TestSheetState {
        worksheets,
        reject_writes: false,
    }
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Res<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false) // Ensure headers are treated as part of the data
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.context("Invalid CSV seed data")?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    normalize(&mut rows);
    Ok(rows)
}

/// Seed record data.
const RECORD_DATA: &str = r##"Nutzer,Datum,Fahrzeug,Kategorie,Betrag_CHF,Notiz
Gast,2025-09-02,Audi A3,Tanken,84.35,Migrol Zürich
Gast,2025-09-10,Audi A3,Parkgebühren,12.00,Parkhaus Hauptbahnhof
Gast,2025-09-18,Audi A3,Service/Reparatur,465.80,Grosser Service
Ana,2025-09-20,Golf,Tanken,50.00,
Ana,2025-09-21,Golf,Parkgebühren,20.00,
Bo,2025-09-22,Yaris,Tanken,100.00,
Gast,2025-10-01,Vespa,Versicherung,310.00,Jahresprämie
Gast,2025-10-05,Audi A3,Busse,40.00,Geschwindigkeit
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn unique_sheet() -> TestSheet {
        TestSheet::new(Uuid::new_v4().to_string())
    }

    fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_a1() {
        assert_eq!(parse_a1("Daten!A1").unwrap(), ("Daten".to_string(), 1));
        assert_eq!(parse_a1("Daten!A:ZZ").unwrap(), ("Daten".to_string(), 1));
        assert_eq!(parse_a1("Daten!A12:ZZ").unwrap(), ("Daten".to_string(), 12));
        assert!(parse_a1("A1").is_err());
        assert!(parse_a1("Daten!B1").is_err());
        assert!(parse_a1("Daten!A0").is_err());
    }

    #[test]
    fn test_normalize() {
        let mut rows = strings(&[&["a", "", ""], &["b"], &["", ""], &[]]);
        normalize(&mut rows);
        assert_eq!(rows, strings(&[&["a"], &["b"]]));
    }

    #[tokio::test]
    async fn test_seed_data() {
        let mut sheet = unique_sheet();
        let rows = sheet.get(DEFAULT_WORKSHEET).await.unwrap();
        assert_eq!(rows[0][0], "Nutzer");
        assert_eq!(rows.len(), 9);
        // The empty note was trimmed away
        assert_eq!(rows[4].len(), 5);
    }

    #[tokio::test]
    async fn test_missing_worksheet() {
        let mut sheet = unique_sheet();
        assert!(sheet.get("Nope").await.is_err());
        let write = SheetRange {
            range: "Nope!A1".to_string(),
            values: strings(&[&["x"]]),
        };
        assert!(sheet.write_ranges(&[write]).await.is_err());
    }

    #[tokio::test]
    async fn test_write_then_clear() {
        let mut sheet = unique_sheet();
        let write = SheetRange {
            range: format!("{DEFAULT_WORKSHEET}!A1"),
            values: strings(&[&["h1", "h2"], &["a", ""]]),
        };
        sheet.write_ranges(&[write]).await.unwrap();
        sheet
            .clear_ranges(&[format!("{DEFAULT_WORKSHEET}!A3:ZZ").as_str()])
            .await
            .unwrap();
        let rows = sheet.get(DEFAULT_WORKSHEET).await.unwrap();
        assert_eq!(rows, strings(&[&["h1", "h2"], &["a"]]));
    }

    #[tokio::test]
    async fn test_reject_writes() {
        let mut sheet = unique_sheet();
        let mut state = sheet.get_state();
        state.reject_writes = true;
        sheet.set_state(state);
        let err = sheet
            .clear_ranges(&[format!("{DEFAULT_WORKSHEET}!A:ZZ").as_str()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("permission"));
        // Reads still work
        assert!(sheet.get(DEFAULT_WORKSHEET).await.is_ok());
    }
}
