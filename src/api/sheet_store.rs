//! Implements the `Store` trait on top of a worksheet.

use crate::api::{Sheet, SheetRange};
use crate::backup::{Backup, PRE_SAVE};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::Records;
use crate::store::Store;
use crate::Result;
use anyhow::Context;
use tracing::{debug, warn};

/// The Store Gateway: reads and overwrites the full record set held in one worksheet.
pub struct SheetStore {
    sheet: Box<dyn Sheet + Send>,
    worksheet: String,
    backup: Option<Backup>,
}

impl SheetStore {
    /// Create a new `SheetStore` over `worksheet`. When `backup` is given, the worksheet contents
    /// are saved to a local file before each overwrite.
    pub(crate) fn new(
        sheet: Box<dyn Sheet + Send>,
        worksheet: impl Into<String>,
        backup: Option<Backup>,
    ) -> Self {
        Self {
            sheet,
            worksheet: worksheet.into(),
            backup,
        }
    }

    async fn read(&mut self) -> Res<Vec<Vec<String>>> {
        self.sheet.get(&self.worksheet).await.with_context(|| {
            format!(
                "Could not load data, check that the worksheet is named '{}'",
                self.worksheet
            )
        })
    }

    /// Saves the current worksheet contents to the backups directory. This never fails the save.
    async fn snapshot(&mut self) {
        let Some(backup) = &self.backup else {
            return;
        };
        let rows = match self.sheet.get(&self.worksheet).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Unable to snapshot '{}' before saving: {e:#}", self.worksheet);
                return;
            }
        };
        match backup.save_json(PRE_SAVE, &rows).await {
            Ok(path) => debug!("Saved pre-save snapshot to {}", path.display()),
            Err(e) => warn!("Unable to write the pre-save snapshot: {e:#}"),
        }
    }

    async fn replace_all_inner(&mut self, records: &Records) -> Res<()> {
        let rows = records.to_rows();
        let row_count = rows.len();

        // Write first and only then clear what is left below, so that a failure part-way never
        // leaves an empty worksheet behind.
        let write = SheetRange {
            range: format!("{}!A1", self.worksheet),
            values: rows,
        };
        self.sheet
            .write_ranges(&[write])
            .await
            .with_context(|| format!("Unable to write to the worksheet '{}'", self.worksheet))?;

        let below = format!("{}!A{}:ZZ", self.worksheet, row_count + 1);
        self.sheet
            .clear_ranges(&[below.as_str()])
            .await
            .with_context(|| format!("Unable to clear the stale rows of '{}'", self.worksheet))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for SheetStore {
    async fn load(&mut self) -> Result<Records> {
        let rows = self.read().await.pub_result(ErrorType::Load)?;
        let records = Records::parse(rows)
            .with_context(|| format!("The worksheet '{}' has an unexpected layout", self.worksheet))
            .pub_result(ErrorType::Data)?;
        debug!("Loaded {} record(s) from '{}'", records.len(), self.worksheet);
        Ok(records)
    }

    async fn replace_all(&mut self, records: &Records) -> Result<()> {
        // Nothing guards against another session saving between our load and this write.
        debug!(
            "Replacing '{}' with {} record(s); rows saved elsewhere since the last load will be lost",
            self.worksheet,
            records.len()
        );
        self.snapshot().await;
        self.replace_all_inner(records)
            .await
            .pub_result(ErrorType::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestSheet, TestSheetState};
    use crate::config::DEFAULT_WORKSHEET;
    use crate::model::{Amount, Category, Record};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn store(env: &TestEnv) -> SheetStore {
        SheetStore::new(
            Box::new(TestSheet::new(env.config().spreadsheet_id())),
            DEFAULT_WORKSHEET,
            Some(env.config().backup()),
        )
    }

    fn record(user: &str, vehicle: &str, amount: &str) -> Record {
        Record::new(
            user,
            NaiveDate::from_ymd_opt(2025, 10, 12).unwrap(),
            vehicle,
            Category::Fuel,
            Amount::from_str(amount).unwrap(),
            "",
        )
    }

    #[tokio::test]
    async fn test_load_seed_data() {
        let env = TestEnv::new().await;
        let records = store(&env).load().await.unwrap();
        assert_eq!(records.len(), 8);
        assert_eq!(records.data()[0].vehicle(), "Audi A3");
    }

    #[tokio::test]
    async fn test_replace_all_of_load_is_a_no_op() {
        let env = TestEnv::new().await;
        let before = env.get_state();
        let mut store = store(&env);
        let records = store.load().await.unwrap();
        store.replace_all(&records).await.unwrap();
        assert_eq!(before, env.get_state());
    }

    #[tokio::test]
    async fn test_replace_all_appends() {
        let env = TestEnv::new().await;
        let mut store = store(&env);
        let mut records = store.load().await.unwrap();
        records.push(record("Cy", "Polo", "33.3"));
        store.replace_all(&records).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.len(), 9);
        assert_eq!(reloaded, records);
        let rows = &env.get_state().worksheets[DEFAULT_WORKSHEET];
        assert_eq!(rows[9], vec!["Cy", "2025-10-12", "Polo", "Tanken", "33.30"]);
    }

    #[tokio::test]
    async fn test_replace_all_shrinks() {
        let env = TestEnv::new().await;
        let mut store = store(&env);
        let records = Records::from_data(vec![record("Cy", "Polo", "1")]);
        store.replace_all(&records).await.unwrap();
        let rows = &env.get_state().worksheets[DEFAULT_WORKSHEET];
        assert_eq!(rows.len(), 2);
        assert_eq!(store.load().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_replace_all_writes_snapshot() {
        let env = TestEnv::new().await;
        let mut store = store(&env);
        let records = store.load().await.unwrap();
        store.replace_all(&records).await.unwrap();

        let mut dir = crate::utils::read_dir(env.config().backups()).await.unwrap();
        let entry = dir.next_entry().await.unwrap().unwrap();
        let name = entry.file_name().to_string_lossy().to_string();
        assert!(name.starts_with("pre-save."));
        let snapshot: Vec<Vec<String>> = crate::utils::deserialize(&entry.path()).await.unwrap();
        assert_eq!(snapshot, env.get_state().worksheets[DEFAULT_WORKSHEET]);
    }

    #[tokio::test]
    async fn test_load_missing_worksheet() {
        let env = TestEnv::new().await;
        env.set_state(TestSheetState::default());
        let err = store(&env).load().await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Load);
        assert!(err.to_string().contains("'Daten'"));
    }

    #[tokio::test]
    async fn test_load_schema_mismatch() {
        let env = TestEnv::new().await;
        let mut state = TestSheetState::default();
        state.worksheets.insert(
            DEFAULT_WORKSHEET.to_string(),
            vec![vec!["User".to_string(), "Date".to_string()]],
        );
        env.set_state(state);
        let err = store(&env).load().await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Data);
        assert!(err.to_string().contains("unexpected layout"));
    }

    #[tokio::test]
    async fn test_load_bad_cell() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.worksheets.get_mut(DEFAULT_WORKSHEET).unwrap()[3][4] = "12,50 Fr.".to_string();
        env.set_state(state);
        let err = store(&env).load().await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Data);
        assert!(err.to_string().contains("row 4"));
    }

    #[tokio::test]
    async fn test_replace_all_rejected() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.reject_writes = true;
        env.set_state(state.clone());

        let mut store = store(&env);
        let err = store
            .replace_all(&Records::from_data(vec![record("Cy", "Polo", "1")]))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Store);
        assert_eq!(env.get_state(), state);
    }

    #[tokio::test]
    async fn test_replace_all_into_empty_worksheet() {
        let env = TestEnv::new().await;
        let mut state = TestSheetState::default();
        state
            .worksheets
            .insert(DEFAULT_WORKSHEET.to_string(), Vec::new());
        env.set_state(state);

        let mut store = store(&env);
        let mut records = store.load().await.unwrap();
        assert!(records.is_empty());
        records.push(record("Ana", "Golf", "50"));
        store.replace_all(&records).await.unwrap();

        let rows = &env.get_state().worksheets[DEFAULT_WORKSHEET];
        assert_eq!(
            rows[0],
            vec!["Nutzer", "Datum", "Fahrzeug", "Kategorie", "Betrag_CHF", "Notiz"]
        );
        assert_eq!(rows.len(), 2);
    }
}
