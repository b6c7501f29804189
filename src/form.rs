//! The Form Controller: turns raw entry input into a `Record` and persists it.

use crate::error::{Error, ErrorType};
use crate::model::{Amount, Category, Record};
use crate::session::Session;
use crate::store::{load_or_empty, Store};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The observable states of the form. There is no error state; a failed submission goes back to
/// `Idle` with the input left for another try.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
}

serde_plain::derive_display_from_serialize!(FormState);

/// Where the vehicle name came from.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleChoice {
    /// Free text.
    Typed(String),
    /// One of the known vehicles.
    Known(String),
}

impl VehicleChoice {
    /// The vehicle name as it will be stored.
    pub fn resolve(&self) -> &str {
        match self {
            VehicleChoice::Typed(s) | VehicleChoice::Known(s) => s.trim(),
        }
    }
}

/// The raw form fields. The user is not part of the input; it is taken from the session.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    /// Defaults to today when not given.
    pub date: Option<NaiveDate>,
    pub vehicle: VehicleChoice,
    pub category: Category,
    pub amount: Amount,
    pub note: String,
}

impl FormInput {
    pub fn new(vehicle: VehicleChoice, category: Category, amount: Amount) -> Self {
        Self {
            date: None,
            vehicle,
            category,
            amount,
            note: String::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

#[derive(Debug, Default)]
pub struct Form {
    state: FormState,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Validates `input` and builds the record for `user`. The only rule is that the resolved
    /// vehicle must not be empty.
    pub fn build(input: &FormInput, user: &str, today: NaiveDate) -> Result<Record> {
        let vehicle = input.vehicle.resolve();
        if vehicle.is_empty() {
            return Err(Error::msg(ErrorType::Validation, "empty vehicle"));
        }
        Ok(Record::new(
            user,
            input.date.unwrap_or(today),
            vehicle,
            input.category,
            input.amount,
            input.note.trim(),
        ))
    }

    /// Validates `input`, then loads the full record set, appends the new record and writes the
    /// whole set back. If the store cannot be read, the save goes ahead with only the new record.
    /// If it was read but holds rows that do not parse, nothing is written and a `Store` error is
    /// returned, since the overwrite would drop those rows. On success the session is refreshed
    /// from the store.
    ///
    /// The load and the write are not atomic. A record saved by another session in between is
    /// lost.
    pub async fn submit(
        &mut self,
        session: &mut Session,
        store: &mut (dyn Store + Send),
        input: &FormInput,
    ) -> Result<Record> {
        self.state = FormState::Submitting;
        let result = Self::save(session, store, input).await;
        self.state = FormState::Idle;
        result
    }

    async fn save(
        session: &mut Session,
        store: &mut (dyn Store + Send),
        input: &FormInput,
    ) -> Result<Record> {
        let today = chrono::Local::now().date_naive();
        let record = Self::build(input, session.user(), today)?;

        let (mut records, load_failure) = load_or_empty(store).await;
        if let Some(e) = load_failure {
            if e.error_type() == ErrorType::Data {
                return Err(Error::msg(
                    ErrorType::Store,
                    format!(
                        "Not saving, the existing records would be overwritten. Fix the \
                        worksheet first. {e}"
                    ),
                ));
            }
            info!("The existing records could not be loaded, saving the new record on its own");
        }
        records.push(record.clone());
        debug!("Saving {} record(s)", records.len());
        store.replace_all(&records).await?;

        session.refresh(store).await;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestSheetState;
    use crate::config::DEFAULT_WORKSHEET;
    use crate::model::Records;
    use crate::test::TestEnv;
    use std::str::FromStr;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 12).unwrap()
    }

    fn input(vehicle: VehicleChoice) -> FormInput {
        FormInput::new(vehicle, Category::Fuel, Amount::from_str("42.5").unwrap()).with_date(day())
    }

    /// A store whose calls can be made to fail, recording the last saved set.
    #[derive(Default)]
    struct FakeStore {
        records: Records,
        fail_load: bool,
        fail_store: bool,
        saved: Option<Records>,
    }

    #[async_trait::async_trait]
    impl Store for FakeStore {
        async fn load(&mut self) -> Result<Records> {
            if self.fail_load {
                return Err(Error::msg(ErrorType::Load, "store unreachable"));
            }
            Ok(self.records.clone())
        }

        async fn replace_all(&mut self, records: &Records) -> Result<()> {
            if self.fail_store {
                return Err(Error::msg(ErrorType::Store, "write rejected"));
            }
            self.records = records.clone();
            self.saved = Some(records.clone());
            Ok(())
        }
    }

    #[test]
    fn test_build_rejects_whitespace_vehicle() {
        let err = Form::build(&input(VehicleChoice::Typed("  ".into())), "Ana", day()).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.to_string().ends_with("empty vehicle"));

        // A pick from the known list is checked the same way
        let err = Form::build(&input(VehicleChoice::Known("".into())), "Ana", day()).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[test]
    fn test_build() {
        let input = input(VehicleChoice::Typed(" Audi A3 ".into())).with_note(" Shell ");
        let record = Form::build(&input, "Ana", day()).unwrap();
        assert_eq!(record.user(), "Ana");
        assert_eq!(record.vehicle(), "Audi A3");
        assert_eq!(record.note(), "Shell");
        assert_eq!(record.amount().to_string(), "42.50");
    }

    #[test]
    fn test_build_defaults_to_today() {
        let mut input = input(VehicleChoice::Known("Golf".into()));
        input.date = None;
        let today = NaiveDate::from_ymd_opt(2030, 1, 2).unwrap();
        let record = Form::build(&input, "", today).unwrap();
        assert_eq!(record.date(), today);
        assert_eq!(record.user(), "");
    }

    #[tokio::test]
    async fn test_submit_appends() {
        let env = TestEnv::new().await;
        let mut store = env.store().await;
        let mut session = Session::open(store.as_mut(), "Ana").await;
        let mut form = Form::new();

        let record = form
            .submit(
                &mut session,
                store.as_mut(),
                &input(VehicleChoice::Typed("Audi A3".into())),
            )
            .await
            .unwrap();
        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(record.vehicle(), "Audi A3");

        // The session was refreshed and the store now holds the seed rows plus the new one
        assert_eq!(session.records().len(), 9);
        assert_eq!(session.filtered().len(), 3);
        let rows = &env.get_state().worksheets[DEFAULT_WORKSHEET];
        assert_eq!(
            rows.last().unwrap(),
            &vec!["Ana", "2025-10-12", "Audi A3", "Tanken", "42.50"]
        );
    }

    #[tokio::test]
    async fn test_submit_invalid_does_not_touch_store() {
        let mut store = FakeStore::default();
        let mut session = Session::open(&mut store, "Ana").await;
        let mut form = Form::new();
        let err = form
            .submit(&mut session, &mut store, &input(VehicleChoice::Typed(" ".into())))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(form.state(), FormState::Idle);
        assert!(store.saved.is_none());
    }

    #[tokio::test]
    async fn test_submit_after_load_failure() {
        let mut store = FakeStore {
            fail_load: true,
            ..Default::default()
        };
        let mut session = Session::open(&mut store, "Ana").await;
        assert!(session.load_failure().is_some());

        let mut form = Form::new();
        form.submit(
            &mut session,
            &mut store,
            &input(VehicleChoice::Typed("Golf".into())),
        )
        .await
        .unwrap();
        let saved = store.saved.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.data()[0].vehicle(), "Golf");
    }

    #[tokio::test]
    async fn test_submit_store_failure() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.reject_writes = true;
        env.set_state(state.clone());

        let mut store = env.store().await;
        let mut session = Session::open(store.as_mut(), "Ana").await;
        let mut form = Form::new();
        let input = input(VehicleChoice::Typed("Golf".into()));
        let err = form
            .submit(&mut session, store.as_mut(), &input)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Store);
        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(env.get_state(), state);

        // The form can be resubmitted once the store accepts writes again
        state.reject_writes = false;
        env.set_state(state);
        form.submit(&mut session, store.as_mut(), &input)
            .await
            .unwrap();
        assert_eq!(session.filtered().len(), 3);
    }

    #[tokio::test]
    async fn test_submit_refuses_to_overwrite_unparseable_rows() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.worksheets.get_mut(DEFAULT_WORKSHEET).unwrap()[3][4] = "12,50 Fr.".to_string();
        env.set_state(state.clone());

        let mut store = env.store().await;
        let mut session = Session::open(store.as_mut(), "Ana").await;
        assert_eq!(
            session.load_failure().unwrap().error_type(),
            ErrorType::Data
        );

        let mut form = Form::new();
        let err = form
            .submit(
                &mut session,
                store.as_mut(),
                &input(VehicleChoice::Typed("Golf".into())),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Store);
        assert!(err.to_string().contains("12,50 Fr."));
        assert_eq!(form.state(), FormState::Idle);

        // Every row is still there
        assert_eq!(env.get_state(), state);
        assert_eq!(state.worksheets[DEFAULT_WORKSHEET].len(), 9);
    }

    #[tokio::test]
    async fn test_submit_into_missing_worksheet() {
        let env = TestEnv::new().await;
        env.set_state(TestSheetState::default());
        let mut store = env.store().await;
        let mut session = Session::open(store.as_mut(), "Ana").await;
        let err = Form::new()
            .submit(
                &mut session,
                store.as_mut(),
                &input(VehicleChoice::Typed("Golf".into())),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Store);
    }
}
