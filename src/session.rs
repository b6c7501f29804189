//! The state of one user's session: who is active and the full record set as last loaded.

use crate::model::{Record, Records};
use crate::store::{load_or_empty, Store};
use crate::view::{self, Summary};
use crate::Error;
use std::collections::BTreeSet;
use tracing::debug;

/// One user's view of the store. The records are the full set across all users, as of the last
/// `open` or `refresh`. When loading failed, `records` is empty and `load_failure` holds the
/// reason so it can be shown as a warning.
#[derive(Debug)]
pub struct Session {
    user: String,
    records: Records,
    load_failure: Option<Error>,
}

impl Session {
    /// Loads the full record set for `user`. This never fails; see `load_failure`.
    pub async fn open(store: &mut (dyn Store + Send), user: impl Into<String>) -> Self {
        let user = user.into();
        let (records, load_failure) = load_or_empty(store).await;
        debug!(
            "Opened a session for '{user}' with {} record(s) in the store",
            records.len()
        );
        Self {
            user,
            records,
            load_failure,
        }
    }

    /// Reloads the full record set.
    pub async fn refresh(&mut self, store: &mut (dyn Store + Send)) {
        let (records, load_failure) = load_or_empty(store).await;
        self.records = records;
        self.load_failure = load_failure;
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn load_failure(&self) -> Option<&Error> {
        self.load_failure.as_ref()
    }

    /// The active user's records in storage order.
    pub fn filtered(&self) -> Vec<&Record> {
        view::filtered(self.records.data(), &self.user)
    }

    pub fn known_vehicles(&self) -> BTreeSet<String> {
        view::known_vehicles(self.records.data())
    }

    pub fn summary(&self) -> Summary {
        Summary::new(self.records.data(), &self.user)
    }
}
