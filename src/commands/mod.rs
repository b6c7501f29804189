//! Command handlers for the vcost CLI.
//!
//! This module contains implementations for all CLI subcommands. Each one is a thin presentation
//! layer over `Session`, `Form` and the view functions.

mod add;
mod init;
mod list;
mod summary;
mod vehicles;

use crate::api::{self, Mode};
use crate::session::Session;
use crate::store::Store;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use init::init;
pub use list::list;
pub use summary::summary;
pub use vehicles::vehicles;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Creates the store and opens a session for `user`. A failed load has already been logged as a
/// warning by the time this returns.
async fn open(
    config: &Config,
    mode: Mode,
    user: &str,
) -> Result<(Box<dyn Store + Send>, Session)> {
    let mut store = api::store(config, mode).await?;
    let session = Session::open(store.as_mut(), user).await;
    Ok((store, session))
}

/// The message for a user without records. An empty store, including one that could not be
/// loaded, is told apart from a store that only holds other users' records.
fn no_records_message(session: &Session) -> String {
    if session.records().is_empty() {
        "There are no records yet".to_string()
    } else {
        format!("There are no records for '{}'", session.user())
    }
}

/// A note to append to a command's message when the records could not be loaded.
fn load_failure_note(session: &Session) -> &'static str {
    if session.load_failure().is_some() {
        "\n\nThe records could not be loaded, so this is based on no data."
    } else {
        ""
    }
}
