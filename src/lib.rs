//! Record vehicle costs in a shared Google sheet and summarize them per user.
//!
//! The worksheet is the system of record. Every save loads the full record set, appends the new
//! record and writes the whole set back (see `store::Store`). The view functions derive the
//! active user's table and aggregates from the loaded set, and the `form::Form` turns raw input
//! into a validated `model::Record`.

pub mod api;
pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod form;
pub mod model;
pub mod session;
pub mod store;
mod utils;
pub mod view;


pub use api::Mode;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use store::Store;

/// The log target prefix of everything this library logs, including command output.
pub const LOG_TARGET: &str = env!("CARGO_CRATE_NAME");
