//! The `Store` trait: the system of record for the full record set.
//!
//! There is no append or delta primitive. Every save writes the entire set, so a save is
//! `load`, modify in memory, `replace_all`. The two calls are not transactional: if two sessions
//! save at the same time, the later `replace_all` can drop a row the earlier one just wrote.

use crate::error::ErrorType;
use crate::model::Records;
use crate::{Error, Result};
use tracing::warn;

#[async_trait::async_trait]
pub trait Store: Send {
    /// Fetches the current full record set, bypassing any cache. Errors are of type
    /// `ErrorType::Load` when the store cannot be read, or `ErrorType::Data` when it was read but
    /// holds rows that do not parse.
    async fn load(&mut self) -> Result<Records>;

    /// Overwrites the stored contents with `records`. Errors are of type `ErrorType::Store`.
    async fn replace_all(&mut self, records: &Records) -> Result<()>;
}

/// Loads the full record set, degrading to an empty set when the store cannot be read. The
/// failure is returned alongside so that it can be shown as a warning. It keeps the `Data` type
/// when the store was readable, so that a caller can refuse to overwrite rows it could not parse.
pub async fn load_or_empty(store: &mut (dyn Store + Send)) -> (Records, Option<Error>) {
    match store.load().await {
        Ok(records) => (records, None),
        Err(e) => {
            warn!("Continuing with an empty record set: {e}");
            let e = match e.error_type() {
                ErrorType::Data => e,
                _ => e.into_type(ErrorType::Load),
            };
            (Records::default(), Some(e))
        }
    }
}
