//! Error types for the library.
//!
//! Internally everything is an `anyhow::Error` (see `Res`). At the public boundary the error is
//! tagged with an `ErrorType` so that callers can tell a degraded load apart from a rejected form
//! or a failed save.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies what went wrong.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or the config file is missing or invalid.
    Config,
    /// The store could not be read: unreachable, or the worksheet is missing.
    Load,
    /// The worksheet was read but its contents could not be understood: a bad header row or a
    /// cell that does not parse.
    Data,
    /// The submitted form was rejected.
    Validation,
    /// The store rejected a write.
    Store,
    /// The command-line request could not be interpreted.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// A public error: an `ErrorType` along with the underlying cause.
pub struct Error {
    error_type: ErrorType,
    source: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, source: anyhow::Error) -> Self {
        Self { error_type, source }
    }

    /// Creates an error of the given type from a plain message.
    pub(crate) fn msg(error_type: ErrorType, message: impl Display) -> Self {
        Self::new(error_type, anyhow::anyhow!("{message}"))
    }

    /// Re-tags the error with a different `ErrorType`.
    pub(crate) fn into_type(self, error_type: ErrorType) -> Self {
        Self {
            error_type,
            source: self.source,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn source_error(&self) -> &anyhow::Error {
        &self.source
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.source)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The alternate form includes the whole context chain.
        write!(f, "{} error: {:#}", self.error_type, self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Converts an internal `Res` into a public `Result` by tagging the error with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Res<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
