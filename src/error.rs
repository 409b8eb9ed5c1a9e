//! Error types shared by the whole crate.
//!
//! Internally everything is an `anyhow::Error`. Errors that reach a caller are tagged with an
//! `ErrorType` so the CLI and the MCP server can tell a rejected input apart from a missing record
//! or a storage failure.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of failure an error represents.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// An input violated an invariant of an entity or of a report request.
    Validation,
    /// The requested record, or a record it references, does not exist.
    NotFound,
    /// The record cannot be removed while other records still reference it.
    ReferentialIntegrity,
    /// The database failed to carry out an operation.
    Database,
    /// The data directory or configuration file is missing or invalid.
    Config,
    /// The MCP service failed to start or stopped unexpectedly.
    Service,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// An error that has been tagged with an `ErrorType`.
pub struct TypedError {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl TypedError {
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for TypedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}", self.error_type, self.inner)
    }
}

impl Display for TypedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // The alternate form includes the whole context chain on one line.
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for TypedError {}

/// Creates an `Error` of the given type from a message.
pub(crate) fn typed_error<M>(error_type: ErrorType, message: M) -> Error
where
    M: Display + Debug + Send + Sync + 'static,
{
    Error::new(TypedError {
        error_type,
        inner: anyhow::Error::msg(message),
    })
}

/// Returns the `ErrorType` of `error`, if it has been tagged with one.
pub fn error_type(error: &Error) -> Option<ErrorType> {
    error
        .chain()
        .find_map(|e| e.downcast_ref::<TypedError>())
        .map(TypedError::error_type)
}

/// Returns early with an error of the given `ErrorType`, like `anyhow::bail!`.
macro_rules! bail_typed {
    ($error_type:expr, $($arg:tt)+) => {
        return Err($crate::error::typed_error($error_type, format!($($arg)+)))
    };
}

pub(crate) use bail_typed;

/// Tags errors that are about to leave the crate with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    /// Tags the error with `error_type` unless it already carries a type, in which case it is
    /// passed through unchanged.
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            if crate::error::error_type(&inner).is_some() {
                inner
            } else {
                Error::new(TypedError { error_type, inner })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    fn reject(amount: i32) -> Result<i32> {
        if amount <= 0 {
            bail_typed!(ErrorType::Validation, "Amount must be positive, got {amount}");
        }
        Ok(amount)
    }

    #[test]
    fn test_bail_typed() {
        let err = reject(-5).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
        assert_eq!(err.to_string(), "Amount must be positive, got -5");
        assert_eq!(reject(5).unwrap(), 5);
    }

    #[test]
    fn test_pub_result_tags_untyped_errors() {
        let result: std::result::Result<(), Error> = Err(anyhow!("disk is full"));
        let err = result
            .context("Failed to insert expense")
            .pub_result(ErrorType::Database)
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Database));
        assert_eq!(err.to_string(), "Failed to insert expense: disk is full");
    }

    #[test]
    fn test_pub_result_keeps_existing_type() {
        let err = reject(0).pub_result(ErrorType::Database).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }

    #[test]
    fn test_type_survives_added_context() {
        let err = reject(0).context("Unable to create expense").unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }

    #[test]
    fn test_untyped_error() {
        let err = anyhow!("plain");
        assert_eq!(error_type(&err), None);
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::NotFound.to_string(), "not_found");
        assert_eq!(
            ErrorType::ReferentialIntegrity.to_string(),
            "referential_integrity"
        );
    }
}
