//! Wrapping the error of a `Result` at `?` sites.
//!
//! [`ResultExt`] turns any `Result<T, E: std::error::Error>` into a
//! `Result<T, Error>` with a context message in front of the original error.

use std::error::Error as StdError;
use std::sync::Arc;

use crate::errors::{Cause, Error};

/// Add context to the error of a `Result`.
pub trait ResultExt<T> {
    /// Wrap the error, if any, with `message`.
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped in an [`Error`] when `self` is `Err`.
    fn wrap_err(self, message: impl Into<String>) -> Result<T, Error>;

    /// Like [`ResultExt::wrap_err`], building the message only on error.
    fn wrap_err_with<M, F>(self, message: F) -> Result<T, Error>
    where
        M: Into<String>,
        F: FnOnce() -> M;
}

impl<T, E: StdError + Send + Sync + 'static> ResultExt<T> for Result<T, E> {
    fn wrap_err(self, message: impl Into<String>) -> Result<T, Error> {
        self.map_err(|err| Error::wrap(Arc::new(err) as Cause, message))
    }

    fn wrap_err_with<M, F>(self, message: F) -> Result<T, Error>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        self.map_err(|err| Error::wrap(Arc::new(err) as Cause, message()))
    }
}
