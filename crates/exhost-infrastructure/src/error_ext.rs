//! Error context extension
//!
//! Converts foreign errors (I/O, TOML) and host callback failures into the
//! domain [`Error`], prefixing the message with what was being attempted.

use std::fmt;

use exhost_domain::error::{Error, Result};

/// Attach context to a foreign `Result`
///
/// # Example
///
/// ```ignore
/// use exhost_infrastructure::ErrorContext;
///
/// let text = std::fs::read_to_string(&path)
///     .config_context(format!("Failed to read {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Map the error to [`Error::Configuration`], keeping it as the source
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Map the error to [`Error::FlowExecution`], keeping it as the source
    fn flow_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::config_with_source(prefixed(&context, &err), err))
    }

    fn flow_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::flow_execution_with_source(prefixed(&context, &err), err))
    }
}

fn prefixed(context: &dyn fmt::Display, err: &dyn fmt::Display) -> String {
    format!("{context}: {err}")
}
