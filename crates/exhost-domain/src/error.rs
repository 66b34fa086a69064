//! Error handling types
//!
//! Only [`Error::Resolution`] is meant to cross the provider boundary as an
//! `Err`. Every other variant is produced internally, logged, and converted
//! into a safe default by the infrastructure layer.

use thiserror::Error;

use crate::contract::ContractId;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error source
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the extension composition host
#[derive(Error, Debug)]
pub enum Error {
    /// The composition source could not be obtained at construction
    #[error("Initialization failure: {message}")]
    Initialization {
        /// Description of the initialization failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// No resolution source yielded an instance for the contract
    #[error("No service registered for contract '{contract}'")]
    Resolution {
        /// Contract that could not be resolved
        contract: ContractId,
    },

    /// An operation that requires an active flow was called without one
    #[error("Lifecycle misuse: {operation} requires an active flow")]
    LifecycleMisuse {
        /// Operation that was misused
        operation: String,
    },

    /// A flow failed while being created, shown, started or stopped
    #[error("Flow execution failure: {message}")]
    FlowExecution {
        /// Description of the flow failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// A tracked disposable failed to release
    #[error("Disposal error: {message}")]
    Disposal {
        /// Description of the disposal error
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Basic error creation methods
impl Error {
    /// Create an initialization error
    pub fn initialization<S: Into<String>>(message: S) -> Self {
        Self::Initialization {
            message: message.into(),
            source: None,
        }
    }

    /// Create an initialization error with source
    pub fn initialization_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Initialization {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a resolution error for a contract
    pub fn resolution(contract: ContractId) -> Self {
        Self::Resolution { contract }
    }

    /// Create a lifecycle misuse error
    pub fn lifecycle_misuse<S: Into<String>>(operation: S) -> Self {
        Self::LifecycleMisuse {
            operation: operation.into(),
        }
    }

    /// Create a flow execution error
    pub fn flow_execution<S: Into<String>>(message: S) -> Self {
        Self::FlowExecution {
            message: message.into(),
            source: None,
        }
    }

    /// Create a flow execution error with source
    pub fn flow_execution_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::FlowExecution {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Ambient error creation methods
impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a disposal error
    pub fn disposal<S: Into<String>>(message: S) -> Self {
        Self::Disposal {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is allowed to cross the provider boundary
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}
