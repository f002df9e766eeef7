//! Error types for the cfddns system
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for cfddns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the cfddns system
#[derive(Error, Debug)]
pub enum Error {
    /// No zone at the provider matches the configured domain
    #[error("Cannot find zone information for the domain {domain}")]
    ZoneNotFound {
        /// The domain (as configured) that failed to resolve
        domain: String,
    },

    /// No cached record matches the (type, name) pair
    #[error("Cannot find {record_type} record {name}")]
    RecordNotFound {
        /// Record type that was looked up
        record_type: String,
        /// Record name that was looked up
        name: String,
    },

    /// The provider answered with a non-success status
    #[error("Provider request failed{}: {message}", status_suffix(.status))]
    ProviderRequestFailed {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Message extracted from the provider's error payload
        message: String,
    },

    /// Every configured public-IP endpoint failed or returned garbage
    #[error("None of the {attempted} public IP endpoint(s) returned a usable address")]
    IpDiscoveryExhausted {
        /// Number of endpoints that were tried
        attempted: usize,
    },

    /// Transport-level failure talking to the provider
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl Error {
    /// Create a zone-not-found error
    pub fn zone_not_found(domain: impl Into<String>) -> Self {
        Self::ZoneNotFound {
            domain: domain.into(),
        }
    }

    /// Create a record-not-found error
    pub fn record_not_found(record_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::RecordNotFound {
            record_type: record_type.into(),
            name: name.into(),
        }
    }

    /// Create a provider request failure
    pub fn provider_request(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ProviderRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True for the "nothing cached under that (type, name)" signal
    pub fn is_record_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }
}
