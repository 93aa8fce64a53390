//! Error types for ClouDNS record reconciliation
//!
//! [`Error`] is what every reconciler operation returns. Failures coming back
//! from the provider API are described by [`ApiError`] and attached as the
//! source of the operation-level variant, so a caller sees both what was being
//! attempted and why it failed.

use std::time::Duration;

use thiserror::Error;

use crate::record::RecordType;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reconciliation
#[derive(Error, Debug)]
pub enum Error {
    /// Credential shape or reconciler settings are invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A field the record type requires was not provided
    #[error("{record_type} record is missing required field `{field}`")]
    MissingRequiredField {
        /// Type of the offending record
        record_type: RecordType,
        /// Name of the missing field
        field: &'static str,
    },

    /// Import identifier is not of the form `<zone>/<record-id>`
    #[error("Malformed import identifier '{0}': expected <zone>/<record-id>")]
    MalformedIdentifier(String),

    /// Record type mnemonic this client does not handle
    #[error("Unsupported record type: {0}")]
    UnsupportedRecordType(String),

    /// The create call itself failed
    #[error("Failed to create record in zone {zone}")]
    CreateFailed {
        /// Zone the record was meant for
        zone: String,
        /// Underlying provider failure
        #[source]
        source: ApiError,
    },

    /// Listing the zone failed
    #[error("Failed to read zone {zone}")]
    ReadFailed {
        /// Zone that was being listed
        zone: String,
        /// Underlying provider failure
        #[source]
        source: ApiError,
    },

    /// The update call failed
    #[error("Failed to update record {id} in zone {zone}")]
    UpdateFailed {
        /// Zone of the record
        zone: String,
        /// Record id
        id: String,
        /// Underlying provider failure
        #[source]
        source: ApiError,
    },

    /// The destroy call failed
    #[error("Failed to delete record {id} in zone {zone}")]
    DeleteFailed {
        /// Zone of the record
        zone: String,
        /// Record id
        id: String,
        /// Underlying provider failure
        #[source]
        source: ApiError,
    },

    /// A created record never showed up in the zone listing
    #[error("Record {id} in zone {zone} was not visible after {timeout:?}")]
    ConfirmationTimeout {
        /// Zone of the record
        zone: String,
        /// Id assigned by the provider on create
        id: String,
        /// How long the listing was polled
        timeout: Duration,
    },

    /// Destroy succeeded but the record is still listed
    #[error("Record {id} in zone {zone} is still listed after a successful delete")]
    DeleteNotObserved {
        /// Zone of the record
        zone: String,
        /// Record id
        id: String,
    },

    /// Import target does not exist in the zone
    #[error("Cannot import record {id}: not found in zone {zone}")]
    ImportRecordNotFound {
        /// Zone that was listed
        zone: String,
        /// Record id that was asked for
        id: String,
    },

    /// The caller's cancellation signal fired before the operation finished
    ///
    /// For a create this says nothing about whether the record exists remotely:
    /// `record_id` is set when the provider had already assigned one.
    #[error("{operation} cancelled{}", record_id.as_ref().map(|id| format!(" (record id {id})")).unwrap_or_default())]
    Cancelled {
        /// Operation that was interrupted
        operation: &'static str,
        /// Id of the record, when one is known
        record_id: Option<String>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing-field error
    pub fn missing_field(record_type: RecordType, field: &'static str) -> Self {
        Self::MissingRequiredField { record_type, field }
    }

    /// Create a cancellation error
    pub fn cancelled(operation: &'static str, record_id: Option<String>) -> Self {
        Self::Cancelled {
            operation,
            record_id,
        }
    }

    /// Whether this error was raised before any remote call was made
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::MissingRequiredField { .. }
                | Self::MalformedIdentifier(_)
                | Self::UnsupportedRecordType(_)
        )
    }
}

/// Failure reported by a [`ZoneApi`](crate::traits::ZoneApi) implementation
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level or unexpected HTTP status failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Provider refused the call because of its own rate limit
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider answered but reported a failure
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response decoded but did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}
