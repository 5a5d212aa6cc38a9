//! Error handling for the SMS bridge
//!
//! Every failure that can happen between receiving a host call and writing a
//! row into the SMS content store is represented by [`BridgeError`]. Errors
//! convert automatically from the underlying library errors via `thiserror`.
//!
//! ## Propagation
//!
//! Inside the insertion pipeline errors are ordinary `Result` values and flow
//! with `?`. At the host boundary they are funneled into boolean outcomes:
//!
//! ```rust
//! use sms_bridge_protocol::{BridgeError, Result};
//!
//! fn outcome(result: Result<String>) -> bool {
//!     match result {
//!         Ok(_) => true,
//!         Err(BridgeError::MalformedPayload(_)) => false,
//!         Err(_) => false,
//!     }
//! }
//!
//! assert!(!outcome(Err(BridgeError::MalformedPayload("missing date".into()))));
//! ```
//!
//! ## Error Categories
//!
//! ### Payload Errors
//! Raised by the decoder: `MalformedPayload` and `Unsupported`.
//!
//! ### Store Errors
//! `StoreRefused` when the content store returns no row, `Database` for SQL
//! failures inside a store implementation.
//!
//! ### Channel Errors
//! `UnknownMethod`, `InvalidArguments`, and `Json` / `Io` for framing.

use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while bridging host calls to the content store
///
/// # Examples
///
/// ```rust
/// use sms_bridge_protocol::BridgeError;
///
/// let error = BridgeError::MalformedPayload("date is null".to_string());
/// assert_eq!(error.to_string(), "Malformed payload: date is null");
///
/// let error = BridgeError::UnknownMethod("deleteMessage".to_string());
/// assert_eq!(error.to_string(), "Unknown method: deleteMessage");
/// ```
#[derive(Error, Debug)]
pub enum BridgeError {
    /// I/O error on the host channel
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A host message field is missing, null, or cannot be coerced
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The host API level is below the SMS provider schema floor
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The content store returned no row for an insert
    #[error("Store refused insert: {0}")]
    StoreRefused(String),

    /// Method name not recognized by the dispatcher
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Method arguments have the wrong overall shape
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// SQL failure inside a store implementation
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<rusqlite::Error> for BridgeError {
    fn from(error: rusqlite::Error) -> Self {
        BridgeError::Database(error.to_string())
    }
}

impl BridgeError {
    /// Create a malformed payload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        BridgeError::MalformedPayload(msg.into())
    }

    /// Check if this error originated from the host payload itself
    ///
    /// Payload errors will fail identically on every attempt; store errors
    /// depend on the provider's state.
    ///
    /// ```rust
    /// use sms_bridge_protocol::BridgeError;
    ///
    /// assert!(BridgeError::malformed("read").is_payload_error());
    /// assert!(!BridgeError::StoreRefused("content://sms/inbox".into()).is_payload_error());
    /// ```
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            BridgeError::MalformedPayload(_)
                | BridgeError::Unsupported(_)
                | BridgeError::InvalidArguments(_)
        )
    }

    /// Get a user-friendly error message suitable for host-side display
    pub fn user_message(&self) -> String {
        match self {
            BridgeError::MalformedPayload(msg) => {
                format!("Message could not be read: {}.", msg)
            }
            BridgeError::Unsupported(msg) => {
                format!("Not supported on this device: {}.", msg)
            }
            BridgeError::StoreRefused(uri) => {
                format!(
                    "The SMS store refused the message ({}). Check that this app is the default SMS app.",
                    uri
                )
            }
            BridgeError::UnknownMethod(name) => format!("Unknown method '{}'.", name),
            BridgeError::InvalidArguments(msg) => format!("Invalid arguments: {}.", msg),
            BridgeError::Database(msg) => format!("Database error: {}.", msg),
            BridgeError::Configuration(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            BridgeError::Io(e) => format!("I/O error: {}.", e),
            BridgeError::Json(e) => format!("Data format error: {}.", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BridgeError::MalformedPayload("kind missing".to_string());
        assert_eq!(error.to_string(), "Malformed payload: kind missing");

        let error = BridgeError::Unsupported("API level 18".to_string());
        assert_eq!(error.to_string(), "Unsupported: API level 18");

        let error = BridgeError::StoreRefused("content://sms/sent".to_string());
        assert_eq!(
            error.to_string(),
            "Store refused insert: content://sms/sent"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json = r#"{"invalid json"#;
        let json_error = serde_json::from_str::<serde_json::Value>(json).unwrap_err();
        let bridge_error: BridgeError = json_error.into();

        assert!(matches!(bridge_error, BridgeError::Json(_)));
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let bridge_error: BridgeError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(bridge_error, BridgeError::Database(_)));
    }

    #[test]
    fn test_payload_error_classification() {
        assert!(BridgeError::malformed("x").is_payload_error());
        assert!(BridgeError::Unsupported("x".into()).is_payload_error());
        assert!(!BridgeError::Database("x".into()).is_payload_error());
        assert!(!BridgeError::UnknownMethod("x".into()).is_payload_error());
    }

    #[test]
    fn test_user_messages_for_insert_failures() {
        let message = BridgeError::malformed("timestamp is null").user_message();
        assert_eq!(message, "Message could not be read: timestamp is null.");

        let message = BridgeError::Unsupported("API level 18".into()).user_message();
        assert!(message.starts_with("Not supported on this device"));
    }

    #[test]
    fn test_user_messages() {
        let message = BridgeError::StoreRefused("content://sms/inbox".into()).user_message();
        assert!(message.contains("default SMS app"));

        let message = BridgeError::Configuration("bad path".into()).user_message();
        assert!(message.contains("settings"));
    }
}
