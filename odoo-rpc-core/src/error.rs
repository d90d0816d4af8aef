//! Remote error envelopes.
//!
//! A decoded response body carries exactly one of `error` or `result`.
//! [`RemoteError`] is the typed form of the `error` half, with the message
//! composition rules the server's JSON-RPC layer uses.

use serde_json::Value;

/// Message used when the error envelope carries no message of its own.
pub const DEFAULT_REMOTE_MESSAGE: &str = "Odoo Exception";

/// An error reported by the server inside a well-formed response body.
///
/// The displayed message is composed from the envelope: `error.message` when
/// present (otherwise [`DEFAULT_REMOTE_MESSAGE`]), with `error.data.message`
/// appended after `": "` when additionally present.
///
/// # Example
///
/// ```
/// use odoo_rpc_core::RemoteError;
/// use serde_json::json;
///
/// let error = RemoteError::from_error_value(&json!({
///     "message": "Access Denied",
///     "data": {"message": "insufficient rights"},
/// }));
/// assert_eq!(error.to_string(), "Access Denied: insufficient rights");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteError {
    message: String,
    nested: Option<String>,
}

impl RemoteError {
    /// Create a remote error with just a message.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            nested: None,
        }
    }

    /// Create a remote error with a message and a nested detail message.
    pub fn with_nested<S: Into<String>, N: Into<String>>(message: S, nested: N) -> Self {
        Self {
            message: message.into(),
            nested: Some(nested.into()),
        }
    }

    /// Build from the decoded `error` value of a response body.
    ///
    /// Non-string or absent message fields fall back to
    /// [`DEFAULT_REMOTE_MESSAGE`]; the nested `data.message` is picked up via
    /// an explicit key lookup, never by position.
    pub fn from_error_value(error: &Value) -> Self {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_REMOTE_MESSAGE)
            .to_string();
        let nested = error
            .pointer("/data/message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { message, nested }
    }

    /// The primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The nested detail message, when the envelope carried one.
    pub fn nested(&self) -> Option<&str> {
        self.nested.as_deref()
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(nested) = &self.nested {
            write!(f, ": {}", nested)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}
