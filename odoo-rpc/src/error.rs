//! Client-side error taxonomy.
//!
//! Every failed operation raises exactly one [`Error`], and every raised
//! error is also reported through the session's log sink before it
//! propagates. The variants are disjoint stages of a call's lifecycle: the
//! send itself, the HTTP status verdict, the decoded body, the error
//! envelope inside it, and the post-call shaping.

use http::StatusCode;
use odoo_rpc_core::{RawResponse, RemoteError};
use serde_json::Value;

/// Errors raised by client operations.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// The request never completed (connectivity, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status other than 200.
    ///
    /// Carries the full raw response for diagnostics; the body of a
    /// non-200 response is never interpreted as data or as an error
    /// envelope.
    #[error("protocol error: HTTP status {status}")]
    Protocol {
        status: StatusCode,
        response: RawResponse,
    },

    /// The response body carried an error envelope.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Single-required shaping found no record.
    ///
    /// Carries the model named at the call site and the caller's original
    /// filter arguments.
    #[error("Single {model} record not found.")]
    NotFound { model: String, filter: Value },

    /// An operation that needs the authenticated uid ran before a
    /// successful `authenticate`.
    #[error("session has no authenticated uid")]
    Session,

    /// A 200 response whose body is not valid JSON.
    #[error("decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Create a not-found error for `model` with the caller's filter.
    pub(crate) fn not_found<S: Into<String>>(model: S, filter: Value) -> Self {
        Error::NotFound {
            model: model.into(),
            filter,
        }
    }

    /// The retained raw response, for protocol errors.
    pub fn raw_response(&self) -> Option<&RawResponse> {
        match self {
            Error::Protocol { response, .. } => Some(response),
            _ => None,
        }
    }

    /// The typed remote error, for error envelopes.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Error::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    /// Whether this is the single-required not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
