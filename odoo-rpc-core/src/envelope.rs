//! JSON-RPC 2.0 call envelopes.
//!
//! Both Odoo transports speak the same outer envelope and differ only in what
//! goes inside `params` and where the call target lives:
//! - [`Params::Rpc`]: `{service, method, args}`, POSTed to the fixed `/jsonrpc` endpoint
//! - [`Params::Rest`]: the flat argument object itself, POSTed to a method-specific path

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Placeholder substituted for the session username in logged payloads.
pub const USERNAME_PLACEHOLDER: &str = "...USERNAME...";

/// Placeholder substituted for the session credential in logged payloads.
pub const PASSWORD_PLACEHOLDER: &str = "...PW...";

/// The `params` half of a call envelope.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Params {
    /// JSON-RPC variant: two-level service/method addressing with positional args.
    Rpc {
        service: String,
        method: String,
        args: Vec<Value>,
    },
    /// REST variant: a flat argument object; the target is the URL path.
    Rest(Map<String, Value>),
}

impl Params {
    fn to_value(&self) -> Value {
        match self {
            Params::Rpc {
                service,
                method,
                args,
            } => json!({
                "service": service,
                "method": method,
                "args": args,
            }),
            Params::Rest(map) => Value::Object(map.clone()),
        }
    }
}

/// A single outgoing call, immutable once built.
///
/// Serializes to the JSON-RPC 2.0 wire shape:
///
/// ```json
/// {"jsonrpc": "2.0", "method": "call", "params": {...}, "id": 123456789}
/// ```
///
/// The `id` is a random integer in `0..=1_000_000_000` used only for
/// wire-protocol correlation, never for application semantics.
///
/// # Example
///
/// ```
/// use odoo_rpc_core::{Envelope, Params};
/// use serde_json::json;
///
/// let envelope = Envelope::rpc("common", "version", vec![]);
/// let wire = envelope.to_value();
/// assert_eq!(wire["jsonrpc"], "2.0");
/// assert_eq!(wire["method"], "call");
/// assert_eq!(wire["params"]["service"], "common");
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct Envelope {
    jsonrpc: &'static str,
    method: &'static str,
    params: Params,
    id: u32,
}

impl Envelope {
    /// Build an envelope with a fresh random correlation id.
    pub fn new(params: Params) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params,
            id: rand::random_range(0..=1_000_000_000),
        }
    }

    /// Build an RPC-variant envelope targeting `service`/`method`.
    pub fn rpc<S: Into<String>, M: Into<String>>(service: S, method: M, args: Vec<Value>) -> Self {
        Self::new(Params::Rpc {
            service: service.into(),
            method: method.into(),
            args,
        })
    }

    /// Build a REST-variant envelope carrying a flat argument object.
    pub fn rest(params: Map<String, Value>) -> Self {
        Self::new(Params::Rest(params))
    }

    /// The wire correlation id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The call parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The full wire JSON value.
    pub fn to_value(&self) -> Value {
        json!({
            "jsonrpc": self.jsonrpc,
            "method": self.method,
            "params": self.params.to_value(),
            "id": self.id,
        })
    }

    /// Copy of the wire value safe for logging.
    ///
    /// Redaction is value-based, not positional: any string anywhere inside
    /// `params` that equals the session username or credential is replaced by
    /// [`USERNAME_PLACEHOLDER`] or [`PASSWORD_PLACEHOLDER`]. When username and
    /// credential are the same string the credential placeholder wins.
    pub fn redacted_value(&self, username: Option<&str>, credential: Option<&str>) -> Value {
        let mut wire = self.to_value();
        if let Some(params) = wire.get_mut("params") {
            redact_in_place(params, username, credential);
        }
        wire
    }
}

fn redact_in_place(value: &mut Value, username: Option<&str>, credential: Option<&str>) {
    match value {
        Value::String(s) => {
            let replacement = if credential.is_some_and(|c| c == s) {
                Some(PASSWORD_PLACEHOLDER)
            } else if username.is_some_and(|u| u == s) {
                Some(USERNAME_PLACEHOLDER)
            } else {
                None
            };
            if let Some(replacement) = replacement {
                *s = replacement.to_string();
            }
        }
        Value::Array(items) => {
            for item in items {
                redact_in_place(item, username, credential);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                redact_in_place(item, username, credential);
            }
        }
        _ => {}
    }
}
