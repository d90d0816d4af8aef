//! Structured call logging.
//!
//! Every session owns one [`LogSink`]. The two success-path events
//! ([`REQUEST_EVENT`] and [`RESPONSE_EVENT`]) are emitted only when debug
//! logging is enabled on the session; error events are emitted
//! unconditionally, named by the error's message. Request payloads are
//! redacted before they reach the sink, so a sink never sees credentials.

use serde_json::Value;

/// Event name for an outgoing request (debug only).
pub const REQUEST_EVENT: &str = "REQUEST";

/// Event name for a received response (debug only).
pub const RESPONSE_EVENT: &str = "RESPONSE";

/// Destination for call events.
///
/// Implementations must not assume any particular payload shape beyond
/// "JSON value": request events carry the redacted envelope, response
/// events carry status/headers/body, and error events carry whatever
/// diagnostic the failing stage had at hand.
pub trait LogSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: &str, payload: &Value);
}

/// The default sink: forwards events to [`tracing`].
///
/// Request/response events map to `debug!`, everything else to `error!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, event: &str, payload: &Value) {
        match event {
            REQUEST_EVENT | RESPONSE_EVENT => {
                tracing::debug!(target: "odoo_rpc", %payload, "{event}");
            }
            _ => {
                tracing::error!(target: "odoo_rpc", %payload, "{event}");
            }
        }
    }
}
