//! The shared call pipeline.
//!
//! Both protocol clients delegate to [`Caller`], which owns the session,
//! the transport, and the log sink, and runs every call through the same
//! stages: log the redacted request, send, retain the raw response, judge
//! the status, decode, split `error` from `result`, and absorb the uid
//! when the call was an `authenticate`. [`shape_result`] then applies the
//! post-call shaping (expansion, single collapse, indexing) that both
//! clients share.

use crate::api::ModelApi;
use crate::error::Error;
use crate::log::{LogSink, REQUEST_EVENT, RESPONSE_EVENT};
use crate::session::Session;
use crate::transport::Transport;
use odoo_rpc_core::{
    CallOptions, Collapsed, Envelope, Params, RawResponse, RemoteError, attach_expanded,
    collapse_single, expandable_ids, index_by,
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Fixed endpoint for all JSON-RPC calls.
pub(crate) const JSONRPC_ENDPOINT: &str = "/jsonrpc";

/// Session-establishing endpoint of the REST variant.
pub(crate) const SESSION_AUTHENTICATE_ENDPOINT: &str = "/web/session/authenticate";

/// Session, transport, sink, and the retained last response.
///
/// One in. One out. `dispatch` takes `&mut self`, so a caller never has two
/// calls in flight; concurrent actors hold one client each.
pub(crate) struct Caller<T> {
    session: Session,
    transport: T,
    sink: Arc<dyn LogSink>,
    debug: bool,
    last_response: Option<RawResponse>,
}

impl<T: Transport> Caller<T> {
    pub(crate) fn new(session: Session, transport: T, sink: Arc<dyn LogSink>, debug: bool) -> Self {
        Self {
            session,
            transport,
            sink,
            debug,
            last_response: None,
        }
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn last_response(&self) -> Option<&RawResponse> {
        self.last_response.as_ref()
    }

    /// Handle on the sink for shaping steps that outlive a `&self` borrow.
    pub(crate) fn sink_handle(&self) -> Arc<dyn LogSink> {
        Arc::clone(&self.sink)
    }

    /// The authenticated uid, or the session error (logged with `context`).
    pub(crate) fn require_uid(&self, context: Value) -> Result<i64, Error> {
        match self.session.uid() {
            Some(uid) => Ok(uid),
            None => {
                let error = Error::Session;
                self.sink.record(&error.to_string(), &context);
                Err(error)
            }
        }
    }

    fn record_failure(&self, error: &Error, payload: &Value) {
        self.sink.record(&error.to_string(), payload);
    }

    fn record_debug(&self, event: &str, payload: &Value) {
        if self.debug {
            self.sink.record(event, payload);
        }
    }

    /// Run one call through the full pipeline.
    ///
    /// Every failure is recorded through the sink exactly once, with the
    /// most useful payload the failing stage has: the redacted request for
    /// transport failures, the response payload for everything after.
    pub(crate) async fn dispatch(
        &mut self,
        endpoint: &str,
        envelope: Envelope,
    ) -> Result<Value, Error> {
        let url = format!("{}{}", self.session.server_url(), endpoint);
        let body = envelope.to_value();

        // 1. Log the outgoing request with credentials masked.
        let (username, password) = self.session.redaction_pair();
        let request_payload = json!({
            "url": format!("POST {url}"),
            "body": envelope.redacted_value(username, password),
        });
        self.record_debug(REQUEST_EVENT, &request_payload);

        // 2. Send. A transport failure is logged with the same masked payload.
        let response = match self.transport.send(&url, &body).await {
            Ok(response) => response,
            Err(error) => {
                self.record_failure(&error, &request_payload);
                return Err(error);
            }
        };

        // 3. Retain the raw response before any verdict on it.
        self.last_response = Some(response.clone());
        let response_payload = response.log_payload();
        self.record_debug(RESPONSE_EVENT, &response_payload);

        // 4. Exactly 200 counts as delivered; anything else is a protocol
        //    failure whose body is never interpreted.
        if !response.is_ok() {
            let error = Error::Protocol {
                status: response.status(),
                response,
            };
            self.record_failure(&error, &response_payload);
            return Err(error);
        }

        // 5. Decode the body.
        let decoded = match response.decode() {
            Ok(decoded) => decoded,
            Err(decode_error) => {
                let error = Error::Decode(decode_error.to_string());
                self.record_failure(&error, &response_payload);
                return Err(error);
            }
        };

        // 6. An error envelope wins over any result member.
        if let Some(error_value) = decoded.get("error") {
            let error = Error::Remote(RemoteError::from_error_value(error_value));
            self.record_failure(&error, &response_payload);
            return Err(error);
        }
        let result = decoded.get("result").cloned().unwrap_or(Value::Null);

        // 7. A successful authenticate is the only writer of the uid.
        if is_identity_call(endpoint, &envelope) {
            self.session.absorb_uid(&result);
        }

        Ok(result)
    }
}

fn is_identity_call(endpoint: &str, envelope: &Envelope) -> bool {
    if endpoint == SESSION_AUTHENTICATE_ENDPOINT {
        return true;
    }
    matches!(
        envelope.params(),
        Params::Rpc { service, method, .. } if service == "common" && method == "authenticate"
    )
}

/// A single id becomes a one-element id list; lists pass through.
pub(crate) fn coerce_id_list(ids: Value) -> Value {
    if ids.is_array() { ids } else { json!([ids]) }
}

/// Apply the shared post-call shaping to a successful result.
///
/// Stages run in fixed order. Expansion first, so a collapsed single
/// record keeps its `_expanded` entries; then single collapse, which
/// short-circuits the rest; then indexing. The secondary reads issued by
/// expansion go through `client` itself and use default options, so they
/// are plain id reads that cannot recurse.
pub(crate) async fn shape_result<C: ModelApi>(
    client: &mut C,
    sink: &Arc<dyn LogSink>,
    model: &str,
    filter: &Value,
    result: Value,
    options: &CallOptions,
) -> Result<Value, Error> {
    let mut result = result;

    // Expansion only applies to a sequence of records.
    if !options.expand.is_empty() {
        if let Value::Array(rows) = &mut result {
            for row in rows.iter_mut() {
                for (field, spec) in &options.expand {
                    let Some(ids) = expandable_ids(row, field) else {
                        continue;
                    };
                    let records = client
                        .read(&spec.model, Value::Array(ids), Vec::new(), CallOptions::new())
                        .await?;
                    attach_expanded(row, field, records);
                }
            }
        }
    }

    let mut result = match collapse_single(result, options.single) {
        Collapsed::Full(result) => result,
        Collapsed::Single(single) => return Ok(single),
        Collapsed::Missing => {
            let error = Error::not_found(model, filter.clone());
            sink.record(&error.to_string(), filter);
            return Err(error);
        }
    };

    if let Some(field) = &options.index_by {
        result = index_by(result, field);
    }
    Ok(result)
}
