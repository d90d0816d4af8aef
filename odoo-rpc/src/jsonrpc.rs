//! The JSON-RPC protocol client.

use crate::api::ModelApi;
use crate::builder::ClientBuilder;
use crate::client::{Caller, JSONRPC_ENDPOINT, coerce_id_list, shape_result};
use crate::error::Error;
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};
use async_trait::async_trait;
use odoo_rpc_core::{CallOptions, Envelope, RawResponse, SearchQuery, VersionFormat};
use serde_json::{Map, Value, json};
use std::fmt;

/// Client for the server's JSON-RPC interface.
///
/// Every call POSTs a JSON-RPC 2.0 envelope to the fixed `/jsonrpc`
/// endpoint. Data-model operations go through the generic
/// `object`/`execute` service with the identity prologue
/// `[database, uid, credential, model, method, ...]` ahead of their own
/// arguments, which is why they require a successful [`authenticate`]
/// first.
///
/// Operations take `&mut self`: a session has at most one call in flight,
/// and concurrent actors hold one client each.
///
/// [`authenticate`]: JsonRpcClient::authenticate
///
/// # Example
///
/// ```ignore
/// use odoo_rpc::{CallOptions, JsonRpcClient, SearchQuery};
/// use serde_json::json;
///
/// let mut client = JsonRpcClient::builder("https://odoo.example.com")
///     .database("mydb")
///     .username("admin")
///     .password("secret")
///     .build_jsonrpc()?;
///
/// client.authenticate().await?;
/// let companies = client
///     .search_read(
///         "res.partner",
///         SearchQuery::new()
///             .where_clause(json!([["is_company", "=", true]]))
///             .fields(["name", "email"]),
///         CallOptions::new(),
///     )
///     .await?;
/// ```
pub struct JsonRpcClient<T = HttpTransport> {
    caller: Caller<T>,
}

impl JsonRpcClient<HttpTransport> {
    /// Start building a client for `server_url`.
    pub fn builder<S: Into<String>>(server_url: S) -> ClientBuilder {
        ClientBuilder::new(server_url)
    }
}

impl<T: Transport> JsonRpcClient<T> {
    pub(crate) fn new(caller: Caller<T>) -> Self {
        Self { caller }
    }

    /// The session state, including the authenticated uid if any.
    pub fn session(&self) -> &Session {
        self.caller.session()
    }

    /// The raw response of the most recent call, kept even when the call
    /// failed.
    pub fn last_response(&self) -> Option<&RawResponse> {
        self.caller.last_response()
    }

    /// Establish the session identity.
    ///
    /// On success the server returns the numeric uid, which is stored on
    /// the session and carried in the identity prologue of every later
    /// data-model call. Bad credentials come back as `false`, which leaves
    /// the session unauthenticated.
    pub async fn authenticate(&mut self) -> Result<Value, Error> {
        let session = self.caller.session();
        let args = vec![
            json!(session.database()),
            json!(session.username()),
            json!(session.password()),
            json!({"empty": "false"}), // wire literal, not a boolean
        ];
        self.caller
            .dispatch(
                JSONRPC_ENDPOINT,
                Envelope::rpc("common", "authenticate", args),
            )
            .await
    }

    /// Server version info in the requested shape.
    ///
    /// Works without authentication.
    pub async fn version(&mut self, format: VersionFormat) -> Result<Value, Error> {
        let info = self
            .caller
            .dispatch(JSONRPC_ENDPOINT, Envelope::rpc("common", "version", vec![]))
            .await?;
        Ok(format.extract(info))
    }

    /// Call `method` on `model` with positional `args`, then shape the
    /// result per `options`.
    ///
    /// This is the generic operation every named one funnels through. The
    /// caller's own `args` double as the filter reported when
    /// single-required shaping finds nothing.
    pub async fn execute(
        &mut self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        options: CallOptions,
    ) -> Result<Value, Error> {
        let uid = self
            .caller
            .require_uid(json!({"model": model, "method": method}))?;

        let filter = Value::Array(args.clone());
        let session = self.caller.session();
        let mut prologue = vec![
            json!(session.database()),
            json!(uid),
            json!(session.password()),
            json!(model),
            json!(method),
        ];
        prologue.extend(args);

        let result = self
            .caller
            .dispatch(JSONRPC_ENDPOINT, Envelope::rpc("object", "execute", prologue))
            .await?;

        let sink = self.caller.sink_handle();
        shape_result(self, &sink, model, &filter, result, &options).await
    }

    /// Search for records and read the selected fields in one call.
    ///
    /// `where_clause` and `domain` are aliases; `domain` wins when both
    /// are set.
    pub async fn search_read(
        &mut self,
        model: &str,
        query: SearchQuery,
        options: CallOptions,
    ) -> Result<Value, Error> {
        self.execute(model, "search_read", query.to_rpc_args(), options)
            .await
    }

    /// Read records by id.
    ///
    /// A bare id is wrapped into a one-element list; an empty `fields`
    /// list reads every field.
    pub async fn read(
        &mut self,
        model: &str,
        ids: Value,
        fields: Vec<String>,
        options: CallOptions,
    ) -> Result<Value, Error> {
        let args = vec![coerce_id_list(ids), json!(fields)];
        self.execute(model, "read", args, options).await
    }

    /// Create one record from a field map, returning the new id.
    pub async fn create(
        &mut self,
        model: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, Error> {
        self.execute(model, "create", vec![Value::Object(fields)], CallOptions::new())
            .await
    }

    /// Update one record's fields.
    pub async fn update(
        &mut self,
        model: &str,
        id: i64,
        fields: Map<String, Value>,
    ) -> Result<Value, Error> {
        let args = vec![json!([id]), Value::Object(fields)];
        self.execute(model, "write", args, CallOptions::new()).await
    }

    /// Delete records by id.
    pub async fn delete(&mut self, model: &str, ids: Value) -> Result<Value, Error> {
        self.execute(model, "unlink", vec![coerce_id_list(ids)], CallOptions::new())
            .await
    }

    /// Post draft documents, e.g. moving draft invoices to posted.
    pub async fn action_post(&mut self, model: &str, ids: Value) -> Result<Value, Error> {
        self.execute(model, "action_post", vec![coerce_id_list(ids)], CallOptions::new())
            .await
    }

    /// Field definitions of `model`.
    pub async fn fields_get(&mut self, model: &str) -> Result<Value, Error> {
        self.execute(model, "fields_get", vec![], CallOptions::new())
            .await
    }

    /// Switch the active company of a user.
    ///
    /// Authenticates first, then updates `company_id` on the `res.users`
    /// record of `user_id` (the session's own uid when `None`).
    pub async fn change_active_company(
        &mut self,
        company_id: i64,
        user_id: Option<i64>,
    ) -> Result<Value, Error> {
        self.authenticate().await?;
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => self
                .caller
                .require_uid(json!({"operation": "change_active_company"}))?,
        };
        let mut fields = Map::new();
        fields.insert("company_id".to_string(), json!(company_id));
        self.update("res.users", user_id, fields).await
    }
}

impl<T: Transport> fmt::Debug for JsonRpcClient<T> {
    // Debug goes through the session, which masks the credential.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("session", self.session())
            .finish()
    }
}

#[async_trait]
impl<T: Transport> ModelApi for JsonRpcClient<T> {
    async fn search_read(
        &mut self,
        model: &str,
        query: SearchQuery,
        options: CallOptions,
    ) -> Result<Value, Error> {
        JsonRpcClient::search_read(self, model, query, options).await
    }

    async fn read(
        &mut self,
        model: &str,
        ids: Value,
        fields: Vec<String>,
        options: CallOptions,
    ) -> Result<Value, Error> {
        JsonRpcClient::read(self, model, ids, fields, options).await
    }

    async fn create(&mut self, model: &str, fields: Map<String, Value>) -> Result<Value, Error> {
        JsonRpcClient::create(self, model, fields).await
    }
}
