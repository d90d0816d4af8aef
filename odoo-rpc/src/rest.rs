//! The REST (web endpoint) protocol client.

use crate::api::ModelApi;
use crate::builder::ClientBuilder;
use crate::client::{Caller, SESSION_AUTHENTICATE_ENDPOINT, coerce_id_list, shape_result};
use crate::error::Error;
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};
use async_trait::async_trait;
use odoo_rpc_core::{CallOptions, Envelope, RawResponse, SearchQuery, VersionFormat};
use serde_json::{Map, Value, json};
use std::fmt;

const SEARCH_READ_ENDPOINT: &str = "/web/dataset/search_read";
const VERSION_ENDPOINT: &str = "/web/webclient/version_info";

fn call_kw_endpoint(model: &str, method: &str) -> String {
    format!("/web/dataset/call_kw/{model}/{method}")
}

/// Client for the server's web endpoints.
///
/// The outer envelope is the same JSON-RPC 2.0 shape as
/// [`JsonRpcClient`](crate::JsonRpcClient) sends, but the call target
/// lives in the URL path and `params` is the flat argument object of that
/// endpoint. Data-model operations go to
/// `/web/dataset/call_kw/<model>/<method>`; there is no identity prologue,
/// so they do not require a prior [`authenticate`].
///
/// Operations take `&mut self`: a session has at most one call in flight,
/// and concurrent actors hold one client each.
///
/// [`authenticate`]: RestClient::authenticate
///
/// # Example
///
/// ```ignore
/// use odoo_rpc::{CallOptions, RestClient, SearchQuery};
/// use serde_json::json;
///
/// let mut client = RestClient::builder("https://odoo.example.com")
///     .database("mydb")
///     .username("admin")
///     .password("secret")
///     .build_rest()?;
///
/// let invoices = client
///     .search_read(
///         "account.move",
///         SearchQuery::new()
///             .where_clause(json!([["move_type", "=", "out_invoice"]]))
///             .fields(["name", "amount_total"])
///             .limit(20),
///         CallOptions::new(),
///     )
///     .await?;
/// ```
pub struct RestClient<T = HttpTransport> {
    caller: Caller<T>,
}

impl RestClient<HttpTransport> {
    /// Start building a client for `server_url`.
    pub fn builder<S: Into<String>>(server_url: S) -> ClientBuilder {
        ClientBuilder::new(server_url)
    }
}

impl<T: Transport> RestClient<T> {
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

    /// Establish the session identity via `/web/session/authenticate`.
    ///
    /// On success the result object carries the numeric `uid`, which is
    /// stored on the session for [`change_active_company`]. Bad
    /// credentials leave the session unauthenticated.
    ///
    /// [`change_active_company`]: RestClient::change_active_company
    pub async fn authenticate(&mut self) -> Result<Value, Error> {
        let session = self.caller.session();
        let mut params = Map::new();
        params.insert("db".to_string(), json!(session.database()));
        params.insert("login".to_string(), json!(session.username()));
        params.insert("password".to_string(), json!(session.password()));
        self.caller
            .dispatch(SESSION_AUTHENTICATE_ENDPOINT, Envelope::rest(params))
            .await
    }

    /// Server version info in the requested shape.
    pub async fn version(&mut self, format: VersionFormat) -> Result<Value, Error> {
        let info = self
            .caller
            .dispatch(VERSION_ENDPOINT, Envelope::rest(Map::new()))
            .await?;
        Ok(format.extract(info))
    }

    /// Call `method` on `model` through `/web/dataset/call_kw`, then shape
    /// the result per `options`.
    ///
    /// The full flat parameter object doubles as the filter reported when
    /// single-required shaping finds nothing.
    pub async fn execute(
        &mut self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        options: CallOptions,
    ) -> Result<Value, Error> {
        let mut params = Map::new();
        params.insert("method".to_string(), json!(method));
        params.insert("model".to_string(), json!(model));
        params.insert("args".to_string(), Value::Array(args));
        params.insert(
            "kwargs".to_string(),
            Value::Object(options.kw_args.clone().unwrap_or_default()),
        );
        let filter = Value::Object(params.clone());

        let result = self
            .caller
            .dispatch(&call_kw_endpoint(model, method), Envelope::rest(params))
            .await?;

        let sink = self.caller.sink_handle();
        shape_result(self, &sink, model, &filter, result, &options).await
    }

    /// Search for records and read the selected fields in one call.
    ///
    /// The query flattens into the endpoint's parameter object: `domain`
    /// (with `where_clause` as an alias), `fields`, `offset`, `limit`,
    /// `sort`, and `context`; unset parts are omitted entirely.
    ///
    /// The endpoint wraps its rows in a `{"length", "records"}` object.
    /// Shaping options are defined over the rows, so when any option is
    /// set the wrapper is dropped and the `records` array is shaped; a
    /// plain call returns the wrapper as the server sent it.
    pub async fn search_read(
        &mut self,
        model: &str,
        query: SearchQuery,
        options: CallOptions,
    ) -> Result<Value, Error> {
        let params = query.to_rest_params(model);
        let filter = Value::Object(params.clone());

        let mut result = self
            .caller
            .dispatch(SEARCH_READ_ENDPOINT, Envelope::rest(params))
            .await?;

        if options.shapes() {
            if let Some(records) = result.get_mut("records") {
                result = records.take();
            }
        }

        let sink = self.caller.sink_handle();
        shape_result(self, &sink, model, &filter, result, &options).await
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

impl<T: Transport> fmt::Debug for RestClient<T> {
    // Debug goes through the session, which masks the credential.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("session", self.session())
            .finish()
    }
}

#[async_trait]
impl<T: Transport> ModelApi for RestClient<T> {
    async fn search_read(
        &mut self,
        model: &str,
        query: SearchQuery,
        options: CallOptions,
    ) -> Result<Value, Error> {
        RestClient::search_read(self, model, query, options).await
    }

    async fn read(
        &mut self,
        model: &str,
        ids: Value,
        fields: Vec<String>,
        options: CallOptions,
    ) -> Result<Value, Error> {
        RestClient::read(self, model, ids, fields, options).await
    }

    async fn create(&mut self, model: &str, fields: Map<String, Value>) -> Result<Value, Error> {
        RestClient::create(self, model, fields).await
    }
}
