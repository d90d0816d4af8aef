//! Search queries and the `where`/`domain` filter alias.

use serde_json::{Map, Value};

/// Options for a `search_read` call.
///
/// `where_clause` is a friendlier alias for Odoo's native `domain` term; the
/// alias is resolved once, before the call arguments are built, and `domain`
/// wins when both are supplied. Each transport renders the query differently:
/// the RPC variant sends a fixed positional argument list (missing options
/// become JSON nulls so later slots keep their position), the REST variant
/// sends a flat params object (missing options are omitted, and `order`
/// travels under the wire key `sort`).
///
/// # Example
///
/// ```
/// use odoo_rpc_core::SearchQuery;
/// use serde_json::json;
///
/// let query = SearchQuery::new()
///     .where_clause(json!([["is_company", "=", true]]))
///     .fields(["id", "name"])
///     .limit(10);
/// assert_eq!(
///     query.effective_domain(),
///     Some(&json!([["is_company", "=", true]])),
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchQuery {
    domain: Option<Value>,
    where_: Option<Value>,
    fields: Option<Vec<String>>,
    offset: Option<u64>,
    limit: Option<u64>,
    order: Option<String>,
    context: Option<Map<String, Value>>,
}

impl SearchQuery {
    /// Create an empty query (no filter, all records, all fields).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the native `domain` filter, an array of `(field, operator, value)`
    /// triples.
    pub fn domain(mut self, domain: Value) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Set the filter through the `where` alias. Ignored when a `domain` is
    /// also set.
    pub fn where_clause(mut self, filter: Value) -> Self {
        self.where_ = Some(filter);
        self
    }

    /// Restrict the returned fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Skip the first `offset` matching records.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Return at most `limit` records.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sort expression, e.g. `"name ASC"`.
    pub fn order<S: Into<String>>(mut self, order: S) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Server-side context for the call (REST variant only; the RPC
    /// positional form has no context slot).
    pub fn context(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }

    /// The filter actually sent: `domain` when set, otherwise the `where`
    /// alias value.
    pub fn effective_domain(&self) -> Option<&Value> {
        self.domain.as_ref().or(self.where_.as_ref())
    }

    /// Positional argument list for the RPC variant:
    /// `[domain, fields, offset, limit, order]`.
    pub fn to_rpc_args(&self) -> Vec<Value> {
        vec![
            self.effective_domain().cloned().unwrap_or(Value::Null),
            self.fields.clone().map(Value::from).unwrap_or(Value::Null),
            self.offset.map(Value::from).unwrap_or(Value::Null),
            self.limit.map(Value::from).unwrap_or(Value::Null),
            self.order.clone().map(Value::from).unwrap_or(Value::Null),
        ]
    }

    /// Flat params object for the REST variant's search_read endpoint.
    pub fn to_rest_params(&self, model: &str) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("model".into(), Value::String(model.into()));
        if let Some(domain) = self.effective_domain() {
            params.insert("domain".into(), domain.clone());
        }
        if let Some(fields) = &self.fields {
            params.insert("fields".into(), Value::from(fields.clone()));
        }
        if let Some(offset) = self.offset {
            params.insert("offset".into(), Value::from(offset));
        }
        if let Some(limit) = self.limit {
            params.insert("limit".into(), Value::from(limit));
        }
        if let Some(order) = &self.order {
            params.insert("sort".into(), Value::String(order.clone()));
        }
        if let Some(context) = &self.context {
            params.insert("context".into(), Value::Object(context.clone()));
        }
        params
    }
}
