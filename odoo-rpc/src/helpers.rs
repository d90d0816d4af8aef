//! Thin wrappers for commonly scripted lookups.
//!
//! These take `&mut impl ModelApi`, so they work over either protocol
//! client and compose with anything else built on the capability surface.

use crate::api::ModelApi;
use crate::error::Error;
use odoo_rpc_core::{CallOptions, SearchQuery, SingleMode};
use serde_json::{Value, json};

/// The server's model catalog (`ir.model`).
///
/// Returns `id`, `model`, and `name` per record, or every field when
/// `all_fields` is set.
pub async fn models<C: ModelApi>(client: &mut C, all_fields: bool) -> Result<Value, Error> {
    let query = if all_fields {
        SearchQuery::new()
    } else {
        SearchQuery::new().fields(["id", "model", "name"])
    };
    client.search_read("ir.model", query, CallOptions::new()).await
}

/// The one `account.account` record with `code` in a company.
///
/// Fails with the not-found error when no such account exists.
pub async fn account_by_code<C: ModelApi>(
    client: &mut C,
    code: &str,
    company_id: i64,
) -> Result<Value, Error> {
    let query = SearchQuery::new().where_clause(json!([
        ["code", "=", code],
        ["company_id", "=", company_id],
    ]));
    client
        .search_read(
            "account.account",
            query,
            CallOptions::new().single(SingleMode::Required),
        )
        .await
}

/// Journal items (`account.move.line`) matching `query`.
pub async fn move_lines<C: ModelApi>(client: &mut C, query: SearchQuery) -> Result<Value, Error> {
    client
        .search_read("account.move.line", query, CallOptions::new())
        .await
}
