//! Odoo client for Rust.
//!
//! This crate talks to an Odoo server over its two JSON interfaces:
//! [`JsonRpcClient`] for the `/jsonrpc` endpoint and [`RestClient`] for the
//! `/web/...` endpoints. Both expose the same operation surface and share
//! one behavior for querying, result shaping, error classification, and
//! credential-masked logging.
//!
//! ## Features
//!
//! - `authenticate` / `version` / generic `execute` plus the named
//!   operations (`search_read`, `read`, `create`, `update`, `delete`,
//!   `action_post`, `fields_get`, `change_active_company`)
//! - [`SearchQuery`] with the `where`/`domain` alias and positional or
//!   flat-parameter serialization per protocol
//! - [`CallOptions`] result shaping: related-record expansion into
//!   `_expanded`, single-record collapsing, indexing by field
//! - Error taxonomy separating transport, protocol, remote, not-found,
//!   session, and decode failures
//! - Structured logging through a pluggable [`LogSink`] with credentials
//!   masked by value
//! - [`helpers`] for common lookups and [`update_exchange_rates`] for
//!   currency-rate maintenance
//!
//! ## Example
//!
//! ```ignore
//! use odoo_rpc::{CallOptions, JsonRpcClient, SearchQuery, SingleMode};
//! use serde_json::json;
//!
//! let mut client = JsonRpcClient::builder("https://odoo.example.com")
//!     .database("mydb")
//!     .username("admin")
//!     .password("secret")
//!     .build_jsonrpc()?;
//!
//! client.authenticate().await?;
//!
//! let invoice = client
//!     .search_read(
//!         "account.move",
//!         SearchQuery::new()
//!             .where_clause(json!([["name", "=", "INV/2026/0042"]]))
//!             .fields(["name", "amount_total", "invoice_line_ids"]),
//!         CallOptions::new()
//!             .single(SingleMode::Required)
//!             .expand("invoice_line_ids", "account.move.line"),
//!     )
//!     .await?;
//!
//! println!("{}", invoice["_expanded"]["invoice_line_ids"]);
//! ```

mod api;
mod builder;
mod client;
mod currency;
mod error;
pub mod helpers;
mod jsonrpc;
mod log;
mod rest;
mod session;
mod transport;

pub use api::ModelApi;
pub use builder::{ClientBuildError, ClientBuilder};
pub use currency::{RateFeed, update_exchange_rates};
pub use error::Error;
pub use jsonrpc::JsonRpcClient;
pub use log::{LogSink, REQUEST_EVENT, RESPONSE_EVENT, TracingSink};
pub use rest::RestClient;
pub use session::Session;
pub use transport::{HttpTransport, Transport};

// Re-export the protocol types callers hold to drive the operations
pub use odoo_rpc_core::{
    CallOptions, Envelope, ExpandSpec, Params, RawResponse, RemoteError, SearchQuery, SingleMode,
    VersionFormat,
};
