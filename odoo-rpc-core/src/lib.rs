//! Protocol types for the Odoo RPC client.
//!
//! This crate holds the I/O-free half of the client: wire envelopes, search
//! queries, result shaping, and response classification. The `odoo-rpc`
//! crate builds the transports and the operation surface on top of it.
//!
//! ## Modules
//!
//! - [`envelope`]: JSON-RPC 2.0 call envelopes and credential redaction
//! - [`error`]: remote error envelopes and message composition
//! - [`response`]: raw HTTP responses retained for diagnostics
//! - [`query`]: search queries and the `where`/`domain` alias
//! - [`shape`]: call options and the pure result-shaping steps
//! - [`version`]: server version-info extraction

mod envelope;
mod error;
mod query;
mod response;
mod shape;
mod version;

pub use envelope::*;
pub use error::*;
pub use query::*;
pub use response::*;
pub use shape::*;
pub use version::*;
