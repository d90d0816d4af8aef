//! The model-operation capability surface.

use crate::Error;
use async_trait::async_trait;
use odoo_rpc_core::{CallOptions, SearchQuery};
use serde_json::{Map, Value};

/// The operations helper modules program against.
///
/// Both protocol clients implement this, so helpers take
/// `&mut impl ModelApi` and stay independent of the wire variant. The
/// expansion step's secondary read dispatches through it as well, which is
/// what lets expanded records come from the same session as the triggering
/// call.
#[async_trait]
pub trait ModelApi: Send {
    /// Search for records and read the selected fields in one call.
    async fn search_read(
        &mut self,
        model: &str,
        query: SearchQuery,
        options: CallOptions,
    ) -> Result<Value, Error>;

    /// Read records by id.
    ///
    /// `ids` may be a single id or an array of ids.
    async fn read(
        &mut self,
        model: &str,
        ids: Value,
        fields: Vec<String>,
        options: CallOptions,
    ) -> Result<Value, Error>;

    /// Create one record, returning its new id.
    async fn create(&mut self, model: &str, fields: Map<String, Value>) -> Result<Value, Error>;
}
