//! Result shaping options and the pure shaping steps.
//!
//! Shaping runs only on confirmed-error-free results, in a fixed order:
//! related-record expansion first (so it always sees the full set), then
//! single-record collapsing, then indexing. The expansion step needs a
//! secondary read and therefore lives with the client; this module provides
//! the option types and the pure pieces of each step.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Key under which expanded related records are attached to a record.
pub const EXPANDED_KEY: &str = "_expanded";

/// Single-record collapsing behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SingleMode {
    /// No collapsing; the full set is returned.
    #[default]
    Off,
    /// Collapse to the first record; an empty set becomes an explicit null.
    Soft,
    /// Collapse to the first record; an empty set is a not-found failure.
    Required,
}

/// Instruction to expand a field holding related-record ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandSpec {
    /// Model the ids refer to, e.g. `account.move.line`.
    pub model: String,
}

impl ExpandSpec {
    /// Create an expand spec for a related model.
    pub fn new<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
        }
    }
}

/// Caller-supplied post-processing options, consumed once per call.
///
/// # Example
///
/// ```
/// use odoo_rpc_core::{CallOptions, SingleMode};
///
/// let options = CallOptions::new()
///     .single(SingleMode::Required)
///     .expand("invoice_line_ids", "account.move.line");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallOptions {
    /// Re-key the result by each record's value at this field.
    /// Collisions are last-write-wins; the remote system keeps the commonly
    /// chosen index fields distinct, the shaper does not enforce it.
    pub index_by: Option<String>,
    /// Single-record collapsing mode.
    pub single: SingleMode,
    /// Fields to expand, keyed by field name.
    pub expand: BTreeMap<String, ExpandSpec>,
    /// Extra keyword arguments for the REST call_kw endpoint. The RPC
    /// execute service has no kwargs slot and ignores these.
    pub kw_args: Option<Map<String, Value>>,
}

impl CallOptions {
    /// Create empty options (no shaping).
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the result by `field`.
    pub fn index_by<S: Into<String>>(mut self, field: S) -> Self {
        self.index_by = Some(field.into());
        self
    }

    /// Set the single-record collapsing mode.
    pub fn single(mut self, mode: SingleMode) -> Self {
        self.single = mode;
        self
    }

    /// Expand `field` into the records of `related_model`.
    pub fn expand<F: Into<String>, M: Into<String>>(mut self, field: F, related_model: M) -> Self {
        self.expand
            .insert(field.into(), ExpandSpec::new(related_model));
        self
    }

    /// Set keyword arguments for the REST call_kw endpoint.
    pub fn kw_args(mut self, kw_args: Map<String, Value>) -> Self {
        self.kw_args = Some(kw_args);
        self
    }

    /// Whether any shaping stage applies. `kw_args` is wire input, not a
    /// shaping option, and does not count.
    pub fn shapes(&self) -> bool {
        self.index_by.is_some() || self.single != SingleMode::Off || !self.expand.is_empty()
    }
}

/// Outcome of single-mode collapsing.
#[derive(Clone, Debug, PartialEq)]
pub enum Collapsed {
    /// Mode off: shaping continues with the full set.
    Full(Value),
    /// The selected record, or an explicit null for soft-empty.
    Single(Value),
    /// Required mode with an empty set; the caller raises not-found.
    Missing,
}

/// Apply single-mode collapsing to a result.
///
/// A null result counts as empty. A result that is not a sequence is passed
/// through as the single value.
pub fn collapse_single(result: Value, mode: SingleMode) -> Collapsed {
    if mode == SingleMode::Off {
        return Collapsed::Full(result);
    }
    let rows = match result {
        Value::Array(rows) => rows,
        Value::Null => vec![],
        other => return Collapsed::Single(other),
    };
    match rows.into_iter().next() {
        Some(first) => Collapsed::Single(first),
        None if mode == SingleMode::Required => Collapsed::Missing,
        None => Collapsed::Single(Value::Null),
    }
}

/// Re-key a sequence of records by each record's value at `field`.
///
/// Last write wins on key collisions. Records without the field are skipped;
/// non-string key values use their JSON text as the key. A result that is not
/// a sequence is returned unchanged.
pub fn index_by(result: Value, field: &str) -> Value {
    let Value::Array(rows) = result else {
        return result;
    };
    let mut indexed = Map::new();
    for row in rows {
        let key = match row.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => continue,
        };
        indexed.insert(key, row);
    }
    Value::Object(indexed)
}

/// The non-empty id array at `field` of a record, when it has one.
///
/// Ids are looked up by explicit key; a missing field, a non-array value, or
/// an empty array all mean there is nothing to expand.
pub fn expandable_ids(row: &Value, field: &str) -> Option<Vec<Value>> {
    row.get(field)
        .and_then(Value::as_array)
        .filter(|ids| !ids.is_empty())
        .cloned()
}

/// Attach expanded `records` under `_expanded.<field>` of a record.
pub fn attach_expanded(row: &mut Value, field: &str, records: Value) {
    let Some(row) = row.as_object_mut() else {
        return;
    };
    let expanded = row
        .entry(EXPANDED_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(expanded) = expanded.as_object_mut() {
        expanded.insert(field.to_string(), records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_defaults() {
        let options = CallOptions::new();
        assert!(options.index_by.is_none());
        assert_eq!(options.single, SingleMode::Off);
        assert!(options.expand.is_empty());
        assert!(options.kw_args.is_none());
    }

    #[test]
    fn test_options_shapes() {
        assert!(!CallOptions::new().shapes());
        assert!(!CallOptions::new().kw_args(Map::new()).shapes());
        assert!(CallOptions::new().index_by("code").shapes());
        assert!(CallOptions::new().single(SingleMode::Soft).shapes());
        assert!(CallOptions::new().expand("line_ids", "account.move.line").shapes());
    }

    #[test]
    fn test_options_builder_chain() {
        let options = CallOptions::new()
            .index_by("code")
            .single(SingleMode::Soft)
            .expand("line_ids", "account.move.line");
        assert_eq!(options.index_by.as_deref(), Some("code"));
        assert_eq!(options.single, SingleMode::Soft);
        assert_eq!(
            options.expand.get("line_ids"),
            Some(&ExpandSpec::new("account.move.line")),
        );
    }

    #[test]
    fn test_collapse_off_keeps_full_set() {
        let rows = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(
            collapse_single(rows.clone(), SingleMode::Off),
            Collapsed::Full(rows),
        );
    }

    #[test]
    fn test_collapse_returns_first_record_only() {
        let rows = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(
            collapse_single(rows.clone(), SingleMode::Soft),
            Collapsed::Single(json!({"id": 1})),
        );
        assert_eq!(
            collapse_single(rows, SingleMode::Required),
            Collapsed::Single(json!({"id": 1})),
        );
    }

    #[test]
    fn test_collapse_soft_empty_is_explicit_null() {
        assert_eq!(
            collapse_single(json!([]), SingleMode::Soft),
            Collapsed::Single(Value::Null),
        );
        assert_eq!(
            collapse_single(Value::Null, SingleMode::Soft),
            Collapsed::Single(Value::Null),
        );
    }

    #[test]
    fn test_collapse_required_empty_is_missing() {
        assert_eq!(collapse_single(json!([]), SingleMode::Required), Collapsed::Missing);
        assert_eq!(
            collapse_single(Value::Null, SingleMode::Required),
            Collapsed::Missing,
        );
    }

    #[test]
    fn test_index_by_keys_are_field_values() {
        let rows = json!([
            {"id": 1, "code": "1920"},
            {"id": 2, "code": "8060"},
        ]);
        let indexed = index_by(rows, "code");
        assert_eq!(indexed["1920"], json!({"id": 1, "code": "1920"}));
        assert_eq!(indexed["8060"], json!({"id": 2, "code": "8060"}));
    }

    #[test]
    fn test_index_by_collision_last_write_wins() {
        let rows = json!([
            {"id": 1, "name": "A"},
            {"id": 2, "name": "A"},
        ]);
        let indexed = index_by(rows, "name");
        assert_eq!(indexed, json!({"A": {"id": 2, "name": "A"}}));
    }

    #[test]
    fn test_index_by_numeric_values_use_json_text() {
        let rows = json!([{"id": 7, "name": "x"}]);
        let indexed = index_by(rows, "id");
        assert_eq!(indexed["7"], json!({"id": 7, "name": "x"}));
    }

    #[test]
    fn test_index_by_skips_rows_without_the_field() {
        let rows = json!([{"id": 1, "code": "1920"}, {"id": 2}]);
        let indexed = index_by(rows, "code");
        assert_eq!(indexed.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_expandable_ids() {
        let row = json!({"invoice_line_ids": [10, 11], "partner_id": 6, "name": "x", "tags": []});
        assert_eq!(
            expandable_ids(&row, "invoice_line_ids"),
            Some(vec![json!(10), json!(11)]),
        );
        assert_eq!(expandable_ids(&row, "partner_id"), None); // not an array
        assert_eq!(expandable_ids(&row, "tags"), None); // empty
        assert_eq!(expandable_ids(&row, "missing"), None);
    }

    #[test]
    fn test_attach_expanded_builds_substructure() {
        let mut row = json!({"id": 1, "invoice_line_ids": [10, 11]});
        attach_expanded(&mut row, "invoice_line_ids", json!([{"id": 10}, {"id": 11}]));
        assert_eq!(
            row[EXPANDED_KEY]["invoice_line_ids"],
            json!([{"id": 10}, {"id": 11}]),
        );
        // original field is left in place
        assert_eq!(row["invoice_line_ids"], json!([10, 11]));
    }

    #[test]
    fn test_attach_expanded_keeps_existing_expansions() {
        let mut row = json!({"id": 1, "_expanded": {"partner_ids": [{"id": 6}]}});
        attach_expanded(&mut row, "line_ids", json!([{"id": 10}]));
        assert_eq!(row[EXPANDED_KEY]["partner_ids"], json!([{"id": 6}]));
        assert_eq!(row[EXPANDED_KEY]["line_ids"], json!([{"id": 10}]));
    }
}
