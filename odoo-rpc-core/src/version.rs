//! Server version-info extraction.

use serde_json::Value;

/// How to present the server's version-info result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VersionFormat {
    /// The major version number, e.g. `16`.
    #[default]
    Major,
    /// The full version string, e.g. `"16.0"`.
    Full,
    /// The unmodified version-info result.
    Raw,
}

impl VersionFormat {
    /// Pull this format's value out of a version-info result.
    ///
    /// `Major` and `Full` yield null when the result does not carry the
    /// expected field.
    pub fn extract(self, info: Value) -> Value {
        match self {
            VersionFormat::Major => major_version(&info).map(Value::from).unwrap_or(Value::Null),
            VersionFormat::Full => info.get("server_version").cloned().unwrap_or(Value::Null),
            VersionFormat::Raw => info,
        }
    }
}

/// The major version number of a version-info result
/// (`server_version_info[0]`).
pub fn major_version(info: &Value) -> Option<i64> {
    info.pointer("/server_version_info/0").and_then(Value::as_i64)
}
