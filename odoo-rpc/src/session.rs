//! Per-client session state.

use serde_json::Value;
use std::fmt;

/// Connection identity and authentication state for one client.
///
/// The uid starts unset and is written in exactly one place: when a
/// successful `authenticate` result passes through the response
/// interpreter. No other call writes, clears, or defaults it, and
/// operations that need it fail with [`Error::Session`] while it is unset.
///
/// [`Error::Session`]: crate::Error::Session
pub struct Session {
    server_url: String,
    database: String,
    username: String,
    password: String,
    uid: Option<i64>,
}

impl Session {
    pub(crate) fn new(
        server_url: String,
        database: String,
        username: String,
        password: String,
    ) -> Self {
        Self {
            server_url,
            database,
            username,
            password,
            uid: None,
        }
    }

    /// Server base URL, without a trailing slash.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Database name sent with identity-bearing calls.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Login username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The authenticated user id, once `authenticate` has succeeded.
    pub fn uid(&self) -> Option<i64> {
        self.uid
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Username/credential pair for payload redaction.
    ///
    /// Empty strings redact nothing; otherwise an empty configured value
    /// would match and replace every empty string in the payload.
    pub(crate) fn redaction_pair(&self) -> (Option<&str>, Option<&str>) {
        let username = Some(self.username.as_str()).filter(|u| !u.is_empty());
        let password = Some(self.password.as_str()).filter(|p| !p.is_empty());
        (username, password)
    }

    /// Store the uid carried by an authenticate result.
    ///
    /// Accepts an integer result or an object with an integer `uid` field.
    /// Anything else (notably the `false` the server returns for bad
    /// credentials) leaves the uid as it was.
    pub(crate) fn absorb_uid(&mut self, result: &Value) {
        let uid = result
            .as_i64()
            .or_else(|| result.get("uid").and_then(Value::as_i64));
        if let Some(uid) = uid {
            self.uid = Some(uid);
        }
    }
}

impl fmt::Debug for Session {
    // Manual impl so the credential never reaches debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("server_url", &self.server_url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .field("uid", &self.uid)
            .finish()
    }
}
