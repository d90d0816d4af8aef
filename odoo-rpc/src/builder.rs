//! Client construction.

use crate::client::Caller;
use crate::jsonrpc::JsonRpcClient;
use crate::log::{LogSink, TracingSink};
use crate::rest::RestClient;
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};
use std::fmt;
use std::sync::Arc;

/// Errors from building a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// The server URL was empty.
    #[error("server URL must not be empty")]
    EmptyServerUrl,
}

/// Builder shared by [`JsonRpcClient`] and [`RestClient`].
///
/// The two protocols share all configuration; the final
/// [`build_jsonrpc`](ClientBuilder::build_jsonrpc) or
/// [`build_rest`](ClientBuilder::build_rest) call picks between them.
///
/// # Example
///
/// ```ignore
/// use odoo_rpc::JsonRpcClient;
///
/// let mut client = JsonRpcClient::builder("https://odoo.example.com")
///     .database("mydb")
///     .username("admin")
///     .password("secret")
///     .debug(true)
///     .build_jsonrpc()?;
/// ```
pub struct ClientBuilder<T = HttpTransport> {
    server_url: String,
    database: String,
    username: String,
    password: String,
    transport: T,
    sink: Option<Arc<dyn LogSink>>,
    debug: bool,
}

impl ClientBuilder<HttpTransport> {
    /// Create a builder for `server_url` with the default HTTP transport.
    pub fn new<S: Into<String>>(server_url: S) -> Self {
        Self {
            server_url: server_url.into(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
            transport: HttpTransport::new(),
            sink: None,
            debug: false,
        }
    }

    /// Use a caller-configured [`reqwest::Client`] for the default
    /// transport (proxies, timeouts, extra root certificates).
    ///
    /// # Example
    ///
    /// ```ignore
    /// let http = reqwest::Client::builder()
    ///     .timeout(std::time::Duration::from_secs(30))
    ///     .build()?;
    /// let builder = JsonRpcClient::builder("https://odoo.example.com").client(http);
    /// ```
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.transport = HttpTransport::with_client(client);
        self
    }
}

impl<T: Transport> ClientBuilder<T> {
    /// Database to authenticate against.
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = database.into();
        self
    }

    /// Login username.
    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = username.into();
        self
    }

    /// Login credential.
    ///
    /// Never appears in logged payloads; the request logger masks it by
    /// value wherever it occurs.
    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = password.into();
        self
    }

    /// Replace the default [`TracingSink`] with a custom sink.
    pub fn log_sink<L: LogSink + 'static>(mut self, sink: L) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Also emit request/response events on success, not only errors.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Swap the transport, e.g. for a scripted one in tests.
    pub fn transport<U: Transport>(self, transport: U) -> ClientBuilder<U> {
        ClientBuilder {
            server_url: self.server_url,
            database: self.database,
            username: self.username,
            password: self.password,
            transport,
            sink: self.sink,
            debug: self.debug,
        }
    }

    fn into_caller(self) -> Result<Caller<T>, ClientBuildError> {
        let server_url = self.server_url.trim_end_matches('/').to_string();
        if server_url.is_empty() {
            return Err(ClientBuildError::EmptyServerUrl);
        }
        let session = Session::new(server_url, self.database, self.username, self.password);
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        Ok(Caller::new(session, self.transport, sink, self.debug))
    }

    /// Build a JSON-RPC protocol client.
    pub fn build_jsonrpc(self) -> Result<JsonRpcClient<T>, ClientBuildError> {
        Ok(JsonRpcClient::new(self.into_caller()?))
    }

    /// Build a REST protocol client.
    pub fn build_rest(self) -> Result<RestClient<T>, ClientBuildError> {
        Ok(RestClient::new(self.into_caller()?))
    }
}

impl<T: fmt::Debug> fmt::Debug for ClientBuilder<T> {
    // Manual impl so the credential never reaches debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("server_url", &self.server_url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .field("transport", &self.transport)
            .field("debug", &self.debug)
            .finish()
    }
}
