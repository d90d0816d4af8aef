//! Raw HTTP responses as retained for diagnostics.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde_json::{Map, Value, json};

/// The raw outcome of one dispatched call.
///
/// One of these is retained per session, overwritten on every call, and
/// exposed read-only as the "last response" diagnostic. Only a status of
/// exactly 200 is treated as a success; any other status (including other
/// 2xx codes) is a protocol failure carrying this response.
#[derive(Clone, Debug)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    /// Create a raw response from its transport-level parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The undecoded body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether the status is exactly 200.
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Decode the body as JSON.
    pub fn decode(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Headers flattened to one string value per name, repeated values joined
    /// by a single space.
    pub fn flattened_headers(&self) -> Map<String, Value> {
        let mut flat = Map::new();
        for name in self.headers.keys() {
            let joined = self
                .headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(" ");
            flat.insert(name.as_str().to_string(), Value::String(joined));
        }
        flat
    }

    /// The structured payload logged for this response: status code,
    /// flattened headers, and the decoded body (or the raw body as a string
    /// when it is not valid JSON).
    pub fn log_payload(&self) -> Value {
        let body = self
            .decode()
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&self.body).into_owned()));
        json!({
            "httpStatus": self.status.as_u16(),
            "headers": Value::Object(self.flattened_headers()),
            "body": body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderName, HeaderValue, SET_COOKIE};

    fn response(status: StatusCode, body: &str) -> RawResponse {
        RawResponse::new(status, HeaderMap::new(), Bytes::from(body.to_string()))
    }

    #[test]
    fn test_only_exact_200_is_ok() {
        assert!(response(StatusCode::OK, "{}").is_ok());
        assert!(!response(StatusCode::NO_CONTENT, "").is_ok());
        assert!(!response(StatusCode::INTERNAL_SERVER_ERROR, "").is_ok());
    }

    #[test]
    fn test_flattened_headers_join_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );
        let response = RawResponse::new(StatusCode::OK, headers, Bytes::new());

        let flat = response.flattened_headers();
        assert_eq!(flat["set-cookie"], "a=1 b=2");
        assert_eq!(flat["content-type"], "application/json");
    }

    #[test]
    fn test_log_payload_decodes_json_body() {
        let payload = response(StatusCode::OK, r#"{"result": 7}"#).log_payload();
        assert_eq!(payload["httpStatus"], 200);
        assert_eq!(payload["body"]["result"], 7);
    }

    #[test]
    fn test_log_payload_keeps_raw_body_when_not_json() {
        let payload = response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").log_payload();
        assert_eq!(payload["httpStatus"], 502);
        assert_eq!(payload["body"], "<html>bad gateway</html>");
    }
}
