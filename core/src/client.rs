//! Base API client for a single mite account.
//!
//! # Design
//! `MiteApi` holds the account credentials and a shared `Transport`, and
//! carries no mutable state between calls. Every call is split the same way:
//! `build_request` produces an `HttpRequest`, the transport executes it, and
//! `parse_response` turns the `HttpResponse` into JSON. Both halves are public
//! so callers that run their own I/O can use the client without a transport.
//!
//! Error bodies (`{"error": "..."}`) on non-2xx responses are returned as
//! ordinary `Ok` values. Use [`api_error`] to tell them apart from records.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::adapters::unwrap_resource;
use crate::error::MiteError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};

/// Header carrying the account's API key.
pub const API_KEY_HEADER: &str = "X-MiteApiKey";

/// Content type sent with every request. The service expects `text/json`.
pub const CONTENT_TYPE: &str = "text/json";

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const API_HOST: &str = "mite.yo.lk";

/// Realm and API key of one mite account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    realm: String,
    apikey: String,
}

impl Credentials {
    pub fn new(realm: impl Into<String>, apikey: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            apikey: apikey.into(),
        }
    }

    /// Account subdomain, `foo` in `foo.mite.yo.lk`.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn apikey(&self) -> &str {
        &self.apikey
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("realm", &self.realm)
            .field("apikey", &"[REDACTED]")
            .finish()
    }
}

/// Synchronous client for the mite REST API.
///
/// Cloning is cheap: clones share the underlying transport.
#[derive(Clone)]
pub struct MiteApi {
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for MiteApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiteApi")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl MiteApi {
    /// Create a client that talks to `https://{realm}.mite.yo.lk` over the
    /// default blocking transport.
    pub fn new(realm: impl Into<String>, apikey: impl Into<String>) -> Self {
        Self::with_transport(realm, apikey, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(
        realm: impl Into<String>,
        apikey: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::from_credentials(Credentials::new(realm, apikey), transport)
    }

    pub fn from_credentials(credentials: Credentials, transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn realm(&self) -> &str {
        self.credentials.realm()
    }

    pub fn apikey(&self) -> &str {
        self.credentials.apikey()
    }

    /// Absolute URL for `path` on this account's host.
    pub fn url(&self, path: &str) -> String {
        format!(
            "https://{}.{API_HOST}/{}",
            self.credentials.realm,
            path.trim_start_matches('/')
        )
    }

    /// Headers sent with every request, in wire order.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            (API_KEY_HEADER.to_string(), self.credentials.apikey.clone()),
            ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ]
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<HttpRequest, MiteError> {
        let raw = self.url(path);
        let parsed = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        let url = parsed.map_err(|e| MiteError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| MiteError::Serialization(e.to_string()))?;

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers: self.headers(),
            body,
        })
    }

    /// Decode a response body.
    ///
    /// Non-2xx responses whose body is JSON come back as `Ok` with the body
    /// untouched; only a non-JSON error body is an `Err`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, MiteError> {
        if response.is_success() {
            if response.body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&response.body)
                .map_err(|e| MiteError::Deserialization(e.to_string()));
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(body) => {
                warn!(
                    status = response.status,
                    error = api_error(&body).unwrap_or_default(),
                    "mite returned an error response"
                );
                Ok(body)
            }
            Err(_) => Err(MiteError::Http {
                status: response.status,
                body: response.body,
            }),
        }
    }

    /// Run a built request through the transport and parse the result.
    pub fn execute(&self, request: &HttpRequest) -> Result<Value, MiteError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        self.parse_response(response)
    }

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, MiteError> {
        let request = self.build_request(HttpMethod::Get, path, query, None)?;
        self.execute(&request)
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<Value, MiteError> {
        let request = self.build_request(HttpMethod::Post, path, &[], Some(body))?;
        self.execute(&request)
    }

    /// PUT `body` to `path`. `None` sends the request without a body.
    pub fn put(&self, path: &str, body: Option<&Value>) -> Result<Value, MiteError> {
        let request = self.build_request(HttpMethod::Put, path, &[], body)?;
        self.execute(&request)
    }

    pub fn delete(&self, path: &str) -> Result<Value, MiteError> {
        let request = self.build_request(HttpMethod::Delete, path, &[], None)?;
        self.execute(&request)
    }

    /// The user owning the API key.
    pub fn myself(&self) -> Result<Value, MiteError> {
        Ok(unwrap_resource("user", self.get("myself.json", &[])?))
    }

    /// The account behind the realm.
    pub fn account(&self) -> Result<Value, MiteError> {
        Ok(unwrap_resource("account", self.get("account.json", &[])?))
    }
}

/// The message of a service error body shaped `{"error": "<message>"}`.
pub fn api_error(value: &Value) -> Option<&str> {
    value.get("error").and_then(Value::as_str)
}
