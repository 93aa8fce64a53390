// # ClouDNS API Adapter
//
// Implements `cloudns_core::ZoneApi` on top of the ClouDNS JSON API.
//
// ## Behavior
//
// - One HTTP request per trait call; no retries, no pacing, no caching
//   (pacing and confirmation belong to the `Reconciler`)
// - HTTP timeout of 30 seconds
// - Credentials travel as query parameters and never appear in logs or
//   `Debug` output
//
// ## Error Mapping
//
// | Response                              | `ApiError`        |
// |---------------------------------------|-------------------|
// | HTTP 401 / 403                        | `Authentication`  |
// | HTTP 429                              | `RateLimited`     |
// | other non-2xx                         | `Http`            |
// | `{"status":"Failed"}` (bad auth)      | `Authentication`  |
// | `{"status":"Failed"}` (anything else) | `Provider`        |
// | undecodable body                      | `Json`            |
//
// ## API Reference
//
// - List records: `GET /dns/records.json?domain-name=<zone>`
// - Add record: `POST /dns/add-record.json`
// - Modify record: `POST /dns/mod-record.json`
// - Delete record: `POST /dns/delete-record.json`

mod types;

use std::time::Duration;

use async_trait::async_trait;
use cloudns_core::config::ReconcilerConfig;
use cloudns_core::{ApiError, AuthIdentity, Credentials, WireRecord, ZoneApi};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use types::{Listing, StatusResponse};

/// ClouDNS API base URL
pub const CLOUDNS_API_BASE: &str = "https://api.cloudns.net";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Name used in errors and logs
const PROVIDER: &str = "cloudns";

/// Prefix ClouDNS uses when it rejects credentials with HTTP 200
const AUTH_FAILURE_PREFIX: &str = "Invalid authentication";

/// ClouDNS HTTP client
///
/// Stateless apart from its connection pool; clone it or share it behind an
/// `Arc` freely.
#[derive(Clone)]
pub struct CloudnsClient {
    /// Validated credentials
    /// ⚠️ NEVER log the password
    credentials: Credentials,

    /// API root, without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for CloudnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudnsClient")
            .field("identity", &self.credentials.identity)
            .field("password", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudnsClient {
    /// Create a client for the public ClouDNS endpoint
    pub fn new(credentials: Credentials) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| ApiError::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            credentials,
            base_url: CLOUDNS_API_BASE.to_string(),
            client,
        })
    }

    /// Create a client from a validated configuration
    pub fn from_config(config: &ReconcilerConfig) -> cloudns_core::Result<Self> {
        let credentials = config.credentials()?;
        Self::new(credentials).map_err(|e| cloudns_core::Error::config(e.to_string()))
    }

    /// Point the client at another API root (test servers, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The API root requests go to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authentication query parameters
    fn auth_params(&self) -> [(&'static str, String); 2] {
        let identity = match self.credentials.identity {
            AuthIdentity::Primary(id) => ("auth-id", id.to_string()),
            AuthIdentity::Sub(id) => ("sub-auth-id", id.to_string()),
        };
        [identity, ("auth-password", self.credentials.password.clone())]
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, endpoint))
            .query(&self.auth_params())
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, endpoint))
            .query(&self.auth_params())
    }

    /// Send a request and return its JSON body
    ///
    /// Maps HTTP status codes and `{"status":"Failed"}` bodies to errors.
    async fn execute(&self, request: RequestBuilder, endpoint: &str) -> Result<Value, ApiError> {
        // Only the endpoint is logged; the full URL carries the password
        debug!(provider = PROVIDER, endpoint, "Sending request");

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::http(format!("{endpoint} request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::http(format!("Failed to read {endpoint} response: {}", e.without_url())))?;

        debug!(provider = PROVIDER, endpoint, status = status.as_u16(), "Response received");

        if !status.is_success() {
            return Err(map_status(status, endpoint, &body));
        }

        let json: Value = serde_json::from_str(&body)?;

        if let Some(description) = types::failure_description(&json) {
            warn!(provider = PROVIDER, endpoint, %description, "Request rejected");
            if description.starts_with(AUTH_FAILURE_PREFIX) {
                return Err(ApiError::auth(description));
            }
            return Err(ApiError::provider(PROVIDER, description));
        }

        Ok(json)
    }

    /// Send a mutating request and decode its status body
    async fn mutate(&self, request: RequestBuilder, endpoint: &str) -> Result<StatusResponse, ApiError> {
        let json = self.execute(request, endpoint).await?;
        let response: StatusResponse = serde_json::from_value(json)?;

        if !response.is_success() {
            return Err(ApiError::provider(
                PROVIDER,
                format!("{}: {}", response.status, response.status_description),
            ));
        }
        Ok(response)
    }
}

/// Form fields shared by add-record and mod-record
fn record_fields(record: &WireRecord) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("domain-name", record.zone.clone()),
        ("record-type", record.record_type.clone()),
        ("host", record.host.clone()),
        ("record", record.record.clone()),
        ("ttl", record.ttl.to_string()),
    ];
    if let Some(priority) = record.priority {
        fields.push(("priority", priority.to_string()));
    }
    if let Some(weight) = record.weight {
        fields.push(("weight", weight.to_string()));
    }
    if let Some(port) = record.port {
        fields.push(("port", port.to_string()));
    }
    fields
}

fn map_status(status: StatusCode, endpoint: &str, body: &str) -> ApiError {
    match status.as_u16() {
        401 | 403 => ApiError::auth(format!("credentials rejected by {endpoint}. Status: {status}")),
        429 => ApiError::rate_limited(format!("{endpoint} throttled. Status: {status}")),
        500..=599 => ApiError::http(format!("ClouDNS server error (transient): {status} - {body}")),
        _ => ApiError::http(format!("{endpoint} failed: {status} - {body}")),
    }
}

#[async_trait]
impl ZoneApi for CloudnsClient {
    async fn list_zone(&self, zone: &str) -> Result<Vec<WireRecord>, ApiError> {
        const ENDPOINT: &str = "/dns/records.json";

        let request = self.get(ENDPOINT).query(&[("domain-name", zone)]);
        let json = self.execute(request, ENDPOINT).await?;
        let listing: Listing = serde_json::from_value(json)?;

        Ok(listing
            .into_records()
            .into_iter()
            .map(|(key, listed)| WireRecord {
                id: listed.id.or(Some(key)),
                zone: zone.to_string(),
                host: listed.host,
                record_type: listed.record_type,
                record: listed.record,
                ttl: listed.ttl,
                priority: listed.priority,
                weight: listed.weight,
                port: listed.port,
            })
            .collect())
    }

    async fn create_record(&self, record: &WireRecord) -> Result<WireRecord, ApiError> {
        const ENDPOINT: &str = "/dns/add-record.json";

        let request = self.post(ENDPOINT).form(&record_fields(record));
        let response = self.mutate(request, ENDPOINT).await?;

        let id = response
            .data
            .and_then(|data| data.id)
            .ok_or_else(|| ApiError::invalid_response("add-record response carried no data.id"))?;

        debug!(provider = PROVIDER, zone = %record.zone, %id, "Record added");

        let mut created = record.clone();
        created.id = Some(id);
        Ok(created)
    }

    async fn update_record(&self, record: &WireRecord) -> Result<WireRecord, ApiError> {
        const ENDPOINT: &str = "/dns/mod-record.json";

        let id = record
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::provider(PROVIDER, "record id is required to modify a record"))?;

        let mut fields = record_fields(record);
        fields.push(("record-id", id.to_string()));

        let request = self.post(ENDPOINT).form(&fields);
        self.mutate(request, ENDPOINT).await?;

        Ok(record.clone())
    }

    async fn destroy_record(&self, zone: &str, id: &str) -> Result<(), ApiError> {
        const ENDPOINT: &str = "/dns/delete-record.json";

        let request = self
            .post(ENDPOINT)
            .form(&[("domain-name", zone), ("record-id", id)]);
        self.mutate(request, ENDPOINT).await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
