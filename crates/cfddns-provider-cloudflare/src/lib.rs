// # Cloudflare Zone API
//
// This crate provides the Cloudflare API v4 transport for cfddns. It
// implements `cfddns_core::ZoneApi`; zone matching, the record cache and the
// reconciliation decisions all live in `cfddns-core`.
//
// ## Behavior
//
// - One logical operation per trait call (list calls follow pagination)
// - No retry and no backoff: failures surface to the caller immediately
// - HTTP timeout configured (30 seconds by default)
// - Success is HTTP 200 with `success: true`; anything else becomes
//   `Error::ProviderRequestFailed` carrying the provider's message
//
// ## Authentication
//
// - Global API key: `X-Auth-Email` + `X-Auth-Key`
// - API token: `Authorization: Bearer <token>`
//
// Credentials NEVER appear in logs or in Debug output.
//
// ## API Reference
//
// - List Zones: GET `/zones?page=N&per_page=50`
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=N&per_page=100`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

mod envelope;

use async_trait::async_trait;
use cfddns_core::config::ProviderConfig;
use cfddns_core::traits::ZoneApi;
use cfddns_core::types::{Credentials, DnsRecord, RecordPayload, Zone};
use cfddns_core::{Error, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use envelope::{DeletedRecord, Envelope, error_message, join_messages};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const ZONES_PER_PAGE: u32 = 50;
const RECORDS_PER_PAGE: u32 = 100;

const X_AUTH_EMAIL: HeaderName = HeaderName::from_static("x-auth-email");
const X_AUTH_KEY: HeaderName = HeaderName::from_static("x-auth-key");

/// Cloudflare API v4 client
///
/// Holds the credentials for the whole lifetime of the value; every request
/// is authenticated from them.
pub struct CloudflareApi {
    /// ⚠️ NEVER log this value
    credentials: Credentials,

    /// Base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for CloudflareApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareApi")
            .field("credentials", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareApi {
    /// Create a client against the public API with the default timeout
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_timeout(credentials, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a client with an explicit request timeout
    ///
    /// Fails fast when the credentials are incomplete.
    pub fn with_timeout(credentials: Credentials, timeout: Duration) -> Result<Self> {
        if credentials.is_incomplete() {
            return Err(Error::config("Cloudflare credentials cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            credentials,
            api_base: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the client at another base URL (API gateway, test server)
    pub fn with_base_url(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Build from the provider section of the configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare {
                auth,
                api_base,
                timeout_secs,
            } => {
                let api = Self::with_timeout(auth.clone(), Duration::from_secs(*timeout_secs))?;
                Ok(match api_base {
                    Some(base) => api.with_base_url(base.as_str()),
                    None => api,
                })
            }
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Authentication headers for every request
    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match &self.credentials {
            Credentials::ApiKey { email, key } => {
                headers.insert(X_AUTH_EMAIL, header_value(email, "email")?);
                headers.insert(X_AUTH_KEY, header_value(key, "API key")?);
            }
            Credentials::ApiToken { token } => {
                let bearer = format!("Bearer {token}");
                headers.insert(AUTHORIZATION, header_value(&bearer, "API token")?);
            }
        }

        Ok(headers)
    }

    /// Send one request and unwrap the envelope
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, u32)],
        body: Option<&RecordPayload>,
    ) -> Result<Envelope<T>> {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!("Cloudflare request: {} {}", method, path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.auth_headers()?);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{method} {path} failed: {e}")))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            Error::http(format!("Failed to read response of {method} {path}: {e}"))
        })?;

        if status != StatusCode::OK {
            tracing::debug!("Cloudflare answered {} for {} {}", status, method, path);
            return Err(Error::provider_request(
                Some(status.as_u16()),
                error_message(&text),
            ));
        }

        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            Error::provider_request(
                Some(status.as_u16()),
                format!("Failed to parse response: {e}"),
            )
        })?;

        if !envelope.success {
            let message = envelope
                .message
                .clone()
                .or_else(|| join_messages(&envelope.errors))
                .unwrap_or_else(|| "request was not successful".to_string());
            return Err(Error::provider_request(Some(status.as_u16()), message));
        }

        Ok(envelope)
    }

    /// Send one request and return its `result`
    async fn send_for_result<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&RecordPayload>,
    ) -> Result<T> {
        self.send(method, path, &[], body)
            .await?
            .result
            .ok_or_else(|| {
                Error::provider_request(Some(200), "Invalid response format: missing result")
            })
    }

    /// GET every page of a list resource
    ///
    /// Pages are counted locally and stop at the reported `total_pages`.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        per_page: u32,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let envelope: Envelope<Vec<T>> = self
                .send(
                    Method::GET,
                    path,
                    &[("page", page), ("per_page", per_page)],
                    None,
                )
                .await?;

            items.extend(envelope.result.unwrap_or_default());

            let total_pages = envelope.result_info.map_or(0, |info| info.total_pages);
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

fn header_value(value: &str, what: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        Error::config(format!(
            "Cloudflare {what} contains characters not allowed in a header"
        ))
    })?;
    header.set_sensitive(true);
    Ok(header)
}

#[async_trait]
impl ZoneApi for CloudflareApi {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let zones: Vec<Zone> = self.get_all_pages("/zones", ZONES_PER_PAGE).await?;
        tracing::debug!("Cloudflare listed {} zone(s)", zones.len());
        Ok(zones)
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let path = format!("/zones/{zone_id}/dns_records");
        let records: Vec<DnsRecord> = self.get_all_pages(&path, RECORDS_PER_PAGE).await?;
        tracing::debug!("Cloudflare listed {} record(s) in zone {}", records.len(), zone_id);
        Ok(records)
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<DnsRecord> {
        let path = format!("/zones/{zone_id}/dns_records");
        self.send_for_result(Method::POST, &path, Some(payload)).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<DnsRecord> {
        let path = format!("/zones/{zone_id}/dns_records/{record_id}");
        self.send_for_result(Method::PUT, &path, Some(payload)).await
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<String> {
        let path = format!("/zones/{zone_id}/dns_records/{record_id}");
        let deleted: DeletedRecord = self.send_for_result(Method::DELETE, &path, None).await?;
        Ok(deleted.id)
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
