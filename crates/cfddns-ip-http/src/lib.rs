// # HTTP IP Fetcher
//
// This crate provides the reqwest-backed `IpFetcher` used by public-IP
// discovery.
//
// ## Behavior
//
// - One GET per call, no retry, no redirect tricks
// - Per-request timeout (10 seconds by default)
// - Any HTTP response is handed back as-is; deciding whether the body holds
//   an address is the discovery chain's job
//
// ## Default services
//
// Tried in this order when no endpoints are configured:
// - https://api.ipify.org (plain text)
// - https://jsonip.com (JSON `ip` field)
// - https://ifconfig.co/json (JSON `ip` field)

use async_trait::async_trait;
use cfddns_core::config::IpDiscoveryConfig;
use cfddns_core::traits::{FetchedBody, IpFetcher};
use cfddns_core::types::IpVersion;
use cfddns_core::{Error, IpDiscovery, Result};
use std::time::Duration;

/// Default public-IP services, in fallback order
pub const DEFAULT_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://jsonip.com",
    "https://ifconfig.co/json",
];

/// Default per-request timeout for discovery endpoints
pub const DEFAULT_IP_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest-based fetcher for discovery endpoints
#[derive(Debug, Clone)]
pub struct HttpIpFetcher {
    client: reqwest::Client,
}

impl HttpIpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_IP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Build from the discovery section of the configuration
    pub fn from_config(config: &IpDiscoveryConfig) -> Result<Self> {
        Self::with_timeout(Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl IpFetcher for HttpIpFetcher {
    async fn fetch(&self, endpoint: &str) -> Result<FetchedBody> {
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {endpoint} failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response from {endpoint}: {e}")))?;

        tracing::debug!("{} answered HTTP {} ({} bytes)", endpoint, status, body.len());
        Ok(FetchedBody::new(status, body))
    }
}

/// Discovery chain for the configured endpoints, or the defaults when none are set
pub fn discovery_for(config: &IpDiscoveryConfig, version: IpVersion) -> IpDiscovery {
    let endpoints = if config.endpoints.is_empty() {
        DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()).collect()
    } else {
        config.endpoints.clone()
    };
    IpDiscovery::new(endpoints, version)
}
