//! Configuration types for the cfddns system
//!
//! This module defines the configuration structures the binary assembles
//! (from environment variables) and hands to the library crates.

use serde::{Deserialize, Serialize};

use crate::types::{Credentials, IpVersion};

/// Default timeout for provider API requests
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default timeout for a single public-IP endpoint
pub const DEFAULT_IP_TIMEOUT_SECS: u64 = 10;

/// Main synchronizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Domain whose record is kept in sync (e.g., "example.com" or "home.example.com")
    pub domain: String,

    /// Proxy flag given to records this tool creates
    #[serde(default)]
    pub proxied: bool,

    /// Record type to reconcile ("A" or "AAAA")
    #[serde(default = "default_record_type")]
    pub record_type: String,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Public IP discovery configuration
    #[serde(default)]
    pub ip_discovery: IpDiscoveryConfig,
}

impl SyncConfig {
    /// Create a configuration with defaults for everything but the essentials
    pub fn new(domain: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            domain: domain.into(),
            proxied: false,
            record_type: default_record_type(),
            provider: ProviderConfig::cloudflare(credentials),
            ip_discovery: IpDiscoveryConfig::default(),
        }
    }

    /// Set the proxy flag for created records
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    /// Address family the configured record type carries
    pub fn ip_version(&self) -> Option<IpVersion> {
        IpVersion::for_record_type(&self.record_type)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_domain_name(&self.domain)?;

        if self.ip_version().is_none() {
            return Err(crate::Error::config(format!(
                "Record type '{}' is not supported. Supported types: A, AAAA",
                self.record_type
            )));
        }

        self.provider.validate()?;
        self.ip_discovery.validate()?;

        Ok(())
    }
}

fn default_record_type() -> String {
    crate::client::DEFAULT_SYNC_RECORD_TYPE.to_string()
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Account credentials
        auth: Credentials,
        /// API base URL override (None = public API)
        #[serde(default)]
        api_base: Option<String>,
        /// Request timeout in seconds
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },
}

impl ProviderConfig {
    /// Cloudflare with default base URL and timeout
    pub fn cloudflare(auth: Credentials) -> Self {
        ProviderConfig::Cloudflare {
            auth,
            api_base: None,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                auth,
                api_base,
                timeout_secs,
            } => {
                if auth.is_incomplete() {
                    return Err(crate::Error::config(
                        "Cloudflare credentials are incomplete: \
                         set an email and API key, or an API token",
                    ));
                }
                if let Some(base) = api_base {
                    validate_http_url("Cloudflare API base", base)?;
                }
                validate_timeout("Cloudflare request timeout", *timeout_secs)?;
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

/// Public IP discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpDiscoveryConfig {
    /// Endpoints in the order they are tried (empty = the HTTP crate's defaults)
    #[serde(default)]
    pub endpoints: Vec<String>,

    /// Per-endpoint request timeout in seconds
    #[serde(default = "default_ip_timeout_secs")]
    pub timeout_secs: u64,
}

impl IpDiscoveryConfig {
    /// Validate the discovery configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        for endpoint in &self.endpoints {
            validate_http_url("Public IP endpoint", endpoint)?;
        }
        validate_timeout("Public IP request timeout", self.timeout_secs)
    }
}

impl Default for IpDiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            timeout_secs: DEFAULT_IP_TIMEOUT_SECS,
        }
    }
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_ip_timeout_secs() -> u64 {
    DEFAULT_IP_TIMEOUT_SECS
}

fn validate_http_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{what} must use HTTP or HTTPS scheme. Got: {url}"
        )));
    }
    Ok(())
}

fn validate_timeout(what: &str, secs: u64) -> Result<(), crate::Error> {
    if !(1..=300).contains(&secs) {
        return Err(crate::Error::config(format!(
            "{what} must be between 1 and 300 seconds. Got: {secs}"
        )));
    }
    Ok(())
}

/// Validate that a string is a valid domain name
///
/// This implements basic DNS domain name validation per RFC 1035.
/// It's not comprehensive but catches common errors.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(crate::Error::config(format!(
            "Domain name must contain at least two labels. Got: {domain}"
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{domain}'"
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{label}'. \
                Valid: ASCII letters, digits and hyphen (use the punycode form)."
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{label}'"
            )));
        }
    }

    Ok(())
}
