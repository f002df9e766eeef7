//! Data model shared by the client, the provider transport and the binary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// TTL value the provider interprets as "automatic"
pub const AUTOMATIC_TTL: u32 = 1;

/// Account credentials used to authenticate every provider request
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the key or token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// Global API key, sent as `X-Auth-Email` + `X-Auth-Key`
    ApiKey {
        /// Account email
        email: String,
        /// Global API key
        key: String,
    },

    /// Scoped API token, sent as `Authorization: Bearer <token>`
    ApiToken {
        /// API token
        token: String,
    },
}

impl Credentials {
    /// Email + global API key authentication
    pub fn api_key(email: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ApiKey {
            email: email.into(),
            key: key.into(),
        }
    }

    /// Bearer token authentication
    pub fn api_token(token: impl Into<String>) -> Self {
        Self::ApiToken {
            token: token.into(),
        }
    }

    /// True when any secret part is missing
    pub fn is_incomplete(&self) -> bool {
        match self {
            Credentials::ApiKey { email, key } => email.trim().is_empty() || key.trim().is_empty(),
            Credentials::ApiToken { token } => token.trim().is_empty(),
        }
    }
}

// Custom Debug implementation that hides the secrets
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey { email, .. } => f
                .debug_struct("ApiKey")
                .field("email", email)
                .field("key", &"<REDACTED>")
                .finish(),
            Credentials::ApiToken { .. } => f
                .debug_struct("ApiToken")
                .field("token", &"<REDACTED>")
                .finish(),
        }
    }
}

/// A provider zone (one registered domain)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// A DNS record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
}

fn default_ttl() -> u32 {
    AUTOMATIC_TTL
}

impl DnsRecord {
    /// (type, name) match; names compare like DNS names do
    pub fn matches(&self, record_type: &str, name: &str) -> bool {
        self.record_type == record_type
            && self
                .name
                .trim_end_matches('.')
                .eq_ignore_ascii_case(name.trim_end_matches('.'))
    }
}

/// Caller-supplied options for create/update
///
/// `ttl: None` or `Some(1)` both mean "automatic".
/// `proxied: None` means not proxied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOptions {
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub proxied: Option<bool>,
}

impl RecordOptions {
    /// Automatic TTL, not proxied
    pub fn automatic() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = Some(proxied);
        self
    }

    /// Options that reproduce an existing record's TTL and proxy flag
    pub fn preserving(record: &DnsRecord) -> Self {
        Self {
            ttl: Some(record.ttl),
            proxied: Some(record.proxied),
        }
    }
}

/// Body of a create or update request
///
/// `ttl` is left out entirely when automatic; `proxied` is always explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPayload {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    pub proxied: bool,
}

impl RecordPayload {
    pub fn new(record_type: &str, name: &str, content: &str, options: &RecordOptions) -> Self {
        Self {
            record_type: record_type.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ttl: options.ttl.filter(|ttl| *ttl != AUTOMATIC_TTL),
            proxied: options.proxied.unwrap_or(false),
        }
    }
}

/// Result of looking a (type, name) pair up in the record cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLookup<'a> {
    Found(&'a DnsRecord),
    NotFound,
}

impl<'a> RecordLookup<'a> {
    pub fn found(self) -> Option<&'a DnsRecord> {
        match self {
            RecordLookup::Found(record) => Some(record),
            RecordLookup::NotFound => None,
        }
    }
}

/// IP version a discovered address must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Address family an address record of `record_type` carries
    pub fn for_record_type(record_type: &str) -> Option<Self> {
        match record_type {
            "A" => Some(IpVersion::V4),
            "AAAA" => Some(IpVersion::V6),
            _ => None,
        }
    }

    pub fn accepts(self, ip: &IpAddr) -> bool {
        match self {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
        }
    }
}

/// What `sync_dns_from_my_ip` ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No record existed; one was created
    Created { record: DnsRecord },
    /// The record held a different address and was rewritten
    Updated {
        previous: String,
        current: String,
        record: DnsRecord,
    },
    /// The record already held the discovered address
    Unchanged { content: String },
}

impl SyncOutcome {
    /// True when a write was sent to the provider
    pub fn wrote(&self) -> bool {
        !matches!(self, SyncOutcome::Unchanged { .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Created { record } => write!(
                f,
                "DNS record successfully created: {} {} -> {}",
                record.record_type, record.name, record.content
            ),
            SyncOutcome::Updated {
                previous, current, ..
            } => write!(
                f,
                "Successfully updated IP address from {previous} to {current}"
            ),
            SyncOutcome::Unchanged { content } => write!(
                f,
                "DNS record is already in sync with the current address {content}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(proxied: bool, ttl: u32) -> DnsRecord {
        DnsRecord {
            id: "r1".to_string(),
            record_type: "A".to_string(),
            name: "example.com".to_string(),
            content: "1.2.3.4".to_string(),
            ttl,
            proxied,
        }
    }

    #[test]
    fn payload_omits_automatic_ttl() {
        let payload =
            RecordPayload::new("A", "example.com", "1.2.3.4", &RecordOptions::automatic());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "A",
                "name": "example.com",
                "content": "1.2.3.4",
                "proxied": false,
            })
        );

        let sentinel = RecordOptions::automatic().with_ttl(AUTOMATIC_TTL);
        let payload = RecordPayload::new("A", "example.com", "1.2.3.4", &sentinel);
        assert_eq!(payload.ttl, None);
    }

    #[test]
    fn payload_carries_explicit_ttl_and_proxy() {
        let options = RecordOptions::automatic().with_ttl(300).with_proxied(true);
        let payload = RecordPayload::new("A", "example.com", "1.2.3.4", &options);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["ttl"], 300);
        assert_eq!(json["proxied"], true);
    }

    #[test]
    fn preserving_copies_ttl_and_proxy() {
        let options = RecordOptions::preserving(&record(true, 120));
        assert_eq!(options.ttl, Some(120));
        assert_eq!(options.proxied, Some(true));
    }

    #[test]
    fn record_deserializes_with_missing_optional_fields() {
        let record: DnsRecord = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "type": "A",
            "name": "example.com",
            "content": "1.2.3.4",
            "zone_name": "example.com",
            "locked": false,
        }))
        .unwrap();

        assert_eq!(record.ttl, AUTOMATIC_TTL);
        assert!(!record.proxied);
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let key = Credentials::api_key("ops@example.com", "secret_key_12345");
        let token = Credentials::api_token("secret_token_12345");

        let key_dbg = format!("{:?}", key);
        let token_dbg = format!("{:?}", token);

        assert!(key_dbg.contains("ops@example.com"));
        assert!(!key_dbg.contains("secret_key"));
        assert!(!token_dbg.contains("secret_token"));
    }

    #[test]
    fn incomplete_credentials_are_detected() {
        assert!(Credentials::api_key("", "k").is_incomplete());
        assert!(Credentials::api_key("a@b.c", " ").is_incomplete());
        assert!(Credentials::api_token("").is_incomplete());
        assert!(!Credentials::api_token("t").is_incomplete());
    }

    #[test]
    fn ip_version_follows_record_type() {
        assert_eq!(IpVersion::for_record_type("A"), Some(IpVersion::V4));
        assert_eq!(IpVersion::for_record_type("AAAA"), Some(IpVersion::V6));
        assert_eq!(IpVersion::for_record_type("CNAME"), None);
    }

    #[test]
    fn outcome_status_lines() {
        let unchanged = SyncOutcome::Unchanged {
            content: "1.2.3.4".to_string(),
        };
        assert!(unchanged.to_string().contains("already in sync"));
        assert!(!unchanged.wrote());

        let updated = SyncOutcome::Updated {
            previous: "9.9.9.9".to_string(),
            current: "1.2.3.4".to_string(),
            record: record(false, 1),
        };
        assert_eq!(
            updated.to_string(),
            "Successfully updated IP address from 9.9.9.9 to 1.2.3.4"
        );
        assert!(updated.wrote());
    }
}
