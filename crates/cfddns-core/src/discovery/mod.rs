//! Public IP discovery
//!
//! Walks an ordered list of endpoints and returns the first address that
//! validates. Each endpoint is tried at most once per call:
//!
//! 1. Transport failure → next endpoint
//! 2. Status other than 200 → next endpoint
//! 3. Body is a bare address of the wanted family → done
//! 4. Body is JSON with a string `ip` field holding such an address → done
//! 5. Otherwise → next endpoint
//!
//! Running out of endpoints is [`Error::IpDiscoveryExhausted`].

use std::net::IpAddr;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::traits::IpFetcher;
use crate::types::IpVersion;

/// Ordered fallback chain over public-IP endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpDiscovery {
    endpoints: Vec<String>,
    version: IpVersion,
}

impl IpDiscovery {
    /// Create a chain that looks for addresses of `version`
    pub fn new(endpoints: Vec<String>, version: IpVersion) -> Self {
        Self { endpoints, version }
    }

    /// Chain for IPv4 (A records)
    pub fn v4(endpoints: Vec<String>) -> Self {
        Self::new(endpoints, IpVersion::V4)
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn version(&self) -> IpVersion {
        self.version
    }

    /// Same endpoints, different address family
    pub fn for_version(&self, version: IpVersion) -> Self {
        Self {
            endpoints: self.endpoints.clone(),
            version,
        }
    }

    /// Discover the caller's public address
    pub async fn discover(&self, fetcher: &dyn IpFetcher) -> Result<IpAddr> {
        for endpoint in &self.endpoints {
            debug!("Querying public IP endpoint: {}", endpoint);

            let fetched = match fetcher.fetch(endpoint).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("Public IP endpoint {} unreachable: {}", endpoint, e);
                    continue;
                }
            };

            if !fetched.is_ok() {
                warn!(
                    "Public IP endpoint {} answered HTTP {}",
                    endpoint, fetched.status
                );
                continue;
            }

            match parse_ip_body(&fetched.body, self.version) {
                Some(ip) => {
                    info!("Discovered public IP {} via {}", ip, endpoint);
                    return Ok(ip);
                }
                None => {
                    warn!(
                        "Public IP endpoint {} returned no usable {:?} address",
                        endpoint, self.version
                    );
                }
            }
        }

        Err(Error::IpDiscoveryExhausted {
            attempted: self.endpoints.len(),
        })
    }
}

/// Interpret a discovery response body
///
/// Accepts either a bare address (surrounding whitespace ignored) or a JSON
/// object whose `ip` field is a string holding one. The address must belong
/// to `version`; IPv4 must be a plain dotted quad.
pub fn parse_ip_body(body: &str, version: IpVersion) -> Option<IpAddr> {
    let text = body.trim();

    if let Some(ip) = parse_address(text, version) {
        return Some(ip);
    }

    let json: Value = serde_json::from_str(text).ok()?;
    let ip = json.get("ip")?.as_str()?;
    parse_address(ip.trim(), version)
}

fn parse_address(text: &str, version: IpVersion) -> Option<IpAddr> {
    let ip: IpAddr = text.parse().ok()?;
    version.accepts(&ip).then_some(ip)
}
