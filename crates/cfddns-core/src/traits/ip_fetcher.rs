// # IP Fetcher Trait
//
// One HTTP GET against a public-IP discovery endpoint. Interpretation of the
// body (raw address vs. JSON `ip` field) and the fallback order belong to
// [`crate::IpDiscovery`], not to the fetcher.
//
// ## Implementations
//
// - reqwest-based: `cfddns-ip-http` crate

use async_trait::async_trait;

use crate::error::Result;

/// A buffered response from a discovery endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl FetchedBody {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Discovery only trusts a plain 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Trait for fetching a discovery endpoint
///
/// A transport failure (DNS, connect, timeout) is an `Err`. Any HTTP response,
/// whatever its status, is an `Ok`.
#[async_trait]
pub trait IpFetcher: Send + Sync {
    async fn fetch(&self, endpoint: &str) -> Result<FetchedBody>;
}
