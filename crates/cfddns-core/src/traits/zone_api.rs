// # Zone API Trait
//
// Defines the interface to a DNS provider's zone and record REST resources.
//
// ## Implementations
//
// - Cloudflare: `cfddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::ZoneApi;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* ZoneApi implementation */;
//
//     for zone in api.list_zones().await? {
//         println!("{} {}", zone.id, zone.name);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DnsRecord, RecordPayload, Zone};

/// Trait for provider transports
///
/// Every method is exactly one logical provider operation. Implementations
/// must not retry, must not cache, and must map any non-success response to
/// [`crate::Error::ProviderRequestFailed`] carrying the provider's message.
/// The caller ([`crate::DnsSyncClient`]) owns the record cache.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// List every zone visible to the credentials
    async fn list_zones(&self) -> Result<Vec<Zone>>;

    /// List every record in a zone
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>>;

    /// Create a record and return it as stored by the provider
    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<DnsRecord>;

    /// Overwrite a record addressed by id and return the stored result
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<DnsRecord>;

    /// Delete a record addressed by id, returning the id the provider confirmed
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<String>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
