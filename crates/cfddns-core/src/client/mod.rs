//! The record synchronizer
//!
//! [`DnsSyncClient`] resolves the zone that owns a domain, keeps an in-memory
//! copy of that zone's records, and reconciles one address record against
//! the caller's public IP.
//!
//! ## Cache
//!
//! The record list is fetched once at [`DnsSyncClient::connect`] and again on
//! [`DnsSyncClient::refresh`]. Creates, updates and deletes are mirrored into
//! it from the provider's responses, so lookups never hit the network.
//!
//! ## Reconciliation
//!
//! ```text
//! discover IP ──► lookup (type, domain)
//!                   ├─ NotFound                 → create   (configured proxy flag)
//!                   ├─ Found, content differs   → update   (record's own proxy flag/TTL)
//!                   └─ Found, content matches   → no-op
//! ```

use std::net::IpAddr;

use tracing::{debug, info};

use crate::discovery::IpDiscovery;
use crate::error::{Error, Result};
use crate::traits::{IpFetcher, ZoneApi};
use crate::types::{
    DnsRecord, IpVersion, RecordLookup, RecordOptions, RecordPayload, SyncOutcome, Zone,
};

/// Record type reconciled when the caller has no preference
pub const DEFAULT_SYNC_RECORD_TYPE: &str = "A";

/// Synchronizes one domain's address record with the caller's public IP
pub struct DnsSyncClient {
    /// Provider transport
    api: Box<dyn ZoneApi>,

    /// Transport for public-IP endpoints
    fetcher: Box<dyn IpFetcher>,

    /// Ordered discovery endpoints
    discovery: IpDiscovery,

    /// Configured domain (full name, also the record name)
    domain: String,

    /// Proxy flag for records created by sync
    proxied: bool,

    /// Zone owning `domain`
    zone: Zone,

    /// Cached records of `zone`
    records: Vec<DnsRecord>,
}

impl std::fmt::Debug for DnsSyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsSyncClient")
            .field("provider", &self.api.provider_name())
            .field("domain", &self.domain)
            .field("proxied", &self.proxied)
            .field("zone", &self.zone)
            .field("records", &self.records.len())
            .finish()
    }
}

impl DnsSyncClient {
    /// Resolve the zone for `domain` and load its records
    ///
    /// Issues two provider calls (list zones, list records). Fails with
    /// [`Error::ZoneNotFound`] when no zone matches. The domain is stored
    /// lowercased without a trailing dot, the form the provider reports.
    pub async fn connect(
        api: Box<dyn ZoneApi>,
        fetcher: Box<dyn IpFetcher>,
        discovery: IpDiscovery,
        domain: impl Into<String>,
        proxied: bool,
    ) -> Result<Self> {
        let domain = normalize_domain(&domain.into());
        let (zone, records) = resolve_zone(api.as_ref(), &domain).await?;

        Ok(Self {
            api,
            fetcher,
            discovery,
            domain,
            proxied,
            zone,
            records,
        })
    }

    /// Re-fetch the zone and its records, replacing the cache wholesale
    pub async fn refresh(&mut self) -> Result<()> {
        let (zone, records) = resolve_zone(self.api.as_ref(), &self.domain).await?;
        self.zone = zone;
        self.records = records;
        Ok(())
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Proxy flag given to records created by sync
    pub fn proxied(&self) -> bool {
        self.proxied
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Cached records, in provider order
    pub fn records(&self) -> &[DnsRecord] {
        &self.records
    }

    /// Look a (type, name) pair up in the cache; the first match wins
    pub fn find_record(&self, record_type: &str, name: &str) -> RecordLookup<'_> {
        match self.records.iter().find(|r| r.matches(record_type, name)) {
            Some(record) => RecordLookup::Found(record),
            None => RecordLookup::NotFound,
        }
    }

    /// Like [`find_record`](Self::find_record), but absence is an error
    pub fn get_record(&self, record_type: &str, name: &str) -> Result<&DnsRecord> {
        self.find_record(record_type, name)
            .found()
            .ok_or_else(|| Error::record_not_found(record_type, name))
    }

    /// Create a record and append it to the cache
    ///
    /// Not idempotent: calling twice creates two records.
    pub async fn create_record(
        &mut self,
        record_type: &str,
        name: &str,
        content: &str,
        options: &RecordOptions,
    ) -> Result<DnsRecord> {
        let payload = RecordPayload::new(record_type, name, content, options);
        let created = self.api.create_record(&self.zone.id, &payload).await?;

        info!(
            "DNS record successfully created: {} {} -> {}",
            created.record_type, created.name, created.content
        );
        self.records.push(created.clone());
        Ok(created)
    }

    /// Overwrite an existing record; [`Error::RecordNotFound`] if there is none
    pub async fn update_record(
        &mut self,
        record_type: &str,
        name: &str,
        content: &str,
        options: &RecordOptions,
    ) -> Result<DnsRecord> {
        let record_id = self.get_record(record_type, name)?.id.clone();
        let payload = RecordPayload::new(record_type, name, content, options);
        self.update_by_id(&record_id, &payload).await
    }

    /// Update the record if it exists, create it otherwise
    ///
    /// Repeated calls converge on a single record holding `content`.
    pub async fn create_or_update_record(
        &mut self,
        record_type: &str,
        name: &str,
        content: &str,
        options: &RecordOptions,
    ) -> Result<DnsRecord> {
        let existing_id = self
            .find_record(record_type, name)
            .found()
            .map(|record| record.id.clone());

        match existing_id {
            Some(record_id) => {
                let payload = RecordPayload::new(record_type, name, content, options);
                self.update_by_id(&record_id, &payload).await
            }
            None => self.create_record(record_type, name, content, options).await,
        }
    }

    /// Delete a record and drop it from the cache, returning its id
    pub async fn delete_record(&mut self, record_type: &str, name: &str) -> Result<String> {
        let record_id = self.get_record(record_type, name)?.id.clone();
        let deleted_id = self.api.delete_record(&self.zone.id, &record_id).await?;

        self.records.retain(|record| record.id != record_id);
        info!("DNS record deleted: {} {} ({})", record_type, name, deleted_id);
        Ok(deleted_id)
    }

    /// Point the domain's `record_type` record at the caller's public IP
    ///
    /// Creates the record when missing, rewrites it when stale, and sends
    /// nothing when it already matches. `record_type` must be `A` or `AAAA`.
    pub async fn sync_dns_from_my_ip(&mut self, record_type: &str) -> Result<SyncOutcome> {
        let version = IpVersion::for_record_type(record_type).ok_or_else(|| {
            Error::invalid_input(format!(
                "cannot sync a {record_type} record from an IP address (use A or AAAA)"
            ))
        })?;

        let ip = self
            .discovery
            .for_version(version)
            .discover(self.fetcher.as_ref())
            .await?;
        let address = ip.to_string();

        let stale = match self.find_record(record_type, &self.domain) {
            RecordLookup::NotFound => None,
            RecordLookup::Found(record) if holds_address(record, ip) => {
                info!(
                    "{} record {} already points at {}",
                    record_type, self.domain, address
                );
                return Ok(SyncOutcome::Unchanged { content: address });
            }
            RecordLookup::Found(record) => Some(record.clone()),
        };

        let domain = self.domain.clone();
        match stale {
            None => {
                debug!("No {} record for {}, creating one", record_type, domain);
                let options = RecordOptions::automatic().with_proxied(self.proxied);
                let record = self
                    .create_record(record_type, &domain, &address, &options)
                    .await?;
                Ok(SyncOutcome::Created { record })
            }
            Some(previous) => {
                let payload = RecordPayload::new(
                    record_type,
                    &domain,
                    &address,
                    &RecordOptions::preserving(&previous),
                );
                let record = self.update_by_id(&previous.id, &payload).await?;
                info!(
                    "Successfully updated IP address from {} to {}",
                    previous.content, address
                );
                Ok(SyncOutcome::Updated {
                    previous: previous.content,
                    current: address,
                    record,
                })
            }
        }
    }

    async fn update_by_id(
        &mut self,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<DnsRecord> {
        let updated = self
            .api
            .update_record(&self.zone.id, record_id, payload)
            .await?;

        match self.records.iter_mut().find(|record| record.id == record_id) {
            Some(cached) => *cached = updated.clone(),
            None => self.records.push(updated.clone()),
        }

        info!(
            "DNS record successfully updated: {} {} -> {}",
            updated.record_type, updated.name, updated.content
        );
        Ok(updated)
    }
}

/// Canonical form of a DNS name: ASCII-lowercase, no trailing dot
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Name of the zone expected to own `domain`
///
/// A three-label domain (`sub.example.com`) is served by its apex zone
/// (`example.com`). Any other domain is looked up as-is; deeper names are not
/// stripped.
pub fn zone_lookup_name(domain: &str) -> &str {
    let domain = domain.trim_end_matches('.');
    if domain.split('.').count() == 3
        && let Some((_, apex)) = domain.split_once('.')
    {
        return apex;
    }
    domain
}

async fn resolve_zone(api: &dyn ZoneApi, domain: &str) -> Result<(Zone, Vec<DnsRecord>)> {
    let lookup = zone_lookup_name(domain);
    debug!(
        "Resolving {} zone for {} (zone name: {})",
        api.provider_name(),
        domain,
        lookup
    );

    let zone = api
        .list_zones()
        .await?
        .into_iter()
        .find(|zone| zone.name.trim_end_matches('.').eq_ignore_ascii_case(lookup))
        .ok_or_else(|| Error::zone_not_found(domain))?;

    let records = api.list_records(&zone.id).await?;
    debug!(
        "Zone {} ({}) has {} record(s)",
        zone.name,
        zone.id,
        records.len()
    );
    Ok((zone, records))
}

fn holds_address(record: &DnsRecord, ip: IpAddr) -> bool {
    match record.content.trim().parse::<IpAddr>() {
        Ok(current) => current == ip,
        Err(_) => record.content == ip.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apex_domain_is_its_own_zone() {
        assert_eq!(zone_lookup_name("example.com"), "example.com");
        assert_eq!(zone_lookup_name("example.com."), "example.com");
    }

    #[test]
    fn three_labels_strip_the_leftmost() {
        assert_eq!(zone_lookup_name("home.example.com"), "example.com");
    }

    #[test]
    fn domains_are_normalized() {
        assert_eq!(normalize_domain("Home.Example.COM."), "home.example.com");
        assert_eq!(normalize_domain("example.com"), "example.com");
    }

    #[test]
    fn deeper_names_are_not_stripped() {
        assert_eq!(zone_lookup_name("a.b.example.com"), "a.b.example.com");
    }

    #[test]
    fn address_comparison_is_semantic() {
        let record = DnsRecord {
            id: "r".to_string(),
            record_type: "AAAA".to_string(),
            name: "example.com".to_string(),
            content: "2001:0db8:0000:0000:0000:0000:0000:0001".to_string(),
            ttl: 1,
            proxied: false,
        };
        assert!(holds_address(&record, "2001:db8::1".parse().unwrap()));
        assert!(!holds_address(&record, "2001:db8::2".parse().unwrap()));
    }
}
