//! Test doubles and common utilities for contract tests
//!
//! `MockZoneApi` behaves like a tiny in-memory provider and counts every
//! call; `ScriptedIpFetcher` answers discovery endpoints from a script and
//! records the order they were tried in. Both are cheap to clone and clones
//! share state, so a test keeps one handle while the client owns the other.

#![allow(dead_code)]

use cfddns_core::error::{Error, Result};
use cfddns_core::traits::{FetchedBody, IpFetcher, ZoneApi};
use cfddns_core::types::{DnsRecord, RecordPayload, Zone};
use cfddns_core::{DnsSyncClient, IpDiscovery};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ProviderState {
    zones: Mutex<Vec<Zone>>,
    records: Mutex<HashMap<String, Vec<DnsRecord>>>,
    next_id: AtomicUsize,
    list_zones_calls: AtomicUsize,
    list_records_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    payloads: Mutex<Vec<RecordPayload>>,
    fail_list_zones: Mutex<Option<(u16, String)>>,
}

/// An in-memory provider that tracks calls
#[derive(Clone, Default)]
pub struct MockZoneApi {
    state: Arc<ProviderState>,
}

impl MockZoneApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone with no records
    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.state.zones.lock().unwrap().push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.state
            .records
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default();
        self
    }

    /// Add a record to an existing zone
    pub fn with_record(self, zone_id: &str, record: DnsRecord) -> Self {
        self.insert_record(zone_id, record);
        self
    }

    /// Make list_zones fail with the given status and message
    pub fn failing_list_zones(self, status: u16, message: &str) -> Self {
        *self.state.fail_list_zones.lock().unwrap() = Some((status, message.to_string()));
        self
    }

    /// Mutate provider state behind the client's back
    pub fn insert_record(&self, zone_id: &str, record: DnsRecord) {
        self.state
            .records
            .lock()
            .unwrap()
            .entry(zone_id.to_string())
            .or_default()
            .push(record);
    }

    /// Provider-side records of a zone
    pub fn stored_records(&self, zone_id: &str) -> Vec<DnsRecord> {
        self.state
            .records
            .lock()
            .unwrap()
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn list_zones_calls(&self) -> usize {
        self.state.list_zones_calls.load(Ordering::SeqCst)
    }

    pub fn list_records_calls(&self) -> usize {
        self.state.list_records_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.state.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.state.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.state.delete_calls.load(Ordering::SeqCst)
    }

    /// Creates + updates + deletes
    pub fn write_calls(&self) -> usize {
        self.create_calls() + self.update_calls() + self.delete_calls()
    }

    /// Payloads sent with create and update calls, in order
    pub fn payloads(&self) -> Vec<RecordPayload> {
        self.state.payloads.lock().unwrap().clone()
    }

    fn record_from(id: String, payload: &RecordPayload) -> DnsRecord {
        DnsRecord {
            id,
            record_type: payload.record_type.clone(),
            name: payload.name.clone(),
            content: payload.content.clone(),
            ttl: payload.ttl.unwrap_or(1),
            proxied: payload.proxied,
        }
    }
}

#[async_trait::async_trait]
impl ZoneApi for MockZoneApi {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.state.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((status, message)) = self.state.fail_list_zones.lock().unwrap().clone() {
            return Err(Error::provider_request(Some(status), message));
        }
        Ok(self.state.zones.lock().unwrap().clone())
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        self.state.list_records_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stored_records(zone_id))
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<DnsRecord> {
        self.state.create_calls.fetch_add(1, Ordering::SeqCst);
        self.state.payloads.lock().unwrap().push(payload.clone());

        let id = format!(
            "rec-{}",
            self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1
        );
        let record = Self::record_from(id, payload);
        self.insert_record(zone_id, record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<DnsRecord> {
        self.state.update_calls.fetch_add(1, Ordering::SeqCst);
        self.state.payloads.lock().unwrap().push(payload.clone());

        let mut records = self.state.records.lock().unwrap();
        let stored = records
            .get_mut(zone_id)
            .and_then(|zone| zone.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| Error::provider_request(Some(404), "Record does not exist"))?;

        *stored = Self::record_from(record_id.to_string(), payload);
        Ok(stored.clone())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<String> {
        self.state.delete_calls.fetch_add(1, Ordering::SeqCst);

        let mut records = self.state.records.lock().unwrap();
        let zone = records
            .get_mut(zone_id)
            .ok_or_else(|| Error::provider_request(Some(404), "Zone does not exist"))?;
        let before = zone.len();
        zone.retain(|r| r.id != record_id);
        if zone.len() == before {
            return Err(Error::provider_request(Some(404), "Record does not exist"));
        }
        Ok(record_id.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// How a scripted endpoint answers
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Transport failure
    Unreachable,
    /// Any HTTP response
    Respond(u16, String),
}

/// An IpFetcher that answers from a script and records the call order
#[derive(Clone, Default)]
pub struct ScriptedIpFetcher {
    script: Arc<Mutex<HashMap<String, Scripted>>>,
    tried: Arc<Mutex<Vec<String>>>,
}

impl ScriptedIpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, endpoint: &str, status: u16, body: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Scripted::Respond(status, body.to_string()));
        self
    }

    pub fn unreachable(self, endpoint: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Scripted::Unreachable);
        self
    }

    /// Endpoints in the order they were fetched
    pub fn tried(&self) -> Vec<String> {
        self.tried.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IpFetcher for ScriptedIpFetcher {
    async fn fetch(&self, endpoint: &str) -> Result<FetchedBody> {
        self.tried.lock().unwrap().push(endpoint.to_string());

        match self.script.lock().unwrap().get(endpoint).cloned() {
            Some(Scripted::Respond(status, body)) => Ok(FetchedBody::new(status, body)),
            Some(Scripted::Unreachable) | None => {
                Err(Error::http(format!("connection refused: {endpoint}")))
            }
        }
    }
}

/// Build an A record
pub fn a_record(id: &str, name: &str, content: &str, proxied: bool) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: "A".to_string(),
        name: name.to_string(),
        content: content.to_string(),
        ttl: 1,
        proxied,
    }
}

/// Endpoint list used by most tests
pub fn endpoints(urls: &[&str]) -> IpDiscovery {
    IpDiscovery::v4(urls.iter().map(|u| u.to_string()).collect())
}

/// A fetcher whose only endpoint reports `ip`
pub fn fetcher_reporting(ip: &str) -> (ScriptedIpFetcher, IpDiscovery) {
    let fetcher = ScriptedIpFetcher::new().respond("https://ip.test/", 200, ip);
    (fetcher, endpoints(&["https://ip.test/"]))
}

/// Connect a client over the given doubles
pub async fn connect(
    api: &MockZoneApi,
    fetcher: &ScriptedIpFetcher,
    discovery: IpDiscovery,
    domain: &str,
    proxied: bool,
) -> Result<DnsSyncClient> {
    DnsSyncClient::connect(
        Box::new(api.clone()),
        Box::new(fetcher.clone()),
        discovery,
        domain,
        proxied,
    )
    .await
}
