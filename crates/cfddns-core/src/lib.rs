// # cfddns-core
//
// Core library for the cfddns record synchronizer.
//
// ## Architecture Overview
//
// This library holds everything that is independent of a concrete HTTP stack:
// - **ZoneApi**: Trait for the provider's zone/record REST operations
// - **IpFetcher**: Trait for a single GET against a public-IP discovery endpoint
// - **IpDiscovery**: Ordered fallback chain over discovery endpoints
// - **DnsSyncClient**: Zone resolution, record cache and the create-or-update
//   reconciliation step
//
// ## Flow
//
// ```text
// connect ──► list zones ──► list records (cache)
//                                   │
// sync ──► IpDiscovery ──► lookup cached record ──► create | update | no-op
// ```
//
// Everything runs sequentially on the caller's task. Nothing here spawns.

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use client::DnsSyncClient;
pub use config::{IpDiscoveryConfig, ProviderConfig, SyncConfig};
pub use discovery::IpDiscovery;
pub use error::{Error, Result};
pub use traits::{FetchedBody, IpFetcher, ZoneApi};
pub use types::{
    Credentials, DnsRecord, IpVersion, RecordLookup, RecordOptions, RecordPayload, SyncOutcome,
    Zone,
};
