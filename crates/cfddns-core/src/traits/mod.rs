//! Core traits for the cfddns system
//!
//! This module defines the abstract interfaces the client drives.
//!
//! - [`ZoneApi`]: The provider's zone/record REST operations
//! - [`IpFetcher`]: One GET against a public-IP discovery endpoint

pub mod ip_fetcher;
pub mod zone_api;

pub use ip_fetcher::{FetchedBody, IpFetcher};
pub use zone_api::ZoneApi;
