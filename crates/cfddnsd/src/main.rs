// # cfddnsd - synchronize one DNS record
//
// Thin integration layer: read configuration from the environment, set up
// logging, wire the Cloudflare transport and the HTTP IP fetcher into a
// `DnsSyncClient`, run one reconciliation, print the outcome.
//
// All DNS logic lives in cfddns-core. Nothing here retries.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Credentials (one of)
// - `CFDDNS_EMAIL` + `CFDDNS_API_KEY`: account email and global API key
// - `CFDDNS_API_TOKEN`: scoped API token (wins when set)
//
// ### Record
// - `CFDDNS_DOMAIN`: domain to keep in sync (required)
// - `CFDDNS_PROXIED`: proxy newly created records (true/false/1/0/yes/no, default false)
// - `CFDDNS_RECORD_TYPE`: A or AAAA (default A)
//
// ### Transport
// - `CFDDNS_IP_ENDPOINTS`: comma-separated public-IP endpoints, tried in order
// - `CFDDNS_API_BASE`: Cloudflare API base URL override
// - `CFDDNS_HTTP_TIMEOUT_SECS`: provider request timeout (default 30)
// - `CFDDNS_IP_TIMEOUT_SECS`: public-IP request timeout (default 10)
//
// ### Logging
// - `CFDDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export CFDDNS_EMAIL=ops@example.com
// export CFDDNS_API_KEY=your_global_key
// export CFDDNS_DOMAIN=home.example.com
// export CFDDNS_PROXIED=false
//
// cfddnsd
// ```

use anyhow::{Context, Result};
use cfddns_core::config::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_IP_TIMEOUT_SECS};
use cfddns_core::{Credentials, DnsSyncClient, SyncConfig, SyncOutcome};
use cfddns_ip_http::HttpIpFetcher;
use cfddns_provider_cloudflare::CloudflareApi;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Record created, updated, or already in sync
/// - 1: Configuration or startup error
/// - 2: Runtime error (zone lookup, IP discovery, provider failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    sync: SyncConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let credentials = match var("CFDDNS_API_TOKEN") {
            Some(token) => Credentials::api_token(token),
            None => {
                let email = var("CFDDNS_EMAIL").context(
                    "CFDDNS_EMAIL is required. Set it via: export CFDDNS_EMAIL=you@example.com \
                    (or use CFDDNS_API_TOKEN)",
                )?;
                let key = var("CFDDNS_API_KEY").context(
                    "CFDDNS_API_KEY is required. Set it via: export CFDDNS_API_KEY=your_key \
                    (or use CFDDNS_API_TOKEN)",
                )?;
                Credentials::api_key(email, key)
            }
        };

        let domain = var("CFDDNS_DOMAIN").context(
            "CFDDNS_DOMAIN is required. Set it via: export CFDDNS_DOMAIN=example.com",
        )?;

        let proxied = match var("CFDDNS_PROXIED") {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("CFDDNS_PROXIED '{value}' is not a boolean"))?,
            None => false,
        };

        let mut sync = SyncConfig::new(domain, credentials).with_proxied(proxied);

        if let Some(record_type) = var("CFDDNS_RECORD_TYPE") {
            sync.record_type = record_type.to_uppercase();
        }

        if let Some(endpoints) = var("CFDDNS_IP_ENDPOINTS") {
            sync.ip_discovery.endpoints = endpoints
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        sync.ip_discovery.timeout_secs = parse_secs(
            var("CFDDNS_IP_TIMEOUT_SECS"),
            "CFDDNS_IP_TIMEOUT_SECS",
            DEFAULT_IP_TIMEOUT_SECS,
        )?;

        let cfddns_core::ProviderConfig::Cloudflare {
            api_base,
            timeout_secs,
            ..
        } = &mut sync.provider;
        *api_base = var("CFDDNS_API_BASE");
        *timeout_secs = parse_secs(
            var("CFDDNS_HTTP_TIMEOUT_SECS"),
            "CFDDNS_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        Ok(Self {
            sync,
            log_level: var("CFDDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.sync.validate()?;

        if log_level(&self.log_level).is_none() {
            anyhow::bail!(
                "CFDDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            );
        }

        for endpoint in &self.sync.ip_discovery.endpoints {
            if endpoint.starts_with("http://") {
                eprintln!(
                    "WARNING: public IP endpoint {endpoint} uses HTTP (not HTTPS). \
                    Its answer can be tampered with in transit."
                );
            }
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_secs(value: Option<String>, name: &str, default: u64) -> Result<u64> {
    match value {
        Some(v) => v
            .parse()
            .with_context(|| format!("{name} must be a number of seconds. Got: {v}")),
        None => Ok(default),
    }
}

fn log_level(name: &str) -> Option<Level> {
    match name.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config.log_level).unwrap_or(Level::INFO))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    info!("Starting cfddnsd for {}", config.sync.domain);

    // One sequential reconciliation; no worker threads needed
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run_sync(&config.sync));
    match &result {
        Ok(outcome) => println!("{outcome}"),
        Err(e) => {
            error!("Synchronization failed: {:#}", e);
            eprintln!("Error: {:#}", e);
        }
    }

    exit_code_for(&result).into()
}

/// Exit code for the result of one reconciliation
///
/// Configuration problems that only surface while wiring the client (bad
/// credentials, unsupported record type) count as configuration errors.
fn exit_code_for(result: &Result<SyncOutcome>) -> SyncExitCode {
    let Err(e) = result else {
        return SyncExitCode::Success;
    };

    match e.downcast_ref::<cfddns_core::Error>() {
        Some(cfddns_core::Error::Config(_) | cfddns_core::Error::InvalidInput(_)) => {
            SyncExitCode::ConfigError
        }
        _ => SyncExitCode::RuntimeError,
    }
}

/// Build the client and run one reconciliation
async fn run_sync(config: &SyncConfig) -> Result<SyncOutcome> {
    let version = config
        .ip_version()
        .context("record type has no address family")?;

    let api = CloudflareApi::from_config(&config.provider)?;
    let fetcher = HttpIpFetcher::from_config(&config.ip_discovery)?;
    let discovery = cfddns_ip_http::discovery_for(&config.ip_discovery, version);

    let mut client = DnsSyncClient::connect(
        Box::new(api),
        Box::new(fetcher),
        discovery,
        config.domain.clone(),
        config.proxied,
    )
    .await
    .context("Failed to connect to Cloudflare")?;

    let outcome = client.sync_dns_from_my_ip(&config.record_type).await?;
    Ok(outcome)
}
