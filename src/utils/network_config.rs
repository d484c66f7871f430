//! Node Endpoint Validation
//!
//! Validates JSON-RPC endpoints before an engine talks to them:
//! - URL format validation
//! - TLS requirement (plain HTTP only for local nodes)
//! - Known provider check
//! - Default public endpoints per chain

use crate::error::{WalletError, WalletResult};
use crate::types::Chain;
use url::Url;

/// Domains of well-known JSON-RPC providers
const TRUSTED_PROVIDERS: &[&str] = &[
    "infura.io",
    "alchemy.com",
    "quicknode.com",
    "ankr.com",
    "drpc.org",
    "publicnode.com",
    "llamarpc.com",
    "1rpc.io",
    "binance.org",
    "defibit.io",
    "polygon-rpc.com",
    "arbitrum.io",
    "optimism.io",
    "base.org",
    "avax.network",
];

/// Validation result for an RPC endpoint
#[derive(Debug, Clone)]
pub struct EndpointValidation {
    pub is_valid: bool,
    pub url: Option<Url>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

fn is_local_host(host: &str) -> bool {
    host == "localhost" || host == "127.0.0.1" || host == "::1" || host == "[::1]"
}

/// Check whether a host belongs to a known provider
pub fn is_trusted_provider(host: &str) -> bool {
    let host = host.to_lowercase();
    TRUSTED_PROVIDERS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

/// Validate a JSON-RPC endpoint URL
pub fn validate_rpc_endpoint(url: &str) -> EndpointValidation {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    let parsed = match Url::parse(url.trim()) {
        Ok(u) => u,
        Err(e) => {
            errors.push(format!("Invalid URL format: {}", e));
            return EndpointValidation {
                is_valid: false,
                url: None,
                warnings,
                errors,
            };
        }
    };

    let host = parsed.host_str().unwrap_or("").to_string();
    if host.is_empty() {
        errors.push("URL has no host".to_string());
    }

    match parsed.scheme() {
        "https" => {}
        "http" if is_local_host(&host) => {
            warnings.push("HTTP allowed for local development only".to_string());
        }
        "http" => errors.push("HTTPS required for remote endpoints".to_string()),
        other => errors.push(format!("Unsupported URL scheme: {}", other)),
    }

    if !host.is_empty() && !is_local_host(&host) && !is_trusted_provider(&host) {
        warnings.push(format!(
            "Domain '{}' is not in the trusted provider list. Ensure you trust this endpoint.",
            host
        ));
    }

    if host.contains("etherscan") || host.contains("polygonscan") || host.contains("bscscan") {
        warnings.push("Block explorer API - not a JSON-RPC endpoint".to_string());
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        warnings.push("Credentials in URL - consider using headers for authentication".to_string());
    }

    let is_valid = errors.is_empty();
    EndpointValidation {
        is_valid,
        url: if is_valid { Some(parsed) } else { None },
        warnings,
        errors,
    }
}

/// Validate an endpoint and turn failures into an error
pub fn require_valid_endpoint(url: &str) -> WalletResult<Url> {
    let validation = validate_rpc_endpoint(url);
    for warning in &validation.warnings {
        tracing::warn!(endpoint = %url, "{}", warning);
    }
    match validation.url {
        Some(url) => Ok(url),
        None => Err(WalletError::invalid_config("Invalid RPC endpoint")
            .with_details(validation.errors.join("; "))),
    }
}

/// Public JSON-RPC endpoints used when no endpoint is configured
pub fn default_rpc_endpoints(chain: Chain) -> &'static [&'static str] {
    match chain {
        Chain::Ethereum => &[
            "https://ethereum.publicnode.com",
            "https://eth.llamarpc.com",
            "https://rpc.ankr.com/eth",
        ],
        Chain::EthereumSepolia => &[
            "https://ethereum-sepolia-rpc.publicnode.com",
            "https://sepolia.drpc.org",
        ],
        Chain::Bnb => &[
            "https://bsc-dataseed.binance.org",
            "https://bsc-dataseed1.defibit.io",
        ],
        Chain::Polygon => &["https://polygon-rpc.com", "https://rpc.ankr.com/polygon"],
        Chain::Arbitrum => &["https://arb1.arbitrum.io/rpc", "https://arbitrum.llamarpc.com"],
        Chain::Optimism => &["https://mainnet.optimism.io", "https://optimism.llamarpc.com"],
        Chain::Base => &["https://mainnet.base.org", "https://base.llamarpc.com"],
        Chain::Avalanche => &["https://api.avax.network/ext/bc/C/rpc"],
    }
}
