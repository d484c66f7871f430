//! # Engine Configuration
//!
//! Configuration is read through a variable lookup, normally the process
//! environment with command-line values layered on top.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CARD_WALLET_CHAIN` | Chain name or alias | `ethereum` |
//! | `CARD_WALLET_RPC_URL` | JSON-RPC endpoint (https, or http for localhost) | First public endpoint of the chain |
//! | `CARD_WALLET_RPC_TIMEOUT_SECS` | Request timeout | `15` |
//! | `CARD_WALLET_FEE_CACHE_TTL_SECS` | Maximum age of a cached fee quote | Unset: kept until invalidated |
//! | `CARD_WALLET_LOG_FORMAT` | `text` or `json` | `text` |
//! | `RUST_LOG` | Log level filter | `info`, `warn` for the CLI |

use crate::engine::EngineOptions;
use crate::error::{WalletError, WalletResult};
use crate::tx::BroadcastConfig;
use crate::types::Chain;
use crate::utils::logging::LogFormat;
use crate::utils::network_config::{default_rpc_endpoints, require_valid_endpoint};
use std::time::Duration;
use url::Url;

pub const CHAIN_ENV: &str = "CARD_WALLET_CHAIN";
pub const RPC_URL_ENV: &str = "CARD_WALLET_RPC_URL";
pub const RPC_TIMEOUT_ENV: &str = "CARD_WALLET_RPC_TIMEOUT_SECS";
pub const FEE_CACHE_TTL_ENV: &str = "CARD_WALLET_FEE_CACHE_TTL_SECS";
pub const LOG_FORMAT_ENV: &str = "CARD_WALLET_LOG_FORMAT";

pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub chain: Chain,
    pub rpc_url: Url,
    pub rpc_timeout: Duration,
    pub fee_cache_ttl: Option<Duration>,
    pub log_format: LogFormat,
}

impl EngineConfig {
    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> WalletResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let chain: Chain = match get(CHAIN_ENV) {
            Some(name) => name.parse()?,
            None => Chain::Ethereum,
        };

        let rpc_url = match get(RPC_URL_ENV) {
            Some(url) => require_valid_endpoint(&url)?,
            None => {
                let default = default_rpc_endpoints(chain).first().ok_or_else(|| {
                    WalletError::invalid_config(format!("No default endpoint for {}; set {}", chain, RPC_URL_ENV))
                })?;
                Url::parse(default)?
            }
        };

        let rpc_timeout = Duration::from_secs(match get(RPC_TIMEOUT_ENV) {
            Some(raw) => parse_secs(RPC_TIMEOUT_ENV, &raw)?,
            None => DEFAULT_RPC_TIMEOUT_SECS,
        });
        if rpc_timeout.is_zero() {
            return Err(WalletError::invalid_config(format!("{} must be positive", RPC_TIMEOUT_ENV)));
        }

        let fee_cache_ttl = get(FEE_CACHE_TTL_ENV)
            .map(|raw| parse_secs(FEE_CACHE_TTL_ENV, &raw).map(Duration::from_secs))
            .transpose()?;

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            chain,
            rpc_url,
            rpc_timeout,
            fee_cache_ttl,
            log_format,
        })
    }

    /// Engine options derived from this configuration
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            fee_cache_ttl: self.fee_cache_ttl,
            broadcast: BroadcastConfig {
                timeout: self.rpc_timeout,
            },
        }
    }
}

fn parse_secs(name: &str, raw: &str) -> WalletResult<u64> {
    raw.parse::<u64>()
        .map_err(|_| WalletError::invalid_config(format!("{} must be a whole number of seconds, got {:?}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> WalletResult<EngineConfig> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EngineConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.chain, Chain::Ethereum);
        assert_eq!(config.rpc_url.scheme(), "https");
        assert_eq!(config.rpc_timeout, Duration::from_secs(15));
        assert_eq!(config.fee_cache_ttl, None);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (CHAIN_ENV, "polygon"),
            (RPC_URL_ENV, "http://127.0.0.1:8545"),
            (RPC_TIMEOUT_ENV, "5"),
            (FEE_CACHE_TTL_ENV, "30"),
            (LOG_FORMAT_ENV, "json"),
        ])
        .unwrap();
        assert_eq!(config.chain, Chain::Polygon);
        assert_eq!(config.rpc_url.as_str(), "http://127.0.0.1:8545/");
        assert_eq!(config.fee_cache_ttl, Some(Duration::from_secs(30)));
        assert_eq!(config.engine_options().broadcast.timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        for vars in [
            vec![(CHAIN_ENV, "dogecoin")],
            vec![(RPC_URL_ENV, "http://node.example.com")],
            vec![(RPC_TIMEOUT_ENV, "0")],
            vec![(RPC_TIMEOUT_ENV, "soon")],
            vec![(FEE_CACHE_TTL_ENV, "-1")],
        ] {
            let err = load(&vars).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidConfig, "{:?}", vars);
        }
    }
}
