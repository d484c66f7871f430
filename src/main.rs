//! `card-wallet`: offline and online helpers around the signing core.
//!
//! Every command prints one JSON `ApiResponse` on stdout. Logs go to stderr.

use anyhow::Context;
use card_wallet_core::api::{BlockTag, JsonRpcClient, NodeClient};
use card_wallet_core::config::{self, EngineConfig};
use card_wallet_core::crypto::check_public_key;
use card_wallet_core::fees::FeeEstimator;
use card_wallet_core::signing::finalize;
use card_wallet_core::tx::{build_unsigned, Broadcaster, PendingTransaction};
use card_wallet_core::utils::logging::init_logging;
use card_wallet_core::wallet::NonceTracker;
use card_wallet_core::{
    Address, ApiResponse, ChainRule, CompiledTransaction, CurveType, EvmChainRule, PublicKey, RawSignature,
    SigningHash, WalletResult,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[clap(name = "card-wallet", author, version, about, long_about = None)]
struct Opts {
    /// Chain name, overrides CARD_WALLET_CHAIN
    #[clap(long, global = true)]
    chain: Option<String>,
    /// JSON-RPC endpoint, overrides CARD_WALLET_RPC_URL
    #[clap(long, global = true)]
    rpc_url: Option<String>,
    /// Curve of the card wallet
    #[clap(long, global = true, default_value = "secp256k1")]
    curve: CurveType,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive the address of a card public key
    Address {
        #[clap(long)]
        public_key: String,
    },
    /// Build an unsigned transfer and print the hash the card must sign
    Hash(TransferArgs),
    /// Attach a card signature and print the broadcast-ready bytes
    Compile {
        #[clap(flatten)]
        transfer: TransferArgs,
        /// Uncompressed SEC1 public key of the signing wallet
        #[clap(long)]
        public_key: String,
        /// 64-byte r||s returned by the card
        #[clap(long)]
        signature: String,
    },
    /// Quote the three fee tiers for a transfer
    Fee {
        #[clap(long)]
        to: String,
        #[clap(long, default_value = "0")]
        amount: String,
    },
    /// Fetch latest and pending transaction counts
    Nonce {
        #[clap(long)]
        address: String,
    },
    /// Submit signed transaction bytes
    Broadcast {
        #[clap(long)]
        raw: String,
    },
}

#[derive(Args, Debug)]
struct TransferArgs {
    /// Amount in display units, e.g. 1.5
    #[clap(long)]
    amount: String,
    /// Total fee in display units
    #[clap(long)]
    fee: String,
    #[clap(long)]
    to: String,
    #[clap(long)]
    nonce: u64,
    /// Deduct the fee from the amount
    #[clap(long)]
    include_fee: bool,
}

#[derive(Serialize)]
struct AddressOutput {
    chain: String,
    address: Address,
    checksum_address: String,
    explorer_link: String,
    qr_payload: String,
}

#[derive(Serialize)]
struct CompileOutput {
    hash: SigningHash,
    v: u8,
    recovery_id: u8,
    transaction: CompiledTransaction,
}

#[derive(Serialize)]
struct NonceOutput {
    tracker: NonceTracker,
    has_pending_transactions: bool,
}

#[derive(Serialize)]
struct BroadcastOutput {
    tx_id: String,
    tx_hash: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let opts = Opts::parse();

    let config = load_config(&opts);
    let log_format = config.as_ref().map(|c| c.log_format).unwrap_or_default();
    init_logging(log_format, "warn").context("installing log subscriber")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = match config {
        Ok(config) => run(opts, config, &cancel).await,
        Err(e) => Err(e),
    };

    Ok(match result {
        Ok(data) => {
            println!("{}", ApiResponse::ok(data).to_json());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            println!("{}", ApiResponse::<Value>::err(e).to_json());
            ExitCode::FAILURE
        }
    })
}

/// Environment configuration with command-line overrides applied
fn load_config(opts: &Opts) -> WalletResult<EngineConfig> {
    EngineConfig::from_lookup(|name| match name {
        config::CHAIN_ENV if opts.chain.is_some() => opts.chain.clone(),
        config::RPC_URL_ENV if opts.rpc_url.is_some() => opts.rpc_url.clone(),
        _ => std::env::var(name).ok(),
    })
}

async fn run(opts: Opts, config: EngineConfig, cancel: &CancellationToken) -> WalletResult<Value> {
    let rule = EvmChainRule::new(config.chain, opts.curve)?;

    match opts.command {
        Command::Address { public_key } => {
            let public_key = PublicKey::from_hex(&public_key)?;
            check_public_key(rule.curve(), &public_key.to_sec1_uncompressed()?)?;
            let address = rule.derive_address(&public_key)?;
            to_value(AddressOutput {
                chain: rule.chain().display_name().to_string(),
                checksum_address: address.to_checksum(),
                explorer_link: rule.explorer_link(&address),
                qr_payload: rule.qr_payload(&address),
                address,
            })
        }
        Command::Hash(transfer) => to_value(build(&rule, &transfer)?),
        Command::Compile {
            transfer,
            public_key,
            signature,
        } => {
            let public_key = PublicKey::from_hex(&public_key)?;
            check_public_key(rule.curve(), &public_key.to_sec1_uncompressed()?)?;

            let pending = build(&rule, &transfer)?;
            let raw = RawSignature::from_hex(&signature)?;
            let recovered = finalize(rule.curve(), rule.recovery_ids(), &raw, &pending.hash, &public_key)?;
            to_value(CompileOutput {
                hash: pending.hash,
                v: recovered.v,
                recovery_id: recovered.recovery_id,
                transaction: rule.encode_signed(&pending.unsigned, &recovered),
            })
        }
        Command::Fee { to, amount } => {
            let node = Arc::new(JsonRpcClient::new(config.rpc_url.as_str(), config.rpc_timeout)?);
            let estimator =
                FeeEstimator::new(node, rule.gas_limit(), rule.decimals()).with_max_age(config.fee_cache_ttl);
            let destination: Address = to.parse()?;
            to_value(estimator.estimate_fee(&destination, &amount, cancel).await?)
        }
        Command::Nonce { address } => {
            let address: Address = address.parse()?;
            let node = JsonRpcClient::new(config.rpc_url.as_str(), config.rpc_timeout)?;
            let (latest, pending) = tokio::try_join!(
                node.transaction_count(&address, BlockTag::Latest),
                node.transaction_count(&address, BlockTag::Pending),
            )?;
            let mut tracker = NonceTracker::new();
            tracker.sync(latest, pending);
            to_value(NonceOutput {
                tracker,
                has_pending_transactions: tracker.has_pending_transactions(),
            })
        }
        Command::Broadcast { raw } => {
            let raw_tx = hex::decode(raw.trim().trim_start_matches("0x"))?;
            let tx = CompiledTransaction::from_raw(raw_tx);
            let node = Arc::new(JsonRpcClient::new(config.rpc_url.as_str(), config.rpc_timeout)?);
            let broadcaster = Broadcaster::new(node, config.engine_options().broadcast);
            let tx_id = broadcaster.submit(&tx, &mut NonceTracker::new(), cancel).await?;
            to_value(BroadcastOutput {
                tx_id: tx_id.to_string(),
                tx_hash: tx.tx_hash_hex(),
            })
        }
    }
}

fn build(rule: &EvmChainRule, transfer: &TransferArgs) -> WalletResult<PendingTransaction> {
    build_unsigned(
        rule,
        &transfer.amount,
        &transfer.fee,
        &transfer.to,
        transfer.nonce,
        transfer.include_fee,
    )
}

fn to_value<T: Serialize>(output: T) -> WalletResult<Value> {
    Ok(serde_json::to_value(output)?)
}
