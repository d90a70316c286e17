use std::env;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::receipts::{self, CHAIN_ID_DEFAULT};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required value: pass the flag or set env var {0}")]
    MissingEnvVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Which batch verification entry point to benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchFn {
    /// verifyReceiptsBatchBitsetBytes(bytes) — packs results into a bytes32 bitset
    Bitset,
    /// verifyReceiptsBatchBytes(bytes) — returns a bool array
    Bool,
}

#[derive(Debug, Parser)]
#[command(name = "anchor-gas-bench", about = "Gas benchmarks for the hardware anchor contract")]
pub struct Cli {
    /// Target contract address (env: CONTRACT_ADDRESS)
    #[arg(long)]
    pub contract: Option<String>,

    /// JSON-RPC endpoint (env: RPC_URL)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Signer private key (env: PRIVATE_KEY)
    #[arg(long)]
    pub private_key: Option<String>,

    /// 32-byte hex hardware id (env: HW_ID)
    #[arg(long)]
    pub hw_id: Option<String>,

    /// 32-byte hex firmware hash (env: FW_HASH)
    #[arg(long)]
    pub fw_hash: Option<String>,

    /// Chain id (env: CHAIN_ID)
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// Run one-time setup calls (initialize, authorizeNode, approveFirmware) first
    #[arg(long)]
    pub setup: bool,

    /// Batch verification signature variant
    #[arg(long, value_enum, default_value = "bitset")]
    pub batch_fn: BatchFn,

    /// Comma-separated batch sizes
    #[arg(long, default_value = "5,10,20,50")]
    pub sizes: String,

    /// Per-transaction gas limit passed to cast
    #[arg(long, default_value_t = 5_000_000)]
    pub gas_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub contract: String,
    pub rpc_url: String,
    pub private_key: String,
    pub hw_id_hex: String,
    pub fw_hash_hex: String,
    pub hw_id: [u8; 32],
    pub fw_hash: [u8; 32],
    pub chain_id: u64,
    pub setup: bool,
    pub batch_fn: BatchFn,
    pub sizes: Vec<u64>,
    pub gas_limit: u64,
}

impl Config {
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve_with(cli, |name| env::var(name).ok())
    }

    /// Resolution with an injectable environment, so tests don't have to
    /// mutate process-global env vars.
    pub fn resolve_with(
        cli: &Cli,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let contract = required(&cli.contract, &env, "CONTRACT_ADDRESS")?;
        let rpc_url = required(&cli.rpc_url, &env, "RPC_URL")?;
        let private_key = required(&cli.private_key, &env, "PRIVATE_KEY")?;
        let hw_id_hex = required(&cli.hw_id, &env, "HW_ID")?;
        let fw_hash_hex = required(&cli.fw_hash, &env, "FW_HASH")?;

        let hw_id = receipts::hex32_to_bytes(&hw_id_hex)
            .map_err(|e| ConfigError::InvalidValue("HW_ID", e.to_string()))?;
        let fw_hash = receipts::hex32_to_bytes(&fw_hash_hex)
            .map_err(|e| ConfigError::InvalidValue("FW_HASH", e.to_string()))?;

        let chain_id = match cli.chain_id {
            Some(id) => id,
            None => match env("CHAIN_ID") {
                Some(v) => v
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("CHAIN_ID", v))?,
                None => CHAIN_ID_DEFAULT,
            },
        };

        let mut sizes = Vec::new();
        for tok in cli.sizes.split(',') {
            let tok = tok.trim();
            if tok.is_empty() {
                continue;
            }
            let n: u64 = tok
                .parse()
                .map_err(|_| ConfigError::InvalidValue("--sizes", tok.to_string()))?;
            if n == 0 {
                return Err(ConfigError::InvalidValue("--sizes", tok.to_string()));
            }
            sizes.push(n);
        }

        Ok(Self {
            contract,
            rpc_url,
            private_key,
            hw_id_hex,
            fw_hash_hex,
            hw_id,
            fw_hash,
            chain_id,
            setup: cli.setup,
            batch_fn: cli.batch_fn,
            sizes,
            gas_limit: cli.gas_limit,
        })
    }
}

fn required(
    flag: &Option<String>,
    env: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    if let Some(v) = flag {
        if !v.is_empty() {
            return Ok(v.clone());
        }
    }
    match env(var) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnvVar(var)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_cli() -> Cli {
        Cli::parse_from(["anchor-gas-bench"])
    }

    fn full_env() -> HashMap<&'static str, String> {
        let hex32 = "ab".repeat(32);
        HashMap::from([
            ("CONTRACT_ADDRESS", "0xcafe".to_string()),
            ("RPC_URL", "http://localhost:8547".to_string()),
            ("PRIVATE_KEY", "0xkey".to_string()),
            ("HW_ID", hex32.clone()),
            ("FW_HASH", format!("0x{hex32}")),
        ])
    }

    #[test]
    fn env_fallbacks_fill_missing_flags() {
        let env = full_env();
        let cfg = Config::resolve_with(&base_cli(), |k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.contract, "0xcafe");
        assert_eq!(cfg.hw_id, [0xab; 32]);
        assert_eq!(cfg.fw_hash, [0xab; 32]);
        assert_eq!(cfg.chain_id, CHAIN_ID_DEFAULT);
        assert_eq!(cfg.sizes, vec![5, 10, 20, 50]);
        assert_eq!(cfg.gas_limit, 5_000_000);
        assert_eq!(cfg.batch_fn, BatchFn::Bitset);
        assert!(!cfg.setup);
    }

    #[test]
    fn flag_wins_over_env() {
        let env = full_env();
        let cli = Cli::parse_from(["anchor-gas-bench", "--contract", "0xbeef"]);
        let cfg = Config::resolve_with(&cli, |k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.contract, "0xbeef");
    }

    #[test]
    fn missing_contract_names_the_env_var() {
        let mut env = full_env();
        env.remove("CONTRACT_ADDRESS");
        let err = Config::resolve_with(&base_cli(), |k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("CONTRACT_ADDRESS"), "{err}");
    }

    #[test]
    fn sizes_parsing_skips_empty_tokens() {
        let env = full_env();
        let cli = Cli::parse_from(["anchor-gas-bench", "--sizes", "1,,5, 10,"]);
        let cfg = Config::resolve_with(&cli, |k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.sizes, vec![1, 5, 10]);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let env = full_env();
        let cli = Cli::parse_from(["anchor-gas-bench", "--sizes", "5,0"]);
        assert!(Config::resolve_with(&cli, |k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn short_hw_id_is_rejected_at_resolve_time() {
        let mut env = full_env();
        env.insert("HW_ID", "0xabcd".to_string());
        let err = Config::resolve_with(&base_cli(), |k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("HW_ID"), "{err}");
    }

    #[test]
    fn chain_id_env_fallback_parses() {
        let mut env = full_env();
        env.insert("CHAIN_ID", "412346".to_string());
        let cfg = Config::resolve_with(&base_cli(), |k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.chain_id, 412346);
    }
}
