use anyhow::Result;

use crate::cast::CastClient;
use crate::config::{BatchFn, Config};
use crate::receipts::{make_packed_batch, make_single_args};
use crate::types::{Report, TxResult};

const SIG_INITIALIZE: &str = "initialize()";
const SIG_AUTHORIZE_NODE: &str = "authorizeNode(bytes32)";
const SIG_APPROVE_FIRMWARE: &str = "approveFirmware(bytes32)";
const SIG_BATCH_BITSET: &str = "verifyReceiptsBatchBitsetBytes(bytes)";
const SIG_BATCH_BOOL: &str = "verifyReceiptsBatchBytes(bytes)";
const SIG_SINGLE: &str = "verifyReceipt(bytes32,bytes32,bytes32,uint64,bytes32)";

/// Run every benchmark phase in order: optional setup, batches in the
/// configured size order, then the single success/failure pair. Each
/// transaction is confirmed (receipt fetched) before the next is sent, so
/// every gas number is attributable to one isolated call.
pub fn run(cfg: &Config, client: &CastClient) -> Result<Report> {
    let mut results: Vec<TxResult> = Vec::new();

    if cfg.setup {
        for (sig, call_args) in [
            (SIG_INITIALIZE, vec![]),
            (SIG_AUTHORIZE_NODE, vec![cfg.hw_id_hex.clone()]),
            (SIG_APPROVE_FIRMWARE, vec![cfg.fw_hash_hex.clone()]),
        ] {
            results.push(submit_and_measure(client, cfg, sig.to_string(), sig, &call_args)?);
        }
    }

    let batch_sig = match cfg.batch_fn {
        BatchFn::Bitset => SIG_BATCH_BITSET,
        BatchFn::Bool => SIG_BATCH_BOOL,
    };

    for &n in &cfg.sizes {
        let packed = make_packed_batch(cfg.chain_id, &cfg.hw_id, &cfg.fw_hash, 1, n as usize);
        let packed_hex = format!("0x{}", hex::encode(&packed));
        let label = format!("{batch_sig} N={n}");
        let result =
            submit_and_measure(client, cfg, label, batch_sig, &[packed_hex])?.with_batch_size(n);
        results.push(result);
    }

    let single = make_single_args(cfg.chain_id, &cfg.hw_id, &cfg.fw_hash, 1);

    for (label, claimed) in [
        ("verifyReceipt success", single.claimed_digest),
        ("verifyReceipt invalid digest", single.claimed_digest_bad),
    ] {
        let call_args = vec![
            cfg.hw_id_hex.clone(),
            cfg.fw_hash_hex.clone(),
            hex32(&single.exec_hash),
            "1".to_string(),
            hex32(&claimed),
        ];
        results.push(submit_and_measure(client, cfg, label.to_string(), SIG_SINGLE, &call_args)?);
    }

    Ok(Report::new(cfg.contract.clone(), cfg.rpc_url.clone(), results))
}

fn submit_and_measure(
    client: &CastClient,
    cfg: &Config,
    label: String,
    sig: &str,
    call_args: &[String],
) -> Result<TxResult> {
    let tx = client.send(&send_args(cfg, sig, call_args))?;
    let receipt = client.receipt(&tx, &cfg.rpc_url)?;
    // Progress goes to stderr; stdout carries only the final report.
    eprintln!(
        "[bench] {label}: tx={tx} gas={} status={}",
        receipt.gas_used, receipt.status
    );
    Ok(TxResult::new(label, tx, receipt.gas_used, receipt.status))
}

fn send_args(cfg: &Config, sig: &str, call_args: &[String]) -> Vec<String> {
    let mut args = vec![cfg.contract.clone(), sig.to_string()];
    args.extend_from_slice(call_args);
    args.extend([
        "--rpc-url".to_string(),
        cfg.rpc_url.clone(),
        "--private-key".to_string(),
        cfg.private_key.clone(),
        "--gas-limit".to_string(),
        cfg.gas_limit.to_string(),
    ]);
    args
}

fn hex32(b: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use clap::Parser;
    use std::collections::HashMap;

    fn test_config(extra: &[&str]) -> Config {
        let hex32 = "ab".repeat(32);
        let env = HashMap::from([
            ("CONTRACT_ADDRESS", "0xcafe".to_string()),
            ("RPC_URL", "http://localhost:8547".to_string()),
            ("PRIVATE_KEY", "0xkey".to_string()),
            ("HW_ID", hex32.clone()),
            ("FW_HASH", hex32),
        ]);
        let mut argv = vec!["anchor-gas-bench"];
        argv.extend_from_slice(extra);
        let cli = Cli::parse_from(argv);
        Config::resolve_with(&cli, |k| env.get(k).cloned()).unwrap()
    }

    #[test]
    fn send_args_order_matches_cast_cli() {
        let cfg = test_config(&[]);
        let args = send_args(&cfg, SIG_INITIALIZE, &[]);
        assert_eq!(
            args,
            vec![
                "0xcafe",
                "initialize()",
                "--rpc-url",
                "http://localhost:8547",
                "--private-key",
                "0xkey",
                "--gas-limit",
                "5000000",
            ]
        );
    }

    #[test]
    fn batch_fn_flag_selects_signature() {
        let cfg = test_config(&["--batch-fn", "bool"]);
        assert_eq!(cfg.batch_fn, BatchFn::Bool);
        let cfg = test_config(&[]);
        assert_eq!(cfg.batch_fn, BatchFn::Bitset);
    }
}
