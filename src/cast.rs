use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use thiserror::Error;

/// A receipt field that cast may emit either as a JSON number or as a
/// string holding a decimal or 0x-hex value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Int(u64),
    Text(String),
}

#[derive(Error, Debug)]
#[error("cannot parse quantity: {0:?}")]
pub struct QuantityError(String);

impl Quantity {
    pub fn to_u64(&self) -> Result<u64, QuantityError> {
        match self {
            Quantity::Int(n) => Ok(*n),
            Quantity::Text(s) => {
                let t = s.trim();
                let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => t.parse(),
                };
                parsed.map_err(|_| QuantityError(s.clone()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendOutput {
    #[serde(rename = "transactionHash")]
    transaction_hash: Option<String>,
    hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReceipt {
    #[serde(rename = "gasUsed")]
    gas_used: Option<Quantity>,
    status: Option<Quantity>,
}

/// Gas and status extracted from a mined transaction's receipt.
#[derive(Debug, Clone, Copy)]
pub struct TxReceipt {
    pub gas_used: u64,
    pub status: u64,
}

/// Thin wrapper around the `cast` CLI. Every call blocks until the
/// subprocess exits; a non-zero exit is unrecoverable for the run.
#[derive(Debug, Clone)]
pub struct CastClient {
    program: PathBuf,
}

impl Default for CastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CastClient {
    pub fn new() -> Self {
        Self { program: "cast".into() }
    }

    /// Point at a different executable. Used by tests to substitute a stub.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    fn run(&self, args: &[String]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;

        if !output.status.success() {
            bail!(
                "command failed:\n{} {}\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
                self.program.display(),
                args.join(" "),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// `cast send --json <args...>` — returns the transaction hash.
    pub fn send(&self, args: &[String]) -> Result<String> {
        let mut full = vec!["send".to_string(), "--json".to_string()];
        full.extend_from_slice(args);
        let out = self.run(&full)?;
        parse_send_output(&out)
    }

    /// `cast receipt --json <tx> --rpc-url <url>` — returns gas used and status.
    pub fn receipt(&self, tx_hash: &str, rpc_url: &str) -> Result<TxReceipt> {
        let args = vec![
            "receipt".to_string(),
            "--json".to_string(),
            tx_hash.to_string(),
            "--rpc-url".to_string(),
            rpc_url.to_string(),
        ];
        let out = self.run(&args)?;
        parse_receipt_output(&out)
    }
}

fn parse_send_output(out: &str) -> Result<String> {
    let send: SendOutput = serde_json::from_str(out)
        .with_context(|| format!("failed to parse JSON from cast send output:\n{out}"))?;
    match send.transaction_hash.or(send.hash) {
        Some(tx) => Ok(tx),
        None => bail!("cast send JSON missing transaction hash: {out}"),
    }
}

fn parse_receipt_output(out: &str) -> Result<TxReceipt> {
    let raw: RawReceipt = serde_json::from_str(out)
        .with_context(|| format!("failed to parse JSON from cast receipt output:\n{out}"))?;
    let gas_used = raw
        .gas_used
        .with_context(|| format!("unexpected gasUsed in receipt: {out}"))?
        .to_u64()
        .with_context(|| format!("unexpected gasUsed in receipt: {out}"))?;
    let status = raw
        .status
        .with_context(|| format!("unexpected status in receipt: {out}"))?
        .to_u64()
        .with_context(|| format!("unexpected status in receipt: {out}"))?;
    Ok(TxReceipt { gas_used, status })
}
