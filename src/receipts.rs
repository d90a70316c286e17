use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Chain id the anchor contract is deployed on (Arbitrum Sepolia).
pub const CHAIN_ID_DEFAULT: u64 = 421614;

/// Domain separator baked into the contract's digest computation.
const DOMAIN: &[u8; 13] = b"anchor_RCT_V1";

/// Wire size of one packed receipt record:
/// version(1) | hw_id(32) | fw_hash(32) | exec_hash(32) | counter(8) | digest(32)
pub const PACKED_RECEIPT_LEN: usize = 137;

const RECEIPT_VERSION: u8 = 1;

#[derive(Error, Debug)]
pub enum HexError {
    #[error("expected 32 bytes (64 hex chars), got {0} hex chars")]
    BadLength(usize),
    #[error("invalid hex: {0}")]
    Decode(#[from] hex::FromHexError),
}

/// Decode a 32-byte value from hex, with or without a `0x` prefix.
pub fn hex32_to_bytes(s: &str) -> Result<[u8; 32], HexError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    if stripped.len() != 64 {
        return Err(HexError::BadLength(stripped.len()));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(stripped, &mut out)?;
    Ok(out)
}

/// Digest the contract reconstructs on-chain and compares against the claimed value.
pub fn compute_digest(
    chain_id: u64,
    hw_id: &[u8; 32],
    fw_hash: &[u8; 32],
    exec_hash: &[u8; 32],
    counter: u64,
) -> [u8; 32] {
    let mut h = Keccak256::new();
    h.update(DOMAIN);
    h.update(chain_id.to_be_bytes());
    h.update(hw_id);
    h.update(fw_hash);
    h.update(exec_hash);
    h.update(counter.to_be_bytes());
    h.finalize().into()
}

// Synthetic execution hash for benchmark records. The contract only folds it
// into the digest, so any deterministic per-counter value works.
fn exec_hash_for(chain_id: u64, counter: u64) -> [u8; 32] {
    let mut h = Keccak256::new();
    h.update(b"anchor_EXEC_V1");
    h.update(chain_id.to_be_bytes());
    h.update(counter.to_be_bytes());
    h.finalize().into()
}

/// Build `count` packed receipt records with consecutive counters from `start`.
/// Every record carries a correct claimed digest, so the whole batch verifies.
pub fn make_packed_batch(
    chain_id: u64,
    hw_id: &[u8; 32],
    fw_hash: &[u8; 32],
    start: u64,
    count: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(count * PACKED_RECEIPT_LEN);
    for i in 0..count as u64 {
        let counter = start + i;
        let exec_hash = exec_hash_for(chain_id, counter);
        let digest = compute_digest(chain_id, hw_id, fw_hash, &exec_hash, counter);
        out.push(RECEIPT_VERSION);
        out.extend_from_slice(hw_id);
        out.extend_from_slice(fw_hash);
        out.extend_from_slice(&exec_hash);
        out.extend_from_slice(&counter.to_be_bytes());
        out.extend_from_slice(&digest);
    }
    out
}

/// Precomputed arguments for the single `verifyReceipt` calls.
#[derive(Debug, Clone)]
pub struct SingleArgs {
    pub exec_hash: [u8; 32],
    pub claimed_digest: [u8; 32],
    pub claimed_digest_bad: [u8; 32],
}

/// Arguments for one single-record call at `counter`: the correct claimed
/// digest and a corrupted one that the contract must reject.
pub fn make_single_args(
    chain_id: u64,
    hw_id: &[u8; 32],
    fw_hash: &[u8; 32],
    counter: u64,
) -> SingleArgs {
    let exec_hash = exec_hash_for(chain_id, counter);
    let claimed_digest = compute_digest(chain_id, hw_id, fw_hash, &exec_hash, counter);
    let mut claimed_digest_bad = claimed_digest;
    claimed_digest_bad[31] ^= 0xff;
    SingleArgs {
        exec_hash,
        claimed_digest,
        claimed_digest_bad,
    }
}
