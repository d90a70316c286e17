use serde::Serialize;

/// One measured transaction. Batch entries additionally carry the batch size
/// and the amortized per-receipt gas.
#[derive(Debug, Clone, Serialize)]
pub struct TxResult {
    pub label: String,
    pub tx: String,
    #[serde(rename = "gasUsed")]
    pub gas_used: u64,
    pub status: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u64>,
    #[serde(rename = "gasPerReceipt", skip_serializing_if = "Option::is_none")]
    pub gas_per_receipt: Option<f64>,
}

impl TxResult {
    pub fn new(label: impl Into<String>, tx: impl Into<String>, gas_used: u64, status: u64) -> Self {
        Self {
            label: label.into(),
            tx: tx.into(),
            gas_used,
            status,
            n: None,
            gas_per_receipt: None,
        }
    }

    pub fn with_batch_size(mut self, n: u64) -> Self {
        self.n = Some(n);
        self.gas_per_receipt = Some(self.gas_used as f64 / n as f64);
        self
    }
}

pub const REVERT_WARNING: &str = "one or more transactions reverted";

/// The single JSON document the harness prints on stdout.
#[derive(Debug, Serialize)]
pub struct Report {
    pub contract: String,
    pub rpc_url: String,
    pub results: Vec<TxResult>,
    pub warning: String,
}

impl Report {
    pub fn new(contract: String, rpc_url: String, results: Vec<TxResult>) -> Self {
        let any_failed = results.iter().any(|r| r.status != 1);
        Self {
            contract,
            rpc_url,
            results,
            warning: if any_failed { REVERT_WARNING.into() } else { String::new() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_per_receipt_is_exact_division() {
        let r = TxResult::new("batch_20", "0xabc", 100_000, 1).with_batch_size(20);
        assert_eq!(r.n, Some(20));
        assert_eq!(r.gas_per_receipt, Some(100_000f64 / 20f64));
    }

    #[test]
    fn warning_set_iff_any_status_not_one() {
        let ok = TxResult::new("a", "0x1", 10, 1);
        let bad = TxResult::new("b", "0x2", 10, 0);

        let clean = Report::new("c".into(), "r".into(), vec![ok.clone(), ok.clone()]);
        assert_eq!(clean.warning, "");

        let dirty = Report::new("c".into(), "r".into(), vec![ok, bad]);
        assert_eq!(dirty.warning, REVERT_WARNING);
    }

    #[test]
    fn batch_fields_omitted_for_plain_results() {
        let plain = serde_json::to_value(TxResult::new("initialize()", "0x1", 42, 1)).unwrap();
        assert!(plain.get("n").is_none());
        assert!(plain.get("gasPerReceipt").is_none());

        let batch =
            serde_json::to_value(TxResult::new("batch", "0x1", 42, 1).with_batch_size(2)).unwrap();
        assert_eq!(batch["n"], 2);
        assert_eq!(batch["gasUsed"], 42);
        assert_eq!(batch["gasPerReceipt"], 21.0);
    }
}
