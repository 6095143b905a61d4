//! Exercises the external-interface traits (spec §6) against a fixture
//! implementation backed by a temp directory, the way the teacher tests its
//! own file-backed storage layer.

use tempfile::TempDir;

use solana_tx_graph::external::TransactionFetcher;
use solana_tx_graph::instruction::ParsedTransactionInput;

struct FixtureFetcher {
    dir: std::path::PathBuf,
}

#[async_trait::async_trait]
impl TransactionFetcher for FixtureFetcher {
    async fn fetch_transaction(&self, signature: &str) -> solana_tx_graph::Result<ParsedTransactionInput> {
        let path = self.dir.join(format!("{signature}.json"));
        let bytes = std::fs::read(&path)
            .map_err(|e| solana_tx_graph::GraphError::Decode(format!("{}: {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| solana_tx_graph::GraphError::Decode(format!("{}: {e}", path.display())))
    }
}

fn sample_json() -> serde_json::Value {
    serde_json::json!({
        "slot": 1,
        "block_time": 1_700_000_000,
        "signature": "fixture-sig",
        "err": null,
        "fee": 5000,
        "compute_units_consumed": 100000,
        "account_keys": [{ "pubkey": "payer", "signer": true }],
        "pre_balances": [1_000_000_000],
        "post_balances": [999_994_999_999],
        "pre_token_balances": [],
        "post_token_balances": [],
        "instructions": [],
        "inner_instructions": [],
    })
}

#[tokio::test]
async fn fetches_and_decodes_a_fixture_transaction() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("fixture-sig.json");
    std::fs::write(&file_path, sample_json().to_string()).unwrap();

    let fetcher = FixtureFetcher { dir: temp_dir.path().to_path_buf() };
    let parsed = fetcher.fetch_transaction("fixture-sig").await.unwrap();

    assert_eq!(parsed.signature, "fixture-sig");
    assert_eq!(parsed.slot, 1);
    assert_eq!(parsed.fee, 5000);
}

#[tokio::test]
async fn missing_fixture_file_surfaces_a_decode_error() {
    let temp_dir = TempDir::new().unwrap();
    let fetcher = FixtureFetcher { dir: temp_dir.path().to_path_buf() };

    let err = fetcher.fetch_transaction("does-not-exist").await.unwrap_err();
    assert!(matches!(err, solana_tx_graph::GraphError::Decode(_)));
}
