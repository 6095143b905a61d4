//! External-interface traits (spec §6) the core parser is fed through —
//! never implemented against a live RPC endpoint here (out of scope per
//! spec §1), but grounded on the teacher's own thin async boundary in front
//! of an RPC client (`chain::token_fetch::TokenFetcher`).

use async_trait::async_trait;

use crate::error::Result;
use crate::instruction::ParsedTransactionInput;

/// Fetches one transaction's parsed representation by signature.
#[async_trait]
pub trait TransactionFetcher: Send + Sync {
    async fn fetch_transaction(&self, signature: &str) -> Result<ParsedTransactionInput>;
}

/// Fetches the ordered list of transaction signatures in a slot, used by
/// [`crate::graphspace::Graphspace::build`] to order same-slot transactions.
#[async_trait]
pub trait BlockSignatureFetcher: Send + Sync {
    async fn fetch_block_signatures(&self, slot: u64) -> Result<Vec<String>>;
}

/// Fetches the USD price of SOL at a given unix-millis timestamp, the seed
/// value the C10 mint-price-ratio derivation propagates outward from.
#[async_trait]
pub trait SolPriceFetcher: Send + Sync {
    async fn fetch_sol_usd_price(&self, timestamp_millis: i64) -> Result<f64>;

    /// Batched variant for a graphspace spanning many transactions; the
    /// default implementation just calls [`Self::fetch_sol_usd_price`] per
    /// timestamp, matching `SOLPriceService.get_sol_prices_batch`'s contract
    /// without requiring callers to special-case the single-transaction path.
    async fn fetch_sol_usd_prices_batch(&self, timestamps_millis: &[i64]) -> Result<Vec<f64>> {
        let mut prices = Vec::with_capacity(timestamps_millis.len());
        for &ts in timestamps_millis {
            prices.push(self.fetch_sol_usd_price(ts).await?);
        }
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPrice(f64);

    #[async_trait]
    impl SolPriceFetcher for FixedPrice {
        async fn fetch_sol_usd_price(&self, _timestamp_millis: i64) -> Result<f64> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn default_batch_impl_calls_single_fetch_per_timestamp() {
        let fetcher = FixedPrice(150.0);
        let prices = fetcher.fetch_sol_usd_prices_batch(&[1, 2, 3]).await.unwrap();
        assert_eq!(prices, vec![150.0, 150.0, 150.0]);
    }
}
