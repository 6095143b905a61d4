use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use solana_tx_graph::config::Config;
use solana_tx_graph::external::{BlockSignatureFetcher, SolPriceFetcher, TransactionFetcher};
use solana_tx_graph::graphspace::Graphspace;
use solana_tx_graph::instruction::ParsedTransactionInput;
use solana_tx_graph::serializer::get_graph_data_from_graphspace;
use solana_tx_graph::transaction::parse_transaction;

/// Reads one already-fetched transaction from a JSON fixture on disk.
///
/// Talking to a live RPC endpoint is out of scope for this crate (spec §1);
/// a real deployment wires [`TransactionFetcher`] against
/// `solana_client::nonblocking::rpc_client::RpcClient` the way the teacher's
/// own `chain::token_fetch::TokenFetcher` wires an RPC client behind an
/// async trait.
struct FixtureTransactionFetcher {
    dir: std::path::PathBuf,
}

#[async_trait::async_trait]
impl TransactionFetcher for FixtureTransactionFetcher {
    async fn fetch_transaction(&self, signature: &str) -> solana_tx_graph::Result<ParsedTransactionInput> {
        let path = self.dir.join(format!("{signature}.json"));
        let bytes = std::fs::read(&path).map_err(|e| {
            solana_tx_graph::GraphError::Decode(format!("reading fixture {}: {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| solana_tx_graph::GraphError::Decode(format!("parsing fixture {}: {e}", path.display())))
    }
}

struct NoBlockOrdering;

#[async_trait::async_trait]
impl BlockSignatureFetcher for NoBlockOrdering {
    async fn fetch_block_signatures(&self, _slot: u64) -> solana_tx_graph::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

struct FixedSolPrice(f64);

#[async_trait::async_trait]
impl SolPriceFetcher for FixedSolPrice {
    async fn fetch_sol_usd_price(&self, _timestamp_millis: i64) -> solana_tx_graph::Result<f64> {
        Ok(self.0)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.log_level))
        .expect("failed to build EnvFilter");
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();

    info!(link_transactions = config.graphspace.link_transactions, "starting transaction-graph demo");

    let signatures: Vec<String> = std::env::args().skip(1).collect();
    if signatures.is_empty() {
        warn!("no transaction signatures given; pass one or more fixture signatures as arguments");
        return Ok(());
    }

    let fixtures_dir = std::env::var("FIXTURES_DIR").unwrap_or_else(|_| "demos/fixtures".to_string());
    let fetcher = FixtureTransactionFetcher { dir: fixtures_dir.into() };
    let block_order_fetcher = NoBlockOrdering;
    let price_fetcher = FixedSolPrice(150.0);

    let mut contexts = Vec::with_capacity(signatures.len());
    for signature in &signatures {
        let input = fetcher.fetch_transaction(signature).await?;
        contexts.push(parse_transaction(&input));
        let _ = block_order_fetcher.fetch_block_signatures(input.slot).await?;
    }

    let mut graphspace = Graphspace::build(contexts, &HashMap::new(), config.graphspace.link_transactions);
    graphspace.analyse_isomorphic_transactions();

    let timestamps: Vec<i64> = graphspace
        .transaction_contexts
        .values()
        .map(|ctx| ctx.block_time.map(|t| t * 1000).unwrap_or(0))
        .collect();
    let prices = price_fetcher.fetch_sol_usd_prices_batch(&timestamps).await?;
    let sol_usd_prices: HashMap<i64, f64> = timestamps.into_iter().zip(prices).collect();

    let graph_data = get_graph_data_from_graphspace(&graphspace, &sol_usd_prices);
    info!(
        nodes = graph_data.nodes.len(),
        links = graph_data.links.len(),
        transactions = graph_data.transactions.len(),
        "graph reconstructed"
    );

    let rendered = serde_json::to_string_pretty(&graph_data)?;
    println!("{rendered}");

    Ok(())
}
