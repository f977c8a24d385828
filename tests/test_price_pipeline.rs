//! End-to-end orchestrator tests: dispatch, error propagation, and the
//! best-effort fan-out, using an injected market-data source and RPC
//! URLs pointing at an unroutable local port so no external network is
//! touched. Live smoke tests against real endpoints are `#[ignore]`d.

use async_trait::async_trait;
use std::sync::Arc;

use dexprice::market_data::{MarketDataSource, SOL_MINT};
use dexprice::types::{PairLiquidity, PairQuote, TokenRef};
use dexprice::{ChainId, FetchOptions, PriceError, PriceFetcher};

/// Nothing listens on this port; EVM resolutions fail fast with a
/// connection error instead of reaching the real internet.
const DEAD_RPC_URL: &str = "http://127.0.0.1:9";

#[derive(Debug)]
struct StaticPairsSource {
    pairs: Vec<PairQuote>,
}

#[async_trait]
impl MarketDataSource for StaticPairsSource {
    async fn token_pairs(&self, _mint: &str) -> Result<Vec<PairQuote>, PriceError> {
        Ok(self.pairs.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[derive(Debug)]
struct FailingSource;

#[async_trait]
impl MarketDataSource for FailingSource {
    async fn token_pairs(&self, _mint: &str) -> Result<Vec<PairQuote>, PriceError> {
        Err(PriceError::MarketData("aggregator is down".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn sol_stable_pair(price: &str, liquidity: f64) -> PairQuote {
    PairQuote {
        base_token: TokenRef {
            address: SOL_MINT.to_string(),
            symbol: "SOL".to_string(),
        },
        quote_token: TokenRef {
            address: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
            symbol: "USDC".to_string(),
        },
        price_usd: Some(price.to_string()),
        liquidity: Some(PairLiquidity {
            usd: Some(liquidity),
        }),
    }
}

fn dead_evm_options() -> FetchOptions {
    let mut options = FetchOptions::default();
    for chain in [ChainId::Ethereum, ChainId::Bsc, ChainId::Base] {
        options.rpc_urls.insert(chain, DEAD_RPC_URL.to_string());
    }
    options
}

#[tokio::test]
async fn solana_price_resolves_through_injected_source() {
    let fetcher = PriceFetcher::with_market_data(Arc::new(StaticPairsSource {
        pairs: vec![sol_stable_pair("150.25", 5_000_000.0)],
    }));

    let result = fetcher
        .price(ChainId::Solana, &FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(result.chain, ChainId::Solana);
    assert_eq!(result.symbol, "SOL");
    assert_eq!(result.price, 150.25);
}

#[tokio::test]
async fn market_data_failure_propagates_from_price() {
    let fetcher = PriceFetcher::with_market_data(Arc::new(FailingSource));

    let err = fetcher
        .price(ChainId::Solana, &FetchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PriceError::MarketData(_)));
}

#[tokio::test]
async fn empty_market_yields_no_price_available() {
    let fetcher = PriceFetcher::with_market_data(Arc::new(StaticPairsSource { pairs: vec![] }));

    let err = fetcher
        .price(ChainId::Solana, &FetchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PriceError::NoPriceAvailable(_)));
}

#[tokio::test]
async fn evm_rpc_failure_propagates_from_price() {
    let fetcher = PriceFetcher::new();

    let err = fetcher
        .price(ChainId::Ethereum, &dead_evm_options())
        .await
        .unwrap_err();

    assert!(matches!(err, PriceError::Rpc(_)));
}

#[tokio::test]
async fn all_prices_keeps_only_successful_chains() {
    let fetcher = PriceFetcher::with_market_data(Arc::new(StaticPairsSource {
        pairs: vec![sol_stable_pair("151.00", 5_000_000.0)],
    }));

    let prices = fetcher.all_prices(&dead_evm_options()).await;

    assert_eq!(prices.len(), 1);
    assert_eq!(prices[&ChainId::Solana].price, 151.0);
}

#[tokio::test]
async fn all_prices_never_errors_when_every_chain_fails() {
    let fetcher = PriceFetcher::with_market_data(Arc::new(FailingSource));

    let prices = fetcher.all_prices(&dead_evm_options()).await;

    assert!(prices.is_empty());
}

#[tokio::test]
async fn unknown_chain_fails_at_the_parse_boundary() {
    // No fetcher, no network: the identifier never becomes a ChainId.
    let err = "unknown-chain".parse::<ChainId>().unwrap_err();
    assert!(matches!(err, PriceError::UnknownChain(name) if name == "unknown-chain"));
}

#[tokio::test]
#[ignore = "requires network access to public RPC endpoints"]
async fn live_evm_prices_smoke() {
    let fetcher = PriceFetcher::new();
    let options = FetchOptions::default();

    for chain in [ChainId::Ethereum, ChainId::Bsc, ChainId::Base] {
        let result = fetcher.price(chain, &options).await.unwrap();
        assert!(result.price > 0.0, "{} price should be positive", chain);
    }
}

#[tokio::test]
#[ignore = "requires network access to the market-data aggregator"]
async fn live_sol_price_smoke() {
    let result = dexprice::get_sol_price(&FetchOptions::default()).await.unwrap();
    assert!(result > 0.0);
}
