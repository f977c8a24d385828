//! # Price Orchestrator
//!
//! Single entry point translating a chain identifier plus per-call
//! overrides into a [`PriceResult`], and a settle-all fan-out over every
//! supported chain. Connection handles are created lazily and reused per
//! chain; one chain's failure never cancels its siblings.

use chrono::Utc;
use ethers::providers::{Http, Provider};
use futures::future::join_all;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::warn;

use crate::{
    config::{resolve_chain_config, ChainConfig, ChainId, ChainType, FetchOptions},
    errors::PriceError,
    market_data::{select_usd_price, DexScreenerSource, MarketDataSource, SOL_MINT},
    quoter,
    types::PriceResult,
};

/// Resolves prices across all supported chains. Holds the only shared
/// mutable state in the system: the per-chain RPC handle cache.
#[derive(Debug)]
pub struct PriceFetcher {
    providers: RwLock<HashMap<ChainId, Arc<Provider<Http>>>>,
    market_data: Arc<dyn MarketDataSource>,
}

impl PriceFetcher {
    pub fn new() -> Self {
        Self::with_market_data(Arc::new(DexScreenerSource::new()))
    }

    /// Builds a fetcher with a custom market-data source. Tests inject
    /// mock sources through this seam.
    pub fn with_market_data(market_data: Arc<dyn MarketDataSource>) -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            market_data,
        }
    }

    /// Fetches the native-asset price for one chain. Every failure
    /// propagates to the caller unchanged.
    pub async fn price(
        &self,
        chain: ChainId,
        options: &FetchOptions,
    ) -> Result<PriceResult, PriceError> {
        let config = resolve_chain_config(chain, options)?;

        let price = match config.chain_type {
            ChainType::Evm => self.evm_price(&config).await?,
            ChainType::Solana => self.solana_price().await?,
        };

        Ok(PriceResult {
            chain,
            symbol: config.symbol,
            price,
            timestamp: Utc::now(),
        })
    }

    /// Fetches prices for every supported chain concurrently and keeps
    /// only the successes. Never fails; chains whose resolution failed
    /// are absent from the map.
    pub async fn all_prices(&self, options: &FetchOptions) -> HashMap<ChainId, PriceResult> {
        let outcomes = join_all(
            ChainId::all().map(|chain| async move { (chain, self.price(chain, options).await) }),
        )
        .await;

        let mut prices = HashMap::new();
        for (chain, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    prices.insert(chain, result);
                }
                Err(e) => warn!(
                    target: "fetcher",
                    chain = %chain,
                    error = %e,
                    "Price resolution failed; omitting chain from results."
                ),
            }
        }
        prices
    }

    async fn evm_price(&self, config: &ChainConfig) -> Result<f64, PriceError> {
        let evm = match (config.chain_type, config.evm.as_ref()) {
            (ChainType::Evm, Some(evm)) => evm,
            _ => {
                return Err(PriceError::InvalidChainType {
                    chain: config.id,
                    actual: config.chain_type,
                })
            }
        };

        let provider = self.evm_provider(config.id, &config.rpc_url).await?;
        quoter::fetch_evm_price(&provider, evm).await
    }

    async fn solana_price(&self) -> Result<f64, PriceError> {
        let pairs = self.market_data.token_pairs(SOL_MINT).await?;
        select_usd_price(&pairs, SOL_MINT)
    }

    /// Returns the cached RPC handle for `chain`, creating it on first
    /// use. Two racing tasks may both build a handle; the handles are
    /// equivalent and the first insert wins.
    async fn evm_provider(
        &self,
        chain: ChainId,
        rpc_url: &str,
    ) -> Result<Arc<Provider<Http>>, PriceError> {
        if chain.chain_type() != ChainType::Evm {
            return Err(PriceError::UnsupportedChain(chain));
        }

        if let Some(provider) = self.providers.read().await.get(&chain) {
            return Ok(provider.clone());
        }

        let provider = Arc::new(
            Provider::<Http>::try_from(rpc_url)
                .map_err(|e| PriceError::Rpc(format!("invalid RPC URL for {}: {}", chain, e)))?,
        );

        let mut providers = self.providers.write().await;
        Ok(providers.entry(chain).or_insert(provider).clone())
    }
}

impl Default for PriceFetcher {
    fn default() -> Self {
        Self::new()
    }
}
