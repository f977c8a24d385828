//! # dexprice
//!
//! Fetches a best-effort real-time USD price for the native asset of
//! each supported chain, normalizing two very different sources into one
//! result shape: a read-only quoter-contract simulation on the EVM
//! chains, and a liquidity-ranked selection over an aggregator's trading
//! pairs on Solana.
//!
//! Most callers use the free functions over a process-wide fetcher:
//!
//! ```no_run
//! # async fn demo() -> Result<(), dexprice::PriceError> {
//! let options = dexprice::FetchOptions::default();
//! let result = dexprice::get_price(dexprice::ChainId::Ethereum, &options).await?;
//! println!("{}: {}", result.symbol, result.price);
//! # Ok(())
//! # }
//! ```

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub mod config;
pub mod errors;
pub mod fetcher;
pub mod market_data;
pub mod quoter;
pub mod types;

pub use config::{
    resolve_chain_config, ChainConfig, ChainConfigOverride, ChainId, ChainType, EvmQuoteConfig,
    FetchOptions, DEFAULT_CHAINS,
};
pub use errors::PriceError;
pub use fetcher::PriceFetcher;
pub use types::PriceResult;

static DEFAULT_FETCHER: Lazy<PriceFetcher> = Lazy::new(PriceFetcher::new);

/// Fetches the price for a specific chain through the shared fetcher.
pub async fn get_price(
    chain: ChainId,
    options: &FetchOptions,
) -> Result<PriceResult, PriceError> {
    DEFAULT_FETCHER.price(chain, options).await
}

/// Fetches prices for all supported chains; unresolvable chains are
/// omitted rather than reported as errors.
pub async fn get_all_prices(options: &FetchOptions) -> HashMap<ChainId, PriceResult> {
    DEFAULT_FETCHER.all_prices(options).await
}

/// ETH price on Ethereum mainnet.
pub async fn get_eth_price(options: &FetchOptions) -> Result<f64, PriceError> {
    Ok(get_price(ChainId::Ethereum, options).await?.price)
}

/// BNB price on BNB Smart Chain.
pub async fn get_bnb_price(options: &FetchOptions) -> Result<f64, PriceError> {
    Ok(get_price(ChainId::Bsc, options).await?.price)
}

/// SOL price via the market-data aggregator.
pub async fn get_sol_price(options: &FetchOptions) -> Result<f64, PriceError> {
    Ok(get_price(ChainId::Solana, options).await?.price)
}

/// ETH price on Base.
pub async fn get_base_eth_price(options: &FetchOptions) -> Result<f64, PriceError> {
    Ok(get_price(ChainId::Base, options).await?.price)
}
