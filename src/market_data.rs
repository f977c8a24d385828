//! # Market-Data Price Selector
//!
//! This module turns a noisy list of aggregator trading pairs into one
//! USD price for a target asset, favoring signal quality over recency or
//! order: deep stable-quote pairs first, then any liquid pair, then
//! anything with a price at all. The HTTP source sits behind a trait so
//! the selection policy stays testable without the network.

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use std::{fmt, time::Duration};
use tracing::{debug, warn};

use crate::{errors::PriceError, types::PairQuote};

//================================================================================================//
//                                         CONSTANTS                                             //
//================================================================================================//

/// Aggregator endpoint listing all pairs for a token mint.
pub const DEXSCREENER_TOKENS_URL: &str = "https://api.dexscreener.com/tokens/v1/solana";
/// Wrapped SOL mint, the asset this path prices.
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
/// Quote symbols trusted as a direct USD signal.
const STABLE_QUOTE_SYMBOLS: [&str; 2] = ["USDC", "USDT"];
/// Pairs below this USD liquidity are too thin for the preferred tiers.
const MIN_LIQUIDITY_USD: f64 = 100_000.0;
/// Timeout for HTTP requests to the aggregator.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

//================================================================================================//
//                                      TRAIT DEFINITION                                          //
//================================================================================================//

/// A source of trading-pair records for one asset mint.
#[async_trait]
pub trait MarketDataSource: Send + Sync + fmt::Debug {
    /// Fetches the current pair list for `mint`.
    async fn token_pairs(&self, mint: &str) -> Result<Vec<PairQuote>, PriceError>;

    /// Returns the name of the source implementation.
    fn name(&self) -> &'static str;
}

//================================================================================================//
//                                  DEXSCREENER IMPLEMENTATION                                    //
//================================================================================================//

#[derive(Debug, Clone)]
pub struct DexScreenerSource {
    client: Client,
    base_url: String,
}

impl DexScreenerSource {
    pub fn new() -> Self {
        Self::with_base_url(DEXSCREENER_TOKENS_URL.to_string())
    }

    /// Builds a source against a custom endpoint. Used by tests; the
    /// production base URL is [`DEXSCREENER_TOKENS_URL`].
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self { client, base_url }
    }
}

impl Default for DexScreenerSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for DexScreenerSource {
    fn name(&self) -> &'static str {
        "dexscreener"
    }

    async fn token_pairs(&self, mint: &str) -> Result<Vec<PairQuote>, PriceError> {
        let url = format!("{}/{}", self.base_url, mint);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| PriceError::MarketData(format!("dexscreener request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            PriceError::MarketData(format!("failed to read dexscreener response: {}", e))
        })?;

        if !status.is_success() {
            return Err(PriceError::MarketData(format!(
                "dexscreener API error {}: {}",
                status, text
            )));
        }

        let pairs: Vec<PairQuote> = serde_json::from_str(&text).map_err(|e| {
            PriceError::MarketData(format!("dexscreener JSON error: {} - response: {}", e, text))
        })?;

        debug!(
            target: "market_data",
            mint,
            pair_count = pairs.len(),
            "Fetched pair list."
        );

        Ok(pairs)
    }
}

//================================================================================================//
//                                      PRICE SELECTION                                           //
//================================================================================================//

/// Selects the most trustworthy USD price from `pairs` for the asset at
/// `target_mint`, in strict tier order:
///
/// 1. deepest stable-quote pair (base == target, USDC/USDT quote,
///    liquidity above [`MIN_LIQUIDITY_USD`]); ties keep input order;
/// 2. first pair with a price and liquidity above the threshold;
/// 3. first pair with a price at all.
///
/// A `priceUsd` string that does not parse as a finite float counts as
/// absent in every tier.
pub fn select_usd_price(pairs: &[PairQuote], target_mint: &str) -> Result<f64, PriceError> {
    // Tier 1: liquidity-ranked stablecoin pairs. Strictly-greater
    // comparison keeps the first of equally deep pairs.
    let mut best: Option<(f64, f64)> = None; // (liquidity, price)
    for pair in pairs {
        if pair.base_token.address != target_mint {
            continue;
        }
        if !STABLE_QUOTE_SYMBOLS.contains(&pair.quote_token.symbol.as_str()) {
            continue;
        }
        let (Some(price), Some(liquidity)) = (parsed_price(pair), liquidity_usd(pair)) else {
            continue;
        };
        if liquidity <= MIN_LIQUIDITY_USD {
            continue;
        }
        match best {
            Some((deepest, _)) if liquidity <= deepest => {}
            _ => best = Some((liquidity, price)),
        }
    }
    if let Some((liquidity, price)) = best {
        debug!(
            target: "market_data",
            price,
            liquidity_usd = liquidity,
            "Selected stable-quote pair."
        );
        return Ok(price);
    }

    // Tier 2: any liquid pair, regardless of quote currency.
    if let Some(price) = pairs.iter().find_map(|pair| {
        let price = parsed_price(pair)?;
        (liquidity_usd(pair)? > MIN_LIQUIDITY_USD).then_some(price)
    }) {
        debug!(
            target: "market_data",
            price,
            "No stable-quote pair qualified; using first liquid pair."
        );
        return Ok(price);
    }

    // Tier 3: anything with a price, ignoring liquidity.
    if let Some(price) = pairs.iter().find_map(parsed_price) {
        warn!(
            target: "market_data",
            price,
            "Only thin markets available; price may be unreliable."
        );
        return Ok(price);
    }

    Err(PriceError::NoPriceAvailable(format!(
        "no candidate pair for mint {}",
        target_mint
    )))
}

fn parsed_price(pair: &PairQuote) -> Option<f64> {
    pair.price_usd
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|price| price.is_finite())
}

fn liquidity_usd(pair: &PairQuote) -> Option<f64> {
    pair.liquidity.as_ref().and_then(|liquidity| liquidity.usd)
}
