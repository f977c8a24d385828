//! # Shared Type Definitions
//!
//! Value records exchanged between the resolution paths and their
//! callers: the normalized price output and the market-data aggregator's
//! wire shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ChainId;

/// One successfully resolved price. Never partially populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResult {
    pub chain: ChainId,
    /// Native asset symbol from the chain config.
    pub symbol: String,
    /// USD price of one whole unit of the native asset.
    pub price: f64,
    /// Taken at call completion.
    pub timestamp: DateTime<Utc>,
}

/// Token side of a trading pair as reported by the aggregator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenRef {
    pub address: String,
    pub symbol: String,
}

/// Liquidity block of a pair record. The aggregator omits it for thin
/// markets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PairLiquidity {
    pub usd: Option<f64>,
}

/// One trading-pair record from the market-data aggregator. Fetched
/// fresh per call and discarded after selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PairQuote {
    pub base_token: TokenRef,
    pub quote_token: TokenRef,
    /// Decimal USD price string; absent when the aggregator has no quote.
    pub price_usd: Option<String>,
    pub liquidity: Option<PairLiquidity>,
}
