//! # Centralized Error Handling
//!
//! This module defines the typed error enum for the whole crate. Every
//! failure a resolution path can hit maps to exactly one variant, so
//! callers can distinguish a dead RPC endpoint from an asset that simply
//! has no usable market.

use thiserror::Error;

use crate::config::{ChainId, ChainType};

/// All failures produced by price resolution.
#[derive(Error, Debug)]
pub enum PriceError {
    /// The requested chain identifier is not in the supported set.
    /// Surfaced at the parse boundary, before any network activity.
    #[error("unknown chain: {0}")]
    UnknownChain(String),
    /// A resolver was invoked against a config of the wrong type. This is
    /// a programming error, not a transient condition.
    #[error("invalid chain type for on-chain quoter: {actual} (chain {chain})")]
    InvalidChainType { chain: ChainId, actual: ChainType },
    /// Network, transport, or contract-call failure on the on-chain path.
    #[error("RPC error: {0}")]
    Rpc(String),
    /// The market-data aggregator returned a non-success response or an
    /// unreadable payload.
    #[error("market data unavailable: {0}")]
    MarketData(String),
    /// Market data came back, but no candidate pair passed any selection
    /// tier.
    #[error("no price available: {0}")]
    NoPriceAvailable(String),
    /// Connection-handle creation was attempted for a chain the EVM
    /// client cannot serve.
    #[error("unsupported chain for EVM client: {0}")]
    UnsupportedChain(ChainId),
}
