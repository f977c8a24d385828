//! # Chain Configuration Registry
//!
//! Static per-chain connection and contract parameters, plus the per-call
//! override merge. Defaults live in [`DEFAULT_CHAINS`]; callers never see
//! a half-merged config because [`resolve_chain_config`] produces an
//! immutable snapshot for each resolution.

use ethers::types::Address;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

use crate::errors::PriceError;

/// The closed set of supported chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Ethereum,
    Bsc,
    Base,
    Solana,
}

impl ChainId {
    /// Every supported chain, in the order the fan-out visits them.
    pub const fn all() -> [ChainId; 4] {
        [ChainId::Ethereum, ChainId::Bsc, ChainId::Base, ChainId::Solana]
    }

    /// Which resolution strategy applies. Fixed for the lifetime of the
    /// identifier.
    pub const fn chain_type(&self) -> ChainType {
        match self {
            ChainId::Solana => ChainType::Solana,
            _ => ChainType::Evm,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ChainId::Ethereum => "ethereum",
            ChainId::Bsc => "bsc",
            ChainId::Base => "base",
            ChainId::Solana => "solana",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ethereum" => Ok(ChainId::Ethereum),
            "bsc" => Ok(ChainId::Bsc),
            "base" => Ok(ChainId::Base),
            "solana" => Ok(ChainId::Solana),
            other => Err(PriceError::UnknownChain(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Evm,
    Solana,
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainType::Evm => f.write_str("evm"),
            ChainType::Solana => f.write_str("solana"),
        }
    }
}

/// Quoter parameters for the on-chain simulation path. Present exactly
/// when the chain is EVM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmQuoteConfig {
    pub quoter_address: Address,
    pub wrapped_native_address: Address,
    pub stable_address: Address,
    pub stable_decimals: u8,
    pub pool_fee: u32,
}

/// One chain's connection and contract parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: ChainId,
    pub name: String,
    pub chain_type: ChainType,
    /// Native asset symbol reported in results.
    pub symbol: String,
    pub rpc_url: String,
    pub evm: Option<EvmQuoteConfig>,
}

/// Partial per-chain override. Unset fields inherit the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfigOverride {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub rpc_url: Option<String>,
    pub quoter_address: Option<Address>,
    pub wrapped_native_address: Option<Address>,
    pub stable_address: Option<Address>,
    pub stable_decimals: Option<u8>,
    pub pool_fee: Option<u32>,
}

/// Caller-supplied overrides for a single call. Nothing here persists
/// across calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Custom RPC URLs per chain.
    pub rpc_urls: HashMap<ChainId, String>,
    /// Partial config overrides per chain, applied after `rpc_urls`.
    pub chain_configs: HashMap<ChainId, ChainConfigOverride>,
}

/// Built-in defaults for every supported chain.
pub static DEFAULT_CHAINS: Lazy<HashMap<ChainId, ChainConfig>> = Lazy::new(|| {
    let mut chains = HashMap::new();
    chains.insert(
        ChainId::Ethereum,
        ChainConfig {
            id: ChainId::Ethereum,
            name: "Ethereum".to_string(),
            chain_type: ChainType::Evm,
            symbol: "ETH".to_string(),
            rpc_url: "https://ethereum-rpc.publicnode.com".to_string(),
            evm: Some(EvmQuoteConfig {
                quoter_address: Address::from_str("0x61fFE014bA17989E743c5F6cB21bF9697530B21e").unwrap(),
                wrapped_native_address: Address::from_str("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").unwrap(), // WETH
                stable_address: Address::from_str("0xdAC17F958D2ee523a2206206994597C13D831ec7").unwrap(), // USDT
                stable_decimals: 6,
                pool_fee: 3000,
            }),
        },
    );
    chains.insert(
        ChainId::Bsc,
        ChainConfig {
            id: ChainId::Bsc,
            name: "BNB Smart Chain".to_string(),
            chain_type: ChainType::Evm,
            symbol: "BNB".to_string(),
            rpc_url: "https://bsc-rpc.publicnode.com".to_string(),
            evm: Some(EvmQuoteConfig {
                quoter_address: Address::from_str("0xB048Bbc1Ee6b733FFfCFb9e9CeF7375518e25997").unwrap(),
                wrapped_native_address: Address::from_str("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c").unwrap(), // WBNB
                stable_address: Address::from_str("0x55d398326f99059fF775485246999027B3197955").unwrap(), // USDT, 18 decimals on BSC
                stable_decimals: 18,
                pool_fee: 2500,
            }),
        },
    );
    chains.insert(
        ChainId::Base,
        ChainConfig {
            id: ChainId::Base,
            name: "Base".to_string(),
            chain_type: ChainType::Evm,
            symbol: "ETH".to_string(),
            rpc_url: "https://base-rpc.publicnode.com".to_string(),
            evm: Some(EvmQuoteConfig {
                quoter_address: Address::from_str("0x3d4e44Eb1374240CE5F1B871ab261CD16335B76a").unwrap(),
                wrapped_native_address: Address::from_str("0x4200000000000000000000000000000000000006").unwrap(), // WETH
                stable_address: Address::from_str("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913").unwrap(), // USDC
                stable_decimals: 6,
                pool_fee: 500,
            }),
        },
    );
    chains.insert(
        ChainId::Solana,
        ChainConfig {
            id: ChainId::Solana,
            name: "Solana".to_string(),
            chain_type: ChainType::Solana,
            symbol: "SOL".to_string(),
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            evm: None,
        },
    );
    chains
});

/// Resolves the effective config for `chain`: defaults, then the RPC URL
/// override, then every present field of the per-chain override. Pure
/// function of its inputs; the result is never shared or mutated.
pub fn resolve_chain_config(
    chain: ChainId,
    options: &FetchOptions,
) -> Result<ChainConfig, PriceError> {
    let mut config = DEFAULT_CHAINS
        .get(&chain)
        .cloned()
        .ok_or_else(|| PriceError::UnknownChain(chain.to_string()))?;

    if let Some(rpc_url) = options.rpc_urls.get(&chain) {
        config.rpc_url = rpc_url.clone();
    }
    if let Some(overrides) = options.chain_configs.get(&chain) {
        apply_override(&mut config, overrides);
    }

    Ok(config)
}

fn apply_override(config: &mut ChainConfig, overrides: &ChainConfigOverride) {
    if let Some(name) = &overrides.name {
        config.name = name.clone();
    }
    if let Some(symbol) = &overrides.symbol {
        config.symbol = symbol.clone();
    }
    if let Some(rpc_url) = &overrides.rpc_url {
        config.rpc_url = rpc_url.clone();
    }
    // Quoter-field overrides only make sense where a quoter section
    // exists; for non-EVM chains they are unused and skipped.
    if let Some(evm) = config.evm.as_mut() {
        if let Some(quoter_address) = overrides.quoter_address {
            evm.quoter_address = quoter_address;
        }
        if let Some(wrapped_native_address) = overrides.wrapped_native_address {
            evm.wrapped_native_address = wrapped_native_address;
        }
        if let Some(stable_address) = overrides.stable_address {
            evm.stable_address = stable_address;
        }
        if let Some(stable_decimals) = overrides.stable_decimals {
            evm.stable_decimals = stable_decimals;
        }
        if let Some(pool_fee) = overrides.pool_fee {
            evm.pool_fee = pool_fee;
        }
    }
}
