//! # On-Chain Quote Resolver
//!
//! Prices an EVM chain's native asset by simulating a single-hop swap of
//! exactly one wrapped-native unit into the chain's reference stablecoin
//! against a QuoterV2-style contract, then scaling the raw output by the
//! stablecoin's decimals. The call is encoded by hand so the decode side
//! can accept both the V2 four-field return and the older bare-uint
//! shape.

use ethers::{
    abi::{self, ParamType, Token},
    providers::{Http, Middleware, Provider},
    types::{Bytes, TransactionRequest, U256},
    utils::id,
};
use tracing::debug;

use crate::{config::EvmQuoteConfig, errors::PriceError};

/// Canonical signature of the quoter entrypoint; the single argument is
/// the `QuoteExactInputSingleParams` struct.
const QUOTE_SIGNATURE: &str =
    "quoteExactInputSingle((address,address,uint256,uint24,uint160))";

/// Raw return data of a quote simulation. Older quoter deployments
/// return the output amount alone; V2 returns a four-field tuple whose
/// first element is the amount. Callers must extract the amount
/// explicitly rather than rely on positional luck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteReturn {
    AmountOnly(U256),
    QuoterV2 {
        amount_out: U256,
        sqrt_price_x96_after: U256,
        initialized_ticks_crossed: u32,
        gas_estimate: U256,
    },
}

impl QuoteReturn {
    pub fn amount_out(&self) -> U256 {
        match self {
            QuoteReturn::AmountOnly(amount_out) => *amount_out,
            QuoteReturn::QuoterV2 { amount_out, .. } => *amount_out,
        }
    }
}

/// Builds the calldata for quoting one whole wrapped-native unit
/// (10^18 base units, fixed) into the reference stablecoin, with no
/// price limit.
pub fn encode_quote_call(config: &EvmQuoteConfig) -> Bytes {
    let params = Token::Tuple(vec![
        Token::Address(config.wrapped_native_address),
        Token::Address(config.stable_address),
        Token::Uint(U256::exp10(18)),
        Token::Uint(U256::from(config.pool_fee)),
        Token::Uint(U256::zero()), // sqrtPriceLimitX96 = 0, no limit
    ]);

    let mut data = id(QUOTE_SIGNATURE).to_vec();
    data.extend(abi::encode(&[params]));
    Bytes::from(data)
}

/// Decodes the raw return data of a quote call into its tagged shape.
pub fn decode_quote_return(raw: &[u8]) -> Result<QuoteReturn, PriceError> {
    // A single word is the pre-V2 bare amount.
    if raw.len() == 32 {
        let tokens = abi::decode(&[ParamType::Uint(256)], raw)
            .map_err(|e| PriceError::Rpc(format!("failed to decode quoter return: {}", e)))?;
        let amount_out = tokens
            .into_iter()
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(|| PriceError::Rpc("quoter returned a non-uint value".to_string()))?;
        return Ok(QuoteReturn::AmountOnly(amount_out));
    }

    let tokens = abi::decode(
        &[
            ParamType::Uint(256), // amountOut
            ParamType::Uint(160), // sqrtPriceX96After
            ParamType::Uint(32),  // initializedTicksCrossed
            ParamType::Uint(256), // gasEstimate
        ],
        raw,
    )
    .map_err(|e| PriceError::Rpc(format!("failed to decode quoter return: {}", e)))?;

    let mut fields = tokens.into_iter().map(Token::into_uint);
    let mut next_uint = |name: &str| {
        fields.next().flatten().ok_or_else(|| {
            PriceError::Rpc(format!("quoter return missing field {}", name))
        })
    };

    Ok(QuoteReturn::QuoterV2 {
        amount_out: next_uint("amountOut")?,
        sqrt_price_x96_after: next_uint("sqrtPriceX96After")?,
        initialized_ticks_crossed: next_uint("initializedTicksCrossed")?.low_u32(),
        gas_estimate: next_uint("gasEstimate")?,
    })
}

/// Converts a raw stablecoin amount into a decimal price. True division,
/// never a truncating integer division; `format_units` handles amounts
/// past the f64-exact range.
pub fn scale_amount_out(amount_out: U256, stable_decimals: u8) -> Result<f64, PriceError> {
    if amount_out.is_zero() {
        return Ok(0.0);
    }

    if amount_out > U256::from(u128::MAX) {
        let formatted = ethers::utils::format_units(amount_out, stable_decimals as u32)
            .map_err(|e| PriceError::Rpc(format!("failed to scale quoter output: {}", e)))?;
        return formatted
            .parse::<f64>()
            .map_err(|e| PriceError::Rpc(format!("failed to parse scaled output: {}", e)));
    }

    Ok(amount_out.as_u128() as f64 / 10f64.powi(stable_decimals as i32))
}

/// Runs the read-only quote simulation through `provider` and returns
/// the USD price of one wrapped-native unit.
pub async fn fetch_evm_price(
    provider: &Provider<Http>,
    config: &EvmQuoteConfig,
) -> Result<f64, PriceError> {
    let calldata = encode_quote_call(config);
    let tx = TransactionRequest::new()
        .to(config.quoter_address)
        .data(calldata);

    let raw = provider
        .call(&tx.into(), None)
        .await
        .map_err(|e| PriceError::Rpc(format!("quoter call failed: {}", e)))?;

    let quote = decode_quote_return(&raw)?;
    debug!(
        target: "quoter",
        quoter = %config.quoter_address,
        amount_out = %quote.amount_out(),
        "Quote simulation succeeded."
    );

    scale_amount_out(quote.amount_out(), config.stable_decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Address;
    use std::str::FromStr;

    fn test_config() -> EvmQuoteConfig {
        EvmQuoteConfig {
            quoter_address: Address::from_str("0x61fFE014bA17989E743c5F6cB21bF9697530B21e")
                .unwrap(),
            wrapped_native_address: Address::from_str(
                "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            )
            .unwrap(),
            stable_address: Address::from_str("0xdAC17F958D2ee523a2206206994597C13D831ec7")
                .unwrap(),
            stable_decimals: 6,
            pool_fee: 3000,
        }
    }

    #[test]
    fn calldata_carries_selector_and_five_words() {
        let config = test_config();
        let calldata = encode_quote_call(&config);

        assert_eq!(&calldata[..4], id(QUOTE_SIGNATURE).as_slice());
        // Static tuple of five fields encodes inline.
        assert_eq!(calldata.len(), 4 + 5 * 32);

        let tokens = abi::decode(
            &[ParamType::Tuple(vec![
                ParamType::Address,
                ParamType::Address,
                ParamType::Uint(256),
                ParamType::Uint(24),
                ParamType::Uint(160),
            ])],
            &calldata[4..],
        )
        .unwrap();
        let Token::Tuple(fields) = &tokens[0] else {
            panic!("expected tuple argument");
        };
        assert_eq!(fields[0], Token::Address(config.wrapped_native_address));
        assert_eq!(fields[1], Token::Address(config.stable_address));
        assert_eq!(fields[2], Token::Uint(U256::exp10(18)));
        assert_eq!(fields[3], Token::Uint(U256::from(3000u32)));
        assert_eq!(fields[4], Token::Uint(U256::zero()));
    }

    #[test]
    fn decodes_bare_amount_return() {
        let raw = abi::encode(&[Token::Uint(U256::from(250_000_000u64))]);
        let quote = decode_quote_return(&raw).unwrap();
        assert_eq!(quote, QuoteReturn::AmountOnly(U256::from(250_000_000u64)));
        assert_eq!(quote.amount_out(), U256::from(250_000_000u64));
    }

    #[test]
    fn decodes_quoter_v2_tuple_return() {
        let raw = abi::encode(&[
            Token::Uint(U256::from(250_000_000u64)),
            Token::Uint(U256::from(123456789u64)),
            Token::Uint(U256::from(3u64)),
            Token::Uint(U256::from(90_000u64)),
        ]);
        let quote = decode_quote_return(&raw).unwrap();
        assert_eq!(quote.amount_out(), U256::from(250_000_000u64));
        assert_eq!(
            quote,
            QuoteReturn::QuoterV2 {
                amount_out: U256::from(250_000_000u64),
                sqrt_price_x96_after: U256::from(123456789u64),
                initialized_ticks_crossed: 3,
                gas_estimate: U256::from(90_000u64),
            }
        );
    }

    #[test]
    fn rejects_malformed_return_data() {
        let err = decode_quote_return(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, PriceError::Rpc(_)));
    }

    #[test]
    fn scales_by_stable_decimals_without_truncation() {
        let price = scale_amount_out(U256::from(250_000_000u64), 6).unwrap();
        assert_eq!(price, 250.0);

        // 18-decimal stables (USDT on BSC) scale the same way.
        let price = scale_amount_out(U256::exp10(18), 18).unwrap();
        assert_eq!(price, 1.0);

        // Fractional results survive the division.
        let price = scale_amount_out(U256::from(1_234_567u64), 6).unwrap();
        assert!((price - 1.234567).abs() < 1e-12);
    }

    #[test]
    fn scales_amounts_past_the_u128_range() {
        let amount = U256::from(u128::MAX) + U256::exp10(18);
        let price = scale_amount_out(amount, 18).unwrap();
        assert!(price > 3.4e20);
    }

    #[test]
    fn zero_output_scales_to_zero() {
        assert_eq!(scale_amount_out(U256::zero(), 6).unwrap(), 0.0);
    }
}
