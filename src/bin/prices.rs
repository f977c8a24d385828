//! Demonstration harness: fetch and print native-asset prices for one
//! chain (first CLI argument) or all supported chains.

use eyre::Result;
use std::env;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dexprice::{get_all_prices, get_price, ChainId, FetchOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("ethers_providers=warn".parse()?)
        .add_directive("dexprice=info".parse()?)
        .add_directive("prices=info".parse()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = FetchOptions::default();

    match env::args().nth(1) {
        Some(name) => {
            let chain: ChainId = name.parse()?;
            let result = get_price(chain, &options).await?;
            println!("{}: ${:.2} ({})", result.chain, result.price, result.symbol);
        }
        None => {
            info!("Fetching prices for all supported chains");
            let prices = get_all_prices(&options).await;
            if prices.is_empty() {
                eyre::bail!("no chain produced a price");
            }
            for chain in ChainId::all() {
                if let Some(result) = prices.get(&chain) {
                    println!("{}: ${:.2} ({})", chain, result.price, result.symbol);
                }
            }
        }
    }

    Ok(())
}
