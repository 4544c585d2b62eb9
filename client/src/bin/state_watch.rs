//! Headless poller: fetches the game state on a fixed interval and logs a
//! summary, the same loop the browser client runs behind its UI.

use anyhow::{anyhow, Result};
use clap::Parser;
use glazery_client::Client;
use glazery_types::Address;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "state-watch")]
struct Args {
    /// Base URL of the game API.
    #[arg(long, default_value = "https://last-game-kappa.vercel.app")]
    base_url: String,

    /// Scope balances and approval status to this address.
    #[arg(long)]
    user_address: Option<String>,

    /// Seconds between polls.
    #[arg(long, default_value_t = 10)]
    interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let client = Client::new(&args.base_url)?;
    let user: Option<Address> = args
        .user_address
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|err| anyhow!("invalid user address: {err}"))?;

    loop {
        match client.game_state(user.as_ref()).await {
            Ok(state) => info!(
                miner = ?state.current_miner.as_ref().map(|a| a.short()),
                price_eth = %state.price_in_eth,
                dps = %state.current_dps_formatted,
                halving_in = state.seconds_until_halving,
                lp_price = %state.blaze.price_formatted,
                needs_approval = state.blaze.user_needs_approval,
                "game state"
            ),
            Err(err) => warn!(error = %err, "fetch failed; retrying next cycle"),
        }
        tokio::time::sleep(Duration::from_secs(args.interval)).await;
    }
}
