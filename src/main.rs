//! RealToken YAM market daemon
//!
//! Keeps the offer book of the active chain up to date and logs every change.
//!
//! # Architecture Overview
//!
//! ```text
//!   yam-market.toml ──▶ config ──▶ chains registry ──▶ connection (network + local key)
//!                                                          │
//!                                                          ▼
//!   Ctrl-C ──▶ Shutdown ──▶ OfferBook::run ◀── OfferPoller ◀── YamContract ◀── BlockchainClient
//!                               │
//!                               ▼
//!                        watch::Receiver ──▶ log
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use yam_market::contracts::YamContract;
use yam_market::lifecycle::{prepare, wait_for_signal, Shutdown};
use yam_market::observability::{metrics, LogTarget};
use yam_market::offers::{OfferBook, OfferBookState, OfferFilter, OfferPoller};

#[derive(Parser)]
#[command(name = "yam-market")]
#[command(about = "Follow the RealToken YAM offer book", long_about = None)]
struct Args {
    /// Configuration file (defaults to $YAM_CONFIG, then yam-market.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chain to follow instead of the one from the last session
    #[arg(long)]
    chain: Option<u64>,

    /// Only offers created by the connected account
    #[arg(long, conflicts_with = "buyer")]
    seller: bool,

    /// Only offers reserved for the connected account
    #[arg(long)]
    buyer: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let startup = prepare(args.config.as_deref(), LogTarget::Stdout)?;
    let config = &startup.config;

    tracing::info!("yam-market v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let connection = startup.connect(args.chain)?;
    if let Err(e) = connection.client.verify_chain_id().await {
        tracing::warn!(error = %e, "Could not verify chain id");
    }
    if !connection.client.is_healthy().await {
        tracing::warn!(chain_id = %connection.chain.chain_id, "RPC unreachable at startup");
    }

    let contract = YamContract::for_chain(connection.client.clone(), &connection.chain)?
        .with_log_chunk_blocks(config.poller.log_chunk_blocks);
    let filter = OfferFilter::from_flags(connection.account(), args.seller, args.buyer);
    let poller = OfferPoller::new(Arc::new(contract), config.poller.retry);
    let book = OfferBook::new(
        poller,
        filter,
        Duration::from_secs(config.poller.interval_secs),
    );

    let mut updates = book.subscribe();
    let shutdown = Shutdown::new();
    let book_task = tokio::spawn(book.run(shutdown.subscribe()));

    let explorer = connection.chain.block_explorer_url.clone();
    let listing = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if let OfferBookState::Ready(offers) = state {
                tracing::info!(count = offers.len(), explorer = %explorer, "Offer book updated");
                for offer in &offers {
                    tracing::debug!(
                        offer_id = %offer.offer_id,
                        offer_token = %offer.offer_token_name,
                        buyer_token = %offer.buyer_token_name,
                        price = %offer.price,
                        amount = %offer.amount,
                        seller = %offer.seller_address,
                        "Offer"
                    );
                }
            }
        }
    });

    wait_for_signal().await?;
    shutdown.trigger();
    book_task.await?;
    listing.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
