use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use yam_market::chains::ContractId;
use yam_market::contracts::YamContract;
use yam_market::lifecycle::{prepare, Startup};
use yam_market::notifications::{LogNotifier, NotificationId};
use yam_market::observability::LogTarget;
use yam_market::offers::{Offer, OfferFilter, OfferPoller};
use yam_market::sell::{SellActions, SellFormValues, SubmitOutcome, YamSeller};

#[derive(Parser)]
#[command(name = "yam-cli")]
#[command(about = "Browse and create RealToken YAM offers", long_about = None)]
struct Cli {
    /// Configuration file (defaults to $YAM_CONFIG, then yam-market.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Chain to use instead of the one from the last session
    #[arg(long, global = true)]
    chain: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported chains and exchange deployments
    Chains,
    /// List offers
    Offers {
        /// Offers created by the connected account
        #[arg(long, conflicts_with = "buyer")]
        seller: bool,
        /// Offers reserved for the connected account
        #[arg(long)]
        buyer: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create an offer, paying the exchange through a permit signature
    Sell {
        #[arg(long)]
        offer_token: String,
        #[arg(long)]
        buyer_token: String,
        /// Price per offer token, in buyer tokens
        #[arg(long, default_value = "50")]
        price: String,
        /// Offer tokens to sell
        #[arg(long, default_value = "1")]
        amount: String,
        /// Reserve the offer for this buyer
        #[arg(long)]
        private_buyer: Option<String>,
    },
    /// Make another chain the active one
    Switch { chain_id: u64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let startup = prepare(cli.config.as_deref(), LogTarget::Stderr)?;

    match cli.command {
        Commands::Chains => print_chains(&startup),
        Commands::Offers {
            seller,
            buyer,
            json,
        } => {
            let connection = startup.connect(cli.chain)?;
            let contract = YamContract::for_chain(connection.client.clone(), &connection.chain)?
                .with_log_chunk_blocks(startup.config.poller.log_chunk_blocks);
            let poller = OfferPoller::new(Arc::new(contract), startup.config.poller.retry);
            let filter = OfferFilter::from_flags(connection.account(), seller, buyer);
            if filter == OfferFilter::Public && (seller || buyer) {
                eprintln!("No wallet connected, listing public offers");
            }

            let result = poller.fetch(filter).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result.offers)?);
            } else {
                print_offers(&result.offers);
            }
        }
        Commands::Sell {
            offer_token,
            buyer_token,
            price,
            amount,
            private_buyer,
        } => {
            let connection = startup.connect(cli.chain)?;
            let contract = YamContract::for_chain(connection.client.clone(), &connection.chain)?;
            let seller = YamSeller::new(contract, connection.wallet.clone(), connection.chain.clone());
            let actions = SellActions::new(Arc::new(seller), Arc::new(LogNotifier));

            let form = SellFormValues {
                offer_token_address: offer_token,
                buyer_token_address: buyer_token,
                price,
                amount,
                is_private_offer: private_buyer.is_some(),
                buyer_address: private_buyer.unwrap_or_default(),
            };
            match actions.submit(&form).await {
                SubmitOutcome::Submitted {
                    tx_hash,
                    confirmation,
                } => {
                    println!("{tx_hash}");
                    if confirmation.await? != NotificationId::CreateOfferSuccess {
                        return Err("offer transaction did not succeed".into());
                    }
                }
                SubmitOutcome::Skipped(reason) => {
                    return Err(format!("nothing submitted: {reason:?}").into())
                }
                SubmitOutcome::Failed(e) => return Err(e.into()),
            }
        }
        Commands::Switch { chain_id } => {
            let mut connection = startup.connect(None)?;
            connection.switch_chain(
                chain_id,
                &startup.registry,
                &startup.config.blockchain,
                &startup.session,
            )?;
            println!(
                "Active chain: {} ({})",
                connection.chain.chain_name, connection.chain.chain_id
            );
        }
    }

    Ok(())
}

fn print_chains(startup: &Startup) {
    for chain in startup.registry.iter() {
        let deployment = match chain.contract(ContractId::RealTokenYamUpgradeable) {
            Ok((address, from_block)) => format!("{address} (from block {from_block})"),
            Err(_) => "not deployed".to_string(),
        };
        println!(
            "{:>4}  {:<14} {:<6} {}  {}",
            chain.chain_id.as_u64(),
            chain.chain_name,
            chain.native_currency.symbol,
            chain.rpc_url,
            deployment
        );
    }
}

fn print_offers(offers: &[Offer]) {
    if offers.is_empty() {
        println!("No offers");
        return;
    }
    println!(
        "{:>6}  {:<32} {:>14}  {:<16} {:>14}  seller",
        "id", "offer token", "amount", "buyer token", "price"
    );
    for o in offers {
        println!(
            "{:>6}  {:<32} {:>14}  {:<16} {:>14}  {}",
            o.offer_id, o.offer_token_name, o.amount, o.buyer_token_name, o.price, o.seller_address
        );
    }
}
