//! Yarnshop CLI - the storefront client and database tools.
//!
//! # Usage
//!
//! ```bash
//! # Create an account and sign in
//! yarnshop register -u weaver -p secret
//! yarnshop login -u weaver -p secret
//!
//! # Browse the catalog
//! yarnshop products --search cotton --sort price-asc
//! yarnshop product 2
//!
//! # Fill the cart and check out
//! yarnshop cart add 2 -q 3
//! yarnshop checkout --full-name "Ada L" --address "1 Loom St" --city Pune --postal-code 411001
//!
//! # Yarn recommendations
//! yarnshop recommend --purpose knitting --price-range budget
//!
//! # Database tools
//! yarnshop migrate
//! yarnshop seed --file catalog.yaml
//! ```
//!
//! Client state (token, username, cart) is kept in `storage.json` under the
//! data directory (`--data-dir`, `YARNSHOP_HOME`, default `~/.yarnshop`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use yarnshop_core::checkout::{DeliveryMethod, PaymentDetails, ShippingInfo};
use yarnshop_core::{ProductId, Quantity};

mod client;
mod commands;
mod error;
mod store;

use commands::checkout::CheckoutForm;
use commands::recommend::FacetArgs;
use commands::{Access, Context};
use error::CliError;

const DEFAULT_API_URL: &str = "http://localhost:5004";

#[derive(Parser)]
#[command(name = "yarnshop")]
#[command(author, version, about = "Yarnshop storefront client")]
struct Cli {
    /// Base URL of the yarnshop API
    #[arg(long, global = true, env = "YARNSHOP_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Directory holding client state
    #[arg(long, global = true, env = "YARNSHOP_HOME")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign in and remember the token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored credentials
    Logout,
    /// Show who is signed in
    Whoami,
    /// List products
    Products {
        /// Case-insensitive text matched against name and description
        #[arg(short, long, default_value = "")]
        search: String,
        /// price-asc, price-desc, name-asc or name-desc
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show one product
    Product { id: ProductId },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out the cart
    Checkout {
        #[arg(long, default_value = "")]
        full_name: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        postal_code: String,
        /// standard (3-5 days) or express (1-2 days)
        #[arg(long, default_value = "standard")]
        delivery: String,
        #[arg(long, default_value = "")]
        card_number: String,
        #[arg(long, default_value = "")]
        expiry: String,
        #[arg(long, default_value = "")]
        cvv: String,
    },
    /// Recommend yarns by purpose, color and price range
    Recommend {
        #[arg(long)]
        purpose: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        price_range: Option<String>,
        /// JSON file replacing the built-in recommendation catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Show user and product totals
    Stats,
    /// Run database migrations
    Migrate,
    /// Insert products into the catalog
    Seed {
        /// YAML list of products; defaults to the sample yarns
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        id: ProductId,
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Set a line's quantity (values below 1 become 1)
    Update {
        id: ProductId,
        #[arg(short, long, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

impl Commands {
    const fn access(&self) -> Access {
        match self {
            Self::Register { .. } | Self::Login { .. } => Access::GuestOnly,
            Self::Products { .. }
            | Self::Product { .. }
            | Self::Cart { .. }
            | Self::Checkout { .. }
            | Self::Recommend { .. } => Access::LoginRequired,
            Self::Logout | Self::Whoami | Self::Stats | Self::Migrate | Self::Seed { .. } => {
                Access::Open
            }
        }
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".yarnshop")
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Database tools need no client state
    match &cli.command {
        Commands::Migrate => return commands::migrate::run().await,
        Commands::Seed { file } => return commands::seed::run(file.as_deref()).await,
        _ => {}
    }

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let ctx = Context::open(&data_dir, cli.api_url)?;
    cli.command.access().check(&ctx.oracle().status())?;

    match cli.command {
        Commands::Register { username, password } => {
            commands::account::register(&ctx, &username, &password).await?;
        }
        Commands::Login { username, password } => {
            commands::account::login(&ctx, &username, &password).await?;
        }
        Commands::Logout => commands::account::logout(&ctx)?,
        Commands::Whoami => commands::account::whoami(&ctx),
        Commands::Products { search, sort } => {
            commands::catalog::products(&ctx, &search, sort.as_deref()).await?;
        }
        Commands::Product { id } => commands::catalog::product(&ctx, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { id, quantity } => {
                let quantity = Quantity::new(quantity).unwrap_or(Quantity::ONE);
                commands::cart::add(&ctx, id, quantity).await?;
            }
            CartAction::Update { id, quantity } => commands::cart::update(&ctx, id, quantity)?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, id)?,
            CartAction::Clear => commands::cart::clear(&ctx)?,
        },
        Commands::Checkout {
            full_name,
            address,
            city,
            postal_code,
            delivery,
            card_number,
            expiry,
            cvv,
        } => {
            let form = CheckoutForm {
                shipping: ShippingInfo {
                    full_name,
                    address_line1: address,
                    city,
                    postal_code,
                },
                delivery: delivery.parse::<DeliveryMethod>()?,
                payment: PaymentDetails {
                    card_number,
                    expiry,
                    cvv,
                },
            };
            commands::checkout::run(&ctx, form)?;
        }
        Commands::Recommend {
            purpose,
            color,
            price_range,
            catalog,
        } => {
            let facets = FacetArgs {
                purpose,
                color,
                price_range,
            };
            commands::recommend::run(&facets, catalog.as_deref())?;
        }
        Commands::Stats => commands::catalog::stats(&ctx).await?,
        Commands::Migrate | Commands::Seed { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_command_access() {
        let cli = Cli::try_parse_from(["yarnshop", "login", "-u", "a", "-p", "b"]).unwrap();
        assert_eq!(cli.command.access(), Access::GuestOnly);

        let cli = Cli::try_parse_from(["yarnshop", "cart", "add", "3", "-q", "2"]).unwrap();
        assert_eq!(cli.command.access(), Access::LoginRequired);

        let cli = Cli::try_parse_from(["yarnshop", "stats"]).unwrap();
        assert_eq!(cli.command.access(), Access::Open);
    }

    #[test]
    fn test_cart_add_rejects_zero_quantity() {
        assert!(Cli::try_parse_from(["yarnshop", "cart", "add", "3", "-q", "0"]).is_err());
    }

    #[test]
    fn test_cart_update_accepts_negative_quantity() {
        let cli =
            Cli::try_parse_from(["yarnshop", "cart", "update", "3", "-q", "-4"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Update { quantity: -4, .. }
            }
        ));
    }
}
