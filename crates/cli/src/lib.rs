pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use storefront_core::config::{AppConfig, ConfigOverrides, LoadOptions};

use commands::order::OrderRequest;

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront inventory CLI",
    long_about = "Browse the store inventory, check stock totals, and place orders against a product catalog.",
    after_help = "Examples:\n  storefront list\n  storefront order --item 1:2 --item 5:1\n  storefront shop"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Catalog file to load instead of the configured one")]
    catalog: Option<PathBuf>,
    #[arg(long, global = true, help = "Config file to read instead of storefront.toml")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List active products numbered by position")]
    List,
    #[command(about = "Show the total quantity of items in the store")]
    Total,
    #[command(about = "Place an order by listing position and return the receipt")]
    Order {
        #[arg(long = "item", value_name = "N:QTY", help = "Product position and quantity")]
        items: Vec<OrderRequest>,
    },
    #[command(about = "Start the interactive store menu")]
    Shop,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                catalog_path: self.catalog.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    // Config errors are reported by the command itself.
    if let Ok(config) = AppConfig::load(options.clone()) {
        logging::init(&config.logging);
    }

    let result = match cli.command {
        Command::List => commands::list::run(options),
        Command::Total => commands::total::run(options),
        Command::Order { items } => commands::order::run(options, &items),
        Command::Shop => commands::shop::run(options),
        Command::Config => commands::config::run(options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
