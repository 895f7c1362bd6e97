//! Cost analysis CLI
//!
//! Estimates AWS service and architecture costs, applies the enterprise
//! discount, compares against on-premises spend and lists optimizations.
//! Runs the analyzer in-process unless an agent URL is configured.

mod backend;
mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use commands::{catalog, estimate, parse_assignments, savings, settings};
use rust_decimal::Decimal;
use std::path::PathBuf;

use backend::Backend;
use output::OutputFormat;

/// AWS architecture cost analysis
#[derive(Parser)]
#[command(name = "costctl")]
#[command(author, version, about = "CLI for AWS architecture cost analysis", long_about = None)]
pub struct Cli {
    /// Cost agent URL; when unset the analyzer runs locally
    #[arg(long, env = "COSTCTL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// JSON pricing catalog for local runs (defaults to built-in prices)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// AWS region recorded on estimates
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the monthly cost of one service
    Estimate {
        /// Exact catalog service name, e.g. "Amazon EC2"
        service: String,

        /// Configuration entry as key=value (repeatable), e.g. instances=3
        #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
        settings: Vec<String>,
    },

    /// Estimate a whole architecture from a JSON file ("-" for stdin)
    Total {
        architecture: PathBuf,

        /// Also compare against this on-premises monthly cost
        #[arg(long)]
        onprem: Option<Decimal>,

        /// Also apply the ANZ enterprise discount to the total
        #[arg(long)]
        discount: bool,
    },

    /// Apply the ANZ enterprise discount to a monthly cost
    Discount { base_cost: Decimal },

    /// List optimizations for a cost breakdown or saved estimate ("-" for stdin)
    Optimize { breakdown: PathBuf },

    /// Compare on-premises and AWS monthly costs
    Compare {
        #[arg(long)]
        onprem: Decimal,

        #[arg(long)]
        aws: Decimal,
    },

    /// Show the pricing catalog, or one service's prices
    Catalog { service: Option<String> },

    /// Show or change persistent defaults
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current configuration
    Show,

    /// Set a key (api_url, region, catalog, format); an empty value clears it
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;

    if let Commands::Config(config_cmd) = &cli.command {
        return match config_cmd {
            ConfigCommands::Show => settings::show(&config),
            ConfigCommands::Set { key, value } => settings::set(key, value),
        };
    }

    let format = match (cli.format, config.format.as_deref()) {
        (Some(format), _) => format,
        (None, Some(name)) => OutputFormat::from_str(name, true)
            .map_err(|e| anyhow::anyhow!("Invalid format '{}' in config: {}", name, e))?,
        (None, None) => OutputFormat::default(),
    };
    let region = cli.region.or(config.region.clone());

    let backend = match cli.api_url.or(config.api_url.clone()) {
        Some(url) => Backend::remote(&url)?,
        None => Backend::local(
            cli.catalog.or(config.catalog.clone()).as_deref(),
            region.as_deref(),
        )?,
    };

    match cli.command {
        Commands::Estimate {
            service,
            settings: pairs,
        } => {
            let configuration = parse_assignments(&pairs)?;
            estimate::estimate_service(&backend, &service, configuration, region.as_deref(), format)
                .await?;
        }
        Commands::Total {
            architecture,
            onprem,
            discount,
        } => {
            estimate::estimate_total(
                &backend,
                &architecture,
                region.as_deref(),
                onprem,
                discount,
                format,
            )
            .await?;
        }
        Commands::Discount { base_cost } => {
            savings::discount(&backend, base_cost, format).await?;
        }
        Commands::Optimize { breakdown } => {
            savings::optimize(&backend, &breakdown, format).await?;
        }
        Commands::Compare { onprem, aws } => {
            savings::compare(&backend, onprem, aws, format).await?;
        }
        Commands::Catalog { service } => {
            catalog::show_catalog(&backend, service.as_deref(), format).await?;
        }
        Commands::Config(_) => {}
    }

    Ok(())
}
