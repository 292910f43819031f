use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use lapdash::cli::{self, Context, OutputFormat};
use lapdash::config;
use lapdash::panels::trend::TrendRequest;
use lapdash::web;

#[derive(Debug, Parser)]
#[command(name = "lapdash")]
#[command(about = "Laptop market analytics dashboard")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Market overview: summary, brand table and distribution charts
    Overview {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Compare a brand against its competitors
    Competitive {
        /// Brand to analyze
        #[arg(long)]
        brand: String,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Predict the price trend, optionally narrowed by brand and RAM
    Trend {
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        ram: Option<String>,
        /// Days to predict (backend default when omitted)
        #[arg(long)]
        days: Option<u32>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Review sentiment and average rating for a brand
    Sentiment {
        #[arg(long)]
        brand: String,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Market segmentation by clustering
    Clusters {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List brand filter options
    Brands {
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List RAM filter options, optionally for one brand
    Rams {
        #[arg(long)]
        brand: Option<String>,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Serve the dashboard in the browser
    Web {
        /// Listen address (default from `[web] addr`)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Check backend reachability, config files and the request log
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config to ~/.lapdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `api.base_url http://10.0.0.5:5000`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let config = config::load();

    // RUST_LOG wins over `[logging] level`.
    env_logger::Builder::from_env(Env::default().default_filter_or(config.logging.level.as_str()))
        .init();
    if !config.display.color {
        colored::control::set_override(false);
    }

    let ctx = Context::from_config(&config);
    let fmt = |s: &str| OutputFormat::from_str_opt(Some(s));

    match app.command {
        Commands::Overview { format } => cli::run_overview(&ctx, fmt(&format)),
        Commands::Competitive { brand, format } => cli::run_competitive(&ctx, &brand, fmt(&format)),
        Commands::Trend {
            brand,
            ram,
            days,
            format,
        } => {
            let request = TrendRequest::new(brand.as_deref(), ram.as_deref(), days);
            cli::run_trend(&ctx, &request, fmt(&format))
        }
        Commands::Sentiment { brand, format } => cli::run_sentiment(&ctx, &brand, fmt(&format)),
        Commands::Clusters { format } => cli::run_clusters(&ctx, fmt(&format)),
        Commands::Brands { format } => cli::run_brands(&ctx, fmt(&format)),
        Commands::Rams { brand, format } => cli::run_rams(&ctx, brand.as_deref(), fmt(&format)),
        Commands::Web { addr } => {
            let addr = addr.unwrap_or_else(|| config.web.addr.clone());
            web::serve(&config, &addr)
        }
        Commands::Health => cli::run_health(&ctx),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
