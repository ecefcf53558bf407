//! Siteflow CLI - operator tooling for the gateway.
//!
//! # Usage
//!
//! ```bash
//! # Validate the environment and list enabled integrations
//! siteflow config check
//!
//! # Show the dashboard navigation a role sees
//! siteflow nav --role kam
//!
//! # Run PageSpeed Insights for a URL (mobile + desktop)
//! siteflow pagespeed https://siteflow.dev
//!
//! # Score a problem statement with the AI assessor
//! siteflow assess "We manage client projects in spreadsheets"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "siteflow")]
#[command(author, version, about = "Siteflow CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect gateway configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show the navigation visible to a role
    Nav {
        /// Role (`admin`, `kam`, `pl`, `developer`, `customer`)
        #[arg(short, long)]
        role: String,
    },
    /// Run PageSpeed Insights for a URL
    Pagespeed {
        /// Absolute http(s) URL
        url: String,
    },
    /// Score a problem statement with the AI assessor
    Assess {
        /// Problem description
        problem: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load the configuration and report enabled integrations
    Check,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Check => commands::config::check()?,
        },
        Commands::Nav { role } => commands::nav::show(&role)?,
        Commands::Pagespeed { url } => commands::probe::pagespeed(&url).await?,
        Commands::Assess { problem } => commands::probe::assess(&problem).await?,
    }
    Ok(())
}
