//! CLI entry point for casa-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use casa_rs::commands::search::SearchArgs;

#[derive(Parser)]
#[command(name = "casa-rs")]
#[command(version)]
#[command(about = "Listing search and blog server for a real-estate marketplace", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Search the listing collection
    Search {
        /// City or neighborhood substring
        #[arg(short, long)]
        location: Option<String>,

        /// Bedrooms: 1, 2 or 3+
        #[arg(short, long)]
        beds: Option<String>,

        /// Lowest price, e.g. 20000 or "$20,000"
        #[arg(long)]
        min_price: Option<String>,

        /// Highest price (empty or 0 means no limit)
        #[arg(long)]
        max_price: Option<String>,

        /// Listing type to accept (repeatable)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,
    },

    /// List blog posts
    Posts {
        /// Language code (en, es)
        #[arg(short, long)]
        lang: Option<String>,

        /// Category (buying, selling, renting, investment, market)
        #[arg(long)]
        category: Option<String>,
    },

    /// Print a blog article
    Read {
        /// Article slug
        slug: String,

        /// Language code (en, es)
        #[arg(short, long)]
        lang: Option<String>,

        /// Print rendered HTML instead of Markdown
        #[arg(long)]
        html: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "casa_rs=debug,info"
    } else {
        "casa_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, ip, open } => {
            let site = casa_rs::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            casa_rs::server::start(site, &ip, port, open).await?;
        }

        Commands::Search {
            location,
            beds,
            min_price,
            max_price,
            types,
        } => {
            let site = casa_rs::Site::new(&base_dir)?;
            let args = SearchArgs {
                location,
                beds,
                min_price,
                max_price,
                types,
            };
            casa_rs::commands::search::run(&site, args)?;
        }

        Commands::Posts { lang, category } => {
            let site = casa_rs::Site::new(&base_dir)?;
            casa_rs::commands::posts::run(&site, lang.as_deref(), category.as_deref()).await?;
        }

        Commands::Read { slug, lang, html } => {
            let site = casa_rs::Site::new(&base_dir)?;
            casa_rs::commands::read::run(&site, &slug, lang.as_deref(), html).await?;
        }

        Commands::Version => {
            println!("casa-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
