//! Tessa Control - CLI entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use tessa_common::{CatalogLoader, TessaConfig};
use tessactl::{commands, display, wizard_ui};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tessactl")]
#[command(about = "Tessa - responsible-AI technique catalog", long_about = None)]
#[command(version)]
struct Cli {
    /// Override the configured catalog source (snapshot, remote, mock)
    #[arg(long, global = true)]
    source: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse techniques with filters, search and pagination
    List {
        /// Only techniques with one of these assurance goals
        #[arg(long = "goal")]
        goals: Vec<String>,

        /// Only techniques with one of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Only techniques at one of these complexity levels (1-5)
        #[arg(long = "complexity")]
        complexities: Vec<u8>,

        /// Case-insensitive search over name and description
        #[arg(long)]
        search: Option<String>,

        /// Sort field: name, complexity or slug
        #[arg(long, default_value = "name")]
        sort: String,

        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,

        /// Page to show (0-based)
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Rows per page
        #[arg(long, default_value_t = 20)]
        page_size: usize,

        /// Emit the page as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one technique in full
    Show {
        /// Technique slug
        slug: String,

        /// Fetch from the source, bypassing the cached snapshot
        #[arg(long)]
        fresh: bool,

        /// Emit the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the assurance-goal facet
    Goals,

    /// List the tag facet
    Tags,

    /// Guided technique recommendation
    Wizard {
        /// How many suggestions to show
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Show or change the persisted configuration
    Config {
        /// Persist a new source mode (snapshot, remote, mock)
        #[arg(long)]
        set_source: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => {}
        Err(err) => std::process::exit(display::render_error(&err)),
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Source selection happens exactly once per invocation.
    let mut config = TessaConfig::load()?;
    if let Some(source) = &cli.source {
        config.source.mode = source.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    tracing::debug!("Catalog source: {}", config.source.mode);
    let loader = CatalogLoader::from_config(&config)?;

    match cli.command {
        Commands::List {
            goals,
            tags,
            complexities,
            search,
            sort,
            desc,
            page,
            page_size,
            json,
        } => {
            commands::list(
                &loader,
                commands::ListOptions {
                    goals,
                    tags,
                    complexities,
                    search,
                    sort,
                    descending: desc,
                    page,
                    page_size,
                    json,
                },
            )
            .await
        }
        Commands::Show { slug, fresh, json } => commands::show(&loader, &slug, fresh, json).await,
        Commands::Goals => commands::goals(&loader).await,
        Commands::Tags => commands::tags(&loader).await,
        Commands::Wizard { top } => wizard_ui::run(&loader, top).await,
        Commands::Config { set_source } => commands::config(set_source),
    }
}
