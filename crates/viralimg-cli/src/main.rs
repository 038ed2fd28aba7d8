mod extract;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use viralimg_core::SourceQuotas;

#[derive(Debug, Parser)]
#[command(name = "viralimg-cli")]
#[command(about = "Collect, score and rank viral images for a search query")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run an extraction session and print its summary as JSON
    Extract {
        /// Search query, e.g. "marketing digital brasil"
        #[arg(long)]
        query: String,

        /// Session identifier; a random UUID when omitted
        #[arg(long)]
        session_id: Option<String>,

        #[command(flatten)]
        quotas: QuotaArgs,
    },
    /// Print the summary of a previously persisted session
    Summary {
        #[arg(long)]
        session_id: String,
    },
}

/// Per-source quota overrides. Unset flags keep the configured quota.
#[derive(Debug, Default, Clone, Args)]
struct QuotaArgs {
    #[arg(long)]
    instagram: Option<usize>,
    #[arg(long)]
    facebook: Option<usize>,
    #[arg(long)]
    youtube: Option<usize>,
    #[arg(long)]
    news: Option<usize>,
    #[arg(long)]
    commercial: Option<usize>,
}

impl QuotaArgs {
    fn apply(&self, quotas: &mut SourceQuotas) {
        let overrides = [
            (viralimg_core::Category::Instagram, self.instagram),
            (viralimg_core::Category::Facebook, self.facebook),
            (viralimg_core::Category::YouTube, self.youtube),
            (viralimg_core::Category::News, self.news),
            (viralimg_core::Category::Commercial, self.commercial),
        ];
        for (category, quota) in overrides {
            if let Some(quota) = quota {
                quotas.set(category, quota);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = viralimg_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            query,
            session_id,
            quotas,
        } => extract::run_extract(config, &query, session_id, &quotas).await,
        Commands::Summary { session_id } => extract::run_summary(&config, &session_id).await,
    }
}
