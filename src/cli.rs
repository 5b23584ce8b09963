use crate::model::RunConfig;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "brand-mention-cli",
    version,
    about = "Check whether AI-generated answers mention your brand"
)]
pub struct Cli {
    /// Base URL for the mention-check backend
    #[arg(
        long,
        env = "BRAND_CHECK_BASE_URL",
        default_value = "http://localhost:4000"
    )]
    pub base_url: String,

    /// Write CSV exports to this path instead of a generated filename
    #[arg(long)]
    pub export_csv: Option<std::path::PathBuf>,

    /// Prefill the brand field (useful when sweeping one brand across prompts)
    #[arg(long)]
    pub brand: Option<String>,
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        base_url: args.base_url.clone(),
        user_agent: format!("brand-mention-cli/{}", env!("CARGO_PKG_VERSION")),
        export_csv: args.export_csv.clone(),
        initial_brand: args.brand.clone(),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    // Logging is off unless RUST_LOG opts in; events go to stderr before the
    // alternate screen takes over and after it is restored.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    crate::tui::run(args).await
}
