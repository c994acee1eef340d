use appicon_fetcher::{Catalog, ReqwestFetcher, load_config, logger, patch_files, run_batch};
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "appicon-fetcher", version, about = "Fetch client app icons and wire them into the app config")]
struct Cli {
    /// Project root containing frontend/ and public/
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Fetcher settings (defaults to appicon-fetcher.json in the root, if present)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve and download the icon of every catalog app
    Fetch,

    /// Point iconUrl of allow-listed apps at the downloaded icons
    PatchConfig,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let cfg = load_config(&cli.root, cli.config.as_deref())?;
    let _guard = logger::init(&cfg.log_dir());
    info!(command = ?cli.cmd, root = %cfg.root.display(), "starting");

    match cli.cmd {
        Commands::Fetch => {
            let http = ReqwestFetcher::new()?;
            let report = run_batch(&http, &cfg, &Catalog::builtin()).await?;
            Ok(ExitCode::from(report.exit_code()))
        }
        Commands::PatchConfig => {
            for outcome in patch_files(&cfg)? {
                println!(
                    "Updated iconUrl in: {} ({} entries)",
                    outcome.path.display(),
                    outcome.updated
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
