use anyhow::{Context, Result};
use clap::Parser;
use fwbuild::board::BoardCatalog;
use fwbuild::build::{clean, list_boards, BuildOrchestrator};
use fwbuild::config::BuildConfig;
use fwbuild::cli::{
    print_boards, print_build_report, print_build_report_json, sdk_roots, Commands, FwbuildCli,
    OutputFormat,
};
use tracing::info;

fn main() -> Result<()> {
    let cli = FwbuildCli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting fwbuild v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Build(args) => {
            let config = args.to_config(&cli)?;
            let catalog = BoardCatalog::load(&config.sdk_roots)
                .context("Failed to read board definitions")?;
            let report = BuildOrchestrator::new(&config, &catalog)
                .run()
                .with_context(|| format!("Build for board {} failed", config.board))?;
            match args.format {
                OutputFormat::Text => print_build_report(&report),
                OutputFormat::Json => print_build_report_json(&report)?,
            }
        }
        Commands::Clean { project, board } => {
            let config = BuildConfig::new(project, board.clone().unwrap_or_default());
            let target = match board {
                Some(_) => config.build_dir(),
                None => config.build_root(),
            };
            clean(&target)?;
        }
        Commands::ListBoards => {
            let catalog = BoardCatalog::load(&sdk_roots(&cli))
                .context("Failed to read board definitions")?;
            print_boards(&list_boards(&catalog));
        }
    }

    Ok(())
}
