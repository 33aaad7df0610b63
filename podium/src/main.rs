use clap::{Args, Parser, Subcommand};
use report::Pipeline;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

mod config;
mod telemetry;

#[derive(Parser)]
#[command(name = "podium", about = "Upcoming race driver report")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the report endpoint and the admin listener
    Run(RunArgs),
    /// Build the report once and exit
    Generate(GenerateArgs),
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, short)]
    config: PathBuf,
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, short)]
    config: PathBuf,
    /// Write the CSV here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Skip the upload
    #[arg(long)]
    no_upload: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        CliCommand::Run(args) => &args.config,
        CliCommand::Generate(args) => &args.config,
    };
    let config = config::Config::from_file(config_path)?;

    let _sentry = telemetry::init_logging(config.common.logging.as_ref());
    if let Some(metrics) = &config.common.metrics {
        telemetry::init_metrics(metrics)?;
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        CliCommand::Run(_) => {
            tracing::info!("Starting report service");
            rt.block_on(report::run(config.report))?;
        }
        CliCommand::Generate(args) => {
            rt.block_on(generate(config.report, args))?;
        }
    }

    Ok(())
}

async fn generate(
    config: report::config::Config,
    args: GenerateArgs,
) -> Result<(), Box<dyn Error>> {
    let pipeline = Pipeline::from_config(&config)?;
    let (_, csv) = pipeline.generate().await?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &csv)?;
            tracing::info!(path = %path.display(), "Wrote report");
        }
        None => std::io::stdout().write_all(&csv)?,
    }

    if !args.no_upload {
        pipeline.publisher().publish(csv).await?;
    }

    Ok(())
}
