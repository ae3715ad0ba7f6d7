//! docqa: answer questions from a folder of PDFs and text files.
//!
//! Usage:
//!   docqa serve [--host 0.0.0.0] [--port 8000]
//!   docqa ask "What happened to Compressor C-101?"
//!   docqa ingest [FOLDER]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docqa_cli::{logging, serve};
use docqa_core::config::Config;
use docqa_rag::QaService;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(name = "docqa", version, about = "Grounded question answering over local documents")]
struct Cli {
    /// Directory holding config.toml; relative paths resolve against it
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ingest the configured folder and answer one question
    Ask { question: String },
    /// Ingest a folder and print the ingestion report
    Ingest { folder: Option<PathBuf> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load_from(&cli.config_dir)?;
    let app = config.app()?;
    let base_dir = config.base_dir().to_path_buf();

    match cli.command {
        Command::Serve { host, port } => {
            let addr = format!(
                "{}:{}",
                host.unwrap_or_else(|| app.server.host.clone()),
                port.unwrap_or(app.server.port)
            );
            let service = Arc::new(QaService::from_config(app, &base_dir)?);
            tokio::runtime::Runtime::new()?.block_on(serve(service, &addr))?;
        }
        Command::Ask { question } => {
            let (service, _) = QaService::bootstrap(app, &base_dir)?;
            println!("{}", service.query(&question)?.trim());
        }
        Command::Ingest { folder } => {
            let service = QaService::from_config(app, &base_dir)?;
            let folder = folder.unwrap_or_else(|| service.data_folder());
            println!("Ingesting {}", folder.display());

            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")?
                    .progress_chars("#>-"),
            );
            let report = service.ingest_folder(Some(&folder), &pb);
            pb.finish_and_clear();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
