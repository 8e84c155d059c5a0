use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zeroreport_core::config_file;
use zeroreport_core::{DEFAULT_STAGING_PREFIX, ExtractionRequest, Extractor, today_utc};
use zeroreport_pdf_mupdf::MupdfBackend;
use zeroreport_store::{HttpObjectStore, LocalObjectStore, ObjectStore};

mod job;
mod output;
mod params;

use output::ColorMode;
use params::{RunArgs, StorageTarget};

/// Zero-report ingest - validate a PDF and stage its metadata record
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a PDF from object storage and write its metadata record
    Run(RunArgs),

    /// Extract a local PDF and print the record without touching storage
    Inspect {
        /// Path to the PDF
        file_path: PathBuf,

        /// Source key used to derive doc_id [default: the file name]
        #[arg(long)]
        key: Option<String>,

        /// Pages scanned for the Hebrew text sample
        #[arg(long)]
        max_text_pages: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let (argv, ignored) = params::split_unknown_run_flags(&Cli::command(), std::env::args_os());
    let cli = Cli::parse_from(argv);
    init_tracing(cli.verbose);
    if !ignored.is_empty() {
        tracing::debug!(?ignored, "ignoring unrecognized job arguments");
    }

    let config = config_file::load_config();

    match cli.command {
        Command::Run(args) => run(args, &config).await,
        Command::Inspect {
            file_path,
            key,
            max_text_pages,
            no_color,
        } => inspect(file_path, key, max_text_pages, no_color, &config),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: RunArgs, config: &config_file::ConfigFile) -> anyhow::Result<ExitCode> {
    let (params, target) = params::resolve(args, config, &|k: &str| std::env::var(k).ok())?;

    let store: Box<dyn ObjectStore> = match target {
        StorageTarget::Local { root } => {
            if !root.is_dir() {
                anyhow::bail!("Local store root not found: {}", root.display());
            }
            Box::new(LocalObjectStore::new(root))
        }
        StorageTarget::Http { endpoint, timeout } => Box::new(
            HttpObjectStore::new(endpoint, timeout).context("failed to build HTTP client")?,
        ),
    };

    tracing::info!(
        bucket = %params.source_bucket,
        key = %params.source_key,
        out_bucket = %params.out_bucket,
        store = store.name(),
        "starting extraction"
    );

    let backend = MupdfBackend::new();
    let outcome = job::run_job(store.as_ref(), &backend, &params, today_utc()).await?;

    println!("{}", output::summary_line(&outcome)?);
    Ok(ExitCode::from(outcome.exit_code(&params)))
}

fn inspect(
    file_path: PathBuf,
    key: Option<String>,
    max_text_pages: Option<usize>,
    no_color: bool,
    config: &config_file::ConfigFile,
) -> anyhow::Result<ExitCode> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }
    let bytes = std::fs::read(&file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;

    let key = key.unwrap_or_else(|| {
        file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string())
    });
    let job_config = config.job.clone().unwrap_or_default();
    let request = ExtractionRequest::new(
        "local",
        key,
        job_config
            .staging_prefix
            .unwrap_or_else(|| DEFAULT_STAGING_PREFIX.to_string()),
    );
    let max_text_pages = max_text_pages
        .or(job_config.max_text_pages)
        .unwrap_or(zeroreport_core::DEFAULT_MAX_TEXT_PAGES);

    let backend = MupdfBackend::new();
    let result = Extractor::new(&backend)
        .with_max_text_pages(max_text_pages)
        .extract(&request, &bytes);

    let color = ColorMode(!no_color && std::io::stdout().is_terminal());
    let mut stdout = std::io::stdout().lock();
    output::print_record(&mut stdout, &result, color)?;

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(job::EXIT_ERROR_RECORD)
    })
}
