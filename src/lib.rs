pub mod catalog;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io_utils;
pub mod output;
pub mod reconcile;
pub mod schema;
pub mod snapshot;
pub mod source;
pub mod table;
pub mod watch;

use std::{env, io, sync::OnceLock, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, OutputFormat, SourceArgs},
    config::SourceConfig,
    output::ConsoleConsumer,
    source::DataSource,
};

pub use crate::{
    error::SourceError,
    reconcile::{RowConsumer, RowOp},
    schema::{ColumnSpec, ColumnType, HeaderInfo},
    snapshot::{Row, Snapshot},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_live", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Schema(args) => handle_schema(&args),
        Commands::Show(args) => handle_show(&args.source, args.format),
        Commands::Watch(args) => handle_watch(
            &args.source,
            args.format,
            Duration::from_millis(args.debounce_ms),
        ),
        Commands::List(args) => handle_list(&args),
    }
}

fn accept_config(args: &SourceArgs) -> Result<SourceConfig> {
    let config = SourceConfig::new(&args.input, &args.delimiter)
        .and_then(|config| config.with_encoding(args.input_encoding.as_deref()))
        .with_context(|| format!("Configuring source {:?}", args.input))?;
    info!(
        "Reading '{}' with delimiter '{}'",
        config.path.display(),
        io_utils::printable_delimiter(config.delimiter)
    );
    Ok(config)
}

fn load_source(config: SourceConfig) -> Result<DataSource> {
    let path = config.path.clone();
    let mut source = DataSource::new(config);
    source.load().with_context(|| format!("Loading {path:?}"))?;
    Ok(source)
}

fn handle_schema(args: &SourceArgs) -> Result<()> {
    let source = load_source(accept_config(args)?)?;
    print!("{}", output::render_schema(&source.header()?));
    Ok(())
}

fn handle_show(args: &SourceArgs, format: OutputFormat) -> Result<()> {
    let source = load_source(accept_config(args)?)?;
    let snapshot = source.current_snapshot()?;
    print!("{}", output::render_snapshot(&snapshot, format)?);
    info!("Displayed {} row(s)", snapshot.count());
    Ok(())
}

fn handle_watch(args: &SourceArgs, format: OutputFormat, debounce: Duration) -> Result<()> {
    let config = accept_config(args)?.with_debounce(debounce);
    let mut source = load_source(config)?;
    let snapshot = source.current_snapshot()?;
    print!("{}", output::render_snapshot(&snapshot, format)?);
    source
        .start_updates(ConsoleConsumer::new(format))
        .context("Starting live updates")?;
    info!("Press Enter (or close stdin) to stop watching");

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Waiting on stdin")?;

    source.stop_updates()?;
    info!("Watch ended in state {}", source.state());
    Ok(())
}

fn handle_list(args: &cli::ListArgs) -> Result<()> {
    let candidates = catalog::list_candidates(&args.root)
        .with_context(|| format!("Listing candidate files in {:?}", args.root))?;
    for path in &candidates {
        println!("{}", path.display());
    }
    info!("Found {} candidate file(s)", candidates.len());
    Ok(())
}
