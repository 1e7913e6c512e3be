//! broker-derive - award derivation host
//!
//! Reads raw transactions as JSON lines, derives every record against a
//! reference snapshot loaded from the SQLite store, and writes the enriched
//! records back out as JSON lines.
//!
//! ```text
//! broker-derive fabs --input submission.jsonl --output derived.jsonl --job-id 42
//! broker-derive fpds --atom idv --input feed.jsonl
//! ```

use anyhow::{Context, Result};
use broker_common::config::{BrokerConfig, CliOverrides, ConfigResolver};
use broker_common::SystemClock;
use broker_derive::db::{connect_readonly, load_snapshot};
use broker_derive::{
    derive_batch, AtomType, BatchItem, Derivation, DerivationSink, FabsDerivation, FpdsDerivation,
    TracingSink,
};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "broker-derive", version, about = "Derive award records against reference data")]
struct Cli {
    /// TOML config file (default: <config dir>/broker/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference database path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Concurrent derivation workers
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Derive financial-assistance (FABS) records
    Fabs(IoArgs),
    /// Derive procurement (FPDS) records
    Fpds {
        #[command(flatten)]
        io: IoArgs,

        /// Feed the records came from
        #[arg(long, default_value = "award")]
        atom: AtomType,
    },
}

#[derive(Debug, Args)]
struct IoArgs {
    /// JSON-lines input (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON-lines output (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Job id for records that carry none
    #[arg(long)]
    job_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigResolver::new(CliOverrides {
        config_file: cli.config.clone(),
        database_path: cli.database.clone(),
        log_level: cli.log_level.clone(),
        workers: cli.workers,
    })
    .resolve()
    .context("Failed to resolve configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting broker-derive {}", env!("CARGO_PKG_VERSION"));
    info!("Reference database: {}", config.database_path.display());

    let pool = connect_readonly(&config.database_path).await?;
    let snapshot = Arc::new(load_snapshot(&pool).await?);
    pool.close().await;

    let sink: Arc<dyn DerivationSink> = Arc::new(TracingSink);
    let clock = Arc::new(SystemClock);

    match cli.command {
        Command::Fabs(io_args) => {
            let derivation = FabsDerivation::new(snapshot, sink, clock);
            run(Arc::new(derivation), &io_args, &config).await
        }
        Command::Fpds { io: io_args, atom } => {
            info!("FPDS feed: {}", atom);
            let derivation = FpdsDerivation::new(snapshot, sink, clock, atom);
            run(Arc::new(derivation), &io_args, &config).await
        }
    }
}

async fn run<D>(derivation: Arc<D>, io_args: &IoArgs, config: &BrokerConfig) -> Result<()>
where
    D: Derivation + 'static,
{
    let items = read_items(derivation.as_ref(), io_args)?;
    let count = items.len();
    info!(records = count, derivation = derivation.name(), "Read input records");

    let records = derive_batch(derivation, items, config.workers, config.batch_size).await?;
    write_records(&records, io_args.output.as_ref())?;

    info!(records = count, "Derivation complete");
    Ok(())
}

fn read_items<D: Derivation>(derivation: &D, io_args: &IoArgs) -> Result<Vec<BatchItem<D::Record>>> {
    let reader: Box<dyn BufRead> = match &io_args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut items = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;
        let object = match serde_json::from_str::<Value>(&line)
            .with_context(|| format!("Line {}: invalid JSON", line_no))?
        {
            Value::Object(map) => map,
            _ => anyhow::bail!("Line {}: expected a JSON object", line_no),
        };
        let (record, ctx) = derivation
            .prepare(object, io_args.job_id.as_deref())
            .with_context(|| format!("Line {}", line_no))?;
        items.push(BatchItem::new(record, ctx));
    }
    Ok(items)
}

fn write_records<R: serde::Serialize>(records: &[R], output: Option<&PathBuf>) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    for record in records {
        serde_json::to_writer(&mut writer, record).context("Failed to serialize record")?;
        writer.write_all(b"\n")?;
    }
    writer.flush().context("Failed to flush output")?;
    Ok(())
}
