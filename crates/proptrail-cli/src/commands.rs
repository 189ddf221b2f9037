use std::io::Write;

use anyhow::Context;
use colored::Colorize;
use proptrail_ledger::{EntityProperties, LedgerError, PropertyLedger, PropertyRecord, RecordFormat};
use proptrail_store::FileKeyValueStore;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

type FileLedger = PropertyLedger<FileKeyValueStore, RecordFormat>;

pub fn run_command(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?
        .with_overrides(cli.store.clone(), cli.namespace.clone());
    debug!(store = %config.store_path.display(), format = ?config.record_format, "configuration loaded");

    match cli.command {
        Command::Init(args) => cmd_init(&config, args, out),
        Command::Write(args) => cmd_write(&config, &cli.format, args, out),
        Command::Query(args) => cmd_query(&config, &cli.format, args, out),
    }
}

fn open_ledger(config: &CliConfig) -> anyhow::Result<FileLedger> {
    let store = FileKeyValueStore::open(&config.store_path)
        .with_context(|| format!("opening store {}", config.store_path.display()))?;
    PropertyLedger::with_config(store, config.record_format, config.ledger_config())
        .map_err(ledger_error)
}

/// Prefix ledger errors with their stable code, e.g. `[NOT_FOUND]`.
fn ledger_error(e: LedgerError) -> anyhow::Error {
    anyhow::anyhow!("[{}] {e}", e.kind())
}

fn cmd_init(config: &CliConfig, args: InitArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let (store, created) = FileKeyValueStore::create(&config.store_path)
        .with_context(|| format!("creating store {}", config.store_path.display()))?;
    let ledger = PropertyLedger::with_config(store, config.record_format, config.ledger_config())
        .map_err(ledger_error)?;
    ledger.init().map_err(ledger_error)?;

    let path = config.store_path.display().to_string();
    if created {
        writeln!(out, "{} Initialized proptrail store in {}", "✓".green().bold(), path.bold())?;
    } else {
        writeln!(out, "Store {} already exists ({} entries)", path.bold(), ledger.store().len())?;
    }

    if args.seed {
        let seeded = ledger
            .seed_samples(chrono::Utc::now().timestamp_millis())
            .map_err(ledger_error)?;
        writeln!(out, "Seeded {} sample properties", seeded.len())?;
    }
    Ok(())
}

fn cmd_write(
    config: &CliConfig,
    format: &OutputFormat,
    args: WriteArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let ledger = open_ledger(config)?;
    let timestamp = args
        .timestamp
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let record = ledger
        .write(&args.entity, &args.property, &args.value, timestamp)
        .map_err(ledger_error)?;

    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?,
        OutputFormat::Text => writeln!(
            out,
            "{} {} {}",
            "✓".green().bold(),
            args.entity.cyan(),
            render_record(&record)
        )?,
    }
    Ok(())
}

fn cmd_query(
    config: &CliConfig,
    format: &OutputFormat,
    args: QueryArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let ledger = open_ledger(config)?;
    let found = ledger.query(&args.entity).map_err(ledger_error)?;

    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&found)?)?,
        OutputFormat::Text => write!(out, "{}", render_entity(&found))?,
    }
    Ok(())
}

fn render_record(record: &PropertyRecord) -> String {
    format!(
        "{} = {} {}",
        record.name().yellow(),
        record.value(),
        format!("(@{})", record.timestamp()).dimmed()
    )
}

fn render_entity(found: &EntityProperties) -> String {
    let mut text = format!("{} ({} properties)\n", found.entity_id().cyan().bold(), found.len());
    for record in found.properties() {
        text.push_str("  ");
        text.push_str(&render_record(record));
        text.push('\n');
    }
    text
}
