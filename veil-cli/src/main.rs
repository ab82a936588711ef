use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veil_core::Locale;
use veil_extract::{ExtractionOrchestrator, ExtractionWorker, OpenAiCompatibleClient};
use veil_ingest::PatternRedactor;

mod auth;
mod config;
mod output;
mod state;

use output::Format;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VEIL_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "veil", version = VERSION, about = "Redact bank statements and extract transactions")]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace personal data in statement text with placeholders
    Redact {
        /// Statement text file (`-` for stdin)
        input: PathBuf,

        /// Write anonymized text here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List every substitution (with the original text) on stderr
        #[arg(long)]
        show_redactions: bool,
    },

    /// Extract categorized transactions from anonymized statement text
    Analyze {
        /// Statement text file (`-` for stdin)
        input: PathBuf,

        /// Source name stamped on every record (default: input file name)
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        locale: Option<Locale>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        #[arg(long)]
        max_chunk_chars: Option<usize>,

        /// Maximum in-flight model requests
        #[arg(long)]
        concurrency: Option<usize>,

        /// Run the redactor over the input before sending it (reviewed
        /// edits that undo a redaction are lost)
        #[arg(long)]
        redact: bool,
    },

    /// Print the category vocabulary
    Categories {
        #[arg(long)]
        locale: Option<Locale>,
    },

    /// Manage $VEIL_HOME/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage the model endpoint credential
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Prompt for an API key and store it in $VEIL_HOME/auth.json
    SetKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match cli.command {
        Command::Redact {
            input,
            output,
            show_redactions,
        } => redact(input, output, show_redactions)?,

        Command::Analyze {
            input,
            source,
            locale,
            format,
            max_chunk_chars,
            concurrency,
            redact,
        } => {
            analyze(AnalyzeArgs {
                input,
                source,
                locale,
                format,
                max_chunk_chars,
                concurrency,
                redact,
            })
            .await?
        }

        Command::Categories { locale } => {
            let locale = match locale {
                Some(l) => l,
                None => config::load_config()?.extraction.locale,
            };
            for label in locale.category_labels() {
                println!("{label}");
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Auth { command } => match command {
            AuthCommand::SetKey => auth::set_key()?,
        },
    }

    Ok(())
}

fn redact(input: PathBuf, output: Option<PathBuf>, show_redactions: bool) -> Result<()> {
    let text = state::read_input(&input)?;
    let redactor = PatternRedactor::default();
    let redaction = redactor.redact(&text);

    for (class, n) in redaction.counts() {
        info!(class = %class, count = n, "redacted");
    }
    if show_redactions {
        let mut err = io::stderr().lock();
        for event in &redaction.events {
            writeln!(err, "{}\t{}", event.class, event.original)?;
        }
    }

    match output {
        Some(path) => std::fs::write(&path, &redaction.text)
            .with_context(|| format!("write {}", path.display()))?,
        None => io::stdout().lock().write_all(redaction.text.as_bytes())?,
    }
    Ok(())
}

struct AnalyzeArgs {
    input: PathBuf,
    source: Option<String>,
    locale: Option<Locale>,
    format: Format,
    max_chunk_chars: Option<usize>,
    concurrency: Option<usize>,
    redact: bool,
}

async fn analyze(args: AnalyzeArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let locale = args.locale.unwrap_or(cfg.extraction.locale);
    let model_config = cfg.model_config(auth::resolve_api_key()?, locale);
    let year = cfg.reference_year()?;

    let text = prepare_input(state::read_input(&args.input)?, args.redact);

    let client = Arc::new(OpenAiCompatibleClient::new(&model_config)?);
    let worker = ExtractionWorker::new(client, &model_config, year);
    let orchestrator = ExtractionOrchestrator::new(Arc::new(worker))
        .with_max_chunk_chars(args.max_chunk_chars.unwrap_or(cfg.extraction.max_chunk_chars))
        .with_max_concurrency(args.concurrency.unwrap_or(cfg.extraction.max_concurrency));

    let report = orchestrator.analyze_report(&text).await;
    if report.came_back_empty() {
        warn!(
            chunks = report.chunk_count,
            aborted = report.aborted_chunks,
            "no transactions extracted; check the model endpoint and the input text"
        );
    }

    let source = args
        .source
        .unwrap_or_else(|| state::default_source(&args.input));
    let mut transactions = report.transactions;
    transactions.sort_by(|a, b| a.date.cmp(&b.date));
    let records: Vec<_> = transactions
        .into_iter()
        .map(|t| t.into_record(source.clone(), locale))
        .collect();

    info!(records = records.len(), "writing records");
    output::write_records(io::stdout().lock(), &records, args.format)
}

/// Text for the model. Reviewed input is sent as written; the redactor only
/// flags what it would still mask unless `redact` is set.
fn prepare_input(text: String, redact: bool) -> String {
    let redaction = PatternRedactor::default().redact(&text);
    if redaction.is_clean() {
        return text;
    }
    if redact {
        info!(substitutions = redaction.events.len(), "redacted input before sending");
        return redaction.text;
    }
    for (class, n) in redaction.counts() {
        warn!(class = %class, count = n, "input may still contain personal data; sending as reviewed");
    }
    text
}
