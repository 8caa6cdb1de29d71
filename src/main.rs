use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use harvest::config::{CacheKind, Config, ValidationMode};
use harvest::fetcher::HttpSource;
use harvest::mime::SniffingDetector;
use harvest::stream::{ByteSource, FileSource, FileStreamCache, MemoryStreamCache};
use harvest::validator::Validator;
use harvest::writer::{JsonLinesWriter, NTriplesWriter, SharedHandler};
use harvest::{
    DocumentLocator, ExtractionReport, ExtractorGroup, ExtractorRegistry,
    SingleDocumentExtraction, TripleHandler,
};

type Sink = SharedHandler<Box<dyn TripleHandler + Send>>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Ntriples,
    Json,
}

/// Extract structured data from web pages and local documents.
#[derive(Debug, Parser)]
#[command(name = "harvest", version)]
struct Args {
    /// URLs or local paths to process
    #[arg(required_unless_present = "list_extractors")]
    documents: Vec<String>,

    /// Extractors to run, comma separated (default: all)
    #[arg(short, long, value_delimiter = ',')]
    extractors: Vec<String>,

    /// Output format for statements on stdout
    #[arg(short, long, value_enum, default_value_t = Format::Ntriples)]
    format: Format,

    /// Where document bytes are kept during a run: memory or file
    #[arg(long)]
    cache: Option<CacheKind>,

    /// Run every selected extractor without sniffing the content type
    #[arg(long)]
    no_detect: bool,

    /// Tree validation: off, report or fix
    #[arg(long)]
    validation: Option<ValidationMode>,

    /// Print each run's report as JSON on stderr
    #[arg(long)]
    report: bool,

    /// Number of documents processed at once
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// List available extractors and exit
    #[arg(long)]
    list_extractors: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn to_locator(input: &str) -> Result<DocumentLocator> {
    match DocumentLocator::parse(input) {
        Ok(locator) => Ok(locator),
        Err(_) => DocumentLocator::from_path(input)
            .with_context(|| format!("'{input}' is neither a URL nor a readable path")),
    }
}

fn process(
    document: &str,
    config: &Config,
    http: HttpSource,
    extractors: ExtractorGroup,
    sink: Sink,
) -> Result<ExtractionReport> {
    let locator = to_locator(document)?;
    let source: Box<dyn ByteSource> = match locator.as_url().scheme() {
        "file" => Box::new(FileSource::new()),
        _ => Box::new(http),
    };

    let mut extraction = SingleDocumentExtraction::for_locator(source, locator, extractors, sink);
    extraction = match config.stream_cache() {
        CacheKind::Memory => extraction.with_stream_cache(MemoryStreamCache::new()),
        CacheKind::File => extraction.with_stream_cache(FileStreamCache::new()),
    };
    if config.detect_content_type() {
        extraction = extraction.with_detector(SniffingDetector::new());
    }
    extraction = match config.validation() {
        ValidationMode::Off => extraction,
        ValidationMode::Report => extraction.with_validator(Validator::with_default_rules(), false),
        ValidationMode::Fix => extraction.with_validator(Validator::with_default_rules(), true),
    };

    extraction
        .run()
        .with_context(|| format!("failed to extract {document}"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let registry = ExtractorRegistry::with_defaults();
    if args.list_extractors {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::from_env()?;
    if let Some(kind) = args.cache {
        config = config.with_stream_cache(kind);
    }
    if args.no_detect {
        config = config.with_detect_content_type(false);
    }
    if let Some(mode) = args.validation {
        config = config.with_validation(mode);
    }

    let extractors = if args.extractors.is_empty() {
        registry.group()
    } else {
        registry.group_for(args.extractors.iter().map(String::as_str))?
    };

    let output: Box<dyn TripleHandler + Send> = match args.format {
        Format::Ntriples => Box::new(NTriplesWriter::new(io::stdout())),
        Format::Json => Box::new(JsonLinesWriter::new(io::stdout())),
    };
    let sink = SharedHandler::new(output);

    info!(
        documents = args.documents.len(),
        extractors = ?extractors,
        jobs = args.jobs,
        "Starting extraction"
    );

    // The blocking client is built and dropped off the async runtime; clones
    // share one connection pool.
    let http = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || HttpSource::new(&config)).await??
    };

    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();
    for document in args.documents {
        let permit = Arc::clone(&permits).acquire_owned().await?;
        let config = config.clone();
        let extractors = extractors.clone();
        let sink = sink.clone();
        let http = http.clone();
        tasks.spawn_blocking(move || {
            let outcome = process(&document, &config, http, extractors, sink);
            drop(permit);
            (document, outcome)
        });
    }

    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (document, outcome) = joined?;
        match outcome {
            Ok(report) => {
                if args.report {
                    eprintln!("{}", serde_json::to_string(&report)?);
                }
            }
            Err(e) => {
                error!(document = %document, error = %format!("{e:#}"), "Extraction failed");
                failures += 1;
            }
        }
    }

    tokio::task::spawn_blocking(move || drop(http)).await?;

    if failures > 0 {
        error!(failures, "Some documents could not be processed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
