use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;
use tenderwatch_core::{DocumentStore, config_file};
use tenderwatch_ingest::FraudDetector;
use tenderwatch_pdf_mupdf::MupdfBackend;

/// Tenderwatch - Detect suspicious similarities across business documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest one or more PDF documents and score them against the corpus
    Check {
        /// Paths to the PDF documents to process
        paths: Vec<PathBuf>,

        /// Explicit document type (skips keyword auto-detection)
        #[arg(long)]
        doc_type: Option<String>,

        /// Path to the corpus database (default: documents.db)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Path to a TOML configuration file with threshold overrides
        #[arg(long)]
        config: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output report file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check {
            paths,
            doc_type,
            db,
            config,
            no_color,
            output,
        } => check(paths, doc_type, db, config, no_color, output),
    }
}

fn check(
    paths: Vec<PathBuf>,
    doc_type: Option<String>,
    db: Option<PathBuf>,
    config: Option<PathBuf>,
    no_color: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    if paths.is_empty() {
        anyhow::bail!("no documents given; pass one or more PDF paths");
    }

    // Resolve configuration: explicit file > platform cascade > defaults
    let config_file = match config {
        Some(ref path) => config_file::load_from_path(path)
            .ok_or_else(|| anyhow::anyhow!("could not read config file: {}", path.display()))?,
        None => config_file::load_config(),
    };
    let similarity_config = config_file.similarity_config();

    // Resolve corpus path: CLI flag > config file > default
    let db_path = db
        .or_else(|| {
            config_file
                .storage
                .as_ref()
                .and_then(|s| s.db_path.clone())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from("documents.db"));

    let use_color = !no_color && output.is_none();
    let color = ColorMode(use_color);

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    let store = DocumentStore::open(&db_path)?;
    let detector = FraudDetector::new(store, similarity_config);
    let backend = MupdfBackend::new();

    let mut failures = 0usize;
    for path in &paths {
        let display_name = path.display().to_string();
        output::print_document_header(&mut writer, &display_name, color)?;

        // One document failing never aborts the rest of the batch
        match detector.process(path, doc_type.as_deref(), &backend) {
            Ok(outcome) => output::print_report(&mut writer, &outcome, color)?,
            Err(e) => {
                failures += 1;
                output::print_processing_error(&mut writer, &display_name, &e, color)?;
            }
        }
    }

    if failures > 0 {
        writeln!(writer)?;
        writeln!(
            writer,
            "{} of {} documents could not be processed.",
            failures,
            paths.len()
        )?;
    }
    Ok(())
}
