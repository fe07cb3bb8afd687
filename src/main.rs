//! ocr-indexer - Recursive Image Text Extraction Indexer
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use ocr_indexer::config::{CliArgs, Command, IndexConfig};
use ocr_indexer::driver::ProcessingDriver;
use ocr_indexer::ocr::{OcrEngine, TesseractCli};
use ocr_indexer::progress::{print_header, print_search_results, print_summary, ProgressReporter};
use ocr_indexer::search::{find_term, load_index};
use ocr_indexer::store::open_store;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Subcommands never touch the indexing pipeline
    if let Some(Command::Search { index, term }) = args.command {
        return run_search(&index, &term);
    }

    if args.root.is_none() {
        info!("no root folder given, indexing the current directory");
    }

    // Validate and create config (fatal before any traversal)
    let config = IndexConfig::from_args(args).context("Invalid configuration")?;

    // Open the result store; an unwritable destination fails fast here
    let store = open_store(&config).context("Failed to open result store")?;
    let engine = TesseractCli::new();

    // Print header
    if !config.quiet {
        print_header(
            &config.root.display().to_string(),
            store.backend_name(),
            engine.name(),
            &config.languages,
            &config.output_path.display().to_string(),
        );
    }

    let mut driver = ProcessingDriver::new(&config, store, Box::new(engine));

    // Setup signal handler for graceful shutdown with a final flush
    let shutdown_flag = driver.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, flushing and shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    // Create progress reporter
    let progress = if config.quiet {
        None
    } else {
        Some(ProgressReporter::new())
    };

    if let Some(ref p) = progress {
        p.set_status("Extracting text from images...");
    }

    // Run the indexing pass
    let result = driver.run(progress.as_ref()).context("Indexing failed")?;

    // Finish progress
    if let Some(ref p) = progress {
        if result.completed {
            p.finish_and_clear();
        } else {
            p.finish("Indexing interrupted");
        }
    }

    // Print summary
    if !config.quiet {
        let output_size = fs::metadata(&config.output_path).ok().map(|m| m.len());
        print_summary(
            &result,
            &config.output_path.display().to_string(),
            output_size,
        );
    }

    if !result.completed {
        info!("run was interrupted before completion");
    }
    if result.failed > 0 {
        info!(failed = result.failed, "run completed with failed files");
    }

    Ok(())
}

/// Load an index file and print the paths whose text contains `term`
fn run_search(index_path: &Path, term: &str) -> Result<()> {
    let index = load_index(index_path).context("Failed to load index")?;
    info!(
        entries = index.len(),
        index = %index_path.display(),
        "index loaded"
    );

    let search_timer = Instant::now();
    let matches = find_term(&index, term);
    print_search_results(term, &matches, index.len(), search_timer.elapsed());

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("ocr_indexer=debug,warn")
    } else {
        EnvFilter::new("ocr_indexer=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
