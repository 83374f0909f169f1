use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::input::{discover_pdfs, output_path, read_pdf, write_output};
use crate::prelude::{eprintln, *};

#[derive(Debug, clap::Parser)]
#[command(name = "batch")]
#[command(about = "Extract outlines for every PDF in a directory")]
pub struct App {
    /// Directory containing the PDF files
    pub input_dir: PathBuf,

    /// Directory receiving one `<name>.json` per document
    pub output_dir: PathBuf,

    /// Maximum number of documents processed at once
    #[arg(short, long, env = "PDFOUTLINE_CONCURRENCY")]
    pub concurrency: Option<usize>,
}

/// What happened to one input document.
#[derive(Debug)]
struct Processed {
    input: PathBuf,
    outcome: Result<Written>,
}

#[derive(Debug)]
struct Written {
    output: PathBuf,
    headings: usize,
    /// The document could not be parsed; the error outline was written.
    degraded: bool,
}

pub async fn run(app: App, _global: crate::Global) -> Result<()> {
    let files = discover_pdfs(&app.input_dir)?;
    if files.is_empty() {
        warn!("no PDF files found in {}", app.input_dir.display());
        return Ok(());
    }

    std::fs::create_dir_all(&app.output_dir)
        .wrap_err_with(|| f!("failed to create {}", app.output_dir.display()))?;

    let concurrency = app.concurrency.unwrap_or_else(default_concurrency).max(1);
    info!(
        "processing {} documents with concurrency {}",
        files.len(),
        concurrency
    );

    let total = files.len();
    let progress = progress_bar(total)?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let watcher = tokio::spawn({
        let cancelled = cancelled.clone();
        async move {
            shutdown_signal().await;
            cancelled.store(true, Ordering::SeqCst);
        }
    });

    let output_dir = app.output_dir.clone();
    let processed: Vec<Processed> = stream::iter(files)
        .take_while(|_| futures::future::ready(!cancelled.load(Ordering::SeqCst)))
        .map(|input| process(input, output_dir.clone()))
        .buffer_unordered(concurrency)
        .inspect(|item| {
            progress.inc(1);
            report(&progress, item);
        })
        .collect()
        .await;

    watcher.abort();
    progress.finish_and_clear();

    let failed = processed.iter().filter(|p| p.outcome.is_err()).count();
    let degraded = processed
        .iter()
        .filter(|p| matches!(&p.outcome, Ok(w) if w.degraded))
        .count();

    if cancelled.load(Ordering::SeqCst) {
        warn!(
            "interrupted: processed {} of {} documents",
            processed.len(),
            total
        );
    }

    eprintln!(
        "{} {} written, {} failed, {} unreadable",
        "Batch complete:".green().bold(),
        processed.len() - failed,
        failed,
        degraded
    );

    if failed > 0 {
        return Err(Error::BatchFailed {
            failed,
            total: processed.len(),
        }
        .into());
    }

    Ok(())
}

async fn process(input: PathBuf, output_dir: PathBuf) -> Processed {
    let task_input = input.clone();
    let outcome = tokio::task::spawn_blocking(move || write_outline(&task_input, &output_dir))
        .await
        .map_err(|e| eyre!(e))
        .and_then(|written| written);

    Processed { input, outcome }
}

fn write_outline(input: &Path, output_dir: &Path) -> Result<Written> {
    let bytes = read_pdf(input)?;
    let result = outline_pdf::outline(&bytes);

    let output = output_path(output_dir, input);
    write_output(&output, &serde_json::to_string_pretty(&result)?)?;
    debug!("{} -> {}", input.display(), output.display());

    Ok(Written {
        output,
        headings: result.outline.len(),
        degraded: result.is_failure(),
    })
}

fn report(progress: &ProgressBar, item: &Processed) {
    let name = item.input.display().to_string();
    match &item.outcome {
        Ok(written) if written.degraded => progress.suspend(|| {
            eprintln!(
                "{} {} -> {}",
                "unreadable".yellow().bold(),
                name,
                written.output.display()
            )
        }),
        Ok(written) => {
            progress.set_message(f!("{name} ({} headings)", written.headings));
        }
        Err(err) => progress.suspend(|| {
            eprintln!("{} {}: {:#}", "failed".red().bold(), name, err);
        }),
    }
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return Ok(ProgressBar::hidden());
    }

    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")?
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(bar)
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("cannot listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    warn!("shutdown requested, finishing in-flight documents");
}
