use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use colored::Colorize;
use log::info;
use outline_core::{HeadingLevel, OutlineResult};

use crate::input::{read_pdf, write_output};
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "extract")]
#[command(about = "Extract the heading outline of a single PDF")]
pub struct App {
    /// Path to the PDF file
    pub path: PathBuf,

    /// Write the JSON outline to this file instead of stdout
    #[arg(short, long, env = "PDFOUTLINE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Print only the JSON outline, without the terminal summary
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, _global: crate::Global) -> Result<()> {
    let bytes = read_pdf(&app.path)?;

    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || outline_pdf::outline(&bytes)).await?;
    let elapsed = started.elapsed();

    if !app.json && std::io::stderr().is_terminal() {
        print_summary(&app.path, &result, elapsed);
    }

    let json = serde_json::to_string_pretty(&result)?;
    match &app.output {
        Some(out) => {
            write_output(out, &json)?;
            info!("wrote outline to {}", out.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// `H1: 1, H2: 3` for the levels present in the outline.
pub fn level_distribution(result: &OutlineResult) -> String {
    result
        .level_counts()
        .iter()
        .map(|(level, count)| f!("{level}: {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_summary(path: &Path, result: &OutlineResult, elapsed: Duration) {
    eprintln!("\n{}", "=".repeat(80).bright_cyan());
    eprintln!("{}", "DOCUMENT OUTLINE".bright_cyan().bold());
    eprintln!("{}", "=".repeat(80).bright_cyan());

    eprintln!("\n{}: {}", "File".green(), path.display().to_string().cyan());
    eprintln!("{}: {}", "Title".green(), result.title.bright_white().bold());
    eprintln!(
        "{}: {}",
        "Headings".green(),
        level_distribution(result).bright_yellow()
    );

    if let Some(error) = &result.error {
        eprintln!("{}: {}", "Error".red().bold(), error.red());
    }

    eprintln!();
    for entry in &result.outline {
        let indent = "  ".repeat(usize::from(entry.level.as_u8() - 1));
        let label = match entry.level {
            HeadingLevel::H1 => entry.level.to_string().bright_magenta().bold(),
            HeadingLevel::H2 => entry.level.to_string().bright_blue(),
            HeadingLevel::H3 => entry.level.to_string().white(),
        };
        eprintln!(
            "{indent}{label} {} {}",
            entry.text,
            f!("(p. {})", entry.page).bright_black()
        );
    }

    eprintln!(
        "\n{}: {}",
        "Processing Time".green(),
        f!("{} ms", elapsed.as_millis()).bright_yellow()
    );
    eprintln!("{}\n", "=".repeat(80).bright_cyan());
}
