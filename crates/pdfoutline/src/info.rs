use std::io::IsTerminal;
use std::path::PathBuf;

use outline_pdf::DocumentMetadata;

use crate::input::read_pdf;
use crate::prelude::{println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "info")]
#[command(about = "Print document metadata")]
pub struct App {
    /// Path to the PDF file
    pub path: PathBuf,

    /// Print JSON even on a terminal
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, _global: crate::Global) -> Result<()> {
    let bytes = read_pdf(&app.path)?;
    let meta = outline_pdf::info(&bytes).map_err(|e| eyre!(e))?;

    if app.json || !std::io::stdout().is_terminal() {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else {
        metadata_table(&meta).printstd();
    }

    Ok(())
}

fn metadata_table(meta: &DocumentMetadata) -> prettytable::Table {
    let mut table = new_table();
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    table.add_row(prettytable::row!["Title", text(&meta.title)]);
    table.add_row(prettytable::row!["Author", text(&meta.author)]);
    table.add_row(prettytable::row!["Creator", text(&meta.creator)]);
    table.add_row(prettytable::row!["Producer", text(&meta.producer)]);
    table.add_row(prettytable::row!["Pages", meta.page_count]);

    table
}
