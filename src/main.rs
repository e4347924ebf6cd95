mod app;
mod color;
mod data;
mod render;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};

use data::parser::parse_file;
use render::{render, RenderOutcome};

/// File read when no path is given on the command line.
const DEFAULT_INPUT: &str = "AeH25Jan.15m.txt";

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

    let series = parse_file(&path).with_context(|| format!("parsing {}", path.display()))?;
    if let RenderOutcome::Displayed(summary) = render(series, Some(path))? {
        log::debug!("Displayed {} channels", summary.channels);
    }
    Ok(())
}
