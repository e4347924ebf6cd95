use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use eframe::egui;

use crate::app::{ShownSummary, SpectrographApp};
use crate::data::model::Series;
use crate::data::summary::SeriesSummary;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Terminal step: show the chart, then print diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The series had no samples; no window was opened.
    NoData,
    /// The window was shown and has been closed.
    Displayed(SeriesSummary),
}

/// Show `series` in the viewer and block until the window closes.
///
/// An empty series prints `No valid data found!` and returns without
/// opening a window. The summary printed on close describes the series on
/// screen at that point, which differs from `series` after File > Open.
pub fn render(series: Series, source: Option<PathBuf>) -> Result<RenderOutcome> {
    let Some(summary) = SeriesSummary::from_series(&series) else {
        println!("No valid data found!");
        return Ok(RenderOutcome::NoData);
    };

    let mut state = AppState::default();
    state.set_series(series, source);
    let summary = run_viewer(state)?.unwrap_or(summary);

    println!("{summary}");
    log::info!("Viewer closed after {} samples", summary.samples);
    Ok(RenderOutcome::Displayed(summary))
}

/// Run the viewer window on the main thread until it is closed.
/// Returns the summary of the last series shown.
pub fn run_viewer(state: AppState) -> Result<Option<SeriesSummary>> {
    let shown = ShownSummary::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1600.0, 1000.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let app_shown = Rc::clone(&shown);
    eframe::run_native(
        "STEREO Flux – Spectrograph",
        options,
        Box::new(move |_cc| Ok(Box::new(SpectrographApp::new(state, app_shown)))),
    )
    .map_err(|e| anyhow!("viewer window failed: {e}"))?;

    let last = shown.borrow_mut().take();
    Ok(last)
}
