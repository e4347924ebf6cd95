use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui;

use crate::data::summary::SeriesSummary;
use crate::state::AppState;
use crate::ui::{panels, plot};

/// Summary of the series on screen, readable after the window closes.
pub type ShownSummary = Rc<RefCell<Option<SeriesSummary>>>;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct SpectrographApp {
    pub state: AppState,
    shown: ShownSummary,
}

impl SpectrographApp {
    pub fn new(state: AppState, shown: ShownSummary) -> Self {
        let app = Self { state, shown };
        app.publish_summary();
        app
    }

    /// Record the summary of the current series, which changes with File > Open.
    pub fn publish_summary(&self) {
        if let Some(summary) = &self.state.summary {
            *self.shown.borrow_mut() = Some(summary.clone());
        }
    }
}

impl eframe::App for SpectrographApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: channels ----
        egui::SidePanel::left("channel_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: spectrograph ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::spectrograph(ui, &self.state);
        });

        self.publish_summary();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parser::parse_str;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn summary_follows_file_open() {
        let first = parse_str("#End\n0 2025 Jan 15 0130 X X X X 1.5\n").unwrap();
        let mut state = AppState::default();
        state.set_series(first, None);

        let shown = ShownSummary::default();
        let mut app = SpectrographApp::new(state, Rc::clone(&shown));
        assert_eq!(shown.borrow().as_ref().map(|s| s.samples), Some(1));

        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "#End\n0 2025 Feb 01 0000 X X X X 2\n0 2025 Feb 02 0000 X X X X 3\n"
        )
        .unwrap();
        app.state.load_path(file.path()).unwrap();
        app.publish_summary();

        let summary = shown.borrow().clone().unwrap();
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.flux_range, Some((2.0, 3.0)));
    }

    #[test]
    fn failed_open_keeps_published_summary() {
        let mut state = AppState::default();
        state.set_series(parse_str("#End\n0 2025 Jan 15 0130 X X X X 1.5\n").unwrap(), None);
        let shown = ShownSummary::default();
        let mut app = SpectrographApp::new(state, Rc::clone(&shown));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "no marker").unwrap();
        assert!(app.state.load_path(file.path()).is_err());
        app.publish_summary();

        assert_eq!(shown.borrow().as_ref().map(|s| s.samples), Some(1));
    }
}
