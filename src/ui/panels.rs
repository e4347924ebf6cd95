use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::summary::sci;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – energy channels
// ---------------------------------------------------------------------------

/// Render the channel list: colour, visibility, energy band, flux range.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Energy channels");
    ui.separator();

    if state.channels.is_empty() {
        ui.label("No file loaded.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.set_all_visible(true);
        }
        if ui.small_button("None").clicked() {
            state.set_all_visible(false);
        }
        ui.label(format!("{}/{} shown", state.visible_count(), state.channels.len()));
    });
    ui.add_space(4.0);

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("");
            });
            header.col(|ui| {
                ui.strong("Band");
            });
            header.col(|ui| {
                ui.strong("Flux range");
            });
        })
        .body(|mut body| {
            for idx in 0..state.channels.len() {
                body.row(20.0, |mut row| {
                    let view = &state.channels[idx];
                    let color = view.color;
                    let label = view.label.clone();
                    let range = view
                        .flux_range
                        .map(|(lo, hi)| format!("{} – {}", sci(lo), sci(hi)))
                        .unwrap_or_else(|| "no data".to_owned());

                    row.col(|ui| {
                        let mut visible = state.channels[idx].visible;
                        if ui.checkbox(&mut visible, "").changed() {
                            state.toggle_channel(idx);
                        }
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(label).color(color));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(range).small());
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(name) = state.source_name() {
            ui.label(RichText::new(name).strong());
        }
        if let Some(summary) = &state.summary {
            ui.label(format!(
                "{} samples, {} channels",
                summary.samples, summary.channels
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open STEREO flux file")
        .add_filter("Flux text files", &["txt"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        // The error is already logged and shown in the status bar.
        let _ = state.load_path(&path);
    }
}
