use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::Color32;

use crate::color::{channel_color, generate_palette};
use crate::data::model::Series;
use crate::data::parser::parse_file;
use crate::data::summary::{positive_range, SeriesSummary};

// ---------------------------------------------------------------------------
// Per-channel view state
// ---------------------------------------------------------------------------

/// Display settings and cached statistics of one energy channel.
#[derive(Debug, Clone)]
pub struct ChannelView {
    pub label: String,
    pub color: Color32,
    pub visible: bool,
    /// Positive flux range of this channel, if any value is present.
    pub flux_range: Option<(f64, f64)>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Series currently shown.
    pub series: Option<Series>,

    /// File the series was read from.
    pub source: Option<PathBuf>,

    /// One entry per channel of `series`.
    pub channels: Vec<ChannelView>,

    /// Summary of the loaded series (None when empty).
    pub summary: Option<SeriesSummary>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a parsed series, rebuild channel views and the summary.
    pub fn set_series(&mut self, series: Series, source: Option<PathBuf>) {
        let palette = generate_palette(series.channel_count());
        self.channels = series
            .channels
            .iter()
            .enumerate()
            .map(|(i, channel)| ChannelView {
                label: channel.label(),
                color: channel_color(&palette, i),
                visible: true,
                flux_range: positive_range(series.samples.iter().filter_map(|s| s.flux.get(i).copied())),
            })
            .collect();

        self.summary = SeriesSummary::from_series(&series);
        self.series = Some(series);
        self.source = source;
        self.status_message = None;
    }

    /// Replace the series with the contents of `path`.
    ///
    /// On failure the current series stays and the error becomes the status
    /// message.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let loaded = parse_file(path)
            .with_context(|| format!("loading {}", path.display()))
            .and_then(|series| {
                if series.is_empty() {
                    anyhow::bail!("No valid data found in {}", path.display());
                }
                Ok(series)
            });

        match loaded {
            Ok(series) => {
                log::info!(
                    "Loaded {} samples across {} channels from {}",
                    series.len(),
                    series.channel_count(),
                    path.display()
                );
                self.set_series(series, Some(path.to_path_buf()));
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                Err(e)
            }
        }
    }

    /// Toggle one channel's curve.
    pub fn toggle_channel(&mut self, index: usize) {
        if let Some(view) = self.channels.get_mut(index) {
            view.visible = !view.visible;
        }
    }

    /// Show or hide every channel.
    pub fn set_all_visible(&mut self, visible: bool) {
        for view in &mut self.channels {
            view.visible = visible;
        }
    }

    /// Number of channels currently drawn.
    pub fn visible_count(&self) -> usize {
        self.channels.iter().filter(|c| c.visible).count()
    }

    /// File name shown in the top bar.
    pub fn source_name(&self) -> Option<String> {
        self.source
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parser::parse_str;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FILE: &str = "\
header
#End
0 2025 Jan 15 0130 X X X X 1.5 0 3.5
0 2025 Jan 16 0130 X X X X 0.5 0 7.0
";

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_series(parse_str(FILE).unwrap(), Some(PathBuf::from("/data/AeH25Jan.15m.txt")));
        state
    }

    #[test]
    fn set_series_builds_channel_views() {
        let state = loaded();
        assert_eq!(state.channels.len(), 11);
        assert_eq!(state.channels[0].label, "13.6-15.1 MeV");
        assert_eq!(state.channels[0].flux_range, Some((0.5, 1.5)));
        assert_eq!(state.channels[1].flux_range, None);
        assert_eq!(state.channels[2].flux_range, Some((3.5, 7.0)));
        assert_eq!(state.visible_count(), 11);
        assert_eq!(state.summary.as_ref().map(|s| s.samples), Some(2));
        assert_eq!(state.source_name().as_deref(), Some("AeH25Jan.15m.txt"));
    }

    #[test]
    fn channel_visibility_toggles() {
        let mut state = loaded();
        state.toggle_channel(3);
        assert!(!state.channels[3].visible);
        assert_eq!(state.visible_count(), 10);
        state.toggle_channel(42);
        state.set_all_visible(false);
        assert_eq!(state.visible_count(), 0);
        state.set_all_visible(true);
        assert_eq!(state.visible_count(), 11);
    }

    #[test]
    fn failed_load_keeps_current_series() {
        let mut state = loaded();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "no marker here").unwrap();

        assert!(state.load_path(file.path()).is_err());
        assert!(state.status_message.as_deref().unwrap().contains("#End"));
        assert_eq!(state.series.as_ref().map(Series::len), Some(2));
    }

    #[test]
    fn empty_file_is_rejected_by_viewer() {
        let mut state = AppState::default();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#End").unwrap();

        assert!(state.load_path(file.path()).is_err());
        assert!(state.series.is_none());
        assert!(state
            .status_message
            .as_deref()
            .unwrap()
            .contains("No valid data found"));
    }

    #[test]
    fn successful_load_clears_status() {
        let mut state = AppState::default();
        state.status_message = Some("Error: old".into());
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{FILE}").unwrap();

        state.load_path(file.path()).unwrap();
        assert!(state.status_message.is_none());
        assert_eq!(state.source.as_deref(), Some(file.path()));
    }
}
