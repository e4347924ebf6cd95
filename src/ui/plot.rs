use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};
use eframe::egui::{RichText, Ui};
use egui_plot::{GridInput, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::data::model::Series;
use crate::data::summary::sci;
use crate::state::AppState;

const HOUR: f64 = 3600.0;
const DAY: f64 = 24.0 * HOUR;
/// Below this visible span the x axis switches from day to 3-hour ticks.
const HOURLY_SPAN: f64 = 3.0 * DAY;
/// Day marks per frame stay below this.
const MAX_MARKS: i64 = 400;
/// Seconds either side of the epoch; chrono has no dates beyond.
const X_LIMIT: f64 = 8.0e12;
/// Decades either side of 1; f64 flux has nothing beyond.
const Y_LIMIT: f64 = 400.0;
/// Decades drawn with 2..9 subdivisions before thinning kicks in.
const MAX_DECADES: i64 = 40;

// ---------------------------------------------------------------------------
// Spectrograph (central panel)
// ---------------------------------------------------------------------------

/// Render the flux spectrograph in the central panel.
pub fn spectrograph(ui: &mut Ui, state: &AppState) {
    let series = match &state.series {
        Some(s) if !s.is_empty() => s,
        _ => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a flux file to plot  (File → Open…)");
            });
            return;
        }
    };
    let Some((t_min, t_max)) = series.time_range() else {
        return;
    };

    let month = t_min.format("%B %Y");
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new(format!("STEREO Hydrogen Proton Particle Flux - {month}"))
                .heading()
                .strong(),
        );
    });

    let (x_min, x_max) = x_bounds(t_min, t_max);

    Plot::new("spectrograph")
        .legend(Legend::default().position(egui_plot::Corner::RightTop))
        .x_axis_label(format!("Date ({month})"))
        .y_axis_label("Flux (particles/cm²/s/sr/MeV)")
        .default_x_bounds(x_min, x_max)
        .x_grid_spacer(date_grid_spacer)
        .x_axis_formatter(date_axis_formatter)
        .y_grid_spacer(log_grid_spacer)
        .y_axis_formatter(log_axis_formatter)
        .label_formatter(|name, value| {
            let date = from_plot_x(value.x)
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            let flux = sci(10f64.powf(value.y));
            if name.is_empty() {
                format!("{date}\n{flux}")
            } else {
                format!("{name}\n{date}\n{flux}")
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (idx, view) in state.channels.iter().enumerate() {
                if !view.visible {
                    continue;
                }
                for run in channel_segments(series, idx) {
                    if run.len() == 1 {
                        let points = Points::new(&view.label, PlotPoints::from(run))
                            .color(view.color)
                            .radius(1.5);
                        plot_ui.points(points);
                    } else {
                        let line = Line::new(&view.label, PlotPoints::from(run))
                            .color(view.color)
                            .width(1.5);
                        plot_ui.line(line);
                    }
                }
            }
        });
}

/// Plot-space points of one channel: x in seconds, y as `log10(flux)`.
/// Each inner vector is one gap-free run.
pub fn channel_segments(series: &Series, channel: usize) -> Vec<Vec<[f64; 2]>> {
    series
        .channel_runs(channel)
        .into_iter()
        .map(|run| {
            run.into_iter()
                .map(|(t, flux)| [to_plot_x(t), flux.log10()])
                .collect()
        })
        .collect()
}

/// Default horizontal range. A single timestamp is widened by an hour on
/// each side so the plot has a non-empty range.
fn x_bounds(t_min: NaiveDateTime, t_max: NaiveDateTime) -> (f64, f64) {
    let (lo, hi) = (to_plot_x(t_min), to_plot_x(t_max));
    if hi > lo {
        (lo, hi)
    } else {
        (lo - HOUR, hi + HOUR)
    }
}

// -- Time axis --

pub fn to_plot_x(t: NaiveDateTime) -> f64 {
    t.and_utc().timestamp() as f64
}

pub fn from_plot_x(x: f64) -> Option<NaiveDateTime> {
    if !x.is_finite() {
        return None;
    }
    DateTime::from_timestamp(x.round() as i64, 0).map(|dt| dt.naive_utc())
}

/// Day ticks: odd days of the month are major (labelled), the rest minor.
/// Short spans get 3-hour ticks instead.
#[allow(clippy::needless_pass_by_value)]
pub fn date_grid_spacer(input: GridInput) -> Vec<GridMark> {
    let (min, max) = input.bounds;
    let (min, max) = (min.max(-X_LIMIT), max.min(X_LIMIT));
    if !(min.is_finite() && max.is_finite()) || max <= min {
        return Vec::new();
    }

    if max - min <= HOURLY_SPAN {
        let step = 3.0 * HOUR;
        let first = (min / step).ceil() as i64;
        let last = (max / step).floor() as i64;
        return (first..=last)
            .map(|k| GridMark {
                value: k as f64 * step,
                step_size: step,
            })
            .collect();
    }

    let first = (min / DAY).ceil() as i64;
    let last = (max / DAY).floor() as i64;
    let stride = (last - first) / MAX_MARKS + 1;
    (aligned(first, stride)..=last)
        .step_by(stride as usize)
        .filter_map(|day| {
            let value = day as f64 * DAY;
            let date = from_plot_x(value)?;
            let major = stride > 1 || date.day() % 2 == 1;
            Some(GridMark {
                value,
                step_size: if major { 2.0 * DAY } else { DAY },
            })
        })
        .collect()
}

/// Smallest multiple of `stride` not below `first`.
fn aligned(first: i64, stride: i64) -> i64 {
    first + (stride - first.rem_euclid(stride)) % stride
}

/// `mm/dd` under major day ticks, `HH:MM` under 3-hour ticks, nothing under
/// minor day ticks.
pub fn date_axis_formatter(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    let Some(t) = from_plot_x(mark.value) else {
        return String::new();
    };
    if mark.step_size >= 2.0 * DAY {
        t.format("%m/%d").to_string()
    } else if mark.step_size >= DAY {
        String::new()
    } else if t.hour() == 0 {
        t.format("%m/%d").to_string()
    } else {
        t.format("%H:%M").to_string()
    }
}

// -- Log flux axis --

/// Decade marks plus the 2..9 multiples inside each decade. Wide ranges
/// get every n-th decade only.
#[allow(clippy::needless_pass_by_value)]
pub fn log_grid_spacer(input: GridInput) -> Vec<GridMark> {
    let (min, max) = input.bounds;
    let (min, max) = (min.max(-Y_LIMIT), max.min(Y_LIMIT));
    if !(min.is_finite() && max.is_finite()) || max <= min {
        return Vec::new();
    }
    let first = min.floor() as i64;
    let last = max.ceil() as i64;
    let stride = (last - first) / MAX_DECADES + 1;

    if stride > 1 {
        return (aligned(first, stride)..=last)
            .step_by(stride as usize)
            .map(|decade| GridMark {
                value: decade as f64,
                step_size: stride as f64,
            })
            .filter(|gm| (min..=max).contains(&gm.value))
            .collect();
    }

    let mut marks = Vec::new();
    for decade in first..=last {
        marks.extend(
            (1..10)
                .map(|m| GridMark {
                    value: decade as f64 + (m as f64).log10(),
                    step_size: if m == 1 { 1.0 } else { 0.1 },
                })
                .filter(|gm| (min..=max).contains(&gm.value)),
        );
    }
    marks
}

/// Labels decades only, e.g. `1e-3`.
pub fn log_axis_formatter(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    if mark.step_size < 1.0 {
        return String::new();
    }
    format!("{:.0e}", 10f64.powf(mark.value.round()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parser::parse_str;
    use chrono::{Duration, NaiveDate};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn input(min: f64, max: f64) -> GridInput {
        GridInput {
            bounds: (min, max),
            base_step_size: 1.0,
        }
    }

    #[test]
    fn plot_x_round_trips_through_seconds() {
        let t = at(15, 1) + Duration::minutes(30);
        assert_eq!(from_plot_x(to_plot_x(t)), Some(t));
        assert_eq!(from_plot_x(f64::NAN), None);
    }

    #[test]
    fn odd_days_are_major_ticks() {
        let marks = date_grid_spacer(input(to_plot_x(at(1, 12)), to_plot_x(at(11, 12))));
        // Midnights of Jan 2..=11.
        assert_eq!(marks.len(), 10);
        let majors: Vec<String> = marks
            .iter()
            .filter(|m| m.step_size == 2.0 * DAY)
            .map(|m| date_axis_formatter(*m, &(0.0..=1.0)))
            .collect();
        assert_eq!(majors, vec!["01/03", "01/05", "01/07", "01/09", "01/11"]);

        let minor = marks.iter().find(|m| m.step_size == DAY).unwrap();
        assert_eq!(date_axis_formatter(*minor, &(0.0..=1.0)), "");
    }

    #[test]
    fn short_spans_use_hour_ticks() {
        let marks = date_grid_spacer(input(to_plot_x(at(15, 0)), to_plot_x(at(15, 9))));
        let labels: Vec<String> = marks
            .iter()
            .map(|m| date_axis_formatter(*m, &(0.0..=1.0)))
            .collect();
        assert_eq!(labels, vec!["01/15", "03:00", "06:00", "09:00"]);
    }

    #[test]
    fn wide_spans_are_thinned() {
        let marks = date_grid_spacer(input(0.0, 4000.0 * DAY));
        assert!(marks.len() <= 401);
        assert!(!marks.is_empty());
    }

    #[test]
    fn extreme_zoom_out_stays_bounded() {
        let marks = date_grid_spacer(input(-1e14, 1e14));
        assert!(!marks.is_empty() && marks.len() <= 401);
        assert!(date_grid_spacer(input(-1e300, 1e300)).len() <= 401);
        for (lo, hi) in [(-5e6, 5e6), (-1e300, 1e300)] {
            let marks = log_grid_spacer(input(lo, hi));
            assert!(!marks.is_empty() && marks.len() <= 2 * MAX_DECADES as usize);
            assert!(marks.iter().all(|m| m.step_size > 1.0));
        }
    }

    #[test]
    fn wide_log_ranges_label_every_other_decade() {
        let marks = log_grid_spacer(input(-30.0, 30.0));
        assert_eq!(marks.len(), 31);
        assert_eq!(marks[0].value, -30.0);
        assert_eq!(marks[1].value, -28.0);
        assert_eq!(log_axis_formatter(marks[1], &(0.0..=1.0)), "1e-28");
    }

    #[test]
    fn stride_alignment() {
        assert_eq!(aligned(7, 1), 7);
        assert_eq!(aligned(7, 5), 10);
        assert_eq!(aligned(-7, 5), -5);
        assert_eq!(aligned(10, 5), 10);
    }

    #[test]
    fn log_marks_cover_decades() {
        let marks = log_grid_spacer(input(-1.0, 1.0));
        let decades: Vec<String> = marks
            .iter()
            .filter(|m| m.step_size == 1.0)
            .map(|m| log_axis_formatter(*m, &(0.0..=1.0)))
            .collect();
        assert_eq!(decades, vec!["1e-1", "1e0", "1e1"]);
        // 9 marks per decade for two decades plus the closing decade mark.
        assert_eq!(marks.len(), 19);
        assert!(log_grid_spacer(input(1.0, 1.0)).is_empty());
    }

    #[test]
    fn segments_are_log_scaled_with_gaps() {
        let text = "\
#End
0 2025 Jan 15 0000 X X X X 10
0 2025 Jan 15 0015 X X X X 100
0 2025 Jan 15 0030 X X X X 0
0 2025 Jan 15 0045 X X X X 1000
";
        let series = parse_str(text).unwrap();
        let segments = channel_segments(&series, 0);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        let close = |a: f64, b: f64| (a - b).abs() < 1e-12;
        assert!(close(segments[0][0][1], 1.0));
        assert!(close(segments[0][1][1], 2.0));
        assert!(close(segments[1][0][1], 3.0));
        assert_eq!(segments[1][0][0], to_plot_x(at(15, 0) + Duration::minutes(45)));
    }

    #[test]
    fn single_timestamp_is_widened() {
        let t = at(15, 1);
        let (lo, hi) = x_bounds(t, t);
        assert_eq!(hi - lo, 2.0 * HOUR);
        assert_eq!(x_bounds(at(1, 0), at(2, 0)), (to_plot_x(at(1, 0)), to_plot_x(at(2, 0))));
    }
}
