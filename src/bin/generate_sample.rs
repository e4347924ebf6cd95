use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Channel centre energies in MeV, same order as the viewer's channel table.
const CENTRE_ENERGIES: [f64; 11] = [
    14.35, 16.0, 18.15, 22.3, 25.1, 28.0, 31.45, 34.6, 38.0, 50.0, 80.0,
];

/// 15-minute cadence.
const STEP_MINUTES: i64 = 15;

/// Solar energetic particle event: onset time, peak enhancement, decay (hours).
struct Event {
    onset: NaiveDateTime,
    peak: f64,
    rise_hours: f64,
    decay_hours: f64,
}

impl Event {
    /// Enhancement factor at `t`; harder channels rise faster and decay sooner.
    fn factor(&self, t: NaiveDateTime, energy: f64) -> f64 {
        let hours = (t - self.onset).num_minutes() as f64 / 60.0;
        if hours <= 0.0 {
            return 0.0;
        }
        let hardness = (energy / 14.0).powf(0.5);
        let rise = 1.0 - (-hours * hardness / self.rise_hours).exp();
        let decay = (-hours * hardness / self.decay_hours).exp();
        self.peak * rise * decay / hardness.powi(2)
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Quiet-time proton spectrum, a power law in energy.
fn background(energy: f64) -> f64 {
    2.0e-3 * (energy / 14.0).powf(-3.0)
}

/// Write header, `#End` marker and one month of 15-minute rows.
/// Returns the number of data rows.
fn write_sample(
    out: &mut impl Write,
    start: NaiveDateTime,
    end: NaiveDateTime,
    events: &[Event],
    rng: &mut SimpleRng,
) -> io::Result<usize> {
    writeln!(out, "#Title: STEREO Ahead HET/LET proton flux (synthetic)")?;
    writeln!(out, "#Cadence: 15 minutes")?;
    writeln!(out, "#Units: particles/(cm2 s sr MeV)")?;
    write!(out, "#Columns: Rec Year Mon Day HHMM DOY Sec Flag Npts")?;
    for e in CENTRE_ENERGIES {
        write!(out, " H{e:.1}")?;
    }
    writeln!(out)?;
    writeln!(out, "#End")?;

    let mut rows = 0;
    let mut t = start;
    while t < end {
        let secs = (t - start).num_seconds();
        write!(
            out,
            "{rows} {} {:02} {} {:>3} {secs} 0 15",
            t.format("%Y %b"),
            t.day(),
            t.format("%H%M"),
            t.ordinal(),
        )?;
        // Roughly one row in a hundred is a telemetry gap reported as zeros.
        let gap = rng.next_f64() < 0.01;
        for energy in CENTRE_ENERGIES {
            let flux = if gap {
                0.0
            } else {
                let enhancement: f64 = events.iter().map(|ev| ev.factor(t, energy)).sum();
                let noise = rng.gauss(0.0, 0.15).exp();
                background(energy) * (1.0 + enhancement) * noise
            };
            write!(out, " {flux:.3e}")?;
        }
        writeln!(out)?;

        rows += 1;
        t += Duration::minutes(STEP_MINUTES);
    }
    Ok(rows)
}

fn january_2025() -> (NaiveDateTime, NaiveDateTime) {
    let midnight = |m| {
        NaiveDate::from_ymd_opt(2025, m, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    };
    (midnight(1), midnight(2))
}

fn events(start: NaiveDateTime) -> Vec<Event> {
    vec![
        Event {
            onset: start + Duration::hours(9 * 24 + 14),
            peak: 4.0e3,
            rise_hours: 6.0,
            decay_hours: 40.0,
        },
        Event {
            onset: start + Duration::hours(21 * 24 + 3),
            peak: 6.0e2,
            rise_hours: 3.0,
            decay_hours: 18.0,
        },
    ]
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "AeH25Jan.15m.txt".to_owned());

    let (start, end) = january_2025();
    let mut rng = SimpleRng::new(42);

    let file = File::create(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut writer = BufWriter::new(file);
    let rows = write_sample(&mut writer, start, end, &events(start), &mut rng)
        .with_context(|| format!("writing {output_path}"))?;
    writer.flush().context("flushing output")?;

    println!(
        "Wrote {rows} rows ({} channels each) to {output_path}",
        CENTRE_ENERGIES.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate() -> (usize, String) {
        let (start, end) = january_2025();
        let mut out = Vec::new();
        let rows = write_sample(&mut out, start, end, &events(start), &mut SimpleRng::new(7)).unwrap();
        (rows, String::from_utf8(out).unwrap())
    }

    #[test]
    fn one_month_at_fifteen_minutes() {
        let (rows, _) = generate();
        assert_eq!(rows, 31 * 24 * 4);
    }

    #[test]
    fn rows_follow_marker_with_fixed_columns() {
        let (rows, text) = generate();
        let lines: Vec<&str> = text.lines().collect();
        let marker = lines.iter().position(|l| l.trim() == "#End").unwrap();
        let data = &lines[marker + 1..];

        assert_eq!(data.len(), rows);
        assert!(data.iter().all(|l| l.split_whitespace().count() == 9 + 11));

        let first: Vec<&str> = data[0].split_whitespace().collect();
        assert_eq!(&first[1..5], &["2025", "Jan", "01", "0000"]);
        let last: Vec<&str> = data[rows - 1].split_whitespace().collect();
        assert_eq!(&last[1..5], &["2025", "Jan", "31", "2345"]);
        assert!(first[9..].iter().all(|v| v.parse::<f64>().is_ok()));
    }

    #[test]
    fn event_raises_flux_after_onset() {
        let (start, _) = january_2025();
        let evs = events(start);
        let ev = &evs[0];
        assert_eq!(ev.factor(ev.onset, 14.35), 0.0);
        let later = ev.onset + Duration::hours(12);
        assert!(ev.factor(later, 14.35) > 100.0);
        assert!(ev.factor(later, 14.35) > ev.factor(later, 80.0));
    }
}
