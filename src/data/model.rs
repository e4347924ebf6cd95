use std::fmt;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// EnergyChannel – one fixed energy band of the instrument
// ---------------------------------------------------------------------------

/// A particle-energy band with its species label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyChannel {
    /// Lower bound in MeV.
    pub min_energy: f64,
    /// Upper bound in MeV.
    pub max_energy: f64,
    pub particle: &'static str,
}

impl EnergyChannel {
    const fn hydrogen(min_energy: f64, max_energy: f64) -> Self {
        EnergyChannel {
            min_energy,
            max_energy,
            particle: "H",
        }
    }

    /// Legend label, e.g. `13.6-15.1 MeV`.
    pub fn label(&self) -> String {
        format!("{:.1}-{:.1} MeV", self.min_energy, self.max_energy)
    }
}

impl fmt::Display for EnergyChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.particle, self.label())
    }
}

/// Hydrogen channels of the STEREO flux files, in column order.
pub static CHANNELS: [EnergyChannel; 11] = [
    EnergyChannel::hydrogen(13.6, 15.1),
    EnergyChannel::hydrogen(14.9, 17.1),
    EnergyChannel::hydrogen(17.0, 19.3),
    EnergyChannel::hydrogen(20.8, 23.8),
    EnergyChannel::hydrogen(23.8, 26.4),
    EnergyChannel::hydrogen(26.3, 29.7),
    EnergyChannel::hydrogen(29.5, 33.4),
    EnergyChannel::hydrogen(33.4, 35.8),
    EnergyChannel::hydrogen(35.5, 40.5),
    EnergyChannel::hydrogen(40.0, 60.0),
    EnergyChannel::hydrogen(60.0, 100.0),
];

// ---------------------------------------------------------------------------
// Sample – one decoded data row
// ---------------------------------------------------------------------------

/// One data row: a timestamp and one raw flux value per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: NaiveDateTime,
    /// Raw values, zeros and negatives included. Same length as the channel table.
    pub flux: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Series – the complete parsed file
// ---------------------------------------------------------------------------

/// All samples of one file in file order, paired with the channel table.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub samples: Vec<Sample>,
    pub channels: &'static [EnergyChannel],
}

impl Series {
    pub fn new(samples: Vec<Sample>, channels: &'static [EnergyChannel]) -> Self {
        Series { samples, channels }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the file had no data rows.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Timestamps in file order.
    pub fn times(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.samples.iter().map(|s| s.time)
    }

    /// Earliest and latest timestamp. Samples are not sorted, so this scans
    /// all of them.
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.samples.first()?.time;
        Some(self.times().fold((first, first), |(lo, hi), t| {
            (lo.min(t), hi.max(t))
        }))
    }

    /// Flux of one channel over time, with non-positive values as missing.
    pub fn channel_flux(&self, channel: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        self.samples
            .iter()
            .map(move |s| s.flux.get(channel).copied().filter(|&v| is_present(v)))
    }

    /// Split one channel into contiguous runs of present values.
    ///
    /// A missing value ends the current run, so the plot shows a gap there
    /// instead of a line bridging it.
    pub fn channel_runs(&self, channel: usize) -> Vec<Vec<(NaiveDateTime, f64)>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for (time, value) in self.times().zip(self.channel_flux(channel)) {
            match value {
                Some(v) => current.push((time, v)),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

/// A flux value can be drawn on a log axis only when strictly positive.
pub fn is_present(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
