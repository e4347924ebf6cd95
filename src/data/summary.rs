use std::fmt;

use chrono::NaiveDateTime;

use super::model::{is_present, Series};

// ---------------------------------------------------------------------------
// Series summary: the diagnostics printed after the chart is shown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    /// Timestamp of the first row in file order.
    pub first: NaiveDateTime,
    /// Timestamp of the last row in file order.
    pub last: NaiveDateTime,
    pub samples: usize,
    pub channels: usize,
    /// Min/max over every strictly positive flux value, if any.
    pub flux_range: Option<(f64, f64)>,
}

impl SeriesSummary {
    /// `None` for an empty series.
    pub fn from_series(series: &Series) -> Option<Self> {
        let first = series.samples.first()?.time;
        let last = series.samples.last()?.time;
        let values = series.samples.iter().flat_map(|s| s.flux.iter().copied());
        Some(SeriesSummary {
            first,
            last,
            samples: series.len(),
            channels: series.channel_count(),
            flux_range: positive_range(values),
        })
    }
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data span: {} to {}", self.first, self.last)?;
        writeln!(f, "Total time points: {}", self.samples)?;
        write!(f, "Energy channels: {}", self.channels)?;
        if let Some((min, max)) = self.flux_range {
            write!(f, "\nFlux range: {} to {}", sci(min), sci(max))?;
        }
        Ok(())
    }
}

/// Min/max of the strictly positive values.
pub fn positive_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|&v| is_present(v))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

/// Scientific notation with two decimals and a signed two-digit exponent,
/// e.g. `1.50e+00`, `3.21e-04`.
pub fn sci(value: f64) -> String {
    let s = format!("{value:.2e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}
