use std::num::ParseFloatError;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

use super::model::{EnergyChannel, Sample, Series, CHANNELS};

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

/// Column positions of one instrument file format.
#[derive(Debug, Clone)]
pub struct FileLayout {
    /// Trimmed line separating the header from the data rows.
    pub marker: &'static str,
    /// Rows with fewer whitespace tokens are noise.
    pub min_tokens: usize,
    /// Token range holding `YYYY Mon DD HHMM`.
    pub time_tokens: std::ops::Range<usize>,
    pub time_format: &'static str,
    /// Index of the first flux token.
    pub flux_start: usize,
    pub channels: &'static [EnergyChannel],
}

/// STEREO `*.15m.txt` flux files.
pub static STEREO_LAYOUT: FileLayout = FileLayout {
    marker: "#End",
    min_tokens: 6,
    time_tokens: 1..5,
    time_format: "%Y %b %d %H%M",
    flux_start: 9,
    channels: &CHANNELS,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not find data start marker '{marker}'")]
    MissingMarker { marker: &'static str },

    #[error("line {line}: '{text}' is not a valid timestamp")]
    Time {
        line: usize,
        text: String,
        /// `None` when the year is not exactly four digits.
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("line {line}: flux value '{token}' is not a number")]
    Numeric {
        line: usize,
        token: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and parse a STEREO flux file.
pub fn parse_file(path: &Path) -> Result<Series, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = parse_str(&text)?;
    log::info!("Parsed {} samples from {}", series.len(), path.display());
    Ok(series)
}

/// Parse file contents with the STEREO layout.
pub fn parse_str(text: &str) -> Result<Series, ParseError> {
    parse_with_layout(text, &STEREO_LAYOUT)
}

/// Parse file contents.
///
/// Rows with too few tokens are skipped. A malformed timestamp or flux
/// value aborts the whole parse.
pub fn parse_with_layout(text: &str, layout: &FileLayout) -> Result<Series, ParseError> {
    let lines: Vec<&str> = text.lines().collect();

    let marker_idx = lines
        .iter()
        .position(|line| line.trim() == layout.marker)
        .ok_or(ParseError::MissingMarker {
            marker: layout.marker,
        })?;
    log::debug!("Data marker found on line {}", marker_idx + 1);

    let mut samples = Vec::new();

    for (idx, line) in lines.iter().enumerate().skip(marker_idx + 1) {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < layout.min_tokens {
            log::trace!("Skipping short line {line_no}: {line:?}");
            continue;
        }

        let Some(time_tokens) = tokens.get(layout.time_tokens.clone()) else {
            log::trace!("Skipping line {line_no} without a full timestamp: {line:?}");
            continue;
        };
        let time = parse_time(time_tokens, line_no, layout)?;
        let flux = parse_flux(&tokens, line_no, layout)?;
        samples.push(Sample { time, flux });
    }

    Ok(Series::new(samples, layout.channels))
}

// -- Row helpers --

/// `%Y` alone accepts signed and short years, so the year token is checked
/// for exactly four digits first.
fn parse_time(tokens: &[&str], line: usize, layout: &FileLayout) -> Result<NaiveDateTime, ParseError> {
    let text = tokens.join(" ");
    let year_ok = tokens
        .first()
        .is_some_and(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()));
    if !year_ok {
        return Err(ParseError::Time {
            line,
            text,
            source: None,
        });
    }
    NaiveDateTime::parse_from_str(&text, layout.time_format).map_err(|source| ParseError::Time {
        line,
        text,
        source: Some(source),
    })
}

/// Flux columns padded with `0.0` or truncated to the channel count.
fn parse_flux(tokens: &[&str], line: usize, layout: &FileLayout) -> Result<Vec<f64>, ParseError> {
    let count = layout.channels.len();
    let mut flux = tokens
        .iter()
        .skip(layout.flux_start)
        .take(count)
        .map(|tok| {
            tok.parse::<f64>().map_err(|source| ParseError::Numeric {
                line,
                token: tok.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;
    flux.resize(count, 0.0);
    Ok(flux)
}
