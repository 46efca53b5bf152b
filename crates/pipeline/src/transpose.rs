//! Streaming by-date transposition of per-security exposures.

use std::collections::BTreeMap;

use cne5_primitives::{CrossSection, FACTOR_COUNT, SecurityCode, TradeDate};
use cne5_store::ArtifactSink;
use ndarray::{Array1, Array2};
use tracing::{debug, info};

use crate::PipelineError;

/// Materialize per-date cross sections from the by-security exposure
/// artifacts.
///
/// The trading-day axis is walked in chunks of `chunk` dates; each pass
/// scans the by-security artifacts once and publishes every cross
/// section in the chunk, so peak memory is O(securities x factors x
/// chunk) plus a single exposure series, never the full panel. Empty
/// cross sections are skipped. Returns the dates published, ascending.
///
/// # Errors
/// Returns `PipelineError::Store` on artifact read/write failures.
pub fn transpose(
    sink: &ArtifactSink,
    codes: &[SecurityCode],
    dates: &[TradeDate],
    chunk: usize,
) -> Result<Vec<TradeDate>, PipelineError> {
    let chunk = chunk.max(1);
    let mut published = Vec::new();

    for window in dates.chunks(chunk) {
        let mut buffers: BTreeMap<TradeDate, (Vec<SecurityCode>, Vec<Array1<f64>>)> =
            window.iter().map(|d| (*d, (Vec::new(), Vec::new()))).collect();

        for code in codes {
            let Some(series) = sink.read_exposures(code)? else {
                continue;
            };
            for (date, buffer) in buffers.iter_mut() {
                if let Some(row) = series.position(*date) {
                    buffer.0.push(code.clone());
                    buffer.1.push(series.dense_row(row));
                }
            }
        }

        for (date, (row_codes, rows)) in buffers {
            if row_codes.is_empty() {
                debug!(%date, "skipping empty cross section");
                continue;
            }

            let mut exposures = Array2::from_elem((rows.len(), FACTOR_COUNT), f64::NAN);
            for (i, row) in rows.iter().enumerate() {
                for (j, value) in row.iter().enumerate() {
                    exposures[[i, j]] = *value;
                }
            }

            sink.write_cross_section(&CrossSection { date, codes: row_codes, exposures })?;
            published.push(date);
        }
    }

    published.sort_unstable();
    info!(dates = published.len(), "cross sections published");
    Ok(published)
}
