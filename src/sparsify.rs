use std::io;

use chrono::{Duration, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::SparsifyError;
use crate::observation::{FieldIndices, InputConfig, Observation};
use crate::space::{evaluate_window, MetricKind, SpaceMetric, EARTH_RADIUS_KM};
use crate::sparse::SparseWriter;
use crate::window::LiveWindow;

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct SparsifyConfig {
    pub time_threshold_minutes: i64,
    pub space_threshold: f64,
    pub metric: MetricKind,
    pub sphere_radius_km: f64,
}

impl Default for SparsifyConfig {
    fn default() -> Self {
        SparsifyConfig {
            time_threshold_minutes: 60,
            space_threshold: 1.0,
            metric: MetricKind::Haversine,
            sphere_radius_km: EARTH_RADIUS_KM,
        }
    }
}

impl SparsifyConfig {
    /// Checks the thresholds and builds the runtime parameters. Runs before
    /// any input row is read.
    pub fn validate(&self) -> Result<SparsifyParams, SparsifyError> {
        if self.time_threshold_minutes <= 0 {
            return Err(SparsifyError::InvalidThreshold(format!(
                "time threshold must be positive, got {} minutes",
                self.time_threshold_minutes
            )));
        }
        if !self.space_threshold.is_finite() || self.space_threshold < 0.0 {
            return Err(SparsifyError::InvalidThreshold(format!(
                "space threshold must be non-negative, got {}",
                self.space_threshold
            )));
        }
        if !self.sphere_radius_km.is_finite() || self.sphere_radius_km <= 0.0 {
            return Err(SparsifyError::InvalidThreshold(format!(
                "sphere radius must be positive, got {}",
                self.sphere_radius_km
            )));
        }

        Ok(SparsifyParams {
            time_threshold: Duration::minutes(self.time_threshold_minutes),
            space_threshold: self.space_threshold,
            metric: self.metric.build(self.sphere_radius_km),
        })
    }
}

/// Validated runtime form of [SparsifyConfig].
pub struct SparsifyParams {
    pub time_threshold: Duration,
    pub space_threshold: f64,
    pub metric: Box<dyn SpaceMetric>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparsifySummary {
    pub observations: u64,
    pub entries_written: u64,
    pub max_window_len: usize,
}

/// Single forward pass over timestamp-sorted observations.
///
/// Per row: parse and validate, evict stale window entries, compute distances
/// against the surviving window, emit qualifying symmetric pairs, then append
/// the row to the window tail. Emission happens against the pre-append window
/// so a point is never paired with itself. Both proximity bounds are closed:
/// a pair exactly at the time or space threshold qualifies.
pub fn sparsify<R: io::Read, W: io::Write>(
    reader: &mut csv::Reader<R>,
    writer: &mut SparseWriter<W>,
    input_config: &InputConfig,
    params: &SparsifyParams,
) -> Result<SparsifySummary, SparsifyError> {
    let headers = reader.headers()?.clone();
    let indices = FieldIndices::from_headers(&headers, input_config)?;

    let mut window = LiveWindow::new();
    let mut right_index: u64 = 0;
    let mut last_timestamp: Option<NaiveDateTime> = None;
    let mut max_window_len = 0;

    let progress = ProgressBar::new_spinner().with_style(
        ProgressStyle::with_template("{spinner} {pos} observations ({per_sec})")
            .expect("static template"),
    );

    for result in reader.records() {
        let record = result?;
        // 1-based data row number for error reports; equals right_index + 1
        // because the header is row 0.
        let row = right_index + 1;
        let observation = Observation::from_record(&record, &indices, input_config, row)?;

        if let Some(previous) = last_timestamp {
            if observation.timestamp < previous {
                return Err(SparsifyError::UnsortedInput { row });
            }
        }
        last_timestamp = Some(observation.timestamp);

        let evicted = window.evict(observation.timestamp, params.time_threshold);
        if evicted > 0 {
            debug!(
                "row {}: evicted {} stale observations, window now [{}, {})",
                row,
                evicted,
                window.left_index(),
                right_index
            );
        }

        let distances = evaluate_window(params.metric.as_ref(), window.iter(), &observation);
        for (offset, distance) in distances.iter().enumerate() {
            if *distance <= params.space_threshold {
                writer.emit_symmetric(
                    window.left_index() + offset as u64,
                    right_index,
                    *distance,
                )?;
            }
        }
        writer.flush()?;

        window.push(observation);
        right_index += 1;
        max_window_len = max_window_len.max(window.len());
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary = SparsifySummary {
        observations: right_index,
        entries_written: writer.entries_written(),
        max_window_len,
    };
    info!(
        "sparsified {} observations into {} entries (max window length {})",
        summary.observations, summary.entries_written, summary.max_window_len
    );
    Ok(summary)
}
