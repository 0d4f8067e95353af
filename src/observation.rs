use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::errors::SparsifyError;

/// Names and formats of the columns we pull out of the input table.
///
/// The defaults match the common export shape for incident-style datasets:
/// a `MM/DD/YYYY HH:MM` timestamp plus decimal-degree coordinates.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    pub timestamp_format: String,
    pub timestamp_field: String,
    pub latitude_field: String,
    pub longitude_field: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            timestamp_format: "%m/%d/%Y %H:%M".into(),
            timestamp_field: "timestamp".into(),
            latitude_field: "latitude".into(),
            longitude_field: "longitude".into(),
        }
    }
}

/// One input row after parsing. Never mutated; owned by the pass that read it
/// and dropped once it leaves the live window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolved positions of the three required columns in the header row.
#[derive(Debug, Clone, Copy)]
pub struct FieldIndices {
    timestamp: usize,
    latitude: usize,
    longitude: usize,
}

impl FieldIndices {
    /// Locates the configured column names in the header record.
    /// A missing column is a schema error at row 0 (the header).
    pub fn from_headers(
        headers: &StringRecord,
        config: &InputConfig,
    ) -> Result<FieldIndices, SparsifyError> {
        let find = |name: &str| -> Result<usize, SparsifyError> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SparsifyError::Schema {
                    row: 0,
                    field: name.to_string(),
                })
        };

        Ok(FieldIndices {
            timestamp: find(&config.timestamp_field)?,
            latitude: find(&config.latitude_field)?,
            longitude: find(&config.longitude_field)?,
        })
    }
}

impl Observation {
    /// Parses one data record into an observation.
    ///
    /// `row` is the 1-based data row number used in error reports. Coordinates
    /// outside the metric domain (|lat| > 90, |lon| > 180) are rejected here so
    /// the metric itself never sees degenerate input.
    pub fn from_record(
        record: &StringRecord,
        indices: &FieldIndices,
        config: &InputConfig,
        row: u64,
    ) -> Result<Observation, SparsifyError> {
        let raw_timestamp = get_field(record, indices.timestamp, &config.timestamp_field, row)?;
        let timestamp = NaiveDateTime::parse_from_str(raw_timestamp, &config.timestamp_format)
            .map_err(|_| SparsifyError::TimestampParse {
                row,
                value: raw_timestamp.to_string(),
                format: config.timestamp_format.clone(),
            })?;

        let latitude = parse_coordinate(record, indices.latitude, &config.latitude_field, row)?;
        let longitude = parse_coordinate(record, indices.longitude, &config.longitude_field, row)?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(SparsifyError::MetricDomain {
                row,
                latitude,
                longitude,
            });
        }

        Ok(Observation {
            timestamp,
            latitude,
            longitude,
        })
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

fn get_field<'a>(
    record: &'a StringRecord,
    index: usize,
    field: &str,
    row: u64,
) -> Result<&'a str, SparsifyError> {
    match record.get(index) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim()),
        _ => Err(SparsifyError::Schema {
            row,
            field: field.to_string(),
        }),
    }
}

fn parse_coordinate(
    record: &StringRecord,
    index: usize,
    field: &str,
    row: u64,
) -> Result<f64, SparsifyError> {
    let raw = get_field(record, index, field, row)?;
    let value: f64 = raw.parse().map_err(|_| SparsifyError::Schema {
        row,
        field: field.to_string(),
    })?;
    if !value.is_finite() {
        return Err(SparsifyError::Schema {
            row,
            field: field.to_string(),
        });
    }
    Ok(value)
}
