//! Reply decoders
//!
//! Pure functions turning the transport's untyped reply values into typed
//! results. Decoders tolerate what the server legitimately varies: optional
//! fields may be missing, scalars may arrive as native numbers or as their
//! decimal string form, and "no value" may be a true null or a typed
//! placeholder. Anything else is a shape violation and fails fast with a
//! [`DecodeError`].

mod info;

pub use info::{decode_series_info, ChunkInfo, Rule, SeriesInfo};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{InvalidTag, Label};
use crate::wire::Value;

/// Errors raised when a reply does not match the documented wire shape
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Reply structure mismatch (wrong variant, wrong arity)
    #[error("unexpected reply shape: {0}")]
    Shape(String),

    /// A scalar could not be read as the expected number
    #[error("invalid numeric value: {0}")]
    Number(String),

    /// An epoch-millisecond value outside the representable range
    #[error("timestamp out of range: {0}")]
    Timestamp(i64),

    /// A closed tag carried an unknown spelling
    #[error(transparent)]
    Tag(#[from] InvalidTag),
}

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

// ============================================
// Result types
// ============================================

/// One decoded sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// One series slice of a multi-series range reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub key: String,
    /// Labels of the series; empty unless the query requested them
    pub labels: Vec<Label>,
    pub points: Vec<DataPoint>,
}

/// Per-series element of a multi-get reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastSample {
    pub key: String,
    /// Labels of the series; empty unless the query requested them
    pub labels: Vec<Label>,
    /// The latest sample, or `None` for a series holding no samples
    pub sample: Option<DataPoint>,
}

/// Per-sample result of a batch append
///
/// Each element of the batch succeeds or fails independently; one failing
/// sample never affects its neighbors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SampleOutcome {
    /// The sample was written at this timestamp
    Written(DateTime<Utc>),
    /// The server rejected this sample with the given message
    Failed(String),
}

impl SampleOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, SampleOutcome::Written(_))
    }

    /// Timestamp of a successful write
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SampleOutcome::Written(at) => Some(*at),
            SampleOutcome::Failed(_) => None,
        }
    }

    /// Server message of a failed write
    pub fn error(&self) -> Option<&str> {
        match self {
            SampleOutcome::Written(_) => None,
            SampleOutcome::Failed(message) => Some(message),
        }
    }
}

// ============================================
// Decoders
// ============================================

/// Decode an epoch-millisecond scalar into an instant
pub fn decode_timestamp(value: &Value) -> DecodeResult<DateTime<Utc>> {
    let ms = value
        .as_int()
        .ok_or_else(|| DecodeError::Number(format!("expected epoch millis, got {}", value.kind())))?;
    DateTime::from_timestamp_millis(ms).ok_or(DecodeError::Timestamp(ms))
}

/// Decode a `[timestamp, value]` pair
pub fn decode_datapoint(value: &Value) -> DecodeResult<DataPoint> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::Shape(format!("data point is {}, not a pair", value.kind())))?;
    if items.len() != 2 {
        return Err(DecodeError::Shape(format!(
            "data point has {} elements, expected 2",
            items.len()
        )));
    }
    let timestamp = decode_timestamp(&items[0])?;
    let value = items[1]
        .as_float()
        .ok_or_else(|| DecodeError::Number(format!("sample value is {}", items[1].kind())))?;
    Ok(DataPoint { timestamp, value })
}

/// Decode a sequence of data points
pub fn decode_datapoints(value: &Value) -> DecodeResult<Vec<DataPoint>> {
    let items = value.as_array().ok_or_else(|| {
        DecodeError::Shape(format!("range reply is {}, not an array", value.kind()))
    })?;
    items.iter().map(decode_datapoint).collect()
}

/// Decode a last-sample reply that may legitimately be empty
///
/// An empty sequence (or a null) means the series holds no samples and
/// decodes to `None`, never to a zero-valued point.
pub fn decode_maybe_datapoint(value: &Value) -> DecodeResult<Option<DataPoint>> {
    if value.is_no_value() {
        return Ok(None);
    }
    match value.as_array() {
        Some([]) => Ok(None),
        Some(_) => decode_datapoint(value).map(Some),
        None => Err(DecodeError::Shape(format!(
            "last sample reply is {}, not an array",
            value.kind()
        ))),
    }
}

/// Decode a `[[name, value], ...]` label list; a missing slot decodes empty
pub(crate) fn decode_labels(value: &Value) -> DecodeResult<Vec<Label>> {
    if value.is_no_value() {
        return Ok(Vec::new());
    }
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::Shape(format!("label list is {}", value.kind())))?;
    items
        .iter()
        .map(|entry| {
            let pair = entry
                .as_array()
                .ok_or_else(|| DecodeError::Shape(format!("label entry is {}", entry.kind())))?;
            if pair.len() != 2 {
                return Err(DecodeError::Shape(format!(
                    "label entry has {} elements, expected 2",
                    pair.len()
                )));
            }
            let name = pair[0]
                .as_text()
                .ok_or_else(|| DecodeError::Shape(format!("label name is {}", pair[0].kind())))?;
            let value = pair[1]
                .as_text()
                .ok_or_else(|| DecodeError::Shape(format!("label value is {}", pair[1].kind())))?;
            Ok(Label::new(name, value))
        })
        .collect()
}

/// Decode one `[key, labels, points]` element of a multi-range reply
pub fn decode_time_series(value: &Value) -> DecodeResult<TimeSeries> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::Shape(format!("series element is {}", value.kind())))?;
    if items.len() != 3 {
        return Err(DecodeError::Shape(format!(
            "series element has {} slots, expected 3",
            items.len()
        )));
    }
    let key = items[0]
        .as_text()
        .ok_or_else(|| DecodeError::Shape(format!("series key is {}", items[0].kind())))?;
    let labels = decode_labels(&items[1])?;
    let points = if items[2].is_no_value() {
        Vec::new()
    } else {
        decode_datapoints(&items[2])?
    };
    Ok(TimeSeries { key, labels, points })
}

/// Decode a multi-range reply
pub fn decode_series_list(value: &Value) -> DecodeResult<Vec<TimeSeries>> {
    let items = value.as_array().ok_or_else(|| {
        DecodeError::Shape(format!("multi-range reply is {}, not an array", value.kind()))
    })?;
    items.iter().map(decode_time_series).collect()
}

/// Decode one `[key, labels, point-or-empty]` element of a multi-get reply
pub fn decode_last_sample(value: &Value) -> DecodeResult<LastSample> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::Shape(format!("multi-get element is {}", value.kind())))?;
    if items.len() != 3 {
        return Err(DecodeError::Shape(format!(
            "multi-get element has {} slots, expected 3",
            items.len()
        )));
    }
    let key = items[0]
        .as_text()
        .ok_or_else(|| DecodeError::Shape(format!("series key is {}", items[0].kind())))?;
    let labels = decode_labels(&items[1])?;
    let sample = decode_maybe_datapoint(&items[2])?;
    Ok(LastSample { key, labels, sample })
}

/// Decode a multi-get reply
pub fn decode_last_samples(value: &Value) -> DecodeResult<Vec<LastSample>> {
    let items = value.as_array().ok_or_else(|| {
        DecodeError::Shape(format!("multi-get reply is {}, not an array", value.kind()))
    })?;
    items.iter().map(decode_last_sample).collect()
}

/// Decode a batch append reply into per-sample outcomes
///
/// Each element is either a write timestamp or an error attached to that
/// single sample. Error elements are preserved in place; they never abort
/// the decoding of their neighbors.
pub fn decode_outcomes(value: &Value) -> DecodeResult<Vec<SampleOutcome>> {
    let items = value.as_array().ok_or_else(|| {
        DecodeError::Shape(format!("batch reply is {}, not an array", value.kind()))
    })?;
    items
        .iter()
        .map(|item| match item {
            Value::Error(message) => Ok(SampleOutcome::Failed(message.clone())),
            other => decode_timestamp(other).map(SampleOutcome::Written),
        })
        .collect()
}

/// Decode an index query reply into the matching keys
pub fn decode_keys(value: &Value) -> DecodeResult<Vec<String>> {
    let items = value.as_array().ok_or_else(|| {
        DecodeError::Shape(format!("index reply is {}, not an array", value.kind()))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_text()
                .ok_or_else(|| DecodeError::Shape(format!("index key is {}", item.kind())))
        })
        .collect()
}
