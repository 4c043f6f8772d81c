//! TS.INFO reply decoding
//!
//! The info reply is a flat key/value sequence in which every field is
//! independently optional. Recognized fields fill the snapshot; null or
//! absent values leave the default in place; unknown keys are ignored so
//! newer servers stay decodable.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Aggregation, DuplicatePolicy, Encoding, Label};
use crate::wire::Value;

use super::{decode_labels, DecodeError, DecodeResult};

/// One compaction link from a source series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Destination series fed by this rule
    pub dest_key: String,
    pub aggregation: Aggregation,
}

/// Diagnostic detail for one storage chunk, present only when requested
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkInfo {
    /// First sample timestamp in the chunk, epoch milliseconds
    pub start_timestamp: i64,
    /// Last sample timestamp in the chunk, epoch milliseconds
    pub end_timestamp: i64,
    pub samples: i64,
    /// Chunk size in bytes
    pub size: i64,
    pub bytes_per_sample: f64,
}

/// Aggregate snapshot of one series
///
/// Fields the server did not report keep their default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub total_samples: i64,
    /// Memory footprint in bytes
    pub memory_usage: i64,
    /// First sample timestamp, epoch milliseconds
    pub first_timestamp: i64,
    /// Last sample timestamp, epoch milliseconds
    pub last_timestamp: i64,
    pub retention: Duration,
    pub chunk_count: i64,
    /// Memory allocated per chunk, in bytes
    pub chunk_size: i64,
    pub chunk_type: Option<Encoding>,
    pub duplicate_policy: Option<DuplicatePolicy>,
    pub labels: Vec<Label>,
    /// Source series when this series is a compaction destination
    pub source_key: Option<String>,
    /// Compaction rules fanning out of this series
    pub rules: Vec<Rule>,
    /// Per-chunk detail, present only for debug queries
    pub chunks: Vec<ChunkInfo>,
}

fn int_field(value: &Value, field: &str) -> DecodeResult<i64> {
    value
        .as_int()
        .ok_or_else(|| DecodeError::Number(format!("{field} is {}", value.kind())))
}

fn float_field(value: &Value, field: &str) -> DecodeResult<f64> {
    value
        .as_float()
        .ok_or_else(|| DecodeError::Number(format!("{field} is {}", value.kind())))
}

fn text_field(value: &Value, field: &str) -> DecodeResult<String> {
    value
        .as_text()
        .ok_or_else(|| DecodeError::Shape(format!("{field} is {}", value.kind())))
}

fn key_value_pairs<'a>(value: &'a Value, what: &str) -> DecodeResult<&'a [Value]> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::Shape(format!("{what} is {}, not an array", value.kind())))?;
    if items.len() % 2 != 0 {
        return Err(DecodeError::Shape(format!(
            "{what} key/value sequence has odd length {}",
            items.len()
        )));
    }
    Ok(items)
}

/// Decode one `[dest-key, bucket-ms, aggregation-type]` rule entry
fn decode_rule(value: &Value) -> DecodeResult<Rule> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::Shape(format!("rule entry is {}", value.kind())))?;
    if items.len() != 3 {
        return Err(DecodeError::Shape(format!(
            "rule entry has {} slots, expected 3",
            items.len()
        )));
    }
    let dest_key = text_field(&items[0], "rule destination")?;
    let bucket_ms = int_field(&items[1], "rule bucket")?;
    let kind = text_field(&items[2], "rule aggregation")?.parse()?;
    Ok(Rule {
        dest_key,
        aggregation: Aggregation::new(kind, Duration::from_millis(bucket_ms.max(0) as u64)),
    })
}

fn decode_chunk_info(value: &Value) -> DecodeResult<ChunkInfo> {
    let items = key_value_pairs(value, "chunk detail")?;
    let mut chunk = ChunkInfo::default();
    for pair in items.chunks_exact(2) {
        let key = text_field(&pair[0], "chunk field name")?;
        let value = &pair[1];
        if value.is_no_value() {
            continue;
        }
        match key.as_str() {
            "startTimestamp" => chunk.start_timestamp = int_field(value, "startTimestamp")?,
            "endTimestamp" => chunk.end_timestamp = int_field(value, "endTimestamp")?,
            "samples" => chunk.samples = int_field(value, "samples")?,
            "size" => chunk.size = int_field(value, "size")?,
            "bytesPerSample" => chunk.bytes_per_sample = float_field(value, "bytesPerSample")?,
            _ => {}
        }
    }
    Ok(chunk)
}

/// Decode a TS.INFO reply
pub fn decode_series_info(value: &Value) -> DecodeResult<SeriesInfo> {
    let items = key_value_pairs(value, "series info")?;
    let mut info = SeriesInfo::default();
    for pair in items.chunks_exact(2) {
        let key = text_field(&pair[0], "info field name")?;
        let value = &pair[1];
        if value.is_no_value() {
            continue;
        }
        match key.as_str() {
            "totalSamples" => info.total_samples = int_field(value, "totalSamples")?,
            "memoryUsage" => info.memory_usage = int_field(value, "memoryUsage")?,
            "firstTimestamp" => info.first_timestamp = int_field(value, "firstTimestamp")?,
            "lastTimestamp" => info.last_timestamp = int_field(value, "lastTimestamp")?,
            "retentionTime" => {
                let ms = int_field(value, "retentionTime")?;
                info.retention = Duration::from_millis(ms.max(0) as u64);
            }
            "chunkCount" => info.chunk_count = int_field(value, "chunkCount")?,
            "chunkSize" => info.chunk_size = int_field(value, "chunkSize")?,
            "chunkType" => {
                info.chunk_type = Some(text_field(value, "chunkType")?.parse()?);
            }
            "duplicatePolicy" => {
                info.duplicate_policy = Some(text_field(value, "duplicatePolicy")?.parse()?);
            }
            "labels" => info.labels = decode_labels(value)?,
            "sourceKey" => info.source_key = Some(text_field(value, "sourceKey")?),
            "rules" => {
                let entries = value
                    .as_array()
                    .ok_or_else(|| DecodeError::Shape(format!("rule list is {}", value.kind())))?;
                info.rules = entries.iter().map(decode_rule).collect::<DecodeResult<_>>()?;
            }
            // The server spells the debug-only chunk list with a capital C.
            "Chunks" => {
                let entries = value
                    .as_array()
                    .ok_or_else(|| DecodeError::Shape(format!("chunk list is {}", value.kind())))?;
                info.chunks = entries
                    .iter()
                    .map(decode_chunk_info)
                    .collect::<DecodeResult<_>>()?;
            }
            _ => {}
        }
    }
    Ok(info)
}
