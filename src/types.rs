//! Core domain vocabulary shared by every command
//!
//! This module defines the closed tag enums and small value types the
//! command builders and reply decoders both speak:
//! - `Encoding`, `DuplicatePolicy`, `AggregationType`, `ReducerType`: closed
//!   string-backed tags, canonical-uppercase on the wire
//! - `Timestamp`: an absolute instant or one of the server sentinels
//! - `Filter`: a label match expression for multi-series commands
//! - `Label`, `Aggregation`, `GroupBy`, `Sample`: per-call value types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::wire::Value;

/// A tag string received from the server did not match any known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {what}: {value}")]
pub struct InvalidTag {
    what: &'static str,
    value: String,
}

impl InvalidTag {
    fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

// ============================================
// Tag enums
// ============================================

/// Sample encoding used for the chunks of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    /// DoubleDelta compression of the stored samples
    #[serde(rename = "COMPRESSED")]
    Compressed,
    /// Raw samples kept in memory
    #[serde(rename = "UNCOMPRESSED")]
    Uncompressed,
}

impl Encoding {
    /// Canonical uppercase wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Compressed => "COMPRESSED",
            Encoding::Uncompressed => "UNCOMPRESSED",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = InvalidTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COMPRESSED" => Ok(Encoding::Compressed),
            "UNCOMPRESSED" => Ok(Encoding::Uncompressed),
            _ => Err(InvalidTag::new("encoding", s)),
        }
    }
}

/// Conflict resolution applied when a new sample collides with an existing
/// timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Reject the write with an error
    #[serde(rename = "BLOCK")]
    Block,
    /// Keep the existing value and ignore the new one
    #[serde(rename = "FIRST")]
    First,
    /// Override with the new value
    #[serde(rename = "LAST")]
    Last,
    /// Override only when the new value is lower
    #[serde(rename = "MIN")]
    Min,
    /// Override only when the new value is higher
    #[serde(rename = "MAX")]
    Max,
    /// Add the new value to the existing one, or set it when none exists
    #[serde(rename = "SUM")]
    Sum,
}

impl DuplicatePolicy {
    /// Canonical uppercase wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Block => "BLOCK",
            DuplicatePolicy::First => "FIRST",
            DuplicatePolicy::Last => "LAST",
            DuplicatePolicy::Min => "MIN",
            DuplicatePolicy::Max => "MAX",
            DuplicatePolicy::Sum => "SUM",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = InvalidTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BLOCK" => Ok(DuplicatePolicy::Block),
            "FIRST" => Ok(DuplicatePolicy::First),
            "LAST" => Ok(DuplicatePolicy::Last),
            "MIN" => Ok(DuplicatePolicy::Min),
            "MAX" => Ok(DuplicatePolicy::Max),
            "SUM" => Ok(DuplicatePolicy::Sum),
            _ => Err(InvalidTag::new("duplicate policy", s)),
        }
    }
}

/// Aggregation function for compaction rules and bucketed range queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationType {
    /// Arithmetic mean of all values
    #[serde(rename = "AVG")]
    Avg,
    /// Sum of all values
    #[serde(rename = "SUM")]
    Sum,
    /// Minimum value
    #[serde(rename = "MIN")]
    Min,
    /// Maximum value
    #[serde(rename = "MAX")]
    Max,
    /// Difference between the highest and lowest value
    #[serde(rename = "RANGE")]
    Range,
    /// Number of values
    #[serde(rename = "COUNT")]
    Count,
    /// Value with the lowest timestamp in the bucket
    #[serde(rename = "FIRST")]
    First,
    /// Value with the highest timestamp in the bucket
    #[serde(rename = "LAST")]
    Last,
    /// Population standard deviation
    #[serde(rename = "STD.P")]
    StdP,
    /// Sample standard deviation
    #[serde(rename = "STD.S")]
    StdS,
    /// Population variance
    #[serde(rename = "VAR.P")]
    VarP,
    /// Sample variance
    #[serde(rename = "VAR.S")]
    VarS,
    /// Time-weighted average
    #[serde(rename = "TWA")]
    Twa,
}

impl AggregationType {
    /// Canonical uppercase wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Avg => "AVG",
            AggregationType::Sum => "SUM",
            AggregationType::Min => "MIN",
            AggregationType::Max => "MAX",
            AggregationType::Range => "RANGE",
            AggregationType::Count => "COUNT",
            AggregationType::First => "FIRST",
            AggregationType::Last => "LAST",
            AggregationType::StdP => "STD.P",
            AggregationType::StdS => "STD.S",
            AggregationType::VarP => "VAR.P",
            AggregationType::VarS => "VAR.S",
            AggregationType::Twa => "TWA",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationType {
    type Err = InvalidTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AVG" => Ok(AggregationType::Avg),
            "SUM" => Ok(AggregationType::Sum),
            "MIN" => Ok(AggregationType::Min),
            "MAX" => Ok(AggregationType::Max),
            "RANGE" => Ok(AggregationType::Range),
            "COUNT" => Ok(AggregationType::Count),
            "FIRST" => Ok(AggregationType::First),
            "LAST" => Ok(AggregationType::Last),
            "STD.P" => Ok(AggregationType::StdP),
            "STD.S" => Ok(AggregationType::StdS),
            "VAR.P" => Ok(AggregationType::VarP),
            "VAR.S" => Ok(AggregationType::VarS),
            "TWA" => Ok(AggregationType::Twa),
            _ => Err(InvalidTag::new("aggregation type", s)),
        }
    }
}

/// Reducer applied across grouped series in multi-series range queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReducerType {
    #[serde(rename = "SUM")]
    Sum,
    #[serde(rename = "MIN")]
    Min,
    #[serde(rename = "MAX")]
    Max,
}

impl ReducerType {
    /// Canonical uppercase wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            ReducerType::Sum => "SUM",
            ReducerType::Min => "MIN",
            ReducerType::Max => "MAX",
        }
    }
}

impl fmt::Display for ReducerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReducerType {
    type Err = InvalidTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUM" => Ok(ReducerType::Sum),
            "MIN" => Ok(ReducerType::Min),
            "MAX" => Ok(ReducerType::Max),
            _ => Err(InvalidTag::new("reducer", s)),
        }
    }
}

// ============================================
// Value types
// ============================================

/// A point in time as the server command grammar understands it
///
/// Exactly one mode is active per value: an absolute instant, the earliest
/// or latest sample sentinel, or the server-assigned-timestamp sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    /// Absolute instant, rendered as integer epoch milliseconds
    At(DateTime<Utc>),
    /// The earliest sample in the series, rendered as `-`
    Earliest,
    /// The latest sample in the series, rendered as `+`
    Latest,
    /// Let the server assign the current time, rendered as `*`
    Auto,
}

impl Timestamp {
    /// Absolute timestamp from epoch milliseconds
    ///
    /// Returns `None` when the value is outside the representable range.
    pub fn from_millis(ms: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(ms).map(Timestamp::At)
    }

    /// Render the single wire form of this timestamp
    pub(crate) fn to_arg(self) -> Value {
        match self {
            Timestamp::At(t) => Value::Int(t.timestamp_millis()),
            Timestamp::Earliest => Value::text("-"),
            Timestamp::Latest => Value::text("+"),
            Timestamp::Auto => Value::text("*"),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(t: DateTime<Utc>) -> Self {
        Timestamp::At(t)
    }
}

/// A label match expression used by multi-series commands
///
/// Rendering depends only on how many candidate values are present, never
/// on the polarity alone: zero values render as `label=`, one as `label=v`,
/// several as `label=(v1,v2)`, with `!=` substituted for inequality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    label: String,
    equal: bool,
    values: Vec<String>,
}

impl Filter {
    /// Match series whose label equals one of `values`
    pub fn equal<I, S>(label: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            equal: true,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Match series whose label differs from all of `values`
    pub fn not_equal<I, S>(label: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            equal: false,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Render the filter expression in the server's filter grammar
    pub(crate) fn render(&self) -> String {
        let mut out = self.label.clone();
        out.push_str(if self.equal { "=" } else { "!=" });
        match self.values.len() {
            0 => {}
            1 => out.push_str(&self.values[0]),
            _ => {
                out.push('(');
                out.push_str(&self.values.join(","));
                out.push(')');
            }
        }
        out
    }
}

/// A single name/value label attached to a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An aggregation function paired with its time bucket width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub kind: AggregationType,
    pub bucket: Duration,
}

impl Aggregation {
    pub fn new(kind: AggregationType, bucket: Duration) -> Self {
        Self { kind, bucket }
    }

    pub(crate) fn bucket_millis(&self) -> i64 {
        self.bucket.as_millis() as i64
    }
}

/// Grouping clause for multi-series range queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBy {
    pub label: String,
    pub reducer: ReducerType,
}

impl GroupBy {
    pub fn new(label: impl Into<String>, reducer: ReducerType) -> Self {
        Self {
            label: label.into(),
            reducer,
        }
    }
}

/// One sample destined for a series, constructed per call
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub key: String,
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Sample {
    pub fn new(key: impl Into<String>, timestamp: impl Into<Timestamp>, value: f64) -> Self {
        Self {
            key: key.into(),
            timestamp: timestamp.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        assert_eq!(Encoding::Compressed.as_str(), "COMPRESSED");
        assert_eq!("uncompressed".parse::<Encoding>(), Ok(Encoding::Uncompressed));
        assert_eq!(
            "last".parse::<DuplicatePolicy>(),
            Ok(DuplicatePolicy::Last)
        );
        assert_eq!("std.p".parse::<AggregationType>(), Ok(AggregationType::StdP));
        assert_eq!("twa".parse::<AggregationType>(), Ok(AggregationType::Twa));
        assert_eq!("max".parse::<ReducerType>(), Ok(ReducerType::Max));
    }

    #[test]
    fn test_tag_parse_rejects_unknown() {
        let err = "GZIP".parse::<Encoding>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized encoding: GZIP");
        assert!("MEDIAN".parse::<AggregationType>().is_err());
        assert!("AVG".parse::<ReducerType>().is_err());
    }

    #[test]
    fn test_timestamp_renders_single_form() {
        let at = Timestamp::from_millis(100).unwrap();
        assert_eq!(at.to_arg(), Value::Int(100));
        assert_eq!(Timestamp::Earliest.to_arg(), Value::text("-"));
        assert_eq!(Timestamp::Latest.to_arg(), Value::text("+"));
        assert_eq!(Timestamp::Auto.to_arg(), Value::text("*"));
    }

    #[test]
    fn test_filter_rendering() {
        assert_eq!(Filter::equal("l", std::iter::empty::<&str>()).render(), "l=");
        assert_eq!(Filter::equal("l", ["v"]).render(), "l=v");
        assert_eq!(Filter::equal("l", ["v1", "v2"]).render(), "l=(v1,v2)");
        assert_eq!(
            Filter::not_equal("l", std::iter::empty::<&str>()).render(),
            "l!="
        );
        assert_eq!(Filter::not_equal("l", ["v"]).render(), "l!=v");
        assert_eq!(Filter::not_equal("l", ["v1", "v2"]).render(), "l!=(v1,v2)");
    }

    #[test]
    fn test_aggregation_bucket_millis() {
        let agg = Aggregation::new(AggregationType::Avg, Duration::from_secs(60));
        assert_eq!(agg.bucket_millis(), 60_000);
        assert_eq!(Aggregation::new(AggregationType::Count, Duration::ZERO).bucket_millis(), 0);
    }

    #[test]
    fn test_sample_accepts_datetime_and_sentinel() {
        let at = DateTime::from_timestamp_millis(1_000).unwrap();
        let s = Sample::new("temp:1", at, 20.5);
        assert_eq!(s.timestamp, Timestamp::At(at));

        let s = Sample::new("temp:1", Timestamp::Auto, 20.5);
        assert_eq!(s.timestamp, Timestamp::Auto);
    }
}
