//! Sample write commands: TS.ADD, TS.MADD, TS.INCRBY, TS.DECRBY, TS.DEL

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::{DuplicatePolicy, Encoding, Sample};
use crate::wire::Value;

use super::{
    duration_millis, push_labels, Command, KW_CHUNK_SIZE, KW_ENCODING, KW_ON_DUPLICATE,
    KW_RETENTION, KW_TIMESTAMP, KW_UNCOMPRESSED,
};

/// Optional settings for [`Add`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOptions {
    retention: Option<Duration>,
    encoding: Option<Encoding>,
    chunk_size: Option<u64>,
    on_duplicate: Option<DuplicatePolicy>,
    labels: BTreeMap<String, String>,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retention applied when the series is created by this write
    pub fn retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    /// Chunk encoding applied when the series is created by this write
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Chunk size applied when the series is created by this write
    pub fn chunk_size(mut self, bytes: u64) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    /// Override the series duplicate policy for this single write
    pub fn on_duplicate(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = Some(policy);
        self
    }

    /// Attach one label; the same name keeps the last value
    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Attach several labels at once
    pub fn labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in labels {
            self.labels.insert(name.into(), value.into());
        }
        self
    }
}

/// TS.ADD: append one sample
#[derive(Debug, Clone)]
pub struct Add {
    sample: Sample,
    options: AddOptions,
}

impl Add {
    pub fn new(sample: Sample, options: AddOptions) -> Self {
        Self { sample, options }
    }
}

impl Command for Add {
    fn name(&self) -> &'static str {
        "TS.ADD"
    }

    fn args(&self) -> Vec<Value> {
        let mut args = vec![
            Value::text(self.sample.key.clone()),
            self.sample.timestamp.to_arg(),
            Value::Float(self.sample.value),
        ];
        if let Some(retention) = self.options.retention {
            args.push(Value::text(KW_RETENTION));
            args.push(Value::Int(duration_millis(retention)));
        }
        if let Some(encoding) = self.options.encoding {
            args.push(Value::text(KW_ENCODING));
            args.push(Value::text(encoding.as_str()));
        }
        if let Some(bytes) = self.options.chunk_size {
            args.push(Value::text(KW_CHUNK_SIZE));
            args.push(Value::Int(bytes as i64));
        }
        if let Some(policy) = self.options.on_duplicate {
            args.push(Value::text(KW_ON_DUPLICATE));
            args.push(Value::text(policy.as_str()));
        }
        push_labels(&mut args, &self.options.labels);
        args
    }
}

/// TS.MADD: append samples to several series in one call
#[derive(Debug, Clone)]
pub struct Madd {
    samples: Vec<Sample>,
}

impl Madd {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}

impl Command for Madd {
    fn name(&self) -> &'static str {
        "TS.MADD"
    }

    fn args(&self) -> Vec<Value> {
        let mut args = Vec::with_capacity(self.samples.len() * 3);
        for sample in &self.samples {
            args.push(Value::text(sample.key.clone()));
            args.push(sample.timestamp.to_arg());
            args.push(Value::Float(sample.value));
        }
        args
    }
}

/// Optional settings for [`Counter`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterOptions {
    timestamp: Option<DateTime<Utc>>,
    retention: Option<Duration>,
    encoding: Option<Encoding>,
    chunk_size: Option<u64>,
    labels: BTreeMap<String, String>,
}

impl CounterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit timestamp for the new sample instead of server time
    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Retention applied when the series is created by this write
    pub fn retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    /// Chunk encoding applied when the series is created by this write
    ///
    /// The counter grammar only has an `UNCOMPRESSED` flag; requesting
    /// compressed encoding emits nothing, which is the server default.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Chunk size applied when the series is created by this write
    pub fn chunk_size(mut self, bytes: u64) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    /// Attach one label; the same name keeps the last value
    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Attach several labels at once
    pub fn labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in labels {
            self.labels.insert(name.into(), value.into());
        }
        self
    }
}

/// TS.INCRBY / TS.DECRBY: write a sample relative to the latest value
#[derive(Debug, Clone)]
pub struct Counter {
    name: &'static str,
    key: String,
    value: f64,
    options: CounterOptions,
}

impl Counter {
    /// Increment the latest value by `value`
    pub fn increment(key: impl Into<String>, value: f64, options: CounterOptions) -> Self {
        Self {
            name: "TS.INCRBY",
            key: key.into(),
            value,
            options,
        }
    }

    /// Decrement the latest value by `value`
    pub fn decrement(key: impl Into<String>, value: f64, options: CounterOptions) -> Self {
        Self {
            name: "TS.DECRBY",
            key: key.into(),
            value,
            options,
        }
    }
}

impl Command for Counter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn args(&self) -> Vec<Value> {
        let mut args = vec![Value::text(self.key.clone()), Value::Float(self.value)];
        if let Some(at) = self.options.timestamp {
            args.push(Value::text(KW_TIMESTAMP));
            args.push(Value::Int(at.timestamp_millis()));
        }
        if let Some(retention) = self.options.retention {
            args.push(Value::text(KW_RETENTION));
            args.push(Value::Int(duration_millis(retention)));
        }
        if self.options.encoding == Some(Encoding::Uncompressed) {
            args.push(Value::text(KW_UNCOMPRESSED));
        }
        if let Some(bytes) = self.options.chunk_size {
            args.push(Value::text(KW_CHUNK_SIZE));
            args.push(Value::Int(bytes as i64));
        }
        push_labels(&mut args, &self.options.labels);
        args
    }
}

/// TS.DEL: delete all samples between two instants
#[derive(Debug, Clone)]
pub struct Del {
    key: String,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl Del {
    pub fn new(key: impl Into<String>, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            from,
            to,
        }
    }
}

impl Command for Del {
    fn name(&self) -> &'static str {
        "TS.DEL"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::text(self.key.clone()),
            Value::Int(self.from.timestamp_millis()),
            Value::Int(self.to.timestamp_millis()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    #[test]
    fn test_add_positional_args() {
        let sample = Sample::new("temp:3:11", Timestamp::Auto, 27.5);
        let cmd = Add::new(sample, AddOptions::new());
        assert_eq!(cmd.name(), "TS.ADD");
        assert_eq!(
            cmd.args(),
            vec![Value::text("temp:3:11"), Value::text("*"), Value::Float(27.5)]
        );
    }

    #[test]
    fn test_add_uses_on_duplicate_keyword() {
        let sample = Sample::new("k", Timestamp::from_millis(1_000).unwrap(), 1.0);
        let options = AddOptions::new().on_duplicate(DuplicatePolicy::Sum);
        let cmd = Add::new(sample, options);
        assert_eq!(
            cmd.args(),
            vec![
                Value::text("k"),
                Value::Int(1_000),
                Value::Float(1.0),
                Value::text("ON_DUPLICATE"),
                Value::text("SUM"),
            ]
        );
    }

    #[test]
    fn test_add_order_independent_of_application_order() {
        let sample = Sample::new("k", Timestamp::Auto, 1.0);
        let a = AddOptions::new()
            .label("l", "v")
            .chunk_size(128)
            .retention(Duration::from_secs(5))
            .encoding(Encoding::Compressed);
        let b = AddOptions::new()
            .encoding(Encoding::Compressed)
            .retention(Duration::from_secs(5))
            .chunk_size(128)
            .label("l", "v");
        assert_eq!(
            Add::new(sample.clone(), a).args(),
            Add::new(sample, b).args()
        );
    }

    #[test]
    fn test_madd_flattens_triples() {
        let cmd = Madd::new(vec![
            Sample::new("a", Timestamp::from_millis(1).unwrap(), 1.0),
            Sample::new("b", Timestamp::Auto, 2.0),
        ]);
        assert_eq!(cmd.name(), "TS.MADD");
        assert_eq!(
            cmd.args(),
            vec![
                Value::text("a"),
                Value::Int(1),
                Value::Float(1.0),
                Value::text("b"),
                Value::text("*"),
                Value::Float(2.0),
            ]
        );
    }

    #[test]
    fn test_counter_schema_order() {
        let at = DateTime::from_timestamp_millis(500).unwrap();
        let options = CounterOptions::new()
            .label("l", "v")
            .chunk_size(256)
            .encoding(Encoding::Uncompressed)
            .retention(Duration::from_secs(1))
            .timestamp(at);
        let cmd = Counter::increment("hits", 2.0, options);
        assert_eq!(cmd.name(), "TS.INCRBY");
        assert_eq!(
            cmd.args(),
            vec![
                Value::text("hits"),
                Value::Float(2.0),
                Value::text("TIMESTAMP"),
                Value::Int(500),
                Value::text("RETENTION"),
                Value::Int(1_000),
                Value::text("UNCOMPRESSED"),
                Value::text("CHUNK_SIZE"),
                Value::Int(256),
                Value::text("LABELS"),
                Value::text("l"),
                Value::text("v"),
            ]
        );
    }

    #[test]
    fn test_counter_compressed_encoding_emits_no_flag() {
        let options = CounterOptions::new().encoding(Encoding::Compressed);
        let cmd = Counter::decrement("hits", 1.0, options);
        assert_eq!(cmd.name(), "TS.DECRBY");
        assert_eq!(cmd.args(), vec![Value::text("hits"), Value::Float(1.0)]);
    }

    #[test]
    fn test_del_renders_epoch_millis() {
        let from = DateTime::from_timestamp_millis(1_000).unwrap();
        let to = DateTime::from_timestamp_millis(2_000).unwrap();
        let cmd = Del::new("temp:3:11", from, to);
        assert_eq!(cmd.name(), "TS.DEL");
        assert_eq!(
            cmd.args(),
            vec![Value::text("temp:3:11"), Value::Int(1_000), Value::Int(2_000)]
        );
    }
}
