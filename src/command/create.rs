//! Series lifecycle commands: TS.CREATE and TS.ALTER

use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::{DuplicatePolicy, Encoding};
use crate::wire::Value;

use super::{
    duration_millis, push_labels, Command, KW_CHUNK_SIZE, KW_DUPLICATE_POLICY, KW_ENCODING,
    KW_RETENTION,
};

/// Optional settings for [`Create`]
///
/// Each setter overlays one field; applying the same setter again keeps the
/// last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateOptions {
    retention: Option<Duration>,
    encoding: Option<Encoding>,
    chunk_size: Option<u64>,
    duplicate_policy: Option<DuplicatePolicy>,
    labels: BTreeMap<String, String>,
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum age of samples before eviction
    pub fn retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    /// Chunk encoding for the new series
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Memory allocated per data chunk, in bytes
    pub fn chunk_size(mut self, bytes: u64) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    /// Policy applied when a write collides with an existing timestamp
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = Some(policy);
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

/// TS.CREATE: create a new series
#[derive(Debug, Clone)]
pub struct Create {
    key: String,
    options: CreateOptions,
}

impl Create {
    pub fn new(key: impl Into<String>, options: CreateOptions) -> Self {
        Self {
            key: key.into(),
            options,
        }
    }
}

impl Command for Create {
    fn name(&self) -> &'static str {
        "TS.CREATE"
    }

    fn args(&self) -> Vec<Value> {
        let mut args = vec![Value::text(self.key.clone())];
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
        if let Some(policy) = self.options.duplicate_policy {
            args.push(Value::text(KW_DUPLICATE_POLICY));
            args.push(Value::text(policy.as_str()));
        }
        push_labels(&mut args, &self.options.labels);
        args
    }
}

/// Optional settings for [`Alter`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlterOptions {
    retention: Option<Duration>,
    chunk_size: Option<u64>,
    duplicate_policy: Option<DuplicatePolicy>,
    labels: BTreeMap<String, String>,
}

impl AlterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum age of samples before eviction
    pub fn retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    /// Memory allocated per data chunk, in bytes
    pub fn chunk_size(mut self, bytes: u64) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    /// Policy applied when a write collides with an existing timestamp
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = Some(policy);
        self
    }

    /// Replace the label set; the server overwrites all existing labels
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

/// TS.ALTER: update retention, chunk size, duplicate policy, or labels of an
/// existing series
#[derive(Debug, Clone)]
pub struct Alter {
    key: String,
    options: AlterOptions,
}

impl Alter {
    pub fn new(key: impl Into<String>, options: AlterOptions) -> Self {
        Self {
            key: key.into(),
            options,
        }
    }
}

impl Command for Alter {
    fn name(&self) -> &'static str {
        "TS.ALTER"
    }

    fn args(&self) -> Vec<Value> {
        let mut args = vec![Value::text(self.key.clone())];
        if let Some(retention) = self.options.retention {
            args.push(Value::text(KW_RETENTION));
            args.push(Value::Int(duration_millis(retention)));
        }
        if let Some(bytes) = self.options.chunk_size {
            args.push(Value::text(KW_CHUNK_SIZE));
            args.push(Value::Int(bytes as i64));
        }
        if let Some(policy) = self.options.duplicate_policy {
            args.push(Value::text(KW_DUPLICATE_POLICY));
            args.push(Value::text(policy.as_str()));
        }
        push_labels(&mut args, &self.options.labels);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(args: &[Value]) -> Vec<String> {
        args.iter()
            .map(|a| match a {
                Value::Text(s) => s.clone(),
                Value::Int(n) => n.to_string(),
                other => panic!("unexpected arg {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_create_key_only() {
        let cmd = Create::new("temp:3:11", CreateOptions::new());
        assert_eq!(cmd.name(), "TS.CREATE");
        assert_eq!(cmd.args(), vec![Value::text("temp:3:11")]);
    }

    #[test]
    fn test_create_full_schema_order() {
        let options = CreateOptions::new()
            .label("sensor_id", "2")
            .duplicate_policy(DuplicatePolicy::Max)
            .chunk_size(4096)
            .encoding(Encoding::Uncompressed)
            .retention(Duration::from_secs(3600));
        let cmd = Create::new("temp:3:11", options);
        assert_eq!(
            texts(&cmd.args()),
            vec![
                "temp:3:11",
                "RETENTION",
                "3600000",
                "ENCODING",
                "UNCOMPRESSED",
                "CHUNK_SIZE",
                "4096",
                "DUPLICATE_POLICY",
                "MAX",
                "LABELS",
                "sensor_id",
                "2",
            ]
        );
    }

    #[test]
    fn test_create_order_independent_of_application_order() {
        let a = CreateOptions::new()
            .retention(Duration::from_secs(60))
            .encoding(Encoding::Compressed)
            .label("a", "1")
            .label("b", "2");
        let b = CreateOptions::new()
            .label("b", "2")
            .encoding(Encoding::Compressed)
            .label("a", "1")
            .retention(Duration::from_secs(60));
        assert_eq!(
            Create::new("k", a).args(),
            Create::new("k", b).args()
        );
    }

    #[test]
    fn test_create_repeated_setter_keeps_last() {
        let options = CreateOptions::new()
            .retention(Duration::from_secs(1))
            .retention(Duration::from_secs(9));
        let cmd = Create::new("k", options);
        assert_eq!(
            texts(&cmd.args()),
            vec!["k", "RETENTION", "9000"]
        );
    }

    #[test]
    fn test_alter_schema_order() {
        let options = AlterOptions::new()
            .labels([("region", "eu")])
            .duplicate_policy(DuplicatePolicy::First)
            .retention(Duration::from_secs(120))
            .chunk_size(8192);
        let cmd = Alter::new("temp:3:11", options);
        assert_eq!(cmd.name(), "TS.ALTER");
        assert_eq!(
            texts(&cmd.args()),
            vec![
                "temp:3:11",
                "RETENTION",
                "120000",
                "CHUNK_SIZE",
                "8192",
                "DUPLICATE_POLICY",
                "FIRST",
                "LABELS",
                "region",
                "eu",
            ]
        );
    }
}
