//! Compaction rule commands: TS.CREATERULE and TS.DELETERULE

use crate::types::Aggregation;
use crate::wire::Value;

use super::{Command, KW_AGGREGATION};

/// TS.CREATERULE: link a source series to a destination series through an
/// aggregation
#[derive(Debug, Clone)]
pub struct CreateRule {
    source: String,
    dest: String,
    aggregation: Aggregation,
}

impl CreateRule {
    pub fn new(
        source: impl Into<String>,
        dest: impl Into<String>,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            aggregation,
        }
    }
}

impl Command for CreateRule {
    fn name(&self) -> &'static str {
        "TS.CREATERULE"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::text(self.source.clone()),
            Value::text(self.dest.clone()),
            Value::text(KW_AGGREGATION),
            Value::text(self.aggregation.kind.as_str()),
            Value::Int(self.aggregation.bucket_millis()),
        ]
    }
}

/// TS.DELETERULE: remove the compaction link between two series
#[derive(Debug, Clone)]
pub struct DeleteRule {
    source: String,
    dest: String,
}

impl DeleteRule {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

impl Command for DeleteRule {
    fn name(&self) -> &'static str {
        "TS.DELETERULE"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::text(self.source.clone()),
            Value::text(self.dest.clone()),
        ]
    }
}
