//! Command builders
//!
//! One builder per server operation. Each holds the operation's required
//! parameters plus an options record of independently-applicable settings,
//! and serializes into the command name and its ordered argument sequence.
//!
//! ## Ordering contract
//!
//! The argument order emitted by [`Command::args`] follows the fixed
//! per-command schema of the server grammar, never the order in which option
//! setters were applied. Serialization is a pure function of the option
//! record, so any application order of the same settings produces identical
//! output.

mod create;
mod read;
mod rules;
mod write;

pub use create::{Alter, AlterOptions, Create, CreateOptions};
pub use read::{
    Get, Info, InfoOptions, LabelSelection, MGet, MGetOptions, MRange, MRangeOptions, QueryIndex,
    Range, RangeOptions,
};
pub use rules::{CreateRule, DeleteRule};
pub use write::{Add, AddOptions, Counter, CounterOptions, Del, Madd};

use std::collections::BTreeMap;
use std::time::Duration;

use crate::wire::Value;

/// A fully-parameterized command ready to be sent
pub trait Command {
    /// Wire name of the command, e.g. `TS.CREATE`
    fn name(&self) -> &'static str;

    /// Ordered argument sequence in the server's canonical schema order
    fn args(&self) -> Vec<Value>;
}

// Option keywords, exactly as the server grammar spells them.
pub(crate) const KW_AGGREGATION: &str = "AGGREGATION";
pub(crate) const KW_ALIGN: &str = "ALIGN";
pub(crate) const KW_CHUNK_SIZE: &str = "CHUNK_SIZE";
pub(crate) const KW_COUNT: &str = "COUNT";
pub(crate) const KW_DEBUG: &str = "DEBUG";
// DUPLICATE_POLICY configures a series at create/alter time; ON_DUPLICATE
// overrides the policy for a single TS.ADD. The server treats them as
// different options, so they stay separate constants here.
pub(crate) const KW_DUPLICATE_POLICY: &str = "DUPLICATE_POLICY";
pub(crate) const KW_ON_DUPLICATE: &str = "ON_DUPLICATE";
pub(crate) const KW_ENCODING: &str = "ENCODING";
pub(crate) const KW_FILTER: &str = "FILTER";
pub(crate) const KW_FILTER_BY_TS: &str = "FILTER_BY_TS";
pub(crate) const KW_FILTER_BY_VALUE: &str = "FILTER_BY_VALUE";
pub(crate) const KW_GROUPBY: &str = "GROUPBY";
pub(crate) const KW_LABELS: &str = "LABELS";
pub(crate) const KW_REDUCE: &str = "REDUCE";
pub(crate) const KW_RETENTION: &str = "RETENTION";
pub(crate) const KW_SELECTED_LABELS: &str = "SELECTED_LABELS";
pub(crate) const KW_TIMESTAMP: &str = "TIMESTAMP";
pub(crate) const KW_UNCOMPRESSED: &str = "UNCOMPRESSED";
pub(crate) const KW_WITHLABELS: &str = "WITHLABELS";

pub(crate) fn duration_millis(d: Duration) -> i64 {
    d.as_millis() as i64
}

/// Emit `LABELS name value ...` with keys in lexicographic order
///
/// The map is a `BTreeMap`, so the canonical key order holds by
/// construction. An empty map emits nothing.
pub(crate) fn push_labels(args: &mut Vec<Value>, labels: &BTreeMap<String, String>) {
    if labels.is_empty() {
        return;
    }
    args.push(Value::text(KW_LABELS));
    for (name, value) in labels {
        args.push(Value::text(name.clone()));
        args.push(Value::text(value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_encode_sorted_flat() {
        let mut labels = BTreeMap::new();
        labels.insert("b".to_string(), "2".to_string());
        labels.insert("a".to_string(), "1".to_string());

        let mut args = Vec::new();
        push_labels(&mut args, &labels);
        assert_eq!(
            args,
            vec![
                Value::text("LABELS"),
                Value::text("a"),
                Value::text("1"),
                Value::text("b"),
                Value::text("2"),
            ]
        );
    }

    #[test]
    fn test_empty_labels_emit_nothing() {
        let mut args = Vec::new();
        push_labels(&mut args, &BTreeMap::new());
        assert!(args.is_empty());
    }

    #[test]
    fn test_duration_millis() {
        assert_eq!(duration_millis(Duration::from_secs(3600)), 3_600_000);
        assert_eq!(duration_millis(Duration::ZERO), 0);
    }
}
