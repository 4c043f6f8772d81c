//! Read commands: TS.RANGE, TS.REVRANGE, TS.MRANGE, TS.MREVRANGE, TS.GET,
//! TS.MGET, TS.INFO, TS.QUERYINDEX

use chrono::{DateTime, Utc};

use crate::types::{Aggregation, AggregationType, Filter, GroupBy, ReducerType, Timestamp};
use crate::wire::Value;

use super::{
    Command, KW_AGGREGATION, KW_ALIGN, KW_COUNT, KW_DEBUG, KW_FILTER, KW_FILTER_BY_TS,
    KW_FILTER_BY_VALUE, KW_GROUPBY, KW_REDUCE, KW_SELECTED_LABELS, KW_WITHLABELS,
};

/// Which labels a multi-series reply should carry
///
/// Requesting all labels and requesting a named subset are different wire
/// shapes. An explicitly empty subset is not a valid request; the client
/// rejects it before anything reaches the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelSelection {
    /// Bare `WITHLABELS` flag: return every label of each series
    All,
    /// `SELECTED_LABELS` followed by the named labels
    Selected(Vec<String>),
}

impl LabelSelection {
    /// Select a named subset of labels
    pub fn selected<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelSelection::Selected(labels.into_iter().map(Into::into).collect())
    }

    pub(crate) fn is_empty_selection(&self) -> bool {
        matches!(self, LabelSelection::Selected(labels) if labels.is_empty())
    }

    fn push_args(&self, args: &mut Vec<Value>) {
        match self {
            LabelSelection::All => args.push(Value::text(KW_WITHLABELS)),
            LabelSelection::Selected(labels) => {
                args.push(Value::text(KW_SELECTED_LABELS));
                for label in labels {
                    args.push(Value::text(label.clone()));
                }
            }
        }
    }
}

// The five window options shared by single- and multi-series range queries,
// in their common schema order.
#[derive(Debug, Clone, Default, PartialEq)]
struct WindowOptions {
    filter_by_ts: Vec<DateTime<Utc>>,
    filter_by_value: Option<(f64, f64)>,
    count: Option<i64>,
    align: Option<Timestamp>,
    aggregation: Option<Aggregation>,
}

impl WindowOptions {
    fn push_filters(&self, args: &mut Vec<Value>) {
        if !self.filter_by_ts.is_empty() {
            args.push(Value::text(KW_FILTER_BY_TS));
            for at in &self.filter_by_ts {
                args.push(Value::Int(at.timestamp_millis()));
            }
        }
        if let Some((min, max)) = self.filter_by_value {
            args.push(Value::text(KW_FILTER_BY_VALUE));
            args.push(Value::Float(min));
            args.push(Value::Float(max));
        }
    }

    fn push_shaping(&self, args: &mut Vec<Value>) {
        if let Some(count) = self.count {
            args.push(Value::text(KW_COUNT));
            args.push(Value::Int(count));
        }
        if let Some(align) = self.align {
            args.push(Value::text(KW_ALIGN));
            args.push(align.to_arg());
        }
        if let Some(aggregation) = self.aggregation {
            args.push(Value::text(KW_AGGREGATION));
            args.push(Value::text(aggregation.kind.as_str()));
            args.push(Value::Int(aggregation.bucket_millis()));
        }
    }
}

/// Optional settings for [`Range`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeOptions {
    window: WindowOptions,
}

impl RangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only samples at exactly these instants
    pub fn filter_by_ts<I>(mut self, instants: I) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        self.window.filter_by_ts = instants.into_iter().collect();
        self
    }

    /// Keep only samples whose value lies in `[min, max]`
    pub fn filter_by_value(mut self, min: f64, max: f64) -> Self {
        self.window.filter_by_value = Some((min, max));
        self
    }

    /// Maximum number of returned samples
    pub fn count(mut self, count: i64) -> Self {
        self.window.count = Some(count);
        self
    }

    /// Bucket alignment for aggregated queries
    pub fn align(mut self, align: impl Into<Timestamp>) -> Self {
        self.window.align = Some(align.into());
        self
    }

    /// Aggregate samples into fixed-width buckets
    pub fn aggregation(mut self, kind: AggregationType, bucket: std::time::Duration) -> Self {
        self.window.aggregation = Some(Aggregation::new(kind, bucket));
        self
    }
}

/// TS.RANGE / TS.REVRANGE: query one series over a window
#[derive(Debug, Clone)]
pub struct Range {
    name: &'static str,
    key: String,
    from: Timestamp,
    to: Timestamp,
    options: RangeOptions,
}

impl Range {
    /// Query in forward direction
    pub fn forward(
        key: impl Into<String>,
        from: impl Into<Timestamp>,
        to: impl Into<Timestamp>,
        options: RangeOptions,
    ) -> Self {
        Self {
            name: "TS.RANGE",
            key: key.into(),
            from: from.into(),
            to: to.into(),
            options,
        }
    }

    /// Query in reverse direction
    pub fn reverse(
        key: impl Into<String>,
        from: impl Into<Timestamp>,
        to: impl Into<Timestamp>,
        options: RangeOptions,
    ) -> Self {
        Self {
            name: "TS.REVRANGE",
            key: key.into(),
            from: from.into(),
            to: to.into(),
            options,
        }
    }
}

impl Command for Range {
    fn name(&self) -> &'static str {
        self.name
    }

    fn args(&self) -> Vec<Value> {
        let mut args = vec![
            Value::text(self.key.clone()),
            self.from.to_arg(),
            self.to.to_arg(),
        ];
        self.options.window.push_filters(&mut args);
        self.options.window.push_shaping(&mut args);
        args
    }
}

/// Optional settings for [`MRange`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MRangeOptions {
    window: WindowOptions,
    labels: Option<LabelSelection>,
    group_by: Option<GroupBy>,
}

impl MRangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only samples at exactly these instants
    pub fn filter_by_ts<I>(mut self, instants: I) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        self.window.filter_by_ts = instants.into_iter().collect();
        self
    }

    /// Keep only samples whose value lies in `[min, max]`
    pub fn filter_by_value(mut self, min: f64, max: f64) -> Self {
        self.window.filter_by_value = Some((min, max));
        self
    }

    /// Return every label of each matched series
    pub fn with_labels(mut self) -> Self {
        self.labels = Some(LabelSelection::All);
        self
    }

    /// Return only the named labels of each matched series
    pub fn selected_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(LabelSelection::selected(labels));
        self
    }

    /// Maximum number of returned samples per series
    pub fn count(mut self, count: i64) -> Self {
        self.window.count = Some(count);
        self
    }

    /// Bucket alignment for aggregated queries
    pub fn align(mut self, align: impl Into<Timestamp>) -> Self {
        self.window.align = Some(align.into());
        self
    }

    /// Aggregate samples into fixed-width buckets
    pub fn aggregation(mut self, kind: AggregationType, bucket: std::time::Duration) -> Self {
        self.window.aggregation = Some(Aggregation::new(kind, bucket));
        self
    }

    /// Merge matched series per label value through a reducer
    pub fn group_by(mut self, label: impl Into<String>, reducer: ReducerType) -> Self {
        self.group_by = Some(GroupBy::new(label, reducer));
        self
    }

    pub(crate) fn label_selection(&self) -> Option<&LabelSelection> {
        self.labels.as_ref()
    }
}

/// TS.MRANGE / TS.MREVRANGE: query every series matching a filter list
#[derive(Debug, Clone)]
pub struct MRange {
    name: &'static str,
    from: Timestamp,
    to: Timestamp,
    filters: Vec<Filter>,
    options: MRangeOptions,
}

impl MRange {
    /// Query in forward direction
    pub fn forward(
        from: impl Into<Timestamp>,
        to: impl Into<Timestamp>,
        filters: Vec<Filter>,
        options: MRangeOptions,
    ) -> Self {
        Self {
            name: "TS.MRANGE",
            from: from.into(),
            to: to.into(),
            filters,
            options,
        }
    }

    /// Query in reverse direction
    pub fn reverse(
        from: impl Into<Timestamp>,
        to: impl Into<Timestamp>,
        filters: Vec<Filter>,
        options: MRangeOptions,
    ) -> Self {
        Self {
            name: "TS.MREVRANGE",
            from: from.into(),
            to: to.into(),
            filters,
            options,
        }
    }
}

impl Command for MRange {
    fn name(&self) -> &'static str {
        self.name
    }

    fn args(&self) -> Vec<Value> {
        let mut args = vec![self.from.to_arg(), self.to.to_arg()];
        self.options.window.push_filters(&mut args);
        if let Some(selection) = &self.options.labels {
            selection.push_args(&mut args);
        }
        self.options.window.push_shaping(&mut args);
        args.push(Value::text(KW_FILTER));
        for filter in &self.filters {
            args.push(Value::text(filter.render()));
        }
        if let Some(group_by) = &self.options.group_by {
            args.push(Value::text(KW_GROUPBY));
            args.push(Value::text(group_by.label.clone()));
            args.push(Value::text(KW_REDUCE));
            args.push(Value::text(group_by.reducer.as_str()));
        }
        args
    }
}

/// TS.GET: fetch the last sample of one series
#[derive(Debug, Clone)]
pub struct Get {
    key: String,
}

impl Get {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Command for Get {
    fn name(&self) -> &'static str {
        "TS.GET"
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::text(self.key.clone())]
    }
}

/// Optional settings for [`MGet`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MGetOptions {
    labels: Option<LabelSelection>,
}

impl MGetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return every label of each matched series
    pub fn with_labels(mut self) -> Self {
        self.labels = Some(LabelSelection::All);
        self
    }

    /// Return only the named labels of each matched series
    pub fn selected_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(LabelSelection::selected(labels));
        self
    }

    pub(crate) fn label_selection(&self) -> Option<&LabelSelection> {
        self.labels.as_ref()
    }
}

/// TS.MGET: fetch the last sample of every series matching a filter list
#[derive(Debug, Clone)]
pub struct MGet {
    filters: Vec<Filter>,
    options: MGetOptions,
}

impl MGet {
    pub fn new(filters: Vec<Filter>, options: MGetOptions) -> Self {
        Self { filters, options }
    }
}

impl Command for MGet {
    fn name(&self) -> &'static str {
        "TS.MGET"
    }

    fn args(&self) -> Vec<Value> {
        let mut args = Vec::new();
        if let Some(selection) = &self.options.labels {
            selection.push_args(&mut args);
        }
        args.push(Value::text(KW_FILTER));
        for filter in &self.filters {
            args.push(Value::text(filter.render()));
        }
        args
    }
}

/// Optional settings for [`Info`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfoOptions {
    debug: bool,
}

impl InfoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request per-chunk diagnostic detail
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

/// TS.INFO: statistics and configuration of one series
#[derive(Debug, Clone)]
pub struct Info {
    key: String,
    options: InfoOptions,
}

impl Info {
    pub fn new(key: impl Into<String>, options: InfoOptions) -> Self {
        Self {
            key: key.into(),
            options,
        }
    }
}

impl Command for Info {
    fn name(&self) -> &'static str {
        "TS.INFO"
    }

    fn args(&self) -> Vec<Value> {
        let mut args = vec![Value::text(self.key.clone())];
        if self.options.debug {
            args.push(Value::text(KW_DEBUG));
        }
        args
    }
}

/// TS.QUERYINDEX: list the keys matching a filter list
///
/// The filters are the whole argument sequence; there is no keyword.
#[derive(Debug, Clone)]
pub struct QueryIndex {
    filters: Vec<Filter>,
}

impl QueryIndex {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}

impl Command for QueryIndex {
    fn name(&self) -> &'static str {
        "TS.QUERYINDEX"
    }

    fn args(&self) -> Vec<Value> {
        self.filters
            .iter()
            .map(|f| Value::text(f.render()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn rendered(args: &[Value]) -> Vec<String> {
        args.iter()
            .map(|a| match a {
                Value::Text(s) => s.clone(),
                Value::Int(n) => n.to_string(),
                Value::Float(f) => f.to_string(),
                other => panic!("unexpected arg {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_range_positional_and_sentinels() {
        let cmd = Range::forward("temp:3:11", Timestamp::Earliest, Timestamp::Latest, RangeOptions::new());
        assert_eq!(cmd.name(), "TS.RANGE");
        assert_eq!(
            cmd.args(),
            vec![Value::text("temp:3:11"), Value::text("-"), Value::text("+")]
        );
    }

    #[test]
    fn test_range_full_schema_order() {
        let t1 = DateTime::from_timestamp_millis(10).unwrap();
        let t2 = DateTime::from_timestamp_millis(20).unwrap();
        let options = RangeOptions::new()
            .aggregation(AggregationType::Avg, Duration::from_secs(5))
            .align(Timestamp::Earliest)
            .count(10)
            .filter_by_value(-1.0, 1.0)
            .filter_by_ts([t1, t2]);
        let cmd = Range::reverse("k", Timestamp::Earliest, Timestamp::Latest, options);
        assert_eq!(cmd.name(), "TS.REVRANGE");
        assert_eq!(
            rendered(&cmd.args()),
            vec![
                "k", "-", "+", "FILTER_BY_TS", "10", "20", "FILTER_BY_VALUE", "-1", "1", "COUNT",
                "10", "ALIGN", "-", "AGGREGATION", "AVG", "5000",
            ]
        );
    }

    #[test]
    fn test_range_order_independent_of_application_order() {
        let a = RangeOptions::new()
            .count(5)
            .filter_by_value(0.0, 9.0)
            .aggregation(AggregationType::Max, Duration::from_secs(1));
        let b = RangeOptions::new()
            .aggregation(AggregationType::Max, Duration::from_secs(1))
            .filter_by_value(0.0, 9.0)
            .count(5);
        assert_eq!(
            Range::forward("k", Timestamp::Earliest, Timestamp::Latest, a).args(),
            Range::forward("k", Timestamp::Earliest, Timestamp::Latest, b).args()
        );
    }

    #[test]
    fn test_mrange_filter_always_present() {
        let cmd = MRange::forward(
            Timestamp::Earliest,
            Timestamp::Latest,
            vec![Filter::equal("sensor_id", ["2"])],
            MRangeOptions::new(),
        );
        assert_eq!(cmd.name(), "TS.MRANGE");
        assert_eq!(
            rendered(&cmd.args()),
            vec!["-", "+", "FILTER", "sensor_id=2"]
        );
    }

    #[test]
    fn test_mrange_full_schema_order() {
        let options = MRangeOptions::new()
            .group_by("region", ReducerType::Max)
            .aggregation(AggregationType::Sum, Duration::from_secs(60))
            .count(2)
            .with_labels()
            .filter_by_value(0.0, 100.0);
        let cmd = MRange::reverse(
            Timestamp::Earliest,
            Timestamp::Latest,
            vec![Filter::equal("region", std::iter::empty::<&str>())],
            options,
        );
        assert_eq!(cmd.name(), "TS.MREVRANGE");
        assert_eq!(
            rendered(&cmd.args()),
            vec![
                "-", "+", "FILTER_BY_VALUE", "0", "100", "WITHLABELS", "COUNT", "2",
                "AGGREGATION", "SUM", "60000", "FILTER", "region=", "GROUPBY", "region",
                "REDUCE", "MAX",
            ]
        );
    }

    #[test]
    fn test_mrange_selected_labels_shape() {
        let options = MRangeOptions::new().selected_labels(["unit", "region"]);
        let cmd = MRange::forward(
            Timestamp::Earliest,
            Timestamp::Latest,
            vec![Filter::not_equal("unit", ["f"])],
            options,
        );
        assert_eq!(
            rendered(&cmd.args()),
            vec!["-", "+", "SELECTED_LABELS", "unit", "region", "FILTER", "unit!=f"]
        );
    }

    #[test]
    fn test_mget_shapes() {
        let cmd = MGet::new(vec![Filter::equal("l", ["v"])], MGetOptions::new());
        assert_eq!(cmd.name(), "TS.MGET");
        assert_eq!(rendered(&cmd.args()), vec!["FILTER", "l=v"]);

        let cmd = MGet::new(
            vec![Filter::equal("l", ["v"])],
            MGetOptions::new().with_labels(),
        );
        assert_eq!(rendered(&cmd.args()), vec!["WITHLABELS", "FILTER", "l=v"]);
    }

    #[test]
    fn test_info_debug_flag() {
        let cmd = Info::new("k", InfoOptions::new());
        assert_eq!(cmd.args(), vec![Value::text("k")]);

        let cmd = Info::new("k", InfoOptions::new().debug());
        assert_eq!(cmd.args(), vec![Value::text("k"), Value::text("DEBUG")]);
    }

    #[test]
    fn test_query_index_has_no_keyword() {
        let cmd = QueryIndex::new(vec![
            Filter::equal("l", ["v"]),
            Filter::not_equal("other", std::iter::empty::<&str>()),
        ]);
        assert_eq!(cmd.name(), "TS.QUERYINDEX");
        assert_eq!(rendered(&cmd.args()), vec!["l=v", "other!="]);
    }

    #[test]
    fn test_empty_selected_labels_detected() {
        assert!(LabelSelection::selected(std::iter::empty::<&str>()).is_empty_selection());
        assert!(!LabelSelection::All.is_empty_selection());
        assert!(!LabelSelection::selected(["a"]).is_empty_selection());
    }
}
