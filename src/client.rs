//! Client facade
//!
//! `TsClient` is the public entry point: one async method per server
//! operation. Each method builds the typed command, hands it to the
//! transport, and decodes the reply. The facade holds nothing but the
//! transport, so a single client is safe to share across tasks.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::command::{
    Add, AddOptions, Alter, AlterOptions, Command, Counter, CounterOptions, Create, CreateOptions,
    CreateRule, Del, DeleteRule, Get, Info, InfoOptions, LabelSelection, MGet, MGetOptions,
    MRange, MRangeOptions, Madd, QueryIndex, Range, RangeOptions,
};
use crate::reply::{
    decode_datapoints, decode_keys, decode_last_samples, decode_maybe_datapoint, decode_outcomes,
    decode_series_info, decode_series_list, decode_timestamp, DataPoint, DecodeError, LastSample,
    SampleOutcome, SeriesInfo, TimeSeries,
};
use crate::transport::{Transport, TransportError};
use crate::types::{Aggregation, Filter, Sample, Timestamp};
use crate::wire::Value;

/// Errors surfaced by [`TsClient`]
#[derive(Debug, Error)]
pub enum TsError {
    /// Transport failure, passed through unmodified
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server rejected the whole command
    #[error("server error: {0}")]
    Server(String),

    /// The reply did not match the documented shape for the command
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The call was malformed and never reached the transport
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Result type for client operations
pub type TsResult<T> = Result<T, TsError>;

/// Typed time-series client over a pluggable transport
#[derive(Debug, Clone)]
pub struct TsClient<T> {
    transport: T,
}

impl<T: Transport> TsClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn dispatch(&self, command: impl Command + Send) -> TsResult<Value> {
        let name = command.name();
        let args = command.args();
        tracing::debug!(command = name, arg_count = args.len(), "dispatching command");
        let reply = self.transport.call(name, args).await?;
        match reply {
            Value::Error(message) => Err(TsError::Server(message)),
            other => Ok(other),
        }
    }

    fn check_selection(selection: Option<&LabelSelection>) -> TsResult<()> {
        if selection.is_some_and(LabelSelection::is_empty_selection) {
            return Err(TsError::InvalidCommand(
                "SELECTED_LABELS requires at least one label name".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a new series
    pub async fn create(&self, key: &str, options: CreateOptions) -> TsResult<()> {
        self.dispatch(Create::new(key, options)).await?;
        Ok(())
    }

    /// Update retention, chunk size, duplicate policy, or labels of a series
    pub async fn alter(&self, key: &str, options: AlterOptions) -> TsResult<()> {
        self.dispatch(Alter::new(key, options)).await?;
        Ok(())
    }

    /// Append one sample; returns the timestamp the server stored
    pub async fn add(&self, sample: Sample, options: AddOptions) -> TsResult<DateTime<Utc>> {
        let reply = self.dispatch(Add::new(sample, options)).await?;
        Ok(decode_timestamp(&reply)?)
    }

    /// Append samples to several series in one call
    ///
    /// Samples succeed or fail individually; the call itself only fails when
    /// the transport does.
    pub async fn madd(&self, samples: Vec<Sample>) -> TsResult<Vec<SampleOutcome>> {
        let reply = self.dispatch(Madd::new(samples)).await?;
        Ok(decode_outcomes(&reply)?)
    }

    /// Write a sample `value` above the latest one
    pub async fn incr_by(
        &self,
        key: &str,
        value: f64,
        options: CounterOptions,
    ) -> TsResult<DateTime<Utc>> {
        let reply = self.dispatch(Counter::increment(key, value, options)).await?;
        Ok(decode_timestamp(&reply)?)
    }

    /// Write a sample `value` below the latest one
    pub async fn decr_by(
        &self,
        key: &str,
        value: f64,
        options: CounterOptions,
    ) -> TsResult<DateTime<Utc>> {
        let reply = self.dispatch(Counter::decrement(key, value, options)).await?;
        Ok(decode_timestamp(&reply)?)
    }

    /// Delete samples between two instants; returns how many were removed
    pub async fn del(
        &self,
        key: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TsResult<i64> {
        let reply = self.dispatch(Del::new(key, from, to)).await?;
        reply.as_int().ok_or_else(|| {
            TsError::Decode(DecodeError::Number(format!(
                "deleted count is {}",
                reply.kind()
            )))
        })
    }

    /// Create a compaction rule from `source` into `dest`
    pub async fn create_rule(
        &self,
        source: &str,
        dest: &str,
        aggregation: Aggregation,
    ) -> TsResult<()> {
        self.dispatch(CreateRule::new(source, dest, aggregation))
            .await?;
        Ok(())
    }

    /// Remove the compaction rule between `source` and `dest`
    pub async fn delete_rule(&self, source: &str, dest: &str) -> TsResult<()> {
        self.dispatch(DeleteRule::new(source, dest)).await?;
        Ok(())
    }

    /// Query one series over a window, oldest sample first
    pub async fn range(
        &self,
        key: &str,
        from: impl Into<Timestamp>,
        to: impl Into<Timestamp>,
        options: RangeOptions,
    ) -> TsResult<Vec<DataPoint>> {
        let reply = self
            .dispatch(Range::forward(key, from.into(), to.into(), options))
            .await?;
        Ok(decode_datapoints(&reply)?)
    }

    /// Query one series over a window, newest sample first
    pub async fn rev_range(
        &self,
        key: &str,
        from: impl Into<Timestamp>,
        to: impl Into<Timestamp>,
        options: RangeOptions,
    ) -> TsResult<Vec<DataPoint>> {
        let reply = self
            .dispatch(Range::reverse(key, from.into(), to.into(), options))
            .await?;
        Ok(decode_datapoints(&reply)?)
    }

    /// Query every series matching `filters`, oldest samples first
    pub async fn mrange(
        &self,
        from: impl Into<Timestamp>,
        to: impl Into<Timestamp>,
        filters: Vec<Filter>,
        options: MRangeOptions,
    ) -> TsResult<Vec<TimeSeries>> {
        Self::check_selection(options.label_selection())?;
        let reply = self
            .dispatch(MRange::forward(from.into(), to.into(), filters, options))
            .await?;
        Ok(decode_series_list(&reply)?)
    }

    /// Query every series matching `filters`, newest samples first
    pub async fn mrev_range(
        &self,
        from: impl Into<Timestamp>,
        to: impl Into<Timestamp>,
        filters: Vec<Filter>,
        options: MRangeOptions,
    ) -> TsResult<Vec<TimeSeries>> {
        Self::check_selection(options.label_selection())?;
        let reply = self
            .dispatch(MRange::reverse(from.into(), to.into(), filters, options))
            .await?;
        Ok(decode_series_list(&reply)?)
    }

    /// Fetch the last sample of a series
    ///
    /// A series holding no samples yields `Ok(None)`.
    pub async fn get(&self, key: &str) -> TsResult<Option<DataPoint>> {
        let reply = self.dispatch(Get::new(key)).await?;
        Ok(decode_maybe_datapoint(&reply)?)
    }

    /// Fetch the last sample of every series matching `filters`
    pub async fn mget(
        &self,
        filters: Vec<Filter>,
        options: MGetOptions,
    ) -> TsResult<Vec<LastSample>> {
        Self::check_selection(options.label_selection())?;
        let reply = self.dispatch(MGet::new(filters, options)).await?;
        Ok(decode_last_samples(&reply)?)
    }

    /// Statistics and configuration of one series
    pub async fn info(&self, key: &str, options: InfoOptions) -> TsResult<SeriesInfo> {
        let reply = self.dispatch(Info::new(key, options)).await?;
        Ok(decode_series_info(&reply)?)
    }

    /// List the keys of every series matching `filters`
    pub async fn query_index(&self, filters: Vec<Filter>) -> TsResult<Vec<String>> {
        let reply = self.dispatch(QueryIndex::new(filters)).await?;
        Ok(decode_keys(&reply)?)
    }
}
