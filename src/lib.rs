//! # Tidemark
//!
//! Typed client for RedisTimeSeries, the `TS.*` command family of the Redis
//! time-series module.
//!
//! Every operation is expressed as a typed call. The crate deterministically
//! encodes each call into the ordered argument sequence the server grammar
//! requires, and decodes the loosely-typed reply back into a typed result.
//! The network itself stays behind the [`Transport`] trait, so the client
//! works with whatever Redis connection layer an application already uses;
//! an adapter for the `redis` crate ships behind the `redis-transport`
//! feature.
//!
//! ## Features
//!
//! - **Canonical encoding**: option order on the wire follows the server
//!   schema, never the call-site order, so output is reproducible
//! - **Tolerant decoding**: optional reply fields may be missing and
//!   numbers may arrive as strings; both decode cleanly
//! - **Partial batch results**: `madd` reports success or failure per
//!   sample instead of failing the whole call
//! - **No connection policy**: pooling, retries, and timeouts belong to the
//!   transport; the client forwards cancellation by construction
//!
//! ## Modules
//!
//! - [`types`]: shared vocabulary (encodings, policies, filters, labels)
//! - [`command`]: one builder per server operation
//! - [`reply`]: decoders and the typed result shapes
//! - [`transport`]: the boundary trait implementations plug into
//! - [`client`]: the [`TsClient`] facade
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tidemark::{
//!     AddOptions, CreateOptions, Filter, MRangeOptions, Sample, Timestamp, TsClient,
//! };
//! # use async_trait::async_trait;
//! # use tidemark::{Transport, TransportError, Value};
//! # struct MyTransport;
//! # #[async_trait]
//! # impl Transport for MyTransport {
//! #     async fn call(&self, _: &str, _: Vec<Value>) -> Result<Value, TransportError> {
//! #         Ok(Value::Null)
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Any Transport implementation works here; see the redis-transport
//!     // feature for a ready-made adapter.
//!     let client = TsClient::new(MyTransport);
//!
//!     client
//!         .create(
//!             "temp:3:11",
//!             CreateOptions::new()
//!                 .retention(Duration::from_secs(60 * 60 * 24))
//!                 .label("sensor_id", "2"),
//!         )
//!         .await?;
//!
//!     client
//!         .add(
//!             Sample::new("temp:3:11", Timestamp::Auto, 27.5),
//!             AddOptions::new(),
//!         )
//!         .await?;
//!
//!     let series = client
//!         .mrange(
//!             Timestamp::Earliest,
//!             Timestamp::Latest,
//!             vec![Filter::equal("sensor_id", ["2"])],
//!             MRangeOptions::new().with_labels(),
//!         )
//!         .await?;
//!     println!("matched {} series", series.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod command;
pub mod reply;
pub mod transport;
pub mod types;
pub mod wire;

#[cfg(feature = "redis-transport")]
pub mod redis_transport;

// Re-export top-level types for convenience
pub use client::{TsClient, TsError, TsResult};

pub use command::{
    AddOptions, AlterOptions, Command, CounterOptions, CreateOptions, InfoOptions, LabelSelection,
    MGetOptions, MRangeOptions, RangeOptions,
};

pub use reply::{
    ChunkInfo, DataPoint, DecodeError, LastSample, Rule, SampleOutcome, SeriesInfo, TimeSeries,
};

pub use transport::{Transport, TransportError};

pub use types::{
    Aggregation, AggregationType, DuplicatePolicy, Encoding, Filter, GroupBy, InvalidTag, Label,
    ReducerType, Sample, Timestamp,
};

pub use wire::Value;

#[cfg(feature = "redis-transport")]
pub use redis_transport::RedisTransport;
