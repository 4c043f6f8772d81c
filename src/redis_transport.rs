//! Transport adapter for the `redis` crate
//!
//! A thin bridge: arguments are forwarded to a multiplexed async
//! connection, and `redis::Value` replies are normalized into the crate's
//! wire value model. Server errors attached to individual reply elements
//! become [`Value::Error`] so batch replies keep their per-element
//! outcomes. RESP3 maps are flattened into the alternating key/value shape
//! the decoders expect.

use async_trait::async_trait;

use crate::transport::{Transport, TransportError};
use crate::wire::Value;

/// [`Transport`] backed by a multiplexed `redis` crate connection
///
/// The connection handle is cheap to clone; one adapter can serve many
/// concurrent callers.
#[derive(Clone)]
pub struct RedisTransport {
    connection: redis::aio::MultiplexedConnection,
}

impl RedisTransport {
    /// Connect to a server URL such as `redis://127.0.0.1:6379`
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let client = redis::Client::open(url)
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Self { connection })
    }

    /// Wrap an already-established connection
    pub fn new(connection: redis::aio::MultiplexedConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl Transport for RedisTransport {
    async fn call(&self, command: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        let mut cmd = redis::cmd(command);
        for arg in &args {
            append_arg(&mut cmd, arg)?;
        }
        let mut connection = self.connection.clone();
        let reply: redis::Value = cmd
            .query_async(&mut connection)
            .await
            .map_err(TransportError::other)?;
        Ok(from_redis_value(reply))
    }
}

fn append_arg(cmd: &mut redis::Cmd, arg: &Value) -> Result<(), TransportError> {
    match arg {
        Value::Int(n) => {
            cmd.arg(*n);
        }
        Value::Float(f) => {
            cmd.arg(*f);
        }
        Value::Text(s) => {
            cmd.arg(s.as_str());
        }
        Value::Bytes(b) => {
            cmd.arg(&b[..]);
        }
        other => {
            return Err(TransportError::Connection(format!(
                "{} is not a valid argument value",
                other.kind()
            )));
        }
    }
    Ok(())
}

fn from_redis_value(value: redis::Value) -> Value {
    use redis::Value as Redis;
    match value {
        Redis::Nil => Value::Null,
        Redis::Int(n) => Value::Int(n),
        Redis::Double(f) => Value::Float(f),
        Redis::Boolean(b) => Value::Int(i64::from(b)),
        Redis::BulkString(bytes) => Value::Bytes(bytes),
        Redis::SimpleString(text) => Value::Text(text),
        Redis::Okay => Value::text("OK"),
        Redis::VerbatimString { text, .. } => Value::Text(text),
        Redis::BigNumber(n) => Value::Text(n.to_string()),
        Redis::Array(items) => Value::Array(items.into_iter().map(from_redis_value).collect()),
        Redis::Set(items) => Value::Array(items.into_iter().map(from_redis_value).collect()),
        Redis::Map(pairs) => {
            let mut flat = Vec::with_capacity(pairs.len() * 2);
            for (key, value) in pairs {
                flat.push(from_redis_value(key));
                flat.push(from_redis_value(value));
            }
            Value::Array(flat)
        }
        Redis::Attribute { data, .. } => from_redis_value(*data),
        Redis::ServerError(err) => Value::Error(redis::RedisError::from(err).to_string()),
        _ => Value::Absent,
    }
}
