//! Wire value model
//!
//! The transport boundary exchanges loosely-typed values: scalars, nulls,
//! errors, and nested sequences. `Value` is a closed sum over those shapes,
//! so every coercion a decoder performs is an explicit branch on a variant
//! instead of runtime type inspection.
//!
//! Command builders only ever emit `Int`, `Float`, and `Text` arguments;
//! the remaining variants exist for replies.

/// One value on the wire, in either direction
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer reply or argument
    Int(i64),
    /// Floating-point argument, or a double reply
    Float(f64),
    /// Simple string reply or textual argument
    Text(String),
    /// Bulk string payload
    Bytes(Vec<u8>),
    /// True null reply
    Null,
    /// A typed "no value" placeholder some transports produce instead of a
    /// null (for example a nil byte-slice). Decoders treat it exactly like
    /// `Null`.
    Absent,
    /// Server error carried by a single reply element
    Error(String),
    /// Nested reply sequence
    Array(Vec<Value>),
}

impl Value {
    /// Shorthand for a textual value
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// True for both null representations
    pub fn is_no_value(&self) -> bool {
        matches!(self, Value::Null | Value::Absent)
    }

    /// Integer view, accepting a native integer or its decimal string form
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float view, accepting a native float, an integer, or a string form
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text view over simple strings and UTF-8 bulk payloads
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
            _ => None,
        }
    }

    /// Borrowed view of a nested sequence
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Variant name used in decode error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Null => "null",
            Value::Absent => "absent",
            Value::Error(_) => "error",
            Value::Array(_) => "array",
        }
    }
}
