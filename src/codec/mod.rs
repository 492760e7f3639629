//! Typed attribute values and their recursive wire representation.
//!
//! [`encode`] never fails: every [`Value`] maps to a [`WireValue`], except
//! [`Value::Null`] which maps to absence. [`decode`] flattens a wire value
//! back to text.
//!
//! Containers decode by plain concatenation: array elements and `key:value`
//! pairs are joined with no separator, so `["a", "b"]` and `["ab"]` decode
//! identically. Callers that need to tell them apart must inspect the
//! `WireValue` directly.

use std::collections::BTreeMap;
use std::fmt;

/// Generic typed value produced by the attribute evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Seq(Vec<Value>),
    /// Ordered key/value pairs; order is preserved on the wire.
    Map(Vec<(String, Value)>),
    /// Any other value, carried as its display string.
    Other(String),
}

impl Value {
    /// Wrap a value with no dedicated variant.
    pub fn other(value: impl fmt::Display) -> Self {
        Self::Other(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Recursive tagged wire value. Absence is modelled as `Option::None`.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    String(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    Array(Vec<Option<WireValue>>),
    KvList(Vec<KeyValue>),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<WireValue>,
}

/// Encode a typed value. `Null` yields `None`.
pub fn encode(value: &Value) -> Option<WireValue> {
    let wire = match value {
        Value::Null => return None,
        Value::String(s) => WireValue::String(s.clone()),
        Value::Bool(b) => WireValue::Bool(*b),
        Value::Int(i) => WireValue::Int(*i),
        Value::Float(f) => WireValue::Double(*f),
        Value::Seq(items) => WireValue::Array(items.iter().map(encode).collect()),
        Value::Map(entries) => WireValue::KvList(
            entries
                .iter()
                .map(|(key, value)| KeyValue {
                    key: key.clone(),
                    value: encode(value),
                })
                .collect(),
        ),
        Value::Other(s) => WireValue::Bytes(s.as_bytes().to_vec()),
    };
    Some(wire)
}

/// Flatten a wire value to text.
pub fn decode(value: &WireValue) -> String {
    let mut out = String::new();
    decode_into(value, &mut out);
    out
}

/// Like [`decode`], with absence decoding to the empty string.
pub fn decode_optional(value: Option<&WireValue>) -> String {
    value.map(decode).unwrap_or_default()
}

fn decode_into(value: &WireValue, out: &mut String) {
    match value {
        WireValue::String(s) => out.push_str(s),
        WireValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        WireValue::Int(i) => out.push_str(&i.to_string()),
        // Plain decimal, no exponent: 1.0 -> "1", 1e21 -> "1000000000000000000000".
        WireValue::Double(d) => out.push_str(&d.to_string()),
        WireValue::Array(items) => {
            for item in items.iter().flatten() {
                decode_into(item, out);
            }
        }
        WireValue::KvList(entries) => {
            for entry in entries {
                out.push_str(&entry.key);
                out.push(':');
                if let Some(value) = &entry.value {
                    decode_into(value, out);
                }
            }
        }
        WireValue::Bytes(bytes) => out.push_str(&String::from_utf8_lossy(bytes)),
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! int_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Self::Int(i64::from(i))
                }
            }
        )*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_from {
    ($($t:ty),*) => {
        $(
            // Values beyond i64 keep their decimal form instead of wrapping.
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    i64::try_from(i).map(Self::Int).unwrap_or_else(|_| Self::other(i))
                }
            }
        )*
    };
}

wide_int_from!(u64, usize, isize, i128, u128);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(map: BTreeMap<String, V>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64().filter(|_| !n.is_u64()) {
                    Self::Float(f)
                } else {
                    Self::other(n)
                }
            }
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::Seq(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
