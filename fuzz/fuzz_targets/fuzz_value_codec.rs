//! Fuzz target for the attribute value codec.
//!
//! Any JSON document converts to a `Value`, encodes, and decodes to text
//! without panicking, however deeply nested.

#![no_main]

use libfuzzer_sys::fuzz_target;
use gg_export::codec::{decode_optional, encode, Value};

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        let value = Value::from(json);
        let wire = encode(&value);
        let _ = decode_optional(wire.as_ref());
    }
});
