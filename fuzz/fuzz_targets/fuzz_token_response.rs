//! Fuzz target for token endpoint response parsing.
//!
//! Arbitrary response bodies must yield a grant or a `TokenError`, never a
//! panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use gg_export::auth::parse_token_response;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = std::str::from_utf8(data) {
        if let Ok(grant) = parse_token_response(body) {
            // Lifetimes near the i64 edges must not overflow the expiry.
            let _ = 0i64.saturating_add(grant.expires_in.unwrap_or(0));
        }
    }
});
