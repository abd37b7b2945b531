//! Parse metrics sinks.
//!
//! Counters are plain atomics bumped with relaxed ordering; there is no
//! exposition layer here. The connection layer registers a sink pair with
//! [`Parser::setup`](crate::parse::Parser::setup) and reads the counters
//! out of band.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the request parser.
#[derive(Debug, Default)]
pub struct RequestParseMetrics {
    /// Complete requests parsed.
    pub parse: AtomicU64,
    /// Requests rejected as invalid.
    pub parse_ex: AtomicU64,
}

/// Counters for the response parser.
#[derive(Debug, Default)]
pub struct ResponseParseMetrics {
    /// Complete responses parsed.
    pub parse: AtomicU64,
    /// Responses rejected as invalid.
    pub parse_ex: AtomicU64,
}

impl RequestParseMetrics {
    pub fn incr_parse(&self) {
        self.parse.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_parse_ex(&self) {
        self.parse_ex.fetch_add(1, Ordering::Relaxed);
    }
}

impl ResponseParseMetrics {
    pub fn incr_parse(&self) {
        self.parse.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_parse_ex(&self) {
        self.parse_ex.fetch_add(1, Ordering::Relaxed);
    }
}
