//! cache-wire: RESP wire-protocol layer for a cache server front-end.
//!
//! Turns raw bytes from a connection buffer into structured, validated
//! request/response messages in the REdis Serialization Protocol, including
//! its attribute-map extension. The layer is purely in-memory and
//! synchronous: it performs no I/O and keeps no state across calls. On
//! partial input the buffer cursor is restored and the caller retries once
//! more bytes arrive.
//!
//! Layout:
//! - [`buffer`]: read buffer with a restorable cursor
//! - [`token`]: element tokenizer and lookahead classifiers
//! - [`command`]: static verb → arity-bounds table
//! - [`request`] / [`response`]: message structs with atomic reset
//! - [`parse`]: message-level request/response parsers
//! - [`metrics`]: per-outcome parse counters
//! - [`config`]: token-capacity configuration

pub mod buffer;
pub mod command;
pub mod config;
pub mod metrics;
pub mod parse;
pub mod request;
pub mod response;
pub mod token;

pub use buffer::ReadBuffer;
pub use command::{CmdType, CommandDesc, CommandTable};
pub use config::ParserConfig;
pub use metrics::{RequestParseMetrics, ResponseParseMetrics};
pub use parse::{ParseError, ParseResult, Parser};
pub use request::Request;
pub use response::Response;
pub use token::{ElemKind, Element, TokenSeq};
