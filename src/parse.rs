//! Message-level RESP parsers.
//!
//! Builds validated [`Request`]/[`Response`] messages out of the element
//! tokenizer's output. Both entry points are atomic: either a complete valid
//! message is consumed, or the destination struct is reset and the buffer
//! cursor restored to its call-entry position. An `Incomplete` outcome is a
//! retry signal, not an error: the caller appends more bytes and re-invokes
//! the parser from the beginning.
//!
//! A message is one flat token sequence plus a body-start index: attribute
//! key/value elements first, body elements after. Array and attribute-map
//! markers declare counts that come off the wire untrusted, so each parse
//! step checks the declared count against a remaining capacity budget before
//! consuming anything it declares.

use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::buffer::ReadBuffer;
use crate::command::CommandTable;
use crate::config::ParserConfig;
use crate::metrics::{RequestParseMetrics, ResponseParseMetrics};
use crate::request::Request;
use crate::response::Response;
use crate::token::{self, ElemError, ElemKind, Element, TokenSeq};

/// Invalid-message diagnoses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed element syntax, propagated from the tokenizer.
    Element(String),
    /// A declared count that can never be valid (e.g. negative attributes).
    BadCount(i64),
    /// The command header element is not an array marker.
    NotArray(ElemKind),
    /// Command array declared fewer than one element.
    EmptyCommand,
    /// Verb does not match any command table entry.
    UnknownCommand(String),
    /// Argument count outside the command's arity bounds.
    WrongArity {
        verb: String,
        narg: usize,
        nopt: usize,
        given: usize,
    },
    /// Attribute pair count exceeds the remaining capacity budget.
    AttributeOverflow { npair: i64, budget: usize },
    /// Body element count exceeds the remaining capacity budget.
    BodyOverflow { nelem: i64, budget: usize },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Element(msg) => write!(f, "invalid element: {}", msg),
            ParseError::BadCount(n) => write!(f, "bad declared count: {}", n),
            ParseError::NotArray(kind) => {
                write!(f, "command header is not an array: {:?}", kind)
            }
            ParseError::EmptyCommand => write!(f, "empty command array"),
            ParseError::UnknownCommand(verb) => write!(f, "unknown command '{}'", verb),
            ParseError::WrongArity {
                verb,
                narg,
                nopt,
                given,
            } => write!(
                f,
                "wrong number of arguments for '{}': {}+[{}] expected, {} given",
                verb, narg, nopt, given
            ),
            ParseError::AttributeOverflow { npair, budget } => {
                write!(f, "too many attributes: {} exceeds budget {}", npair, budget)
            }
            ParseError::BodyOverflow { nelem, budget } => {
                write!(f, "oversized body: {} exceeds budget {}", nelem, budget)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Outcome of a parse call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// A complete valid message was consumed.
    Complete,
    /// Buffer lacks a full message; state restored, retry with more bytes.
    Incomplete,
    /// Malformed message; state restored.
    Error(ParseError),
}

/// Internal short-circuit carried by `?` through the parse steps.
enum Halt {
    Incomplete,
    Invalid(ParseError),
}

impl From<ElemError> for Halt {
    fn from(e: ElemError) -> Self {
        match e {
            ElemError::Incomplete => Halt::Incomplete,
            ElemError::Invalid(msg) => Halt::Invalid(ParseError::Element(msg)),
        }
    }
}

/// Wire parser context.
///
/// Owns the command table, the token-capacity configuration, and the
/// optional metrics sinks. Each instance is independent; there is no
/// process-wide registration state. Parsing itself is synchronous and
/// lock-free, with one request/response struct per connection, parsed
/// serially.
pub struct Parser {
    table: CommandTable,
    config: ParserConfig,
    req_metrics: Option<Arc<RequestParseMetrics>>,
    rsp_metrics: Option<Arc<ResponseParseMetrics>>,
    initialized: bool,
}

impl Parser {
    /// Create an unregistered parser.
    pub fn new(table: CommandTable, config: ParserConfig) -> Self {
        Parser {
            table,
            config,
            req_metrics: None,
            rsp_metrics: None,
            initialized: false,
        }
    }

    /// Create a parser with the standard command table and default capacities.
    pub fn with_defaults() -> Self {
        Self::new(CommandTable::new(), ParserConfig::default())
    }

    /// Register metrics sinks. Re-invocation overwrites the previous pair.
    pub fn setup(
        &mut self,
        req_metrics: Arc<RequestParseMetrics>,
        rsp_metrics: Arc<ResponseParseMetrics>,
    ) {
        info!("setting up the wire parser");
        if self.initialized {
            warn!("wire parser has already been set up, overwriting");
        }
        self.req_metrics = Some(req_metrics);
        self.rsp_metrics = Some(rsp_metrics);
        self.initialized = true;
    }

    /// Clear metrics registration.
    pub fn teardown(&mut self) {
        info!("tearing down the wire parser");
        if !self.initialized {
            warn!("wire parser has never been set up");
        }
        self.req_metrics = None;
        self.rsp_metrics = None;
        self.initialized = false;
    }

    /// New request sized per this parser's configuration.
    pub fn new_request(&self) -> Request {
        Request::with_capacity(self.config.req_ntoken)
    }

    /// New response sized per this parser's configuration.
    pub fn new_response(&self) -> Response {
        Response::with_capacity(self.config.rsp_ntoken)
    }

    /// Parse one client request out of `buf` into `req`.
    pub fn parse_request(&self, req: &mut Request, buf: &mut ReadBuffer) -> ParseResult {
        let mark = buf.read_pos();
        trace!(rpos = mark, "parsing request");

        match self.parse_request_inner(req, buf) {
            Ok(()) => {
                if let Some(m) = &self.req_metrics {
                    m.incr_parse();
                }
                ParseResult::Complete
            }
            Err(halt) => {
                req.reset();
                buf.rewind(mark);
                match halt {
                    Halt::Incomplete => ParseResult::Incomplete,
                    Halt::Invalid(e) => {
                        if let Some(m) = &self.req_metrics {
                            m.incr_parse_ex();
                        }
                        ParseResult::Error(e)
                    }
                }
            }
        }
    }

    /// Parse one server response out of `buf` into `rsp`.
    pub fn parse_response(&self, rsp: &mut Response, buf: &mut ReadBuffer) -> ParseResult {
        let mark = buf.read_pos();
        trace!(rpos = mark, "parsing response");

        match self.parse_response_inner(rsp, buf) {
            Ok(()) => {
                if let Some(m) = &self.rsp_metrics {
                    m.incr_parse();
                }
                ParseResult::Complete
            }
            Err(halt) => {
                rsp.reset();
                buf.rewind(mark);
                match halt {
                    Halt::Incomplete => ParseResult::Incomplete,
                    Halt::Invalid(e) => {
                        if let Some(m) = &self.rsp_metrics {
                            m.incr_parse_ex();
                        }
                        ParseResult::Error(e)
                    }
                }
            }
        }
    }

    fn parse_request_inner(&self, req: &mut Request, buf: &mut ReadBuffer) -> Result<(), Halt> {
        let cap = req.token.nalloc();
        debug_assert!(cap > 1);

        if buf.is_empty() {
            return Err(Halt::Incomplete);
        }

        let mut budget = cap;

        // attribute block, if present
        if token::is_attrib(buf) {
            budget -= 1;
            let el = push_element(&mut req.token, buf)?;
            // each attribute takes 2 token slots, and 2 more stay reserved
            // for the shortest command
            let allowed = budget.saturating_sub(2) >> 1;
            if el.num < 0 {
                return Err(Halt::Invalid(ParseError::BadCount(el.num)));
            }
            if el.num as usize > allowed {
                debug!(npair = el.num, allowed, "too many attributes");
                return Err(Halt::Invalid(ParseError::AttributeOverflow {
                    npair: el.num,
                    budget: allowed,
                }));
            }
            let ntoken = el.num as usize * 2;
            budget -= ntoken;
            req.offset = 1 + ntoken;
            parse_range(&mut req.token, buf, ntoken)?;
        }

        // command array header; consumed but not kept in the token sequence
        let el = token::parse_element(buf)?;
        if el.kind != ElemKind::Array {
            debug!(kind = ?el.kind, "parse req failed: not an array");
            return Err(Halt::Invalid(ParseError::NotArray(el.kind)));
        }
        if el.num < 1 {
            return Err(Halt::Invalid(ParseError::EmptyCommand));
        }
        if el.num as usize > budget {
            return Err(Halt::Invalid(ParseError::BodyOverflow {
                nelem: el.num,
                budget,
            }));
        }

        // verb plus arguments
        parse_range(&mut req.token, buf, el.num as usize)?;

        self.resolve_command(req)
    }

    /// Match the verb against the command table and validate arity.
    fn resolve_command(&self, req: &mut Request) -> Result<(), Halt> {
        let verb = match req.token.get(req.offset) {
            Some(el) if el.kind == ElemKind::BulkString && el.num >= 0 => el.bstr.clone(),
            _ => {
                return Err(Halt::Invalid(ParseError::Element(
                    "command verb is not a bulk string".to_string(),
                )))
            }
        };

        let desc = match self.table.lookup(&verb) {
            Some(desc) => desc,
            None => {
                let verb = String::from_utf8_lossy(&verb).into_owned();
                warn!(verb = %verb, "unrecognized command detected");
                return Err(Halt::Invalid(ParseError::UnknownCommand(verb)));
            }
        };

        // verb excluded
        let narg = req.token.len() - req.offset - 1;
        if narg < desc.narg || narg > desc.narg + desc.nopt {
            let verb = String::from_utf8_lossy(&verb).into_owned();
            warn!(
                verb = %verb,
                expected = desc.narg,
                optional = desc.nopt,
                given = narg,
                "wrong number of arguments"
            );
            return Err(Halt::Invalid(ParseError::WrongArity {
                verb,
                narg: desc.narg,
                nopt: desc.nopt,
                given: narg,
            }));
        }

        req.ctype = desc.ctype;
        Ok(())
    }

    fn parse_response_inner(&self, rsp: &mut Response, buf: &mut ReadBuffer) -> Result<(), Halt> {
        let cap = rsp.token.nalloc();
        debug_assert!(cap > 0);
        debug_assert_eq!(rsp.etype, ElemKind::Unknown, "response not reset before reuse");

        if buf.is_empty() {
            return Err(Halt::Incomplete);
        }

        let mut budget = cap;

        // attribute block, if present
        if token::is_attrib(buf) {
            budget -= 1;
            let el = push_element(&mut rsp.token, buf)?;
            // each attribute takes 2 token slots, one more stays reserved
            // for the shortest response
            let allowed = budget.saturating_sub(1) >> 1;
            if el.num < 0 {
                return Err(Halt::Invalid(ParseError::BadCount(el.num)));
            }
            if el.num as usize > allowed {
                debug!(npair = el.num, allowed, "too many attributes");
                return Err(Halt::Invalid(ParseError::AttributeOverflow {
                    npair: el.num,
                    budget: allowed,
                }));
            }
            let ntoken = el.num as usize * 2;
            budget -= ntoken;
            rsp.offset = 1 + ntoken;
            parse_range(&mut rsp.token, buf, ntoken)?;
        }

        // the attribute block may have exactly exhausted the buffer
        if buf.is_empty() {
            return Err(Halt::Incomplete);
        }

        let mut nelem: i64 = 1;
        if token::is_array(buf) {
            rsp.etype = ElemKind::Array;
            let el = token::parse_element(buf)?;
            nelem = el.num;
            if nelem < 0 {
                // null array: terminal, nothing further is consumed
                rsp.nil = true;
                return Ok(());
            }
        }

        if nelem as usize > budget {
            return Err(Halt::Invalid(ParseError::BodyOverflow { nelem, budget }));
        }
        parse_range(&mut rsp.token, buf, nelem as usize)?;

        // scalar response: kind comes from the first body element
        if rsp.etype == ElemKind::Unknown {
            if let Some(el) = rsp.token.get(rsp.offset) {
                rsp.etype = el.kind;
            }
        }

        Ok(())
    }
}

/// Parse one element and append it to the token sequence.
fn push_element(seq: &mut TokenSeq, buf: &mut ReadBuffer) -> Result<Element, Halt> {
    let el = token::parse_element(buf)?;
    trace!(kind = ?el.kind, num = el.num, "parsed element");
    seq.push(el.clone());
    Ok(el)
}

/// Consume exactly `nelem` sequential elements into the token sequence.
///
/// Returns `Incomplete` as soon as the buffer empties; any tokenizer status
/// propagates unchanged. Caller state is not reset here; that happens once,
/// at the entry point.
fn parse_range(seq: &mut TokenSeq, buf: &mut ReadBuffer, nelem: usize) -> Result<(), Halt> {
    for _ in 0..nelem {
        if buf.is_empty() {
            return Err(Halt::Incomplete);
        }
        push_element(seq, buf)?;
    }
    Ok(())
}
