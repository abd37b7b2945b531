//! RESP element tokenizer.
//!
//! Recognizes exactly one RESP token at the buffer's read cursor and produces
//! a typed [`Element`]. Container markers (`*` array, `|` attribute map) are
//! tokens in their own right here: the tokenizer never recurses into their
//! payloads. The message-level parsers in [`crate::parse`] consume the
//! declared number of follow-on elements themselves, which is what lets them
//! bound untrusted counts before acting on them.

use crate::buffer::ReadBuffer;
use bytes::Bytes;

/// RESP element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElemKind {
    /// Kind not yet determined (reset state).
    #[default]
    Unknown,
    /// Simple string: +OK\r\n
    SimpleString,
    /// Error: -ERR message\r\n
    Error,
    /// Integer: :1000\r\n
    Integer,
    /// Bulk string: $5\r\nhello\r\n or $-1\r\n (null)
    BulkString,
    /// Array marker: *2\r\n
    Array,
    /// Attribute map marker: |1\r\n
    Map,
}

/// One parsed RESP token.
///
/// `num` carries the count for array/map markers, the declared length for a
/// bulk string (negative for a null bulk), or the decoded value for an
/// integer. `bstr` is the payload for scalar kinds and empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub kind: ElemKind,
    pub num: i64,
    pub bstr: Bytes,
}

/// Append-only element sequence with a fixed logical capacity.
///
/// Preallocated once per request/response and reused across messages via
/// [`clear`](Self::clear). The parsers' capacity budgets guarantee the
/// length never exceeds `nalloc`; `push` asserts it in debug builds.
#[derive(Debug)]
pub struct TokenSeq {
    elems: Vec<Element>,
    nalloc: usize,
}

impl TokenSeq {
    /// Preallocate a sequence holding up to `nalloc` elements.
    pub fn with_capacity(nalloc: usize) -> Self {
        TokenSeq {
            elems: Vec::with_capacity(nalloc),
            nalloc,
        }
    }

    /// Logical capacity fixed at construction.
    pub fn nalloc(&self) -> usize {
        self.nalloc
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Element> {
        self.elems.get(idx)
    }

    /// Append one element.
    pub fn push(&mut self, el: Element) {
        debug_assert!(self.elems.len() < self.nalloc, "token sequence overflow");
        self.elems.push(el);
    }

    /// Drop all elements, keeping the allocation.
    pub fn clear(&mut self) {
        self.elems.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elems.iter()
    }
}

/// Tokenizer outcome short of a complete element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElemError {
    /// Need more data to complete the token; cursor untouched.
    Incomplete,
    /// Malformed token syntax.
    Invalid(String),
}

impl std::fmt::Display for ElemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElemError::Incomplete => write!(f, "incomplete element"),
            ElemError::Invalid(msg) => write!(f, "invalid element: {}", msg),
        }
    }
}

impl std::error::Error for ElemError {}

/// True iff the next unread byte begins an attribute-map marker.
pub fn is_attrib(buf: &ReadBuffer) -> bool {
    buf.peek() == Some(b'|')
}

/// True iff the next unread byte begins an array marker.
pub fn is_array(buf: &ReadBuffer) -> bool {
    buf.peek() == Some(b'*')
}

/// Find CRLF in a slice, returning the position of the \r.
fn find_crlf(bytes: &[u8]) -> Option<usize> {
    (0..bytes.len().saturating_sub(1)).find(|&i| bytes[i] == b'\r' && bytes[i + 1] == b'\n')
}

/// Decode the line between a marker byte and its CRLF as a signed integer.
fn parse_num(line: &[u8]) -> Result<i64, ElemError> {
    let s = std::str::from_utf8(line)
        .map_err(|_| ElemError::Invalid("non-UTF-8 length line".to_string()))?;
    s.parse::<i64>()
        .map_err(|_| ElemError::Invalid(format!("bad number: {}", s)))
}

/// Parse exactly one element at the read cursor.
///
/// On success the cursor is advanced past the token. On `Incomplete` or
/// `Invalid` the cursor is left where it was.
pub fn parse_element(buf: &mut ReadBuffer) -> Result<Element, ElemError> {
    let bytes = buf.unread();
    let marker = match bytes.first() {
        Some(b) => *b,
        None => return Err(ElemError::Incomplete),
    };

    let line_end = match find_crlf(bytes) {
        Some(pos) => pos,
        None => return Err(ElemError::Incomplete),
    };

    let (el, consumed) = match marker {
        b'+' => (
            Element {
                kind: ElemKind::SimpleString,
                num: 0,
                bstr: Bytes::copy_from_slice(&bytes[1..line_end]),
            },
            line_end + 2,
        ),
        b'-' => (
            Element {
                kind: ElemKind::Error,
                num: 0,
                bstr: Bytes::copy_from_slice(&bytes[1..line_end]),
            },
            line_end + 2,
        ),
        b':' => (
            Element {
                kind: ElemKind::Integer,
                num: parse_num(&bytes[1..line_end])?,
                bstr: Bytes::new(),
            },
            line_end + 2,
        ),
        b'$' => {
            let len = parse_num(&bytes[1..line_end])?;
            if len < 0 {
                // null bulk string, no payload follows
                (
                    Element {
                        kind: ElemKind::BulkString,
                        num: len,
                        bstr: Bytes::new(),
                    },
                    line_end + 2,
                )
            } else {
                let data_start = line_end + 2;
                let data_end = match data_start.checked_add(len as usize) {
                    Some(end) => end,
                    None => {
                        return Err(ElemError::Invalid(format!(
                            "bulk string length too large: {}",
                            len
                        )))
                    }
                };
                let total = data_end + 2;
                if bytes.len() < total {
                    return Err(ElemError::Incomplete);
                }
                if bytes[data_end] != b'\r' || bytes[data_end + 1] != b'\n' {
                    return Err(ElemError::Invalid(
                        "bulk string missing trailing CRLF".to_string(),
                    ));
                }
                (
                    Element {
                        kind: ElemKind::BulkString,
                        num: len,
                        bstr: Bytes::copy_from_slice(&bytes[data_start..data_end]),
                    },
                    total,
                )
            }
        }
        b'*' => (
            Element {
                kind: ElemKind::Array,
                num: parse_num(&bytes[1..line_end])?,
                bstr: Bytes::new(),
            },
            line_end + 2,
        ),
        b'|' => (
            Element {
                kind: ElemKind::Map,
                num: parse_num(&bytes[1..line_end])?,
                bstr: Bytes::new(),
            },
            line_end + 2,
        ),
        _ => {
            return Err(ElemError::Invalid(format!(
                "unknown marker byte: 0x{:02x}",
                marker
            )))
        }
    };

    buf.advance(consumed);
    Ok(el)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_string() {
        let mut buf = ReadBuffer::from_slice(b"+OK\r\n");
        let el = parse_element(&mut buf).unwrap();
        assert_eq!(el.kind, ElemKind::SimpleString);
        assert_eq!(&el.bstr[..], b"OK");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_error() {
        let mut buf = ReadBuffer::from_slice(b"-ERR unknown command\r\n");
        let el = parse_element(&mut buf).unwrap();
        assert_eq!(el.kind, ElemKind::Error);
        assert_eq!(&el.bstr[..], b"ERR unknown command");
    }

    #[test]
    fn test_integer() {
        let mut buf = ReadBuffer::from_slice(b":-42\r\n");
        let el = parse_element(&mut buf).unwrap();
        assert_eq!(el.kind, ElemKind::Integer);
        assert_eq!(el.num, -42);
        assert!(el.bstr.is_empty());
    }

    #[test]
    fn test_bulk_string() {
        let mut buf = ReadBuffer::from_slice(b"$5\r\nhello\r\n");
        let el = parse_element(&mut buf).unwrap();
        assert_eq!(el.kind, ElemKind::BulkString);
        assert_eq!(el.num, 5);
        assert_eq!(&el.bstr[..], b"hello");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_null_bulk_string() {
        let mut buf = ReadBuffer::from_slice(b"$-1\r\n");
        let el = parse_element(&mut buf).unwrap();
        assert_eq!(el.kind, ElemKind::BulkString);
        assert_eq!(el.num, -1);
        assert!(el.bstr.is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_bulk_string_bad_trailer() {
        let mut buf = ReadBuffer::from_slice(b"$5\r\nhelloXX");
        assert!(matches!(
            parse_element(&mut buf),
            Err(ElemError::Invalid(_))
        ));
        assert_eq!(buf.remaining(), 11);
    }

    #[test]
    fn test_array_marker_only() {
        let mut buf = ReadBuffer::from_slice(b"*2\r\n$3\r\nfoo\r\n");
        let el = parse_element(&mut buf).unwrap();
        assert_eq!(el.kind, ElemKind::Array);
        assert_eq!(el.num, 2);
        // nested payload is left for the caller
        assert_eq!(buf.unread(), b"$3\r\nfoo\r\n");
    }

    #[test]
    fn test_map_marker() {
        let mut buf = ReadBuffer::from_slice(b"|1\r\n");
        let el = parse_element(&mut buf).unwrap();
        assert_eq!(el.kind, ElemKind::Map);
        assert_eq!(el.num, 1);
    }

    #[test]
    fn test_incomplete_leaves_cursor() {
        for input in [&b"+OK"[..], b"$5\r\nhel", b":12", b""] {
            let mut buf = ReadBuffer::from_slice(input);
            assert_eq!(parse_element(&mut buf), Err(ElemError::Incomplete));
            assert_eq!(buf.remaining(), input.len());
        }
    }

    #[test]
    fn test_unknown_marker() {
        let mut buf = ReadBuffer::from_slice(b"?1\r\n");
        assert!(matches!(
            parse_element(&mut buf),
            Err(ElemError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_number() {
        let mut buf = ReadBuffer::from_slice(b":abc\r\n");
        assert!(matches!(
            parse_element(&mut buf),
            Err(ElemError::Invalid(_))
        ));
    }

    #[test]
    fn test_classifiers_do_not_consume() {
        let buf = ReadBuffer::from_slice(b"|2\r\n");
        assert!(is_attrib(&buf));
        assert!(!is_array(&buf));
        assert_eq!(buf.remaining(), 4);

        let buf = ReadBuffer::from_slice(b"*2\r\n");
        assert!(is_array(&buf));
        assert!(!is_attrib(&buf));

        let buf = ReadBuffer::new();
        assert!(!is_array(&buf));
        assert!(!is_attrib(&buf));
    }
}
