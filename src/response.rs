//! Server response message.

use crate::token::{ElemKind, TokenSeq};

/// Default token capacity for a response.
pub const RSP_NTOKEN: usize = 64;

/// One parsed server response.
///
/// Same flat layout as a request: optional attribute elements, then the
/// body starting at `offset`. `etype` is the kind of the first body element
/// (or `Array` for array responses) and stays `Unknown` until a parse
/// completes. `nil` marks an explicit null array (`*-1`).
#[derive(Debug)]
pub struct Response {
    pub token: TokenSeq,
    pub offset: usize,
    pub etype: ElemKind,
    pub nil: bool,
}

impl Response {
    /// Create a response with the default token capacity.
    pub fn new() -> Self {
        Self::with_capacity(RSP_NTOKEN)
    }

    /// Create a response holding up to `ntoken` elements.
    pub fn with_capacity(ntoken: usize) -> Self {
        Response {
            token: TokenSeq::with_capacity(ntoken),
            offset: 0,
            etype: ElemKind::Unknown,
            nil: false,
        }
    }

    /// Return to the empty state, keeping the token allocation.
    pub fn reset(&mut self) {
        self.token.clear();
        self.offset = 0;
        self.etype = ElemKind::Unknown;
        self.nil = false;
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Element;

    #[test]
    fn test_reset_clears_everything() {
        let mut rsp = Response::with_capacity(8);
        rsp.token.push(Element {
            kind: ElemKind::Integer,
            num: 7,
            bstr: Default::default(),
        });
        rsp.offset = 2;
        rsp.etype = ElemKind::Array;
        rsp.nil = true;

        rsp.reset();
        assert!(rsp.token.is_empty());
        assert_eq!(rsp.offset, 0);
        assert_eq!(rsp.etype, ElemKind::Unknown);
        assert!(!rsp.nil);
    }
}
