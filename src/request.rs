//! Client request message.

use crate::command::CmdType;
use crate::token::TokenSeq;

/// Default token capacity for a request.
///
/// Bounds the attribute block plus command array a single request may carry.
pub const REQ_NTOKEN: usize = 64;

/// One parsed client request.
///
/// The token sequence is flat: any attribute key/value elements come first,
/// then the command-array marker, verb, and arguments. `offset` indexes the
/// first body element (the marker), i.e. it is zero when no attribute block
/// is present.
#[derive(Debug)]
pub struct Request {
    pub token: TokenSeq,
    pub offset: usize,
    pub ctype: CmdType,
}

impl Request {
    /// Create a request with the default token capacity.
    pub fn new() -> Self {
        Self::with_capacity(REQ_NTOKEN)
    }

    /// Create a request holding up to `ntoken` elements.
    pub fn with_capacity(ntoken: usize) -> Self {
        Request {
            token: TokenSeq::with_capacity(ntoken),
            offset: 0,
            ctype: CmdType::Unknown,
        }
    }

    /// Return to the empty state, keeping the token allocation.
    pub fn reset(&mut self) {
        self.token.clear();
        self.offset = 0;
        self.ctype = CmdType::Unknown;
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{ElemKind, Element};

    #[test]
    fn test_reset_clears_everything() {
        let mut req = Request::with_capacity(8);
        req.token.push(Element {
            kind: ElemKind::Array,
            num: 1,
            bstr: Default::default(),
        });
        req.offset = 3;
        req.ctype = CmdType::Get;

        req.reset();
        assert!(req.token.is_empty());
        assert_eq!(req.offset, 0);
        assert_eq!(req.ctype, CmdType::Unknown);
        assert_eq!(req.token.nalloc(), 8);
    }
}
