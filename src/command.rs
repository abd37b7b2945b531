//! Cache command table.
//!
//! Maps a command verb to its arity bounds. The table is built once at
//! startup and never mutated; lookup is a linear scan with exact byte
//! comparison. Matching is deliberately case-sensitive with no
//! normalization: `get` is not `GET` on this wire.

/// Resolved command identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CmdType {
    /// No command resolved yet (reset state).
    #[default]
    Unknown,
    Ping,
    Quit,
    Get,
    Set,
    Del,
    Exists,
    Incr,
    Decr,
    Expire,
}

/// One command table entry: verb plus arity bounds.
///
/// A command accepts between `narg` and `narg + nopt` arguments, the verb
/// itself excluded.
#[derive(Debug, Clone, Copy)]
pub struct CommandDesc {
    pub ctype: CmdType,
    pub verb: &'static [u8],
    pub narg: usize,
    pub nopt: usize,
}

/// Immutable verb → arity-bounds mapping.
#[derive(Debug, Clone)]
pub struct CommandTable {
    entries: Vec<CommandDesc>,
}

impl CommandTable {
    /// Build the standard cache command table.
    pub fn new() -> Self {
        let entries = vec![
            CommandDesc { ctype: CmdType::Ping, verb: b"PING", narg: 0, nopt: 1 },
            CommandDesc { ctype: CmdType::Quit, verb: b"QUIT", narg: 0, nopt: 0 },
            CommandDesc { ctype: CmdType::Get, verb: b"GET", narg: 1, nopt: 0 },
            CommandDesc { ctype: CmdType::Set, verb: b"SET", narg: 2, nopt: 3 },
            CommandDesc { ctype: CmdType::Del, verb: b"DEL", narg: 1, nopt: 0 },
            CommandDesc { ctype: CmdType::Exists, verb: b"EXISTS", narg: 1, nopt: 0 },
            CommandDesc { ctype: CmdType::Incr, verb: b"INCR", narg: 1, nopt: 0 },
            CommandDesc { ctype: CmdType::Decr, verb: b"DECR", narg: 1, nopt: 0 },
            CommandDesc { ctype: CmdType::Expire, verb: b"EXPIRE", narg: 2, nopt: 1 },
        ];
        CommandTable { entries }
    }

    /// Look up a verb by exact byte comparison.
    pub fn lookup(&self, verb: &[u8]) -> Option<&CommandDesc> {
        self.entries.iter().find(|desc| desc.verb == verb)
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_verb() {
        let table = CommandTable::new();
        let desc = table.lookup(b"GET").unwrap();
        assert_eq!(desc.ctype, CmdType::Get);
        assert_eq!(desc.narg, 1);
        assert_eq!(desc.nopt, 0);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = CommandTable::new();
        assert!(table.lookup(b"get").is_none());
        assert!(table.lookup(b"Get").is_none());
    }

    #[test]
    fn test_lookup_no_partial_match() {
        let table = CommandTable::new();
        assert!(table.lookup(b"GE").is_none());
        assert!(table.lookup(b"GETS").is_none());
        assert!(table.lookup(b"").is_none());
    }

    #[test]
    fn test_lookup_unknown_verb() {
        let table = CommandTable::new();
        assert!(table.lookup(b"NOPE").is_none());
    }
}
