//! Interned property keys.
//!
//! Array-index-shaped keys are carried directly in the symbol instead of
//! going through the intern table, so the index maps bijectively to the
//! symbol and back without a string round trip.

use rustc_hash::FxHashMap;

/// Highest valid array index is 2^32 - 2; 2^32 - 1 is reserved for length.
const MAX_ARRAY_INDEX: u64 = u32::MAX as u64 - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Index(u32),
    Name(u32),
}

impl Symbol {
    pub fn is_array_index(self) -> bool {
        matches!(self, Symbol::Index(_))
    }

    pub fn array_index(self) -> Option<u32> {
        match self {
            Symbol::Index(index) => Some(index),
            Symbol::Name(_) => None,
        }
    }
}

pub const LENGTH: Symbol = Symbol::Name(0);
pub const TO_STRING: Symbol = Symbol::Name(1);
pub const VALUE_OF: Symbol = Symbol::Name(2);

pub struct SymbolTable {
    names: Vec<String>,
    ids: FxHashMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = Self {
            names: Vec::new(),
            ids: FxHashMap::default(),
        };
        // Fixed ids backing the well-known constants above.
        assert_eq!(table.intern("length"), LENGTH);
        assert_eq!(table.intern("toString"), TO_STRING);
        assert_eq!(table.intern("valueOf"), VALUE_OF);
        table
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(index) = parse_array_index(s) {
            return Symbol::Index(index);
        }
        if let Some(&id) = self.ids.get(s) {
            return Symbol::Name(id);
        }
        let id = self.names.len() as u32;
        self.names.push(s.to_string());
        self.ids.insert(s.to_string(), id);
        Symbol::Name(id)
    }

    pub fn description(&self, sym: Symbol) -> String {
        match sym {
            Symbol::Index(index) => index.to_string(),
            Symbol::Name(id) => self.names[id as usize].clone(),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical numeric strings only: no sign, no leading zero except "0".
fn parse_array_index(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 10 {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u64 = s.parse().ok()?;
    if n <= MAX_ARRAY_INDEX {
        Some(n as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut table = SymbolTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        let c = table.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.description(a), "foo");
        assert_eq!(table.description(c), "bar");
    }

    #[test]
    fn well_known_symbols() {
        let mut table = SymbolTable::new();
        assert_eq!(table.intern("length"), LENGTH);
        assert_eq!(table.intern("toString"), TO_STRING);
        assert_eq!(table.intern("valueOf"), VALUE_OF);
    }

    #[test]
    fn array_index_recognition() {
        let mut table = SymbolTable::new();
        assert_eq!(table.intern("0"), Symbol::Index(0));
        assert_eq!(table.intern("42"), Symbol::Index(42));
        assert_eq!(table.intern("4294967294"), Symbol::Index(4294967294));
        // 2^32 - 1 is not an array index
        assert!(!table.intern("4294967295").is_array_index());
        assert!(!table.intern("01").is_array_index());
        assert!(!table.intern("-1").is_array_index());
        assert!(!table.intern("1.0").is_array_index());
        assert!(!table.intern("").is_array_index());
    }

    #[test]
    fn index_extraction_round_trips() {
        let mut table = SymbolTable::new();
        let sym = table.intern("1234");
        assert_eq!(sym.array_index(), Some(1234));
        assert_eq!(table.description(sym), "1234");
        assert_eq!(LENGTH.array_index(), None);
    }

    #[test]
    fn index_symbols_order_numerically() {
        assert!(Symbol::Index(2) < Symbol::Index(10));
        assert!(Symbol::Index(u32::MAX - 1) < Symbol::Name(0));
    }
}
