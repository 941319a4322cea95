//! Symbol table for canonicalized tag/attribute names.

use std::collections::HashMap;
use std::sync::Arc;

/// Opaque interned-string handle.
///
/// Handles are only meaningful for the table that produced them. Equality is
/// handle identity; the table guarantees equal content maps to equal handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Document-scoped symbol table.
///
/// Invariant: entries are never removed, so a `Symbol` stays valid for the
/// lifetime of its table. Names interned through [`SymbolTable::intern_name`]
/// are stored in canonical ASCII-lowercase form; non-ASCII code points are
/// preserved as-is.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<Arc<str>>,
    map: HashMap<Arc<str>, Symbol>,
    bytes: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text` exactly as given.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(symbol) = self.map.get(text) {
            return *symbol;
        }
        self.insert(Arc::from(text))
    }

    /// Intern a tag or attribute name, applying ASCII-lowercase folding.
    pub fn intern_name(&mut self, name: &str) -> Symbol {
        if !name.bytes().any(|b| b.is_ascii_uppercase()) {
            return self.intern(name);
        }
        let folded = name.to_ascii_lowercase();
        self.intern(&folded)
    }

    /// Find the handle for `text` without interning it.
    pub fn lookup(&self, text: &str) -> Option<Symbol> {
        self.map.get(text).copied()
    }

    /// Find the handle for a name under the same folding as `intern_name`.
    pub fn lookup_name(&self, name: &str) -> Option<Symbol> {
        if !name.bytes().any(|b| b.is_ascii_uppercase()) {
            return self.lookup(name);
        }
        self.lookup(&name.to_ascii_lowercase())
    }

    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        self.entries.get(symbol.0 as usize).map(|s| s.as_ref())
    }

    /// Resolve to the shared canonical string, for consumers that outlive a
    /// borrow of the table.
    pub fn resolve_arc(&self, symbol: Symbol) -> Option<Arc<str>> {
        self.entries.get(symbol.0 as usize).cloned()
    }

    /// Number of distinct interned entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Approximate heap bytes held by the table.
    pub fn memory_usage(&self) -> usize {
        self.bytes
            + self.entries.capacity() * std::mem::size_of::<Arc<str>>()
            + self.map.capacity() * (std::mem::size_of::<Arc<str>>() + std::mem::size_of::<Symbol>())
    }

    fn insert(&mut self, text: Arc<str>) -> Symbol {
        debug_assert!(self.entries.len() < u32::MAX as usize);
        let symbol = Symbol(self.entries.len() as u32);
        self.bytes += text.len();
        self.entries.push(Arc::clone(&text));
        self.map.insert(text, symbol);
        symbol
    }
}

#[cfg(test)]
mod tests {
    use super::SymbolTable;

    #[test]
    fn interning_is_canonical_and_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.intern("div");
        let b = table.intern("div");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve(a), Some("div"));
    }

    #[test]
    fn size_counts_distinct_contents() {
        let mut table = SymbolTable::new();
        for name in ["a", "b", "a", "c", "b", "a"] {
            table.intern(name);
        }
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn names_fold_ascii_case_only() {
        let mut table = SymbolTable::new();
        let lower = table.intern_name("div");
        let upper = table.intern_name("DiV");
        assert_eq!(lower, upper);
        assert_eq!(table.len(), 1);

        let exact = table.intern("DiV");
        assert_ne!(exact, lower, "exact interning keeps case");

        let accented = table.intern_name("CAFÉ");
        assert_eq!(table.resolve(accented), Some("cafÉ"));
    }

    #[test]
    fn lookup_does_not_grow_the_table() {
        let mut table = SymbolTable::new();
        assert!(table.lookup("href").is_none());
        assert!(table.is_empty());
        let href = table.intern_name("href");
        assert_eq!(table.lookup_name("HREF"), Some(href));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn memory_usage_grows_with_new_entries_only() {
        let mut table = SymbolTable::new();
        table.intern("attribute-name");
        let before = table.memory_usage();
        table.intern("attribute-name");
        assert_eq!(table.memory_usage(), before);
        assert!(before >= "attribute-name".len());
    }
}
