//! The assembler's symbol table: labels and equates, case-insensitive.
//!
//! Lives only for the duration of one assembly invocation, per the data
//! model's ownership note.

use std::collections::HashMap;

/// A resolved symbol value: a label's physical address, or an equate's
/// literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Label(u32),
    Equate(i64),
}

impl Symbol {
    pub fn value(self) -> i64 {
        match self {
            Symbol::Label(addr) => addr as i64,
            Symbol::Equate(v) => v,
        }
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a symbol. Names are matched case-insensitively; redefining an
    /// existing name (label or equate) is a duplicate-definition error.
    pub fn define(&mut self, name: &str, symbol: Symbol) -> Result<(), ()> {
        let key = name.to_ascii_uppercase();
        if self.entries.contains_key(&key) {
            return Err(());
        }
        self.entries.insert(key, symbol);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.entries.get(&name.to_ascii_uppercase()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut table = SymbolTable::new();
        table.define("Start", Symbol::Label(0x100)).unwrap();
        assert_eq!(table.lookup("START"), Some(Symbol::Label(0x100)));
        assert_eq!(table.lookup("start"), Some(Symbol::Label(0x100)));
    }

    #[test]
    fn redefinition_is_rejected() {
        let mut table = SymbolTable::new();
        table.define("X", Symbol::Equate(1)).unwrap();
        assert!(table.define("x", Symbol::Equate(2)).is_err());
    }
}
