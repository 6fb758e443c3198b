use std::collections::HashMap;
use crate::codegen::CompileError;

/// Most distinct globals a u16 operand can address
pub const MAX_GLOBALS: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: u16,
}

/// Maps names to global slots. Slots are handed out in definition order
/// and are never reused.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    next_index: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to the next free slot. Redefining a name rebinds it to
    /// a fresh slot; the old slot stays allocated.
    pub fn define(&mut self, name: &str) -> Result<Symbol, CompileError> {
        let index = u16::try_from(self.next_index)
            .map_err(|_| CompileError::TooManyGlobals(MAX_GLOBALS))?;
        self.next_index += 1;

        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Global,
            index,
        };
        self.symbols.insert(symbol.name.clone(), symbol.clone());
        Ok(symbol)
    }

    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Number of slots handed out so far
    pub fn allocated(&self) -> usize {
        self.next_index
    }
}
