// ABOUTME: Compiler-side scope stack resolving names to Global/Local/Free/Builtin/Function slots

use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    Global,
    Local,
    Free,
    Builtin,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: usize,
}

pub struct SymbolTable {
    outer: Option<Rc<std::cell::RefCell<SymbolTable>>>,
    store: HashMap<String, Symbol>,
    pub free_symbols: Vec<Symbol>,
    num_definitions: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            outer: None,
            store: HashMap::new(),
            free_symbols: Vec::new(),
            num_definitions: 0,
        }
    }

    /// A root scope with every built-in pre-registered, as every backend entry
    /// point (the one-shot compiler and the REPL's persistent session state) needs.
    pub fn new_with_builtins() -> Self {
        let mut table = SymbolTable::new();
        for (i, name) in crate::builtins::BUILTIN_NAMES.iter().enumerate() {
            table.define_builtin(i, name);
        }
        table
    }

    pub fn new_enclosed(outer: Rc<std::cell::RefCell<SymbolTable>>) -> Self {
        SymbolTable {
            outer: Some(outer),
            store: HashMap::new(),
            free_symbols: Vec::new(),
            num_definitions: 0,
        }
    }

    /// Defines `name` as Global if this is the root scope, Local otherwise.
    pub fn define(&mut self, name: &str) -> Symbol {
        let scope = if self.outer.is_none() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };
        let symbol = Symbol {
            name: name.to_string(),
            scope,
            index: self.num_definitions,
        };
        self.store.insert(name.to_string(), symbol.clone());
        self.num_definitions += 1;
        symbol
    }

    /// Pre-declares a function's own name (for recursive self-reference via `CurrentClosure`).
    pub fn define_function_name(&mut self, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Function,
            index: 0,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    pub fn define_builtin(&mut self, index: usize, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Builtin,
            index,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Resolves `name`, promoting an enclosing Local/Free binding to Free in
    /// every scope between its definition and the current one.
    pub fn resolve(&mut self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.store.get(name) {
            return Some(symbol.clone());
        }

        let outer = self.outer.clone()?;
        let resolved = outer.borrow_mut().resolve(name)?;

        match resolved.scope {
            SymbolScope::Global | SymbolScope::Builtin => Some(resolved),
            _ => Some(self.define_free(resolved)),
        }
    }

    fn define_free(&mut self, original: Symbol) -> Symbol {
        self.free_symbols.push(original.clone());
        let symbol = Symbol {
            name: original.name.clone(),
            scope: SymbolScope::Free,
            index: self.free_symbols.len() - 1,
        };
        self.store.insert(original.name, symbol.clone());
        symbol
    }

    pub fn num_definitions(&self) -> usize {
        self.num_definitions
    }

    /// The enclosing scope, if any — used by the compiler to pop back out
    /// of a function literal's scope once it's done compiling the body.
    pub fn outer(&self) -> Option<Rc<std::cell::RefCell<SymbolTable>>> {
        self.outer.clone()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
