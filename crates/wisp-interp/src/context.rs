//! Lexical scopes. A [`Context`] is one scope frame; its `parent` link is
//! the scope a closure captured, not the caller's scope, so variable
//! lookup always walks lexically outward rather than up the call stack.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::Value;

#[derive(Default, Debug)]
pub struct SymbolTable {
    symbols: IndexMap<String, Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_local(&self, name: &str) -> Option<Value> {
        self.symbols.get(name).cloned()
    }

    pub fn set_value(&mut self, name: &str, value: Value) {
        self.symbols.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) {
        self.symbols.remove(name);
    }
}

#[derive(Debug)]
pub struct Context {
    pub display_name: String,
    pub parent: Option<Rc<Context>>,
    pub symbol_table: RefCell<SymbolTable>,
}

impl Context {
    pub fn new(display_name: impl Into<String>, parent: Option<Rc<Context>>) -> Rc<Context> {
        Rc::new(Context { display_name: display_name.into(), parent, symbol_table: RefCell::new(SymbolTable::new()) })
    }

    /// Walks from this scope outward to the root, the way the original
    /// interpreter's `SymbolTable.get` recurses through `self.parent`.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.symbol_table.borrow().get_local(name) {
            return Some(value);
        }
        self.parent.as_deref().and_then(|parent| parent.get(name))
    }

    pub fn set_local(&self, name: &str, value: Value) {
        self.symbol_table.borrow_mut().set_value(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parent_chain() {
        let root = Context::new("<program>", None);
        root.set_local("x", Value::int(1));
        let child = Context::new("inner", Some(root.clone()));
        assert!(matches!(child.get("x"), Some(Value::Number(_))));
    }

    #[test]
    fn set_local_never_touches_parent() {
        let root = Context::new("<program>", None);
        let child = Context::new("inner", Some(root.clone()));
        child.set_local("x", Value::int(1));
        assert!(root.get("x").is_none());
    }
}
