// ABOUTME: Lexical scopes: a value store plus a nested type store for struct declarations

use crate::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct Environment {
    store: RefCell<HashMap<String, Rc<Object>>>,
    types: RefCell<HashMap<String, Rc<Environment>>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            types: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    /// Creates a new child environment enclosed by `outer`.
    pub fn with_outer(outer: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            types: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    /// Binds `name` in this scope (doesn't walk the parent chain).
    pub fn set(&self, name: String, value: Rc<Object>) {
        self.store.borrow_mut().insert(name, value);
    }

    /// Looks up `name` in this scope and parent scopes, cascading outward.
    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        if let Some(value) = self.store.borrow().get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.get(name))
    }

    /// Rebinds an existing name by walking outward; returns `false` if the
    /// name is bound nowhere in the chain (the caller then binds fresh in
    /// the innermost scope, per the language's assignment semantics).
    pub fn assign(&self, name: &str, value: Rc<Object>) -> bool {
        if self.store.borrow().contains_key(name) {
            self.store.borrow_mut().insert(name.to_string(), value);
            return true;
        }
        match &self.outer {
            Some(outer) => outer.assign(name, value),
            None => false,
        }
    }

    /// Declares a fresh child environment as the scope for a `type ... struct { }`.
    pub fn define_type(&self, name: &str) -> Rc<Environment> {
        let scope = Environment::new();
        self.types.borrow_mut().insert(name.to_string(), scope.clone());
        scope
    }

    /// Looks up a type scope by name, cascading outward.
    pub fn get_type(&self, name: &str) -> Option<Rc<Environment>> {
        if let Some(scope) = self.types.borrow().get(name) {
            return Some(scope.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.get_type(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let env = Environment::new();
        env.set("x".to_string(), Rc::new(Object::Integer(42)));
        match env.get("x").as_deref() {
            Some(Object::Integer(n)) => assert_eq!(*n, 42),
            _ => panic!("expected Integer(42)"),
        }
    }

    #[test]
    fn test_undefined_identifier() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn test_shadowing() {
        let parent = Environment::new();
        parent.set("x".to_string(), Rc::new(Object::Integer(1)));

        let child = Environment::with_outer(parent);
        child.set("x".to_string(), Rc::new(Object::Integer(2)));

        match child.get("x").as_deref() {
            Some(Object::Integer(n)) => assert_eq!(*n, 2),
            _ => panic!("expected Integer(2)"),
        }
    }

    #[test]
    fn test_outer_lookup() {
        let parent = Environment::new();
        parent.set("x".to_string(), Rc::new(Object::Integer(7)));

        let child = Environment::with_outer(parent);
        match child.get("x").as_deref() {
            Some(Object::Integer(n)) => assert_eq!(*n, 7),
            _ => panic!("expected Integer(7)"),
        }
    }

    #[test]
    fn test_assign_rebinds_in_defining_scope() {
        let parent = Environment::new();
        parent.set("x".to_string(), Rc::new(Object::Integer(1)));

        let child = Environment::with_outer(parent.clone());
        assert!(child.assign("x", Rc::new(Object::Integer(99))));

        // Visible from the parent too: assignment rebinds the existing
        // binding in place, it doesn't shadow it locally.
        match parent.get("x").as_deref() {
            Some(Object::Integer(n)) => assert_eq!(*n, 99),
            _ => panic!("expected Integer(99)"),
        }
    }

    #[test]
    fn test_assign_to_undefined_name_fails() {
        let env = Environment::new();
        assert!(!env.assign("missing", Rc::new(Object::Integer(1))));
    }

    #[test]
    fn test_type_scope_roundtrip() {
        let env = Environment::new();
        let type_scope = env.define_type("Point");
        type_scope.set("x".to_string(), Rc::new(Object::Integer(0)));

        let looked_up = env.get_type("Point").expect("type scope registered");
        match looked_up.get("x").as_deref() {
            Some(Object::Integer(n)) => assert_eq!(*n, 0),
            _ => panic!("expected Integer(0)"),
        }
    }

    #[test]
    fn test_type_scope_visible_from_child_env() {
        let env = Environment::new();
        env.define_type("Point");

        let child = Environment::with_outer(env);
        assert!(child.get_type("Point").is_some());
    }
}
