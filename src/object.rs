// ABOUTME: Runtime value types shared by the tree-walking evaluator and the VM

use crate::ast::{BlockStatement, Identifier};
use crate::code::Instructions;
use crate::environment::Environment;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Null,
    Array,
    Hash,
    Function,
    Closure,
    CompiledFunction,
    Builtin,
    ReturnValue,
    Error,
    Identifier,
    Struct,
}

impl ObjectType {
    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Null => "NULL",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Function => "FUNCTION",
            ObjectType::Closure => "CLOSURE",
            ObjectType::CompiledFunction => "COMPILED_FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::ReturnValue => "RETURN_VALUE",
            ObjectType::Error => "ERROR",
            ObjectType::Identifier => "IDENTIFIER",
            ObjectType::Struct => "STRUCT",
        }
    }
}

/// A hashable key: only Integer, Boolean, and String objects qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: ObjectType,
    pub value: u64,
}

pub type BuiltinFn = fn(&[Rc<Object>]) -> Result<Object, crate::error::EvalError>;

#[derive(Clone)]
pub struct HashPair {
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

#[derive(Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Vec<Rc<Object>>),
    Hash(HashMap<HashKey, HashPair>),
    Function {
        parameters: Vec<Identifier>,
        body: BlockStatement,
        env: Rc<Environment>,
    },
    Closure {
        func: Rc<CompiledFunction>,
        free: Vec<Rc<Object>>,
    },
    CompiledFunction(Rc<CompiledFunction>),
    Builtin(BuiltinFn),
    ReturnValue(Rc<Object>),
    Error(String),
    Identifier {
        name: String,
        value: Rc<Object>,
    },
    Struct {
        name: String,
        env: Rc<Environment>,
    },
}

#[derive(Debug)]
pub struct CompiledFunction {
    pub instructions: Instructions,
    pub num_locals: usize,
    pub num_parameters: usize,
}

impl Object {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Null => ObjectType::Null,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function { .. } => ObjectType::Function,
            Object::Closure { .. } => ObjectType::Closure,
            Object::CompiledFunction(_) => ObjectType::CompiledFunction,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::ReturnValue(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
            Object::Identifier { .. } => ObjectType::Identifier,
            Object::Struct { .. } => ObjectType::Struct,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// `false` and `null` are falsy; everything else (including `0`) is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(i) => Some(HashKey {
                kind: ObjectType::Integer,
                value: *i as u64,
            }),
            Object::Boolean(b) => Some(HashKey {
                kind: ObjectType::Boolean,
                value: if *b { 1 } else { 0 },
            }),
            Object::String(s) => Some(HashKey {
                kind: ObjectType::String,
                value: fnv1a64(s.as_bytes()),
            }),
            _ => None,
        }
    }

    pub fn inspect(&self) -> String {
        format!("{}", self)
    }
}

/// FNV-1a 64-bit hash, used for stable string hash keys.
fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(i) => write!(f, "{}", i),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::String(s) => write!(f, "{}", s),
            Object::Null => write!(f, "null"),
            Object::Array(elements) => {
                let items: Vec<String> = elements.iter().map(|e| e.inspect()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Object::Hash(pairs) => {
                let items: Vec<String> = pairs
                    .values()
                    .map(|p| format!("{}: {}", p.key.inspect(), p.value.inspect()))
                    .collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Object::Function { parameters, body, .. } => {
                let params: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                write!(f, "fn({}) {{\n{}\n}}", params.join(", "), body)
            }
            Object::Closure { func, .. } => write!(f, "Closure[{:p}]", Rc::as_ptr(func)),
            Object::CompiledFunction(func) => write!(f, "CompiledFunction[{:p}]", Rc::as_ptr(func)),
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::ReturnValue(v) => write!(f, "{}", v),
            Object::Error(msg) => write!(f, "ERROR: {}", msg),
            Object::Identifier { value, .. } => write!(f, "{}", value),
            Object::Struct { name, .. } => write!(f, "{} {{}}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_hash_key_equality() {
        let a = Object::Integer(5).hash_key().unwrap();
        let b = Object::Integer(5).hash_key().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_string_hash_key_equality() {
        let a = Object::String("hello".into()).hash_key().unwrap();
        let b = Object::String("hello".into()).hash_key().unwrap();
        let c = Object::String("world".into()).hash_key().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_boolean_hash_key() {
        assert_ne!(
            Object::Boolean(true).hash_key().unwrap(),
            Object::Boolean(false).hash_key().unwrap()
        );
    }

    #[test]
    fn test_non_hashable_has_no_key() {
        assert!(Object::Null.hash_key().is_none());
        assert!(Object::Array(vec![]).hash_key().is_none());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Object::Boolean(false).is_truthy());
        assert!(!Object::Null.is_truthy());
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::Boolean(true).is_truthy());
        assert!(Object::String(String::new()).is_truthy());
    }

    #[test]
    fn test_inspect_array() {
        let arr = Object::Array(vec![Rc::new(Object::Integer(1)), Rc::new(Object::Integer(2))]);
        assert_eq!(arr.inspect(), "[1, 2]");
    }
}
