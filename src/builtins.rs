// ABOUTME: The fixed set of built-in functions consulted as an identifier-lookup fallback

use crate::error::EvalError;
use crate::object::Object;
use std::rc::Rc;

/// Looks up a built-in by name. Called by the evaluator only after the
/// environment chain has failed to resolve the identifier, and by the
/// compiler/VM at `GetBuiltin` resolution time via [`BUILTIN_NAMES`].
pub fn lookup(name: &str) -> Option<Object> {
    BUILTIN_NAMES
        .iter()
        .position(|&n| n == name)
        .map(|i| Object::Builtin(BUILTIN_FNS[i]))
}

/// Looks up a built-in's index by name, used by the compiler to emit
/// `GetBuiltin <index>` with the same ordering the VM resolves against.
pub fn index_of(name: &str) -> Option<u8> {
    BUILTIN_NAMES.iter().position(|&n| n == name).map(|i| i as u8)
}

/// Returns the built-in at `index`, used by the VM's `GetBuiltin` handler.
pub fn at(index: u8) -> Option<Object> {
    BUILTIN_FNS.get(index as usize).map(|f| Object::Builtin(*f))
}

pub const BUILTIN_NAMES: [&str; 8] = ["len", "first", "last", "rest", "push", "puts", "int", "string"];

const BUILTIN_FNS: [crate::object::BuiltinFn; 8] = [
    builtin_len,
    builtin_first,
    builtin_last,
    builtin_rest,
    builtin_push,
    builtin_puts,
    builtin_int,
    builtin_string,
];

fn wrong_args(expected: usize, got: usize) -> EvalError {
    EvalError::WrongArgumentCount { expected, got }
}

fn builtin_len(args: &[Rc<Object>]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(wrong_args(1, args.len()));
    }
    match args[0].as_ref() {
        Object::String(s) => Ok(Object::Integer(s.len() as i64)),
        Object::Array(elements) => Ok(Object::Integer(elements.len() as i64)),
        Object::Hash(pairs) => Ok(Object::Integer(pairs.len() as i64)),
        other => Err(EvalError::Custom(format!(
            "argument to `len` not supported, got {}",
            other.object_type().name()
        ))),
    }
}

fn builtin_first(args: &[Rc<Object>]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(wrong_args(1, args.len()));
    }
    match args[0].as_ref() {
        Object::Array(elements) => Ok(elements.first().map(|e| (**e).clone()).unwrap_or(Object::Null)),
        other => Err(EvalError::Custom(format!(
            "argument to `first` must be ARRAY, got {}",
            other.object_type().name()
        ))),
    }
}

fn builtin_last(args: &[Rc<Object>]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(wrong_args(1, args.len()));
    }
    match args[0].as_ref() {
        Object::Array(elements) => Ok(elements.last().map(|e| (**e).clone()).unwrap_or(Object::Null)),
        other => Err(EvalError::Custom(format!(
            "argument to `last` must be ARRAY, got {}",
            other.object_type().name()
        ))),
    }
}

fn builtin_rest(args: &[Rc<Object>]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(wrong_args(1, args.len()));
    }
    match args[0].as_ref() {
        Object::Array(elements) => {
            if elements.is_empty() {
                Ok(Object::Null)
            } else {
                Ok(Object::Array(elements[1..].to_vec()))
            }
        }
        other => Err(EvalError::Custom(format!(
            "argument to `rest` must be ARRAY, got {}",
            other.object_type().name()
        ))),
    }
}

fn builtin_push(args: &[Rc<Object>]) -> Result<Object, EvalError> {
    if args.len() != 2 {
        return Err(wrong_args(2, args.len()));
    }
    match args[0].as_ref() {
        Object::Array(elements) => {
            let mut new_elements = elements.clone();
            new_elements.push(args[1].clone());
            Ok(Object::Array(new_elements))
        }
        other => Err(EvalError::Custom(format!(
            "argument to `push` must be ARRAY, got {}",
            other.object_type().name()
        ))),
    }
}

fn builtin_puts(args: &[Rc<Object>]) -> Result<Object, EvalError> {
    for arg in args {
        println!("{}", arg.inspect());
    }
    Ok(Object::Null)
}

fn builtin_int(args: &[Rc<Object>]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(wrong_args(1, args.len()));
    }
    match args[0].as_ref() {
        Object::Integer(i) => Ok(Object::Integer(*i)),
        Object::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Object::Integer)
            .map_err(|_| EvalError::Custom(format!("could not parse `{}` as integer", s))),
        other => Err(EvalError::Custom(format!(
            "argument to `int` not supported, got {}",
            other.object_type().name()
        ))),
    }
}

fn builtin_string(args: &[Rc<Object>]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(wrong_args(1, args.len()));
    }
    match args[0].as_ref() {
        Object::Integer(i) => Ok(Object::String(i.to_string())),
        other => Err(EvalError::Custom(format!(
            "argument to `string` not supported, got {}",
            other.object_type().name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Rc<Object>]) -> Result<Object, EvalError> {
        match lookup(name).expect("builtin exists") {
            Object::Builtin(f) => f(args),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_len_string_and_array() {
        assert_eq!(
            call("len", &[Rc::new(Object::String("hello".into()))]).unwrap().to_string(),
            "5"
        );
        assert_eq!(
            call(
                "len",
                &[Rc::new(Object::Array(vec![
                    Rc::new(Object::Integer(1)),
                    Rc::new(Object::Integer(2)),
                    Rc::new(Object::Integer(3)),
                ]))]
            )
            .unwrap()
            .to_string(),
            "3"
        );
    }

    #[test]
    fn test_first_last_rest() {
        let arr = Rc::new(Object::Array(vec![
            Rc::new(Object::Integer(1)),
            Rc::new(Object::Integer(2)),
            Rc::new(Object::Integer(3)),
        ]));
        assert_eq!(call("first", &[arr.clone()]).unwrap().to_string(), "1");
        assert_eq!(call("last", &[arr.clone()]).unwrap().to_string(), "3");
        assert_eq!(call("rest", &[arr]).unwrap().to_string(), "[2, 3]");
    }

    #[test]
    fn test_rest_of_empty_array_is_null() {
        assert_eq!(call("rest", &[Rc::new(Object::Array(vec![]))]).unwrap().to_string(), "null");
    }

    #[test]
    fn test_push_does_not_mutate() {
        let original = vec![Rc::new(Object::Integer(1))];
        let arr = Rc::new(Object::Array(original.clone()));
        let pushed = call("push", &[arr.clone(), Rc::new(Object::Integer(2))]).unwrap();
        assert_eq!(pushed.to_string(), "[1, 2]");
        match arr.as_ref() {
            Object::Array(elements) => assert_eq!(elements.len(), 1),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_int_parses_string() {
        assert_eq!(call("int", &[Rc::new(Object::String("42".into()))]).unwrap().to_string(), "42");
    }

    #[test]
    fn test_string_renders_integer() {
        assert_eq!(call("string", &[Rc::new(Object::Integer(42))]).unwrap().to_string(), "42");
    }

    #[test]
    fn test_len_wrong_arity() {
        assert!(call("len", &[]).is_err());
    }

    #[test]
    fn test_lookup_unknown_name() {
        assert!(lookup("nope").is_none());
    }

    #[test]
    fn test_index_of_matches_names_order() {
        assert_eq!(index_of("len"), Some(0));
        assert_eq!(index_of("string"), Some(7));
        assert_eq!(index_of("nope"), None);
    }
}
