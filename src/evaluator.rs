// ABOUTME: Tree-walking evaluator: Eval(node, env) -> Object

use crate::ast::{
    BlockStatement, Expression, ForExpression, IfExpression, InfixExpression, PrefixExpression,
    Program, Statement, TypeIdentifierExpression, TypeStatement,
};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::object::{HashKey, HashPair, Object};
use std::collections::HashMap;
use std::rc::Rc;

fn error(msg: impl Into<String>) -> Rc<Object> {
    Rc::new(Object::Error(msg.into()))
}

fn is_error(obj: &Object) -> bool {
    obj.is_error()
}

/// Entry point: evaluates a whole program, unwrapping a top-level `ReturnValue`.
pub fn eval_program(program: &Program, env: &Rc<Environment>) -> Rc<Object> {
    let mut result = Rc::new(Object::Null);
    for stmt in &program.statements {
        result = eval_statement(stmt, env);
        match result.as_ref() {
            Object::ReturnValue(v) => return v.clone(),
            Object::Error(_) => return result,
            _ => {}
        }
    }
    result
}

/// Evaluates a brace-delimited block. Unlike `eval_program`, a `ReturnValue`
/// is *not* unwrapped here — it must bubble up through nested blocks until
/// the enclosing function call or the top level unwraps it.
fn eval_block_statement(block: &BlockStatement, env: &Rc<Environment>) -> Rc<Object> {
    let mut result = Rc::new(Object::Null);
    for stmt in &block.statements {
        result = eval_statement(stmt, env);
        if matches!(result.as_ref(), Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }
    result
}

fn eval_statement(stmt: &Statement, env: &Rc<Environment>) -> Rc<Object> {
    match stmt {
        Statement::Let(s) => {
            let value = eval_expression(&s.value, env);
            if is_error(&value) {
                return value;
            }
            env.set(s.name.value.clone(), value);
            Rc::new(Object::Null)
        }
        Statement::Return(s) => match &s.return_value {
            Some(expr) => {
                let value = eval_expression(expr, env);
                if is_error(&value) {
                    return value;
                }
                Rc::new(Object::ReturnValue(value))
            }
            None => Rc::new(Object::ReturnValue(Rc::new(Object::Null))),
        },
        Statement::Type(s) => eval_type_statement(s, env),
        Statement::ObjectBlock(s) => {
            let mut result = Rc::new(Object::Null);
            for inner in &s.statements {
                result = eval_statement(inner, env);
                if is_error(&result) {
                    return result;
                }
            }
            result
        }
        Statement::Block(b) => eval_block_statement(b, env),
        Statement::Expression(s) => eval_expression(&s.expression, env),
    }
}

fn eval_type_statement(stmt: &TypeStatement, env: &Rc<Environment>) -> Rc<Object> {
    let scope = env.define_type(&stmt.name.value);
    for inner in &stmt.body.statements {
        let result = eval_statement(inner, &scope);
        if is_error(&result) {
            return result;
        }
    }
    Rc::new(Object::Null)
}

fn eval_expression(expr: &Expression, env: &Rc<Environment>) -> Rc<Object> {
    match expr {
        Expression::IntegerLiteral(lit) => Rc::new(Object::Integer(lit.value)),
        Expression::StringLiteral(lit) => Rc::new(Object::String(lit.value.clone())),
        Expression::Boolean(lit) => Rc::new(Object::Boolean(lit.value)),
        Expression::Null(_) => Rc::new(Object::Null),
        Expression::Identifier(ident) => {
            if let Some(value) = env.get(&ident.value) {
                return value;
            }
            if let Some(builtin) = crate::builtins::lookup(&ident.value) {
                return Rc::new(builtin);
            }
            error(EvalError::IdentifierNotFound(ident.value.clone()).to_string())
        }
        Expression::Prefix(expr) => eval_prefix_expression(expr, env),
        Expression::Infix(expr) => eval_infix_expression(expr, env),
        Expression::If(expr) => eval_if_expression(expr, env),
        Expression::For(expr) => eval_for_expression(expr, env),
        Expression::FunctionLiteral(lit) => Rc::new(Object::Function {
            parameters: lit.parameters.clone(),
            body: lit.body.clone(),
            env: env.clone(),
        }),
        Expression::Call(call) => eval_call_expression(call, env),
        Expression::ArrayLiteral(lit) => {
            let elements = eval_expressions(&lit.elements, env);
            match elements {
                Ok(elements) => Rc::new(Object::Array(elements)),
                Err(e) => e,
            }
        }
        Expression::HashLiteral(lit) => eval_hash_literal(lit, env),
        Expression::Index(expr) => {
            let left = eval_expression(&expr.left, env);
            if is_error(&left) {
                return left;
            }
            let index = eval_expression(&expr.index, env);
            if is_error(&index) {
                return index;
            }
            eval_index_expression(&left, &index)
        }
        Expression::TypeIdentifier(expr) => eval_type_identifier(expr, env),
    }
}

fn eval_expressions(exprs: &[Expression], env: &Rc<Environment>) -> Result<Vec<Rc<Object>>, Rc<Object>> {
    let mut result = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let value = eval_expression(expr, env);
        if is_error(&value) {
            return Err(value);
        }
        result.push(value);
    }
    Ok(result)
}

fn eval_prefix_expression(expr: &PrefixExpression, env: &Rc<Environment>) -> Rc<Object> {
    let right = eval_expression(&expr.right, env);
    if is_error(&right) {
        return right;
    }
    match expr.operator.as_str() {
        "!" => Rc::new(Object::Boolean(!right.is_truthy())),
        "-" => match right.as_ref() {
            Object::Integer(i) => Rc::new(Object::Integer(i.wrapping_neg())),
            other => error(format!("unknown operator: -{}", other.object_type().name())),
        },
        op => error(format!(
            "unknown operator: {}{}",
            op,
            right.object_type().name()
        )),
    }
}

fn eval_infix_expression(expr: &InfixExpression, env: &Rc<Environment>) -> Rc<Object> {
    if expr.operator == "=" {
        return eval_assignment(expr, env);
    }

    let left = eval_expression(&expr.left, env);
    if is_error(&left) {
        return left;
    }
    let right = eval_expression(&expr.right, env);
    if is_error(&right) {
        return right;
    }

    match (left.as_ref(), right.as_ref()) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix(&expr.operator, *l, *r),
        (Object::String(l), Object::String(r)) => eval_string_infix(&expr.operator, l, r),
        (Object::Boolean(l), Object::Boolean(r)) => match expr.operator.as_str() {
            "==" => Rc::new(Object::Boolean(l == r)),
            "!=" => Rc::new(Object::Boolean(l != r)),
            op => error(format!("unknown operator: BOOLEAN {} BOOLEAN", op)),
        },
        (l, r) if l.object_type() != r.object_type() => error(format!(
            "type mismatch: {} {} {}",
            l.object_type().name(),
            expr.operator,
            r.object_type().name()
        )),
        (l, r) => error(format!(
            "unknown operator: {} {} {}",
            l.object_type().name(),
            expr.operator,
            r.object_type().name()
        )),
    }
}

fn eval_integer_infix(operator: &str, left: i64, right: i64) -> Rc<Object> {
    match operator {
        "+" => Rc::new(Object::Integer(left.wrapping_add(right))),
        "-" => Rc::new(Object::Integer(left.wrapping_sub(right))),
        "*" => Rc::new(Object::Integer(left.wrapping_mul(right))),
        "/" => {
            if right == 0 {
                error("division by zero")
            } else {
                Rc::new(Object::Integer(left.wrapping_div(right)))
            }
        }
        "<" => Rc::new(Object::Boolean(left < right)),
        ">" => Rc::new(Object::Boolean(left > right)),
        "==" => Rc::new(Object::Boolean(left == right)),
        "!=" => Rc::new(Object::Boolean(left != right)),
        op => error(format!("unknown operator: INTEGER {} INTEGER", op)),
    }
}

fn eval_string_infix(operator: &str, left: &str, right: &str) -> Rc<Object> {
    match operator {
        "+" => Rc::new(Object::String(format!("{}{}", left, right))),
        "==" => Rc::new(Object::Boolean(left == right)),
        "!=" => Rc::new(Object::Boolean(left != right)),
        op => error(format!("unknown operator: STRING {} STRING", op)),
    }
}

/// `<ident> = <expr>`: the left side must be a plain identifier; the value
/// rebinds an existing name outward through the scope chain, or else binds
/// fresh in the innermost scope.
fn eval_assignment(expr: &InfixExpression, env: &Rc<Environment>) -> Rc<Object> {
    let name = match expr.left.as_ref() {
        Expression::Identifier(ident) => ident.value.clone(),
        other => return error(format!("invalid assignment target: {}", other)),
    };

    let value = eval_expression(&expr.right, env);
    if is_error(&value) {
        return value;
    }

    if !env.assign(&name, value.clone()) {
        env.set(name, value.clone());
    }
    value
}

fn eval_if_expression(expr: &IfExpression, env: &Rc<Environment>) -> Rc<Object> {
    let condition = eval_expression(&expr.condition, env);
    if is_error(&condition) {
        return condition;
    }
    if condition.is_truthy() {
        eval_block_statement(&expr.consequence, env)
    } else if let Some(alt) = &expr.alternative {
        eval_block_statement(alt, env)
    } else {
        Rc::new(Object::Null)
    }
}

fn eval_for_expression(expr: &ForExpression, env: &Rc<Environment>) -> Rc<Object> {
    let loop_env = Environment::with_outer(env.clone());

    let init = eval_statement(&expr.init, &loop_env);
    if is_error(&init) {
        return init;
    }

    loop {
        let condition = eval_expression(&expr.condition, &loop_env);
        if is_error(&condition) {
            return condition;
        }
        if !condition.is_truthy() {
            break;
        }

        let body_result = eval_block_statement(&expr.body, &loop_env);
        if matches!(body_result.as_ref(), Object::ReturnValue(_) | Object::Error(_)) {
            return body_result;
        }

        let increment = eval_expression(&expr.increment, &loop_env);
        if is_error(&increment) {
            return increment;
        }
    }

    Rc::new(Object::Null)
}

fn eval_call_expression(call: &crate::ast::CallExpression, env: &Rc<Environment>) -> Rc<Object> {
    let function = eval_expression(&call.function, env);
    if is_error(&function) {
        return function;
    }

    let args = match eval_expressions(&call.arguments, env) {
        Ok(args) => args,
        Err(e) => return e,
    };

    apply_function(&function, &args)
}

fn apply_function(function: &Rc<Object>, args: &[Rc<Object>]) -> Rc<Object> {
    match function.as_ref() {
        Object::Function {
            parameters,
            body,
            env,
        } => {
            if parameters.len() != args.len() {
                return error(format!(
                    "wrong number of arguments: want {}, got {}",
                    parameters.len(),
                    args.len()
                ));
            }
            let call_env = Environment::with_outer(env.clone());
            for (param, arg) in parameters.iter().zip(args.iter()) {
                call_env.set(param.value.clone(), arg.clone());
            }
            let result = eval_block_statement(body, &call_env);
            match result.as_ref() {
                Object::ReturnValue(v) => v.clone(),
                _ => result,
            }
        }
        Object::Builtin(f) => match f(args) {
            Ok(obj) => Rc::new(obj),
            Err(e) => error(e.to_string()),
        },
        other => error(EvalError::NotAFunction(other.object_type().name()).to_string()),
    }
}

fn eval_hash_literal(lit: &crate::ast::HashLiteral, env: &Rc<Environment>) -> Rc<Object> {
    let mut pairs = HashMap::new();
    for (key_expr, value_expr) in &lit.pairs {
        let key = eval_expression(key_expr, env);
        if is_error(&key) {
            return key;
        }
        let hash_key = match key.hash_key() {
            Some(hk) => hk,
            None => return error(format!("unusable as hash key: {}", key.object_type().name())),
        };
        let value = eval_expression(value_expr, env);
        if is_error(&value) {
            return value;
        }
        pairs.insert(hash_key, HashPair { key, value });
    }
    Rc::new(Object::Hash(pairs))
}

fn eval_index_expression(left: &Rc<Object>, index: &Rc<Object>) -> Rc<Object> {
    match (left.as_ref(), index.as_ref()) {
        (Object::Array(elements), Object::Integer(i)) => {
            if *i < 0 || *i as usize >= elements.len() {
                Rc::new(Object::Null)
            } else {
                elements[*i as usize].clone()
            }
        }
        (Object::Hash(pairs), _) => match index.hash_key() {
            Some(key) => match pairs.get(&HashKey {
                kind: key.kind,
                value: key.value,
            }) {
                Some(pair) => pair.value.clone(),
                None => Rc::new(Object::Null),
            },
            None => Rc::new(Object::Null),
        },
        (l, _) => error(format!("index operator not supported: {}", l.object_type().name())),
    }
}

/// `T v` — declares `v` as a Struct sharing the type scope named by `T`.
fn eval_type_identifier(expr: &TypeIdentifierExpression, env: &Rc<Environment>) -> Rc<Object> {
    let type_name = &expr.type_name.value;
    let scope = match env.get_type(type_name) {
        Some(scope) => scope,
        None => return error(format!("undefined type: {}", type_name)),
    };

    let var_name = match expr.variable.as_ref() {
        Expression::Identifier(ident) => ident.value.clone(),
        other => return error(format!("invalid declarator: {}", other)),
    };

    let instance = Rc::new(Object::Struct {
        name: type_name.clone(),
        env: scope,
    });
    env.set(var_name, instance.clone());
    instance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(input: &str) -> Rc<Object> {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "parser errors: {:?}", parser.errors());
        let env = Environment::new();
        eval_program(&program, &env)
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(run("let a = 5; let b = a; let c = a + b + 5; c;").to_string(), "15");
    }

    #[test]
    fn test_function_call() {
        assert_eq!(run("let add = fn(x, y) { x + y; }; add(2, 3);").to_string(), "5");
    }

    #[test]
    fn test_closures_capture_environment() {
        assert_eq!(
            run("let makeAdder = fn(x) { fn(y) { x + y; }; }; let add2 = makeAdder(2); add2(3);")
                .to_string(),
            "5"
        );
    }

    #[test]
    fn test_for_loop_mutates_outer_binding() {
        assert_eq!(run("let a = 0; for (a = 0; a < 5; a = a + 1) {}; a;").to_string(), "5");
    }

    #[test]
    fn test_hash_index() {
        assert_eq!(run(r#"let h = {"foo": 5}; h["foo"];"#).to_string(), "5");
    }

    #[test]
    fn test_closures_share_mutable_state() {
        assert_eq!(
            run("let x = 1; let f = fn() { x = x + 2; }; f(); x;").to_string(),
            "3"
        );
    }

    #[test]
    fn test_if_else() {
        assert_eq!(run("if (false) { 1 } else { 2 };").to_string(), "2");
    }

    #[test]
    fn test_builtin_len_composition() {
        assert_eq!(run("len(\"hello\") + len([1,2,3]);").to_string(), "8");
    }

    #[test]
    fn test_identifier_not_found() {
        assert_eq!(run("foo;").to_string(), "ERROR: identifier not found: foo");
    }

    #[test]
    fn test_type_mismatch() {
        assert_eq!(run(r#"1 + "a";"#).to_string(), "ERROR: type mismatch: INTEGER + STRING");
    }

    #[test]
    fn test_unusable_hash_key() {
        assert_eq!(run("{[1]: 1};").to_string(), "ERROR: unusable as hash key: ARRAY");
    }

    #[test]
    fn test_array_index_out_of_range_is_null() {
        assert_eq!(run("[1, 2, 3][10];").to_string(), "null");
    }

    #[test]
    fn test_hash_index_missing_key_is_null() {
        assert_eq!(run(r#"{"a": 1}["b"];"#).to_string(), "null");
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(run("1 / 0;").to_string(), "ERROR: division by zero");
    }

    #[test]
    fn test_integer_arithmetic_wraps_on_overflow() {
        assert_eq!(
            run("9223372036854775807 + 1;").to_string(),
            i64::MIN.to_string()
        );
        assert_eq!(
            run("-9223372036854775807 - 2;").to_string(),
            i64::MAX.to_string()
        );
        assert_eq!(run("-(-9223372036854775807 - 1);").to_string(), i64::MIN.to_string());
    }

    #[test]
    fn test_arity_mismatch_is_error() {
        let result = run("let f = fn(x, y) { x + y; }; f(1);").to_string();
        assert_eq!(result, "ERROR: wrong number of arguments: want 2, got 1");
    }

    #[test]
    fn test_recursive_function_via_let_bound_name() {
        assert_eq!(
            run("let fact = fn(n) { if (n == 0) { 1 } else { n * fact(n - 1) } }; fact(5);")
                .to_string(),
            "120"
        );
    }

    #[test]
    fn test_struct_type_declaration() {
        let result = run("type Point struct { let x = 0; } Point p; p;").to_string();
        assert_eq!(result, "Point {}");
    }
}
