// ABOUTME: Error types for the evaluator, compiler, and virtual machine

use thiserror::Error;

/// Runtime errors produced while evaluating or calling built-ins.
///
/// The evaluator's public contract returns `Object` (per the tree-walker's
/// `Eval(node, env) -> Object`), so `EvalError` is internal plumbing that
/// gets folded into `Object::Error` at the point a sub-evaluation fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: String,
        right: &'static str,
    },

    #[error("unknown operator: {operator}")]
    UnknownOperator {
        operator: String,
        operand: Option<&'static str>,
    },

    #[error("unusable as hash key: {0}")]
    UnusableHashKey(&'static str),

    #[error("not a function: {0}")]
    NotAFunction(&'static str),

    #[error("wrong number of arguments: want {expected}, got {got}")]
    WrongArgumentCount { expected: usize, got: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0}")]
    Custom(String),
}

/// Errors raised while compiling an AST to bytecode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("undefined variable: {0}")]
    UndefinedSymbol(String),

    #[error("too many free variables in closure (max 255)")]
    TooManyFreeVariables,

    #[error("unknown operator: {0}")]
    UnknownOperator(String),
}

/// Errors raised while running compiled bytecode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    #[error("stack overflow")]
    StackOverflow,

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("calling non-function and non-built-in")]
    NotCallable,

    #[error("{0}")]
    Custom(String),
}
