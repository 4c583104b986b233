// ABOUTME: AST node types produced by the parser

use crate::token::Token;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Type(TypeStatement),
    ObjectBlock(ObjectBlockStatement),
    Block(BlockStatement),
    Expression(ExpressionStatement),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(s) => write!(f, "{}", s),
            Statement::Return(s) => write!(f, "{}", s),
            Statement::Type(s) => write!(f, "{}", s),
            Statement::ObjectBlock(s) => write!(f, "{}", s),
            Statement::Block(s) => write!(f, "{}", s),
            Statement::Expression(s) => write!(f, "{}", s),
        }
    }
}

impl Statement {
    pub fn token_literal(&self) -> &str {
        match self {
            Statement::Let(s) => &s.token.literal,
            Statement::Return(s) => &s.token.literal,
            Statement::Type(s) => &s.token.literal,
            Statement::ObjectBlock(s) => &s.token.literal,
            Statement::Block(s) => &s.token.literal,
            Statement::Expression(s) => &s.token.literal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LetStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

impl fmt::Display for LetStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "let {} = {};", self.name, self.value)
    }
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub token: Token,
    pub return_value: Option<Expression>,
}

impl fmt::Display for ReturnStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "return")?;
        if let Some(v) = &self.return_value {
            write!(f, " {}", v)?;
        }
        write!(f, ";")
    }
}

/// `type Name struct { ... }` — currently the only supported type kind is `struct`.
#[derive(Debug, Clone)]
pub struct TypeStatement {
    pub token: Token,
    pub name: Identifier,
    pub type_kind: Identifier,
    pub body: ObjectBlockStatement,
}

impl fmt::Display for TypeStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type {} {} {{\n{}}}",
            self.name, self.type_kind, self.body
        )
    }
}

/// Body of a type declaration.
#[derive(Debug, Clone)]
pub struct ObjectBlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl fmt::Display for ObjectBlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub token: Token,
    pub expression: Expression,
}

impl fmt::Display for ExpressionStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

#[derive(Debug, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(IntegerLiteral),
    StringLiteral(StringLiteral),
    Boolean(BooleanLiteral),
    Null(Token),
    ArrayLiteral(ArrayLiteral),
    HashLiteral(HashLiteral),
    Index(IndexExpression),
    Prefix(PrefixExpression),
    Infix(InfixExpression),
    If(IfExpression),
    For(ForExpression),
    FunctionLiteral(FunctionLiteral),
    Call(CallExpression),
    TypeIdentifier(TypeIdentifierExpression),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(e) => write!(f, "{}", e),
            Expression::IntegerLiteral(e) => write!(f, "{}", e),
            Expression::StringLiteral(e) => write!(f, "{}", e),
            Expression::Boolean(e) => write!(f, "{}", e),
            Expression::Null(_) => write!(f, "null"),
            Expression::ArrayLiteral(e) => write!(f, "{}", e),
            Expression::HashLiteral(e) => write!(f, "{}", e),
            Expression::Index(e) => write!(f, "{}", e),
            Expression::Prefix(e) => write!(f, "{}", e),
            Expression::Infix(e) => write!(f, "{}", e),
            Expression::If(e) => write!(f, "{}", e),
            Expression::For(e) => write!(f, "{}", e),
            Expression::FunctionLiteral(e) => write!(f, "{}", e),
            Expression::Call(e) => write!(f, "{}", e),
            Expression::TypeIdentifier(e) => write!(f, "{}", e),
        }
    }
}

impl Expression {
    pub fn token_literal(&self) -> &str {
        match self {
            Expression::Identifier(e) => &e.token.literal,
            Expression::IntegerLiteral(e) => &e.token.literal,
            Expression::StringLiteral(e) => &e.token.literal,
            Expression::Boolean(e) => &e.token.literal,
            Expression::Null(t) => &t.literal,
            Expression::ArrayLiteral(e) => &e.token.literal,
            Expression::HashLiteral(e) => &e.token.literal,
            Expression::Index(e) => &e.token.literal,
            Expression::Prefix(e) => &e.token.literal,
            Expression::Infix(e) => &e.token.literal,
            Expression::If(e) => &e.token.literal,
            Expression::For(e) => &e.token.literal,
            Expression::FunctionLiteral(e) => &e.token.literal,
            Expression::Call(e) => &e.token.literal,
            Expression::TypeIdentifier(e) => &e.token.literal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone)]
pub struct IntegerLiteral {
    pub token: Token,
    pub value: i64,
}

impl fmt::Display for IntegerLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.literal)
    }
}

#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub token: Token,
    pub value: String,
}

impl fmt::Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.literal)
    }
}

#[derive(Debug, Clone)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

impl fmt::Display for BooleanLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.literal)
    }
}

#[derive(Debug, Clone)]
pub struct ArrayLiteral {
    pub token: Token,
    pub elements: Vec<Expression>,
}

impl fmt::Display for ArrayLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.elements.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", items.join(", "))
    }
}

#[derive(Debug, Clone)]
pub struct HashLiteral {
    pub token: Token,
    pub pairs: Vec<(Expression, Expression)>,
}

impl fmt::Display for HashLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect();
        write!(f, "{{{}}}", items.join(", "))
    }
}

#[derive(Debug, Clone)]
pub struct IndexExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

impl fmt::Display for IndexExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

#[derive(Debug, Clone)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: String,
    pub right: Box<Expression>,
}

impl fmt::Display for PrefixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{})", self.operator, self.right)
    }
}

#[derive(Debug, Clone)]
pub struct InfixExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub operator: String,
    pub right: Box<Expression>,
}

impl fmt::Display for InfixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

#[derive(Debug, Clone)]
pub struct IfExpression {
    pub token: Token,
    pub condition: Box<Expression>,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

impl fmt::Display for IfExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if{} {{ {} }}", self.condition, self.consequence)?;
        if let Some(alt) = &self.alternative {
            write!(f, " else {{ {} }}", alt)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ForExpression {
    pub token: Token,
    pub init: Box<Statement>,
    pub condition: Box<Expression>,
    pub increment: Box<Expression>,
    pub body: BlockStatement,
}

impl fmt::Display for ForExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "for ({} {}; {}) {{ {} }}",
            self.init, self.condition, self.increment, self.body
        )
    }
}

#[derive(Debug, Clone)]
pub struct FunctionLiteral {
    pub token: Token,
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    /// Set by the parser when the literal is the value of a `let` binding,
    /// enabling recursion and giving the compiler a name for `CurrentClosure`.
    pub name: Option<String>,
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", self.token.literal)?;
        if let Some(name) = &self.name {
            write!(f, "<{}>", name)?;
        }
        write!(f, "({}) {{ {} }}", params.join(", "), self.body)
    }
}

#[derive(Debug, Clone)]
pub struct CallExpression {
    pub token: Token,
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
}

impl fmt::Display for CallExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.function, args.join(", "))
    }
}

/// A type used as a declarator, e.g. `Point p` binds `p` as an instance of `Point`.
#[derive(Debug, Clone)]
pub struct TypeIdentifierExpression {
    pub token: Token,
    pub type_name: Identifier,
    pub variable: Box<Expression>,
}

impl fmt::Display for TypeIdentifierExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name, self.variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn test_let_statement_string() {
        let program = Program {
            statements: vec![Statement::Let(LetStatement {
                token: Token::new(TokenKind::Let, "let", 1),
                name: Identifier {
                    token: Token::new(TokenKind::Ident, "myVar", 1),
                    value: "myVar".to_string(),
                },
                value: Expression::Identifier(Identifier {
                    token: Token::new(TokenKind::Ident, "anotherVar", 1),
                    value: "anotherVar".to_string(),
                }),
            })],
        };

        assert_eq!(program.to_string(), "let myVar = anotherVar;");
    }

    #[test]
    fn test_infix_precedence_display() {
        let expr = Expression::Infix(InfixExpression {
            token: Token::new(TokenKind::Plus, "+", 1),
            left: Box::new(Expression::Identifier(Identifier {
                token: Token::new(TokenKind::Ident, "a", 1),
                value: "a".to_string(),
            })),
            operator: "+".to_string(),
            right: Box::new(Expression::Infix(InfixExpression {
                token: Token::new(TokenKind::Asterisk, "*", 1),
                left: Box::new(Expression::Identifier(Identifier {
                    token: Token::new(TokenKind::Ident, "b", 1),
                    value: "b".to_string(),
                })),
                operator: "*".to_string(),
                right: Box::new(Expression::Identifier(Identifier {
                    token: Token::new(TokenKind::Ident, "c", 1),
                    value: "c".to_string(),
                })),
            })),
        });

        assert_eq!(expr.to_string(), "(a + (b * c))");
    }
}
