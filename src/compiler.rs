// ABOUTME: AST -> bytecode compiler with closure conversion and jump-patching

use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::code::{make, Instructions, Opcode};
use crate::error::CompileError;
use crate::object::{CompiledFunction, Object};
use crate::symbol_table::{SymbolScope, SymbolTable};
use std::cell::RefCell;
use std::rc::Rc;

pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Rc<Object>>,
}

#[derive(Clone, Copy)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

struct CompilationScope {
    instructions: Instructions,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
}

pub struct Compiler {
    constants: Rc<RefCell<Vec<Rc<Object>>>>,
    symbol_table: Rc<RefCell<SymbolTable>>,
    scopes: Vec<CompilationScope>,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler {
            constants: Rc::new(RefCell::new(Vec::new())),
            symbol_table: Rc::new(RefCell::new(SymbolTable::new_with_builtins())),
            scopes: vec![CompilationScope {
                instructions: Vec::new(),
                last_instruction: None,
                previous_instruction: None,
            }],
        }
    }

    /// Builds a compiler that continues on top of REPL state from a previous line.
    pub fn new_with_state(
        constants: Rc<RefCell<Vec<Rc<Object>>>>,
        symbol_table: Rc<RefCell<SymbolTable>>,
    ) -> Self {
        Compiler {
            constants,
            symbol_table,
            scopes: vec![CompilationScope {
                instructions: Vec::new(),
                last_instruction: None,
                previous_instruction: None,
            }],
        }
    }

    pub fn constants(&self) -> Rc<RefCell<Vec<Rc<Object>>>> {
        self.constants.clone()
    }

    pub fn symbol_table(&self) -> Rc<RefCell<SymbolTable>> {
        self.symbol_table.clone()
    }

    pub fn compile_program(&mut self, program: &Program) -> Result<(), CompileError> {
        for stmt in &program.statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.current_instructions().clone(),
            constants: self.constants.borrow().clone(),
        }
    }

    fn current_instructions(&self) -> &Instructions {
        &self.scopes.last().unwrap().instructions
    }

    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let ins = make(op, operands);
        let position = self.current_instructions().len();
        let scope = self.scopes.last_mut().unwrap();
        scope.instructions.extend(ins);
        scope.previous_instruction = scope.last_instruction;
        scope.last_instruction = Some(EmittedInstruction { opcode: op, position });
        position
    }

    fn last_instruction_is(&self, op: Opcode) -> bool {
        matches!(self.scopes.last().unwrap().last_instruction, Some(e) if e.opcode == op)
    }

    fn remove_last_pop(&mut self) {
        let scope = self.scopes.last_mut().unwrap();
        if let Some(last) = scope.last_instruction {
            scope.instructions.truncate(last.position);
            scope.last_instruction = scope.previous_instruction;
        }
    }

    /// Replaces the last emitted instruction's opcode, keeping its operands' byte width.
    fn replace_last_with_return_value(&mut self) {
        let scope = self.scopes.last_mut().unwrap();
        if let Some(last) = scope.last_instruction {
            let new_ins = make(Opcode::ReturnValue, &[]);
            scope.instructions[last.position..last.position + new_ins.len()]
                .copy_from_slice(&new_ins);
            scope.last_instruction = Some(EmittedInstruction {
                opcode: Opcode::ReturnValue,
                position: last.position,
            });
        }
    }

    fn change_operand(&mut self, position: usize, operand: usize) {
        let scope = self.scopes.last_mut().unwrap();
        let op = crate::code::Opcode::from_byte(scope.instructions[position]).unwrap();
        let new_ins = make(op, &[operand]);
        scope.instructions[position..position + new_ins.len()].copy_from_slice(&new_ins);
    }

    fn add_constant(&mut self, obj: Object) -> usize {
        self.constants.borrow_mut().push(Rc::new(obj));
        self.constants.borrow().len() - 1
    }

    fn enter_scope(&mut self) {
        let outer = self.symbol_table.clone();
        self.symbol_table = Rc::new(RefCell::new(SymbolTable::new_enclosed(outer)));
        self.scopes.push(CompilationScope {
            instructions: Vec::new(),
            last_instruction: None,
            previous_instruction: None,
        });
    }

    fn compile_statement(&mut self, stmt: &Statement) -> Result<(), CompileError> {
        match stmt {
            Statement::Let(s) => {
                let symbol = self.symbol_table.borrow_mut().define(&s.name.value);
                self.compile_expression(&s.value)?;
                match symbol.scope {
                    SymbolScope::Global => self.emit(Opcode::SetGlobal, &[symbol.index]),
                    _ => self.emit(Opcode::SetLocal, &[symbol.index]),
                };
                Ok(())
            }
            Statement::Return(s) => {
                match &s.return_value {
                    Some(expr) => self.compile_expression(expr)?,
                    None => {
                        self.emit(Opcode::Null, &[]);
                    }
                }
                self.emit(Opcode::ReturnValue, &[]);
                Ok(())
            }
            Statement::Expression(s) => {
                self.compile_expression(&s.expression)?;
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }
            Statement::Block(b) => self.compile_block(b),
            Statement::Type(_) | Statement::ObjectBlock(_) => Err(CompileError::UnknownOperator(
                "struct type declarations are not supported by the bytecode backend".to_string(),
            )),
        }
    }

    fn compile_block(&mut self, block: &BlockStatement) -> Result<(), CompileError> {
        for stmt in &block.statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    fn compile_expression(&mut self, expr: &Expression) -> Result<(), CompileError> {
        match expr {
            Expression::IntegerLiteral(lit) => {
                let index = self.add_constant(Object::Integer(lit.value));
                self.emit(Opcode::PushConstant, &[index]);
                Ok(())
            }
            Expression::StringLiteral(lit) => {
                let index = self.add_constant(Object::String(lit.value.clone()));
                self.emit(Opcode::PushConstant, &[index]);
                Ok(())
            }
            Expression::Boolean(lit) => {
                self.emit(if lit.value { Opcode::True } else { Opcode::False }, &[]);
                Ok(())
            }
            Expression::Null(_) => {
                self.emit(Opcode::Null, &[]);
                Ok(())
            }
            Expression::Identifier(ident) => {
                let symbol = self
                    .symbol_table
                    .borrow_mut()
                    .resolve(&ident.value)
                    .ok_or_else(|| CompileError::UndefinedSymbol(ident.value.clone()))?;
                self.load_symbol(&symbol);
                Ok(())
            }
            Expression::Prefix(expr) => {
                self.compile_expression(&expr.right)?;
                match expr.operator.as_str() {
                    "!" => self.emit(Opcode::Bang, &[]),
                    "-" => self.emit(Opcode::Minus, &[]),
                    op => return Err(CompileError::UnknownOperator(op.to_string())),
                };
                Ok(())
            }
            Expression::Infix(expr) => self.compile_infix(expr),
            Expression::If(expr) => self.compile_if(expr),
            Expression::For(expr) => self.compile_for(expr),
            Expression::FunctionLiteral(lit) => self.compile_function_literal(lit),
            Expression::Call(call) => {
                self.compile_expression(&call.function)?;
                for arg in &call.arguments {
                    self.compile_expression(arg)?;
                }
                self.emit(Opcode::Call, &[call.arguments.len()]);
                Ok(())
            }
            Expression::ArrayLiteral(lit) => {
                for element in &lit.elements {
                    self.compile_expression(element)?;
                }
                self.emit(Opcode::Array, &[lit.elements.len()]);
                Ok(())
            }
            Expression::HashLiteral(lit) => {
                for (key, value) in &lit.pairs {
                    self.compile_expression(key)?;
                    self.compile_expression(value)?;
                }
                self.emit(Opcode::Hash, &[lit.pairs.len() * 2]);
                Ok(())
            }
            Expression::Index(expr) => {
                self.compile_expression(&expr.left)?;
                self.compile_expression(&expr.index)?;
                self.emit(Opcode::Index, &[]);
                Ok(())
            }
            Expression::TypeIdentifier(_) => Err(CompileError::UnknownOperator(
                "struct declarators are not supported by the bytecode backend".to_string(),
            )),
        }
    }

    fn load_symbol(&mut self, symbol: &crate::symbol_table::Symbol) {
        match symbol.scope {
            SymbolScope::Global => self.emit(Opcode::GetGlobal, &[symbol.index]),
            SymbolScope::Local => self.emit(Opcode::GetLocal, &[symbol.index]),
            SymbolScope::Builtin => self.emit(Opcode::GetBuiltin, &[symbol.index]),
            SymbolScope::Free => self.emit(Opcode::GetFree, &[symbol.index]),
            SymbolScope::Function => self.emit(Opcode::CurrentClosure, &[]),
        };
    }

    fn compile_infix(&mut self, expr: &crate::ast::InfixExpression) -> Result<(), CompileError> {
        if expr.operator == "=" {
            return self.compile_assignment(expr);
        }

        if expr.operator == "<" {
            self.compile_expression(&expr.right)?;
            self.compile_expression(&expr.left)?;
            self.emit(Opcode::GreaterThan, &[]);
            return Ok(());
        }

        self.compile_expression(&expr.left)?;
        self.compile_expression(&expr.right)?;
        match expr.operator.as_str() {
            "+" => self.emit(Opcode::Add, &[]),
            "-" => self.emit(Opcode::Sub, &[]),
            "*" => self.emit(Opcode::Mul, &[]),
            "/" => self.emit(Opcode::Div, &[]),
            ">" => self.emit(Opcode::GreaterThan, &[]),
            "==" => self.emit(Opcode::Equal, &[]),
            "!=" => self.emit(Opcode::NotEqual, &[]),
            op => return Err(CompileError::UnknownOperator(op.to_string())),
        };
        Ok(())
    }

    fn compile_assignment(&mut self, expr: &crate::ast::InfixExpression) -> Result<(), CompileError> {
        let name = match expr.left.as_ref() {
            Expression::Identifier(ident) => ident.value.clone(),
            _ => return Err(CompileError::UnknownOperator("=".to_string())),
        };

        self.compile_expression(&expr.right)?;

        let symbol = match self.symbol_table.borrow_mut().resolve(&name) {
            Some(symbol) => symbol,
            None => self.symbol_table.borrow_mut().define(&name),
        };
        match symbol.scope {
            SymbolScope::Global => self.emit(Opcode::SetGlobal, &[symbol.index]),
            _ => self.emit(Opcode::SetLocal, &[symbol.index]),
        };
        // Assignment is itself an expression; leave its value on the stack by
        // reloading the binding just stored.
        self.load_symbol(&symbol);
        Ok(())
    }

    fn compile_if(&mut self, expr: &crate::ast::IfExpression) -> Result<(), CompileError> {
        self.compile_expression(&expr.condition)?;
        let jump_not_true_pos = self.emit(Opcode::JumpNotTrue, &[9999]);

        self.compile_block(&expr.consequence)?;
        if self.last_instruction_is(Opcode::Pop) {
            self.remove_last_pop();
        }

        let jump_pos = self.emit(Opcode::Jump, &[9999]);
        let after_consequence = self.current_instructions().len();
        self.change_operand(jump_not_true_pos, after_consequence);

        match &expr.alternative {
            Some(alt) => {
                self.compile_block(alt)?;
                if self.last_instruction_is(Opcode::Pop) {
                    self.remove_last_pop();
                }
            }
            None => {
                self.emit(Opcode::Null, &[]);
            }
        }

        let after_alternative = self.current_instructions().len();
        self.change_operand(jump_pos, after_alternative);
        Ok(())
    }

    fn compile_for(&mut self, expr: &crate::ast::ForExpression) -> Result<(), CompileError> {
        self.compile_statement(&expr.init)?;
        let loop_top = self.current_instructions().len();

        self.compile_expression(&expr.condition)?;
        let jump_not_true_pos = self.emit(Opcode::JumpNotTrue, &[9999]);

        self.compile_block(&expr.body)?;

        self.compile_expression(&expr.increment)?;
        self.emit(Opcode::Pop, &[]);
        self.emit(Opcode::Jump, &[loop_top]);

        let after = self.current_instructions().len();
        self.change_operand(jump_not_true_pos, after);
        self.emit(Opcode::Null, &[]);
        Ok(())
    }

    fn compile_function_literal(
        &mut self,
        lit: &crate::ast::FunctionLiteral,
    ) -> Result<(), CompileError> {
        self.enter_scope();

        if let Some(name) = &lit.name {
            self.symbol_table.borrow_mut().define_function_name(name);
        }

        for param in &lit.parameters {
            self.symbol_table.borrow_mut().define(&param.value);
        }

        self.compile_block(&lit.body)?;

        if self.last_instruction_is(Opcode::Pop) {
            self.replace_last_with_return_value();
        }
        if !self.last_instruction_is(Opcode::ReturnValue) {
            self.emit(Opcode::Return, &[]);
        }

        let free_symbols = self.symbol_table.borrow().free_symbols.clone();
        let num_locals = self.symbol_table.borrow().num_definitions();
        let instructions = self.scopes.pop().unwrap().instructions;

        // Pop the function's symbol table scope back to its enclosing one.
        let outer = self
            .symbol_table
            .borrow()
            .outer()
            .expect("function literal scope always has an enclosing scope");
        self.symbol_table = outer;

        for free in &free_symbols {
            self.load_symbol(free);
        }

        if free_symbols.len() > u8::MAX as usize {
            return Err(CompileError::TooManyFreeVariables);
        }

        let compiled = CompiledFunction {
            instructions,
            num_locals,
            num_parameters: lit.parameters.len(),
        };
        let const_index = self.add_constant(Object::CompiledFunction(Rc::new(compiled)));
        self.emit(Opcode::Closure, &[const_index, free_symbols.len()]);
        Ok(())
    }

}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
