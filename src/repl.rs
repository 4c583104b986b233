// ABOUTME: Interactive read-eval-print loop, backed by either the tree-walking evaluator or the VM

use crate::compiler::Compiler;
use crate::environment::Environment;
use crate::evaluator;
use crate::lexer::Lexer;
use crate::object::Object;
use crate::parser::Parser;
use crate::symbol_table::SymbolTable;
use crate::vm::VM;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::rc::Rc;

const PROMPT: &str = ">> ";
const HISTORY_FILE: &str = ".monkey_history";

const WELCOME_MESSAGE: &str = "monkeyrs -- a small scripting language";

/// Runs the REPL until EOF (Ctrl-D) or an unrecoverable readline error.
/// `use_vm` selects the bytecode/VM backend instead of the tree-walking evaluator;
/// either way, bindings made on one line persist for the rest of the session.
pub fn run(use_vm: bool) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    let _ = rl.load_history(HISTORY_FILE);

    println!("{}", WELCOME_MESSAGE);
    println!("type an expression, or Ctrl-D to exit");

    let env = Environment::new();
    let constants = Rc::new(RefCell::new(Vec::new()));
    let symbol_table = Rc::new(RefCell::new(SymbolTable::new_with_builtins()));
    let globals = Rc::new(RefCell::new(vec![
        Rc::new(Object::Null);
        crate::vm::GLOBALS_SIZE
    ]));

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                if use_vm {
                    run_vm_line(&line, &constants, &symbol_table, &globals);
                } else {
                    run_eval_line(&line, &env);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("bye");
                break;
            }
            Err(err) => {
                eprintln!("readline error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}

fn run_eval_line(line: &str, env: &Rc<Environment>) {
    let lexer = Lexer::new(line);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        print_parser_errors(parser.errors());
        return;
    }

    let result = evaluator::eval_program(&program, env);
    println!("{}", result.inspect());
}

fn run_vm_line(
    line: &str,
    constants: &Rc<RefCell<Vec<Rc<Object>>>>,
    symbol_table: &Rc<RefCell<SymbolTable>>,
    globals: &Rc<RefCell<Vec<Rc<Object>>>>,
) {
    let lexer = Lexer::new(line);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        print_parser_errors(parser.errors());
        return;
    }

    let mut compiler = Compiler::new_with_state(constants.clone(), symbol_table.clone());
    if let Err(err) = compiler.compile_program(&program) {
        eprintln!("compile error: {}", err);
        return;
    }
    let bytecode = compiler.bytecode();

    let mut machine = VM::new_with_globals(bytecode, globals.clone());
    if let Err(err) = machine.run() {
        eprintln!("vm error: {}", err);
        return;
    }
    println!("{}", machine.last_popped_stack_elem().inspect());
}

fn print_parser_errors(errors: &[String]) {
    eprintln!("parser errors:");
    for err in errors {
        eprintln!("\t{}", err);
    }
}
