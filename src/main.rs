use clap::Parser;

/// A small scripting language: tree-walking evaluator by default, or a
/// bytecode compiler and stack VM with `--vm`.
#[derive(Parser, Debug)]
#[command(name = "monkeyrs")]
#[command(version)]
#[command(about = "A small C-like scripting language with two backends")]
struct Cli {
    /// Run the REPL on the bytecode compiler + VM backend instead of the tree-walking evaluator
    #[arg(long)]
    vm: bool,
}

fn main() -> rustyline::Result<()> {
    let cli = Cli::parse();
    monkeyrs::repl::run(cli.vm)
}
