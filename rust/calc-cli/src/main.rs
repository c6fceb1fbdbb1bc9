//! calc — command-line interface for the computational core.

mod colors;
mod diagnostics;
mod io_terminal;
mod repl;

use calc_core::State;
use clap::{Parser, Subcommand};
use colors::red;
use io_terminal::TerminalIo;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "calc",
    version,
    about = "A graphing calculator's computational core: tokenizer, parser, evaluator, and program interpreter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive REPL
    Repl,
    /// Run a program file
    Run {
        /// Path to the program source file
        #[arg()]
        file: PathBuf,
    },
    /// Evaluate a single expression and print the result
    Eval {
        /// The expression text
        #[arg()]
        expr: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Repl => {
            repl::run_repl();
            ExitCode::SUCCESS
        }
        Commands::Run { file } => run_file(&file),
        Commands::Eval { expr } => eval_expr(&expr),
    }
}

fn run_file(file: &PathBuf) -> ExitCode {
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{} failed to read {}: {e}", red("Error:"), file.display());
            return ExitCode::FAILURE;
        }
    };

    let program = match calc_prog::parse_program(&text) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", diagnostics::render_ansi(&e));
            return ExitCode::FAILURE;
        }
    };

    let mut state = State::new();
    let mut io = TerminalIo::new();
    let cancel = || false;
    match calc_prog::execute(&program, &mut state, &mut io, &cancel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", diagnostics::render_ansi(&e));
            ExitCode::FAILURE
        }
    }
}

fn eval_expr(expr: &str) -> ExitCode {
    let result = (|| {
        let tokens = calc_lex::tokenize(expr)?;
        let ast = calc_parse::parse(&tokens)?;
        let mut state = State::new();
        calc_eval::eval(&ast, &mut state)
    })();

    match result {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", diagnostics::render_ansi(&e));
            ExitCode::FAILURE
        }
    }
}
