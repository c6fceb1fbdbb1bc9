//! Interactive REPL.

use crate::colors::{bold, cyan, gray, green, red};
use crate::diagnostics::render_ansi;
use crate::io_terminal::TerminalIo;
use calc_core::State;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::path::PathBuf;

pub fn run_repl() {
    println!("{}", bold(&cyan("calc REPL")));
    println!("{}\n", gray("Type :help for commands, :quit to exit."));

    let mut rl = DefaultEditor::new().expect("failed to create line editor");
    let history_path = history_path();
    if let Some(path) = &history_path {
        let _ = rl.load_history(path);
    }

    let mut state = State::new();
    let mut io = TerminalIo::new();

    loop {
        match rl.readline(&format!("{} ", green("calc>"))) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match trimmed {
                    ":quit" | ":q" => break,
                    ":help" | ":h" => print_help(),
                    ":reset" | ":r" => {
                        state = State::new();
                        println!("{}", gray("State reset."));
                    }
                    ":vars" => print_vars(&state),
                    _ if trimmed.starts_with(":save ") => save_state(&state, trimmed.strip_prefix(":save ").unwrap().trim()),
                    _ if trimmed.starts_with(":load ") => load_state(&mut state, trimmed.strip_prefix(":load ").unwrap().trim()),
                    _ => eval_line(trimmed, &mut state, &mut io),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", gray("(Ctrl-C to exit)"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {err:?}", red("Error:"));
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }
    println!("\n{}", cyan("Goodbye!"));
}

fn eval_line(line: &str, state: &mut State, io: &mut TerminalIo) {
    let result = (|| {
        let tokens = calc_lex::tokenize(line)?;
        let expr = calc_parse::parse(&tokens)?;
        calc_eval::eval(&expr, state)
    })();

    match result {
        Ok(value) => {
            println!("{value}");
            state.push_history(line.to_string(), value.to_string());
            state.set_ans(value);
        }
        Err(e) => eprintln!("{}", render_ansi(&e)),
    }

    let _ = io; // terminal drawing ops are only exercised by programs, not bare expressions
}

/// Writes the calculator's state to `path` as JSON (spec §6's persistence
/// collaborator seam). Built from `State::snapshot`, same as any other
/// persistence collaborator would see it.
fn save_state(state: &State, path: &str) {
    let snapshot = state.snapshot();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => match fs::write(path, json) {
            Ok(()) => println!("{}", gray(&format!("Saved state to {path}"))),
            Err(e) => eprintln!("{} failed to write {path}: {e}", red("Error:")),
        },
        Err(e) => eprintln!("{} failed to serialize state: {e}", red("Error:")),
    }
}

fn load_state(state: &mut State, path: &str) {
    let json = match fs::read_to_string(path) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("{} failed to read {path}: {e}", red("Error:"));
            return;
        }
    };
    let snapshot = match serde_json::from_str(&json) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} failed to parse {path}: {e}", red("Error:"));
            return;
        }
    };
    match State::restore(snapshot) {
        Ok(restored) => {
            *state = restored;
            println!("{}", gray(&format!("Loaded state from {path}")));
        }
        Err(e) => eprintln!("{}", render_ansi(&e)),
    }
}

fn print_vars(state: &State) {
    println!("{}", bold("Ans"));
    println!("  {}", state.ans());
}

fn history_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let mut path = PathBuf::from(home);
    path.push(".calc");
    path.push("repl_history");
    Some(path)
}

fn print_help() {
    println!("{}", bold("Commands:"));
    println!("  {}  {}", cyan(":help, :h"), gray("Show this help"));
    println!("  {}  {}", cyan(":quit, :q"), gray("Exit the REPL"));
    println!("  {}  {}", cyan(":reset, :r"), gray("Reset calculator state"));
    println!("  {}  {}", cyan(":vars"), gray("Show Ans"));
    println!("  {}  {}", cyan(":save <path>"), gray("Write calculator state to a JSON file"));
    println!("  {}  {}", cyan(":load <path>"), gray("Restore calculator state from a JSON file"));
}
