//! `IoCollaborator` backed by stdio, for running programs from the REPL or
//! `calc run`. There is no pixel display in a terminal, so the drawing
//! operations render as a short textual notice instead of silently no-oping
//! — useful feedback when a ported program expects a graph screen.

use crate::colors::gray;
use calc_prog::IoCollaborator;
use rustyline::DefaultEditor;
use std::io::{self, Write};

pub struct TerminalIo {
    editor: DefaultEditor,
}

impl TerminalIo {
    pub fn new() -> Self {
        Self {
            editor: DefaultEditor::new().expect("failed to create line editor"),
        }
    }
}

impl Default for TerminalIo {
    fn default() -> Self {
        Self::new()
    }
}

impl IoCollaborator for TerminalIo {
    fn display(&mut self, text: &str) {
        println!("{text}");
    }

    fn output(&mut self, row: i64, col: i64, text: &str) {
        println!("{}", gray(&format!("[{row},{col}] {text}")));
    }

    fn input(&mut self, prompt: Option<&str>) -> String {
        let prompt = format!("{} ", prompt.unwrap_or("?"));
        self.editor.readline(&prompt).unwrap_or_default()
    }

    fn pause(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            println!("{text}");
        }
        print!("{}", gray("[pause] press Enter to continue"));
        let _ = io::stdout().flush();
        let mut discard = String::new();
        let _ = io::stdin().read_line(&mut discard);
    }

    fn get_key(&mut self) -> i64 {
        0
    }

    fn clear_home(&mut self) {
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
    }

    fn show_menu(&mut self, title: &str, items: &[(String, String)]) -> String {
        println!("{title}");
        for (i, (label, _)) in items.iter().enumerate() {
            println!("  {}: {label}", i + 1);
        }
        let choice = self.editor.readline("> ").unwrap_or_default();
        let index: usize = choice.trim().parse().unwrap_or(0);
        items
            .get(index.saturating_sub(1))
            .map(|(_, target)| target.clone())
            .unwrap_or_default()
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        println!("{}", gray(&format!("[line ({x1},{y1})-({x2},{y2})]")));
    }

    fn draw_circle(&mut self, x: f64, y: f64, r: f64) {
        println!("{}", gray(&format!("[circle center=({x},{y}) r={r}]")));
    }

    fn draw_text(&mut self, row: i64, col: i64, text: &str) {
        println!("{}", gray(&format!("[text {row},{col}] {text}")));
    }

    fn plot_point(&mut self, x: f64, y: f64, on: bool) {
        println!("{}", gray(&format!("[point ({x},{y}) {}]", if on { "on" } else { "off" })));
    }

    fn clear_draw(&mut self) {
        println!("{}", gray("[graph cleared]"));
    }
}
