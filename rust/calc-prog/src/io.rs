//! I/O collaborator trait the interpreter suspends on for every interactive
//! or drawing statement (spec §6).
//!
//! The interpreter never touches a terminal, a graphics buffer, or stdin
//! directly. It calls through this trait, so the same program can run under
//! a REPL's terminal collaborator, a headless test harness, or nothing at
//! all (`NullIo`).

pub trait IoCollaborator {
    fn display(&mut self, text: &str);
    fn output(&mut self, row: i64, col: i64, text: &str);
    fn input(&mut self, prompt: Option<&str>) -> String;
    fn pause(&mut self, text: Option<&str>);
    fn get_key(&mut self) -> i64;
    fn clear_home(&mut self);
    /// Presents `title` and `items` (label text, goto target) and returns the
    /// chosen target.
    fn show_menu(&mut self, title: &str, items: &[(String, String)]) -> String;
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
    fn draw_circle(&mut self, x: f64, y: f64, r: f64);
    fn draw_text(&mut self, row: i64, col: i64, text: &str);
    fn plot_point(&mut self, x: f64, y: f64, on: bool);
    fn clear_draw(&mut self);
}

/// Every operation is a no-op returning the documented default: `input`
/// answers `"0"`, `get_key` answers `0`, `show_menu` answers the empty
/// target (the interpreter treats an empty target as an immediate
/// `LabelNotFound`, matching "no label" rather than inventing one).
#[derive(Debug, Default)]
pub struct NullIo;

impl IoCollaborator for NullIo {
    fn display(&mut self, _text: &str) {}

    fn output(&mut self, _row: i64, _col: i64, _text: &str) {}

    fn input(&mut self, _prompt: Option<&str>) -> String {
        "0".to_string()
    }

    fn pause(&mut self, _text: Option<&str>) {}

    fn get_key(&mut self) -> i64 {
        0
    }

    fn clear_home(&mut self) {}

    fn show_menu(&mut self, _title: &str, _items: &[(String, String)]) -> String {
        String::new()
    }

    fn draw_line(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64) {}

    fn draw_circle(&mut self, _x: f64, _y: f64, _r: f64) {}

    fn draw_text(&mut self, _row: i64, _col: i64, _text: &str) {}

    fn plot_point(&mut self, _x: f64, _y: f64, _on: bool) {}

    fn clear_draw(&mut self) {}
}
