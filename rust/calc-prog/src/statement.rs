//! Program text to flat statement list (spec §4.7).
//!
//! A program's source is split into lines, each line split on top-level `:`
//! (a colon inside a string literal doesn't separate statements), and each
//! piece parsed independently. There is no block nesting in the resulting
//! list: `If`/`For`/`While`/`Repeat`/`Else`/`End` are ordinary statements at
//! their own index, and the interpreter resolves block structure by
//! scanning forward from an opener to find its matching `Else`/`End`.

use calc_core::{CalcError, CalcResult};
use calc_parse::Expr;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    If(Expr),
    Then,
    Else,
    End,
    For {
        var: String,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
    },
    While(Expr),
    Repeat(Expr),
    Lbl(String),
    Goto(String),
    Disp(Vec<Expr>),
    Output(Expr, Expr, Expr),
    Prompt(Vec<String>),
    Input {
        prompt: Option<String>,
        target: String,
    },
    GetKey(String),
    Pause(Option<Expr>),
    Menu(Expr, Vec<(Expr, String)>),
    ClrHome,
    Line(Expr, Expr, Expr, Expr),
    Circle(Expr, Expr, Expr),
    Text(Expr, Expr, Expr),
    PtOn(Expr, Expr),
    PtOff(Expr, Expr),
    ClearDraw,
    Stop,
    Return,
    ProgramCall(String),
    /// A store whose target is a function slot (e.g. `2X->Y1`): the text to
    /// the left of the arrow is a function body, stored verbatim rather than
    /// evaluated, and re-parsed on every call to the slot.
    StoredExpression(String, u8),
    Expression(Expr),
}

/// A parsed program: its flat statement list plus a label name to index map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub labels: HashMap<String, usize>,
}

pub fn parse_program(text: &str) -> CalcResult<Program> {
    let mut statements = Vec::new();
    for line in text.lines() {
        for part in split_top_level(line, ':') {
            let part = part.trim();
            if !part.is_empty() {
                statements.push(parse_statement(part)?);
            }
        }
    }
    let mut labels = HashMap::new();
    for (i, statement) in statements.iter().enumerate() {
        if let Statement::Lbl(name) = statement {
            labels.insert(name.clone(), i);
        }
    }
    Ok(Program { statements, labels })
}

fn parse_statement(text: &str) -> CalcResult<Statement> {
    if let Some(rest) = strip_keyword(text, "If") {
        return Ok(Statement::If(parse_expr(rest)?));
    }
    if text == "Then" {
        return Ok(Statement::Then);
    }
    if text == "Else" {
        return Ok(Statement::Else);
    }
    if text == "End" {
        return Ok(Statement::End);
    }
    if let Some(rest) = text.strip_prefix("For(") {
        return parse_for(strip_trailing_paren(rest));
    }
    if let Some(rest) = strip_keyword(text, "While") {
        return Ok(Statement::While(parse_expr(rest)?));
    }
    if let Some(rest) = strip_keyword(text, "Repeat") {
        return Ok(Statement::Repeat(parse_expr(rest)?));
    }
    if let Some(rest) = strip_keyword(text, "Lbl") {
        return Ok(Statement::Lbl(rest.trim().to_string()));
    }
    if let Some(rest) = strip_keyword(text, "Goto") {
        return Ok(Statement::Goto(rest.trim().to_string()));
    }
    if let Some(rest) = strip_keyword(text, "Disp") {
        let exprs = split_top_level_commas(rest)
            .iter()
            .map(|a| parse_expr(a))
            .collect::<CalcResult<Vec<_>>>()?;
        return Ok(Statement::Disp(exprs));
    }
    if let Some(rest) = text.strip_prefix("Output(") {
        let args = split_top_level_commas(strip_trailing_paren(rest));
        return match args.as_slice() {
            [row, col, text] => Ok(Statement::Output(parse_expr(row)?, parse_expr(col)?, parse_expr(text)?)),
            _ => Err(CalcError::Syntax("Output requires 3 arguments".to_string())),
        };
    }
    if let Some(rest) = strip_keyword(text, "Prompt") {
        let names = split_top_level_commas(rest).into_iter().map(|s| s.trim().to_string()).collect();
        return Ok(Statement::Prompt(names));
    }
    if let Some(rest) = strip_keyword(text, "Input") {
        return parse_input(rest.trim());
    }
    if let Some(rest) = text.strip_prefix("GetKey(") {
        return Ok(Statement::GetKey(strip_trailing_paren(rest).trim().to_string()));
    }
    if let Some(rest) = strip_keyword(text, "Pause") {
        let rest = rest.trim();
        return if rest.is_empty() {
            Ok(Statement::Pause(None))
        } else {
            Ok(Statement::Pause(Some(parse_expr(rest)?)))
        };
    }
    if let Some(rest) = text.strip_prefix("Menu(") {
        return parse_menu(strip_trailing_paren(rest));
    }
    if text == "ClrHome" {
        return Ok(Statement::ClrHome);
    }
    if let Some(rest) = text.strip_prefix("Line(") {
        let args = split_top_level_commas(strip_trailing_paren(rest));
        return match args.as_slice() {
            [x1, y1, x2, y2] => Ok(Statement::Line(parse_expr(x1)?, parse_expr(y1)?, parse_expr(x2)?, parse_expr(y2)?)),
            _ => Err(CalcError::Syntax("Line( requires 4 arguments".to_string())),
        };
    }
    if let Some(rest) = text.strip_prefix("Circle(") {
        let args = split_top_level_commas(strip_trailing_paren(rest));
        return match args.as_slice() {
            [x, y, r] => Ok(Statement::Circle(parse_expr(x)?, parse_expr(y)?, parse_expr(r)?)),
            _ => Err(CalcError::Syntax("Circle( requires 3 arguments".to_string())),
        };
    }
    if let Some(rest) = text.strip_prefix("Text(") {
        let args = split_top_level_commas(strip_trailing_paren(rest));
        return match args.as_slice() {
            [row, col, text] => Ok(Statement::Text(parse_expr(row)?, parse_expr(col)?, parse_expr(text)?)),
            _ => Err(CalcError::Syntax("Text( requires 3 arguments".to_string())),
        };
    }
    if let Some(rest) = text.strip_prefix("Pt-On(") {
        let args = split_top_level_commas(strip_trailing_paren(rest));
        return match args.as_slice() {
            [x, y] => Ok(Statement::PtOn(parse_expr(x)?, parse_expr(y)?)),
            _ => Err(CalcError::Syntax("Pt-On( requires 2 arguments".to_string())),
        };
    }
    if let Some(rest) = text.strip_prefix("Pt-Off(") {
        let args = split_top_level_commas(strip_trailing_paren(rest));
        return match args.as_slice() {
            [x, y] => Ok(Statement::PtOff(parse_expr(x)?, parse_expr(y)?)),
            _ => Err(CalcError::Syntax("Pt-Off( requires 2 arguments".to_string())),
        };
    }
    if text == "ClearDraw" {
        return Ok(Statement::ClearDraw);
    }
    if text == "Stop" {
        return Ok(Statement::Stop);
    }
    if text == "Return" {
        return Ok(Statement::Return);
    }
    if let Some(rest) = text.strip_prefix("prgm") {
        return Ok(Statement::ProgramCall(rest.trim().to_string()));
    }
    let expr = parse_expr(text)?;
    if let Expr::Store(_, target) = &expr {
        if let Expr::FunctionSlot(idx) = target.as_ref() {
            return Ok(Statement::StoredExpression(store_value_text(text), *idx));
        }
    }
    Ok(Statement::Expression(expr))
}

/// The text to the left of a top-level store arrow (`->` or `\u{2192}`),
/// used to keep a function-slot store's body as text instead of a value.
fn store_value_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth -= 1,
            '\u{2192}' if !in_string && depth == 0 => return chars[..i].iter().collect::<String>().trim().to_string(),
            '-' if !in_string && depth == 0 && chars.get(i + 1) == Some(&'>') => {
                return chars[..i].iter().collect::<String>().trim().to_string();
            }
            _ => {}
        }
        i += 1;
    }
    text.trim().to_string()
}

fn parse_for(s: &str) -> CalcResult<Statement> {
    let parts = split_top_level_commas(s);
    match parts.as_slice() {
        [var, start, end] => Ok(Statement::For {
            var: var.trim().to_string(),
            start: parse_expr(start)?,
            end: parse_expr(end)?,
            step: None,
        }),
        [var, start, end, step] => Ok(Statement::For {
            var: var.trim().to_string(),
            start: parse_expr(start)?,
            end: parse_expr(end)?,
            step: Some(parse_expr(step)?),
        }),
        _ => Err(CalcError::Syntax("For( requires 3 or 4 arguments".to_string())),
    }
}

fn parse_menu(s: &str) -> CalcResult<Statement> {
    let parts = split_top_level_commas(s);
    if parts.is_empty() || parts.len() % 2 == 0 {
        return Err(CalcError::Syntax(
            "Menu( requires an odd number of arguments (title, then label/target pairs)".to_string(),
        ));
    }
    let title = parse_expr(&parts[0])?;
    let mut items = Vec::new();
    let mut i = 1;
    while i + 1 < parts.len() {
        items.push((parse_expr(&parts[i])?, parts[i + 1].trim().to_string()));
        i += 2;
    }
    Ok(Statement::Menu(title, items))
}

fn parse_input(rest: &str) -> CalcResult<Statement> {
    let parts = split_top_level_commas(rest);
    match parts.as_slice() {
        [target] => Ok(Statement::Input {
            prompt: None,
            target: target.trim().to_string(),
        }),
        [prompt, target] => Ok(Statement::Input {
            prompt: Some(prompt.trim().trim_matches('"').to_string()),
            target: target.trim().to_string(),
        }),
        _ => Err(CalcError::Syntax("Input takes a variable name and an optional prompt".to_string())),
    }
}

fn parse_expr(s: &str) -> CalcResult<Expr> {
    let tokens = calc_lex::tokenize(s)?;
    let expr = calc_parse::parse(&tokens)?;
    Ok(expr)
}

/// Matches `text` against `kw`, requiring the next character (if any) not be
/// alphanumeric, so `Iffy` doesn't match the `If` keyword.
fn strip_keyword<'a>(text: &'a str, kw: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(kw)?;
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(rest.trim_start()),
    }
}

fn strip_trailing_paren(s: &str) -> &str {
    s.strip_suffix(')').unwrap_or(s)
}

/// Splits on `sep` outside of string literals.
fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    for c in s.chars() {
        match c {
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            c if c == sep && !in_string => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Splits on top-level commas, tracking paren depth and string state so a
/// comma inside `"..."` or a nested `(...)` doesn't separate arguments.
fn split_top_level_commas(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_string = false;
    for c in s.chars() {
        match c {
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            '(' if !in_string => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_string => {
                depth -= 1;
                current.push(c);
            }
            ',' if !in_string && depth == 0 => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);
    parts.into_iter().map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_colon_separated_statements() {
        let program = parse_program("42->A:A+8").unwrap();
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn colon_inside_string_is_not_a_separator() {
        let program = parse_program(r#"Disp "a:b""#).unwrap();
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn indexes_labels() {
        let program = parse_program("Lbl 1\n1->A\nGoto 1").unwrap();
        assert_eq!(program.labels.get("1"), Some(&0));
        assert!(matches!(program.statements[2], Statement::Goto(ref n) if n == "1"));
    }

    #[test]
    fn for_loop_with_explicit_step() {
        let program = parse_program("For(I,1,5,1)\nI->A\nEnd").unwrap();
        match &program.statements[0] {
            Statement::For { var, step, .. } => {
                assert_eq!(var, "I");
                assert!(step.is_some());
            }
            other => panic!("expected For, got {other:?}"),
        }
    }

    #[test]
    fn for_loop_defaults_step_to_none() {
        let program = parse_program("For(I,1,5)\nEnd").unwrap();
        match &program.statements[0] {
            Statement::For { step, .. } => assert!(step.is_none()),
            other => panic!("expected For, got {other:?}"),
        }
    }

    #[test]
    fn if_then_else_end_parse_as_separate_statements() {
        let program = parse_program("If A=1\nThen\nDisp 1\nElse\nDisp 2\nEnd").unwrap();
        assert!(matches!(program.statements[0], Statement::If(_)));
        assert_eq!(program.statements[1], Statement::Then);
        assert_eq!(program.statements[3], Statement::Else);
        assert_eq!(program.statements[5], Statement::End);
    }

    #[test]
    fn menu_requires_odd_argument_count() {
        assert!(parse_program(r#"Menu("T","A",1,"B")"#).is_err());
        assert!(parse_program(r#"Menu("T","A",1,"B",2)"#).is_ok());
    }

    #[test]
    fn clrhome_and_cleardraw_are_bare_keywords() {
        let program = parse_program("ClrHome\nClearDraw").unwrap();
        assert_eq!(program.statements[0], Statement::ClrHome);
        assert_eq!(program.statements[1], Statement::ClearDraw);
    }

    #[test]
    fn getkey_parses_its_target() {
        let program = parse_program("GetKey(K)").unwrap();
        assert_eq!(program.statements[0], Statement::GetKey("K".to_string()));
    }

    #[test]
    fn store_to_function_slot_becomes_stored_expression() {
        let program = parse_program("2X->Y1").unwrap();
        match &program.statements[0] {
            Statement::StoredExpression(text, idx) => {
                assert_eq!(text, "2X");
                assert_eq!(*idx, 1);
            }
            other => panic!("expected StoredExpression, got {other:?}"),
        }
    }

    #[test]
    fn store_to_plain_variable_is_still_a_generic_expression() {
        let program = parse_program("42->A").unwrap();
        assert!(matches!(program.statements[0], Statement::Expression(_)));
    }
}
