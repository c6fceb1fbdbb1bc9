//! Statement executor (spec §4.8).
//!
//! Blocks (`If`/`For`/`While`/`Repeat`) are executed by recursing into the
//! sub-range of statements they own. A block's own recursive call returns a
//! `Flow` describing what should happen next; `Flow::Jump` that lands
//! outside the caller's own range is propagated further up unchanged. This
//! is how a `Goto` out of a loop "leaves that loop's frame dangling": the
//! frame that owns the target range is whichever one, walking back up the
//! call stack, finds the target inside its own bounds.

use crate::io::IoCollaborator;
use crate::statement::{parse_program, Program, Statement};
use calc_core::{CalcError, CalcResult, State, Value};
use calc_eval::eval;
use calc_parse::Expr;

/// Runs the named program from its stored text (spec §4.8 `ProgramCall`).
pub fn run_program(name: &str, state: &mut State, io: &mut dyn IoCollaborator, cancel: &dyn Fn() -> bool) -> CalcResult<()> {
    let text = state.get_program(name)?;
    let program = parse_program(&text)?;
    execute(&program, state, io, cancel)
}

pub fn execute(program: &Program, state: &mut State, io: &mut dyn IoCollaborator, cancel: &dyn Fn() -> bool) -> CalcResult<()> {
    match exec_range(program, 0, program.statements.len(), state, io, cancel)? {
        Flow::Next | Flow::Stop | Flow::Return => Ok(()),
        Flow::Jump(target) => Err(CalcError::Syntax(format!("goto target {target} escaped the program"))),
    }
}

enum Flow {
    /// Advance past whatever unit just ran (a single statement, or a whole
    /// sub-range that exhausted normally).
    Next,
    /// Continue execution at this absolute statement index.
    Jump(usize),
    Stop,
    Return,
}

fn exec_range(
    program: &Program,
    start: usize,
    end: usize,
    state: &mut State,
    io: &mut dyn IoCollaborator,
    cancel: &dyn Fn() -> bool,
) -> CalcResult<Flow> {
    let mut pc = start;
    while pc < end {
        if cancel() {
            return Err(CalcError::Break);
        }
        match exec_one(program, pc, state, io, cancel)? {
            Flow::Next => pc += 1,
            Flow::Jump(target) => {
                // `target == end` means this range is exhausted, the same
                // as running off the end normally; only a target strictly
                // outside `[start, end]` needs to propagate further up.
                if target >= start && target <= end {
                    pc = target;
                } else {
                    return Ok(Flow::Jump(target));
                }
            }
            Flow::Stop => return Ok(Flow::Stop),
            Flow::Return => return Ok(Flow::Return),
        }
    }
    Ok(Flow::Next)
}

fn exec_one(
    program: &Program,
    pc: usize,
    state: &mut State,
    io: &mut dyn IoCollaborator,
    cancel: &dyn Fn() -> bool,
) -> CalcResult<Flow> {
    match &program.statements[pc] {
        Statement::If(cond) => exec_if(program, pc, cond, state, io, cancel),
        Statement::Then | Statement::Else | Statement::End => Ok(Flow::Next),
        Statement::For { var, start, end, step } => exec_for(program, pc, var, start, end, step.as_ref(), state, io, cancel),
        Statement::While(cond) => exec_while(program, pc, cond, state, io, cancel),
        Statement::Repeat(cond) => exec_repeat(program, pc, cond, state, io, cancel),
        Statement::Lbl(_) => Ok(Flow::Next),
        Statement::Goto(name) => {
            let target = program
                .labels
                .get(name)
                .copied()
                .ok_or_else(|| CalcError::LabelNotFound(name.clone()))?;
            Ok(Flow::Jump(target))
        }
        Statement::Disp(exprs) => {
            for e in exprs {
                let v = eval(e, state)?;
                io.display(&v.to_string());
            }
            Ok(Flow::Next)
        }
        Statement::Output(row, col, text) => {
            let r = as_int(&eval(row, state)?)?;
            let c = as_int(&eval(col, state)?)?;
            let t = eval(text, state)?;
            io.output(r, c, &t.to_string());
            Ok(Flow::Next)
        }
        Statement::Prompt(names) => {
            for name in names {
                let text = io.input(Some(&format!("{name}?")));
                store_input(name, &text, state);
            }
            Ok(Flow::Next)
        }
        Statement::Input { prompt, target } => {
            let text = io.input(prompt.as_deref());
            store_input(target, &text, state);
            Ok(Flow::Next)
        }
        Statement::GetKey(target) => {
            store_input(target, &io.get_key().to_string(), state);
            Ok(Flow::Next)
        }
        Statement::Pause(expr) => {
            let text = match expr {
                Some(e) => Some(eval(e, state)?.to_string()),
                None => None,
            };
            io.pause(text.as_deref());
            Ok(Flow::Next)
        }
        Statement::Menu(title, items) => {
            let title_text = eval(title, state)?.to_string();
            let mut rendered = Vec::with_capacity(items.len());
            for (label_expr, target) in items {
                let label_text = eval(label_expr, state)?.to_string();
                rendered.push((label_text, target.clone()));
            }
            let chosen = io.show_menu(&title_text, &rendered);
            let target_pc = program
                .labels
                .get(&chosen)
                .copied()
                .ok_or(CalcError::LabelNotFound(chosen))?;
            Ok(Flow::Jump(target_pc))
        }
        Statement::ClrHome => {
            io.clear_home();
            Ok(Flow::Next)
        }
        Statement::Line(x1, y1, x2, y2) => {
            io.draw_line(as_real(&eval(x1, state)?)?, as_real(&eval(y1, state)?)?, as_real(&eval(x2, state)?)?, as_real(&eval(y2, state)?)?);
            Ok(Flow::Next)
        }
        Statement::Circle(x, y, r) => {
            io.draw_circle(as_real(&eval(x, state)?)?, as_real(&eval(y, state)?)?, as_real(&eval(r, state)?)?);
            Ok(Flow::Next)
        }
        Statement::Text(row, col, text) => {
            let r = as_int(&eval(row, state)?)?;
            let c = as_int(&eval(col, state)?)?;
            let t = eval(text, state)?;
            io.draw_text(r, c, &t.to_string());
            Ok(Flow::Next)
        }
        Statement::PtOn(x, y) => {
            io.plot_point(as_real(&eval(x, state)?)?, as_real(&eval(y, state)?)?, true);
            Ok(Flow::Next)
        }
        Statement::PtOff(x, y) => {
            io.plot_point(as_real(&eval(x, state)?)?, as_real(&eval(y, state)?)?, false);
            Ok(Flow::Next)
        }
        Statement::ClearDraw => {
            io.clear_draw();
            Ok(Flow::Next)
        }
        Statement::Stop => Ok(Flow::Stop),
        Statement::Return => Ok(Flow::Return),
        Statement::ProgramCall(name) => {
            run_program(name, state, io, cancel)?;
            Ok(Flow::Next)
        }
        Statement::StoredExpression(text, idx) => {
            state.set_slot_text(*idx as usize, text.clone());
            Ok(Flow::Next)
        }
        Statement::Expression(expr) => {
            let v = eval(expr, state)?;
            state.set_ans(v);
            Ok(Flow::Next)
        }
    }
}

fn exec_if(
    program: &Program,
    pc: usize,
    cond: &Expr,
    state: &mut State,
    io: &mut dyn IoCollaborator,
    cancel: &dyn Fn() -> bool,
) -> CalcResult<Flow> {
    let branch_end = else_or_end(program, pc)?;
    if truthy(&eval(cond, state)?) {
        match exec_range(program, pc + 1, branch_end, state, io, cancel)? {
            Flow::Next => Ok(Flow::Jump(matching_end(program, pc)? + 1)),
            other => Ok(other),
        }
    } else if matches!(program.statements[branch_end], Statement::Else) {
        let end = matching_end(program, pc)?;
        match exec_range(program, branch_end + 1, end, state, io, cancel)? {
            Flow::Next => Ok(Flow::Jump(end + 1)),
            other => Ok(other),
        }
    } else {
        Ok(Flow::Jump(branch_end + 1))
    }
}

#[allow(clippy::too_many_arguments)]
fn exec_for(
    program: &Program,
    pc: usize,
    var: &str,
    start: &Expr,
    end: &Expr,
    step: Option<&Expr>,
    state: &mut State,
    io: &mut dyn IoCollaborator,
    cancel: &dyn Fn() -> bool,
) -> CalcResult<Flow> {
    let body_end = matching_end(program, pc)?;
    let start_v = as_real(&eval(start, state)?)?;
    let end_v = as_real(&eval(end, state)?)?;
    let step_v = match step {
        Some(e) => as_real(&eval(e, state)?)?,
        None => 1.0,
    };
    state.set_var(var, start_v);
    loop {
        if cancel() {
            return Err(CalcError::Break);
        }
        let current = state.get_var(var);
        let exhausted = if step_v > 0.0 {
            current > end_v
        } else if step_v < 0.0 {
            current < end_v
        } else {
            false
        };
        if exhausted {
            break;
        }
        match exec_range(program, pc + 1, body_end, state, io, cancel)? {
            Flow::Next => state.set_var(var, state.get_var(var) + step_v),
            other => return Ok(other),
        }
    }
    Ok(Flow::Jump(body_end + 1))
}

fn exec_while(
    program: &Program,
    pc: usize,
    cond: &Expr,
    state: &mut State,
    io: &mut dyn IoCollaborator,
    cancel: &dyn Fn() -> bool,
) -> CalcResult<Flow> {
    let body_end = matching_end(program, pc)?;
    loop {
        if cancel() {
            return Err(CalcError::Break);
        }
        if !truthy(&eval(cond, state)?) {
            break;
        }
        match exec_range(program, pc + 1, body_end, state, io, cancel)? {
            Flow::Next => {}
            other => return Ok(other),
        }
    }
    Ok(Flow::Jump(body_end + 1))
}

fn exec_repeat(
    program: &Program,
    pc: usize,
    cond: &Expr,
    state: &mut State,
    io: &mut dyn IoCollaborator,
    cancel: &dyn Fn() -> bool,
) -> CalcResult<Flow> {
    let body_end = matching_end(program, pc)?;
    loop {
        if cancel() {
            return Err(CalcError::Break);
        }
        match exec_range(program, pc + 1, body_end, state, io, cancel)? {
            Flow::Next => {}
            other => return Ok(other),
        }
        if truthy(&eval(cond, state)?) {
            break;
        }
    }
    Ok(Flow::Jump(body_end + 1))
}

/// Scans forward from an `If`/`For`/`While`/`Repeat` opener for its matching
/// `End`, skipping over nested blocks.
fn matching_end(program: &Program, start: usize) -> CalcResult<usize> {
    let mut depth = 0i32;
    for (i, s) in program.statements.iter().enumerate().skip(start + 1) {
        match s {
            Statement::If(_) | Statement::For { .. } | Statement::While(_) | Statement::Repeat(_) => depth += 1,
            Statement::End => {
                if depth == 0 {
                    return Ok(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    Err(CalcError::Syntax("unterminated block".to_string()))
}

/// For an `If` at `start`: the index of its same-depth `Else` if present,
/// otherwise its matching `End`.
fn else_or_end(program: &Program, start: usize) -> CalcResult<usize> {
    let mut depth = 0i32;
    for (i, s) in program.statements.iter().enumerate().skip(start + 1) {
        match s {
            Statement::If(_) | Statement::For { .. } | Statement::While(_) | Statement::Repeat(_) => depth += 1,
            Statement::Else if depth == 0 => return Ok(i),
            Statement::End => {
                if depth == 0 {
                    return Ok(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    Err(CalcError::Syntax("unterminated if".to_string()))
}

fn truthy(v: &Value) -> bool {
    v.as_real().map(|r| r != 0.0).unwrap_or(false)
}

fn as_real(v: &Value) -> CalcResult<f64> {
    v.as_real().ok_or_else(|| CalcError::DataType(format!("expected a real number, got {}", v.type_name())))
}

fn as_int(v: &Value) -> CalcResult<i64> {
    v.as_int().ok_or_else(|| CalcError::DataType(format!("expected an integer, got {}", v.type_name())))
}

/// `Input`/`Prompt` target a plain variable by default; a `StrN` target
/// stores the raw text instead of parsing it as a number.
fn store_input(target: &str, text: &str, state: &mut State) {
    if target.starts_with("Str") && target["Str".len()..].parse::<u8>().is_ok() {
        state.set_string(target, text.to_string());
    } else {
        state.set_var(target, text.trim().parse().unwrap_or(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NullIo;
    use crate::statement::parse_program;
    use std::cell::Cell;

    fn run(src: &str) -> (State, CalcResult<()>) {
        let mut state = State::new();
        let mut io = NullIo;
        let program = parse_program(src).unwrap();
        let never_cancel = || false;
        let result = execute(&program, &mut state, &mut io, &never_cancel);
        (state, result)
    }

    #[test]
    fn store_then_read() {
        let (state, result) = run("42->A:A+8");
        result.unwrap();
        assert_eq!(state.get_var("A"), 42.0);
        assert_eq!(state.ans(), Value::Real(50.0));
    }

    #[test]
    fn if_then_else() {
        let (state, result) = run("1->A\nIf A=1\nThen\n2->A\nElse\n3->A\nEnd");
        result.unwrap();
        assert_eq!(state.get_var("A"), 2.0);
    }

    #[test]
    fn if_false_skips_to_else() {
        let (state, result) = run("0->A\nIf A=1\nThen\n2->A\nElse\n3->A\nEnd");
        result.unwrap();
        assert_eq!(state.get_var("A"), 3.0);
    }

    #[test]
    fn for_loop_runs_inclusive_range_and_leaves_counter_past_end() {
        let (state, result) = run("For(I,1,5)\nI->A\nEnd");
        result.unwrap();
        assert_eq!(state.get_var("A"), 5.0);
        assert_eq!(state.get_var("I"), 6.0);
    }

    #[test]
    fn while_loop_checks_before_each_iteration() {
        let (state, result) = run("0->A\nWhile A<3\nA+1->A\nEnd");
        result.unwrap();
        assert_eq!(state.get_var("A"), 3.0);
    }

    #[test]
    fn repeat_runs_body_at_least_once() {
        let (state, result) = run("0->A\nRepeat 1\nA+1->A\nEnd");
        result.unwrap();
        assert_eq!(state.get_var("A"), 1.0);
    }

    #[test]
    fn goto_missing_label_fails() {
        let (_, result) = run("Goto 9");
        assert_eq!(result, Err(CalcError::LabelNotFound("9".to_string())));
    }

    #[test]
    fn goto_loop_is_cancellable() {
        let mut state = State::new();
        let mut io = NullIo;
        let program = parse_program("Lbl 1\n1->A\nGoto 1").unwrap();
        let count = Cell::new(0);
        let cancel = || {
            count.set(count.get() + 1);
            count.get() > 2
        };
        let result = execute(&program, &mut state, &mut io, &cancel);
        assert_eq!(result, Err(CalcError::Break));
        assert_eq!(state.get_var("A"), 1.0);
    }

    #[test]
    fn stop_ends_execution_early() {
        let (state, result) = run("1->A\nStop\n2->A");
        result.unwrap();
        assert_eq!(state.get_var("A"), 1.0);
    }

    #[test]
    fn clrhome_and_cleardraw_run_without_error() {
        let (_, result) = run("ClrHome\nClearDraw");
        result.unwrap();
    }

    #[test]
    fn getkey_stores_the_collaborator_default() {
        let (state, result) = run("GetKey(K)");
        result.unwrap();
        assert_eq!(state.get_var("K"), 0.0);
    }

    #[test]
    fn stored_expression_defines_a_function_slot() {
        let (mut state, result) = run("2X->Y1");
        result.unwrap();
        let y1 = calc_eval::slot::evaluate_slot(1, 3.0, &mut state).unwrap();
        assert_eq!(y1, 6.0);
    }
}
