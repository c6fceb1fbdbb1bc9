//! Cross-crate program scenarios, named for the spec's scenario table.

use calc_core::{CalcError, State, Value};
use calc_prog::{execute, parse_program, NullIo};
use std::cell::Cell;

fn run(src: &str) -> (State, Result<(), CalcError>) {
    let mut state = State::new();
    let mut io = NullIo;
    let program = parse_program(src).unwrap();
    let never_cancel = || false;
    let result = execute(&program, &mut state, &mut io, &never_cancel);
    (state, result)
}

#[test]
fn s7_store_then_read_back() {
    let (state, result) = run("42->A:A+8");
    result.unwrap();
    assert_eq!(state.get_var("A"), 42.0);
    assert_eq!(state.ans(), Value::Real(50.0));
}

#[test]
fn s12_for_loop_completes_with_counter_one_past_end() {
    let (state, result) = run("For(I,1,5)\nI->A\nEnd");
    result.unwrap();
    assert_eq!(state.get_var("A"), 5.0);
    assert_eq!(state.get_var("I"), 6.0);
}

#[test]
fn s13_cancellation_stops_goto_loop_within_one_statement() {
    let mut state = State::new();
    let mut io = NullIo;
    let program = parse_program("Lbl 1\n1->A\nGoto 1").unwrap();
    let seen = Cell::new(0);
    let cancel = || {
        seen.set(seen.get() + 1);
        seen.get() > 2
    };
    let result = execute(&program, &mut state, &mut io, &cancel);
    assert_eq!(result, Err(CalcError::Break));
    assert_eq!(state.get_var("A"), 1.0);
}

#[test]
fn nested_if_inside_for_loop() {
    let (state, result) = run("0->A\nFor(I,1,4)\nIf I=2\nThen\nA+10->A\nElse\nA+1->A\nEnd\nEnd");
    result.unwrap();
    assert_eq!(state.get_var("A"), 13.0);
}

#[test]
fn goto_out_of_a_for_loop_leaves_it_dangling() {
    let (state, result) = run("For(I,1,10)\nIf I=3\nThen\nGoto 1\nEnd\nEnd\nLbl 1\n99->A");
    result.unwrap();
    assert_eq!(state.get_var("A"), 99.0);
    assert_eq!(state.get_var("I"), 3.0);
}

#[test]
fn undefined_program_call_is_reported() {
    let (_, result) = run("prgmMISSING");
    assert_eq!(result, Err(CalcError::Undefined("MISSING".to_string())));
}
