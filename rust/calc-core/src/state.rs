//! Process-wide evaluator state: the named stores enumerated in spec §3/§4.4.
//!
//! `State` is owned by whichever caller drives an evaluation (the REPL, the
//! program interpreter) and handed to the evaluator by reference for the
//! duration of one call — never held by the evaluator itself. See the
//! "Cyclic references between application state and evaluator" design note.

use crate::error::{CalcError, CalcResult};
use crate::modes::{GraphWindow, Modes};
use crate::value::{Matrix, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const LIST_NAMES: [&str; 6] = ["L1", "L2", "L3", "L4", "L5", "L6"];
pub const MATRIX_NAMES: [&str; 10] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
pub const SLOT_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSlot {
    pub text: String,
    pub enabled: bool,
}

impl Default for FunctionSlot {
    fn default() -> Self {
        Self {
            text: String::new(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input: String,
    pub result: String,
}

/// A plain-data snapshot of everything `State` exposes through its public
/// getters — the seam an external persistence collaborator serializes and
/// later restores through `State::restore` (spec §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub vars: HashMap<String, f64>,
    pub complex_vars: HashMap<String, (f64, f64)>,
    pub lists: HashMap<String, Vec<f64>>,
    pub matrices: HashMap<String, Vec<Vec<f64>>>,
    pub strings: HashMap<String, String>,
    pub slots: Vec<FunctionSlot>,
    pub ans: Option<Value>,
    pub modes: Modes,
    pub window: GraphWindow,
    pub history: Vec<HistoryEntry>,
    pub programs: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct State {
    vars: HashMap<String, f64>,
    complex_vars: HashMap<String, (f64, f64)>,
    lists: HashMap<String, Vec<f64>>,
    matrices: HashMap<String, Matrix>,
    strings: HashMap<String, String>,
    slots: Vec<FunctionSlot>,
    ans: Value,
    modes: Modes,
    window: GraphWindow,
    history: Vec<HistoryEntry>,
    programs: HashMap<String, String>,
    rng: StdRng,
}

impl Default for State {
    fn default() -> Self {
        Self {
            vars: HashMap::new(),
            complex_vars: HashMap::new(),
            lists: HashMap::new(),
            matrices: HashMap::new(),
            strings: HashMap::new(),
            slots: (0..SLOT_COUNT).map(|_| FunctionSlot::default()).collect(),
            ans: Value::Real(0.0),
            modes: Modes::default(),
            window: GraphWindow::default(),
            history: Vec::new(),
            programs: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Scalar variables. Unset reads default to 0 (spec §4.4). --

    pub fn get_var(&self, name: &str) -> f64 {
        self.vars.get(name).copied().unwrap_or(0.0)
    }

    pub fn set_var(&mut self, name: &str, v: f64) {
        self.vars.insert(name.to_string(), v);
        self.complex_vars.remove(name);
    }

    pub fn get_complex_var(&self, name: &str) -> (f64, f64) {
        self.complex_vars
            .get(name)
            .copied()
            .unwrap_or((self.get_var(name), 0.0))
    }

    pub fn set_complex_var(&mut self, name: &str, re: f64, im: f64) {
        if im == 0.0 {
            self.set_var(name, re);
        } else {
            self.complex_vars.insert(name.to_string(), (re, im));
            self.vars.remove(name);
        }
    }

    // -- Lists. Unset reads fail with Undefined (spec §4.4). --

    pub fn get_list(&self, name: &str) -> CalcResult<Vec<f64>> {
        self.lists
            .get(name)
            .cloned()
            .ok_or_else(|| CalcError::Undefined(name.to_string()))
    }

    pub fn set_list(&mut self, name: &str, v: Vec<f64>) {
        self.lists.insert(name.to_string(), v);
    }

    /// Writes a single 1-based element, zero-padding the list if `index`
    /// extends past its current length (spec §4.4).
    pub fn set_list_element(&mut self, name: &str, index: usize, v: f64) -> CalcResult<()> {
        if index == 0 {
            return Err(CalcError::InvalidDim);
        }
        let list = self.lists.entry(name.to_string()).or_default();
        if index > list.len() {
            list.resize(index, 0.0);
        }
        list[index - 1] = v;
        Ok(())
    }

    // -- Matrices. Unset reads fail with Undefined; element writes require
    // the index to already be in range (spec §4.4). --

    pub fn get_matrix(&self, name: &str) -> CalcResult<Matrix> {
        self.matrices
            .get(name)
            .cloned()
            .ok_or_else(|| CalcError::Undefined(name.to_string()))
    }

    pub fn set_matrix(&mut self, name: &str, m: Matrix) {
        self.matrices.insert(name.to_string(), m);
    }

    pub fn set_matrix_element(&mut self, name: &str, i: usize, j: usize, v: f64) -> CalcResult<()> {
        let m = self
            .matrices
            .get_mut(name)
            .ok_or_else(|| CalcError::Undefined(name.to_string()))?;
        if i == 0 || j == 0 || !m.set(i - 1, j - 1, v) {
            return Err(CalcError::InvalidDim);
        }
        Ok(())
    }

    // -- String variables. --

    pub fn get_string(&self, name: &str) -> CalcResult<String> {
        self.strings
            .get(name)
            .cloned()
            .ok_or_else(|| CalcError::Undefined(name.to_string()))
    }

    pub fn set_string(&mut self, name: &str, v: String) {
        self.strings.insert(name.to_string(), v);
    }

    // -- Function slots (Y1..Y9, Y0 at index 0..9, Y0 at index 9 internally
    // but addressed by the caller as slot 0 per spec's "Y0 maps to index 0"). --

    pub fn slot_text(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|s| s.text.as_str())
    }

    pub fn set_slot_text(&mut self, index: usize, text: String) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.text = text;
        }
    }

    pub fn slot_enabled(&self, index: usize) -> bool {
        self.slots.get(index).map(|s| s.enabled).unwrap_or(false)
    }

    pub fn set_slot_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.enabled = enabled;
        }
    }

    // -- Random number generation. Shared, mutable State-owned RNG (spec §5:
    // "Random-number generators are shared State; concurrent evaluations
    // would race and are disallowed"). --

    pub fn random_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Inclusive integer range `[lo, hi]`.
    pub fn random_int(&mut self, lo: i64, hi: i64) -> i64 {
        self.rng.gen_range(lo..=hi)
    }

    // -- Ans. --

    /// Any expression statement's result is assignable to Ans, not only a
    /// real number (spec §4.8 "Expression at statement level").
    pub fn ans(&self) -> Value {
        self.ans.clone()
    }

    pub fn set_ans(&mut self, v: Value) {
        self.ans = v;
    }

    // -- Modes, window. --

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut Modes {
        &mut self.modes
    }

    pub fn window(&self) -> &GraphWindow {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut GraphWindow {
        &mut self.window
    }

    // -- History. --

    pub fn push_history(&mut self, input: impl Into<String>, result: impl Into<String>) {
        self.history.push(HistoryEntry {
            input: input.into(),
            result: result.into(),
        });
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    // -- Programs. --

    pub fn get_program(&self, name: &str) -> CalcResult<String> {
        self.programs
            .get(name)
            .cloned()
            .ok_or_else(|| CalcError::Undefined(name.to_string()))
    }

    pub fn set_program(&mut self, name: &str, text: String) {
        self.programs.insert(name.to_string(), text);
    }

    // -- Persistence seam: snapshot/restore built only from public getters. --

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            vars: self.vars.clone(),
            complex_vars: self.complex_vars.clone(),
            lists: self.lists.clone(),
            matrices: self
                .matrices
                .iter()
                .map(|(k, v)| (k.clone(), v.rows.clone()))
                .collect(),
            strings: self.strings.clone(),
            slots: self.slots.clone(),
            ans: Some(self.ans.clone()),
            modes: self.modes,
            window: self.window,
            history: self.history.clone(),
            programs: self.programs.clone(),
        }
    }

    pub fn restore(snapshot: Snapshot) -> CalcResult<Self> {
        let mut matrices = HashMap::new();
        for (name, rows) in snapshot.matrices {
            let m = Matrix::try_new(rows).ok_or(CalcError::DimMismatch)?;
            matrices.insert(name, m);
        }
        Ok(Self {
            vars: snapshot.vars,
            complex_vars: snapshot.complex_vars,
            lists: snapshot.lists,
            matrices,
            strings: snapshot.strings,
            slots: if snapshot.slots.is_empty() {
                (0..SLOT_COUNT).map(|_| FunctionSlot::default()).collect()
            } else {
                snapshot.slots
            },
            ans: snapshot.ans.unwrap_or(Value::Real(0.0)),
            modes: snapshot.modes,
            window: snapshot.window,
            history: snapshot.history,
            programs: snapshot.programs,
            rng: StdRng::from_entropy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_scalar_reads_zero() {
        let s = State::new();
        assert_eq!(s.get_var("A"), 0.0);
    }

    #[test]
    fn unset_list_is_undefined() {
        let s = State::new();
        assert_eq!(s.get_list("L1"), Err(CalcError::Undefined("L1".to_string())));
    }

    #[test]
    fn list_element_write_zero_pads() {
        let mut s = State::new();
        s.set_list("L1", vec![1.0, 2.0]);
        s.set_list_element("L1", 5, 9.0).unwrap();
        assert_eq!(s.get_list("L1").unwrap(), vec![1.0, 2.0, 0.0, 0.0, 9.0]);
    }

    #[test]
    fn matrix_element_write_requires_in_range() {
        let mut s = State::new();
        s.set_matrix("A", Matrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]));
        assert!(s.set_matrix_element("A", 1, 1, 9.0).is_ok());
        assert_eq!(s.set_matrix_element("A", 3, 1, 9.0), Err(CalcError::InvalidDim));
    }

    #[test]
    fn snapshot_round_trips() {
        let mut s = State::new();
        s.set_var("A", 42.0);
        s.set_list("L1", vec![1.0, 2.0, 3.0]);
        let snap = s.snapshot();
        let restored = State::restore(snap).unwrap();
        assert_eq!(restored.get_var("A"), 42.0);
        assert_eq!(restored.get_list("L1").unwrap(), vec![1.0, 2.0, 3.0]);
    }
}
