//! The tagged universal value every layer of the core passes around.
//!
//! Mirrors the evaluator's view of the calculator's data model: a small,
//! closed set of variants with explicit coercion rules between them. There is
//! no open extension point here — adding a new shape of data means adding a
//! variant and updating every `match` the compiler flags, which is the point.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangular, row-major matrix. Always has at least one row and one
/// column; every row has the same length. Constructing one from ragged rows
/// is a programmer error in the core — the evaluator is the only place that
/// turns user input into a `Matrix`, and it rejects ragged literals with
/// `CalcError::DimMismatch` before a `Matrix` value ever exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: Vec<Vec<f64>>,
}

impl Matrix {
    /// Builds a matrix from rows, panicking if they are ragged or empty.
    /// Callers that cannot guarantee rectangularity ahead of time should use
    /// `Matrix::try_new` instead.
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self::try_new(rows).expect("Matrix::new requires non-empty, rectangular rows")
    }

    pub fn try_new(rows: Vec<Vec<f64>>) -> Option<Self> {
        if rows.is_empty() || rows[0].is_empty() {
            return None;
        }
        let width = rows[0].len();
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Self { rows })
    }

    pub fn identity(n: usize) -> Self {
        let mut rows = vec![vec![0.0; n]; n];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { rows }
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.rows[0].len()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.rows.get(i).and_then(|r| r.get(j)).copied()
    }

    pub fn set(&mut self, i: usize, j: usize, v: f64) -> bool {
        match self.rows.get_mut(i).and_then(|r| r.get_mut(j)) {
            Some(slot) => {
                *slot = v;
                true
            }
            None => false,
        }
    }
}

/// Runtime values produced and consumed by the evaluator.
///
/// Complex numbers and complex lists are kept as separate variants rather
/// than folding `Real` into `Complex` everywhere, so the common real-only
/// path (the overwhelming majority of expressions) never pays for an
/// imaginary component it doesn't have.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Real(f64),
    Complex(f64, f64),
    List(Vec<f64>),
    ComplexList(Vec<(f64, f64)>),
    Matrix(Matrix),
    Str(String),
}

impl Value {
    pub fn real(v: f64) -> Self {
        Value::Real(v)
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex(re, im)
    }

    pub fn list(v: Vec<f64>) -> Self {
        Value::List(v)
    }

    pub fn matrix(rows: Vec<Vec<f64>>) -> Option<Self> {
        Matrix::try_new(rows).map(Value::Matrix)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// `Real` iff the value coerces to one: a bare real, or a complex with a
    /// negligible imaginary part (`|imag| < 1e-12`, spec-mandated threshold).
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            Value::Complex(re, im) if im.abs() < 1e-12 => Some(*re),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<(f64, f64)> {
        match self {
            Value::Real(r) => Some((*r, 0.0)),
            Value::Complex(re, im) => Some((*re, *im)),
            _ => None,
        }
    }

    /// A bare `Real` coerces to a one-element list, matching spec §3.
    pub fn as_list(&self) -> Option<Vec<f64>> {
        match self {
            Value::List(l) => Some(l.clone()),
            Value::Real(r) => Some(vec![*r]),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// `Int` iff the real part is finite, integral, and within `|v| < 1e15`
    /// (spec §3's bound on what the evaluator considers a safe integer).
    pub fn as_int(&self) -> Option<i64> {
        let r = self.as_real()?;
        if r.is_finite() && r.fract() == 0.0 && r.abs() < 1e15 {
            Some(r as i64)
        } else {
            None
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Real(_) => "Real",
            Value::Complex(_, _) => "Complex",
            Value::List(_) => "List",
            Value::ComplexList(_) => "ComplexList",
            Value::Matrix(_) => "Matrix",
            Value::Str(_) => "String",
        }
    }
}

fn format_real(r: f64) -> String {
    if r.is_nan() {
        "NaN".to_string()
    } else if r.is_infinite() {
        if r > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if r == r.trunc() && r.abs() < 1e15 {
        format!("{}", r as i64)
    } else {
        format!("{}", r)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Real(r) => write!(f, "{}", format_real(*r)),
            Value::Complex(re, im) => {
                if *im >= 0.0 {
                    write!(f, "{}+{}i", format_real(*re), format_real(*im))
                } else {
                    write!(f, "{}-{}i", format_real(*re), format_real(im.abs()))
                }
            }
            Value::List(l) => {
                write!(f, "{{")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", format_real(*v))?;
                }
                write!(f, "}}")
            }
            Value::ComplexList(l) => {
                write!(f, "{{")?;
                for (i, (re, im)) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Value::Complex(*re, *im))?;
                }
                write!(f, "}}")
            }
            Value::Matrix(m) => {
                write!(f, "[")?;
                for row in &m.rows {
                    write!(f, "[")?;
                    for (i, v) in row.iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{}", format_real(*v))?;
                    }
                    write!(f, "]")?;
                }
                write!(f, "]")
            }
            Value::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Equality compares `f64` payloads by bit pattern (`to_bits`), so `NaN`
/// equals itself and the relation is reflexive — required for `Value` to
/// show up in test assertions. This is a deliberate, documented policy
/// decision (spec §4.1's open choice), not an accident of derive.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Complex(ar, ai), Value::Complex(br, bi)) => {
                ar.to_bits() == br.to_bits() && ai.to_bits() == bi.to_bits()
            }
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Value::ComplexList(a), Value::ComplexList(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((ar, ai), (br, bi))| {
                        ar.to_bits() == br.to_bits() && ai.to_bits() == bi.to_bits()
                    })
            }
            (Value::Matrix(a), Value::Matrix(b)) => {
                a.rows.len() == b.rows.len()
                    && a.rows.iter().zip(&b.rows).all(|(ra, rb)| {
                        ra.len() == rb.len()
                            && ra.iter().zip(rb).all(|(x, y)| x.to_bits() == y.to_bits())
                    })
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_to_complex_and_back() {
        let v = Value::Real(3.0);
        assert_eq!(v.as_complex(), Some((3.0, 0.0)));
    }

    #[test]
    fn complex_collapses_to_real_under_threshold() {
        let v = Value::Complex(2.0, 1e-13);
        assert_eq!(v.as_real(), Some(2.0));
        let v = Value::Complex(2.0, 1e-6);
        assert_eq!(v.as_real(), None);
    }

    #[test]
    fn real_as_int_bounds() {
        assert_eq!(Value::Real(42.0).as_int(), Some(42));
        assert_eq!(Value::Real(42.5).as_int(), None);
        assert_eq!(Value::Real(f64::NAN).as_int(), None);
        assert_eq!(Value::Real(1e16).as_int(), None);
    }

    #[test]
    fn real_as_singleton_list() {
        assert_eq!(Value::Real(5.0).as_list(), Some(vec![5.0]));
    }

    #[test]
    fn matrix_requires_rectangular_rows() {
        assert!(Matrix::try_new(vec![vec![1.0, 2.0], vec![3.0]]).is_none());
        assert!(Matrix::try_new(vec![]).is_none());
        assert!(Matrix::try_new(vec![vec![1.0]]).is_some());
    }

    #[test]
    fn nan_equals_itself() {
        let a = Value::Real(f64::NAN);
        let b = Value::Real(f64::NAN);
        assert_eq!(a, b);
    }

    #[test]
    fn display_formats_integral_reals_without_decimals() {
        assert_eq!(Value::Real(14.0).to_string(), "14");
        assert_eq!(Value::Real(2.5).to_string(), "2.5");
    }
}
