//! Numerical derivative for `nDeriv` (spec §6, Open Question resolved in
//! DESIGN.md: wired to a real symmetric-difference derivative rather than a
//! placeholder).

const DEFAULT_STEP: f64 = 1e-5;

/// Symmetric-difference approximation of `f'(x)`.
pub fn symmetric_difference(mut f: impl FnMut(f64) -> f64, x: f64, step: f64) -> f64 {
    let h = if step > 0.0 { step } else { DEFAULT_STEP };
    (f(x + h) - f(x - h)) / (2.0 * h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_of_square_is_2x() {
        let d = symmetric_difference(|x| x * x, 3.0, DEFAULT_STEP);
        assert!((d - 6.0).abs() < 1e-4);
    }
}
