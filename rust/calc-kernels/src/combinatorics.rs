//! Factorial, permutation, and combination (spec §4.6 "Combinatorics").

use calc_core::{CalcError, CalcResult};

pub const MAX_FACTORIAL_ARG: u64 = 69;

pub fn factorial(n: i64) -> CalcResult<f64> {
    if n < 0 || n as u64 > MAX_FACTORIAL_ARG {
        return Err(CalcError::Domain(format!("factorial out of range: {n}")));
    }
    let mut acc = 1.0f64;
    for k in 2..=(n as u64) {
        acc *= k as f64;
    }
    Ok(acc)
}

/// `nPr = n! / (n-r)!`, computed as a falling factorial to avoid needless
/// overflow for large `n`.
pub fn permutation(n: i64, r: i64) -> CalcResult<f64> {
    if r < 0 || n < 0 || r > n {
        return Err(CalcError::Domain(format!("nPr domain violated: n={n}, r={r}")));
    }
    let mut acc = 1.0f64;
    let mut k = n;
    while k > n - r {
        acc *= k as f64;
        k -= 1;
    }
    Ok(acc)
}

/// `nCr`, using the smaller of `r` and `n-r` to keep the running product
/// small (the "symmetric-reduction optimization" spec §4.6 names).
pub fn combination(n: i64, r: i64) -> CalcResult<f64> {
    if r < 0 || n < 0 || r > n {
        return Err(CalcError::Domain(format!("nCr domain violated: n={n}, r={r}")));
    }
    let r = r.min(n - r);
    let mut acc = 1.0f64;
    for i in 0..r {
        acc = acc * (n - i) as f64 / (i + 1) as f64;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorial_basic() {
        assert_eq!(factorial(5).unwrap(), 120.0);
        assert_eq!(factorial(0).unwrap(), 1.0);
    }

    #[test]
    fn factorial_rejects_out_of_range() {
        assert!(factorial(70).is_err());
        assert!(factorial(-1).is_err());
    }

    #[test]
    fn permutation_and_combination() {
        assert_eq!(permutation(5, 2).unwrap(), 20.0);
        assert_eq!(combination(5, 2).unwrap(), 10.0);
        assert_eq!(combination(5, 0).unwrap(), 1.0);
    }

    #[test]
    fn r_greater_than_n_is_domain_error() {
        assert_eq!(
            combination(2, 5),
            Err(CalcError::Domain("nCr domain violated: n=2, r=5".to_string()))
        );
    }
}
