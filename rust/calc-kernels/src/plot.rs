//! Plot-sampling segmenter and the arithmetic-progression helper `seq`
//! falls back on for its simplest case (spec §4.6 "Plot sampling").

/// One connected run of `(x, y)` samples.
pub type Segment = Vec<(f64, f64)>;

/// Samples `f` across `[x_min, x_max]` at `pixel_width / x_res` points,
/// splitting into segments wherever `f` is undefined, non-finite, or jumps
/// by more than `2*(y_max-y_min)` between consecutive defined samples.
pub fn sample_segments(
    mut f: impl FnMut(f64) -> Option<f64>,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    pixel_width: u32,
    x_res: f64,
) -> Vec<Segment> {
    let samples = ((pixel_width as f64 / x_res).round() as usize).max(1);
    let step = (x_max - x_min) / samples as f64;
    let jump_limit = 2.0 * (y_max - y_min);

    let mut segments = Vec::new();
    let mut current: Segment = Vec::new();
    let mut last_y: Option<f64> = None;

    for i in 0..=samples {
        let x = x_min + i as f64 * step;
        match f(x) {
            Some(y) if y.is_finite() => {
                if let Some(prev) = last_y {
                    if (y - prev).abs() > jump_limit {
                        if !current.is_empty() {
                            segments.push(std::mem::take(&mut current));
                        }
                    }
                }
                current.push((x, y));
                last_y = Some(y);
            }
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                last_y = None;
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Closed-form arithmetic progression used when `seq`'s expression is just
/// the loop variable itself; the general case re-evaluates the expression
/// through the evaluator instead (spec Open Question, see DESIGN.md).
pub fn arithmetic_progression(start: f64, end: f64, step: f64) -> Vec<f64> {
    if step == 0.0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut v = start;
    if step > 0.0 {
        while v <= end + 1e-9 {
            out.push(v);
            v += step;
        }
    } else {
        while v >= end - 1e-9 {
            out.push(v);
            v += step;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_undefined_sample() {
        let segments = sample_segments(
            |x| if x.abs() < 0.5 { None } else { Some(1.0 / x) },
            -2.0,
            2.0,
            -10.0,
            10.0,
            20,
            1.0,
        );
        assert!(segments.len() >= 2);
    }

    #[test]
    fn progression_counts_up_and_down() {
        assert_eq!(arithmetic_progression(1.0, 5.0, 1.0), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(arithmetic_progression(5.0, 1.0, -2.0), vec![5.0, 3.0, 1.0]);
        assert!(arithmetic_progression(1.0, 5.0, 0.0).is_empty());
    }
}
