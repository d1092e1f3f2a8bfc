/// Mathematical utility functions shared by the evaluator, the seismic tables
/// and the report.

/// Assert that the deviation between two values is less than a threshold
///
/// Calculates the percentage deviation between `actual` and `expected`, then
/// asserts that this deviation is less than the specified `max_deviation`.
///
/// # Examples
/// See the test cases below for usage examples.
#[macro_export]
macro_rules! assert_deviation {
    ($actual:expr, $expected:expr, $max_deviation:expr) => {
        {
            let actual_val = $actual;
            let expected_val = $expected;
            let max_dev = $max_deviation;
            let actual_deviation = $crate::math_utils::percent_deviation(actual_val, expected_val);

            if actual_deviation >= max_dev {
                panic!(
                    "assertion failed: deviation {:.2}% >= {:.2}%\n  actual: {:?},\n  expected: {:?}",
                    actual_deviation, max_dev, actual_val, expected_val
                );
            }
        }
    };
    ($actual:expr, $expected:expr, $max_deviation:expr, $($arg:tt)+) => {
        {
            let actual_val = $actual;
            let expected_val = $expected;
            let max_dev = $max_deviation;
            let actual_deviation = $crate::math_utils::percent_deviation(actual_val, expected_val);

            if actual_deviation >= max_dev {
                panic!(
                    "assertion failed: deviation {:.2}% >= {:.2}%: {}\n  actual: {:?},\n  expected: {:?}",
                    actual_deviation, max_dev, format_args!($($arg)+), actual_val, expected_val
                );
            }
        }
    };
}

/// Linear interpolation between two values
///
/// # Examples
/// ```
/// use lower_mantle_rust::math_utils::lerp;
///
/// assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
/// assert_eq!(lerp(100.0, 200.0, 0.25), 125.0);
/// ```
pub fn lerp(a: f64, b: f64, ratio: f64) -> f64 {
    a + (b - a) * ratio
}

/// Inverse linear interpolation - find the ratio for a given value
///
/// # Examples
/// ```
/// use lower_mantle_rust::math_utils::inverse_lerp;
///
/// assert_eq!(inverse_lerp(100.0, 200.0, 150.0), 0.5);
/// ```
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if (b - a).abs() < f64::EPSILON {
        0.0 // Avoid division by zero
    } else {
        (value - a) / (b - a)
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive.
///
/// # Examples
/// ```
/// use lower_mantle_rust::math_utils::linspace;
///
/// let depths = linspace(750e3, 2700e3, 20);
/// assert_eq!(depths.len(), 20);
/// assert_eq!(depths[0], 750e3);
/// assert_eq!(depths[19], 2700e3);
/// ```
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise-linear lookup of `x` in an ascending table.
///
/// Returns `None` when `x` is outside `[xs[0], xs[last]]` or the table is empty.
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    let first = *xs.first()?;
    let last = *xs.last()?;
    if xs.len() != ys.len() || x < first || x > last {
        return None;
    }
    // index of the first node >= x
    let upper = xs.partition_point(|&node| node < x);
    if upper == 0 {
        return Some(ys[0]);
    }
    let lower = upper - 1;
    let ratio = inverse_lerp(xs[lower], xs[upper], x);
    Some(lerp(ys[lower], ys[upper], ratio))
}

/// Root mean square of the finite entries; `None` if there are none.
pub fn rms(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let mean_square = finite.iter().map(|v| v * v).sum::<f64>() / finite.len() as f64;
    Some(mean_square.sqrt())
}

/// Calculate the percentage deviation between actual and expected values
///
/// # Examples
/// ```
/// use lower_mantle_rust::math_utils::percent_deviation;
///
/// // 105 is 5% higher than 100
/// assert_eq!(percent_deviation(105.0, 100.0), 5.0);
///
/// // 95 is 5% lower than 100
/// assert_eq!(percent_deviation(95.0, 100.0), 5.0);
/// ```
pub fn percent_deviation(actual: f64, expected: f64) -> f64 {
    if expected.abs() < f64::EPSILON {
        if actual.abs() < f64::EPSILON {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        ((actual - expected).abs() / expected.abs()) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(100.0, 200.0, 0.25), 125.0);
    }

    #[test]
    fn test_inverse_lerp() {
        assert_eq!(inverse_lerp(0.0, 10.0, 5.0), 0.5);
        assert_eq!(inverse_lerp(100.0, 200.0, 200.0), 1.0);
        assert_eq!(inverse_lerp(5.0, 5.0, 5.0), 0.0);
    }

    #[test]
    fn test_linspace() {
        let values = linspace(0.0, 10.0, 11);
        assert_eq!(values.len(), 11);
        assert_eq!(values[3], 3.0);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(4.0, 9.0, 1), vec![4.0]);
    }

    #[test]
    fn test_interpolate() {
        let xs = [0.0, 10.0, 20.0];
        let ys = [0.0, 100.0, 400.0];
        assert_eq!(interpolate(&xs, &ys, 5.0), Some(50.0));
        assert_eq!(interpolate(&xs, &ys, 15.0), Some(250.0));
        assert_eq!(interpolate(&xs, &ys, 0.0), Some(0.0));
        assert_eq!(interpolate(&xs, &ys, 20.0), Some(400.0));
        assert_eq!(interpolate(&xs, &ys, 20.5), None);
        assert_eq!(interpolate(&[], &[], 1.0), None);
    }

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[3.0, -3.0]), Some(3.0));
        assert_eq!(rms(&[f64::NAN, 2.0]), Some(2.0));
        assert_eq!(rms(&[]), None);
    }

    #[test]
    fn test_percent_deviation() {
        assert_eq!(percent_deviation(105.0, 100.0), 5.0);
        assert_eq!(percent_deviation(100.0, 100.0), 0.0);
        assert!((percent_deviation(1530.0, 1500.0) - 2.0).abs() < 0.001);
        assert_eq!(percent_deviation(0.0, 0.0), 0.0);
        assert_eq!(percent_deviation(10.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_assert_deviation_macro() {
        assert_deviation!(105.0, 100.0, 10.0);
        assert_deviation!(2.0 * 52.5, 100.0, 10.0);
        assert_deviation!(1530.0, 1500.0, 5.0, "Temperature should be within 5%");
    }

    #[test]
    #[should_panic(expected = "assertion failed: deviation")]
    fn test_assert_deviation_macro_fails() {
        assert_deviation!(120.0, 100.0, 10.0);
    }
}
