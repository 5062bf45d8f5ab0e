/// Checks that a numerical value lies in the provided interval and returns early with
/// [`ConfigError::OutOfRange`](crate::error::ConfigError::OutOfRange) if not
///
/// Two forms are supported:
/// - `check_interval!(value, a, b)` for the closed interval `[a,b]`
/// - `check_interval!(value, > a, b)` for the half-open interval `(a,b]`
///
/// `NaN` is never in an interval.
///
/// ### Example
/// ```ignore
/// fn validate(alpha: f32) -> Result<(), ConfigError> {
///     check_interval!(alpha, > 0.0, 1.0);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! check_interval {
    ($var:expr, > $a:expr, $b:expr) => {
        if !($var > $a && $var <= $b) {
            return Err($crate::error::ConfigError::OutOfRange {
                name: stringify!($var),
                value: $var,
                range: concat!("(", stringify!($a), ", ", stringify!($b), "]"),
            });
        }
    };
    ($var:expr, $a:expr, $b:expr) => {
        if !($var >= $a && $var <= $b) {
            return Err($crate::error::ConfigError::OutOfRange {
                name: stringify!($var),
                value: $var,
                range: concat!("[", stringify!($a), ", ", stringify!($b), "]"),
            });
        }
    };
}

/// Index of the largest value, resolving ties to the lowest index
///
/// Values that compare false against the running maximum (`NaN`) are skipped.
///
/// **Panics** if `values` is empty
pub fn argmax(values: &[f32]) -> usize {
    assert!(!values.is_empty(), "Cannot take the argmax of an empty slice");
    values
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, values[0]), |(best_ix, best), (ix, &value)| {
            if value > best || best.is_nan() {
                (ix, value)
            } else {
                (best_ix, best)
            }
        })
        .0
}
