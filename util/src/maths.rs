//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Limit the magnitude of a value to `limit`, keeping its sign.
///
/// A negative `limit` is treated as its absolute value.
pub fn sym_clamp<T>(value: T, limit: T) -> T
where
    T: Float
{
    let limit = limit.abs();
    value.max(-limit).min(limit)
}

/// Zero a value whose magnitude is below the given deadband.
pub fn deadband<T>(value: T, band: T) -> T
where
    T: Float
{
    if value.abs() < band {
        T::zero()
    }
    else {
        value
    }
}

/// Arithmetic mean of a slice, or `None` if the slice is empty.
pub fn mean<T>(values: &[T]) -> Option<T>
where
    T: Float
{
    if values.is_empty() {
        return None;
    }

    let sum = values.iter().fold(T::zero(), |acc, v| acc + *v);
    T::from(values.len()).map(|n| sum / n)
}
