pub mod closure;
pub mod distribute;
pub mod error;
pub mod history;
pub mod potential;
pub mod traffic;

// Absolute tolerance for float noise such as 200.0 * 1.1 == 220.00000000000003,
// which must not round up to an extra unit.
const ROUNDING_EPSILON: f64 = 1e-9;

/// Rounds a planned quantity up to whole units. Non-positive and non-finite
/// inputs plan nothing.
pub(crate) fn ceil_units(x: f64) -> u64 {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    let floor = x.floor();
    if x - floor <= ROUNDING_EPSILON {
        floor as u64
    } else {
        x.ceil() as u64
    }
}
