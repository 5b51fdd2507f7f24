// Our Real scalar type: the kernel is fixed to double precision.
pub type Real = f64;

/// Epsilon for point/plane classification throughout the CSG side.
pub const EPSILON: Real = 1e-5;

/// Machine epsilon for f64, used by near-equality checks on raw coordinates.
pub const F64_EPSILON: Real = f64::EPSILON;

// Pi
pub const PI: Real = core::f64::consts::PI;

// Tau
pub const TAU: Real = core::f64::consts::TAU;
