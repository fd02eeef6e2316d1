/// Floating point type used throughout system
pub type Real = f64;

/// Second-order one-sided extrapolation onto a wall node: `2·near − far`.
#[inline]
pub fn extrapolate_linear(near: Real, far: Real) -> Real {
    2.0 * near - far
}
