//! Fixed-Point 3D Vector
//!
//! Deterministic 3D vector operations for battle physics.
//! All operations use fixed-point arithmetic and return new values.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use serde::{Serialize, Deserialize};

use super::fixed::{Fix64, FixedError};

/// 3D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVector3 {
    /// X component (along the lane)
    pub x: Fix64,
    /// Y component (up)
    pub y: Fix64,
    /// Z component (across the lane)
    pub z: Fix64,
}

impl FixedVector3 {
    /// Zero vector
    pub const ZERO: Self = Self::new(Fix64::ZERO, Fix64::ZERO, Fix64::ZERO);

    /// All components one
    pub const ONE: Self = Self::new(Fix64::ONE, Fix64::ONE, Fix64::ONE);

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self::new(Fix64::ONE, Fix64::ZERO, Fix64::ZERO);

    /// Unit vector pointing left (-X)
    pub const LEFT: Self = Self::new(Fix64::from_int(-1), Fix64::ZERO, Fix64::ZERO);

    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self::new(Fix64::ZERO, Fix64::ONE, Fix64::ZERO);

    /// Unit vector pointing down (-Y)
    pub const DOWN: Self = Self::new(Fix64::ZERO, Fix64::from_int(-1), Fix64::ZERO);

    /// Unit vector pointing forward (+Z)
    pub const FORWARD: Self = Self::new(Fix64::ZERO, Fix64::ZERO, Fix64::ONE);

    /// Unit vector pointing back (-Z)
    pub const BACK: Self = Self::new(Fix64::ZERO, Fix64::ZERO, Fix64::from_int(-1));

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fix64, y: Fix64, z: Fix64) -> Self {
        Self { x, y, z }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32, z: i32) -> Self {
        Self::new(Fix64::from_int(x), Fix64::from_int(y), Fix64::from_int(z))
    }

    /// Scale by a fixed-point scalar.
    #[inline]
    pub fn scale(self, scalar: Fix64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }

    /// Divide by a scalar, returning an error on zero.
    #[inline]
    pub fn checked_div(self, scalar: Fix64) -> Result<Self, FixedError> {
        Ok(Self::new(
            self.x.checked_div(scalar)?,
            self.y.checked_div(scalar)?,
            self.z.checked_div(scalar)?,
        ))
    }

    /// Squared length (avoids sqrt - prefer this for comparisons).
    #[inline]
    pub fn sqr_magnitude(self) -> Fix64 {
        Fix64::sum_of_products([(self.x, self.x), (self.y, self.y), (self.z, self.z)])
    }

    /// Length (magnitude). Prefer `sqr_magnitude` when possible.
    #[inline]
    pub fn magnitude(self) -> Fix64 {
        self.sqr_magnitude().sqrt()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_sqr(self, other: Self) -> Fix64 {
        (self - other).sqr_magnitude()
    }

    /// Distance to another point. Prefer `distance_sqr` when possible.
    #[inline]
    pub fn distance(self, other: Self) -> Fix64 {
        (self - other).magnitude()
    }

    /// Normalize to unit length.
    /// Returns ZERO if length is zero (never panics, unlike `/`).
    #[inline]
    pub fn normalized(self) -> Self {
        self.normalized_or(Self::ZERO)
    }

    /// Normalize to unit length, or return `fallback` for a zero vector.
    #[inline]
    pub fn normalized_or(self, fallback: Self) -> Self {
        let len = self.magnitude();
        if len.is_zero() {
            return fallback;
        }
        self / len
    }

    /// Dot product with another vector. Saturates instead of wrapping.
    #[inline]
    pub fn dot(self, other: Self) -> Fix64 {
        Fix64::sum_of_products([(self.x, other.x), (self.y, other.y), (self.z, other.z)])
    }

    /// Cross product.
    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Linear interpolation between two vectors.
    /// t is clamped to [0, 1]; 0 returns self, 1 returns other.
    #[inline]
    pub fn lerp(self, other: Self, t: Fix64) -> Self {
        let t = t.clamp(Fix64::ZERO, Fix64::ONE);
        self + (other - self) * t
    }

    /// Move toward `target` by at most `max_delta`.
    pub fn move_towards(self, target: Self, max_delta: Fix64) -> Self {
        let direction = target - self;
        let distance = direction.magnitude();
        if distance <= max_delta || distance.is_zero() {
            return target;
        }
        self + direction / distance * max_delta
    }

    /// Reflect a direction off a plane with the given normal.
    #[inline]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * (Fix64::from_int(2) * self.dot(normal))
    }

    /// Absolute value of every component.
    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Replace X.
    #[inline]
    pub fn with_x(self, x: Fix64) -> Self {
        Self { x, ..self }
    }

    /// Replace Y.
    #[inline]
    pub fn with_y(self, y: Fix64) -> Self {
        Self { y, ..self }
    }

    /// Replace Z.
    #[inline]
    pub fn with_z(self, z: Fix64) -> Self {
        Self { z, ..self }
    }

    /// Convert to float tuple for logging.
    #[inline]
    pub fn to_f64s(self) -> (f64, f64, f64) {
        (self.x.to_f64(), self.y.to_f64(), self.z.to_f64())
    }
}

// Operator overloads for ergonomics
impl Add for FixedVector3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for FixedVector3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for FixedVector3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<Fix64> for FixedVector3 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Fix64) -> Self {
        self.scale(rhs)
    }
}

impl Mul<FixedVector3> for Fix64 {
    type Output = FixedVector3;
    #[inline]
    fn mul(self, rhs: FixedVector3) -> FixedVector3 {
        rhs.scale(self)
    }
}

impl Div<Fix64> for FixedVector3 {
    type Output = Self;

    /// # Panics
    /// Panics when dividing by zero.
    #[inline]
    fn div(self, rhs: Fix64) -> Self {
        match self.checked_div(rhs) {
            Ok(value) => value,
            Err(_) => panic!("FixedVector3 division by zero"),
        }
    }
}

impl AddAssign for FixedVector3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for FixedVector3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Debug for FixedVector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.to_f64s();
        write!(f, "Vec3({:.3}, {:.3}, {:.3})", x, y, z)
    }
}

impl fmt::Display for FixedVector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.to_f64s();
        write!(f, "({:.3}, {:.3}, {:.3})", x, y, z)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: i32, y: i32, z: i32) -> FixedVector3 {
        FixedVector3::from_ints(x, y, z)
    }

    #[test]
    fn test_vec3_constants() {
        assert_eq!(FixedVector3::ZERO.x, Fix64::ZERO);
        assert_eq!(FixedVector3::RIGHT, -FixedVector3::LEFT);
        assert_eq!(FixedVector3::UP, -FixedVector3::DOWN);
        assert_eq!(FixedVector3::FORWARD, -FixedVector3::BACK);
    }

    #[test]
    fn test_vec3_arithmetic() {
        let a = v(3, 4, 5);
        let b = v(1, 2, 3);
        assert_eq!(a + b, v(4, 6, 8));
        assert_eq!(a - b, v(2, 2, 2));
        assert_eq!(a * Fix64::from_int(2), v(6, 8, 10));
        assert_eq!(Fix64::from_int(2) * a, v(6, 8, 10));
        assert_eq!(v(6, 8, 10) / Fix64::from_int(2), a);
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn test_vec3_div_by_zero_panics() {
        let _ = v(1, 2, 3) / Fix64::ZERO;
    }

    #[test]
    fn test_vec3_checked_div() {
        assert_eq!(v(1, 2, 3).checked_div(Fix64::ZERO), Err(FixedError::DivideByZero));
        assert_eq!(v(2, 4, 6).checked_div(Fix64::from_int(2)), Ok(v(1, 2, 3)));
    }

    #[test]
    fn test_vec3_length() {
        let vec = v(2, 3, 6);
        assert_eq!(vec.sqr_magnitude(), Fix64::from_int(49));
        assert_eq!(vec.magnitude(), Fix64::from_int(7));
        assert_eq!(v(0, 0, 0).distance_sqr(v(3, 4, 0)), Fix64::from_int(25));
        assert_eq!(v(0, 0, 0).distance(v(3, 4, 0)), Fix64::from_int(5));
    }

    #[test]
    fn test_vec3_long_distances_saturate() {
        // Each square fits on its own, their sum does not
        assert_eq!(v(40000, 40000, 0).sqr_magnitude(), Fix64::MAX);
        assert_eq!(v(40000, 40000, 0).dot(v(-40000, -40000, 0)), Fix64::MIN);

        // A saturated square plus a small one stays saturated
        let far = v(0, 0, 40000).distance_sqr(v(24, 0, -40000));
        assert_eq!(far, Fix64::MAX);
        assert!(v(0, 0, 40000).distance(v(24, 0, -40000)) > Fix64::from_int(40000));
    }

    #[test]
    fn test_vec3_normalize() {
        let norm = v(0, 3, 4).normalized();
        assert!((norm.magnitude() - Fix64::ONE).abs().raw() <= 4);

        // Exact along an axis
        assert_eq!(v(4, 0, 0).normalized(), FixedVector3::RIGHT);

        // Zero vector degrades gracefully instead of panicking
        assert_eq!(FixedVector3::ZERO.normalized(), FixedVector3::ZERO);
        assert_eq!(FixedVector3::ZERO.normalized_or(FixedVector3::RIGHT), FixedVector3::RIGHT);
    }

    #[test]
    fn test_vec3_dot_cross() {
        assert_eq!(v(1, 2, 3).dot(v(4, 5, 6)), Fix64::from_int(32));
        assert_eq!(FixedVector3::RIGHT.cross(FixedVector3::UP), FixedVector3::FORWARD);
    }

    #[test]
    fn test_vec3_lerp_move_reflect() {
        assert_eq!(v(0, 0, 0).lerp(v(10, 20, 30), Fix64::HALF), v(5, 10, 15));
        assert_eq!(v(0, 0, 0).lerp(v(10, 20, 30), Fix64::from_int(3)), v(10, 20, 30));

        assert_eq!(v(0, 0, 0).move_towards(v(10, 0, 0), Fix64::from_int(3)), v(3, 0, 0));
        assert_eq!(v(0, 0, 0).move_towards(v(1, 0, 0), Fix64::from_int(3)), v(1, 0, 0));

        assert_eq!(v(1, -1, 0).reflect(FixedVector3::UP), v(1, 1, 0));
    }

    #[test]
    fn test_vec3_with_components() {
        let a = v(1, 2, 3);
        assert_eq!(a.with_x(Fix64::ZERO), v(0, 2, 3));
        assert_eq!(a.with_y(Fix64::ZERO), v(1, 0, 3));
        assert_eq!(a.with_z(Fix64::ZERO), v(1, 2, 0));
    }

    #[test]
    fn test_vec3_serde() {
        let parsed: FixedVector3 = serde_json::from_str(r#"{"x": 2, "y": "5", "z": null}"#).unwrap();
        assert_eq!(parsed, v(2, 5, 0));
    }
}
