//! Immutable 2D vector used for positions, velocities and directions.
//!
//! Equality on [`Vector`] is approximate: two vectors compare equal when every
//! component agrees within [`Vector::TOLERANCE`], scaled by the component
//! magnitude once it exceeds 1. Repeated unit-vector scaling drifts by a few
//! ULPs and exact comparison would make such vectors unequal.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vector
// ---------------------------------------------------------------------------

/// A 2D vector with `f64` components.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    /// Tolerance applied by the `PartialEq` implementation.
    pub const TOLERANCE: f64 = 1e-6;

    /// Construct a vector from its components.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The zero vector.
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// The vector pointing from `origin` to `dest`.
    #[inline]
    pub fn from_points(origin: Vector, dest: Vector) -> Self {
        Self::new(dest.x - origin.x, dest.y - origin.y)
    }

    #[inline]
    pub fn add(self, other: Vector) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    #[inline]
    pub fn sub(self, other: Vector) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    #[inline]
    pub fn mul(self, value: f64) -> Self {
        Self::new(self.x * value, self.y * value)
    }

    #[inline]
    pub fn div(self, value: f64) -> Self {
        self.mul(1.0 / value)
    }

    /// Alias of [`mul`](Self::mul).
    #[inline]
    pub fn scalar(self, mult: f64) -> Self {
        self.mul(mult)
    }

    /// Euclidean length.
    #[inline]
    pub fn size(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// The unit vector in the same direction. The zero vector maps to itself.
    pub fn unit(self) -> Self {
        let size = self.size();
        if size > 0.0 {
            self.div(size)
        } else {
            self
        }
    }

    /// Euclidean distance between two points.
    #[inline]
    pub fn distance(self, other: Vector) -> f64 {
        Self::from_points(self, other).size()
    }

    /// `true` only for the exact zero vector.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Component-wise comparison with an explicit absolute tolerance.
    pub fn approx_eq(self, other: Vector, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    #[inline]
    pub fn as_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        fn close(a: f64, b: f64) -> bool {
            (a - b).abs() <= Vector::TOLERANCE * a.abs().max(b.abs()).max(1.0)
        }
        close(self.x, other.x) && close(self.y, other.y)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec({:.2}, {:.2})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::add(self, rhs)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::sub(self, rhs)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f64) -> Vector {
        Vector::mul(self, rhs)
    }
}

impl Div<f64> for Vector {
    type Output = Vector;
    fn div(self, rhs: f64) -> Vector {
        Vector::div(self, rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
