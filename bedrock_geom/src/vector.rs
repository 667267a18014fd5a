// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vector Kernel
//!
//! The minimal linear-algebra surface the geometry queries need: a
//! [`Scalar`] trait closing over `f32`/`f64` with a per-type near-zero
//! tolerance, fixed-size [`Vector2`]/[`Vector3`] types, and a small
//! [`Quaternion`] used by the axis-alignment check. Queries are written
//! against the [`GeomVector`] trait so each exists once for both dimensions.
//!
//! With the `exact-math` feature enabled, [`is_zero`] compares against
//! literal zero instead of the tolerance.

use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};

/// Scalar precision the geometry module is generic over.
pub trait Scalar:
    Copy
    + PartialEq
    + PartialOrd
    + std::fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
    const HALF: Self;
    const TWO: Self;
    /// Near-zero tolerance for this precision.
    const TOLERANCE: Self;

    fn sqrt(self) -> Self;
    fn abs(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
}

impl Scalar for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const HALF: Self = 0.5;
    const TWO: Self = 2.0;
    const TOLERANCE: Self = 1.0e-5;

    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
    fn abs(self) -> Self {
        f32::abs(self)
    }
    fn sin(self) -> Self {
        f32::sin(self)
    }
    fn cos(self) -> Self {
        f32::cos(self)
    }
}

impl Scalar for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const HALF: Self = 0.5;
    const TWO: Self = 2.0;
    const TOLERANCE: Self = 1.0e-12;

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    fn abs(self) -> Self {
        f64::abs(self)
    }
    fn sin(self) -> Self {
        f64::sin(self)
    }
    fn cos(self) -> Self {
        f64::cos(self)
    }
}

/// Whether `value` is zero under the active comparison policy.
#[cfg(not(feature = "exact-math"))]
pub fn is_zero<T: Scalar>(value: T) -> bool {
    value.abs() < T::TOLERANCE
}

/// Whether `value` is exactly zero (`exact-math` build).
#[cfg(feature = "exact-math")]
pub fn is_zero<T: Scalar>(value: T) -> bool {
    value == T::ZERO
}

/// Whether two scalars agree under the active comparison policy.
pub fn are_equal<T: Scalar>(a: T, b: T) -> bool {
    is_zero(a - b)
}

/// The vector operations shared by both dimensions.
pub trait GeomVector:
    Copy + PartialEq + std::fmt::Debug + Add<Output = Self> + Sub<Output = Self> + Neg<Output = Self>
{
    type Scalar: Scalar;
    const DIM: usize;

    fn zero() -> Self;
    fn at(&self, i: usize) -> Self::Scalar;
    fn set_at(&mut self, i: usize, v: Self::Scalar);
    fn dot(self, rhs: Self) -> Self::Scalar;
    fn scale(self, s: Self::Scalar) -> Self;

    fn mag_sq(self) -> Self::Scalar {
        self.dot(self)
    }

    fn mag(self) -> Self::Scalar {
        self.mag_sq().sqrt()
    }

    /// Componentwise equality under the active comparison policy.
    fn approx_eq(self, rhs: Self) -> bool {
        (0..Self::DIM).all(|i| are_equal(self.at(i), rhs.at(i)))
    }

    /// Unit vector in the same direction, or `None` for a near-zero input.
    fn normalized(self) -> Option<Self> {
        let len_sq = self.mag_sq();
        if is_zero(len_sq) {
            None
        } else {
            Some(self.scale(Self::Scalar::ONE / len_sq.sqrt()))
        }
    }
}

/// A 2-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2<T> {
    pub x: T,
    pub y: T,
}

/// A 3-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector2<T> {
    pub const fn new(x: T, y: T) -> Self {
        Vector2 { x, y }
    }
}

impl<T> Vector3<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Vector3 { x, y, z }
    }
}

/// Cross product, defined for three dimensions only.
pub fn cross<T: Scalar>(a: Vector3<T>, b: Vector3<T>) -> Vector3<T> {
    Vector3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

impl<T: Scalar> GeomVector for Vector2<T> {
    type Scalar = T;
    const DIM: usize = 2;

    fn zero() -> Self {
        Vector2::new(T::ZERO, T::ZERO)
    }

    fn at(&self, i: usize) -> T {
        match i {
            0 => self.x,
            1 => self.y,
            _ => panic!("vector2 index {i} out of range"),
        }
    }

    fn set_at(&mut self, i: usize, v: T) {
        match i {
            0 => self.x = v,
            1 => self.y = v,
            _ => panic!("vector2 index {i} out of range"),
        }
    }

    fn dot(self, rhs: Self) -> T {
        self.x * rhs.x + self.y * rhs.y
    }

    fn scale(self, s: T) -> Self {
        Vector2::new(self.x * s, self.y * s)
    }
}

impl<T: Scalar> GeomVector for Vector3<T> {
    type Scalar = T;
    const DIM: usize = 3;

    fn zero() -> Self {
        Vector3::new(T::ZERO, T::ZERO, T::ZERO)
    }

    fn at(&self, i: usize) -> T {
        match i {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("vector3 index {i} out of range"),
        }
    }

    fn set_at(&mut self, i: usize, v: T) {
        match i {
            0 => self.x = v,
            1 => self.y = v,
            2 => self.z = v,
            _ => panic!("vector3 index {i} out of range"),
        }
    }

    fn dot(self, rhs: Self) -> T {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    fn scale(self, s: T) -> Self {
        Vector3::new(self.x * s, self.y * s, self.z * s)
    }
}

macro_rules! vector_ops {
    ($name:ident { $($f:ident),+ }) => {
        impl<T: Scalar> Add for $name<T> {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                $name { $($f: self.$f + rhs.$f),+ }
            }
        }
        impl<T: Scalar> Sub for $name<T> {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                $name { $($f: self.$f - rhs.$f),+ }
            }
        }
        impl<T: Scalar> Neg for $name<T> {
            type Output = Self;
            fn neg(self) -> Self {
                $name { $($f: -self.$f),+ }
            }
        }
        impl<T: Scalar> Mul<T> for $name<T> {
            type Output = Self;
            fn mul(self, s: T) -> Self {
                $name { $($f: self.$f * s),+ }
            }
        }
        impl<T: Scalar> Div<T> for $name<T> {
            type Output = Self;
            fn div(self, s: T) -> Self {
                $name { $($f: self.$f / s),+ }
            }
        }
    };
}

vector_ops!(Vector2 { x, y });
vector_ops!(Vector3 { x, y, z });

impl<T: Scalar> Index<usize> for Vector2<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("vector2 index {i} out of range"),
        }
    }
}

impl<T: Scalar> IndexMut<usize> for Vector2<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("vector2 index {i} out of range"),
        }
    }
}

impl<T: Scalar> Index<usize> for Vector3<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("vector3 index {i} out of range"),
        }
    }
}

impl<T: Scalar> IndexMut<usize> for Vector3<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("vector3 index {i} out of range"),
        }
    }
}

/// A rotation quaternion, `w + xi + yj + zk`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion<T> {
    pub w: T,
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Scalar> Quaternion<T> {
    pub fn identity() -> Self {
        Quaternion {
            w: T::ONE,
            x: T::ZERO,
            y: T::ZERO,
            z: T::ZERO,
        }
    }

    /// Rotation of `angle` radians about `axis`. A near-zero axis yields the
    /// identity rotation.
    pub fn from_axis_angle(axis: Vector3<T>, angle: T) -> Self {
        match axis.normalized() {
            None => Quaternion::identity(),
            Some(unit) => {
                let half = angle * T::HALF;
                let s = half.sin();
                Quaternion {
                    w: half.cos(),
                    x: unit.x * s,
                    y: unit.y * s,
                    z: unit.z * s,
                }
            }
        }
    }

    /// Applies the rotation to a vector.
    pub fn apply(&self, v: Vector3<T>) -> Vector3<T> {
        let axis = Vector3::new(self.x, self.y, self.z);
        let t = cross(axis, v).scale(T::TWO);
        v + t.scale(self.w) + cross(axis, t)
    }
}
