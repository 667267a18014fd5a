// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Geometry Primitives
//!
//! Planes, boxes, lines, rays, segments, triangles and hyperspheres, generic
//! over scalar precision and (where meaningful) dimension. The fallible
//! constructors are the only way to build an instance, and they reject
//! degenerate input: a zero normal, a zero-length segment, colinear triangle
//! points, a non-positive radius, an inverted box. Every query in this crate
//! assumes its inputs came through a constructor and therefore holds the
//! corresponding invariant; results for hand-rolled degenerate values are
//! undefined.
//!
//! A degenerate instance can be thought of as belonging to a qualitatively
//! simpler class (a point is a circle of radius zero, a line is a triangle
//! of colinear points), and answering queries for the simpler class under
//! the original type's contract would be wrong, hence the hard rejection.

use bedrock_core::{Error, Result};

use crate::vector::{is_zero, GeomVector, Scalar, Vector2, Vector3};

/// A plane in 3-space stored as unit normal and offset:
/// `dot(n, p) + offset == 0` for points on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane<T> {
    normal: Vector3<T>,
    offset: T,
}

impl<T: Scalar> Plane<T> {
    /// Plane through three points. Fails for colinear points.
    pub fn from_points(p0: Vector3<T>, p1: Vector3<T>, p2: Vector3<T>) -> Result<Self> {
        let w = crate::vector::cross(p1 - p0, p2 - p0);
        let len_sq = w.mag_sq();
        if is_zero(len_sq) {
            return Err(Error::Failure);
        }
        let normal = w.scale(T::ONE / len_sq.sqrt());
        Ok(Plane {
            normal,
            offset: (-p0).dot(normal),
        })
    }

    /// Plane through `point` with the given (not necessarily unit) normal.
    /// Fails for a near-zero normal.
    pub fn from_point_normal(point: Vector3<T>, normal: Vector3<T>) -> Result<Self> {
        let len_sq = normal.mag_sq();
        if is_zero(len_sq) {
            return Err(Error::Failure);
        }
        let normal = normal.scale(T::ONE / len_sq.sqrt());
        Ok(Plane {
            normal,
            offset: -point.dot(normal),
        })
    }

    pub fn normal(&self) -> Vector3<T> {
        self.normal
    }

    pub fn offset(&self) -> T {
        self.offset
    }

    /// Signed distance from `point`; positive on the normal side.
    pub fn signed_distance(&self, point: Vector3<T>) -> T {
        point.dot(self.normal) + self.offset
    }
}

/// An axis-aligned box; invariant `min <= max` componentwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb<V> {
    min_point: V,
    max_point: V,
}

impl<V: GeomVector> Aabb<V> {
    pub fn new(min_point: V, max_point: V) -> Result<Self> {
        for i in 0..V::DIM {
            if min_point.at(i) > max_point.at(i) {
                return Err(Error::Failure);
            }
        }
        Ok(Aabb { min_point, max_point })
    }

    pub fn min_point(&self) -> V {
        self.min_point
    }

    pub fn max_point(&self) -> V {
        self.max_point
    }

    pub fn centre(&self) -> V {
        (self.min_point + self.max_point).scale(V::Scalar::HALF)
    }

    /// Grows this box to cover `other`.
    pub fn merge(&mut self, other: &Aabb<V>) {
        for i in 0..V::DIM {
            if other.min_point.at(i) < self.min_point.at(i) {
                self.min_point.set_at(i, other.min_point.at(i));
            }
            if other.max_point.at(i) > self.max_point.at(i) {
                self.max_point.set_at(i, other.max_point.at(i));
            }
        }
    }
}

/// An infinite line: origin plus unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<V> {
    origin: V,
    direction: V,
}

/// A half-infinite ray: origin plus unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray<V> {
    origin: V,
    direction: V,
}

macro_rules! directed_ctor {
    ($name:ident) => {
        impl<V: GeomVector> $name<V> {
            /// Through two points. Fails when the points coincide.
            pub fn from_points(p0: V, p1: V) -> Result<Self> {
                match (p1 - p0).normalized() {
                    Some(direction) => Ok($name { origin: p0, direction }),
                    None => Err(Error::Failure),
                }
            }

            /// From an origin and a (not necessarily unit) direction. Fails
            /// for a near-zero direction.
            pub fn from_direction(origin: V, dir: V) -> Result<Self> {
                match dir.normalized() {
                    Some(direction) => Ok($name { origin, direction }),
                    None => Err(Error::Failure),
                }
            }

            pub fn origin(&self) -> V {
                self.origin
            }

            /// The unit direction.
            pub fn direction(&self) -> V {
                self.direction
            }
        }
    };
}

directed_ctor!(Line);
directed_ctor!(Ray);

/// A bounded segment between two distinct endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<V> {
    p0: V,
    p1: V,
}

impl<V: GeomVector> Segment<V> {
    pub fn new(p0: V, p1: V) -> Result<Self> {
        if p0.approx_eq(p1) {
            return Err(Error::Failure);
        }
        Ok(Segment { p0, p1 })
    }

    pub fn p0(&self) -> V {
        self.p0
    }

    pub fn p1(&self) -> V {
        self.p1
    }

    /// The (unnormalised) direction `p1 - p0`.
    pub fn direction(&self) -> V {
        self.p1 - self.p0
    }

    pub fn length(&self) -> V::Scalar {
        self.direction().mag()
    }

    pub fn length_sq(&self) -> V::Scalar {
        self.direction().mag_sq()
    }

    /// Centre, unit direction and half-extent representation.
    pub fn centered_form(&self) -> Result<(V, V, V::Scalar)> {
        let direction = self.direction();
        let len_sq = direction.mag_sq();
        if is_zero(len_sq) {
            return Err(Error::Failure);
        }
        let len = len_sq.sqrt();
        let centre = (self.p0 + self.p1).scale(V::Scalar::HALF);
        Ok((centre, direction.scale(V::Scalar::ONE / len), len * V::Scalar::HALF))
    }
}

/// A triangle; the constructor rejects colinear points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle<V> {
    p0: V,
    p1: V,
    p2: V,
}

impl<V: GeomVector> Triangle<V> {
    pub fn new(p0: V, p1: V, p2: V) -> Result<Self> {
        let tri = Triangle { p0, p1, p2 };
        // Colinear points make the longest side the sum of the other two.
        let mut sides = tri.side_lengths();
        crate::util::sort3_low_to_high(&mut sides);
        if is_zero(sides[2] - (sides[0] + sides[1])) {
            return Err(Error::Failure);
        }
        Ok(tri)
    }

    pub fn p0(&self) -> V {
        self.p0
    }

    pub fn p1(&self) -> V {
        self.p1
    }

    pub fn p2(&self) -> V {
        self.p2
    }

    /// Side lengths `|p0-p1|, |p0-p2|, |p1-p2|`.
    pub fn side_lengths(&self) -> [V::Scalar; 3] {
        [
            (self.p0 - self.p1).mag(),
            (self.p0 - self.p2).mag(),
            (self.p1 - self.p2).mag(),
        ]
    }

    /// Area by Heron's formula. Each factor is floored at zero to tolerate
    /// floating-point underflow near degeneracy.
    pub fn area(&self) -> V::Scalar {
        let sides = self.side_lengths();
        let p = (sides[0] + sides[1] + sides[2]) * V::Scalar::HALF;

        let a = p - sides[0];
        if a <= V::Scalar::ZERO {
            return V::Scalar::ZERO;
        }
        let b = p - sides[1];
        if b <= V::Scalar::ZERO {
            return V::Scalar::ZERO;
        }
        let c = p - sides[2];
        if c <= V::Scalar::ZERO {
            return V::Scalar::ZERO;
        }
        (p * a * b * c).sqrt()
    }
}

/// A circle (2D) or sphere (3D); invariant `radius >= tolerance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperSphere<V: GeomVector> {
    centre: V,
    radius: V::Scalar,
}

impl<V: GeomVector> HyperSphere<V> {
    pub fn new(centre: V, radius: V::Scalar) -> Result<Self> {
        if radius < V::Scalar::TOLERANCE {
            return Err(Error::Failure);
        }
        Ok(HyperSphere { centre, radius })
    }

    pub fn centre(&self) -> V {
        self.centre
    }

    pub fn radius(&self) -> V::Scalar {
        self.radius
    }
}

pub type Aabb2<T> = Aabb<Vector2<T>>;
pub type Aabb3<T> = Aabb<Vector3<T>>;
pub type Line2<T> = Line<Vector2<T>>;
pub type Line3<T> = Line<Vector3<T>>;
pub type Ray2<T> = Ray<Vector2<T>>;
pub type Ray3<T> = Ray<Vector3<T>>;
pub type Segment2<T> = Segment<Vector2<T>>;
pub type Segment3<T> = Segment<Vector3<T>>;
pub type Triangle2<T> = Triangle<Vector2<T>>;
pub type Triangle3<T> = Triangle<Vector3<T>>;
pub type Circle2<T> = HyperSphere<Vector2<T>>;
pub type Sphere<T> = HyperSphere<Vector3<T>>;
