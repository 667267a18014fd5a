// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Intersection Queries
//!
//! Boolean intersection tests (TI) and geometric find-intersection queries
//! (FI). Point/box and box/box are componentwise interval checks; the 2D
//! point-in-polygon test is the Hao–Sun–Chen–Cai–Tan predicate, which
//! classifies boundary contact exactly before any in/out counting. The
//! segment and ray against plane/triangle queries report a
//! [`GeometryCode`] plus the intersection point and parameter where one
//! exists.

use bedrock_core::{Error, Result};

use crate::primitives::{Aabb, Plane, Ray, Segment, Triangle};
use crate::util::scalar_triple_product;
use crate::vector::{is_zero, GeomVector, Scalar, Vector2, Vector3};
use crate::GeometryCode;

/// Whether `point` lies inside or on `aabb`.
pub fn ti_point_aabb<V: GeomVector>(point: V, aabb: &Aabb<V>) -> GeometryCode {
    for i in 0..V::DIM {
        if point.at(i) < aabb.min_point().at(i) || point.at(i) > aabb.max_point().at(i) {
            return GeometryCode::NotIntersecting;
        }
    }
    GeometryCode::Intersecting
}

/// Whether two boxes intersect (touching counts).
pub fn ti_aabb_aabb<V: GeomVector>(box0: &Aabb<V>, box1: &Aabb<V>) -> GeometryCode {
    for i in 0..V::DIM {
        if box0.min_point().at(i) > box1.max_point().at(i)
            || box1.min_point().at(i) > box0.max_point().at(i)
        {
            return GeometryCode::NotIntersecting;
        }
    }
    GeometryCode::Intersecting
}

/// Classifies `point` against the polygon `points` (closed implicitly).
///
/// Returns `CompletelyInside`, `CompletelyOutside` or `OnBoundary`. The
/// boundary cases short-circuit before the crossing count, so a vertex or
/// edge hit is never misreported by parity. Comparisons here are exact by
/// construction of the predicate.
// Adapted from "Optimal Reliable Point-in-Polygon Test and Differential
// Coding Boolean Operations on Polygons", Hao, Sun, Chen, Cai, Tan.
pub fn ti2_point_polygon<T: Scalar>(point: Vector2<T>, points: &[Vector2<T>]) -> Result<GeometryCode> {
    if points.len() < 3 {
        return Err(Error::InvalidParameter);
    }

    let mut k = 0usize;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        let v1 = points[i].y - point.y;
        let v2 = points[j].y - point.y;

        if (v1 < T::ZERO && v2 < T::ZERO) || (v1 > T::ZERO && v2 > T::ZERO) {
            continue;
        }

        let u1 = points[i].x - point.x;
        let u2 = points[j].x - point.x;
        let f = u1 * v2 - u2 * v1;

        if v2 > T::ZERO && v1 <= T::ZERO {
            if f > T::ZERO {
                k += 1;
            } else if f == T::ZERO {
                return Ok(GeometryCode::OnBoundary);
            }
        } else if v1 > T::ZERO && v2 <= T::ZERO {
            if f < T::ZERO {
                k += 1;
            } else if f == T::ZERO {
                return Ok(GeometryCode::OnBoundary);
            }
        } else if (v2 == T::ZERO && v1 < T::ZERO) || (v1 == T::ZERO && v2 < T::ZERO) {
            if f == T::ZERO {
                return Ok(GeometryCode::OnBoundary);
            }
        } else if v1 == T::ZERO && v2 == T::ZERO {
            if (u2 <= T::ZERO && u1 >= T::ZERO) || (u1 <= T::ZERO && u2 >= T::ZERO) {
                return Ok(GeometryCode::OnBoundary);
            }
        }
    }

    Ok(if k % 2 == 0 {
        GeometryCode::CompletelyOutside
    } else {
        GeometryCode::CompletelyInside
    })
}

/// Intersection of a linear primitive with a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiPlaneResult<T> {
    pub code: GeometryCode,
    pub point: Vector3<T>,
    pub u: T,
}

/// Segment against plane. A parallel segment reports `Overlapping` when it
/// lies in the plane and `NotIntersecting` otherwise; a crossing outside
/// `[0, 1]` reports `NotIntersecting` with `u` clamped.
pub fn fi3_segment_plane<T: Scalar>(seg: &Segment<Vector3<T>>, plane: &Plane<T>) -> FiPlaneResult<T> {
    let denom = plane.normal().dot(seg.direction());

    let (code, u) = if is_zero(denom) {
        let dist = plane.signed_distance(seg.p0()).abs();
        if is_zero(dist) {
            (GeometryCode::Overlapping, T::ZERO)
        } else {
            (GeometryCode::NotIntersecting, T::ZERO)
        }
    } else {
        let u = -(seg.p0().dot(plane.normal()) + plane.offset()) / denom;
        if u < T::ZERO {
            (GeometryCode::NotIntersecting, T::ZERO)
        } else if u > T::ONE {
            (GeometryCode::NotIntersecting, T::ONE)
        } else {
            (GeometryCode::Intersecting, u)
        }
    };

    FiPlaneResult {
        code,
        point: seg.p0() + seg.direction().scale(u),
        u,
    }
}

/// Ray against plane; like the segment query but one-sided. A parallel ray
/// lying in the plane reports `Coincident`.
pub fn fi3_ray_plane<T: Scalar>(ray: &Ray<Vector3<T>>, plane: &Plane<T>) -> FiPlaneResult<T> {
    let denom = plane.normal().dot(ray.direction());

    let (code, u) = if is_zero(denom) {
        if is_zero(plane.signed_distance(ray.origin())) {
            (GeometryCode::Coincident, T::ZERO)
        } else {
            (GeometryCode::NotIntersecting, T::ZERO)
        }
    } else {
        let u = -(ray.origin().dot(plane.normal()) + plane.offset()) / denom;
        if u < T::ZERO {
            (GeometryCode::NotIntersecting, T::ZERO)
        } else {
            (GeometryCode::Intersecting, u)
        }
    };

    FiPlaneResult {
        code,
        point: ray.origin() + ray.direction().scale(u),
        u,
    }
}

/// Result of the segment/triangle query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiSegmentTriangleResult<T> {
    pub code: GeometryCode,
    pub point: Vector3<T>,
}

/// Segment against triangle by scalar-triple-product sign agreement over
/// the three edges.
///
/// A segment lying in the triangle's plane currently fails with
/// [`Error::Failure`]; the coplanar intersection is not computed.
// Based on Real Time Collision Detection, Christer Ericson p184
pub fn fi3_segment_triangle<T: Scalar>(
    seg: &Segment<Vector3<T>>,
    tri: &Triangle<Vector3<T>>,
) -> Result<FiSegmentTriangleResult<T>> {
    let s0s1 = seg.p1() - seg.p0();
    let s0t0 = tri.p0() - seg.p0();
    let s0t1 = tri.p1() - seg.p0();
    let s0t2 = tri.p2() - seg.p0();

    let mut u = scalar_triple_product(s0s1, s0t2, s0t1);
    let mut v = scalar_triple_product(s0s1, s0t0, s0t2);
    let mut w = scalar_triple_product(s0s1, s0t1, s0t0);

    if is_zero(u) && is_zero(v) && is_zero(w) {
        return Err(Error::Failure);
    }

    let mut sign = 0;
    if u < T::ZERO {
        sign |= 1;
    }
    if v < T::ZERO {
        sign |= 2;
    }
    if w < T::ZERO {
        sign |= 4;
    }

    if sign > 0 && sign < 7 {
        return Ok(FiSegmentTriangleResult {
            code: GeometryCode::NotIntersecting,
            point: Vector3::zero(),
        });
    }

    let denom = T::ONE / (u + v + w);
    u = u * denom;
    v = v * denom;
    w = w * denom;

    Ok(FiSegmentTriangleResult {
        code: GeometryCode::Intersecting,
        point: tri.p0().scale(u) + tri.p1().scale(v) + tri.p2().scale(w),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Aabb2, Aabb3, Ray3, Segment3, Triangle3};

    /// Tests point/box and box/box componentwise checks, including the
    /// symmetry and reflexivity properties.
    #[test]
    fn test_aabb_queries() {
        let unit = Aabb3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(ti_point_aabb(Vector3::new(0.5, 0.5, 0.5), &unit), GeometryCode::Intersecting);
        assert_eq!(ti_point_aabb(Vector3::new(1.0, 1.0, 1.0), &unit), GeometryCode::Intersecting);
        assert_eq!(ti_point_aabb(Vector3::new(1.5, 0.5, 0.5), &unit), GeometryCode::NotIntersecting);

        assert_eq!(ti_aabb_aabb(&unit, &unit), GeometryCode::Intersecting);

        let shifted = Aabb3::new(Vector3::new(0.5, 0.5, 0.5), Vector3::new(2.0, 2.0, 2.0)).unwrap();
        assert_eq!(ti_aabb_aabb(&unit, &shifted), GeometryCode::Intersecting);
        assert_eq!(ti_aabb_aabb(&shifted, &unit), GeometryCode::Intersecting);

        let apart = Aabb3::new(Vector3::new(3.0, 0.0, 0.0), Vector3::new(4.0, 1.0, 1.0)).unwrap();
        assert_eq!(ti_aabb_aabb(&unit, &apart), GeometryCode::NotIntersecting);
        assert_eq!(ti_aabb_aabb(&apart, &unit), GeometryCode::NotIntersecting);

        let flat = Aabb2::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)).unwrap();
        assert_eq!(ti_point_aabb(Vector2::new(0.5, 2.0), &flat), GeometryCode::NotIntersecting);
        assert_eq!(ti_point_aabb(Vector2::new(0.5, 0.5), &flat), GeometryCode::Intersecting);
    }

    /// Tests in/out/boundary classification for a convex polygon.
    ///
    /// Validates that:
    /// - interior points report `CompletelyInside`
    /// - exterior points report `CompletelyOutside`
    /// - edge points and vertices report `OnBoundary`
    #[test]
    fn test_point_polygon() {
        let square = [
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(4.0, 4.0),
            Vector2::new(0.0, 4.0),
        ];

        assert_eq!(ti2_point_polygon(Vector2::new(2.0, 2.0), &square).unwrap(), GeometryCode::CompletelyInside);
        assert_eq!(ti2_point_polygon(Vector2::new(5.0, 2.0), &square).unwrap(), GeometryCode::CompletelyOutside);
        assert_eq!(ti2_point_polygon(Vector2::new(-0.1, 2.0), &square).unwrap(), GeometryCode::CompletelyOutside);

        // Edge and vertex hits.
        assert_eq!(ti2_point_polygon(Vector2::new(2.0, 0.0), &square).unwrap(), GeometryCode::OnBoundary);
        assert_eq!(ti2_point_polygon(Vector2::new(4.0, 2.0), &square).unwrap(), GeometryCode::OnBoundary);
        assert_eq!(ti2_point_polygon(Vector2::new(0.0, 0.0), &square).unwrap(), GeometryCode::OnBoundary);
        assert_eq!(ti2_point_polygon(Vector2::new(4.0, 4.0), &square).unwrap(), GeometryCode::OnBoundary);

        assert_eq!(ti2_point_polygon(Vector2::new(0.0, 0.0), &square[..2]), Err(Error::InvalidParameter));
    }

    #[test]
    fn test_segment_plane() {
        let plane = Plane::from_point_normal(Vector3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();

        let crossing = Segment3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 4.0)).unwrap();
        let hit = fi3_segment_plane(&crossing, &plane);
        assert_eq!(hit.code, GeometryCode::Intersecting);
        assert_eq!(hit.u, 0.5);
        assert_eq!(hit.point, Vector3::new(0.0, 0.0, 2.0));

        let short = Segment3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        let miss = fi3_segment_plane(&short, &plane);
        assert_eq!(miss.code, GeometryCode::NotIntersecting);
        assert_eq!(miss.u, 1.0);

        let lying = Segment3::new(Vector3::new(0.0, 0.0, 2.0), Vector3::new(1.0, 0.0, 2.0)).unwrap();
        assert_eq!(fi3_segment_plane(&lying, &plane).code, GeometryCode::Overlapping);

        let parallel = Segment3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(fi3_segment_plane(&parallel, &plane).code, GeometryCode::NotIntersecting);
    }

    #[test]
    fn test_ray_plane() {
        let plane = Plane::from_point_normal(Vector3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();

        let towards = Ray3::from_direction(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        let hit = fi3_ray_plane(&towards, &plane);
        assert_eq!(hit.code, GeometryCode::Intersecting);
        assert_eq!(hit.u, 2.0);
        assert_eq!(hit.point, Vector3::new(0.0, 0.0, 2.0));

        let away = Ray3::from_direction(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        assert_eq!(fi3_ray_plane(&away, &plane).code, GeometryCode::NotIntersecting);

        let lying = Ray3::from_direction(Vector3::new(0.0, 0.0, 2.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(fi3_ray_plane(&lying, &plane).code, GeometryCode::Coincident);
    }

    /// Tests the segment/triangle crossing, miss and coplanar cases.
    #[test]
    fn test_segment_triangle() {
        let tri = Triangle3::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(4.0, 0.0, 0.0),
            Vector3::new(0.0, 4.0, 0.0),
        )
        .unwrap();

        let through = Segment3::new(Vector3::new(1.0, 1.0, -1.0), Vector3::new(1.0, 1.0, 1.0)).unwrap();
        let hit = fi3_segment_triangle(&through, &tri).unwrap();
        assert_eq!(hit.code, GeometryCode::Intersecting);
        assert!(hit.point.approx_eq(Vector3::new(1.0, 1.0, 0.0)));

        let outside = Segment3::new(Vector3::new(5.0, 5.0, -1.0), Vector3::new(5.0, 5.0, 1.0)).unwrap();
        assert_eq!(
            fi3_segment_triangle(&outside, &tri).unwrap().code,
            GeometryCode::NotIntersecting
        );

        // Coplanar input is reported as a failure, not classified.
        let coplanar = Segment3::new(Vector3::new(-1.0, -1.0, 0.0), Vector3::new(5.0, 5.0, 0.0)).unwrap();
        assert_eq!(fi3_segment_triangle(&coplanar, &tri), Err(Error::Failure));
    }
}
