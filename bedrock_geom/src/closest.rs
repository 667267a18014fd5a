// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Closest-Point Queries
//!
//! Each query returns the closest point on each input together with the
//! parametric coordinate along it: unbounded for lines, clamped to `[0, 1]`
//! for segments. Queries involving two linear primitives report a
//! [`GeometryCode`]: `Parallel` when the denominator of the classical
//! two-line formula vanishes, upgraded to `Coincident` when the
//! representative closest points agree, and `Overlapping` for parallel
//! segments whose projections intersect.
//!
//! The line/line, line/segment and segment/segment formulations follow
//! Van Verth & Bishop, *Essential Mathematics for Games and Interactive
//! Applications*, 2nd ed.; the point/triangle walk is Ericson's
//! Voronoi-region test.

use crate::primitives::{Line, Plane, Segment, Triangle};
use crate::vector::{is_zero, GeomVector, Scalar, Vector3};
use crate::GeometryCode;

/// Closest point on a single primitive plus the parametric coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpOnPrimitive<V: GeomVector> {
    pub point: V,
    pub u: V::Scalar,
}

/// Result of a two-primitive closest-point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpPair<V: GeomVector> {
    pub code: GeometryCode,
    pub cp_a: V,
    pub cp_b: V,
    pub u_a: V::Scalar,
    pub u_b: V::Scalar,
}

/// Closest point on `plane` to `point`.
pub fn cp_point_plane<T: Scalar>(point: Vector3<T>, plane: &Plane<T>) -> Vector3<T> {
    point - plane.normal().scale(plane.signed_distance(point))
}

/// Closest point on `line` to `point`; `u` is unbounded.
pub fn cp_point_line<V: GeomVector>(point: V, line: &Line<V>) -> CpOnPrimitive<V> {
    let u = (point - line.origin()).dot(line.direction());
    CpOnPrimitive {
        point: line.origin() + line.direction().scale(u),
        u,
    }
}

/// Closest point on `seg` to `point`; `u` is clamped to `[0, 1]`.
pub fn cp_point_segment<V: GeomVector>(point: V, seg: &Segment<V>) -> CpOnPrimitive<V> {
    let w = point - seg.p0();
    let axis = seg.direction();
    let proj = w.dot(axis);

    let u = if proj <= V::Scalar::ZERO {
        V::Scalar::ZERO
    } else {
        let vsq = axis.mag_sq();
        if proj >= vsq {
            V::Scalar::ONE
        } else {
            proj / vsq
        }
    };

    CpOnPrimitive {
        point: seg.p0() + axis.scale(u),
        u,
    }
}

/// Closest points between two lines.
pub fn cp_line_line<V: GeomVector>(line_a: &Line<V>, line_b: &Line<V>) -> CpPair<V> {
    let w0 = line_a.origin() - line_b.origin();
    let a = line_a.direction().dot(line_b.direction());
    let b = line_a.direction().dot(w0);
    let c = line_b.direction().dot(w0);
    let d = V::Scalar::ONE - a * a;

    let (u_a, u_b, mut code) = if is_zero(d) {
        (V::Scalar::ZERO, c, GeometryCode::Parallel)
    } else {
        ((a * c - b) / d, (c - a * b) / d, GeometryCode::Success)
    };

    let cp_a = line_a.origin() + line_a.direction().scale(u_a);
    let cp_b = line_b.origin() + line_b.direction().scale(u_b);
    if code == GeometryCode::Parallel && cp_a.approx_eq(cp_b) {
        code = GeometryCode::Coincident;
    }

    CpPair { code, cp_a, cp_b, u_a, u_b }
}

/// Closest points between a line and a segment. `cp_a`/`u_a` describe the
/// line, `cp_b`/`u_b` the segment.
pub fn cp_line_segment<V: GeomVector>(line: &Line<V>, seg: &Segment<V>) -> CpPair<V> {
    let seg_dir = seg.direction();
    let w0 = seg.p0() - line.origin();
    let a = seg_dir.dot(seg_dir);
    let b = seg_dir.dot(line.direction());
    let c = seg_dir.dot(w0);
    let d = line.direction().dot(w0);
    let denom = a - b * b;

    let (u_s, u_l, mut code) = if is_zero(denom) {
        // Parallel; fall back to the closest point on the line to the
        // segment origin.
        (V::Scalar::ZERO, d, GeometryCode::Parallel)
    } else {
        let sn = b * d - c;
        if sn < V::Scalar::ZERO {
            (V::Scalar::ZERO, d, GeometryCode::Success)
        } else if sn > denom {
            (V::Scalar::ONE, d + b, GeometryCode::Success)
        } else {
            (sn / denom, (a * d - b * c) / denom, GeometryCode::Success)
        }
    };

    let cp_s = seg.p0() + seg_dir.scale(u_s);
    let cp_l = line.origin() + line.direction().scale(u_l);
    if code == GeometryCode::Parallel && cp_l.approx_eq(cp_s) {
        code = GeometryCode::Coincident;
    }

    CpPair {
        code,
        cp_a: cp_l,
        cp_b: cp_s,
        u_a: u_l,
        u_b: u_s,
    }
}

/// Closest points between two segments, clamping both parameters to
/// `[0, 1]`.
///
/// Parallel segments whose projections onto each other intersect yield
/// `Overlapping` with a representative pair on the overlap region. Two
/// zero-length segments degrade to their endpoints.
pub fn cp_segment_segment<V: GeomVector>(seg_a: &Segment<V>, seg_b: &Segment<V>) -> CpPair<V> {
    let da = seg_a.direction();
    let db = seg_b.direction();
    let w0 = seg_a.p0() - seg_b.p0();

    let a = da.dot(da);
    let b = da.dot(db);
    let c = db.dot(db);
    let d = da.dot(w0);
    let e = db.dot(w0);
    let denom = a * c - b * b;

    let mut code = GeometryCode::Success;
    let sn: V::Scalar;
    let sd: V::Scalar;
    let tn: V::Scalar;
    let td: V::Scalar;
    if is_zero(denom) {
        // Parallel; pin u_a to 0 and test the four endpoint projections for
        // sign agreement to detect overlap.
        sn = V::Scalar::ZERO;
        sd = c;
        tn = e;
        td = c;

        let w1 = (seg_a.p0() + da) - seg_b.p0();
        let w2 = seg_a.p0() - (seg_b.p0() + db);
        let w3 = (seg_a.p0() + da) - (seg_b.p0() + db);
        let bse = e < V::Scalar::ZERO;
        let agree = bse == (w1.dot(db) < V::Scalar::ZERO)
            && bse == (w2.dot(db) < V::Scalar::ZERO)
            && bse == (w3.dot(db) < V::Scalar::ZERO);
        if !agree {
            code = GeometryCode::Overlapping;
        }
    } else {
        let raw_sn = b * e - c * d;
        sd = denom;
        if raw_sn < V::Scalar::ZERO {
            sn = V::Scalar::ZERO;
            tn = e;
            td = c;
        } else if raw_sn > denom {
            sn = denom;
            tn = e + b;
            td = c;
        } else {
            sn = raw_sn;
            tn = a * e - b * d;
            td = denom;
        }
    }

    let u_b;
    let u_a;
    if tn < V::Scalar::ZERO {
        u_b = V::Scalar::ZERO;
        u_a = clamp_ratio(-d, a);
    } else if tn > td {
        u_b = V::Scalar::ONE;
        u_a = clamp_ratio(-d + b, a);
    } else {
        u_b = if is_zero(td) { V::Scalar::ZERO } else { tn / td };
        u_a = if is_zero(sd) { V::Scalar::ZERO } else { sn / sd };
    }

    CpPair {
        code,
        cp_a: seg_a.p0() + da.scale(u_a),
        cp_b: seg_b.p0() + db.scale(u_b),
        u_a,
        u_b,
    }
}

// numerator/denominator clamped into [0,1]; a zero denominator means a
// zero-length segment, whose only point is its origin.
fn clamp_ratio<T: Scalar>(num: T, denom: T) -> T {
    if num < T::ZERO || is_zero(denom) {
        T::ZERO
    } else if num > denom {
        T::ONE
    } else {
        num / denom
    }
}

/// Closest point on `tri` to `point`, by Voronoi-region classification.
// Based on Real Time Collision Detection, Christer Ericson p141
pub fn cp_point_triangle<V: GeomVector>(point: V, tri: &Triangle<V>) -> V {
    let v01 = tri.p1() - tri.p0();
    let v02 = tri.p2() - tri.p0();
    let v0p = point - tri.p0();

    let d1 = v01.dot(v0p);
    let d2 = v02.dot(v0p);
    if d1 <= V::Scalar::ZERO && d2 <= V::Scalar::ZERO {
        return tri.p0();
    }

    let v1p = point - tri.p1();
    let d3 = v01.dot(v1p);
    let d4 = v02.dot(v1p);
    if d3 >= V::Scalar::ZERO && d4 <= d3 {
        return tri.p1();
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= V::Scalar::ZERO && d1 >= V::Scalar::ZERO && d3 <= V::Scalar::ZERO {
        let v = d1 / (d1 - d3);
        return tri.p0() + v01.scale(v);
    }

    let v2p = point - tri.p2();
    let d5 = v01.dot(v2p);
    let d6 = v02.dot(v2p);
    if d6 >= V::Scalar::ZERO && d5 <= d6 {
        return tri.p2();
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= V::Scalar::ZERO && d2 >= V::Scalar::ZERO && d6 <= V::Scalar::ZERO {
        let w = d2 / (d2 - d6);
        return tri.p0() + v02.scale(w);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= V::Scalar::ZERO && (d4 - d3) >= V::Scalar::ZERO && (d5 - d6) >= V::Scalar::ZERO {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return tri.p1() + (tri.p2() - tri.p1()).scale(w);
    }

    let denom = V::Scalar::ONE / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    tri.p0() + v01.scale(v) + v02.scale(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Line3, Segment3, Triangle3};

    /// Tests closest point to an infinite line before, at and after the
    /// origin.
    #[test]
    fn test_point_line() {
        let line = Line3::from_direction(Vector3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();

        let before = cp_point_line(Vector3::new(-3.0, 1.0, 2.0), &line);
        assert_eq!(before.u, -4.0);
        assert_eq!(before.point, Vector3::new(-3.0, 1.0, 1.0));

        let level = cp_point_line(Vector3::new(1.0, 1.0, 2.0), &line);
        assert_eq!(level.u, 0.0);
        assert_eq!(level.point, Vector3::new(1.0, 1.0, 1.0));

        let after = cp_point_line(Vector3::new(7.0, 1.0, 2.0), &line);
        assert_eq!(after.u, 6.0);
        assert_eq!(after.point, Vector3::new(7.0, 1.0, 1.0));
    }

    /// Tests closest point to a segment with clamping at both ends.
    #[test]
    fn test_point_segment() {
        let seg = Segment3::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(3.0, 1.0, 1.0)).unwrap();

        let before = cp_point_segment(Vector3::new(-1.0, 1.0, 1.0), &seg);
        assert_eq!(before.u, 0.0);
        assert_eq!(before.point, seg.p0());

        let after = cp_point_segment(Vector3::new(5.0, 1.0, 1.0), &seg);
        assert_eq!(after.u, 1.0);
        assert_eq!(after.point, seg.p1());

        let above = cp_point_segment(Vector3::new(2.0, 10.0, 42.0), &seg);
        assert_eq!(above.u, 0.5);
        assert_eq!(above.point, Vector3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_line_line_parallel_and_skew() {
        let a = Line3::from_direction(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        let parallel =
            Line3::from_direction(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(cp_line_line(&a, &parallel).code, GeometryCode::Parallel);

        let coincident =
            Line3::from_direction(Vector3::new(3.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0)).unwrap();
        assert_eq!(cp_line_line(&a, &coincident).code, GeometryCode::Coincident);

        let skew = Line3::from_direction(Vector3::new(0.0, 1.0, 2.0), Vector3::new(0.0, 1.0, 0.0)).unwrap();
        let result = cp_line_line(&a, &skew);
        assert_eq!(result.code, GeometryCode::Success);
        assert_eq!(result.cp_a, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(result.cp_b, Vector3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_line_segment() {
        let line = Line3::from_direction(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        let seg = Segment3::new(Vector3::new(2.0, 1.0, 0.0), Vector3::new(2.0, 3.0, 0.0)).unwrap();

        let result = cp_line_segment(&line, &seg);
        assert_eq!(result.code, GeometryCode::Success);
        assert_eq!(result.u_b, 0.0);
        assert_eq!(result.cp_b, Vector3::new(2.0, 1.0, 0.0));
        assert_eq!(result.cp_a, Vector3::new(2.0, 0.0, 0.0));

        let par_seg = Segment3::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(5.0, 2.0, 0.0)).unwrap();
        assert_eq!(cp_line_segment(&line, &par_seg).code, GeometryCode::Parallel);
    }

    /// Tests the closest-endpoints fixture: both parameters land on the
    /// segment origins.
    #[test]
    fn test_segment_segment_endpoints() {
        let seg_a = Segment3::new(Vector3::new(2.0, 0.0, 0.0), Vector3::new(6.0, 0.0, 0.0)).unwrap();
        let seg_b = Segment3::new(Vector3::new(-1.0, -4.0, 12.0), Vector3::new(-5.0, -4.0, 12.0)).unwrap();

        let result = cp_segment_segment(&seg_a, &seg_b);
        assert_eq!(result.code, GeometryCode::Success);
        assert_eq!(result.u_a, 0.0);
        assert_eq!(result.u_b, 0.0);
        assert_eq!(result.cp_a, seg_a.p0());
        assert_eq!(result.cp_b, seg_b.p0());
    }

    #[test]
    fn test_segment_segment_interior_and_overlap() {
        let seg_a = Segment3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 0.0, 0.0)).unwrap();
        let seg_b = Segment3::new(Vector3::new(2.0, 1.0, 3.0), Vector3::new(2.0, -1.0, 3.0)).unwrap();

        let interior = cp_segment_segment(&seg_a, &seg_b);
        assert_eq!(interior.code, GeometryCode::Success);
        assert_eq!(interior.u_a, 0.5);
        assert_eq!(interior.u_b, 0.5);
        assert_eq!(interior.cp_a, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(interior.cp_b, Vector3::new(2.0, 0.0, 3.0));

        let overlapping = Segment3::new(Vector3::new(2.0, 0.0, 0.0), Vector3::new(8.0, 0.0, 0.0)).unwrap();
        assert_eq!(cp_segment_segment(&seg_a, &overlapping).code, GeometryCode::Overlapping);

        let disjoint = Segment3::new(Vector3::new(6.0, 0.0, 0.0), Vector3::new(9.0, 0.0, 0.0)).unwrap();
        assert_eq!(cp_segment_segment(&seg_a, &disjoint).code, GeometryCode::Success);
    }

    /// Tests symmetry: swapping the arguments swaps the reported pair.
    #[test]
    fn test_segment_segment_symmetry() {
        let seg_a = Segment3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 1.0, 0.0)).unwrap();
        let seg_b = Segment3::new(Vector3::new(1.0, 3.0, 2.0), Vector3::new(3.0, -2.0, 1.0)).unwrap();

        let ab = cp_segment_segment(&seg_a, &seg_b);
        let ba = cp_segment_segment(&seg_b, &seg_a);
        assert!(ab.cp_a.approx_eq(ba.cp_b));
        assert!(ab.cp_b.approx_eq(ba.cp_a));
    }

    /// Tests the Voronoi regions of the point/triangle query.
    #[test]
    fn test_point_triangle() {
        let tri = Triangle3::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(4.0, 0.0, 0.0),
            Vector3::new(0.0, 4.0, 0.0),
        )
        .unwrap();

        // Vertex regions.
        assert_eq!(cp_point_triangle(Vector3::new(-1.0, -1.0, 2.0), &tri), tri.p0());
        assert_eq!(cp_point_triangle(Vector3::new(6.0, -1.0, 2.0), &tri), tri.p1());
        assert_eq!(cp_point_triangle(Vector3::new(-1.0, 6.0, 2.0), &tri), tri.p2());

        // Edge regions.
        assert_eq!(cp_point_triangle(Vector3::new(2.0, -1.0, 0.0), &tri), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(cp_point_triangle(Vector3::new(-1.0, 2.0, 0.0), &tri), Vector3::new(0.0, 2.0, 0.0));

        // Interior projects straight down.
        assert_eq!(cp_point_triangle(Vector3::new(1.0, 1.0, 5.0), &tri), Vector3::new(1.0, 1.0, 0.0));
    }
}
