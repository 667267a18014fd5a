// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bedrock Geometry
//!
//! Geometry predicates and queries, meaning closest point (CP), boolean
//! intersection tests (TI) and find-intersection queries (FI), over points,
//! segments, lines, rays, planes, triangles, axis-aligned boxes and
//! hyperspheres. Everything is generic over scalar precision (`f32`/`f64`)
//! and, where the mathematics allows, over dimension (2D/3D) via the
//! [`GeomVector`] trait.
//!
//! ## Degeneracy policy
//!
//! Primitive constructors are fallible and are the only way to build an
//! instance; they reject degenerate input (zero-length segments, colinear
//! triangles, zero normals, non-positive radii). Queries assume constructed
//! inputs and have undefined results otherwise. See
//! [`primitives`](crate::primitives) for the rationale.
//!
//! ## Tolerances
//!
//! Near-zero comparisons use a per-precision tolerance
//! ([`Scalar::TOLERANCE`]); building with the `exact-math` feature switches
//! [`is_zero`](vector::is_zero) to exact comparison against zero.

pub mod closest;
pub mod intersect;
pub mod primitives;
pub mod util;
pub mod vector;

pub use closest::{
    cp_line_line, cp_line_segment, cp_point_line, cp_point_plane, cp_point_segment,
    cp_point_triangle, cp_segment_segment, CpOnPrimitive, CpPair,
};
pub use intersect::{
    fi3_ray_plane, fi3_segment_plane, fi3_segment_triangle, ti2_point_polygon, ti_aabb_aabb,
    ti_point_aabb, FiPlaneResult, FiSegmentTriangleResult,
};
pub use primitives::{
    Aabb, Aabb2, Aabb3, Circle2, HyperSphere, Line, Line2, Line3, Plane, Ray, Ray2, Ray3, Segment,
    Segment2, Segment3, Sphere, Triangle, Triangle2, Triangle3,
};
pub use util::{
    barycentric, is_rotated_axis_still_axis_aligned, perpendicular, scalar_triple_product,
};
pub use vector::{cross, GeomVector, Quaternion, Scalar, Vector2, Vector3};

/// Outcome classification shared by the CP/TI/FI queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryCode {
    Success,
    Overlapping,
    Parallel,
    Coincident,
    Intersecting,
    NotIntersecting,
    CompletelyInside,
    CompletelyOutside,
    OnBoundary,
}
