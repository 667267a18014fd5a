// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Geometry Utilities
//!
//! Small helpers shared by the query modules: sorting, the scalar triple
//! product, barycentric coordinates, perpendicular construction, and the
//! quaternion axis-alignment check used by bounding-volume code.

use bedrock_core::{Error, Result};

use crate::primitives::Triangle;
use crate::vector::{cross, is_zero, GeomVector, Quaternion, Scalar, Vector3};

/// Sorts two values so that `a <= b`.
pub fn sort_low_to_high<T: PartialOrd>(a: &mut T, b: &mut T) {
    if *b < *a {
        std::mem::swap(a, b);
    }
}

/// Sorts a triple in place.
pub fn sort3_low_to_high<T: PartialOrd + Copy>(v: &mut [T; 3]) {
    let [mut a, mut b, mut c] = *v;
    sort_low_to_high(&mut a, &mut b);
    sort_low_to_high(&mut a, &mut c);
    sort_low_to_high(&mut b, &mut c);
    *v = [a, b, c];
}

/// Sum of the vector's components.
pub fn component_sum<V: GeomVector>(v: V) -> V::Scalar {
    let mut total = v.at(0);
    for i in 1..V::DIM {
        total = total + v.at(i);
    }
    total
}

/// `(u x v) . w`, the signed volume of the parallelepiped spanned by the
/// three vectors.
pub fn scalar_triple_product<T: Scalar>(u: Vector3<T>, v: Vector3<T>, w: Vector3<T>) -> T {
    cross(u, v).dot(w)
}

/// Barycentric coordinates of `p` with respect to `tri`, with
/// `u + v + w == 1`. Fails for a zero-area triangle.
// Based on Real Time Collision Detection, Christer Ericson p47
pub fn barycentric<V: GeomVector>(tri: &Triangle<V>, p: V) -> Result<Vector3<V::Scalar>> {
    let v0 = tri.p1() - tri.p0();
    let v1 = tri.p2() - tri.p0();
    let v2 = p - tri.p0();

    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);

    let denom = d00 * d11 - d01 * d01;
    if is_zero(denom) {
        return Err(Error::Failure);
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Ok(Vector3::new(V::Scalar::ONE - v - w, v, w))
}

/// A (non-normalised) vector perpendicular to `axis`, in no particular
/// direction. A zero vector in gives a zero vector out.
///
/// The two largest components (by magnitude) are negate-swapped so the dot
/// product cancels without involving any near-zero component.
pub fn perpendicular<T: Scalar>(axis: Vector3<T>) -> Vector3<T> {
    let mut min_ind = if axis[0].abs() < axis[1].abs() { 0 } else { 1 };
    if axis[2].abs() < axis[min_ind].abs() {
        min_ind = 2;
    }

    let first = (min_ind + 1) % 3;
    let second = (min_ind + 2) % 3;

    let mut perp = Vector3::zero();
    perp[first] = -axis[second];
    perp[second] = axis[first];
    perp
}

/// Tests whether rotating an axis-aligned basis by `q` produces another
/// axis-aligned basis, up to `epsilon` per component.
///
/// On success returns the extents `extents_in` maps to; `None` means the
/// rotation leaves the axis-aligned family.
pub fn is_rotated_axis_still_axis_aligned<T: Scalar>(
    q: &Quaternion<T>,
    extents_in: Vector3<T>,
    epsilon: T,
) -> Option<Vector3<T>> {
    let mut extents_out = Vector3::zero();
    for i in 0..3 {
        let mut v = Vector3::zero();
        v[i] = extents_in[i];
        let v = q.apply(v);

        let mut non_zero_index = None;
        for j in 0..3 {
            if v[j].abs() <= epsilon {
                continue;
            }
            if non_zero_index.is_some() {
                return None;
            }
            non_zero_index = Some(j);
        }
        if let Some(j) = non_zero_index {
            extents_out[j] = extents_in[i].abs();
            if v[j] < T::ZERO {
                extents_out[j] = -extents_out[j];
            }
        }
    }
    Some(extents_out)
}
