// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 the arbormesh developers
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use crate::{
    geometry::{point_2::Point2, point_3::Point3, vector_3::Vector3},
    numeric::scalar::Scalar,
};

/// Signed volume of the tetrahedron (a, b, c, d), positive when `d` lies on
/// the positive side of the plane through (a, b, c).
pub fn orient_3d<T: Scalar>(a: &Point3<T>, b: &Point3<T>, c: &Point3<T>, d: &Point3<T>) -> T {
    let ab = a.vector_to(b);
    let ac = a.vector_to(c);
    let ad = a.vector_to(d);
    ab.cross(&ac).dot(&ad)
}

/// Twice the signed area of the 2D triangle (a, b, c); positive for CCW.
pub fn orient_2d<T: Scalar>(a: &Point2<T>, b: &Point2<T>, c: &Point2<T>) -> T {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// In-circle determinant for a CCW triangle (a, b, c); positive when `d`
/// lies strictly inside the circumcircle.
pub fn in_circle<T: Scalar>(a: &Point2<T>, b: &Point2<T>, c: &Point2<T>, d: &Point2<T>) -> T {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let ad2 = adx * adx + ady * ady;
    let bd2 = bdx * bdx + bdy * bdy;
    let cd2 = cdx * cdx + cdy * cdy;

    adx * (bdy * cd2 - cdy * bd2) - ady * (bdx * cd2 - cdx * bd2)
        + ad2 * (bdx * cdy - cdx * bdy)
}

/// Do the open 2D segments (p1, p2) and (q1, q2) properly cross?
/// Shared endpoints and mere touching do not count.
pub fn segments_properly_cross_2d<T: Scalar>(
    p1: &Point2<T>,
    p2: &Point2<T>,
    q1: &Point2<T>,
    q2: &Point2<T>,
    eps: T,
) -> bool {
    let d1 = orient_2d(q1, q2, p1);
    let d2 = orient_2d(q1, q2, p2);
    let d3 = orient_2d(p1, p2, q1);
    let d4 = orient_2d(p1, p2, q2);

    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}

/// Outcome of the ε-band segment–triangle test.
#[derive(Debug, Clone, PartialEq)]
pub enum SegTriIsect<T: Scalar> {
    /// No intersection.
    None,
    /// A single transversal crossing strictly interior to both the segment
    /// and the triangle.
    Proper {
        lambda: T,
        point: Point3<T>,
        bary: (T, T, T),
    },
    /// The configuration is too degenerate to commit to either answer:
    /// near-coplanar segment, crossing within the ε-band of a triangle edge
    /// or vertex, or a segment endpoint on the triangle plane.
    Degenerate,
}

/// Intersect the segment `u + lambda (v - u)`, `lambda` in `[0, 1]`, with the
/// triangle (a, b, c). The ε-band is scaled by the local geometry so the test
/// behaves identically under uniform rescaling of the input.
pub fn segment_triangle_intersection<T: Scalar>(
    u: &Point3<T>,
    v: &Point3<T>,
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
) -> SegTriIsect<T> {
    let n = a.vector_to(b).cross(&a.vector_to(c));
    let n_norm = n.norm();
    if n_norm <= T::eps() {
        // zero-area triangle
        return SegTriIsect::Degenerate;
    }
    let n = n / n_norm;

    let du = a.vector_to(u).dot(&n);
    let dv = a.vector_to(v).dot(&n);

    // Scale-relative band: the triangle's own extent sets the unit.
    let scale = a.distance_to(b).max(a.distance_to(c)).max(T::one());
    let band = T::eps() * scale;

    let u_on_plane = du.abs() <= band;
    let v_on_plane = dv.abs() <= band;

    if u_on_plane && v_on_plane {
        // near-coplanar; overlap of the projections decides whether this is
        // a degeneracy or a clean miss
        if coplanar_segment_touches_triangle(u, v, a, b, c, &n, band) {
            return SegTriIsect::Degenerate;
        }
        return SegTriIsect::None;
    }
    if u_on_plane || v_on_plane {
        // endpoint sitting on the plane of the other mesh
        if endpoint_projects_into_triangle(if u_on_plane { u } else { v }, a, b, c, &n, band) {
            return SegTriIsect::Degenerate;
        }
        return SegTriIsect::None;
    }
    if (du > T::zero()) == (dv > T::zero()) {
        return SegTriIsect::None;
    }

    let lambda = du / (du - dv);
    let point = u.lerp(v, lambda);

    let (l0, l1, l2) = barycentric(&point, a, b, c, &n);

    // barycentric coordinates live on the unit simplex, so eps needs no
    // further scaling here
    let bband = T::eps();

    let min_l = l0.min(l1).min(l2);
    if min_l > bband {
        SegTriIsect::Proper {
            lambda,
            point,
            bary: (l0, l1, l2),
        }
    } else if min_l >= -bband {
        // crossing within the band of an edge or vertex of the triangle
        SegTriIsect::Degenerate
    } else {
        SegTriIsect::None
    }
}

/// Barycentric coordinates of `p` with respect to the triangle (a, b, c)
/// with unit normal `n`.
pub fn barycentric<T: Scalar>(
    p: &Point3<T>,
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
    n: &Vector3<T>,
) -> (T, T, T) {
    let area2 = a.vector_to(b).cross(&a.vector_to(c)).dot(n);
    let l0 = p.vector_to(b).cross(&p.vector_to(c)).dot(n) / area2;
    let l1 = p.vector_to(c).cross(&p.vector_to(a)).dot(n) / area2;
    let l2 = T::one() - l0 - l1;
    (l0, l1, l2)
}

fn endpoint_projects_into_triangle<T: Scalar>(
    p: &Point3<T>,
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
    n: &Vector3<T>,
    band: T,
) -> bool {
    let (l0, l1, l2) = barycentric(p, a, b, c, n);
    l0.min(l1).min(l2) >= -band
}

fn coplanar_segment_touches_triangle<T: Scalar>(
    u: &Point3<T>,
    v: &Point3<T>,
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
    n: &Vector3<T>,
    band: T,
) -> bool {
    if endpoint_projects_into_triangle(u, a, b, c, n, band)
        || endpoint_projects_into_triangle(v, a, b, c, n, band)
    {
        return true;
    }
    // edge-against-edge in the shared plane
    let axis = dominant_axis(n);
    let flip = n[axis] < T::zero();
    let pu = Point2::project_dropping_axis(u, axis, flip);
    let pv = Point2::project_dropping_axis(v, axis, flip);
    let pa = Point2::project_dropping_axis(a, axis, flip);
    let pb = Point2::project_dropping_axis(b, axis, flip);
    let pc = Point2::project_dropping_axis(c, axis, flip);
    let eps2 = T::eps();
    segments_properly_cross_2d(&pu, &pv, &pa, &pb, eps2)
        || segments_properly_cross_2d(&pu, &pv, &pb, &pc, eps2)
        || segments_properly_cross_2d(&pu, &pv, &pc, &pa, eps2)
}

/// Index of the dominant (largest magnitude) component of `n`.
pub fn dominant_axis<T: Scalar>(n: &Vector3<T>) -> usize {
    let ax = n.x.abs();
    let ay = n.y.abs();
    let az = n.z.abs();
    if ax >= ay && ax >= az {
        0
    } else if ay >= az {
        1
    } else {
        2
    }
}
