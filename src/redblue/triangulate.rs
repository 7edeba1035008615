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

//! Compact 2D constrained Delaunay triangulation used to retriangulate
//! crossed faces. Jobs are tiny (a handful of points per face), so the
//! implementation favors robustness over asymptotics: Bowyer-Watson
//! insertion over a plain triangle list, then constraint enforcement by
//! flipping crossing edges.

use ahash::AHashSet;

use crate::{
    geometry::{
        point_2::Point2,
        predicates::{in_circle, orient_2d, segments_properly_cross_2d},
    },
    numeric::scalar::Scalar,
};

/// Triangulate the interior of `boundary` (a closed CCW chain of indices
/// into `pts`) so that every boundary chain edge and every extra constraint
/// segment appears as a triangulation edge. Indices not on the boundary are
/// interior points and must end up used.
pub(crate) fn constrained_triangulation<T: Scalar>(
    pts: &[Point2<T>],
    boundary: &[usize],
    constraints: &[(usize, usize)],
) -> Result<Vec<[usize; 3]>, String> {
    let n = pts.len();
    if n < 3 {
        return Err(format!("too few points: {}", n));
    }

    // super-triangle comfortably enclosing everything
    let mut min = pts[0];
    let mut max = pts[0];
    for p in pts.iter() {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let span = (max.x - min.x).max(max.y - min.y).max(T::eps());
    let big = span * T::from_f64(16.0).unwrap();
    let cx = (min.x + max.x) * T::half();
    let cy = (min.y + max.y) * T::half();

    let mut all: Vec<Point2<T>> = pts.to_vec();
    all.push(Point2::new(cx - big, cy - big));
    all.push(Point2::new(cx + big, cy - big));
    all.push(Point2::new(cx, cy + big));

    let mut tris: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    for i in 0..n {
        insert_point(&all, &mut tris, i)?;
    }

    // boundary chain edges are constraints too
    for k in 0..boundary.len() {
        let a = boundary[k];
        let b = boundary[(k + 1) % boundary.len()];
        enforce_constraint(&all, &mut tris, a, b)?;
    }
    for &(a, b) in constraints {
        enforce_constraint(&all, &mut tris, a, b)?;
    }

    // drop super-triangle fans, then everything outside the boundary polygon
    tris.retain(|t| t.iter().all(|&v| v < n));
    let third = T::one() / (T::one() + T::two());
    tris.retain(|t| {
        let c = Point2::new(
            (all[t[0]].x + all[t[1]].x + all[t[2]].x) * third,
            (all[t[0]].y + all[t[1]].y + all[t[2]].y) * third,
        );
        point_in_polygon(&c, pts, boundary)
    });

    Ok(tris)
}

fn insert_point<T: Scalar>(
    all: &[Point2<T>],
    tris: &mut Vec<[usize; 3]>,
    i: usize,
) -> Result<(), String> {
    let p = all[i];

    let mut bad: Vec<usize> = Vec::new();
    for (ti, t) in tris.iter().enumerate() {
        if in_circle(&all[t[0]], &all[t[1]], &all[t[2]], &p) > T::zero() {
            bad.push(ti);
        }
    }
    if bad.is_empty() {
        return Err(format!("point {} outside the triangulation cavity", i));
    }

    // cavity boundary: directed edges of bad triangles whose reverse is not
    // also a bad-triangle edge
    let mut edges: AHashSet<(usize, usize)> = AHashSet::new();
    for &ti in &bad {
        let t = tris[ti];
        for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
            edges.insert((a, b));
        }
    }
    let hull: Vec<(usize, usize)> = edges
        .iter()
        .copied()
        .filter(|&(a, b)| !edges.contains(&(b, a)))
        .collect();

    // remove bad triangles (descending so indices stay valid)
    let mut bad_sorted = bad;
    bad_sorted.sort_unstable_by(|a, b| b.cmp(a));
    for ti in bad_sorted {
        tris.swap_remove(ti);
    }

    for (a, b) in hull {
        if a == i || b == i {
            return Err(format!("degenerate cavity at point {}", i));
        }
        tris.push(ccw(all, [a, b, i]));
    }
    Ok(())
}

fn ccw<T: Scalar>(all: &[Point2<T>], t: [usize; 3]) -> [usize; 3] {
    if orient_2d(&all[t[0]], &all[t[1]], &all[t[2]]) < T::zero() {
        [t[0], t[2], t[1]]
    } else {
        t
    }
}

fn has_edge(tris: &[[usize; 3]], a: usize, b: usize) -> bool {
    tris.iter().any(|t| {
        (t.contains(&a) && t.contains(&b))
            && [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
                .iter()
                .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    })
}

/// Flip crossing edges until (a, b) is present. Terminates for valid planar
/// input; bails out with an error otherwise.
fn enforce_constraint<T: Scalar>(
    all: &[Point2<T>],
    tris: &mut Vec<[usize; 3]>,
    a: usize,
    b: usize,
) -> Result<(), String> {
    if a == b {
        return Err("zero-length constraint".into());
    }
    let limit = 10 * tris.len() + 100;
    for _ in 0..limit {
        if has_edge(tris, a, b) {
            return Ok(());
        }

        // some triangulation edge properly crossing the constraint
        let mut flipped = false;
        let crossing = find_crossing_edges(all, tris, a, b);
        if crossing.is_empty() {
            return Err(format!("constraint ({}, {}) crosses no edge yet is absent", a, b));
        }
        for (c, d) in crossing {
            if try_flip(all, tris, c, d) {
                flipped = true;
                break;
            }
        }
        if !flipped {
            return Err(format!("no flippable edge across constraint ({}, {})", a, b));
        }
    }
    Err(format!("constraint enforcement did not converge for ({}, {})", a, b))
}

fn find_crossing_edges<T: Scalar>(
    all: &[Point2<T>],
    tris: &[[usize; 3]],
    a: usize,
    b: usize,
) -> Vec<(usize, usize)> {
    let mut seen: AHashSet<(usize, usize)> = AHashSet::new();
    let mut out = Vec::new();
    for t in tris {
        for (c, d) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
            let key = (c.min(d), c.max(d));
            if seen.contains(&key) || c == a || c == b || d == a || d == b {
                continue;
            }
            seen.insert(key);
            if segments_properly_cross_2d(&all[a], &all[b], &all[c], &all[d], T::zero()) {
                out.push(key);
            }
        }
    }
    out
}

/// Flip the edge (c, d) shared by two triangles when their union is a
/// strictly convex quad. Returns false when the flip is not applicable.
fn try_flip<T: Scalar>(all: &[Point2<T>], tris: &mut Vec<[usize; 3]>, c: usize, d: usize) -> bool {
    let mut t1 = None;
    let mut t2 = None;
    for (ti, t) in tris.iter().enumerate() {
        for (x, y) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
            if x == c && y == d {
                t1 = Some(ti);
            } else if x == d && y == c {
                t2 = Some(ti);
            }
        }
    }
    let (i1, i2) = match (t1, t2) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };
    let x = third_vertex(tris[i1], c, d);
    let y = third_vertex(tris[i2], c, d);

    // flip only inside a convex quad, i.e. the new diagonal must cross the old
    if !segments_properly_cross_2d(&all[x], &all[y], &all[c], &all[d], T::zero()) {
        return false;
    }

    let n1 = ccw(all, [x, c, y]);
    let n2 = ccw(all, [y, d, x]);
    let (hi, lo) = if i1 > i2 { (i1, i2) } else { (i2, i1) };
    tris.swap_remove(hi);
    tris.swap_remove(lo);
    tris.push(n1);
    tris.push(n2);
    true
}

fn third_vertex(t: [usize; 3], a: usize, b: usize) -> usize {
    *t.iter().find(|&&v| v != a && v != b).unwrap()
}

/// Crossing-number point-in-polygon test over the chain `boundary`.
fn point_in_polygon<T: Scalar>(p: &Point2<T>, pts: &[Point2<T>], boundary: &[usize]) -> bool {
    let mut inside = false;
    let m = boundary.len();
    for k in 0..m {
        let a = pts[boundary[k]];
        let b = pts[boundary[(k + 1) % m]];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (b.x - a.x) * (p.y - a.y) / (b.y - a.y);
            if x_cross > p.x {
                inside = !inside;
            }
        }
    }
    inside
}
