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

//! Combination half of the red-blue engine: retriangulates crossed faces
//! along the intersection curve, keeps the fragments selected by the
//! Boolean mode and stitches them into a single surface.
//!
//! All fallible planning (constrained triangulation included) runs before
//! the first mutation, so the intactness flags of every surfaced error are
//! exact: once editing starts, only internal-logic faults remain.

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::{
    error::KernelError,
    geometry::{
        point_2::Point2,
        predicates::dominant_axis,
    },
    mesh::core::Mesh,
    numeric::scalar::Scalar,
    redblue::{
        intersect::{compute_intersection, flood_classify, FaceClass, Intersection},
        triangulate::constrained_triangulation,
        RedBlueOpts,
    },
};

/// Reference to a vertex of a planned sub-triangle: either an existing mesh
/// vertex (a face corner) or an intersection point still to be
/// materialized.
#[derive(Debug, Clone, Copy)]
enum NodeRef {
    Corner(usize),
    Point(usize),
}

#[derive(Debug)]
struct FaceJob {
    face: usize,
    tris: Vec<[NodeRef; 3]>,
}

/// Boolean union of `r` and `b`. On success `r` holds the merged surface
/// and `b` is empty.
pub fn red_blue_union<T: Scalar>(
    r: &mut Mesh<T>,
    b: &mut Mesh<T>,
    blue_update_handles: Option<&mut Vec<Option<usize>>>,
) -> Result<(), KernelError<T>> {
    red_blue_algorithm(r, b, true, true, blue_update_handles, &RedBlueOpts::default())
}

/// Boolean difference `r - b`.
pub fn red_blue_difference<T: Scalar>(
    r: &mut Mesh<T>,
    b: &mut Mesh<T>,
    blue_update_handles: Option<&mut Vec<Option<usize>>>,
) -> Result<(), KernelError<T>> {
    red_blue_algorithm(r, b, true, false, blue_update_handles, &RedBlueOpts::default())
}

/// Boolean intersection of `r` and `b`.
pub fn red_blue_intersection<T: Scalar>(
    r: &mut Mesh<T>,
    b: &mut Mesh<T>,
    blue_update_handles: Option<&mut Vec<Option<usize>>>,
) -> Result<(), KernelError<T>> {
    red_blue_algorithm(r, b, false, false, blue_update_handles, &RedBlueOpts::default())
}

/// The full red-blue pipeline, parameterized by which part of each operand
/// survives. The blue fragment is orientation-flipped exactly in difference
/// mode (red outside kept, blue inside kept).
pub fn red_blue_algorithm<T: Scalar>(
    r: &mut Mesh<T>,
    b: &mut Mesh<T>,
    keep_red_outside: bool,
    keep_blue_outside: bool,
    blue_update_handles: Option<&mut Vec<Option<usize>>>,
    opts: &RedBlueOpts,
) -> Result<(), KernelError<T>> {
    let isec = compute_intersection(r, b, opts)?;

    // plan both retriangulations before touching either mesh
    let red_jobs = plan_retriangulation(r, true, &isec)?;
    let blue_jobs = plan_retriangulation(b, false, &isec)?;
    debug!(
        red_jobs = red_jobs.len(),
        blue_jobs = blue_jobs.len(),
        "retriangulation planned"
    );

    // materialize intersection vertices and rewrite the crossed faces
    let red_vid = materialize_points(r, &isec);
    let blue_vid = materialize_points(b, &isec);
    apply_jobs(r, &red_jobs, &red_vid)?;
    apply_jobs(b, &blue_jobs, &blue_vid)?;

    let red_barriers = barrier_edges(&isec, &red_vid);
    let blue_barriers = barrier_edges(&isec, &blue_vid);
    for s in &isec.segments {
        let (u, v) = ordered(red_vid[s.a], red_vid[s.b]);
        if r.half_edge_between(u, v).is_none() && r.half_edge_between(v, u).is_none() {
            return Err(KernelError::InternalLogic {
                msg: format!("polyline edge ({}, {}) missing after red retriangulation", u, v),
            });
        }
    }

    // classify both refined operands while both are still complete surfaces
    let none = AHashSet::new();
    let red_class = flood_classify(r, b, &none, &red_barriers);
    let blue_class = flood_classify(b, r, &none, &blue_barriers);

    let red_keep = if keep_red_outside {
        FaceClass::Outside
    } else {
        FaceClass::Inside
    };
    let blue_keep = if keep_blue_outside {
        FaceClass::Outside
    } else {
        FaceClass::Inside
    };
    let flip_blue = keep_red_outside && !keep_blue_outside;

    let red_drop: Vec<usize> = r
        .face_ids()
        .filter(|&f| red_class[f] != Some(red_keep))
        .collect();
    for f in red_drop {
        r.remove_face(f);
    }

    let blue_kept: Vec<usize> = b
        .face_ids()
        .filter(|&f| blue_class[f] == Some(blue_keep))
        .collect();
    debug!(
        red_kept = r.face_count(),
        blue_kept = blue_kept.len(),
        flip_blue,
        "fragments selected"
    );

    // stitch: transplant surviving blue faces into red, identifying the two
    // copies of every intersection vertex
    let mut vmap: AHashMap<usize, usize> = AHashMap::new();
    for (k, &bv) in blue_vid.iter().enumerate() {
        vmap.insert(bv, red_vid[k]);
    }
    for f in blue_kept {
        let [x, y, z] = b.face_vertices(f);
        let mut mapped = [0usize; 3];
        for (slot, bv) in mapped.iter_mut().zip([x, y, z]) {
            let rv = *vmap
                .entry(bv)
                .or_insert_with(|| r.add_vertex(b.vertices[bv].position));
            *slot = rv;
        }
        if flip_blue {
            r.add_triangle(mapped[0], mapped[2], mapped[1]);
        } else {
            r.add_triangle(mapped[0], mapped[1], mapped[2]);
        }
    }

    if let Some(handles) = blue_update_handles {
        for h in handles.iter_mut() {
            *h = h.and_then(|bv| vmap.get(&bv).copied());
        }
    }

    b.clear();
    Ok(())
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Undirected barrier edges between materialized intersection vertices.
fn barrier_edges<T: Scalar>(
    isec: &Intersection<T>,
    vid: &[usize],
) -> AHashSet<(usize, usize)> {
    isec.segments
        .iter()
        .map(|s| ordered(vid[s.a], vid[s.b]))
        .collect()
}

/// One mesh vertex per intersection point; every point lies on both
/// operands, so both sides materialize the full set.
fn materialize_points<T: Scalar>(mesh: &mut Mesh<T>, isec: &Intersection<T>) -> Vec<usize> {
    isec.points
        .iter()
        .map(|p| mesh.add_vertex(p.position))
        .collect()
}

fn apply_jobs<T: Scalar>(
    mesh: &mut Mesh<T>,
    jobs: &[FaceJob],
    vid: &[usize],
) -> Result<(), KernelError<T>> {
    for job in jobs {
        mesh.remove_face(job.face);
        for t in &job.tris {
            let resolve = |n: NodeRef| -> usize {
                match n {
                    NodeRef::Corner(v) => v,
                    NodeRef::Point(k) => vid[k],
                }
            };
            let (a, b, c) = (resolve(t[0]), resolve(t[1]), resolve(t[2]));
            if a == b || b == c || c == a {
                return Err(KernelError::InternalLogic {
                    msg: format!("degenerate planned sub-triangle on face {}", job.face),
                });
            }
            mesh.add_triangle(a, b, c);
        }
    }
    Ok(())
}

/// Plan the constrained retriangulation of every crossed face of one
/// operand. Read-only; raises `Triangulation` or `NumIsecPoly` with both
/// operands still intact.
fn plan_retriangulation<T: Scalar>(
    mesh: &Mesh<T>,
    is_red: bool,
    isec: &Intersection<T>,
) -> Result<Vec<FaceJob>, KernelError<T>> {
    let crossed = if is_red {
        &isec.red_crossed_faces
    } else {
        &isec.blue_crossed_faces
    };
    let edge_points = if is_red {
        &isec.red_edge_points
    } else {
        &isec.blue_edge_points
    };
    let interior = if is_red {
        &isec.red_face_interior
    } else {
        &isec.blue_face_interior
    };

    let mut faces: Vec<usize> = crossed.iter().copied().collect();
    faces.sort_unstable();

    let mut jobs = Vec::with_capacity(faces.len());
    for f in faces {
        let corners = mesh.face_vertices(f);
        let normal = mesh.face_normal(f);
        let axis = dominant_axis(&normal);
        let flip = normal[axis] < T::zero();

        // local node table: corners first, then curve points as they appear
        let mut nodes: Vec<NodeRef> = corners.iter().map(|&v| NodeRef::Corner(v)).collect();
        let mut pts2: Vec<Point2<T>> = corners
            .iter()
            .map(|&v| Point2::project_dropping_axis(&mesh.vertices[v].position, axis, flip))
            .collect();
        let mut local_of_point: AHashMap<usize, usize> = AHashMap::new();
        let mut push_point = |k: usize,
                              nodes: &mut Vec<NodeRef>,
                              pts2: &mut Vec<Point2<T>>,
                              local_of_point: &mut AHashMap<usize, usize>|
         -> usize {
            *local_of_point.entry(k).or_insert_with(|| {
                let idx = nodes.len();
                nodes.push(NodeRef::Point(k));
                pts2.push(Point2::project_dropping_axis(
                    &isec.points[k].position,
                    axis,
                    flip,
                ));
                idx
            })
        };

        // boundary chain: corner, then the crossing points of the outgoing
        // edge ordered along the walk direction
        let mut boundary: Vec<usize> = Vec::new();
        for ci in 0..3 {
            let s = corners[ci];
            let t = corners[(ci + 1) % 3];
            boundary.push(ci);
            let key = ordered(s, t);
            if let Some(pk) = edge_points.get(&key) {
                // lambdas are relative to the smaller endpoint id
                let walk_forward = s <= t;
                let iter: Vec<usize> = if walk_forward {
                    pk.clone()
                } else {
                    pk.iter().rev().copied().collect()
                };
                for k in iter {
                    let li = push_point(k, &mut nodes, &mut pts2, &mut local_of_point);
                    boundary.push(li);
                }
            }
        }
        let n_boundary = boundary.len();

        let mut n_interior = 0usize;
        if let Some(ik) = interior.get(&f) {
            for &k in ik {
                push_point(k, &mut nodes, &mut pts2, &mut local_of_point);
                n_interior += 1;
            }
        }

        let mut constraints: Vec<(usize, usize)> = Vec::new();
        for s in &isec.segments {
            let seg_face = if is_red { s.red_face } else { s.blue_face };
            if seg_face != f {
                continue;
            }
            let la = match local_of_point.get(&s.a) {
                Some(&l) => l,
                None => {
                    return Err(KernelError::InternalLogic {
                        msg: format!("segment endpoint {} not registered on face {}", s.a, f),
                    })
                }
            };
            let lb = match local_of_point.get(&s.b) {
                Some(&l) => l,
                None => {
                    return Err(KernelError::InternalLogic {
                        msg: format!("segment endpoint {} not registered on face {}", s.b, f),
                    })
                }
            };
            constraints.push((la, lb));
        }

        let tris = constrained_triangulation(&pts2, &boundary, &constraints).map_err(|e| {
            KernelError::Triangulation {
                msg: format!(
                    "constrained retriangulation of {} face {} failed: {}",
                    if is_red { "red" } else { "blue" },
                    f,
                    e
                ),
                r_intact: true,
                b_intact: true,
            }
        })?;

        // a triangulated polygon with all interior points used satisfies
        // T = V_boundary + 2 V_interior - 2
        let expected = n_boundary + 2 * n_interior - 2;
        if tris.len() != expected {
            return Err(KernelError::NumIsecPoly {
                msg: format!(
                    "{} face {}: {} sub-triangles from {} boundary and {} interior points, expected {}",
                    if is_red { "red" } else { "blue" },
                    f,
                    tris.len(),
                    n_boundary,
                    n_interior,
                    expected
                ),
            });
        }

        jobs.push(FaceJob {
            face: f,
            tris: tris
                .into_iter()
                .map(|t| [nodes[t[0]], nodes[t[1]], nodes[t[2]]])
                .collect(),
        });
    }
    Ok(jobs)
}
