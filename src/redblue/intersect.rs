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

//! Intersection half of the red-blue engine: finds the intersection curve
//! between the red and blue operand meshes as a set of closed polylines and
//! reports every numerical degeneracy precisely instead of guessing. All
//! work here is read-only, so every error raised leaves both operands
//! intact.

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    error::{EdgeIsecInfo, KernelError},
    geometry::{
        octree::{candidate_edge_face_pairs, EdgeFacePair},
        point_3::Point3,
        predicates::{segment_triangle_intersection, SegTriIsect},
        aabb::Aabb3,
    },
    mesh::core::Mesh,
    numeric::scalar::Scalar,
    redblue::RedBlueOpts,
};

/// One point of the intersection curve. It lies on an edge of the mesh
/// named by `red_edge` and inside a face of the other mesh.
#[derive(Debug, Clone)]
pub struct IsecPoint<T: Scalar> {
    pub position: Point3<T>,
    /// true: a red edge crossing a blue face; false: the other way round.
    pub red_edge: bool,
    /// Directed endpoints the lambda value is relative to.
    pub edge: (usize, usize),
    pub lambda: T,
    /// Crossed face of the other mesh.
    pub face: usize,
    /// Faces of the edge-owning mesh incident to the crossing edge.
    pub edge_faces: SmallVec<[usize; 2]>,
}

/// Straight piece of the curve. Both endpoints lie on the common
/// (red face, blue face) cell.
#[derive(Debug, Clone, Copy)]
pub struct IsecSegment {
    pub a: usize,
    pub b: usize,
    pub red_face: usize,
    pub blue_face: usize,
}

#[derive(Debug)]
pub struct Intersection<T: Scalar> {
    pub points: Vec<IsecPoint<T>>,
    pub segments: Vec<IsecSegment>,
    /// Closed loops as cyclic sequences of point indices.
    pub loops: Vec<Vec<usize>>,
    pub red_crossed_faces: AHashSet<usize>,
    pub blue_crossed_faces: AHashSet<usize>,
    /// Crossing points per directed red edge, sorted by lambda.
    pub red_edge_points: AHashMap<(usize, usize), Vec<usize>>,
    pub blue_edge_points: AHashMap<(usize, usize), Vec<usize>>,
    /// Blue-edge points interior to a red face, and vice versa.
    pub red_face_interior: AHashMap<usize, Vec<usize>>,
    pub blue_face_interior: AHashMap<usize, Vec<usize>>,
}

/// Compute the intersection curve between `red` and `blue`.
pub fn compute_intersection<T: Scalar>(
    red: &Mesh<T>,
    blue: &Mesh<T>,
    opts: &RedBlueOpts,
) -> Result<Intersection<T>, KernelError<T>> {
    for (mesh, is_red) in [(red, true), (blue, false)] {
        let bad = mesh.non_manifold_edges();
        if !bad.is_empty() {
            return Err(KernelError::ComplexEdges {
                msg: format!(
                    "{} operand has {} non-manifold edges",
                    color_name(is_red),
                    bad.len()
                ),
                info: bad
                    .into_iter()
                    .map(|(u, v)| EdgeIsecInfo {
                        red: is_red,
                        u_id: u,
                        v_id: v,
                        edge_lambdas: Vec::new(),
                    })
                    .collect(),
            });
        }
    }

    let (red_pairs, blue_pairs) = candidate_edge_face_pairs(
        red,
        blue,
        opts.max_components,
        opts.max_recursion_depth,
    );
    debug!(
        red_candidates = red_pairs.len(),
        blue_candidates = blue_pairs.len(),
        "broadphase done"
    );
    if red_pairs.is_empty() && blue_pairs.is_empty() {
        return Err(KernelError::Disjoint {
            msg: "no candidate edge-face pairs".into(),
        });
    }

    let mut points: Vec<IsecPoint<T>> = Vec::new();
    collect_crossings(red, blue, &red_pairs, true, &mut points)?;
    collect_crossings(blue, red, &blue_pairs, false, &mut points)?;

    if points.is_empty() {
        return Err(KernelError::Disjoint {
            msg: "no candidate pair actually intersects".into(),
        });
    }
    debug!(points = points.len(), "edge-face crossings collected");

    let (red_edge_points, blue_edge_points) = collate_edges(&points, opts)?;

    // cells: each (red face, blue face) pair traversed by the curve carries
    // exactly two of its points
    let mut cells: AHashMap<(usize, usize), SmallVec<[usize; 4]>> = AHashMap::new();
    for (k, p) in points.iter().enumerate() {
        for &ef in p.edge_faces.iter() {
            let key = if p.red_edge { (ef, p.face) } else { (p.face, ef) };
            cells.entry(key).or_default().push(k);
        }
    }

    let mut cell_list: Vec<(&(usize, usize), &SmallVec<[usize; 4]>)> = cells.iter().collect();
    cell_list.sort_unstable_by_key(|(k, _)| **k);

    let mut segments: Vec<IsecSegment> = Vec::new();
    for (&(rf, bf), members) in cell_list {
        match members.len() {
            2 => segments.push(IsecSegment {
                a: members[0],
                b: members[1],
                red_face: rf,
                blue_face: bf,
            }),
            n => {
                return Err(KernelError::NumericalEdgeCase {
                    msg: format!(
                        "face pair (red {}, blue {}) carries {} intersection points, expected 2",
                        rf, bf, n
                    ),
                    r_intact: true,
                    b_intact: true,
                });
            }
        }
    }

    let loops = walk_loops(points.len(), &segments)?;
    debug!(loops = loops.len(), segments = segments.len(), "polylines closed");

    // trivial loops: the whole circle collapses into a point
    let scale = red
        .bounding_box()
        .map(|bb| bb.diagonal())
        .unwrap_or_else(T::one)
        .max(T::one());
    for lp in &loops {
        let mut bb = Aabb3::from_point(&points[lp[0]].position);
        for &k in lp.iter() {
            bb.include(&points[k].position);
        }
        if bb.diagonal() <= T::point_merge_threshold() * scale {
            let (is_red, face_id) = trivial_loop_face(&points, lp);
            let split_pos = bb.center();
            return Err(KernelError::AffectedCircleTrivial {
                msg: format!("intersection loop of {} points collapses to a point", lp.len()),
                red: is_red,
                face_id,
                split_pos,
            });
        }
    }

    let mut red_crossed_faces: AHashSet<usize> = AHashSet::new();
    let mut blue_crossed_faces: AHashSet<usize> = AHashSet::new();
    for s in &segments {
        red_crossed_faces.insert(s.red_face);
        blue_crossed_faces.insert(s.blue_face);
    }

    let mut red_face_interior: AHashMap<usize, Vec<usize>> = AHashMap::new();
    let mut blue_face_interior: AHashMap<usize, Vec<usize>> = AHashMap::new();
    for (k, p) in points.iter().enumerate() {
        if p.red_edge {
            blue_face_interior.entry(p.face).or_default().push(k);
        } else {
            red_face_interior.entry(p.face).or_default().push(k);
        }
    }

    Ok(Intersection {
        points,
        segments,
        loops,
        red_crossed_faces,
        blue_crossed_faces,
        red_edge_points,
        blue_edge_points,
        red_face_interior,
        blue_face_interior,
    })
}

fn color_name(red: bool) -> &'static str {
    if red {
        "red"
    } else {
        "blue"
    }
}

/// Run the ε-band segment-triangle test over all candidate pairs of one
/// color and append the proper crossings.
fn collect_crossings<T: Scalar>(
    edge_mesh: &Mesh<T>,
    face_mesh: &Mesh<T>,
    pairs: &[EdgeFacePair],
    red_edge: bool,
    points: &mut Vec<IsecPoint<T>>,
) -> Result<(), KernelError<T>> {
    for pair in pairs {
        let pu = edge_mesh.vertices[pair.u].position;
        let pv = edge_mesh.vertices[pair.v].position;
        let [pa, pb, pc] = face_mesh.face_points(pair.face);
        match segment_triangle_intersection(&pu, &pv, &pa, &pb, &pc) {
            SegTriIsect::None => {}
            SegTriIsect::Proper { lambda, point, .. } => {
                trace!(
                    u = pair.u,
                    v = pair.v,
                    face = pair.face,
                    red = red_edge,
                    "crossing"
                );
                points.push(IsecPoint {
                    position: point,
                    red_edge,
                    edge: (pair.u, pair.v),
                    lambda,
                    face: pair.face,
                    edge_faces: edge_mesh.faces_of_edge(pair.u, pair.v),
                });
            }
            SegTriIsect::Degenerate => {
                return Err(KernelError::NumericalEdgeCase {
                    msg: format!(
                        "{} edge ({}, {}) meets face {} in a degenerate configuration",
                        color_name(red_edge),
                        pair.u,
                        pair.v,
                        pair.face
                    ),
                    r_intact: true,
                    b_intact: true,
                });
            }
        }
    }
    Ok(())
}

type EdgePointMap = AHashMap<(usize, usize), Vec<usize>>;

/// Group crossing points per directed edge, sort by lambda, and enforce the
/// manifold crossing cardinality and minimal lambda separation.
fn collate_edges<T: Scalar>(
    points: &[IsecPoint<T>],
    opts: &RedBlueOpts,
) -> Result<(EdgePointMap, EdgePointMap), KernelError<T>> {
    let mut red: EdgePointMap = AHashMap::new();
    let mut blue: EdgePointMap = AHashMap::new();
    for (k, p) in points.iter().enumerate() {
        let map = if p.red_edge { &mut red } else { &mut blue };
        map.entry(p.edge).or_default().push(k);
    }

    let mut complex: Vec<EdgeIsecInfo<T>> = Vec::new();
    for (is_red, map) in [(true, &mut red), (false, &mut blue)] {
        for (&(u, v), pts) in map.iter_mut() {
            pts.sort_by(|&a, &b| {
                points[a]
                    .lambda
                    .partial_cmp(&points[b].lambda)
                    .expect("NaN lambda")
            });
            if pts.len() > opts.max_edge_crossings {
                complex.push(EdgeIsecInfo::new(
                    is_red,
                    u,
                    v,
                    pts.iter().map(|&k| points[k].lambda).collect(),
                ));
                continue;
            }
            for w in pts.windows(2) {
                let gap = points[w[1]].lambda - points[w[0]].lambda;
                if gap <= T::eps() {
                    return Err(KernelError::NumericalEdgeCase {
                        msg: format!(
                            "vanishing lambda interval {} on {} edge ({}, {})",
                            gap,
                            color_name(is_red),
                            u,
                            v
                        ),
                        r_intact: true,
                        b_intact: true,
                    });
                }
            }
        }
    }

    if !complex.is_empty() {
        complex.sort_by(|a, b| (a.u_id, a.v_id).cmp(&(b.u_id, b.v_id)));
        return Err(KernelError::ComplexEdges {
            msg: format!("{} edges cross the other mesh too often", complex.len()),
            info: complex,
        });
    }
    Ok((red, blue))
}

/// Chain segments into cyclic loops. Every point must have degree exactly
/// two; anything else means the curve failed to close.
fn walk_loops<T: Scalar>(
    n_points: usize,
    segments: &[IsecSegment],
) -> Result<Vec<Vec<usize>>, KernelError<T>> {
    let mut nbrs: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); n_points];
    for s in segments {
        nbrs[s.a].push(s.b);
        nbrs[s.b].push(s.a);
    }
    for (k, nb) in nbrs.iter().enumerate() {
        if nb.len() != 2 {
            return Err(KernelError::NumericalEdgeCase {
                msg: format!(
                    "intersection point {} has polyline degree {}, expected 2",
                    k,
                    nb.len()
                ),
                r_intact: true,
                b_intact: true,
            });
        }
    }

    let mut visited = vec![false; n_points];
    let mut loops = Vec::new();
    for start in 0..n_points {
        if visited[start] {
            continue;
        }
        let mut lp = vec![start];
        visited[start] = true;
        let mut prev = start;
        let mut cur = nbrs[start][0];
        while cur != start {
            visited[cur] = true;
            lp.push(cur);
            let next = if nbrs[cur][0] == prev {
                nbrs[cur][1]
            } else {
                nbrs[cur][0]
            };
            prev = cur;
            cur = next;
        }
        if lp.len() < 3 {
            return Err(KernelError::NumericalEdgeCase {
                msg: format!("intersection loop of length {} is not a closed curve", lp.len()),
                r_intact: true,
                b_intact: true,
            });
        }
        loops.push(lp);
    }
    Ok(loops)
}

/// Faces of one color a point lies on: the crossed face when the point's
/// edge has the other color, the edge's incident faces otherwise.
fn faces_of_color<T: Scalar>(p: &IsecPoint<T>, red: bool) -> SmallVec<[usize; 2]> {
    if p.red_edge == red {
        p.edge_faces.clone()
    } else {
        SmallVec::from_slice(&[p.face])
    }
}

/// Which single face contains a collapsed loop. Preference: a blue face
/// common to all points, then a red one, then the face of the first point.
fn trivial_loop_face<T: Scalar>(points: &[IsecPoint<T>], lp: &[usize]) -> (bool, usize) {
    for is_red in [false, true] {
        let mut common: Option<AHashSet<usize>> = None;
        for &k in lp {
            let fs: AHashSet<usize> = faces_of_color(&points[k], is_red).into_iter().collect();
            common = Some(match common {
                None => fs,
                Some(c) => c.intersection(&fs).copied().collect(),
            });
        }
        if let Some(c) = common {
            if let Some(&f) = c.iter().min() {
                return (is_red, f);
            }
        }
    }
    (points[lp[0]].red_edge, points[lp[0]].face)
}

/// Classification of one face against the other operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceClass {
    Outside,
    Inside,
    Crossed,
}

/// Flood-fill face classification. `crossed_faces` become `Crossed` and act
/// as flood barriers, as do edges listed in `barrier_edges` (undirected
/// vertex pairs). Each remaining connected component is resolved with one
/// ray-cast parity query against `other` and the answer is spread across
/// the component.
pub fn flood_classify<T: Scalar>(
    mesh: &Mesh<T>,
    other: &Mesh<T>,
    crossed_faces: &AHashSet<usize>,
    barrier_edges: &AHashSet<(usize, usize)>,
) -> Vec<Option<FaceClass>> {
    let mut class: Vec<Option<FaceClass>> = vec![None; mesh.faces.len()];
    for &f in crossed_faces {
        class[f] = Some(FaceClass::Crossed);
    }

    for seed in mesh.face_ids() {
        if class[seed].is_some() {
            continue;
        }
        // collect the component first, then classify it with a single query
        let mut component = vec![seed];
        let mut stack = vec![seed];
        class[seed] = Some(FaceClass::Outside); // provisional marker
        while let Some(f) = stack.pop() {
            let [a, b, c] = mesh.face_vertices(f);
            for (s, t) in [(a, b), (b, c), (c, a)] {
                let key = (s.min(t), s.max(t));
                if barrier_edges.contains(&key) {
                    continue;
                }
                for nb in mesh.faces_of_edge(s, t) {
                    if nb != f && class[nb].is_none() {
                        class[nb] = Some(FaceClass::Outside);
                        component.push(nb);
                        stack.push(nb);
                    }
                }
            }
        }

        let rep = component[0];
        let inside = other.contains_point(&mesh.face_centroid(rep));
        if inside {
            for f in component {
                class[f] = Some(FaceClass::Inside);
            }
        }
        trace!(seed, inside, "component classified");
    }
    class
}
