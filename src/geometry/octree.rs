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

use ahash::AHashSet;

use crate::{geometry::aabb::Aabb3, mesh::core::Mesh, numeric::scalar::Scalar};

/// A potentially intersecting (edge of one mesh, face of the other) pair.
/// Edges are undirected, so `u < v` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeFacePair {
    pub u: usize,
    pub v: usize,
    pub face: usize,
}

impl EdgeFacePair {
    pub fn new(u: usize, v: usize, face: usize) -> Self {
        if u <= v {
            Self { u, v, face }
        } else {
            Self { u: v, v: u, face }
        }
    }
}

pub const DEFAULT_MAX_COMPONENTS: usize = 128;
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 7;

struct Primitives<T: Scalar> {
    x_edges: Vec<((usize, usize), Aabb3<T>)>,
    x_faces: Vec<(usize, Aabb3<T>)>,
    y_edges: Vec<((usize, usize), Aabb3<T>)>,
    y_faces: Vec<(usize, Aabb3<T>)>,
}

/// For two meshes X and Y, collect the pairs of potentially intersecting
/// (edge of X, face of Y) and (edge of Y, face of X).
///
/// The octree is implicit: cells are recursed on the fly and never stored,
/// since a broadphase query is one-shot. Every emitted pair passed an
/// AABB-against-AABB test inside some leaf cell, so the result is a superset
/// of the truly intersecting pairs, de-duplicated and sorted.
pub fn candidate_edge_face_pairs<T: Scalar>(
    x: &Mesh<T>,
    y: &Mesh<T>,
    max_components: usize,
    max_recursion_depth: u32,
) -> (Vec<EdgeFacePair>, Vec<EdgeFacePair>) {
    let (bx, by) = match (x.bounding_box(), y.bounding_box()) {
        (Some(a), Some(b)) => (a, b),
        _ => return (Vec::new(), Vec::new()),
    };
    let cell = bx.union(&by).padded(T::eps());

    let prim = Primitives {
        x_edges: edge_aabbs(x),
        x_faces: face_aabbs(x),
        y_edges: edge_aabbs(y),
        y_faces: face_aabbs(y),
    };

    let mut xe_yf: AHashSet<EdgeFacePair> = AHashSet::new();
    let mut ye_xf: AHashSet<EdgeFacePair> = AHashSet::new();

    let xe: Vec<u32> = (0..prim.x_edges.len() as u32).collect();
    let xf: Vec<u32> = (0..prim.x_faces.len() as u32).collect();
    let ye: Vec<u32> = (0..prim.y_edges.len() as u32).collect();
    let yf: Vec<u32> = (0..prim.y_faces.len() as u32).collect();

    recurse(
        &prim,
        &cell,
        0,
        max_components,
        max_recursion_depth,
        (&xe, &yf, &ye, &xf),
        &mut xe_yf,
        &mut ye_xf,
    );

    let mut a: Vec<EdgeFacePair> = xe_yf.into_iter().collect();
    let mut b: Vec<EdgeFacePair> = ye_xf.into_iter().collect();
    a.sort_unstable();
    b.sort_unstable();
    (a, b)
}

fn edge_aabbs<T: Scalar>(m: &Mesh<T>) -> Vec<((usize, usize), Aabb3<T>)> {
    m.undirected_edges()
        .into_iter()
        .map(|(u, v)| ((u, v), m.edge_aabb(u, v)))
        .collect()
}

fn face_aabbs<T: Scalar>(m: &Mesh<T>) -> Vec<(usize, Aabb3<T>)> {
    m.face_ids().map(|f| (f, m.face_aabb(f))).collect()
}

#[allow(clippy::too_many_arguments)]
fn recurse<T: Scalar>(
    prim: &Primitives<T>,
    cell: &Aabb3<T>,
    depth: u32,
    max_components: usize,
    max_depth: u32,
    lists: (&[u32], &[u32], &[u32], &[u32]),
    xe_yf: &mut AHashSet<EdgeFacePair>,
    ye_xf: &mut AHashSet<EdgeFacePair>,
) {
    let (xe, yf, ye, xf) = lists;

    let forward_live = !xe.is_empty() && !yf.is_empty();
    let backward_live = !ye.is_empty() && !xf.is_empty();
    if !forward_live && !backward_live {
        return;
    }

    let total = xe.len() + yf.len() + ye.len() + xf.len();
    if depth >= max_depth || total < max_components {
        emit_pairs(&prim.x_edges, &prim.y_faces, xe, yf, xe_yf);
        emit_pairs(&prim.y_edges, &prim.x_faces, ye, xf, ye_xf);
        return;
    }

    for i in 0..8 {
        let oct = cell.octant(i);
        let sub_xe = filter_in(&prim.x_edges, xe, &oct);
        let sub_yf = filter_in(&prim.y_faces, yf, &oct);
        let sub_ye = filter_in(&prim.y_edges, ye, &oct);
        let sub_xf = filter_in(&prim.x_faces, xf, &oct);
        recurse(
            prim,
            &oct,
            depth + 1,
            max_components,
            max_depth,
            (&sub_xe, &sub_yf, &sub_ye, &sub_xf),
            xe_yf,
            ye_xf,
        );
    }
}

fn filter_in<T: Scalar, K>(
    prims: &[(K, Aabb3<T>)],
    idx: &[u32],
    cell: &Aabb3<T>,
) -> Vec<u32> {
    idx.iter()
        .copied()
        .filter(|&i| prims[i as usize].1.intersects(cell))
        .collect()
}

fn emit_pairs<T: Scalar>(
    edges: &[((usize, usize), Aabb3<T>)],
    faces: &[(usize, Aabb3<T>)],
    edge_idx: &[u32],
    face_idx: &[u32],
    out: &mut AHashSet<EdgeFacePair>,
) {
    for &ei in edge_idx {
        let ((u, v), ref ebb) = edges[ei as usize];
        for &fi in face_idx {
            let (f, ref fbb) = faces[fi as usize];
            if ebb.intersects(fbb) {
                out.insert(EdgeFacePair::new(u, v, f));
            }
        }
    }
}
