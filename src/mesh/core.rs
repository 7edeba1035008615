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

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;

use crate::{
    geometry::point_3::Point3,
    mesh::{
        face::Face,
        half_edge::{HalfEdge, NO_HALF_EDGE},
        vertex::Vertex,
    },
    numeric::scalar::Scalar,
};

/// Oriented triangle mesh backed by flat half-edge arrays.
///
/// Slots are tombstoned on removal and never reused, so a vertex or face
/// index is a stable id for the lifetime of the mesh. `edge_map` answers
/// "half-edge from u to v" in O(1); the two faces incident to an undirected
/// edge follow from the two directed entries.
#[derive(Debug, Clone)]
pub struct Mesh<T: Scalar> {
    pub vertices: Vec<Vertex<T>>,
    pub half_edges: Vec<HalfEdge>,
    pub faces: Vec<Face>,
    pub edge_map: AHashMap<(usize, usize), usize>,
}

impl<T: Scalar> Mesh<T> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            half_edges: Vec::new(),
            faces: Vec::new(),
            edge_map: AHashMap::new(),
        }
    }

    pub fn with_capacity(nv: usize, nf: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(nv),
            half_edges: Vec::with_capacity(3 * nf),
            faces: Vec::with_capacity(nf),
            edge_map: AHashMap::with_capacity(3 * nf),
        }
    }

    pub fn add_vertex(&mut self, position: Point3<T>) -> usize {
        let idx = self.vertices.len();
        self.vertices.push(Vertex::new(position));
        idx
    }

    /// Number of live (non-removed) vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| !v.removed).count()
    }

    /// Number of live (non-removed) faces.
    pub fn face_count(&self) -> usize {
        self.faces.iter().filter(|f| !f.removed).count()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.removed)
            .map(|(i, _)| i)
    }

    pub fn face_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.removed)
            .map(|(i, _)| i)
    }

    /// Add an oriented triangle (v0, v1, v2), connecting twins through the
    /// edge map. The vertices must be distinct live vertices.
    pub fn add_triangle(&mut self, v0: usize, v1: usize, v2: usize) -> usize {
        debug_assert!(v0 != v1 && v1 != v2 && v2 != v0, "degenerate face");

        let he0 = self.half_edges.len();
        let he1 = he0 + 1;
        let he2 = he0 + 2;
        let face_idx = self.faces.len();

        let mut e0 = HalfEdge::new(v1);
        e0.face = Some(face_idx);
        e0.next = he1;
        e0.prev = he2;
        let mut e1 = HalfEdge::new(v2);
        e1.face = Some(face_idx);
        e1.next = he2;
        e1.prev = he0;
        let mut e2 = HalfEdge::new(v0);
        e2.face = Some(face_idx);
        e2.next = he0;
        e2.prev = he1;
        self.half_edges.push(e0);
        self.half_edges.push(e1);
        self.half_edges.push(e2);

        self.faces.push(Face::new(he0));

        for (he, (s, t)) in [(he0, (v0, v1)), (he1, (v1, v2)), (he2, (v2, v0))] {
            debug_assert!(
                !self.edge_map.contains_key(&(s, t)),
                "duplicate directed edge ({}, {})",
                s,
                t
            );
            self.edge_map.insert((s, t), he);
            if let Some(&opp) = self.edge_map.get(&(t, s)) {
                self.half_edges[he].twin = opp;
                self.half_edges[opp].twin = he;
            }
            if self.vertices[s].half_edge.is_none() {
                self.vertices[s].half_edge = Some(he);
            }
        }

        face_idx
    }

    pub fn half_edge_source(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].prev].vertex
    }

    pub fn half_edge_target(&self, he: usize) -> usize {
        self.half_edges[he].vertex
    }

    /// Remove a face, detaching its half-edges from the edge map and from
    /// their twins. Vertices are left in place; a vertex that loses its
    /// half-edge hint gets a best-effort replacement.
    pub fn remove_face(&mut self, f: usize) {
        if self.faces[f].removed {
            return;
        }
        let hes = self.face_half_edges(f);
        for &he in hes.iter() {
            let s = self.half_edge_source(he);
            let t = self.half_edge_target(he);
            if self.edge_map.get(&(s, t)) == Some(&he) {
                self.edge_map.remove(&(s, t));
            }
            let twin = self.half_edges[he].twin;
            if twin != NO_HALF_EDGE {
                self.half_edges[twin].twin = NO_HALF_EDGE;
            }
        }
        for &he in hes.iter() {
            self.half_edges[he].removed = true;
            self.half_edges[he].face = None;
        }
        self.faces[f].removed = true;

        // repair vertex hints that pointed into the removed cycle
        for &he in hes.iter() {
            let s = self.half_edge_source(he);
            if self.vertices[s].half_edge == Some(he) {
                self.vertices[s].half_edge = self.find_outgoing(s);
            }
        }
    }

    /// Some live outgoing half-edge of `v`, if any. Prefers the local
    /// neighborhood, falls back to an edge-map scan.
    pub(crate) fn find_outgoing(&self, v: usize) -> Option<usize> {
        self.edge_map
            .iter()
            .find(|(&(s, _), &he)| s == v && !self.half_edges[he].removed)
            .map(|(_, &he)| he)
    }

    pub fn face_half_edges(&self, f: usize) -> SmallVec<[usize; 3]> {
        let he0 = self.faces[f].half_edge;
        let he1 = self.half_edges[he0].next;
        let he2 = self.half_edges[he1].next;
        debug_assert_eq!(self.half_edges[he2].next, he0, "face cycle length != 3");
        SmallVec::from_slice(&[he0, he1, he2])
    }

    pub fn face_vertices(&self, f: usize) -> [usize; 3] {
        let hes = self.face_half_edges(f);
        [
            self.half_edges[hes[2]].vertex,
            self.half_edges[hes[0]].vertex,
            self.half_edges[hes[1]].vertex,
        ]
    }

    pub fn half_edge_between(&self, u: usize, v: usize) -> Option<usize> {
        self.edge_map.get(&(u, v)).copied()
    }

    /// Faces incident to the undirected edge {u, v} (0, 1 or 2).
    pub fn faces_of_edge(&self, u: usize, v: usize) -> SmallVec<[usize; 2]> {
        let mut out = SmallVec::new();
        for key in [(u, v), (v, u)] {
            if let Some(&he) = self.edge_map.get(&key) {
                if let Some(f) = self.half_edges[he].face {
                    if !self.faces[f].removed {
                        out.push(f);
                    }
                }
            }
        }
        out
    }

    /// Split the undirected edge {u, v} at `position`, replacing each
    /// incident face (a, b, x) by (a, w, x) and (w, b, x). Returns the new
    /// vertex id.
    pub fn split_edge(&mut self, u: usize, v: usize, position: Point3<T>) -> usize {
        let w = self.add_vertex(position);

        // collect incident faces with their apex before tearing them down
        let mut rebuilds: SmallVec<[(usize, usize, usize); 2]> = SmallVec::new();
        for (s, t) in [(u, v), (v, u)] {
            if let Some(&he) = self.edge_map.get(&(s, t)) {
                if let Some(f) = self.half_edges[he].face {
                    if !self.faces[f].removed {
                        let apex = self.half_edges[self.half_edges[he].next].vertex;
                        rebuilds.push((s, t, apex));
                        self.remove_face(f);
                    }
                }
            }
        }

        for (s, t, apex) in rebuilds {
            self.add_triangle(s, w, apex);
            self.add_triangle(w, t, apex);
        }
        w
    }

    /// Split face `f` at an interior `position` into three faces. Returns
    /// the new vertex id.
    pub fn split_face(&mut self, f: usize, position: Point3<T>) -> usize {
        let [a, b, c] = self.face_vertices(f);
        let w = self.add_vertex(position);
        self.remove_face(f);
        self.add_triangle(a, b, w);
        self.add_triangle(b, c, w);
        self.add_triangle(c, a, w);
        w
    }

    /// Flip the interior edge {u, v}. The two incident faces (u, v, x) and
    /// (v, u, y) become (x, u, y) and (y, v, x). Returns false when the edge
    /// is not interior or the flip would create an edge that already exists.
    pub fn flip_edge(&mut self, u: usize, v: usize) -> bool {
        let (he_uv, he_vu) = match (self.edge_map.get(&(u, v)), self.edge_map.get(&(v, u))) {
            (Some(&a), Some(&b)) => (a, b),
            _ => return false,
        };
        let (f0, f1) = match (self.half_edges[he_uv].face, self.half_edges[he_vu].face) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };
        let x = self.half_edges[self.half_edges[he_uv].next].vertex;
        let y = self.half_edges[self.half_edges[he_vu].next].vertex;
        if x == y || self.edge_map.contains_key(&(x, y)) || self.edge_map.contains_key(&(y, x)) {
            return false;
        }
        self.remove_face(f0);
        self.remove_face(f1);
        self.add_triangle(x, u, y);
        self.add_triangle(y, v, x);
        true
    }

    /// Rewrite every live face referencing vertex `from` to reference `to`
    /// instead, then tombstone `from`. Faces that would degenerate (already
    /// containing `to`) are removed. Used when welding coincident
    /// intersection vertices.
    pub fn replace_vertex(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let faces: Vec<usize> = self
            .face_ids()
            .filter(|&f| self.face_vertices(f).contains(&from))
            .collect();
        for f in faces {
            let [a, b, c] = self.face_vertices(f);
            let (na, nb, nc) = (
                if a == from { to } else { a },
                if b == from { to } else { b },
                if c == from { to } else { c },
            );
            self.remove_face(f);
            if na != nb && nb != nc && nc != na {
                self.add_triangle(na, nb, nc);
            }
        }
        self.vertices[from].removed = true;
        self.vertices[from].half_edge = None;
    }
}

impl<T: Scalar> Mesh<T> {
    /// Drop all contents; used when one Boolean operand has been merged
    /// into the other.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.half_edges.clear();
        self.faces.clear();
        self.edge_map.clear();
    }

    /// Collapse the edge {u, v} into `u`, placing it at `position`.
    ///
    /// Rejects collapses that would break the surface: the link condition
    /// (common neighbors of u and v must be exactly the opposite vertices
    /// of the two shared faces) and, when `min_normal_dot` is given, any
    /// surviving face whose unit normal rotates past that dot-product
    /// threshold. Returns whether the collapse was committed.
    pub fn collapse_edge(
        &mut self,
        u: usize,
        v: usize,
        position: Point3<T>,
        min_normal_dot: Option<T>,
    ) -> bool {
        let shared = self.faces_of_edge(u, v);
        if shared.len() != 2 {
            return false;
        }
        let mut opposite: SmallVec<[usize; 2]> = SmallVec::new();
        for &f in shared.iter() {
            for w in self.face_vertices(f) {
                if w != u && w != v {
                    opposite.push(w);
                }
            }
        }

        // link condition
        let ring_u: AHashSet<usize> = self.one_ring(u);
        let ring_v: AHashSet<usize> = self.one_ring(v);
        let common: AHashSet<usize> = ring_u.intersection(&ring_v).copied().collect();
        if common.len() != opposite.len() || !opposite.iter().all(|w| common.contains(w)) {
            return false;
        }

        // faces around v that survive (everything but the two shared ones)
        let mut v_faces: SmallVec<[usize; 8]> = SmallVec::new();
        for f in self.faces_around_vertex(v) {
            if !shared.contains(&f) {
                v_faces.push(f);
            }
        }
        let mut u_faces: SmallVec<[usize; 8]> = SmallVec::new();
        for f in self.faces_around_vertex(u) {
            if !shared.contains(&f) {
                u_faces.push(f);
            }
        }

        if let Some(threshold) = min_normal_dot {
            for (&vertex, faces) in [(&u, &u_faces), (&v, &v_faces)] {
                for &f in faces.iter() {
                    let [a, b, c] = self.face_vertices(f);
                    let p = |w: usize| {
                        if w == vertex {
                            position
                        } else {
                            self.vertices[w].position
                        }
                    };
                    let before = self.face_normal(f);
                    let after = p(a).vector_to(&p(b)).cross(&p(a).vector_to(&p(c)));
                    match (before.normalized(), after.normalized()) {
                        (Some(nb), Some(na)) => {
                            if nb.dot(&na) < threshold {
                                return false;
                            }
                        }
                        _ => return false,
                    }
                }
            }
        }

        // commit: drop the shared faces, rebuild v's fan onto u
        for &f in shared.iter() {
            self.remove_face(f);
        }
        for &f in v_faces.iter() {
            let [a, b, c] = self.face_vertices(f);
            let map = |w: usize| if w == v { u } else { w };
            self.remove_face(f);
            let (na, nb, nc) = (map(a), map(b), map(c));
            if na != nb && nb != nc && nc != na {
                self.add_triangle(na, nb, nc);
            }
        }
        self.vertices[v].removed = true;
        self.vertices[v].half_edge = None;
        self.vertices[u].position = position;
        true
    }

    fn one_ring(&self, v: usize) -> AHashSet<usize> {
        self.one_ring_neighbors(v).into_iter().collect()
    }
}

impl<T: Scalar> Default for Mesh<T> {
    fn default() -> Self {
        Self::new()
    }
}
