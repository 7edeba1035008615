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
    geometry::{aabb::Aabb3, point_3::Point3, vector_3::Vector3},
    mesh::{core::Mesh, half_edge::NO_HALF_EDGE},
    numeric::scalar::Scalar,
};

impl<T: Scalar> Mesh<T> {
    pub fn face_normal(&self, f: usize) -> Vector3<T> {
        let [a, b, c] = self.face_vertices(f);
        let pa = self.vertices[a].position;
        let ab = pa.vector_to(&self.vertices[b].position);
        let ac = pa.vector_to(&self.vertices[c].position);
        ab.cross(&ac)
    }

    pub fn face_area(&self, f: usize) -> T {
        self.face_normal(f).norm() * T::half()
    }

    pub fn face_centroid(&self, f: usize) -> Point3<T> {
        let [a, b, c] = self.face_vertices(f);
        let pa = self.vertices[a].position;
        let pb = self.vertices[b].position;
        let pc = self.vertices[c].position;
        let third = T::one() / (T::one() + T::two());
        Point3::new(
            (pa.x + pb.x + pc.x) * third,
            (pa.y + pb.y + pc.y) * third,
            (pa.z + pb.z + pc.z) * third,
        )
    }

    pub fn face_points(&self, f: usize) -> [Point3<T>; 3] {
        let [a, b, c] = self.face_vertices(f);
        [
            self.vertices[a].position,
            self.vertices[b].position,
            self.vertices[c].position,
        ]
    }

    pub fn face_aabb(&self, f: usize) -> Aabb3<T> {
        let [pa, pb, pc] = self.face_points(f);
        let mut bb = Aabb3::from_points(&pa, &pb);
        bb.include(&pc);
        bb
    }

    pub fn edge_aabb(&self, u: usize, v: usize) -> Aabb3<T> {
        Aabb3::from_points(&self.vertices[u].position, &self.vertices[v].position)
    }

    /// Union bounding box over all live vertices; `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Aabb3<T>> {
        let mut it = self.vertex_ids();
        let first = it.next()?;
        let mut bb = Aabb3::from_point(&self.vertices[first].position);
        for v in it {
            bb.include(&self.vertices[v].position);
        }
        Some(bb)
    }

    /// Unique undirected live edges as (min_vid, max_vid).
    pub fn undirected_edges(&self) -> Vec<(usize, usize)> {
        let mut seen = AHashSet::new();
        let mut out = Vec::with_capacity(self.edge_map.len() / 2);
        for (&(s, t), &he) in self.edge_map.iter() {
            if self.half_edges[he].removed {
                continue;
            }
            let key = (s.min(t), s.max(t));
            if seen.insert(key) {
                out.push(key);
            }
        }
        out.sort_unstable();
        out
    }

    /// Faces around vertex `v` by twin rotation from the vertex hint,
    /// covering both directions so boundary fans are fully enumerated.
    pub fn faces_around_vertex(&self, v: usize) -> SmallVec<[usize; 8]> {
        let mut out: SmallVec<[usize; 8]> = SmallVec::new();
        let start = match self.vertices[v].half_edge {
            Some(he) if !self.half_edges[he].removed => he,
            _ => match self.find_outgoing(v) {
                Some(he) => he,
                None => return out,
            },
        };
        let cap = self.half_edges.len();

        // CCW sweep: next outgoing spoke is twin(prev(current))
        let mut he = start;
        let mut steps = 0;
        loop {
            if let Some(f) = self.half_edges[he].face {
                if !self.faces[f].removed && !out.contains(&f) {
                    out.push(f);
                }
            }
            let prev = self.half_edges[he].prev;
            let cand = self.half_edges[prev].twin;
            if cand == NO_HALF_EDGE || self.half_edges[cand].removed || cand == start {
                break;
            }
            he = cand;
            steps += 1;
            if steps > cap {
                break;
            }
        }

        // CW sweep from the start to catch the other side of a boundary fan
        let mut he = start;
        let mut steps = 0;
        loop {
            let twin = self.half_edges[he].twin;
            if twin == NO_HALF_EDGE || self.half_edges[twin].removed {
                break;
            }
            let cand = self.half_edges[twin].next;
            if cand == start || self.half_edges[cand].removed {
                break;
            }
            he = cand;
            if let Some(f) = self.half_edges[he].face {
                if !self.faces[f].removed && !out.contains(&f) {
                    out.push(f);
                }
            }
            steps += 1;
            if steps > cap {
                break;
            }
        }
        out
    }

    pub fn one_ring_neighbors(&self, v: usize) -> SmallVec<[usize; 8]> {
        let mut out: SmallVec<[usize; 8]> = SmallVec::new();
        for f in self.faces_around_vertex(v) {
            for w in self.face_vertices(f) {
                if w != v && !out.contains(&w) {
                    out.push(w);
                }
            }
        }
        out
    }

    /// True when every live half-edge has a live twin (oriented manifold
    /// without boundary, provided edges are at most double-covered).
    pub fn is_closed(&self) -> bool {
        self.half_edges.iter().all(|he| {
            he.removed || (he.twin != NO_HALF_EDGE && !self.half_edges[he.twin].removed)
        })
    }

    /// Undirected edges covered by more than two live faces. A non-empty
    /// result means the mesh is not an oriented manifold.
    pub fn non_manifold_edges(&self) -> Vec<(usize, usize)> {
        let mut count: AHashMap<(usize, usize), usize> = AHashMap::new();
        for f in self.face_ids() {
            let [a, b, c] = self.face_vertices(f);
            for (s, t) in [(a, b), (b, c), (c, a)] {
                *count.entry((s.min(t), s.max(t))).or_insert(0) += 1;
            }
        }
        let mut out: Vec<(usize, usize)> = count
            .into_iter()
            .filter(|&(_, n)| n > 2)
            .map(|(e, _)| e)
            .collect();
        out.sort_unstable();
        out
    }

    /// Signed enclosed volume by the divergence theorem; positive for a
    /// closed mesh with outward-facing normals.
    pub fn volume(&self) -> T {
        let sixth = T::one() / T::from_f64(6.0).unwrap();
        let mut total = T::zero();
        for f in self.face_ids() {
            let [pa, pb, pc] = self.face_points(f);
            total = total + pa.as_vector().dot(&pb.as_vector().cross(&pc.as_vector()));
        }
        total * sixth
    }

    /// V - E + F over the live elements.
    pub fn euler_characteristic(&self) -> i64 {
        let v = self.vertex_count() as i64;
        let e = self.undirected_edges().len() as i64;
        let f = self.face_count() as i64;
        v - e + f
    }

    /// Ray-cast parity test. Casts along a deterministic direction and
    /// retries with rotated directions when a hit is too close to an edge to
    /// be trusted.
    pub fn contains_point(&self, p: &Point3<T>) -> bool {
        const DIRS: [(f64, f64, f64); 5] = [
            (1.0, 0.0, 0.0),
            (0.57735, 0.57735, 0.57735),
            (0.267261, 0.534522, 0.801784),
            (-0.666667, 0.333333, 0.666667),
            (0.0, -0.8, 0.6),
        ];
        for &(dx, dy, dz) in DIRS.iter() {
            let d = Vector3::new(
                T::from_f64(dx).unwrap(),
                T::from_f64(dy).unwrap(),
                T::from_f64(dz).unwrap(),
            );
            match self.ray_parity(p, &d) {
                Some(odd) => return odd,
                None => continue,
            }
        }
        // every probe direction grazed an edge; treat as outside
        false
    }

    /// Parity of ray crossings from `p` along `dir`, or `None` when some
    /// crossing is too marginal to count reliably.
    fn ray_parity(&self, p: &Point3<T>, dir: &Vector3<T>) -> Option<bool> {
        let mut crossings = 0usize;
        for f in self.face_ids() {
            let [pa, pb, pc] = self.face_points(f);
            match ray_triangle(p, dir, &pa, &pb, &pc) {
                RayHit::Miss => {}
                RayHit::Hit => crossings += 1,
                RayHit::Marginal => return None,
            }
        }
        Some(crossings % 2 == 1)
    }
}

enum RayHit {
    Miss,
    Hit,
    Marginal,
}

/// Möller–Trumbore with an ε-band: hits through the band around edges,
/// vertices or t = 0 report `Marginal`.
fn ray_triangle<T: Scalar>(
    origin: &Point3<T>,
    dir: &Vector3<T>,
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
) -> RayHit {
    let e1 = a.vector_to(b);
    let e2 = a.vector_to(c);
    let pvec = dir.cross(&e2);
    let det = e1.dot(&pvec);
    let scale = e1.norm().max(e2.norm()).max(T::one());
    let eps = T::eps() * scale;

    if det.abs() <= eps * scale {
        // ray parallel to the face plane; only marginal if it grazes
        return RayHit::Miss;
    }
    let inv_det = T::one() / det;
    let tvec = a.vector_to(origin);
    let u = tvec.dot(&pvec) * inv_det;
    let qvec = tvec.cross(&e1);
    let v = dir.dot(&qvec) * inv_det;
    let t = e2.dot(&qvec) * inv_det;

    let band = T::eps().max(T::from_f64(1e-7).unwrap());
    let w = T::one() - u - v;
    let min_b = u.min(v).min(w);

    if t <= -band * scale {
        return RayHit::Miss;
    }
    if t.abs() <= band * scale {
        return RayHit::Marginal;
    }
    if min_b > band {
        RayHit::Hit
    } else if min_b >= -band {
        RayHit::Marginal
    } else {
        RayHit::Miss
    }
}
