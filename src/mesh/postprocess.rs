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

//! Mesh post-processing applied after merging: greedy collapse of
//! undersized edges and Laplacian smoothing (plain and HC-corrected).

use ahash::AHashMap;
use tracing::debug;

use crate::{
    geometry::point_3::Point3,
    mesh::core::Mesh,
    network::pqueue::IndexedMinHeap,
    numeric::scalar::Scalar,
};

/// Greedily collapse edges much shorter than the current mean edge length.
///
/// An edge qualifies while `len <= lambda * mean`; collapses go to the
/// midpoint, shortest first, and are rejected when a surviving face normal
/// would rotate past `mu` (dot-product threshold) or a resulting edge would
/// exceed `alpha * mean`. At most `max_passes` passes run; each pass
/// recomputes the mean.
pub fn greedy_edge_collapse_post_processing<T: Scalar>(
    mesh: &mut Mesh<T>,
    alpha: T,
    lambda: T,
    mu: T,
    max_passes: u32,
) {
    for pass in 0..max_passes {
        let edges = mesh.undirected_edges();
        if edges.is_empty() {
            return;
        }
        let mean = edges
            .iter()
            .fold(T::zero(), |acc, &(u, v)| {
                acc + mesh.vertices[u].position.distance_to(&mesh.vertices[v].position)
            })
            / T::from_usize(edges.len()).unwrap();
        let threshold = lambda * mean;
        let cap = alpha * mean;

        // dense edge ids for the indexed heap
        let mut by_id: Vec<(usize, usize)> = Vec::new();
        let mut queue: IndexedMinHeap<T> = IndexedMinHeap::new();
        for &(u, v) in edges.iter() {
            let len = mesh.vertices[u].position.distance_to(&mesh.vertices[v].position);
            if len <= threshold {
                queue.insert(len, by_id.len());
                by_id.push((u, v));
            }
        }
        if queue.is_empty() {
            return;
        }

        let mut collapsed = 0usize;
        while let Some((_, id)) = queue.pop_min() {
            let (u, v) = by_id[id];
            if mesh.vertices[u].removed || mesh.vertices[v].removed {
                continue;
            }
            if mesh.half_edge_between(u, v).is_none() && mesh.half_edge_between(v, u).is_none() {
                continue;
            }
            let len = mesh.vertices[u].position.distance_to(&mesh.vertices[v].position);
            if len > threshold {
                continue;
            }
            let target = mesh.vertices[u].position.midpoint(&mesh.vertices[v].position);
            if longest_incident_edge_after(mesh, u, v, &target) > cap {
                continue;
            }
            if mesh.collapse_edge(u, v, target, Some(mu)) {
                collapsed += 1;
            }
        }
        debug!(pass, collapsed, "edge-collapse pass");
        if collapsed == 0 {
            return;
        }
    }
}

fn longest_incident_edge_after<T: Scalar>(
    mesh: &Mesh<T>,
    u: usize,
    v: usize,
    target: &Point3<T>,
) -> T {
    let mut longest = T::zero();
    for w in [u, v] {
        for n in mesh.one_ring_neighbors(w) {
            if n != u && n != v {
                longest = longest.max(target.distance_to(&mesh.vertices[n].position));
            }
        }
    }
    longest
}

/// Plain uniform-weight Laplacian smoothing: every vertex moves a fraction
/// `lambda` towards the centroid of its one-ring each iteration.
pub fn simple_laplacian_smoothing<T: Scalar>(mesh: &mut Mesh<T>, lambda: T, maxiter: u32) {
    for _ in 0..maxiter {
        let updates: Vec<(usize, Point3<T>)> = mesh
            .vertex_ids()
            .filter_map(|v| {
                ring_centroid(mesh, v).map(|c| {
                    let p = mesh.vertices[v].position;
                    (v, p + p.vector_to(&c) * lambda)
                })
            })
            .collect();
        for (v, p) in updates {
            mesh.vertices[v].position = p;
        }
    }
}

/// HC Laplacian smoothing (Vollmer, Mencl, Müller): a plain Laplacian step
/// followed by a correction that pushes vertices back towards a blend of
/// their original and previous positions, suppressing shrinkage.
pub fn hc_laplacian_smoothing<T: Scalar>(mesh: &mut Mesh<T>, alpha: T, beta: T, maxiter: u32) {
    let original: AHashMap<usize, Point3<T>> = mesh
        .vertex_ids()
        .map(|v| (v, mesh.vertices[v].position))
        .collect();

    for _ in 0..maxiter {
        let previous: AHashMap<usize, Point3<T>> = mesh
            .vertex_ids()
            .map(|v| (v, mesh.vertices[v].position))
            .collect();

        // Laplacian step
        let smoothed: AHashMap<usize, Point3<T>> = mesh
            .vertex_ids()
            .map(|v| (v, ring_centroid(mesh, v).unwrap_or(mesh.vertices[v].position)))
            .collect();

        // per-vertex correction vector
        let one = T::one();
        let corrections: AHashMap<usize, Point3<T>> = smoothed
            .iter()
            .map(|(&v, q)| {
                let o = original[&v];
                let p = previous[&v];
                let anchor = Point3::new(
                    alpha * o.x + (one - alpha) * p.x,
                    alpha * o.y + (one - alpha) * p.y,
                    alpha * o.z + (one - alpha) * p.z,
                );
                (v, Point3::new(q.x - anchor.x, q.y - anchor.y, q.z - anchor.z))
            })
            .collect();

        for (&v, q) in smoothed.iter() {
            let b_v = corrections[&v];
            let ring = mesh.one_ring_neighbors(v);
            let mut avg = Point3::origin();
            let mut n = 0usize;
            for w in ring {
                if let Some(b_w) = corrections.get(&w) {
                    avg = Point3::new(avg.x + b_w.x, avg.y + b_w.y, avg.z + b_w.z);
                    n += 1;
                }
            }
            let pulled = if n > 0 {
                let inv = one / T::from_usize(n).unwrap();
                Point3::new(
                    beta * b_v.x + (one - beta) * avg.x * inv,
                    beta * b_v.y + (one - beta) * avg.y * inv,
                    beta * b_v.z + (one - beta) * avg.z * inv,
                )
            } else {
                b_v
            };
            mesh.vertices[v].position =
                Point3::new(q.x - pulled.x, q.y - pulled.y, q.z - pulled.z);
        }
    }
}

fn ring_centroid<T: Scalar>(mesh: &Mesh<T>, v: usize) -> Option<Point3<T>> {
    let ring = mesh.one_ring_neighbors(v);
    if ring.is_empty() {
        return None;
    }
    let mut acc: Point3<T> = Point3::origin();
    for &w in ring.iter() {
        let p = mesh.vertices[w].position;
        acc = Point3::new(acc.x + p.x, acc.y + p.y, acc.z + p.z);
    }
    let inv = T::one() / T::from_usize(ring.len()).unwrap();
    Some(Point3::new(acc.x * inv, acc.y * inv, acc.z * inv))
}
