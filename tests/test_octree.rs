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

mod common;

use arbormesh::{
    candidate_edge_face_pairs,
    geometry::{
        predicates::{segment_triangle_intersection, SegTriIsect},
        Point3,
    },
    EdgeFacePair, Mesh,
};
use common::make_box;

/// Brute-force list of edge/face pairs that actually intersect.
fn true_crossing_pairs(edge_mesh: &Mesh<f64>, face_mesh: &Mesh<f64>) -> Vec<EdgeFacePair> {
    let mut out = Vec::new();
    for (u, v) in edge_mesh.undirected_edges() {
        let pu = edge_mesh.vertices[u].position;
        let pv = edge_mesh.vertices[v].position;
        for f in face_mesh.face_ids() {
            let [a, b, c] = face_mesh.face_points(f);
            if let SegTriIsect::Proper { .. } =
                segment_triangle_intersection(&pu, &pv, &a, &b, &c)
            {
                out.push(EdgeFacePair::new(u, v, f));
            }
        }
    }
    out
}

#[test]
fn test_candidates_cover_all_true_crossings() {
    let x = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let y = make_box(Point3::new(0.5, 0.3, 0.25), Point3::new(1.5, 1.3, 1.25));

    let (xe_yf, ye_xf) = candidate_edge_face_pairs(&x, &y, 4, 7);
    assert!(!xe_yf.is_empty());
    assert!(!ye_xf.is_empty());

    for p in true_crossing_pairs(&x, &y) {
        assert!(
            xe_yf.binary_search(&p).is_ok(),
            "missing X-edge/Y-face candidate {:?}",
            p
        );
    }
    for p in true_crossing_pairs(&y, &x) {
        assert!(
            ye_xf.binary_search(&p).is_ok(),
            "missing Y-edge/X-face candidate {:?}",
            p
        );
    }
}

#[test]
fn test_candidates_sorted_and_unique() {
    let x = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let y = make_box(Point3::new(0.5, 0.3, 0.25), Point3::new(1.5, 1.3, 1.25));

    // a tiny leaf threshold forces deep recursion and repeated registration
    let (xe_yf, _) = candidate_edge_face_pairs(&x, &y, 2, 6);
    for w in xe_yf.windows(2) {
        assert!(w[0] < w[1], "output not strictly sorted: {:?} {:?}", w[0], w[1]);
    }
    for p in &xe_yf {
        assert!(p.u < p.v, "edge endpoints unordered: {:?}", p);
    }
}

#[test]
fn test_candidates_deterministic() {
    let x = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let y = make_box(Point3::new(0.5, 0.3, 0.25), Point3::new(1.5, 1.3, 1.25));
    let a = candidate_edge_face_pairs(&x, &y, 16, 7);
    let b = candidate_edge_face_pairs(&x, &y, 16, 7);
    assert_eq!(a.0, b.0);
    assert_eq!(a.1, b.1);
}

#[test]
fn test_disjoint_meshes_have_no_candidates() {
    let x = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let y = make_box(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
    let (xe_yf, ye_xf) = candidate_edge_face_pairs(&x, &y, 128, 7);
    assert!(xe_yf.is_empty());
    assert!(ye_xf.is_empty());
}

#[test]
fn test_nested_but_separated_surfaces_have_no_candidates() {
    // a small box strictly inside a large one: surfaces never come close
    let x = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let y = make_box(Point3::new(0.4, 0.4, 0.4), Point3::new(0.6, 0.6, 0.6));
    let (xe_yf, ye_xf) = candidate_edge_face_pairs(&x, &y, 128, 7);
    assert!(xe_yf.is_empty());
    assert!(ye_xf.is_empty());
}
