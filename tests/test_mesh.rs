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

use arbormesh::{generate_icosphere, geometry::Point3, Mesh};
use common::{assert_close, make_box};

#[test]
fn test_two_connected_triangles() {
    let mut m: Mesh<f64> = Mesh::new();
    let a = m.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let b = m.add_vertex(Point3::new(1.0, 0.0, 0.0));
    let c = m.add_vertex(Point3::new(0.0, 1.0, 0.0));
    let d = m.add_vertex(Point3::new(1.0, 1.0, 0.0));
    let f0 = m.add_triangle(a, b, c);
    let f1 = m.add_triangle(b, d, c);

    assert_eq!(m.face_vertices(f0), [a, b, c]);
    assert_eq!(m.face_vertices(f1), [b, d, c]);
    assert_eq!(m.faces_of_edge(b, c).as_slice(), &[f0, f1]);
    assert!(m.half_edge_between(b, c).is_some());
    assert!(m.half_edge_between(c, b).is_some());
    assert!(!m.is_closed());

    let ring_b: Vec<usize> = m.one_ring_neighbors(b).into_iter().collect();
    assert_eq!(ring_b.len(), 3);
    for w in [a, c, d] {
        assert!(ring_b.contains(&w), "missing ring neighbor {}", w);
    }
}

#[test]
fn test_box_is_closed_manifold() {
    let m = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    assert_eq!(m.vertex_count(), 8);
    assert_eq!(m.face_count(), 12);
    assert_eq!(m.undirected_edges().len(), 18);
    assert!(m.is_closed());
    assert!(m.non_manifold_edges().is_empty());
    assert_eq!(m.euler_characteristic(), 2);
    assert_close(m.volume(), 1.0, 1e-12, "unit box volume");
}

#[test]
fn test_box_contains_point() {
    let m = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    assert!(m.contains_point(&Point3::new(0.4, 0.6, 0.3)));
    assert!(!m.contains_point(&Point3::new(1.7, 0.5, 0.5)));
    assert!(!m.contains_point(&Point3::new(-0.2, -0.2, -0.2)));
}

#[test]
fn test_remove_face_reopens_surface() {
    let mut m = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let f = m.face_ids().next().unwrap();
    m.remove_face(f);
    assert_eq!(m.face_count(), 11);
    assert!(!m.is_closed());
    // removing twice is a no-op
    m.remove_face(f);
    assert_eq!(m.face_count(), 11);
}

#[test]
fn test_split_edge_preserves_volume() {
    let mut m = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
    let (u, v) = m.undirected_edges()[0];
    let mid = m.vertices[u].position.midpoint(&m.vertices[v].position);
    let w = m.split_edge(u, v, mid);
    assert!(w > 0);
    assert_eq!(m.face_count(), 14);
    assert!(m.is_closed());
    assert_close(m.volume(), 8.0, 1e-12, "box volume after split_edge");
    assert_eq!(m.euler_characteristic(), 2);
}

#[test]
fn test_split_face_preserves_volume() {
    let mut m = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let f = m.face_ids().next().unwrap();
    let c = m.face_centroid(f);
    m.split_face(f, c);
    assert_eq!(m.face_count(), 14);
    assert!(m.is_closed());
    assert_close(m.volume(), 1.0, 1e-12, "box volume after split_face");
    assert_eq!(m.euler_characteristic(), 2);
}

#[test]
fn test_flip_edge_on_planar_quad() {
    let mut m = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    // the bottom face diagonal {0, 2} flips to {1, 3} without changing shape
    assert!(m.flip_edge(0, 2));
    assert!(m.half_edge_between(1, 3).is_some() || m.half_edge_between(3, 1).is_some());
    assert!(m.is_closed());
    assert_close(m.volume(), 1.0, 1e-12, "box volume after flip");
    // flipping a non-edge fails cleanly
    assert!(!m.flip_edge(0, 6));
}

#[test]
fn test_collapse_edge_on_sphere() {
    let mut m = generate_icosphere(Point3::new(0.0, 0.0, 0.0), 1.0, 2);
    let faces_before = m.face_count();
    let vertices_before = m.vertex_count();
    let vol_before = m.volume();

    let (u, v) = m.undirected_edges()[0];
    let mid = m.vertices[u].position.midpoint(&m.vertices[v].position);
    assert!(m.collapse_edge(u, v, mid, Some(0.5)));

    assert_eq!(m.face_count(), faces_before - 2);
    assert_eq!(m.vertex_count(), vertices_before - 1);
    assert!(m.is_closed());
    assert_eq!(m.euler_characteristic(), 2);
    assert_close(m.volume(), vol_before, 0.05 * vol_before, "volume after collapse");
}

#[test]
fn test_replace_vertex_rewires_faces() {
    let mut m: Mesh<f64> = Mesh::new();
    let a = m.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let b = m.add_vertex(Point3::new(1.0, 0.0, 0.0));
    let c = m.add_vertex(Point3::new(0.0, 1.0, 0.0));
    // duplicate of c at the same position, as after independent meshing
    let c2 = m.add_vertex(Point3::new(0.0, 1.0, 0.0));
    let d = m.add_vertex(Point3::new(-1.0, 1.0, 0.0));
    m.add_triangle(a, b, c);
    m.add_triangle(a, c2, d);

    m.replace_vertex(c2, c);
    assert!(m.vertices[c2].removed);
    assert_eq!(m.face_count(), 2);
    let mut seen_c = 0;
    for f in m.face_ids().collect::<Vec<_>>() {
        if m.face_vertices(f).contains(&c) {
            seen_c += 1;
        }
    }
    assert_eq!(seen_c, 2);
    assert!(m.faces_of_edge(a, c).len() == 2);
}
