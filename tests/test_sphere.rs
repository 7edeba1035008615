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
    append_half_sphere_cap, generate_icosphere, generate_octsphere,
    geometry::{Point3, Vector3},
    Mesh,
};
use common::assert_close;

#[test]
fn test_icosphere_counts() {
    for d in 0..4u32 {
        let m = generate_icosphere(Point3::new(0.0, 0.0, 0.0), 1.0, d);
        let pow = 4usize.pow(d);
        assert_eq!(m.vertex_count(), 10 * pow + 2, "vertices at depth {}", d);
        assert_eq!(m.face_count(), 20 * pow, "faces at depth {}", d);
        assert!(m.is_closed(), "icosphere depth {} must be closed", d);
        assert_eq!(m.euler_characteristic(), 2);
    }
}

#[test]
fn test_octsphere_counts() {
    for d in 0..4u32 {
        let m = generate_octsphere(Point3::new(0.0, 0.0, 0.0), 1.0, d);
        let pow = 4usize.pow(d);
        assert_eq!(m.vertex_count(), 4 * pow + 2, "vertices at depth {}", d);
        assert_eq!(m.face_count(), 8 * pow, "faces at depth {}", d);
        assert!(m.is_closed(), "octsphere depth {} must be closed", d);
    }
}

#[test]
fn test_sphere_vertices_on_sphere() {
    let center = Point3::new(1.0f64, -2.0, 0.5);
    let radius = 2.5f64;
    let m = generate_icosphere(center, radius, 3);
    for v in m.vertex_ids() {
        let d = center.distance_to(&m.vertices[v].position);
        assert!((d - radius).abs() <= 1e-9, "vertex {} off the sphere: {}", v, d);
    }
}

#[test]
fn test_icosphere_volume_approaches_ball() {
    let m = generate_icosphere(Point3::new(0.0, 0.0, 0.0), 1.0, 3);
    let ball = 4.0 * std::f64::consts::PI / 3.0;
    let v = m.volume();
    assert!(v < ball, "inscribed polyhedron stays below the ball volume");
    assert_close(v, ball, 0.02 * ball, "icosphere depth-3 volume");
}

#[test]
fn test_half_sphere_cap_closes_a_disk() {
    // base: a flat octagonal disk in the z = 0 plane, downward-facing,
    // leaving an open ring that the cap must close
    let n = 8usize;
    let mut m: Mesh<f64> = Mesh::new();
    let center = m.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let mut ring = Vec::with_capacity(n);
    for i in 0..n {
        let phi = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
        ring.push(m.add_vertex(Point3::new(phi.cos(), phi.sin(), 0.0)));
    }
    for i in 0..n {
        let j = (i + 1) % n;
        m.add_triangle(center, ring[j], ring[i]);
    }
    assert!(!m.is_closed());

    let closing = m.add_vertex(Point3::new(0.0, 0.0, 0.0));
    append_half_sphere_cap(
        &mut m,
        Vector3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        1.0,
        Vector3::new(0.0, 0.0, 1.0),
        n,
        0.0,
        &ring,
        closing,
    );

    assert!(m.is_closed(), "cap must close the ring watertight");
    assert!(m.non_manifold_edges().is_empty());
    assert_eq!(m.euler_characteristic(), 2);
    assert!(m.vertices[closing]
        .position
        .approx_eq(&Point3::new(0.0, 0.0, 1.0), 1e-12));

    // roughly a hemisphere; coarse tessellation undershoots
    let hemi = 2.0 * std::f64::consts::PI / 3.0;
    let v = m.volume();
    assert!(v > 0.6 * hemi && v < 1.02 * hemi, "cap volume {} vs hemisphere {}", v, hemi);

    // all cap vertices lie on the sphere
    for ring_v in m.vertex_ids() {
        if ring_v == center {
            continue;
        }
        let d = Point3::new(0.0, 0.0, 0.0).distance_to(&m.vertices[ring_v].position);
        assert!((d - 1.0).abs() <= 1e-9, "cap vertex {} off the sphere", ring_v);
    }
}
