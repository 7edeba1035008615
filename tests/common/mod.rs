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

#![allow(dead_code)]

use arbormesh::{geometry::Point3, Mesh};

/// Axis-aligned box [min, max] as a closed, outward-oriented triangle mesh
/// (8 vertices, 12 faces).
pub fn make_box(min: Point3<f64>, max: Point3<f64>) -> Mesh<f64> {
    let mut m = Mesh::new();
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);
    let v = [
        m.add_vertex(Point3::new(x0, y0, z0)),
        m.add_vertex(Point3::new(x1, y0, z0)),
        m.add_vertex(Point3::new(x1, y1, z0)),
        m.add_vertex(Point3::new(x0, y1, z0)),
        m.add_vertex(Point3::new(x0, y0, z1)),
        m.add_vertex(Point3::new(x1, y0, z1)),
        m.add_vertex(Point3::new(x1, y1, z1)),
        m.add_vertex(Point3::new(x0, y1, z1)),
    ];
    let faces: [[usize; 3]; 12] = [
        // bottom (-z)
        [0, 2, 1],
        [0, 3, 2],
        // top (+z)
        [4, 5, 6],
        [4, 6, 7],
        // front (-y)
        [0, 1, 5],
        [0, 5, 4],
        // back (+y)
        [2, 3, 7],
        [2, 7, 6],
        // left (-x)
        [0, 4, 7],
        [0, 7, 3],
        // right (+x)
        [1, 2, 6],
        [1, 6, 5],
    ];
    for [a, b, c] in faces {
        m.add_triangle(v[a], v[b], v[c]);
    }
    m
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{}: got {}, expected {} (tol {})",
        what,
        actual,
        expected,
        tol
    );
}
