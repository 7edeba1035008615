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
    generate_icosphere,
    geometry::Point3,
    red_blue_difference, red_blue_intersection, red_blue_union, KernelError, Mesh,
};
use common::{assert_close, make_box};

// two unit boxes overlapping in a corner region of 0.5 x 0.7 x 0.75;
// offsets differ per axis so no faces are coplanar and no crossing hits a
// triangulation diagonal
fn box_a() -> Mesh<f64> {
    make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
}

fn box_b() -> Mesh<f64> {
    make_box(Point3::new(0.5, 0.3, 0.25), Point3::new(1.5, 1.3, 1.25))
}

const OVERLAP: f64 = 0.5 * 0.7 * 0.75;

#[test]
fn test_union_of_overlapping_boxes() {
    let mut r = box_a();
    let mut b = box_b();
    red_blue_union(&mut r, &mut b, None).expect("union failed");

    assert!(b.face_count() == 0, "blue must be drained into red");
    assert!(r.is_closed(), "union result must be closed");
    assert!(r.non_manifold_edges().is_empty());
    assert_eq!(r.euler_characteristic(), 2);
    assert_close(r.volume(), 2.0 - OVERLAP, 1e-9, "union volume");
}

#[test]
fn test_intersection_of_overlapping_boxes() {
    let mut r = box_a();
    let mut b = box_b();
    red_blue_intersection(&mut r, &mut b, None).expect("intersection failed");

    assert!(r.is_closed(), "intersection result must be closed");
    assert_eq!(r.euler_characteristic(), 2);
    assert_close(r.volume(), OVERLAP, 1e-9, "intersection volume");
}

#[test]
fn test_difference_of_overlapping_boxes() {
    let mut r = box_a();
    let mut b = box_b();
    red_blue_difference(&mut r, &mut b, None).expect("difference failed");

    assert!(r.is_closed(), "difference result must be closed");
    assert_eq!(r.euler_characteristic(), 2);
    assert_close(r.volume(), 1.0 - OVERLAP, 1e-9, "difference volume");
}

#[test]
fn test_boolean_laws_on_boxes() {
    // union(A, B) == union(B, A), same for intersection, measured by volume
    let mut r1 = box_a();
    let mut b1 = box_b();
    red_blue_union(&mut r1, &mut b1, None).unwrap();
    let mut r2 = box_b();
    let mut b2 = box_a();
    red_blue_union(&mut r2, &mut b2, None).unwrap();
    assert_close(r1.volume(), r2.volume(), 1e-9, "union commutativity");

    let mut r3 = box_a();
    let mut b3 = box_b();
    red_blue_intersection(&mut r3, &mut b3, None).unwrap();
    let mut r4 = box_b();
    let mut b4 = box_a();
    red_blue_intersection(&mut r4, &mut b4, None).unwrap();
    assert_close(r3.volume(), r4.volume(), 1e-9, "intersection commutativity");

    // difference(A, B) + intersection(A, B) recovers A by volume
    let mut r5 = box_a();
    let mut b5 = box_b();
    red_blue_difference(&mut r5, &mut b5, None).unwrap();
    assert_close(
        r5.volume() + r3.volume(),
        1.0,
        1e-9,
        "difference plus intersection",
    );
}

#[test]
fn test_disjoint_operands_are_reported() {
    let mut r = box_a();
    let mut b = make_box(Point3::new(3.0, 3.0, 3.0), Point3::new(4.0, 4.0, 4.0));
    match red_blue_union(&mut r, &mut b, None) {
        Err(e @ KernelError::Disjoint { .. }) => {
            assert!(e.r_intact());
            assert!(e.b_intact());
        }
        other => panic!("expected Disjoint, got {:?}", other.map(|_| ())),
    }
    // both operands untouched
    assert_eq!(r.face_count(), 12);
    assert_eq!(b.face_count(), 12);
    assert_close(r.volume(), 1.0, 1e-12, "red untouched");
}

#[test]
fn test_nested_sphere_in_box_is_disjoint() {
    // surfaces do not meet, so the engine reports disjoint operands and the
    // caller decides what a cavity means for its Boolean mode
    let mut r = box_a();
    let mut b = generate_icosphere(Point3::new(0.5, 0.5, 0.5), 0.3, 1);
    match red_blue_difference(&mut r, &mut b, None) {
        Err(KernelError::Disjoint { .. }) => {}
        other => panic!("expected Disjoint, got {:?}", other.map(|_| ())),
    }
    assert_eq!(r.face_count(), 12);
    assert!(b.face_count() > 0);
}

#[test]
fn test_coplanar_faces_are_a_numerical_edge_case() {
    // boxes offset along x only: four pairs of faces are exactly coplanar
    let mut r = box_a();
    let mut b = make_box(Point3::new(0.5, 0.0, 0.0), Point3::new(1.5, 1.0, 1.0));
    match red_blue_union(&mut r, &mut b, None) {
        Err(e @ KernelError::NumericalEdgeCase { .. }) => {
            assert!(e.r_intact());
            assert!(e.b_intact());
        }
        other => panic!("expected NumericalEdgeCase, got {:?}", other.map(|_| ())),
    }
    assert_eq!(r.face_count(), 12);
    assert_eq!(b.face_count(), 12);
}

#[test]
fn test_complex_edge_detection() {
    // one red edge piercing three parallel blue triangles
    let mut r: Mesh<f64> = Mesh::new();
    let a = r.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let b_ = r.add_vertex(Point3::new(3.0, 0.0, 0.0));
    let c = r.add_vertex(Point3::new(1.5, 3.0, 0.0));
    r.add_triangle(a, b_, c);

    let mut b: Mesh<f64> = Mesh::new();
    for x in [0.5, 1.5, 2.5] {
        let p = b.add_vertex(Point3::new(x, -1.0, -1.0));
        let q = b.add_vertex(Point3::new(x, 2.0, -1.0));
        let s = b.add_vertex(Point3::new(x, 0.0, 2.0));
        b.add_triangle(p, q, s);
    }

    match red_blue_union(&mut r, &mut b, None) {
        Err(e @ KernelError::ComplexEdges { .. }) => {
            assert!(e.r_intact());
            assert!(e.b_intact());
            if let KernelError::ComplexEdges { info, .. } = e {
                assert_eq!(info.len(), 1, "exactly one offending edge");
                let rec = &info[0];
                assert!(rec.red);
                assert_eq!((rec.u_id, rec.v_id), (a, b_));
                assert_eq!(rec.edge_lambdas.len(), 3);
                for w in rec.edge_lambdas.windows(2) {
                    assert!(w[0] < w[1], "lambdas must be sorted");
                }
                assert_close(rec.edge_lambdas[0], 0.5 / 3.0, 1e-9, "first lambda");
                assert_close(rec.edge_lambdas[2], 2.5 / 3.0, 1e-9, "last lambda");
            }
        }
        other => panic!("expected ComplexEdges, got {:?}", other.map(|_| ())),
    }
    assert_eq!(r.face_count(), 1);
    assert_eq!(b.face_count(), 3);
}

#[test]
fn test_coincident_spheres_are_a_numerical_edge_case() {
    // identical surfaces: every edge lies on the other operand
    let mut r = generate_icosphere(Point3::new(0.0, 0.0, 0.0), 1.0, 1);
    let mut b = generate_icosphere(Point3::new(0.0, 0.0, 0.0), 1.0, 1);
    match red_blue_intersection(&mut r, &mut b, None) {
        Err(e @ KernelError::NumericalEdgeCase { .. }) => {
            assert!(e.r_intact());
            assert!(e.b_intact());
        }
        other => panic!("expected NumericalEdgeCase, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_trivial_intersection_circle_is_reported() {
    // a vanishingly small red tetrahedron spiking through a blue triangle:
    // the intersection loop collapses to a point well below the merge
    // threshold while each crossing is still clearly transversal
    let t = 1e-7;
    let mut r: Mesh<f64> = Mesh::new();
    let p0 = r.add_vertex(Point3::new(0.0, 0.0, t));
    let p1 = r.add_vertex(Point3::new(t, 0.0, -t));
    let p2 = r.add_vertex(Point3::new(0.0, t, -t));
    let p3 = r.add_vertex(Point3::new(-t, -t, -t));
    r.add_triangle(p0, p1, p2);
    r.add_triangle(p0, p2, p3);
    r.add_triangle(p0, p3, p1);
    r.add_triangle(p1, p3, p2);

    let mut b: Mesh<f64> = Mesh::new();
    let q0 = b.add_vertex(Point3::new(-1.0, -1.0, 0.0));
    let q1 = b.add_vertex(Point3::new(1.0, -1.0, 0.0));
    let q2 = b.add_vertex(Point3::new(0.0, 1.0, 0.0));
    let big = b.add_triangle(q0, q1, q2);

    match red_blue_union(&mut r, &mut b, None) {
        Err(e @ KernelError::AffectedCircleTrivial { .. }) => {
            assert!(e.r_intact());
            assert!(e.b_intact());
            if let KernelError::AffectedCircleTrivial {
                red, face_id, split_pos, ..
            } = e
            {
                assert!(!red, "the collapsed circle sits on the blue face");
                assert_eq!(face_id, big);
                assert!(split_pos.approx_eq(&Point3::new(0.0, 0.0, 0.0), 1e-6));
            }
        }
        other => panic!("expected AffectedCircleTrivial, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_union_of_offset_spheres() {
    let mut r = generate_icosphere(Point3::new(0.0, 0.0, 0.0), 1.0, 2);
    let mut b = generate_icosphere(Point3::new(1.2, 0.0, 0.0), 1.0, 2);
    red_blue_union(&mut r, &mut b, None).expect("sphere union failed");

    assert!(r.is_closed(), "sphere union must be closed");
    assert!(r.non_manifold_edges().is_empty());
    assert_eq!(r.euler_characteristic(), 2);

    // analytic union of two unit spheres at distance 1.2, minus a few
    // percent of tessellation deficit at depth 2
    let sphere = 4.0 * std::f64::consts::PI / 3.0;
    let lens = std::f64::consts::PI * (4.0 + 1.2) * (2.0f64 - 1.2).powi(2) / 12.0;
    let expected = 2.0 * sphere - lens;
    assert_close(r.volume(), expected, 0.10 * expected, "sphere union volume");
}

#[test]
fn test_blue_handles_are_remapped() {
    let mut r = box_a();
    let mut b = box_b();
    // vertex 6 of B is its far corner (kept, outside A); vertex 0 is the
    // overlapped corner (inside A, dropped by the union)
    let far_pos = b.vertices[6].position;
    let mut handles = vec![Some(6usize), Some(0usize), None];
    red_blue_union(&mut r, &mut b, Some(&mut handles)).unwrap();

    let kept = handles[0].expect("far corner must survive the union");
    assert!(r.vertices[kept].position.approx_eq(&far_pos, 1e-12));
    assert!(handles[1].is_none(), "swallowed corner must be tombstoned");
    assert!(handles[2].is_none());
}
