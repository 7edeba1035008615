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

use std::fs;

use arbormesh::{
    generate_icosphere,
    geometry::Point3,
    io::{partial_flush, read_obj, write_obj, MeshObjFlushInfo},
};
use common::{assert_close, make_box};

fn temp_path(name: &str) -> std::path::PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("arbormesh_test_{}_{}", std::process::id(), name));
    p
}

#[test]
fn test_write_read_roundtrip() {
    let m = make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
    let path = temp_path("roundtrip.obj");
    write_obj(&m, &path).expect("write failed");

    let back = read_obj::<f64, _>(&path).expect("read failed");
    assert_eq!(back.vertex_count(), m.vertex_count());
    assert_eq!(back.face_count(), m.face_count());
    assert!(back.is_closed());
    assert_close(back.volume(), 6.0, 1e-6, "round-tripped volume");

    fs::remove_file(&path).ok();
}

#[test]
fn test_obj_precision() {
    let mut m = arbormesh::Mesh::<f64>::new();
    let a = m.add_vertex(Point3::new(0.123456789, -1.0, 0.0));
    let b = m.add_vertex(Point3::new(1.0, 0.987654321, 0.0));
    let c = m.add_vertex(Point3::new(0.0, 0.0, 2.5));
    m.add_triangle(a, b, c);
    let path = temp_path("precision.obj");
    write_obj(&m, &path).expect("write failed");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("0.123456789"), "vertex precision lost: {}", text);
    assert!(text.contains("0.987654321"));
    assert!(text.ends_with('\n'));
    assert!(text.contains("f 1 2 3"));

    fs::remove_file(&path).ok();
}

#[test]
fn test_partial_flush_streams_whole_mesh() {
    let original = generate_icosphere(Point3::new(0.0, 0.0, 0.0), 1.0, 2);
    let total_faces = original.face_count();
    let total_vertices = original.vertex_count();
    let volume = original.volume();

    let mut m = original.clone();
    let stem = temp_path("flush_stream");
    let mut info = MeshObjFlushInfo::create(&stem).expect("open failed");

    // flush 100 faces, then the rest
    let first_batch: Vec<usize> = m.face_ids().take(100).collect();
    partial_flush(&mut m, &mut info, &first_batch).expect("first flush failed");
    assert_eq!(m.face_count(), total_faces - 100);
    assert!(info.last_flush_vertex_id > 0);
    assert!(
        !info.last_boundary_vertices.is_empty(),
        "the flushed patch must share a boundary with the remainder"
    );

    let second_batch: Vec<usize> = m.face_ids().collect();
    partial_flush(&mut m, &mut info, &second_batch).expect("second flush failed");
    assert_eq!(m.face_count(), 0);
    assert_eq!(
        info.last_flush_vertex_id, total_vertices,
        "every vertex is written exactly once across all flushes"
    );
    info.finalize().expect("finalize failed");

    // the concatenated flushes reproduce the original surface
    let back = read_obj::<f64, _>(&info.filename).expect("reload failed");
    assert_eq!(back.face_count(), total_faces);
    assert_eq!(back.vertex_count(), total_vertices);
    assert!(back.is_closed());
    assert_close(back.volume(), volume, 1e-9, "streamed volume");

    fs::remove_file(&info.filename).ok();
}

#[test]
fn test_partial_flush_removes_orphaned_vertices() {
    let mut m = generate_icosphere(Point3::new(0.0, 0.0, 0.0), 1.0, 1);
    let vertices_before = m.vertex_count();

    let stem = temp_path("flush_orphans");
    let mut info = MeshObjFlushInfo::create(&stem).expect("open failed");

    let batch: Vec<usize> = m.face_ids().take(30).collect();
    partial_flush(&mut m, &mut info, &batch).expect("flush failed");

    // interior vertices of the flushed patch are gone, boundary ones remain
    let remaining = m.vertex_count();
    assert!(remaining < vertices_before);
    for &(v, _) in info.last_boundary_vertices.iter() {
        assert!(!m.vertices[v].removed, "boundary vertex {} must survive", v);
    }

    info.finalize().expect("finalize failed");
    fs::remove_file(&info.filename).ok();
}
