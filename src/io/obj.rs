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

//! Wavefront OBJ output, including incremental partial flushing.
//!
//! Partial flushing exists for the inductive cell meshing flow: once no
//! remaining canal mesh can overlap a region of the partial cell mesh, its
//! faces will never be touched again and can stream to disk, keeping memory
//! bounded. OBJ vertex lines carry no explicit indices, they are numbered
//! by order of appearance, so the flush bookkeeping tracks the file-local
//! line number of every vertex shared with faces still in memory.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::{geometry::point_3::Point3, mesh::core::Mesh, numeric::scalar::Scalar};

/// Write the whole mesh as OBJ: `v x y z` and 1-indexed `f i j k` lines.
pub fn write_obj<T: Scalar, P: AsRef<Path>>(mesh: &Mesh<T>, path: P) -> io::Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    let mut line_of: AHashMap<usize, usize> = AHashMap::new();
    for v in mesh.vertex_ids() {
        line_of.insert(v, line_of.len() + 1);
        write_vertex_line(&mut out, &mesh.vertices[v].position)?;
    }
    for f in mesh.face_ids() {
        let [a, b, c] = mesh.face_vertices(f);
        writeln!(out, "f {} {} {}", line_of[&a], line_of[&b], line_of[&c])?;
    }
    out.flush()
}

/// Read a mesh from an OBJ file. Supports the `v x y z` / `f i j k` subset
/// and ignores everything else.
pub fn read_obj<T: Scalar, P: AsRef<Path>>(path: P) -> io::Result<Mesh<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut mesh = Mesh::new();

    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let mut coord = || -> io::Result<T> {
                    let tok = parts
                        .next()
                        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "short v line"))?;
                    let val: f64 = tok
                        .parse()
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                    Ok(T::from_f64(val).unwrap())
                };
                let (x, y, z) = (coord()?, coord()?, coord()?);
                mesh.add_vertex(Point3::new(x, y, z));
            }
            Some("f") => {
                let mut index = || -> io::Result<usize> {
                    let tok = parts
                        .next()
                        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "short f line"))?;
                    let val: usize = tok
                        .split('/')
                        .next()
                        .unwrap()
                        .parse()
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                    Ok(val)
                };
                let (i, j, k) = (index()?, index()?, index()?);
                mesh.add_triangle(i - 1, j - 1, k - 1);
            }
            _ => {}
        }
    }
    Ok(mesh)
}

fn write_vertex_line<T: Scalar, W: Write>(out: &mut W, p: &Point3<T>) -> io::Result<()> {
    writeln!(
        out,
        "v {:.9} {:.9} {:.9}",
        p.x.to_f64().unwrap(),
        p.y.to_f64().unwrap(),
        p.z.to_f64().unwrap()
    )
}

/// Bookkeeping for a partially flushed mesh: the open file, the vertices
/// shared between flushed and pending faces together with their file-local
/// line numbers, and the running vertex line counter.
#[derive(Debug)]
pub struct MeshObjFlushInfo {
    pub filename: PathBuf,
    writer: Option<BufWriter<File>>,
    pub last_boundary_vertices: Vec<(usize, usize)>,
    pub last_flush_vertex_id: usize,
}

impl MeshObjFlushInfo {
    /// Open `<stem>.obj` for writing.
    pub fn create<P: AsRef<Path>>(stem: P) -> io::Result<Self> {
        let filename = stem.as_ref().with_extension("obj");
        let writer = BufWriter::new(File::create(&filename)?);
        Ok(Self {
            filename,
            writer: Some(writer),
            last_boundary_vertices: Vec::new(),
            last_flush_vertex_id: 0,
        })
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Flush and close the file; the struct can be dropped afterwards.
    pub fn finalize(&mut self) -> io::Result<()> {
        if let Some(mut w) = self.writer.take() {
            w.flush()?;
        }
        self.last_boundary_vertices.clear();
        self.last_flush_vertex_id = 0;
        Ok(())
    }
}

/// Append `face_list` to the flush file, then drop those faces (and any
/// vertex they orphan) from the in-memory mesh.
///
/// Vertices already written in an earlier flush are referenced by their
/// recorded line numbers and not rewritten; new vertices get the next line
/// numbers in order of appearance. Vertices still used by pending faces are
/// carried over as the next call's boundary.
pub fn partial_flush<T: Scalar>(
    mesh: &mut Mesh<T>,
    info: &mut MeshObjFlushInfo,
    face_list: &[usize],
) -> io::Result<()> {
    let writer = info
        .writer
        .as_mut()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "flush file already closed"))?;

    let mut line_of: AHashMap<usize, usize> =
        info.last_boundary_vertices.iter().copied().collect();
    let mut next_line = info.last_flush_vertex_id;

    // vertex lines first, each exactly once
    for &f in face_list {
        if mesh.faces[f].removed {
            continue;
        }
        for v in mesh.face_vertices(f) {
            if !line_of.contains_key(&v) {
                next_line += 1;
                line_of.insert(v, next_line);
                write_vertex_line(writer, &mesh.vertices[v].position)?;
            }
        }
    }
    for &f in face_list {
        if mesh.faces[f].removed {
            continue;
        }
        let [a, b, c] = mesh.face_vertices(f);
        writeln!(writer, "f {} {} {}", line_of[&a], line_of[&b], line_of[&c])?;
    }
    writer.flush()?;

    // drop the flushed faces, then the vertices nothing refers to anymore
    let mut flushed_vertices: AHashSet<usize> = AHashSet::new();
    for &f in face_list {
        if mesh.faces[f].removed {
            continue;
        }
        for v in mesh.face_vertices(f) {
            flushed_vertices.insert(v);
        }
        mesh.remove_face(f);
    }
    let mut still_used: AHashSet<usize> = AHashSet::new();
    for f in mesh.face_ids() {
        for v in mesh.face_vertices(f) {
            still_used.insert(v);
        }
    }

    let mut boundary: Vec<(usize, usize)> = Vec::new();
    for &v in flushed_vertices.iter() {
        if still_used.contains(&v) {
            boundary.push((v, line_of[&v]));
        } else {
            mesh.vertices[v].removed = true;
            mesh.vertices[v].half_edge = None;
        }
    }
    // earlier boundary vertices may still be pending even if no face was
    // flushed against them this round
    for &(v, line) in info.last_boundary_vertices.iter() {
        if still_used.contains(&v) && !flushed_vertices.contains(&v) {
            boundary.push((v, line));
        }
    }
    boundary.sort_unstable_by_key(|&(_, line)| line);

    debug!(
        flushed = face_list.len(),
        boundary = boundary.len(),
        vertex_lines = next_line,
        "partial flush"
    );
    info.last_boundary_vertices = boundary;
    info.last_flush_vertex_id = next_line;
    Ok(())
}
