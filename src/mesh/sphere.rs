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

//! Sphere seed meshes for somas and neurite terminals, plus the half-sphere
//! cap welded onto the open end of a canal surface.

use ahash::AHashMap;

use crate::{
    geometry::{point_3::Point3, vector_3::Vector3},
    mesh::core::Mesh,
    numeric::scalar::Scalar,
};

/// Icosphere around `center`: recursive midpoint subdivision of a regular
/// icosahedron, each new vertex pushed back onto the sphere. Depth `d`
/// yields `20 * 4^d` faces and `10 * 4^d + 2` vertices.
pub fn generate_icosphere<T: Scalar>(
    center: Point3<T>,
    radius: T,
    tessellation_depth: u32,
) -> Mesh<T> {
    let t = (T::one() + T::from_f64(5.0).unwrap().sqrt()) * T::half();
    let raw: [(T, T, T); 12] = [
        (-T::one(), t, T::zero()),
        (T::one(), t, T::zero()),
        (-T::one(), -t, T::zero()),
        (T::one(), -t, T::zero()),
        (T::zero(), -T::one(), t),
        (T::zero(), T::one(), t),
        (T::zero(), -T::one(), -t),
        (T::zero(), T::one(), -t),
        (t, T::zero(), -T::one()),
        (t, T::zero(), T::one()),
        (-t, T::zero(), -T::one()),
        (-t, T::zero(), T::one()),
    ];
    let faces: [[usize; 3]; 20] = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    generate_sphere(center, radius, tessellation_depth, &raw, &faces)
}

/// Octsphere around `center`: same construction seeded from a regular
/// octahedron. Depth `d` yields `8 * 4^d` faces and `4 * 4^d + 2` vertices.
pub fn generate_octsphere<T: Scalar>(
    center: Point3<T>,
    radius: T,
    tessellation_depth: u32,
) -> Mesh<T> {
    let raw: [(T, T, T); 6] = [
        (T::one(), T::zero(), T::zero()),
        (-T::one(), T::zero(), T::zero()),
        (T::zero(), T::one(), T::zero()),
        (T::zero(), -T::one(), T::zero()),
        (T::zero(), T::zero(), T::one()),
        (T::zero(), T::zero(), -T::one()),
    ];
    let faces: [[usize; 3]; 8] = [
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    generate_sphere(center, radius, tessellation_depth, &raw, &faces)
}

fn generate_sphere<T: Scalar>(
    center: Point3<T>,
    radius: T,
    depth: u32,
    seed_vertices: &[(T, T, T)],
    seed_faces: &[[usize; 3]],
) -> Mesh<T> {
    let project = |v: Vector3<T>| -> Point3<T> {
        center + v.normalized().expect("zero sphere seed vertex") * radius
    };

    let mut mesh = Mesh::new();
    let mut verts: Vec<usize> = Vec::with_capacity(seed_vertices.len());
    for &(x, y, z) in seed_vertices {
        verts.push(mesh.add_vertex(project(Vector3::new(x, y, z))));
    }

    let mut faces: Vec<[usize; 3]> = seed_faces
        .iter()
        .map(|f| [verts[f[0]], verts[f[1]], verts[f[2]]])
        .collect();

    let mut midpoint_cache: AHashMap<(usize, usize), usize> = AHashMap::new();
    for _ in 0..depth {
        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(&mut mesh, &mut midpoint_cache, a, b, &center, radius);
            let bc = midpoint(&mut mesh, &mut midpoint_cache, b, c, &center, radius);
            let ca = midpoint(&mut mesh, &mut midpoint_cache, c, a, &center, radius);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    for [a, b, c] in faces {
        mesh.add_triangle(a, b, c);
    }
    mesh
}

fn midpoint<T: Scalar>(
    mesh: &mut Mesh<T>,
    cache: &mut AHashMap<(usize, usize), usize>,
    a: usize,
    b: usize,
    center: &Point3<T>,
    radius: T,
) -> usize {
    let key = (a.min(b), a.max(b));
    if let Some(&w) = cache.get(&key) {
        return w;
    }
    let m = mesh.vertices[a].position.midpoint(&mesh.vertices[b].position);
    let p = *center
        + center
            .vector_to(&m)
            .normalized()
            .expect("midpoint collapsed onto sphere center")
            * radius;
    let w = mesh.add_vertex(p);
    cache.insert(key, w);
    w
}

/// Weld a half-sphere onto the open ring at the end of a canal surface.
///
/// `ring_handles` are the `nphisegments` existing vertices of the open
/// equator, ordered counter-clockwise when viewed from outside along
/// `-direction`; vertex `i` is assumed to sit at angle
/// `phi_offset + 2 pi i / nphisegments` in the plane basis derived from
/// `render_vector`. `closing_handle` is an existing vertex that becomes the
/// pole at `start + direction * radius`. Interior rings are spaced so the
/// angular step in theta roughly matches the step in phi.
#[allow(clippy::too_many_arguments)]
pub fn append_half_sphere_cap<T: Scalar>(
    mesh: &mut Mesh<T>,
    render_vector: Vector3<T>,
    start: Point3<T>,
    radius: T,
    direction: Vector3<T>,
    nphisegments: usize,
    phi_offset: T,
    ring_handles: &[usize],
    closing_handle: usize,
) {
    assert_eq!(
        ring_handles.len(),
        nphisegments,
        "ring handle count must equal nphisegments"
    );
    assert!(nphisegments >= 3, "a cap needs at least three segments");

    let d = direction.normalized().expect("zero cap direction");
    let u0 = {
        let rejected = render_vector - d * render_vector.dot(&d);
        rejected.normalized().unwrap_or_else(|| d.any_orthonormal())
    };
    let v0 = d.cross(&u0);

    let pi = T::from_f64(std::f64::consts::PI).unwrap();
    let two_pi = pi * T::two();
    let ntheta = (nphisegments / 4).max(1);

    // interior rings between the equator (theta = 0) and the pole
    let mut rings: Vec<Vec<usize>> = vec![ring_handles.to_vec()];
    for j in 1..=ntheta {
        let theta = pi * T::half() * T::from_usize(j).unwrap()
            / T::from_usize(ntheta + 1).unwrap();
        let (sin_t, cos_t) = (theta.sin(), theta.cos());
        let mut ring = Vec::with_capacity(nphisegments);
        for i in 0..nphisegments {
            let phi = phi_offset + two_pi * T::from_usize(i).unwrap()
                / T::from_usize(nphisegments).unwrap();
            let radial = u0 * phi.cos() + v0 * phi.sin();
            let p = start + (radial * cos_t + d * sin_t) * radius;
            ring.push(mesh.add_vertex(p));
        }
        rings.push(ring);
    }

    mesh.vertices[closing_handle].position = start + d * radius;

    for j in 0..rings.len() - 1 {
        let lower = &rings[j];
        let upper = &rings[j + 1];
        for i in 0..nphisegments {
            let i1 = (i + 1) % nphisegments;
            mesh.add_triangle(lower[i], lower[i1], upper[i]);
            mesh.add_triangle(lower[i1], upper[i1], upper[i]);
        }
    }

    let top = rings.last().unwrap();
    for i in 0..nphisegments {
        let i1 = (i + 1) % nphisegments;
        mesh.add_triangle(top[i], top[i1], closing_handle);
    }
}
