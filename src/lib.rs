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

//! Geometric kernel for generating triangular surface meshes of
//! reconstructed neuron morphologies.
//!
//! A neuron arrives as a graph of neurite segments (truncated cones with a
//! radius per endpoint) rooted at a soma sphere. Each segment is swept to a
//! canal surface, capped with half-spheres, and the per-segment meshes are
//! merged into one consistent surface by the red-blue Boolean engine in
//! [`redblue`]. The [`network`] module conditions the morphology graph
//! beforehand so the sweeps and merges are well-posed, and [`io`] streams
//! finished mesh regions to disk.

#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod network;
pub mod numeric;
pub mod redblue;

pub use error::{EdgeIsecInfo, KernelError};
pub use geometry::octree::{candidate_edge_face_pairs, EdgeFacePair};
pub use mesh::{append_half_sphere_cap, generate_icosphere, generate_octsphere, Mesh};
pub use network::{precondition_cell_network, CellNetwork};
pub use redblue::{
    red_blue_difference, red_blue_intersection, red_blue_union, RedBlueOpts,
};
