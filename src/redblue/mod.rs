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

pub mod combine;
pub mod intersect;
pub mod triangulate;

pub use combine::{red_blue_algorithm, red_blue_difference, red_blue_intersection, red_blue_union};
pub use intersect::{compute_intersection, flood_classify, FaceClass};

use crate::geometry::octree::{DEFAULT_MAX_COMPONENTS, DEFAULT_MAX_RECURSION_DEPTH};

/// Tunables of the red-blue pipeline.
#[derive(Debug, Clone)]
pub struct RedBlueOpts {
    /// Broadphase leaf threshold.
    pub max_components: usize,
    /// Broadphase recursion cap.
    pub max_recursion_depth: u32,
    /// Crossings permitted per edge before it counts as complex. Two is the
    /// manifold limit for non-self-intersecting operands.
    pub max_edge_crossings: usize,
}

impl Default for RedBlueOpts {
    fn default() -> Self {
        Self {
            max_components: DEFAULT_MAX_COMPONENTS,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_edge_crossings: 2,
        }
    }
}
