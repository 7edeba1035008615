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

//! Morphology graph of a reconstructed neuron: vertices carrying position
//! and radius, directed neurite segments between them, rooted at vertices
//! pinned to the soma sphere. Storage follows the flat tombstoned layout of
//! the surface mesh.

use smallvec::SmallVec;

use crate::{geometry::point_3::Point3, numeric::scalar::Scalar};

#[derive(Debug, Clone)]
pub struct NeuriteVertex<T: Scalar> {
    pub position: Point3<T>,
    pub radius: T,
    /// Vertex pinned to the soma surface; its position is never moved by
    /// graph conditioning.
    pub soma_root: bool,
    pub removed: bool,
}

#[derive(Debug, Clone)]
pub struct NeuriteSegment {
    pub source: usize,
    pub dest: usize,
    pub removed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CellNetwork<T: Scalar> {
    pub vertices: Vec<NeuriteVertex<T>>,
    pub segments: Vec<NeuriteSegment>,
    out_edges: Vec<SmallVec<[usize; 2]>>,
    in_edges: Vec<SmallVec<[usize; 2]>>,
}

impl<T: Scalar> CellNetwork<T> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            segments: Vec::new(),
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, position: Point3<T>, radius: T, soma_root: bool) -> usize {
        let idx = self.vertices.len();
        self.vertices.push(NeuriteVertex {
            position,
            radius,
            soma_root,
            removed: false,
        });
        self.out_edges.push(SmallVec::new());
        self.in_edges.push(SmallVec::new());
        idx
    }

    pub fn connect(&mut self, source: usize, dest: usize) -> usize {
        debug_assert!(source != dest, "self-loop segment");
        let idx = self.segments.len();
        self.segments.push(NeuriteSegment {
            source,
            dest,
            removed: false,
        });
        self.out_edges[source].push(idx);
        self.in_edges[dest].push(idx);
        idx
    }

    pub fn find(&self, seg_id: usize) -> Option<&NeuriteSegment> {
        self.segments.get(seg_id).filter(|s| !s.removed)
    }

    pub fn segment_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.removed)
            .map(|(i, _)| i)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.iter().filter(|s| !s.removed).count()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| !v.removed).count()
    }

    fn live_degree(&self, v: usize, out: bool) -> usize {
        let list = if out { &self.out_edges[v] } else { &self.in_edges[v] };
        list.iter().filter(|&&s| !self.segments[s].removed).count()
    }

    pub fn is_neurite_root_vertex(&self, v: usize) -> bool {
        self.vertices[v].soma_root
    }

    pub fn is_neurite_terminal_vertex(&self, v: usize) -> bool {
        !self.vertices[v].soma_root && self.live_degree(v, true) == 0
    }

    pub fn is_neurite_branching_vertex(&self, v: usize) -> bool {
        !self.vertices[v].soma_root && self.live_degree(v, true) >= 2
    }

    pub fn is_neurite_simple_vertex(&self, v: usize) -> bool {
        !self.vertices[v].soma_root
            && self.live_degree(v, true) == 1
            && self.live_degree(v, false) == 1
    }

    pub fn segment_length(&self, s: usize) -> T {
        let seg = &self.segments[s];
        self.vertices[seg.source]
            .position
            .distance_to(&self.vertices[seg.dest].position)
    }

    pub fn segment_max_radius(&self, s: usize) -> T {
        let seg = &self.segments[s];
        self.vertices[seg.source]
            .radius
            .max(self.vertices[seg.dest].radius)
    }

    /// Segments incident to `v`, in either direction.
    pub fn incident_segments(&self, v: usize) -> SmallVec<[usize; 4]> {
        let mut out: SmallVec<[usize; 4]> = SmallVec::new();
        for list in [&self.in_edges[v], &self.out_edges[v]] {
            for &s in list.iter() {
                if !self.segments[s].removed && !out.contains(&s) {
                    out.push(s);
                }
            }
        }
        out
    }

    /// Maximum-daughter radii at both endpoints of `s`: for each endpoint,
    /// the largest `segment_max_radius` over the *other* segments incident
    /// there, or zero when the endpoint has no other segment.
    pub fn smdv_radii(&self, s: usize) -> (T, T) {
        let seg = &self.segments[s];
        let side = |v: usize| -> T {
            self.incident_segments(v)
                .into_iter()
                .filter(|&o| o != s)
                .map(|o| self.segment_max_radius(o))
                .fold(T::zero(), |a, b| a.max(b))
        };
        (side(seg.source), side(seg.dest))
    }

    /// Split segment `s` by inserting the given interior vertices in order
    /// from source to destination. Returns the ids of the replacement
    /// segments.
    pub fn split_segment(&mut self, s: usize, interior: &[(Point3<T>, T)]) -> Vec<usize> {
        assert!(!self.segments[s].removed, "splitting a removed segment");
        if interior.is_empty() {
            return vec![s];
        }
        let source = self.segments[s].source;
        let dest = self.segments[s].dest;
        self.detach_segment(s);

        let mut chain = Vec::with_capacity(interior.len() + 2);
        chain.push(source);
        for &(p, r) in interior {
            chain.push(self.add_vertex(p, r, false));
        }
        chain.push(dest);

        chain
            .windows(2)
            .map(|w| self.connect(w[0], w[1]))
            .collect()
    }

    /// Collapse segment `s`, merging its endpoints into a single vertex at
    /// the given position and radius. Returns the surviving vertex id.
    pub fn collapse_segment(&mut self, s: usize, position: Point3<T>, radius: T) -> usize {
        assert!(!self.segments[s].removed, "collapsing a removed segment");
        let source = self.segments[s].source;
        let dest = self.segments[s].dest;
        self.detach_segment(s);

        // the source slot survives; soma pinning is sticky
        let keep = source;
        let gone = dest;
        self.vertices[keep].position = position;
        self.vertices[keep].radius = radius;
        self.vertices[keep].soma_root =
            self.vertices[keep].soma_root || self.vertices[gone].soma_root;

        let gone_out: SmallVec<[usize; 2]> = self.out_edges[gone].clone();
        let gone_in: SmallVec<[usize; 2]> = self.in_edges[gone].clone();
        for &e in gone_out.iter() {
            if self.segments[e].removed {
                continue;
            }
            self.segments[e].source = keep;
            self.out_edges[keep].push(e);
        }
        for &e in gone_in.iter() {
            if self.segments[e].removed {
                continue;
            }
            self.segments[e].dest = keep;
            self.in_edges[keep].push(e);
        }
        self.out_edges[gone].clear();
        self.in_edges[gone].clear();
        self.vertices[gone].removed = true;

        // collapsing must not leave a self-loop behind
        let incident = self.incident_segments(keep);
        for e in incident {
            if self.segments[e].source == self.segments[e].dest {
                self.detach_segment(e);
            }
        }
        keep
    }

    fn detach_segment(&mut self, s: usize) {
        let seg = self.segments[s].clone();
        self.segments[s].removed = true;
        self.out_edges[seg.source].retain(|&mut e| e != s);
        self.in_edges[seg.dest].retain(|&mut e| e != s);
    }
}
