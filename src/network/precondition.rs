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

//! Length/radius conditioning of the morphology graph before meshing:
//! overlong segments are split so canal sweeps stay well-proportioned, then
//! undersized segments are greedily collapsed to a fixed point so no sweep
//! degenerates into its own end caps.

use tracing::{debug, trace};

use crate::{
    error::KernelError,
    geometry::point_3::Point3,
    network::{cell::CellNetwork, pqueue::IndexedMinHeap},
    numeric::scalar::Scalar,
};

/// Condition the cell network with thresholds `alpha > beta > 1` and
/// `gamma >= alpha`.
///
/// Phase 1 splits every segment longer than `gamma` times its maximum
/// radius into the equal-parameter subdivision minimizing the quadratic
/// length-to-radius penalty. Phase 2 collapses segments whose weight
/// `min(len - alpha * rmax, len - beta * (smdv_src + smdv_dst))` is
/// non-positive, smallest length first, until a full pass changes nothing.
pub fn precondition_cell_network<T: Scalar>(
    network: &mut CellNetwork<T>,
    alpha: T,
    beta: T,
    gamma: T,
) -> Result<(), KernelError<T>> {
    debug!(%alpha, %beta, %gamma, "preconditioning cell network");
    split_long_segments(network, gamma);
    collapse_to_fixed_point(network, alpha, beta)
}

/// Phase 1: split every overlong segment at the penalty-minimizing count.
pub fn split_long_segments<T: Scalar>(network: &mut CellNetwork<T>, gamma: T) {
    let long_segments: Vec<usize> = network
        .segment_ids()
        .filter(|&s| network.segment_length(s) > gamma * network.segment_max_radius(s))
        .collect();
    debug!(count = long_segments.len(), "splitting overlong segments");

    for s in long_segments {
        let seg = network.segments[s].clone();
        let p_u = network.vertices[seg.source].position;
        let p_v = network.vertices[seg.dest].position;
        let r_u = network.vertices[seg.source].radius;
        let r_v = network.vertices[seg.dest].radius;
        let len = network.segment_length(s);
        let rmax = r_u.max(r_v);

        // upper bound: the smallest piece count whose lengths fall below rmax
        let nmax = (len / rmax).ceil().to_usize().unwrap_or(2).max(2);

        let mut best_n = 0usize;
        let mut best_penalty = T::infinity();
        let mut best_chain: Vec<(Point3<T>, T)> = Vec::new();
        for k in 2..=nmax {
            let chain = subdivided_chain(&p_u, &p_v, r_u, r_v, k);
            let penalty = chain_penalty(&chain, gamma);
            if penalty < best_penalty {
                best_n = k;
                best_penalty = penalty;
                best_chain = chain;
            }
        }
        trace!(segment = s, n = best_n, "chosen subdivision");

        // interior vertices only: drop the endpoints of the chain
        let interior = &best_chain[1..best_chain.len() - 1];
        network.split_segment(s, interior);
    }
}

/// Vertex chain of the k-fold equal-parameter subdivision, radii linearly
/// interpolated, endpoints included.
fn subdivided_chain<T: Scalar>(
    p_u: &Point3<T>,
    p_v: &Point3<T>,
    r_u: T,
    r_v: T,
    k: usize,
) -> Vec<(Point3<T>, T)> {
    let mut chain = Vec::with_capacity(k + 1);
    chain.push((*p_u, r_u));
    for m in 1..k {
        let ratio = T::from_usize(m).unwrap() / T::from_usize(k).unwrap();
        chain.push((p_u.lerp(p_v, ratio), r_u + (r_v - r_u) * ratio));
    }
    chain.push((*p_v, r_v));
    chain
}

/// Sum over sub-segments of `(len_i - gamma * rmax_i)^2`.
fn chain_penalty<T: Scalar>(chain: &[(Point3<T>, T)], gamma: T) -> T {
    let mut total = T::zero();
    for w in chain.windows(2) {
        let len = w[0].0.distance_to(&w[1].0);
        let rmax = w[0].1.max(w[1].1);
        let p = len - gamma * rmax;
        total = total + p * p;
    }
    total
}

/// Collapse weight of a segment; non-positive means collapsible.
pub fn segment_weight<T: Scalar>(network: &CellNetwork<T>, s: usize, alpha: T, beta: T) -> T {
    let len = network.segment_length(s);
    let (smdv_src, smdv_dst) = network.smdv_radii(s);
    (len - alpha * network.segment_max_radius(s)).min(len - beta * (smdv_src + smdv_dst))
}

/// What phase 2 decided for one popped segment.
enum CollapseAction<T: Scalar> {
    Skip,
    Into { position: Point3<T>, radius: T },
}

fn collapse_action<T: Scalar>(
    network: &CellNetwork<T>,
    u: usize,
    v: usize,
) -> Result<CollapseAction<T>, KernelError<T>> {
    let vert = |w: usize| (network.vertices[w].position, network.vertices[w].radius);
    let midpoint = || {
        let (p_u, r_u) = vert(u);
        let (p_v, r_v) = vert(v);
        CollapseAction::Into {
            position: p_u.midpoint(&p_v),
            radius: (r_u + r_v) * T::half(),
        }
    };
    let into = |w: usize| {
        let (position, radius) = vert(w);
        CollapseAction::Into { position, radius }
    };

    if network.is_neurite_root_vertex(u) {
        // root vertices stay pinned to the soma; a neurite must not end or
        // branch immediately on the soma surface
        if network.is_neurite_terminal_vertex(v) || network.is_neurite_branching_vertex(v) {
            Ok(CollapseAction::Skip)
        } else if network.is_neurite_simple_vertex(v) {
            Ok(into(u))
        } else {
            Err(logic_fault(u, v))
        }
    } else if network.is_neurite_branching_vertex(u) {
        if network.is_neurite_terminal_vertex(v) {
            Ok(CollapseAction::Skip)
        } else if network.is_neurite_branching_vertex(v) {
            Ok(midpoint())
        } else if network.is_neurite_simple_vertex(v) {
            Ok(into(u))
        } else {
            Err(logic_fault(u, v))
        }
    } else if network.is_neurite_simple_vertex(u) {
        if network.is_neurite_terminal_vertex(v) || network.is_neurite_branching_vertex(v) {
            Ok(into(v))
        } else if network.is_neurite_simple_vertex(v) {
            Ok(midpoint())
        } else {
            Err(logic_fault(u, v))
        }
    } else {
        Err(logic_fault(u, v))
    }
}

fn logic_fault<T: Scalar>(u: usize, v: usize) -> KernelError<T> {
    KernelError::InternalLogic {
        msg: format!(
            "impossible endpoint role combination for segment ({}, {})",
            u, v
        ),
    }
}

/// Phase 2: greedy collapse until a full queue pass changes nothing.
pub fn collapse_to_fixed_point<T: Scalar>(
    network: &mut CellNetwork<T>,
    alpha: T,
    beta: T,
) -> Result<(), KernelError<T>> {
    let mut queue: IndexedMinHeap<T> = IndexedMinHeap::new();
    let mut fixed_point = false;
    let mut rounds = 0usize;

    while !fixed_point {
        fixed_point = true;
        rounds += 1;
        queue.clear();
        for s in network.segment_ids().collect::<Vec<_>>() {
            queue.insert(network.segment_length(s), s);
        }
        debug!(round = rounds, queued = queue.len(), "collapse pass");

        while let Some((key, s)) = queue.pop_min() {
            if network.find(s).is_none() {
                continue;
            }
            let len = network.segment_length(s);
            if (len - key).abs() > T::lazy_key_tolerance() {
                return Err(KernelError::InternalLogic {
                    msg: format!(
                        "segment {} dequeued with key {} but has length {}; keys must be updated on every mutation",
                        s, key, len
                    ),
                });
            }

            if segment_weight(network, s, alpha, beta) > T::zero() {
                continue;
            }
            let u = network.segments[s].source;
            let v = network.segments[s].dest;

            let action = collapse_action(network, u, v)?;
            let (position, radius) = match action {
                CollapseAction::Skip => {
                    trace!(segment = s, "collapse skipped by endpoint roles");
                    continue;
                }
                CollapseAction::Into { position, radius } => (position, radius),
            };

            let survivor = network.collapse_segment(s, position, radius);
            fixed_point = false;
            trace!(segment = s, survivor, "collapsed");

            // neighbors of the surviving vertex changed length; re-key them
            // or (re-)insert the ones that became collapsible
            for f in network.incident_segments(survivor) {
                let f_len = network.segment_length(f);
                let f_weight = segment_weight(network, f, alpha, beta);
                if !queue.change_key(f, f_len) && f_weight <= T::zero() {
                    queue.insert(f_len, f);
                }
            }
        }
    }
    debug!(
        rounds,
        segments = network.segment_count(),
        "fixed point reached"
    );
    Ok(())
}
