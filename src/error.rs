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

use thiserror::Error;

use crate::{geometry::point_3::Point3, numeric::scalar::Scalar};

/// Record of one crossing edge: which operand mesh it belongs to, the
/// directed endpoints used for parametrization, and the sorted intersection
/// parameters, i.e. intersection points are `u + lambda_k (v - u)`.
///
/// Bundled as evidence whenever an edge carries more crossings than a
/// manifold Boolean permits.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeIsecInfo<T: Scalar> {
    pub red: bool,
    pub u_id: usize,
    pub v_id: usize,
    pub edge_lambdas: Vec<T>,
}

impl<T: Scalar> EdgeIsecInfo<T> {
    pub fn new(red: bool, u_id: usize, v_id: usize, edge_lambdas: Vec<T>) -> Self {
        assert!(
            !edge_lambdas.is_empty(),
            "EdgeIsecInfo without lambda values"
        );
        Self {
            red,
            u_id,
            v_id,
            edge_lambdas,
        }
    }
}

/// Failure surface of the geometric kernel.
///
/// Every variant carries the two intactness flags: `r_intact` / `b_intact`
/// report whether the red / blue operand is still un-mutated, so a caller
/// can decide to perturb the inputs and retry.
#[derive(Debug, Clone, Error)]
pub enum KernelError<T: Scalar> {
    /// No intersection was detected. Whether that is success (union) or an
    /// input error (intersection) is the caller's call.
    #[error("operand meshes are disjoint: {msg}")]
    Disjoint { msg: String },

    /// One or more edges cross the other mesh more often than a manifold
    /// configuration allows.
    #[error("complex edges detected: {msg}")]
    ComplexEdges {
        msg: String,
        info: Vec<EdgeIsecInfo<T>>,
    },

    /// The intersection curve could not be resolved: open polyline,
    /// co-planar faces, vanishing lambda interval.
    #[error("numerical edge case: {msg}")]
    NumericalEdgeCase {
        msg: String,
        r_intact: bool,
        b_intact: bool,
    },

    /// Constrained retriangulation of a crossed face failed mid-edit.
    #[error("retriangulation failed: {msg}")]
    Triangulation {
        msg: String,
        r_intact: bool,
        b_intact: bool,
    },

    /// The sub-triangle count of a retriangulated face does not match the
    /// count implied by its intersection polyline.
    #[error("intersection polygon count mismatch: {msg}")]
    NumIsecPoly { msg: String },

    /// An intersection loop collapsed to a point on the given face. The
    /// caller may perturb around `split_pos` and retry.
    #[error("trivial intersection circle (red operand: {red}) on face {face_id}: {msg}")]
    AffectedCircleTrivial {
        msg: String,
        red: bool,
        face_id: usize,
        split_pos: Point3<T>,
    },

    /// A sanity assertion failed. Fatal; both operands are suspect.
    #[error("internal logic error: {msg}")]
    InternalLogic { msg: String },
}

impl<T: Scalar> KernelError<T> {
    /// Is the red operand guaranteed un-mutated?
    pub fn r_intact(&self) -> bool {
        match self {
            KernelError::Disjoint { .. }
            | KernelError::ComplexEdges { .. }
            | KernelError::NumIsecPoly { .. }
            | KernelError::AffectedCircleTrivial { .. } => true,
            KernelError::NumericalEdgeCase { r_intact, .. }
            | KernelError::Triangulation { r_intact, .. } => *r_intact,
            KernelError::InternalLogic { .. } => false,
        }
    }

    /// Is the blue operand guaranteed un-mutated?
    pub fn b_intact(&self) -> bool {
        match self {
            KernelError::Disjoint { .. }
            | KernelError::ComplexEdges { .. }
            | KernelError::NumIsecPoly { .. }
            | KernelError::AffectedCircleTrivial { .. } => true,
            KernelError::NumericalEdgeCase { b_intact, .. }
            | KernelError::Triangulation { b_intact, .. } => *b_intact,
            KernelError::InternalLogic { .. } => false,
        }
    }
}
