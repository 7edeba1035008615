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

use std::fmt::{Debug, Display};

use num_traits::{Float, FromPrimitive, ToPrimitive};

/// Scalar type the whole kernel is generic over.
///
/// All geometric tolerances go through the named thresholds below rather than
/// ad-hoc literals, so that `f32` and `f64` instantiations stay consistent
/// with each other.
pub trait Scalar:
    Float + FromPrimitive + ToPrimitive + Debug + Display + Default + Send + Sync + 'static
{
    /// General ε-band used by the geometric predicates, relative to unit
    /// input scale.
    fn eps() -> Self;

    fn eps_squared() -> Self {
        Self::eps() * Self::eps()
    }

    /// Two points closer than this are the same point; used when welding
    /// intersection vertices and when detecting trivial loops.
    fn point_merge_threshold() -> Self;

    /// Maximum drift permitted between a priority-queue key and the value it
    /// was enqueued for before the mismatch is treated as a logic fault.
    fn lazy_key_tolerance() -> Self;

    fn half() -> Self {
        Self::from_f64(0.5).unwrap()
    }

    fn two() -> Self {
        Self::from_f64(2.0).unwrap()
    }

    fn approx_eq(self, other: Self) -> bool {
        (self - other).abs() <= Self::eps()
    }
}

impl Scalar for f64 {
    fn eps() -> Self {
        1e-9
    }

    fn point_merge_threshold() -> Self {
        1e-6
    }

    fn lazy_key_tolerance() -> Self {
        1e-5
    }
}

impl Scalar for f32 {
    fn eps() -> Self {
        1e-5
    }

    fn point_merge_threshold() -> Self {
        1e-4
    }

    fn lazy_key_tolerance() -> Self {
        1e-3
    }
}
