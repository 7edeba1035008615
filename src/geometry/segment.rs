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

use crate::{
    geometry::{aabb::Aabb3, point_3::Point3},
    numeric::scalar::Scalar,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment3<T: Scalar> {
    pub a: Point3<T>,
    pub b: Point3<T>,
}

impl<T: Scalar> Segment3<T> {
    pub fn new(a: &Point3<T>, b: &Point3<T>) -> Self {
        Self { a: *a, b: *b }
    }

    pub fn length(&self) -> T {
        self.a.distance_to(&self.b)
    }

    pub fn midpoint(&self) -> Point3<T> {
        self.a.midpoint(&self.b)
    }

    /// Point at parameter `lambda` in `[0, 1]`, i.e. `a + lambda * (b - a)`.
    pub fn eval(&self, lambda: T) -> Point3<T> {
        self.a.lerp(&self.b, lambda)
    }

    pub fn inverse(&self) -> Self {
        Self::new(&self.b, &self.a)
    }

    pub fn aabb(&self) -> Aabb3<T> {
        Aabb3::from_points(&self.a, &self.b)
    }
}
