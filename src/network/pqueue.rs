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

use ahash::AHashMap;

use crate::numeric::scalar::Scalar;

/// Indexed binary min-heap: a min-priority queue over `usize` ids that
/// supports in-place key updates, so consumers never have to rely on lazy
/// deletion and stale keys.
#[derive(Debug, Clone)]
pub struct IndexedMinHeap<T: Scalar> {
    heap: Vec<(T, usize)>,
    pos: AHashMap<usize, usize>,
}

impl<T: Scalar> IndexedMinHeap<T> {
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            pos: AHashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.pos.clear();
    }

    pub fn contains(&self, id: usize) -> bool {
        self.pos.contains_key(&id)
    }

    pub fn key_of(&self, id: usize) -> Option<T> {
        self.pos.get(&id).map(|&i| self.heap[i].0)
    }

    /// Insert `id` with `key`. Panics if `id` is already present; use
    /// `change_key` for updates.
    pub fn insert(&mut self, key: T, id: usize) {
        assert!(!self.contains(id), "id {} already queued", id);
        let i = self.heap.len();
        self.heap.push((key, id));
        self.pos.insert(id, i);
        self.sift_up(i);
    }

    /// Pop the minimum (key, id) pair.
    pub fn pop_min(&mut self) -> Option<(T, usize)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        self.fix_pos(0);
        let (key, id) = self.heap.pop().unwrap();
        self.pos.remove(&id);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((key, id))
    }

    /// Update the key of a queued id, restoring heap order. Returns false
    /// (and does nothing) when the id is not queued.
    pub fn change_key(&mut self, id: usize, new_key: T) -> bool {
        let i = match self.pos.get(&id) {
            Some(&i) => i,
            None => return false,
        };
        let old = self.heap[i].0;
        self.heap[i].0 = new_key;
        if new_key < old {
            self.sift_up(i);
        } else {
            self.sift_down(i);
        }
        true
    }

    pub fn remove(&mut self, id: usize) -> bool {
        let i = match self.pos.get(&id) {
            Some(&i) => i,
            None => return false,
        };
        let last = self.heap.len() - 1;
        self.heap.swap(i, last);
        self.fix_pos(i.min(last));
        let (_, removed) = self.heap.pop().unwrap();
        self.pos.remove(&removed);
        if i < self.heap.len() {
            self.sift_up(i);
            self.sift_down(i);
        }
        true
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[i].0 < self.heap[parent].0 {
                self.heap.swap(i, parent);
                self.fix_pos(i);
                self.fix_pos(parent);
                i = parent;
            } else {
                break;
            }
        }
        self.fix_pos(i);
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut smallest = i;
            if l < n && self.heap[l].0 < self.heap[smallest].0 {
                smallest = l;
            }
            if r < n && self.heap[r].0 < self.heap[smallest].0 {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.heap.swap(i, smallest);
            self.fix_pos(i);
            self.fix_pos(smallest);
            i = smallest;
        }
        self.fix_pos(i);
    }

    fn fix_pos(&mut self, i: usize) {
        if i < self.heap.len() {
            let id = self.heap[i].1;
            self.pos.insert(id, i);
        }
    }
}

impl<T: Scalar> Default for IndexedMinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
