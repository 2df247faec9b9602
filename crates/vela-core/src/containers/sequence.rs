// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A homogeneous, contiguous, growable buffer whose storage is accounted by a
//! [`TaggedAllocator`].

use crate::error::{MemoryError, SequenceError};
use crate::memory::{MemoryTag, TaggedAllocator};
use std::ops::{Index, IndexMut};
use std::sync::Arc;

/// The capacity of a sequence created with [`Sequence::new`].
pub const DEFAULT_CAPACITY: usize = 1;

/// The factor applied to the capacity when a full sequence grows.
pub const RESIZE_FACTOR: usize = 2;

/// A growable sequence of `T` backed by storage from a [`TaggedAllocator`].
///
/// The sequence tracks its own logical capacity: it grows only when full, and
/// only by [`RESIZE_FACTOR`]. It never shrinks on removal. Every capacity change
/// is reported to the allocator as a fresh allocation of the new footprint
/// followed by a free of the old one, both under the sequence's tag.
///
/// Invariant: `len() <= capacity()`.
#[derive(Debug)]
pub struct Sequence<T> {
    items: Vec<T>,
    capacity: usize,
    tag: MemoryTag,
    allocator: Arc<TaggedAllocator>,
}

impl<T> Sequence<T> {
    /// Creates an empty sequence with [`DEFAULT_CAPACITY`].
    pub fn new(allocator: Arc<TaggedAllocator>) -> Result<Self, MemoryError> {
        Self::with_capacity(allocator, DEFAULT_CAPACITY)
    }

    /// Creates an empty sequence able to hold `capacity` elements before growing.
    pub fn with_capacity(
        allocator: Arc<TaggedAllocator>,
        capacity: usize,
    ) -> Result<Self, MemoryError> {
        Self::with_capacity_and_tag(allocator, capacity, MemoryTag::Sequence)
    }

    /// Creates an empty sequence whose storage is accounted under `tag`.
    pub fn with_capacity_and_tag(
        allocator: Arc<TaggedAllocator>,
        capacity: usize,
        tag: MemoryTag,
    ) -> Result<Self, MemoryError> {
        let items = allocator.allocate_storage(capacity, tag)?;
        Ok(Self {
            items,
            capacity,
            tag,
            allocator,
        })
    }

    /// Returns the number of elements the sequence can hold before growing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of elements in the sequence.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the size of one element in bytes.
    pub fn stride(&self) -> usize {
        std::mem::size_of::<T>()
    }

    /// Returns the tag the storage is accounted under.
    pub fn tag(&self) -> MemoryTag {
        self.tag
    }

    /// Returns the allocator the storage is accounted with.
    pub fn allocator(&self) -> &Arc<TaggedAllocator> {
        &self.allocator
    }

    /// Appends `value`, doubling the capacity first if the sequence is full.
    ///
    /// On error the sequence is left unchanged and `value` is dropped.
    pub fn push(&mut self, value: T) -> Result<(), MemoryError> {
        if self.items.len() >= self.capacity {
            self.grow()?;
        }
        self.items.push(value);
        Ok(())
    }

    /// Removes and returns the last element.
    ///
    /// Popping an empty sequence logs an error and returns `None`.
    pub fn pop(&mut self) -> Option<T> {
        let value = self.items.pop();
        if value.is_none() {
            log::error!("Sequence::pop called on an empty sequence.");
        }
        value
    }

    /// Inserts `value` at `index`, shifting every later element one slot right.
    ///
    /// Only `index < len()` is accepted: appending goes through [`push`](Self::push).
    /// An out-of-range index logs an error and leaves the sequence unchanged.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), SequenceError> {
        let length = self.items.len();
        if index >= length {
            log::error!(
                "Sequence::insert called with index out of bounds: length={length}, index={index}"
            );
            return Err(SequenceError::IndexOutOfBounds { index, length });
        }

        if length >= self.capacity {
            self.grow()?;
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting later elements left.
    ///
    /// An out-of-range index logs an error, returns `None` and leaves the
    /// sequence unchanged. The capacity is never reduced.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let length = self.items.len();
        if index >= length {
            log::error!(
                "Sequence::remove called with index out of bounds: length={length}, index={index}"
            );
            return None;
        }
        Some(self.items.remove(index))
    }

    /// Drops every element, keeping the capacity.
    pub fn clear(&mut self) {
        self.set_len(0);
    }

    /// Returns a reference to the element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns a mutable reference to the element at `index`, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Views the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Views the elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Releases the sequence's storage back to its allocator.
    ///
    /// Equivalent to dropping the sequence; provided to make ownership hand-off
    /// explicit at call sites.
    pub fn destroy(self) {
        log::trace!(
            "Destroying sequence (capacity={}, stride={}).",
            self.capacity,
            self.stride()
        );
    }

    /// Shrinks the length to `length`, dropping the elements past it.
    fn set_len(&mut self, length: usize) {
        self.items.truncate(length);
    }

    /// Replaces the storage with one of `RESIZE_FACTOR` times the capacity.
    ///
    /// The new storage is accounted before the old one is released, so the
    /// counters briefly hold both footprints, exactly like a copy-and-free.
    fn grow(&mut self) -> Result<(), MemoryError> {
        let new_capacity = if self.capacity == 0 {
            1
        } else {
            self.capacity.saturating_mul(RESIZE_FACTOR)
        };

        let mut grown = self
            .allocator
            .allocate_storage::<T>(new_capacity, self.tag)?;
        grown.append(&mut self.items);

        let old = std::mem::replace(&mut self.items, grown);
        self.allocator.free_storage(old, self.capacity, self.tag);

        log::trace!(
            "Sequence grew from {} to {new_capacity} elements.",
            self.capacity
        );
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<T> Drop for Sequence<T> {
    fn drop(&mut self) {
        let storage = std::mem::take(&mut self.items);
        self.allocator.free_storage(storage, self.capacity, self.tag);
    }
}

impl<T> Index<usize> for Sequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for Sequence<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
