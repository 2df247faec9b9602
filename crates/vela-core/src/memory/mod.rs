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

//! Provides the engine's tagged allocator and its accounting.
//!
//! Every subsystem that owns memory requests it through a [`TaggedAllocator`]
//! and labels the request with a [`MemoryTag`]. The allocator keeps a total
//! byte counter plus one counter per tag, which the application prints through
//! [`TaggedAllocator::usage_report`].
//!
//! The counters are only as accurate as the callers: a free must report the
//! same size and tag as its allocation.

mod allocator;
mod tag;

pub use allocator::{
    format_bytes, storage_footprint, MemoryBlock, MemoryStatsSnapshot, TaggedAllocator,
    SEQUENCE_HEADER_SIZE,
};
pub use tag::MemoryTag;

/// Sets every byte of `block` to zero.
pub fn zero_memory(block: &mut [u8]) {
    block.fill(0);
}

/// Copies as many bytes as both slices can hold from `src` into `dest`.
///
/// ## Returns
/// The number of bytes copied.
pub fn copy_memory(dest: &mut [u8], src: &[u8]) -> usize {
    let count = dest.len().min(src.len());
    dest[..count].copy_from_slice(&src[..count]);
    count
}

/// Sets every byte of `dest` to `value`.
pub fn set_memory(dest: &mut [u8], value: u8) {
    dest.fill(value);
}
