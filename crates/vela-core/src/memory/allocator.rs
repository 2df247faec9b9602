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

//! An allocator front-end that layers per-tag byte accounting on top of the
//! platform allocator.

use super::tag::MemoryTag;
use crate::error::MemoryError;
use std::fmt::Write as _;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// The bytes accounted for a container's metadata (capacity, length, stride).
pub const SEQUENCE_HEADER_SIZE: u64 = 3 * std::mem::size_of::<u64>() as u64;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Live byte counters: one total plus one per [`MemoryTag`].
///
/// Counters use wrapping arithmetic. A `free` that reports more bytes than were
/// allocated under a tag wraps that counter around instead of panicking.
#[derive(Debug)]
struct MemoryStats {
    total_allocated: AtomicU64,
    tagged_allocations: [AtomicU64; MemoryTag::COUNT],
}

impl MemoryStats {
    fn new() -> Self {
        Self {
            total_allocated: AtomicU64::new(0),
            tagged_allocations: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    fn record_allocation(&self, size: u64, tag: MemoryTag) {
        self.total_allocated.fetch_add(size, Ordering::Relaxed);
        self.tagged_allocations[tag.index()].fetch_add(size, Ordering::Relaxed);
    }

    fn record_free(&self, size: u64, tag: MemoryTag) {
        self.total_allocated.fetch_sub(size, Ordering::Relaxed);
        self.tagged_allocations[tag.index()].fetch_sub(size, Ordering::Relaxed);
    }

    fn snapshot(&self) -> MemoryStatsSnapshot {
        MemoryStatsSnapshot {
            total_allocated: self.total_allocated.load(Ordering::Relaxed),
            tagged_allocations: std::array::from_fn(|i| {
                self.tagged_allocations[i].load(Ordering::Relaxed)
            }),
        }
    }
}

/// A point-in-time copy of the allocator's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStatsSnapshot {
    /// The number of bytes currently accounted across all tags.
    pub total_allocated: u64,
    /// The number of bytes currently accounted per tag, indexed by [`MemoryTag::index`].
    pub tagged_allocations: [u64; MemoryTag::COUNT],
}

impl MemoryStatsSnapshot {
    /// Returns the bytes accounted under `tag`.
    pub fn tagged(&self, tag: MemoryTag) -> u64 {
        self.tagged_allocations[tag.index()]
    }

    /// Sums the per-tag counters with wrapping arithmetic.
    ///
    /// Equals [`total_allocated`](Self::total_allocated) as long as every free
    /// matched its allocation.
    pub fn tagged_sum(&self) -> u64 {
        self.tagged_allocations
            .iter()
            .fold(0u64, |acc, bytes| acc.wrapping_add(*bytes))
    }
}

/// A zero-initialized region of memory handed out by [`TaggedAllocator::allocate`].
///
/// The block must be handed back through [`TaggedAllocator::free`] for the
/// counters to stay balanced. Dropping it directly releases the memory without
/// touching the counters.
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryBlock {
    bytes: Box<[u8]>,
}

impl MemoryBlock {
    /// Returns the size of the block in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the block holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Deref for MemoryBlock {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl DerefMut for MemoryBlock {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

/// The engine's tagged allocator.
///
/// Physical allocation is delegated to the platform allocator; this type only
/// layers accounting on top. It is an explicit context object: create one at
/// start-up and share it (typically through an `Arc`) with every consumer.
///
/// The allocator performs no bookkeeping per block. Callers of [`free`](Self::free)
/// must report the exact size and tag used at allocation time.
#[derive(Debug)]
pub struct TaggedAllocator {
    stats: MemoryStats,
}

impl TaggedAllocator {
    /// Creates an allocator with all counters at zero.
    pub fn new() -> Self {
        Self {
            stats: MemoryStats::new(),
        }
    }

    /// Allocates a zero-initialized block of `size` bytes accounted under `tag`.
    ///
    /// ## Arguments
    /// * `size` - The number of bytes to allocate.
    /// * `tag` - The accounting category. [`MemoryTag::Unknown`] is accepted but logged.
    ///
    /// ## Returns
    /// The block, or [`MemoryError::OutOfMemory`] if the platform allocator
    /// refused the request. Counters are only updated on success.
    pub fn allocate(&self, size: u64, tag: MemoryTag) -> Result<MemoryBlock, MemoryError> {
        warn_if_unknown("allocate", tag);

        let len = usize::try_from(size).map_err(|_| out_of_memory(size, tag))?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| out_of_memory(size, tag))?;
        bytes.resize(len, 0u8);

        self.stats.record_allocation(size, tag);
        Ok(MemoryBlock {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Releases `block`, removing `size` bytes from the total and from `tag`.
    ///
    /// `size` and `tag` are trusted as given. A mismatch with the original
    /// allocation silently skews the counters.
    pub fn free(&self, block: MemoryBlock, size: u64, tag: MemoryTag) {
        warn_if_unknown("free", tag);
        self.stats.record_free(size, tag);
        drop(block);
    }

    /// Reserves storage for exactly `capacity` values of `T`, accounted under `tag`.
    ///
    /// The accounted footprint is [`storage_footprint::<T>(capacity)`](storage_footprint).
    /// This is the allocation path used by the containers.
    pub fn allocate_storage<T>(&self, capacity: usize, tag: MemoryTag) -> Result<Vec<T>, MemoryError> {
        warn_if_unknown("allocate_storage", tag);

        let size = storage_footprint::<T>(capacity);
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| out_of_memory(size, tag))?;

        self.stats.record_allocation(size, tag);
        Ok(storage)
    }

    /// Releases storage obtained from [`allocate_storage`](Self::allocate_storage).
    ///
    /// `capacity` must be the capacity the storage was requested with.
    pub fn free_storage<T>(&self, storage: Vec<T>, capacity: usize, tag: MemoryTag) {
        warn_if_unknown("free_storage", tag);
        self.stats.record_free(storage_footprint::<T>(capacity), tag);
        drop(storage);
    }

    /// Takes a snapshot of every counter.
    pub fn stats(&self) -> MemoryStatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the number of bytes currently accounted across all tags.
    pub fn total_allocated(&self) -> u64 {
        self.stats.total_allocated.load(Ordering::Relaxed)
    }

    /// Returns the number of bytes currently accounted under `tag`.
    pub fn tagged_allocated(&self, tag: MemoryTag) -> u64 {
        self.stats.tagged_allocations[tag.index()].load(Ordering::Relaxed)
    }

    /// Renders the per-tag counters in human-scaled units.
    ///
    /// ```text
    /// System memory usage (tagged):
    /// UNKNOWN     : 0.00 B
    /// ARRAY       : 0.00 B
    /// SEQUENCE    : 1.50 KiB
    /// ...
    /// ```
    pub fn usage_report(&self) -> String {
        let snapshot = self.stats();
        let mut report = String::from("System memory usage (tagged):\n");
        for tag in MemoryTag::ALL {
            let (amount, unit) = format_bytes(snapshot.tagged(tag));
            // Writing into a `String` cannot fail.
            let _ = writeln!(report, "{:<12}: {amount:.2} {unit}", tag.label());
        }
        report
    }
}

impl Default for TaggedAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the bytes accounted for a container holding `capacity` values of `T`.
pub fn storage_footprint<T>(capacity: usize) -> u64 {
    let stride = std::mem::size_of::<T>() as u64;
    SEQUENCE_HEADER_SIZE.saturating_add((capacity as u64).saturating_mul(stride))
}

/// Scales a byte count to the largest binary unit it reaches.
///
/// ## Returns
/// The scaled amount and its unit: `B`, `KiB`, `MiB` or `GiB`.
pub fn format_bytes(bytes: u64) -> (f64, &'static str) {
    if bytes >= GIB {
        (bytes as f64 / GIB as f64, "GiB")
    } else if bytes >= MIB {
        (bytes as f64 / MIB as f64, "MiB")
    } else if bytes >= KIB {
        (bytes as f64 / KIB as f64, "KiB")
    } else {
        (bytes as f64, "B")
    }
}

fn warn_if_unknown(operation: &str, tag: MemoryTag) {
    if tag == MemoryTag::Unknown {
        log::warn!("{operation} called with MemoryTag::Unknown. Re-classify this allocation.");
    }
}

fn out_of_memory(size: u64, tag: MemoryTag) -> MemoryError {
    log::error!("Allocation of {size} bytes tagged {tag} failed.");
    MemoryError::OutOfMemory { size, tag }
}
