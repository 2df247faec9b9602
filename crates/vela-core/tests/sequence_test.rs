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

use std::sync::Arc;
use vela_core::memory::storage_footprint;
use vela_core::{MemoryTag, Sequence, SequenceError, TaggedAllocator};

fn allocator() -> Arc<TaggedAllocator> {
    Arc::new(TaggedAllocator::new())
}

#[test]
fn test_growth_by_doubling() {
    // --- 1. ARRANGE ---
    let allocator = allocator();
    let mut values = Sequence::<i32>::with_capacity(Arc::clone(&allocator), 1)
        .expect("Sequence should be created");

    // --- 2. ACT ---
    for value in [10, 20, 30, 40, 50] {
        values.push(value).expect("Push should succeed");
    }

    // --- 3. ASSERT ---
    assert_eq!(values.len(), 5);
    assert_eq!(values.capacity(), 8, "Capacity should go 1 -> 2 -> 4 -> 8");
    assert_eq!(values.stride(), 4);
    assert_eq!(
        allocator.tagged_allocated(MemoryTag::Sequence),
        storage_footprint::<i32>(8),
        "Only the current storage should be accounted"
    );

    assert_eq!(values.pop(), Some(50));
    assert_eq!(values.len(), 4);
    assert_eq!(values.as_slice(), &[10, 20, 30, 40]);
}

#[test]
fn test_growth_doubles_from_any_capacity() {
    let allocator = allocator();
    let mut values = Sequence::with_capacity(Arc::clone(&allocator), 3)
        .expect("Sequence should be created");

    let mut capacities = vec![values.capacity()];
    for value in 0..12u16 {
        values.push(value).expect("Push should succeed");
        if capacities.last() != Some(&values.capacity()) {
            capacities.push(values.capacity());
        }
    }

    assert_eq!(capacities, vec![3, 6, 12]);
    assert_eq!(values.len(), 12);
    assert_eq!(
        allocator.tagged_allocated(MemoryTag::Sequence),
        storage_footprint::<u16>(12)
    );
}

#[test]
fn test_push_then_pop_restores_contents() {
    let mut values = Sequence::with_capacity(allocator(), 4).expect("Sequence should be created");
    for value in ["a", "b", "c"] {
        values.push(value).expect("Push should succeed");
    }
    let before: Vec<_> = values.iter().copied().collect();

    values.push("d").expect("Push should succeed");
    assert_eq!(values.pop(), Some("d"));

    assert_eq!(values.as_slice(), before.as_slice());
    assert_eq!(values.capacity(), 4);
}

#[test]
fn test_insert_then_remove_is_identity() {
    let mut values = Sequence::with_capacity(allocator(), 2).expect("Sequence should be created");
    for value in [1u64, 2, 3] {
        values.push(value).expect("Push should succeed");
    }

    values.insert(1, 99).expect("Insert should succeed");
    assert_eq!(values.as_slice(), &[1, 99, 2, 3]);

    assert_eq!(values.remove(1), Some(99));
    assert_eq!(values.as_slice(), &[1, 2, 3]);
    assert_eq!(values.capacity(), 4, "Removal never shrinks");
}

#[test]
fn test_insert_at_length_is_rejected() {
    let mut values = Sequence::new(allocator()).expect("Sequence should be created");
    values.push('x').expect("Push should succeed");

    let err = values.insert(1, 'y').unwrap_err();
    assert_eq!(
        err,
        SequenceError::IndexOutOfBounds {
            index: 1,
            length: 1
        }
    );
    assert_eq!(values.as_slice(), &['x']);
}

#[test]
fn test_zero_capacity_grows_to_one() {
    let allocator = allocator();
    let mut values = Sequence::with_capacity(Arc::clone(&allocator), 0)
        .expect("Sequence should be created");
    assert_eq!(values.capacity(), 0);

    values.push(7u8).expect("Push should succeed");
    assert_eq!(values.capacity(), 1);
    assert_eq!(values[0], 7);
}

#[test]
fn test_custom_tag_is_released_on_drop() {
    let allocator = allocator();
    {
        let mut entities =
            Sequence::with_capacity_and_tag(Arc::clone(&allocator), 3, MemoryTag::Entity)
                .expect("Sequence should be created");
        entities.push([0u32; 4]).expect("Push should succeed");
        assert_eq!(
            allocator.tagged_allocated(MemoryTag::Entity),
            storage_footprint::<[u32; 4]>(3)
        );
        assert_eq!(allocator.tagged_allocated(MemoryTag::Sequence), 0);
    }
    assert_eq!(allocator.tagged_allocated(MemoryTag::Entity), 0);
    assert_eq!(allocator.total_allocated(), 0);
}

#[test]
fn test_empty_operations_leave_sequence_untouched() {
    let mut values: Sequence<i16> = Sequence::new(allocator()).expect("Sequence should be created");
    assert_eq!(values.pop(), None);
    assert_eq!(values.remove(0), None);
    assert!(values.is_empty());
    assert_eq!(values.capacity(), 1);
}
