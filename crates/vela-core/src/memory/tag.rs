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

//! Allocation categories used for accounting.

use std::fmt;

/// The category an allocation is accounted under.
///
/// Tags exist purely for bookkeeping: the allocator never uses them to route or
/// type-check a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemoryTag {
    /// Unclassified memory. Allowed, but logs a warning.
    Unknown,
    /// Fixed-size arrays.
    Array,
    /// Growable sequences.
    Sequence,
    /// Key/value dictionaries.
    Dictionary,
    /// Ring queues.
    RingQueue,
    /// Search trees.
    Tree,
    /// Strings.
    String,
    /// Application-level state.
    Application,
    /// Job system storage.
    Job,
    /// Texture data.
    Texture,
    /// Material instances.
    Material,
    /// Renderer state.
    Renderer,
    /// Game-side state.
    Game,
    /// Transforms.
    Transform,
    /// Entities.
    Entity,
    /// Entity hierarchy nodes.
    EntityNode,
    /// Scenes.
    Scene,
}

impl MemoryTag {
    /// The number of tags, i.e. the number of per-tag counters.
    pub const COUNT: usize = 17;

    /// Every tag, in counter order.
    pub const ALL: [MemoryTag; Self::COUNT] = [
        MemoryTag::Unknown,
        MemoryTag::Array,
        MemoryTag::Sequence,
        MemoryTag::Dictionary,
        MemoryTag::RingQueue,
        MemoryTag::Tree,
        MemoryTag::String,
        MemoryTag::Application,
        MemoryTag::Job,
        MemoryTag::Texture,
        MemoryTag::Material,
        MemoryTag::Renderer,
        MemoryTag::Game,
        MemoryTag::Transform,
        MemoryTag::Entity,
        MemoryTag::EntityNode,
        MemoryTag::Scene,
    ];

    /// Returns the index of this tag's counter.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the label printed in usage reports.
    pub const fn label(self) -> &'static str {
        match self {
            MemoryTag::Unknown => "UNKNOWN",
            MemoryTag::Array => "ARRAY",
            MemoryTag::Sequence => "SEQUENCE",
            MemoryTag::Dictionary => "DICT",
            MemoryTag::RingQueue => "RING_QUEUE",
            MemoryTag::Tree => "TREE",
            MemoryTag::String => "STRING",
            MemoryTag::Application => "APPLICATION",
            MemoryTag::Job => "JOB",
            MemoryTag::Texture => "TEXTURE",
            MemoryTag::Material => "MAT_INST",
            MemoryTag::Renderer => "RENDERER",
            MemoryTag::Game => "GAME",
            MemoryTag::Transform => "TRANSFORM",
            MemoryTag::Entity => "ENTITY",
            MemoryTag::EntityNode => "ENTITY_NODE",
            MemoryTag::Scene => "SCENE",
        }
    }
}

impl fmt::Display for MemoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
