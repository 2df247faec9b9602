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

//! The fixed-size payload carried by every event.

use bytemuck::{Pod, Zeroable};

/// A 128-bit payload attached to a fired event.
///
/// The bytes can be viewed as arrays of any plain numeric type that fits in 16
/// bytes. How the payload is interpreted is a convention between the code that
/// fires an event and its listeners; the bus never looks inside.
///
/// ```
/// use vela_core::EventContext;
///
/// let mut context = EventContext::new();
/// context.set_u16(0, 640);
/// context.set_u16(1, 480);
/// assert_eq!(context.u16s()[..2], [640, 480]);
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct EventContext {
    data: [u8; 16],
}

macro_rules! payload_view {
    ($ty:ty, $len:literal, $from:ident, $view:ident, $get:ident, $set:ident) => {
        #[doc = concat!("Builds a payload from ", stringify!($len), " `", stringify!($ty), "` values.")]
        pub fn $from(values: [$ty; $len]) -> Self {
            Self {
                data: bytemuck::cast(values),
            }
        }

        #[doc = concat!("Views the payload as ", stringify!($len), " `", stringify!($ty), "` values.")]
        pub fn $view(&self) -> [$ty; $len] {
            bytemuck::cast(self.data)
        }

        #[doc = concat!("Reads the `", stringify!($ty), "` at `index`. Panics if `index >= ", stringify!($len), "`.")]
        pub fn $get(&self, index: usize) -> $ty {
            self.$view()[index]
        }

        #[doc = concat!("Writes the `", stringify!($ty), "` at `index`. Panics if `index >= ", stringify!($len), "`.")]
        pub fn $set(&mut self, index: usize, value: $ty) {
            let mut values = self.$view();
            values[index] = value;
            self.data = bytemuck::cast(values);
        }
    };
}

impl EventContext {
    /// Creates an all-zero payload.
    pub const fn new() -> Self {
        Self { data: [0; 16] }
    }

    /// Builds a payload from raw bytes.
    pub const fn from_bytes(data: [u8; 16]) -> Self {
        Self { data }
    }

    /// Returns the raw bytes.
    pub const fn bytes(&self) -> &[u8; 16] {
        &self.data
    }

    payload_view!(u8, 16, from_u8s, u8s, u8, set_u8);
    payload_view!(i8, 16, from_i8s, i8s, i8, set_i8);
    payload_view!(u16, 8, from_u16s, u16s, u16, set_u16);
    payload_view!(i16, 8, from_i16s, i16s, i16, set_i16);
    payload_view!(u32, 4, from_u32s, u32s, u32, set_u32);
    payload_view!(i32, 4, from_i32s, i32s, i32, set_i32);
    payload_view!(f32, 4, from_f32s, f32s, f32, set_f32);
    payload_view!(u64, 2, from_u64s, u64s, u64, set_u64);
    payload_view!(i64, 2, from_i64s, i64s, i64, set_i64);
    payload_view!(f64, 2, from_f64s, f64s, f64, set_f64);
}
