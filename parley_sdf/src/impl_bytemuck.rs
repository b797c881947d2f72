// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `bytemuck` trait impls for vertex types.

#![allow(
    unsafe_code,
    reason = "The `bytemuck` marker traits are `unsafe` and require `unsafe impl`."
)]

use crate::blob::{ColorGlyphVertex, GlyphVertex};
use bytemuck::{Pod, Zeroable};

// Safety: `repr(C)`, all fields are plain numbers and the all-zero pattern is valid.
unsafe impl Zeroable for GlyphVertex {}

// Safety: `repr(C)` with an `[f32; 2]` followed by a `[u16; 2]`, which leaves no padding.
unsafe impl Pod for GlyphVertex {}

// Safety: `repr(C)`, all fields are plain numbers and the all-zero pattern is valid.
unsafe impl Zeroable for ColorGlyphVertex {}

// Safety: `repr(C)` with an `[f32; 2]`, a `u32` and a `[u16; 2]`, which leaves no padding.
unsafe impl Pod for ColorGlyphVertex {}
