// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::color::{AlphaColor, Srgb};

/// Packs a color into premultiplied RGBA8, the form compared for batching and uniform caching.
pub(crate) fn pack_color(color: AlphaColor<Srgb>) -> u32 {
    color.premultiply().to_rgba8().to_u32()
}

/// Float components of the packed color, as uploaded to color uniforms.
///
/// Derived from the same RGBA8 value as [`pack_color`], so equal packed colors always upload
/// equal floats.
pub(crate) fn color_uniform(color: AlphaColor<Srgb>) -> [f32; 4] {
    let rgba = color.premultiply().to_rgba8();
    [rgba.r, rgba.g, rgba.b, rgba.a].map(|c| f32::from(c) / 255.0)
}
