// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parley SDF is the caching and program-keying layer beneath distance-field text rendering.
//!
//! It solves two problems for a GPU text renderer:
//!
//! - Prepared glyph geometry is expensive to regenerate, so [`BlobCache`] keeps
//!   [`RenderBlob`]s alive across frames under a fixed byte budget, shedding the
//!   least recently used entries when the backing [`MemoryPool`] grows too large.
//! - Shader programs are expensive to compile and bind, so every draw is described by a
//!   [`DrawConfig`] which is reduced to a compact [`ProgramKey`]. Draws with equal keys
//!   share a [`ProgramInstance`], [`BatchChecker`] decides whether two draws can be merged
//!   into one draw call, and [`ProgramInstance::bind`] only uploads uniforms that changed.
//!
//! Shader emission, GPU calls and atlas rasterization are not part of this crate; they are
//! reached through [`UniformSink`] and plain data.
//!
//! ## Features
//!
//! - `std` (enabled by default): Get floating point functions from the standard library
//!   (likely using your target's libc).
//! - `libm`: Use floating point implementations from [libm].
//!
//! At least one of `std` and `libm` is required; `std` overrides `libm`.
//!
//! ## Example
//!
//! ```
//! use parley_sdf::{BlobCache, DrawConfig, SdfVariant, TextBlobBuilder, Transform};
//! use parley_sdf::peniko::color::palette;
//!
//! let mut builder = TextBlobBuilder::new();
//! builder.push_run(&[1, 2, 3], &[0.0, 10.0, 20.0]);
//! let text = builder.build();
//!
//! let mut cache = BlobCache::new();
//! let blob = cache.create_cached_blob(&text, 16);
//! assert!(cache.find(text.unique_id()).is_some());
//! assert_eq!(blob.borrow().glyph_count(), 3);
//!
//! let config = DrawConfig::new(SdfVariant::text(), palette::css::BLACK, Transform::IDENTITY);
//! assert_eq!(config.program_key(), config.program_key());
//! ```
//!
//! [libm]: https://crates.io/crates/libm

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("parley_sdf requires either the `std` or `libm` feature to be enabled");

extern crate alloc;

pub use peniko;

mod batch;
mod blob;
mod cache;
mod config;
mod error;
mod impl_bytemuck;
mod key;
mod pool;
mod text;
mod transform;
mod uniforms;
mod util;

#[cfg(test)]
mod tests;

pub use batch::{BatchChecker, LocalMatrixMatch};
pub use blob::{
    BlobId, BlobRun, ColorGlyphVertex, GlyphVertex, RenderBlob, SharedBlob, VERTICES_PER_GLYPH,
};
pub use cache::{BlobCache, BlobCacheConfig};
pub use config::{
    AtlasSize, ColorSource, DistanceAdjust, DrawConfig, SdfVariant, VariantFlags, VariantKind,
};
pub use error::{ConfigError, FlagsError};
pub use key::ProgramKey;
pub use pool::{MemoryPool, PoolBuffer};
pub use text::{GlyphCounts, TextBlob, TextBlobBuilder, TextRun, TextRunSource, count_glyphs};
pub use transform::{Transform, TransformClass};
pub use uniforms::{ProgramInstance, UniformHandle, UniformLayout, UniformSink};
