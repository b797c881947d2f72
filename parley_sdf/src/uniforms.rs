// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental uniform binding for distance-field programs.
//!
//! A [`ProgramInstance`] remembers the last value it uploaded for every uniform its program
//! declares and only forwards values that changed to the [`UniformSink`].

#![allow(
    clippy::cast_precision_loss,
    reason = "Atlas dimensions are far below the range where f32 loses integer precision."
)]

use crate::config::{AtlasSize, ColorSource, DistanceAdjust, DrawConfig, SdfVariant, VariantFlags};
use crate::key::ProgramKey;
use crate::util::color_uniform;

/// Opaque location of a uniform within a compiled program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct UniformHandle(u32);

impl UniformHandle {
    /// Creates a handle from its raw location.
    pub const fn new(location: u32) -> Self {
        Self(location)
    }

    /// The raw location.
    pub const fn location(self) -> u32 {
        self.0
    }
}

/// Receives uniform uploads, typically by forwarding them to a GPU API.
pub trait UniformSink {
    /// Uploads a scalar.
    fn set_1f(&mut self, handle: UniformHandle, x: f32);
    /// Uploads a 2-component vector.
    fn set_2f(&mut self, handle: UniformHandle, x: f32, y: f32);
    /// Uploads a 3-component vector.
    fn set_3f(&mut self, handle: UniformHandle, x: f32, y: f32, z: f32);
    /// Uploads a 4-component vector.
    fn set_4fv(&mut self, handle: UniformHandle, value: &[f32; 4]);
    /// Uploads a column-major 3x3 matrix.
    fn set_matrix3f(&mut self, handle: UniformHandle, matrix: &[f32; 9]);
}

/// The uniforms a program declares. Absent uniforms are never uploaded.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct UniformLayout {
    /// Draw color, declared when the color comes from a uniform.
    pub color: Option<UniformHandle>,
    /// View matrix, declared when the view transform is not the identity.
    pub view_matrix: Option<UniformHandle>,
    /// Distance adjustment: a scalar for gamma-adjusted grayscale text, three channels for
    /// subpixel text.
    pub distance_adjust: Option<UniformHandle>,
    /// Atlas texture size, declared by path programs.
    pub atlas_size: Option<UniformHandle>,
}

impl UniformLayout {
    /// The layout of the program generated for `config`, with handles assigned in
    /// declaration order.
    ///
    /// Configurations with equal program keys always get equal layouts.
    pub fn for_config(config: &DrawConfig) -> Self {
        let mut next = 0;
        let mut declare = |declared: bool| {
            declared.then(|| {
                let handle = UniformHandle(next);
                next += 1;
                handle
            })
        };
        let distance_adjust = match config.variant() {
            SdfVariant::Text { .. } => config.flags().contains(VariantFlags::GAMMA),
            SdfVariant::Lcd { .. } => true,
            SdfVariant::Path => false,
        };
        Self {
            color: declare(config.color_source() == ColorSource::Uniform),
            view_matrix: declare(!config.view_transform().is_identity()),
            distance_adjust: declare(distance_adjust),
            atlas_size: declare(matches!(config.variant(), SdfVariant::Path)),
        }
    }
}

/// Distance adjustment as uploaded, kept as raw bits so comparisons are exact.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum AdjustValue {
    Scalar(u32),
    Channels([u32; 3]),
}

/// The values a draw binds to the uniforms its program declares.
///
/// Undeclared uniforms are `None`. Floats are kept as bits, so two draws have equal values
/// exactly when binding one after the other uploads nothing.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub(crate) struct UniformValues {
    color: Option<u32>,
    view_matrix: Option<[u32; 9]>,
    distance_adjust: Option<AdjustValue>,
    atlas_size: Option<AtlasSize>,
}

impl UniformValues {
    pub(crate) fn new(layout: &UniformLayout, config: &DrawConfig) -> Self {
        let distance_adjust = layout.distance_adjust.and_then(|_| match *config.variant() {
            SdfVariant::Text { distance_adjust } => {
                Some(AdjustValue::Scalar(distance_adjust.to_bits()))
            }
            SdfVariant::Lcd {
                distance_adjust: DistanceAdjust { r, g, b },
            } => Some(AdjustValue::Channels([r, g, b].map(f32::to_bits))),
            SdfVariant::Path => None,
        });
        Self {
            color: layout.color.map(|_| config.packed_color()),
            view_matrix: layout
                .view_matrix
                .map(|_| config.view_transform().to_cols_array().map(f32::to_bits)),
            distance_adjust,
            atlas_size: layout.atlas_size.map(|_| config.atlas_size()),
        }
    }

    /// The values `config` binds to the program it selects.
    pub(crate) fn for_config(config: &DrawConfig) -> Self {
        Self::new(&UniformLayout::for_config(config), config)
    }
}

/// A compiled program together with the uniform values last uploaded to it.
///
/// Instances are created and cached by the program cache, keyed by [`ProgramKey`].
#[derive(Clone, Debug)]
pub struct ProgramInstance {
    key: ProgramKey,
    layout: UniformLayout,
    /// Values most recently uploaded. Every field is `None` until the first upload.
    last: UniformValues,
}

impl ProgramInstance {
    /// Creates an instance for a program with the given key and uniform layout.
    pub fn new(key: ProgramKey, layout: UniformLayout) -> Self {
        Self {
            key,
            layout,
            last: UniformValues::default(),
        }
    }

    /// Creates the instance that draws `config`.
    pub fn for_config(config: &DrawConfig) -> Self {
        Self::new(config.program_key(), UniformLayout::for_config(config))
    }

    /// The program key.
    pub fn key(&self) -> ProgramKey {
        self.key
    }

    /// The uniform layout.
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Forgets every uploaded value, so the next bind uploads everything.
    pub fn invalidate(&mut self) {
        self.last = UniformValues::default();
    }

    /// Uploads the uniforms of `config` that differ from the last bound values.
    ///
    /// Returns the number of uploads issued.
    pub fn bind(&mut self, config: &DrawConfig, sink: &mut impl UniformSink) -> usize {
        debug_assert_eq!(
            config.program_key(),
            self.key,
            "bound a draw to a program generated for another key"
        );
        let values = UniformValues::new(&self.layout, config);
        let mut uploads = 0;

        if let (Some(handle), Some(size)) = (self.layout.atlas_size, values.atlas_size) {
            if self.last.atlas_size != values.atlas_size {
                log::trace!("uploading atlas size {}x{}", size.width, size.height);
                sink.set_2f(handle, size.width as f32, size.height as f32);
                uploads += 1;
            }
        }

        if let (Some(handle), Some(value)) = (self.layout.distance_adjust, values.distance_adjust)
        {
            if self.last.distance_adjust != values.distance_adjust {
                log::trace!("uploading distance adjust {value:?}");
                match value {
                    AdjustValue::Scalar(x) => sink.set_1f(handle, f32::from_bits(x)),
                    AdjustValue::Channels(channels) => {
                        let [r, g, b] = channels.map(f32::from_bits);
                        sink.set_3f(handle, r, g, b);
                    }
                }
                uploads += 1;
            }
        }

        if let (Some(handle), Some(matrix)) = (self.layout.view_matrix, values.view_matrix) {
            // Recomputed on every bind; only the resulting values are compared.
            if self.last.view_matrix != values.view_matrix {
                log::trace!("uploading view matrix");
                sink.set_matrix3f(handle, &matrix.map(f32::from_bits));
                uploads += 1;
            }
        }

        if let (Some(handle), Some(packed)) = (self.layout.color, values.color) {
            if self.last.color != values.color {
                log::trace!("uploading color {packed:#010x}");
                sink.set_4fv(handle, &color_uniform(config.color()));
                uploads += 1;
            }
        }

        self.last = values;
        uploads
    }
}
