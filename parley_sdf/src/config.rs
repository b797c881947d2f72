// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-draw configuration of distance-field text draws.

use core::fmt;
use core::mem::size_of;
use core::ops::{BitAnd, BitOr, BitOrAssign, Not};

use peniko::color::{AlphaColor, Srgb};

use crate::blob::{ColorGlyphVertex, GlyphVertex};
use crate::error::FlagsError;
use crate::key::ProgramKey;
use crate::transform::Transform;
use crate::util::pack_color;

/// Boolean switches that select shader behavior within a variant.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct VariantFlags(u8);

impl VariantFlags {
    /// The view transform is a similarity (uniform scale, rotation, translation), so the
    /// distance-field gradient can be corrected with a single scale factor.
    pub const SIMILARITY: Self = Self(1 << 0);
    /// Subpixel (LCD) coverage is computed per color channel.
    pub const USE_LCD: Self = Self(1 << 1);
    /// LCD subpixels are ordered blue, green, red.
    pub const BGR: Self = Self(1 << 2);
    /// Vertices carry their own color.
    pub const COLOR_ATTR: Self = Self(1 << 3);
    /// Distances are adjusted for gamma before coverage is computed.
    pub const GAMMA: Self = Self(1 << 4);

    /// No flags.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Creates flags from raw bits, dropping bits without a meaning.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0x1f)
    }

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for VariantFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for VariantFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for VariantFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for VariantFlags {
    type Output = Self;

    fn not(self) -> Self {
        Self::from_bits_truncate(!self.0)
    }
}

impl fmt::Debug for VariantFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(VariantFlags, &str); 5] = [
            (VariantFlags::SIMILARITY, "SIMILARITY"),
            (VariantFlags::USE_LCD, "USE_LCD"),
            (VariantFlags::BGR, "BGR"),
            (VariantFlags::COLOR_ATTR, "COLOR_ATTR"),
            (VariantFlags::GAMMA, "GAMMA"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

/// Discriminant of [`SdfVariant`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum VariantKind {
    /// Grayscale distance-field text.
    Text = 0,
    /// Distance-field rendering of cached paths.
    Path = 1,
    /// Subpixel distance-field text.
    Lcd = 2,
}

impl VariantKind {
    /// Flags the variant accepts.
    pub const fn allowed_flags(self) -> VariantFlags {
        match self {
            Self::Text => VariantFlags(
                VariantFlags::SIMILARITY.0 | VariantFlags::COLOR_ATTR.0 | VariantFlags::GAMMA.0,
            ),
            Self::Path => VariantFlags(VariantFlags::SIMILARITY.0 | VariantFlags::COLOR_ATTR.0),
            Self::Lcd => VariantFlags(
                VariantFlags::SIMILARITY.0 | VariantFlags::USE_LCD.0 | VariantFlags::BGR.0,
            ),
        }
    }

    /// Flags that are always set for the variant.
    pub const fn required_flags(self) -> VariantFlags {
        match self {
            Self::Lcd => VariantFlags::USE_LCD,
            Self::Text | Self::Path => VariantFlags::empty(),
        }
    }

    /// The discriminant as a 2-bit value.
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

/// Per-channel distance adjustment for subpixel text.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct DistanceAdjust {
    /// Adjustment of the red channel.
    pub r: f32,
    /// Adjustment of the green channel.
    pub g: f32,
    /// Adjustment of the blue channel.
    pub b: f32,
}

impl DistanceAdjust {
    /// Creates a new adjustment.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// The kind of distance-field draw, with the data only that kind uses.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SdfVariant {
    /// Grayscale text.
    Text {
        /// Gamma distance adjustment; only uploaded when [`VariantFlags::GAMMA`] is set.
        distance_adjust: f32,
    },
    /// Cached paths. Paths are drawn in device space and never have a local transform.
    Path,
    /// Subpixel text.
    Lcd {
        /// Per-channel gamma distance adjustment.
        distance_adjust: DistanceAdjust,
    },
}

impl SdfVariant {
    /// Grayscale text without distance adjustment.
    pub const fn text() -> Self {
        Self::Text {
            distance_adjust: 0.0,
        }
    }

    /// Path rendering.
    pub const fn path() -> Self {
        Self::Path
    }

    /// Subpixel text with the given adjustment.
    pub const fn lcd(distance_adjust: DistanceAdjust) -> Self {
        Self::Lcd { distance_adjust }
    }

    /// The variant's discriminant.
    pub const fn kind(&self) -> VariantKind {
        match self {
            Self::Text { .. } => VariantKind::Text,
            Self::Path => VariantKind::Path,
            Self::Lcd { .. } => VariantKind::Lcd,
        }
    }
}

/// Where a draw's color comes from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum ColorSource {
    /// One color for the whole draw, bound as a uniform.
    Uniform = 0,
    /// A color per vertex.
    Attribute = 1,
}

/// Size in texels of the bound distance-field atlas.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct AtlasSize {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
}

impl AtlasSize {
    /// Creates a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Everything about a distance-field draw that affects program selection, batching and
/// uniform values.
#[derive(Clone, Copy, Debug)]
pub struct DrawConfig {
    variant: SdfVariant,
    color: AlphaColor<Srgb>,
    view: Transform,
    local: Transform,
    uses_local_coords: bool,
    flags: VariantFlags,
    atlas_size: AtlasSize,
}

impl DrawConfig {
    /// Creates a configuration with the variant's required flags, an identity local transform
    /// and no local coordinate use.
    pub fn new(variant: SdfVariant, color: AlphaColor<Srgb>, view: Transform) -> Self {
        Self {
            variant,
            color,
            view,
            local: Transform::IDENTITY,
            uses_local_coords: false,
            flags: variant.kind().required_flags(),
            atlas_size: AtlasSize::default(),
        }
    }

    /// Creates a configuration, rejecting flags the variant does not support.
    pub fn try_new(
        variant: SdfVariant,
        color: AlphaColor<Srgb>,
        view: Transform,
        flags: VariantFlags,
    ) -> Result<Self, FlagsError> {
        let kind = variant.kind();
        let unsupported = flags & !kind.allowed_flags();
        if !unsupported.is_empty() {
            return Err(FlagsError::new(unsupported, kind));
        }
        Ok(Self::new(variant, color, view).with_flags(flags))
    }

    /// Sets the variant flags.
    ///
    /// Flags the variant does not support are dropped, and the variant's required flags are
    /// always kept. Use [`DrawConfig::try_new`] to have unsupported flags reported instead.
    #[must_use]
    pub fn with_flags(mut self, flags: VariantFlags) -> Self {
        let kind = self.variant.kind();
        if !(flags & !kind.allowed_flags()).is_empty() {
            log::debug!("dropping flags unsupported by {kind:?}: {flags:?}");
        }
        self.flags = (flags & kind.allowed_flags()) | kind.required_flags();
        self
    }

    /// Sets the local transform. Ignored for [`SdfVariant::Path`].
    #[must_use]
    pub fn with_local_transform(mut self, local: Transform) -> Self {
        if self.variant.kind() != VariantKind::Path {
            self.local = local;
        }
        self
    }

    /// Sets whether later stages read local (pre-view-transform) coordinates.
    #[must_use]
    pub fn with_local_coords(mut self, uses_local_coords: bool) -> Self {
        self.uses_local_coords = uses_local_coords;
        self
    }

    /// Sets the size of the bound atlas texture.
    #[must_use]
    pub fn with_atlas_size(mut self, atlas_size: AtlasSize) -> Self {
        self.atlas_size = atlas_size;
        self
    }

    /// Sets the draw color.
    #[must_use]
    pub fn with_color(mut self, color: AlphaColor<Srgb>) -> Self {
        self.color = color;
        self
    }

    /// The draw variant.
    pub fn variant(&self) -> &SdfVariant {
        &self.variant
    }

    /// The draw color.
    pub fn color(&self) -> AlphaColor<Srgb> {
        self.color
    }

    /// The draw color as packed premultiplied RGBA8.
    pub fn packed_color(&self) -> u32 {
        pack_color(self.color)
    }

    /// The view transform.
    pub fn view_transform(&self) -> &Transform {
        &self.view
    }

    /// The local transform.
    pub fn local_transform(&self) -> &Transform {
        &self.local
    }

    /// Whether later stages read local coordinates.
    pub fn uses_local_coords(&self) -> bool {
        self.uses_local_coords
    }

    /// The variant flags.
    pub fn flags(&self) -> VariantFlags {
        self.flags
    }

    /// The bound atlas size.
    pub fn atlas_size(&self) -> AtlasSize {
        self.atlas_size
    }

    /// Where the draw's color comes from.
    pub fn color_source(&self) -> ColorSource {
        if self.flags.contains(VariantFlags::COLOR_ATTR) {
            ColorSource::Attribute
        } else {
            ColorSource::Uniform
        }
    }

    /// Size of one vertex for this draw.
    pub fn vertex_stride(&self) -> usize {
        match self.color_source() {
            ColorSource::Attribute => size_of::<ColorGlyphVertex>(),
            ColorSource::Uniform => size_of::<GlyphVertex>(),
        }
    }

    /// The key of the program that draws this configuration.
    pub fn program_key(&self) -> ProgramKey {
        ProgramKey::from_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::color::palette::css;

    #[test]
    fn lcd_always_uses_lcd() {
        let config = DrawConfig::new(
            SdfVariant::lcd(DistanceAdjust::default()),
            css::BLACK,
            Transform::IDENTITY,
        );
        assert!(config.flags().contains(VariantFlags::USE_LCD));

        let config = config.with_flags(VariantFlags::BGR);
        assert_eq!(config.flags(), VariantFlags::USE_LCD | VariantFlags::BGR);
    }

    #[test]
    fn with_flags_drops_unsupported_flags() {
        let config = DrawConfig::new(SdfVariant::path(), css::BLACK, Transform::IDENTITY)
            .with_flags(VariantFlags::SIMILARITY | VariantFlags::BGR | VariantFlags::GAMMA);
        assert_eq!(config.flags(), VariantFlags::SIMILARITY);

        let config = DrawConfig::new(SdfVariant::text(), css::BLACK, Transform::IDENTITY)
            .with_flags(VariantFlags::USE_LCD);
        assert!(config.flags().is_empty());
    }

    #[test]
    fn rejects_flags_outside_the_variant() {
        let err = DrawConfig::try_new(
            SdfVariant::path(),
            css::BLACK,
            Transform::IDENTITY,
            VariantFlags::SIMILARITY | VariantFlags::BGR,
        )
        .unwrap_err();
        assert_eq!(err.unsupported(), VariantFlags::BGR);
        assert_eq!(err.variant(), VariantKind::Path);

        assert!(
            DrawConfig::try_new(
                SdfVariant::text(),
                css::BLACK,
                Transform::IDENTITY,
                VariantFlags::GAMMA | VariantFlags::COLOR_ATTR,
            )
            .is_ok()
        );
    }

    #[test]
    fn color_source_follows_color_attribute() {
        let config = DrawConfig::new(SdfVariant::text(), css::RED, Transform::IDENTITY);
        assert_eq!(config.color_source(), ColorSource::Uniform);
        assert_eq!(config.vertex_stride(), size_of::<GlyphVertex>());

        let config = config.with_flags(VariantFlags::COLOR_ATTR);
        assert_eq!(config.color_source(), ColorSource::Attribute);
        assert_eq!(config.vertex_stride(), size_of::<ColorGlyphVertex>());
    }

    #[test]
    fn paths_have_no_local_transform() {
        let config = DrawConfig::new(SdfVariant::path(), css::RED, Transform::IDENTITY)
            .with_local_transform(Transform::scale(2.0, 2.0));
        assert!(config.local_transform().is_identity());
    }

    #[test]
    fn flags_debug_lists_names() {
        let flags = VariantFlags::SIMILARITY | VariantFlags::GAMMA;
        assert_eq!(alloc::format!("{flags:?}"), "{SIMILARITY, GAMMA}");
    }
}
