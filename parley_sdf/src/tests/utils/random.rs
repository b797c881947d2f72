// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::color::{AlphaColor, Srgb};
use rand::Rng;
use rand::rngs::StdRng;

use crate::{
    AtlasSize, DistanceAdjust, DrawConfig, SdfVariant, Transform, TransformClass, VariantFlags,
};

/// Seed shared by the randomized tests, so failures reproduce.
pub(crate) const SEED: u64 = 0x5d5f_7e47;

const CLASSES: [TransformClass; 4] = [
    TransformClass::Identity,
    TransformClass::ScaleTranslate,
    TransformClass::Affine,
    TransformClass::Perspective,
];

/// A non-degenerate, non-unit value.
fn coefficient(rng: &mut StdRng) -> f32 {
    let magnitude = rng.gen_range(1.5_f32..8.0);
    if rng.gen_bool(0.5) { magnitude } else { -magnitude }
}

/// A transform that classifies as `class`.
pub(crate) fn random_transform_of_class(rng: &mut StdRng, class: TransformClass) -> Transform {
    match class {
        TransformClass::Identity => Transform::IDENTITY,
        TransformClass::ScaleTranslate => Transform::new([
            coefficient(rng),
            0.0,
            coefficient(rng),
            0.0,
            coefficient(rng),
            coefficient(rng),
            0.0,
            0.0,
            1.0,
        ]),
        TransformClass::Affine => Transform::new([
            coefficient(rng),
            coefficient(rng),
            coefficient(rng),
            coefficient(rng),
            coefficient(rng),
            coefficient(rng),
            0.0,
            0.0,
            1.0,
        ]),
        TransformClass::Perspective => random_transform_of_class(rng, TransformClass::Affine)
            .with_perspective(coefficient(rng), coefficient(rng), 1.0),
    }
}

/// A transform of a random class.
fn random_transform(rng: &mut StdRng) -> Transform {
    let class = CLASSES[rng.gen_range(0..CLASSES.len())];
    random_transform_of_class(rng, class)
}

/// An opaque color with random channels.
pub(crate) fn random_color(rng: &mut StdRng) -> AlphaColor<Srgb> {
    AlphaColor::from_rgba8(rng.r#gen(), rng.r#gen(), rng.r#gen(), 255)
}

/// A valid draw configuration with every field randomized.
pub(crate) fn random_config(rng: &mut StdRng) -> DrawConfig {
    let variant = match rng.gen_range(0..3) {
        0 => SdfVariant::Text {
            distance_adjust: rng.gen_range(-0.5..0.5),
        },
        1 => SdfVariant::path(),
        _ => SdfVariant::lcd(DistanceAdjust::new(
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
        )),
    };
    let allowed = variant.kind().allowed_flags();
    let flags = VariantFlags::from_bits_truncate(rng.r#gen()) & allowed;
    DrawConfig::new(variant, random_color(rng), random_transform(rng))
        .with_flags(flags)
        .with_local_transform(random_transform(rng))
        .with_local_coords(rng.gen_bool(0.5))
        .with_atlas_size(AtlasSize::new(
            rng.gen_range(1..4096),
            rng.gen_range(1..4096),
        ))
}

/// A configuration selecting the same program as `config`.
///
/// Each uniform-only value (variant payload, color, atlas size) and each transform is
/// re-randomized with probability `change`; transforms keep their class.
pub(crate) fn random_variation(rng: &mut StdRng, config: &DrawConfig, change: f64) -> DrawConfig {
    let variant = if rng.gen_bool(change) {
        match *config.variant() {
            SdfVariant::Text { .. } => SdfVariant::Text {
                distance_adjust: rng.gen_range(-1.0..1.0),
            },
            SdfVariant::Path => SdfVariant::Path,
            SdfVariant::Lcd { .. } => SdfVariant::lcd(DistanceAdjust::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )),
        }
    } else {
        *config.variant()
    };
    let color = if rng.gen_bool(change) {
        random_color(rng)
    } else {
        config.color()
    };
    let view = if rng.gen_bool(change) {
        random_transform_of_class(rng, config.view_transform().class())
    } else {
        *config.view_transform()
    };
    let local = if rng.gen_bool(change) {
        random_transform_of_class(rng, config.local_transform().class())
    } else {
        *config.local_transform()
    };
    let atlas_size = if rng.gen_bool(change) {
        AtlasSize::new(rng.gen_range(1..8192), rng.gen_range(1..8192))
    } else {
        config.atlas_size()
    };
    DrawConfig::new(variant, color, view)
        .with_flags(config.flags())
        .with_local_transform(local)
        .with_local_coords(config.uses_local_coords())
        .with_atlas_size(atlas_size)
}
