// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::color::palette::css;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::utils::{SEED, random_config, random_transform_of_class, random_variation};
use crate::{DistanceAdjust, DrawConfig, SdfVariant, Transform, TransformClass, VariantFlags};

#[test]
fn keys_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..500 {
        let config = random_config(&mut rng);
        let copy = config;
        assert_eq!(config.program_key(), copy.program_key());
        assert_eq!(config.program_key(), config.program_key());
    }
}

#[test]
fn uniform_values_do_not_change_keys() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..500 {
        let config = random_config(&mut rng);
        let perturbed = random_variation(&mut rng, &config, 1.0);
        assert_eq!(
            config.program_key(),
            perturbed.program_key(),
            "{config:?} vs {perturbed:?}"
        );
    }
}

#[test]
fn color_attribute_changes_the_key() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..200 {
        let config = random_config(&mut rng);
        let kind = config.variant().kind();
        if !kind.allowed_flags().contains(VariantFlags::COLOR_ATTR) {
            continue;
        }
        let with = config.with_flags(config.flags() | VariantFlags::COLOR_ATTR);
        let without = config.with_flags(config.flags() & !VariantFlags::COLOR_ATTR);
        assert_ne!(with.program_key(), without.program_key());
    }
}

#[test]
fn view_class_changes_the_key() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let classes = [
        TransformClass::Identity,
        TransformClass::ScaleTranslate,
        TransformClass::Affine,
        TransformClass::Perspective,
    ];
    for (i, &a) in classes.iter().enumerate() {
        for &b in &classes[i + 1..] {
            let first = DrawConfig::new(
                SdfVariant::text(),
                css::BLACK,
                random_transform_of_class(&mut rng, a),
            );
            let second = DrawConfig::new(
                SdfVariant::text(),
                css::BLACK,
                random_transform_of_class(&mut rng, b),
            );
            assert_ne!(first.program_key(), second.program_key(), "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn lcd_subpixel_order_changes_the_key() {
    let rgb = DrawConfig::new(
        SdfVariant::lcd(DistanceAdjust::default()),
        css::WHITE,
        Transform::IDENTITY,
    );
    let bgr = rgb.with_flags(VariantFlags::BGR);
    assert_ne!(rgb.program_key(), bgr.program_key());
}

#[test]
fn local_perspective_only_counts_with_local_coords() {
    let perspective = Transform::IDENTITY.with_perspective(0.25, 0.0, 1.0);
    let view = Transform::scale(2.0, 2.0);
    let without = DrawConfig::new(SdfVariant::text(), css::BLACK, view)
        .with_local_transform(perspective);
    let with = without.with_local_coords(true);

    assert_eq!(
        with.program_key().bits() ^ without.program_key().bits(),
        1 << 24
    );
}
