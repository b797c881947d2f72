// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Program keys.
//!
//! A key packs every draw parameter that changes the generated shader into 32 bits:
//!
//! | Bits    | Meaning                                                  |
//! |---------|----------------------------------------------------------|
//! | 0..=7   | [`VariantFlags`](crate::VariantFlags)                    |
//! | 8..=9   | [`VariantKind`](crate::VariantKind)                      |
//! | 16      | [`ColorSource`]                                          |
//! | 24      | local coordinates are read through a perspective transform |
//! | 25..=26 | [`TransformClass`](crate::TransformClass) of the view    |
//! | 27      | both view and local transforms are non-identity          |
//!
//! Uniform values (color, distance adjustment, atlas size, transform coefficients) are left
//! out, so draws that only differ in those share a program.

use core::fmt;

use crate::config::{ColorSource, DrawConfig};

const VARIANT_SHIFT: u32 = 8;
const COLOR_SOURCE_SHIFT: u32 = 16;
const LOCAL_PERSPECTIVE_SHIFT: u32 = 24;
const VIEW_CLASS_SHIFT: u32 = 25;
const COMBINED_TRANSFORMS_SHIFT: u32 = 27;

/// Compact identifier of the shader program a draw needs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProgramKey(u32);

impl ProgramKey {
    /// Derives the key for `config`.
    pub fn from_config(config: &DrawConfig) -> Self {
        let view = config.view_transform();
        let local = config.local_transform();

        let mut key = u32::from(config.flags().bits());
        key |= config.variant().kind().bits() << VARIANT_SHIFT;
        if config.color_source() == ColorSource::Attribute {
            key |= 1 << COLOR_SOURCE_SHIFT;
        }
        if config.uses_local_coords() && local.has_perspective() {
            key |= 1 << LOCAL_PERSPECTIVE_SHIFT;
        }
        key |= view.class().bits() << VIEW_CLASS_SHIFT;
        if !view.is_identity() && !local.is_identity() {
            key |= 1 << COMBINED_TRANSFORMS_SHIFT;
        }
        Self(key)
    }

    /// The packed value.
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ProgramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgramKey({:#010x})", self.0)
    }
}
