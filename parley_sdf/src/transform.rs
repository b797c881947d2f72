// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projective 2D transforms and their structural classification.

#![allow(
    clippy::cast_possible_truncation,
    reason = "Transforms are uploaded to the GPU as f32, so f64 coefficients are narrowed."
)]

use peniko::kurbo::Affine;

/// Structural class of a [`Transform`], from cheapest to most general.
///
/// Shader code only branches on the class, so the class (and never the coefficients) takes
/// part in program keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum TransformClass {
    /// The identity transform.
    Identity = 0,
    /// Axis-aligned scale and translation only.
    ScaleTranslate = 1,
    /// Any affine transform with rotation or skew.
    Affine = 2,
    /// A transform with perspective terms.
    Perspective = 3,
}

impl TransformClass {
    /// The class as a 2-bit value.
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

/// A 3x3 projective transform stored in row-major order.
///
/// A point `(x, y)` maps to `((m[0] x + m[1] y + m[2]) / w, (m[3] x + m[4] y + m[5]) / w)`
/// with `w = m[6] x + m[7] y + m[8]`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Transform([f32; 9]);

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    /// Creates a transform from row-major coefficients.
    pub const fn new(values: [f32; 9]) -> Self {
        Self(values)
    }

    /// Creates a translation.
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self([1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0])
    }

    /// Creates an axis-aligned scale.
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self([sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0])
    }

    /// Returns a copy with the given perspective row.
    pub const fn with_perspective(self, p0: f32, p1: f32, p2: f32) -> Self {
        let m = self.0;
        Self([m[0], m[1], m[2], m[3], m[4], m[5], p0, p1, p2])
    }

    /// The row-major coefficients.
    pub const fn values(&self) -> &[f32; 9] {
        &self.0
    }

    /// Whether this is exactly the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Whether the bottom row differs from `[0, 0, 1]`.
    pub fn has_perspective(&self) -> bool {
        let m = &self.0;
        m[6] != 0.0 || m[7] != 0.0 || m[8] != 1.0
    }

    /// The structural class of the transform.
    pub fn class(&self) -> TransformClass {
        let m = &self.0;
        if self.is_identity() {
            TransformClass::Identity
        } else if self.has_perspective() {
            TransformClass::Perspective
        } else if m[1] == 0.0 && m[3] == 0.0 {
            TransformClass::ScaleTranslate
        } else {
            TransformClass::Affine
        }
    }

    /// The coefficients in column-major order, as shader matrix uniforms expect them.
    pub fn to_cols_array(&self) -> [f32; 9] {
        let m = &self.0;
        [m[0], m[3], m[6], m[1], m[4], m[7], m[2], m[5], m[8]]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Affine> for Transform {
    fn from(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self([
            a as f32, c as f32, e as f32, b as f32, d as f32, f as f32, 0.0, 0.0, 1.0,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_structure() {
        assert_eq!(Transform::IDENTITY.class(), TransformClass::Identity);
        assert_eq!(
            Transform::translate(3.0, 4.0).class(),
            TransformClass::ScaleTranslate
        );
        assert_eq!(
            Transform::scale(2.0, 0.5).class(),
            TransformClass::ScaleTranslate
        );
        assert_eq!(
            Transform::from(Affine::rotate(0.5)).class(),
            TransformClass::Affine
        );
        assert_eq!(
            Transform::IDENTITY
                .with_perspective(0.001, 0.0, 1.0)
                .class(),
            TransformClass::Perspective
        );
    }

    #[test]
    fn affine_conversion_keeps_layout() {
        let t = Transform::from(Affine::new([2.0, 0.0, 0.0, 3.0, 10.0, 20.0]));
        assert_eq!(t, Transform::new([2.0, 0.0, 10.0, 0.0, 3.0, 20.0, 0.0, 0.0, 1.0]));
        assert!(Transform::from(Affine::IDENTITY).is_identity());
    }

    #[test]
    fn column_major_transposes() {
        let t = Transform::translate(5.0, 6.0);
        assert_eq!(
            t.to_cols_array(),
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 6.0, 1.0]
        );
    }
}
