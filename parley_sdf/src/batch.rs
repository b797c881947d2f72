// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deciding whether two draws can be merged into one draw call.

use crate::config::DrawConfig;
use crate::key::ProgramKey;
use crate::uniforms::UniformValues;

/// How local transforms of two draws that both read local coordinates must match.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum LocalMatrixMatch {
    /// The local transforms must be exactly equal. Required whenever the coefficients are
    /// uploaded as uniforms.
    #[default]
    Exact,
    /// The local transforms only need the same [`TransformClass`](crate::TransformClass).
    ///
    /// Only valid for consumers that bake local coordinates into vertices and whose shader
    /// code branches on the class alone.
    Class,
}

/// Checks whether two draws can be serviced by one program instance in one draw call.
///
/// A merged draw call binds one set of uniforms, so besides sharing a program the draws must
/// bind bit-identical values to every uniform that program declares: color, view matrix,
/// distance adjustment and atlas size. Values the program never uploads are ignored.
///
/// Every check is symmetric, so the order of the two draws never matters.
#[derive(Clone, Copy, Default, Debug)]
pub struct BatchChecker {
    local_matrix_match: LocalMatrixMatch,
}

impl BatchChecker {
    /// Creates a checker with the given local transform policy.
    pub const fn new(local_matrix_match: LocalMatrixMatch) -> Self {
        Self { local_matrix_match }
    }

    /// The local transform policy.
    pub const fn local_matrix_match(&self) -> LocalMatrixMatch {
        self.local_matrix_match
    }

    /// Whether draws `a` and `b`, with their program keys, can be batched.
    pub fn can_combine(
        &self,
        a: &DrawConfig,
        a_key: ProgramKey,
        b: &DrawConfig,
        b_key: ProgramKey,
    ) -> bool {
        a_key == b_key
            && self.can_combine_local_transforms(a, b)
            && UniformValues::for_config(a) == UniformValues::for_config(b)
    }

    /// Same as [`can_combine`](Self::can_combine), deriving the keys from the configurations.
    pub fn can_combine_configs(&self, a: &DrawConfig, b: &DrawConfig) -> bool {
        self.can_combine(a, a.program_key(), b, b.program_key())
    }

    fn can_combine_local_transforms(&self, a: &DrawConfig, b: &DrawConfig) -> bool {
        if a.uses_local_coords() != b.uses_local_coords() {
            return false;
        }
        if !a.uses_local_coords() {
            return true;
        }
        match self.local_matrix_match {
            LocalMatrixMatch::Exact => {
                a.local_transform().values().map(f32::to_bits)
                    == b.local_transform().values().map(f32::to_bits)
            }
            LocalMatrixMatch::Class => a.local_transform().class() == b.local_transform().class(),
        }
    }
}
