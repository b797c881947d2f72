// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use crate::config::{VariantFlags, VariantKind};

/// Error returned when a [`BlobCacheConfig`](crate::BlobCacheConfig) cannot be used.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConfigError {
    /// The byte budget is zero, so no blob could ever stay cached.
    ZeroBudget,
    /// The pool growth size is zero.
    ZeroGrowth,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::ZeroBudget => "blob cache budget must be non-zero",
            Self::ZeroGrowth => "memory pool growth size must be non-zero",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for ConfigError {}

/// Error returned when variant flags are not valid for a draw variant.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FlagsError {
    flags: VariantFlags,
    variant: VariantKind,
}

impl FlagsError {
    pub(crate) const fn new(flags: VariantFlags, variant: VariantKind) -> Self {
        Self { flags, variant }
    }

    /// The flags that the variant does not accept.
    pub const fn unsupported(self) -> VariantFlags {
        self.flags
    }

    /// The variant the flags were given for.
    pub const fn variant(self) -> VariantKind {
        self.variant
    }
}

impl fmt::Display for FlagsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "flags {:#04x} are not supported by the {:?} variant",
            self.flags.bits(),
            self.variant
        )
    }
}

impl core::error::Error for FlagsError {}
