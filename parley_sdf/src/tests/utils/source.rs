// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use crate::{BlobId, TextRunSource};

/// A run source with a caller-chosen id and run lengths.
#[derive(Clone, Debug)]
pub(crate) struct FixedSource {
    pub(crate) id: BlobId,
    pub(crate) runs: Vec<usize>,
}

impl FixedSource {
    pub(crate) fn new(id: u32, runs: &[usize]) -> Self {
        Self {
            id: BlobId::new(id),
            runs: runs.to_vec(),
        }
    }
}

impl TextRunSource for FixedSource {
    fn unique_id(&self) -> BlobId {
        self.id
    }

    fn run_glyph_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.runs.iter().copied()
    }
}
