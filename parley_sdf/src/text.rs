// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text run sources and glyph counting.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::blob::BlobId;

/// An immutable collection of glyph runs that can back a cached render blob.
///
/// Implementors must return the same [`unique_id`](Self::unique_id) for as long as the
/// runs are unchanged, and a different one for any other content.
pub trait TextRunSource {
    /// Stable identifier used as the cache key for blobs built from this source.
    fn unique_id(&self) -> BlobId;

    /// Glyph count of each run, in run order.
    fn run_glyph_counts(&self) -> impl Iterator<Item = usize> + '_;
}

/// Total glyph and run counts of a [`TextRunSource`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct GlyphCounts {
    /// Sum of the glyph counts of every run.
    pub glyphs: usize,
    /// Number of runs.
    pub runs: usize,
}

/// Counts the glyphs and runs of `source` in a single forward pass.
pub fn count_glyphs<S: TextRunSource + ?Sized>(source: &S) -> GlyphCounts {
    source
        .run_glyph_counts()
        .fold(GlyphCounts::default(), |counts, glyphs| GlyphCounts {
            glyphs: counts.glyphs + glyphs,
            runs: counts.runs + 1,
        })
}

/// A run of positioned glyphs sharing one font and style.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct TextRun {
    /// Glyph identifiers within the run's font.
    pub glyph_ids: Vec<u32>,
    /// Horizontal offset of each glyph relative to the run origin.
    pub x_offsets: Vec<f32>,
}

impl TextRun {
    /// Number of glyphs in the run.
    pub fn len(&self) -> usize {
        self.glyph_ids.len()
    }

    /// Returns `true` if the run has no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyph_ids.is_empty()
    }
}

/// An immutable sequence of [`TextRun`]s with a process-unique identifier.
#[derive(Clone, PartialEq, Debug)]
pub struct TextBlob {
    id: BlobId,
    runs: Vec<TextRun>,
}

impl TextBlob {
    /// The identifier assigned when the blob was built.
    pub fn unique_id(&self) -> BlobId {
        self.id
    }

    /// The runs of the blob.
    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }
}

impl TextRunSource for TextBlob {
    fn unique_id(&self) -> BlobId {
        self.id
    }

    fn run_glyph_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.runs.iter().map(TextRun::len)
    }
}

/// Builds [`TextBlob`]s run by run.
#[derive(Default, Debug)]
pub struct TextBlobBuilder {
    runs: Vec<TextRun>,
}

impl TextBlobBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a run. `glyph_ids` and `x_offsets` must have the same length.
    pub fn push_run(&mut self, glyph_ids: &[u32], x_offsets: &[f32]) -> &mut Self {
        debug_assert_eq!(
            glyph_ids.len(),
            x_offsets.len(),
            "every glyph in a run needs an offset"
        );
        self.runs.push(TextRun {
            glyph_ids: glyph_ids.to_vec(),
            x_offsets: x_offsets.to_vec(),
        });
        self
    }

    /// Finishes the blob, assigning it a fresh identifier.
    ///
    /// The builder is left empty and can be reused.
    pub fn build(&mut self) -> TextBlob {
        TextBlob {
            id: next_unique_id(),
            runs: core::mem::take(&mut self.runs),
        }
    }
}

fn next_unique_id() -> BlobId {
    static NEXT_ID: AtomicU32 = AtomicU32::new(1);
    let mut id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    // Skip zero on wrap-around so ids always look assigned.
    while id == 0 {
        id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    }
    BlobId::new(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_glyphs_across_runs() {
        let mut builder = TextBlobBuilder::new();
        builder
            .push_run(&[1, 2, 3], &[0.0, 1.0, 2.0])
            .push_run(&[], &[])
            .push_run(&[7, 8], &[0.0, 4.0]);
        let blob = builder.build();

        let counts = count_glyphs(&blob);
        assert_eq!(counts, GlyphCounts { glyphs: 5, runs: 3 });
        // Scanning is repeatable.
        assert_eq!(count_glyphs(&blob), counts);
    }

    #[test]
    fn empty_blob_has_no_runs() {
        let blob = TextBlobBuilder::new().build();
        assert_eq!(count_glyphs(&blob), GlyphCounts::default());
    }

    #[test]
    fn built_blobs_get_distinct_ids() {
        let mut builder = TextBlobBuilder::new();
        let a = builder.push_run(&[1], &[0.0]).build();
        let b = builder.push_run(&[1], &[0.0]).build();
        assert_ne!(a.unique_id(), b.unique_id());
        assert_eq!(a.runs(), b.runs());
    }
}
