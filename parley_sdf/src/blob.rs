// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render blobs: GPU-ready vertex storage for one text blob.

use alloc::rc::Rc;
use bytemuck::Pod;
use core::cell::RefCell;
use core::fmt::{Debug, Formatter};
use core::mem::size_of;
use smallvec::{SmallVec, smallvec};

use crate::pool::{MemoryPool, PoolBuffer};

/// Every glyph is drawn as one quad.
pub const VERTICES_PER_GLYPH: usize = 4;

/// Identifier of a text blob, used as the render blob cache key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(transparent)]
pub struct BlobId(u32);

impl BlobId {
    /// Creates an identifier from its raw value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

/// A render blob shared between the cache and in-flight draws.
pub type SharedBlob = Rc<RefCell<RenderBlob>>;

/// Bookkeeping for one run of a render blob.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct BlobRun {
    /// Index of the run's first glyph within the blob.
    pub glyph_start: usize,
    /// Number of glyphs in the run.
    pub glyph_count: usize,
    /// Whether the run was prepared for distance-field rendering.
    pub distance_field: bool,
}

/// Vertex storage for the glyphs of one text blob.
///
/// The vertex buffer holds [`VERTICES_PER_GLYPH`] vertices of `vertex_stride` bytes per glyph.
/// Its capacity is fixed when the blob is created.
pub struct RenderBlob {
    id: Option<BlobId>,
    glyph_count: usize,
    vertex_stride: usize,
    /// Most text blobs have a single run.
    runs: SmallVec<[BlobRun; 1]>,
    vertices: PoolBuffer,
}

impl RenderBlob {
    pub(crate) fn new(
        pool: &MemoryPool,
        glyph_count: usize,
        run_count: usize,
        vertex_stride: usize,
    ) -> Self {
        let vertices = pool.allocate(glyph_count * VERTICES_PER_GLYPH * vertex_stride);
        Self {
            id: None,
            glyph_count,
            vertex_stride,
            runs: smallvec![BlobRun::default(); run_count],
            vertices,
        }
    }

    /// Wraps the blob in a shared handle.
    pub fn into_shared(self) -> SharedBlob {
        Rc::new(RefCell::new(self))
    }

    /// The identifier of the text blob this was built from, if one was assigned.
    pub fn id(&self) -> Option<BlobId> {
        self.id
    }

    /// Assigns the identifier used as the cache key.
    ///
    /// Must not be called while the blob is cached.
    pub fn set_id(&mut self, id: BlobId) {
        self.id = Some(id);
    }

    /// Number of glyphs the blob was sized for.
    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    /// Number of runs the blob was sized for.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Size of one vertex slot in bytes.
    pub fn vertex_stride(&self) -> usize {
        self.vertex_stride
    }

    /// Number of vertex slots.
    pub fn vertex_capacity(&self) -> usize {
        self.glyph_count * VERTICES_PER_GLYPH
    }

    /// Bytes this blob accounts for in the pool it was allocated from.
    pub fn storage_size(&self) -> usize {
        self.vertices.footprint()
    }

    /// Raw vertex bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        self.vertices.as_slice()
    }

    /// Raw vertex bytes, mutably.
    pub fn vertex_bytes_mut(&mut self) -> &mut [u8] {
        self.vertices.as_mut_slice()
    }

    /// Writes `vertex` into slot `index`.
    ///
    /// Panics if the slot is out of range or `V` is larger than the vertex stride.
    pub fn write_vertex<V: Pod>(&mut self, index: usize, vertex: &V) {
        let range = self.slot_range::<V>(index);
        self.vertices.as_mut_slice()[range].copy_from_slice(bytemuck::bytes_of(vertex));
    }

    /// Reads the vertex in slot `index`.
    ///
    /// Panics if the slot is out of range or `V` is larger than the vertex stride.
    pub fn read_vertex<V: Pod>(&self, index: usize) -> V {
        let range = self.slot_range::<V>(index);
        bytemuck::pod_read_unaligned(&self.vertices.as_slice()[range])
    }

    /// The run records.
    pub fn runs(&self) -> &[BlobRun] {
        &self.runs
    }

    /// The run records, mutably.
    pub fn runs_mut(&mut self) -> &mut [BlobRun] {
        &mut self.runs
    }

    fn slot_range<V>(&self, index: usize) -> core::ops::Range<usize> {
        assert!(
            size_of::<V>() <= self.vertex_stride,
            "vertex type does not fit the blob's vertex stride"
        );
        assert!(index < self.vertex_capacity(), "vertex index out of range");
        let start = index * self.vertex_stride;
        start..start + size_of::<V>()
    }
}

impl Debug for RenderBlob {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderBlob")
            .field("id", &self.id)
            .field("glyph_count", &self.glyph_count)
            .field("run_count", &self.runs.len())
            .field("vertex_stride", &self.vertex_stride)
            .finish_non_exhaustive()
    }
}

/// Vertex of a glyph quad drawn with a uniform color.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
#[repr(C)]
pub struct GlyphVertex {
    /// Position in the draw's local space.
    pub position: [f32; 2],
    /// Texel coordinates in the distance-field atlas.
    pub atlas_coords: [u16; 2],
}

/// Vertex of a glyph quad carrying its own color.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
#[repr(C)]
pub struct ColorGlyphVertex {
    /// Position in the draw's local space.
    pub position: [f32; 2],
    /// Packed premultiplied RGBA color.
    pub color: u32,
    /// Texel coordinates in the distance-field atlas.
    pub atlas_coords: [u16; 2],
}
