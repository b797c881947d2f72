// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growable bump arena backing render blob storage.
//!
//! The pool owns a list of blocks, each a single heap allocation: the first block is
//! `pre_alloc_size` bytes, later ones at least `min_growth_size`. Allocating splits the next
//! bytes off the end of the newest block, so consecutive buffers are contiguous and allocation
//! is a pointer bump. A block's memory is freed once the pool and every buffer carved from it
//! have let go of it.
//!
//! Each allocation is handed out as a [`PoolBuffer`] that returns its bytes to the pool when
//! dropped, so the pool size tracks blob lifetimes even when a blob outlives its cache entry.

use alloc::rc::{Rc, Weak};
use bytes::BytesMut;
use core::cell::RefCell;
use core::fmt::{Debug, Formatter};
use smallvec::SmallVec;

/// Allocation granularity in bytes.
const ALIGNMENT: usize = 8;

/// A growable arena reporting how many bytes are currently allocated from it.
pub struct MemoryPool {
    state: Rc<RefCell<PoolState>>,
}

struct PoolState {
    min_growth_size: usize,
    /// Most pools never grow past their pre-allocated block and one growth block.
    blocks: SmallVec<[Block; 4]>,
    allocated: usize,
    next_block_id: u32,
}

struct Block {
    id: u32,
    /// Unused tail of the block's allocation.
    tail: BytesMut,
    /// Size of the whole allocation.
    capacity: usize,
    /// Buffers carved from this block that are still alive.
    live: usize,
}

impl Block {
    fn new(id: u32, size: usize) -> Self {
        let tail = BytesMut::with_capacity(size);
        Self {
            id,
            capacity: tail.capacity(),
            tail,
            live: 0,
        }
    }
}

impl MemoryPool {
    /// Creates a pool with a first block of `pre_alloc_size` bytes that grows by blocks of at
    /// least `min_growth_size` bytes.
    pub fn new(pre_alloc_size: usize, min_growth_size: usize) -> Self {
        let mut blocks = SmallVec::new();
        blocks.push(Block::new(0, align_up(pre_alloc_size)));
        Self {
            state: Rc::new(RefCell::new(PoolState {
                min_growth_size: align_up(min_growth_size.max(1)),
                blocks,
                allocated: 0,
                next_block_id: 1,
            })),
        }
    }

    /// Allocates a zeroed buffer of `size` bytes.
    ///
    /// Running out of memory is fatal, as with any Rust allocation.
    pub fn allocate(&self, size: usize) -> PoolBuffer {
        let footprint = align_up(size);
        let mut state = self.state.borrow_mut();
        let state = &mut *state;

        if let Some(block) = state.blocks.last_mut() {
            if block.live == 0 && block.tail.capacity() < footprint && footprint <= block.capacity
            {
                // Nothing carved from the block is alive, so its front can be reused.
                block.tail.reserve(footprint);
                block.capacity = block.capacity.max(block.tail.capacity());
            }
        }

        let fits = state
            .blocks
            .last()
            .is_some_and(|block| block.tail.capacity() >= footprint);
        if !fits {
            if state.blocks.last().is_some_and(|block| block.live == 0) {
                state.blocks.pop();
            }
            let id = state.next_block_id;
            state.next_block_id = state.next_block_id.wrapping_add(1);
            let size = footprint.max(state.min_growth_size);
            log::trace!("memory pool growing by {size} bytes");
            state.blocks.push(Block::new(id, size));
        }

        let index = state.blocks.len() - 1;
        let block = &mut state.blocks[index];
        block.tail.resize(footprint, 0);
        let mut bytes = block.tail.split();
        bytes.truncate(size);
        block.live += 1;
        let block_id = block.id;
        state.allocated += footprint;

        PoolBuffer {
            bytes,
            block: block_id,
            footprint,
            pool: Rc::downgrade(&self.state),
        }
    }

    /// Total bytes currently handed out, rounded up to the allocation granularity.
    pub fn size(&self) -> usize {
        self.state.borrow().allocated
    }

    /// Total size of the block allocations the pool currently holds.
    pub fn reserved(&self) -> usize {
        self.state.borrow().blocks.iter().map(|b| b.capacity).sum()
    }

    /// Number of blocks the pool currently holds.
    pub fn block_count(&self) -> usize {
        self.state.borrow().blocks.len()
    }
}

impl PoolState {
    /// Empty blocks are dropped, except that the pool always keeps one.
    fn release(&mut self, block_id: u32, footprint: usize) {
        self.allocated -= footprint;
        let index = self.blocks.iter().position(|b| b.id == block_id);
        debug_assert!(index.is_some(), "released a buffer from an unknown block");
        let Some(index) = index else {
            return;
        };
        let block = &mut self.blocks[index];
        block.live -= 1;
        if block.live == 0 && self.blocks.len() > 1 {
            self.blocks.remove(index);
        }
    }
}

impl Debug for MemoryPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryPool")
            .field("allocated", &state.allocated)
            .field("blocks", &state.blocks.len())
            .field("reserved", &state.blocks.iter().map(|b| b.capacity).sum::<usize>())
            .field("min_growth_size", &state.min_growth_size)
            .finish_non_exhaustive()
    }
}

/// Zeroed storage allocated from a [`MemoryPool`].
///
/// Dropping the buffer returns its bytes to the pool. Buffers may outlive their pool, in which
/// case dropping them only frees the storage.
pub struct PoolBuffer {
    bytes: BytesMut,
    block: u32,
    footprint: usize,
    pool: Weak<RefCell<PoolState>>,
}

impl PoolBuffer {
    /// The buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// The buffer contents, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes this buffer accounts for in its pool.
    pub fn footprint(&self) -> usize {
        self.footprint
    }
}

impl Drop for PoolBuffer {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            pool.borrow_mut().release(self.block, self.footprint);
        }
    }
}

impl Debug for PoolBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolBuffer")
            .field("len", &self.bytes.len())
            .field("footprint", &self.footprint)
            .finish_non_exhaustive()
    }
}

fn align_up(size: usize) -> usize {
    size.div_ceil(ALIGNMENT) * ALIGNMENT
}
