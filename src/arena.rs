//! Block-pool string arena (`spec.md` §4.1).
//!
//! Grounded on `original_source/include/string_buffer.hpp`: a vector of
//! fixed-size blocks, linear-scanned for one with enough free space, with a
//! dedicated oversize block when a string is bigger than `block_size`.
//!
//! The C++ version hands back a `std::string_view` straight into block
//! memory. A Rust arena that stored live `&str` slices would have to be
//! self-referential (the owning `Document` can't simultaneously hold the
//! arena and borrow out of it past the method call). Instead `add` returns
//! an opaque [`ArenaSpan`] handle; [`Arena::resolve`] turns it back into a
//! `&str` borrowed from `&self`. The handle is `Copy`, cheap to stash
//! anywhere, and `resolve` is just indexing — no unsafe code anywhere in
//! this module.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaSpan {
    block: usize,
    start: usize,
    len: usize,
}

/// Default block size, matching the C++ default.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

#[derive(Debug)]
pub struct Arena {
    blocks: Vec<Vec<u8>>,
    block_size: usize,
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new(DEFAULT_BLOCK_SIZE)
    }
}

impl Arena {
    pub fn new(block_size: usize) -> Self {
        Self {
            blocks: vec![Vec::with_capacity(block_size)],
            block_size,
        }
    }

    /// Copy `value` into the arena and return a stable handle to it.
    ///
    /// Two calls with equal strings may land in different blocks — the
    /// arena never interns.
    pub fn add(&mut self, value: &str) -> ArenaSpan {
        let bytes = value.as_bytes();

        if let Some((block, free)) = self
            .blocks
            .iter()
            .enumerate()
            .find(|(_, b)| b.capacity() - b.len() >= bytes.len())
        {
            let _ = free;
            let start = self.blocks[block].len();
            self.blocks[block].extend_from_slice(bytes);
            return ArenaSpan { block, start, len: bytes.len() };
        }

        // No existing block fits; allocate a new one (oversize if needed).
        let new_block_cap = self.block_size.max(bytes.len());
        let mut block = Vec::with_capacity(new_block_cap);
        block.extend_from_slice(bytes);
        self.blocks.push(block);
        ArenaSpan { block: self.blocks.len() - 1, start: 0, len: bytes.len() }
    }

    pub fn resolve(&self, span: ArenaSpan) -> &str {
        let bytes = &self.blocks[span.block][span.start..span.start + span.len];
        // SAFETY-free: every byte slice ever copied in via `add` came from a
        // `&str`, so it is valid UTF-8 by construction.
        std::str::from_utf8(bytes).expect("arena span always holds bytes copied from a &str")
    }

    /// Drop every block but the first, and clear that one.
    pub fn clear(&mut self) {
        self.blocks.truncate(1);
        self.blocks[0].clear();
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}
