use std::sync::Arc;
use parking_lot::RwLock;

use crate::common::types::{Page, PageData, PageId, PagePtr, INVALID_PAGE_ID};

/// Disk I/O the manager is running on a frame outside the pool lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameIo {
    #[default]
    Idle,
    /// The old page is being written back or the new one read in. The frame
    /// must not be touched until the load finishes.
    Loading,
    /// The page is being written out. It may still be pinned and unpinned,
    /// but not evicted, freed or flushed again.
    Flushing,
}

/// Per-frame bookkeeping of the buffer pool.
///
/// Holds no I/O logic: the manager decides when a frame is loaded, flushed
/// or torn down and uses these accessors to record it. An invalid frame is
/// always unpinned, clean and bound to `INVALID_PAGE_ID`.
#[derive(Debug)]
pub struct FrameDescriptor {
    content: PagePtr,
    page_id: PageId,
    dirty: bool,
    valid: bool,
    pin_count: u32,
    ref_bit: bool,
    io: FrameIo,
}

impl Default for FrameDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDescriptor {
    pub fn new() -> Self {
        Self {
            content: Arc::new(RwLock::new(Page::new(INVALID_PAGE_ID))),
            page_id: INVALID_PAGE_ID,
            dirty: false,
            valid: false,
            pin_count: 0,
            ref_bit: false,
            io: FrameIo::Idle,
        }
    }

    /// Handle to the frame's page buffer
    pub fn content(&self) -> PagePtr {
        Arc::clone(&self.content)
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    pub fn increment_pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.pin_count
    }

    /// Drop one pin; `None` if the frame was not pinned
    pub fn decrement_pin(&mut self) -> Option<u32> {
        self.pin_count = self.pin_count.checked_sub(1)?;
        Some(self.pin_count)
    }

    pub fn ref_bit(&self) -> bool {
        self.ref_bit
    }

    pub fn set_ref_bit(&mut self, ref_bit: bool) {
        self.ref_bit = ref_bit;
    }

    pub fn io(&self) -> FrameIo {
        self.io
    }

    pub fn set_io(&mut self, io: FrameIo) {
        self.io = io;
    }

    /// Whether the replacer may hand this frame out
    pub fn is_evictable(&self) -> bool {
        self.io == FrameIo::Idle && (!self.valid || self.pin_count == 0)
    }

    /// Attach a freshly loaded page, pinned once by the caller
    pub fn bind(&mut self, page_id: PageId, dirty: bool) {
        self.content.write().page_id = page_id;
        self.page_id = page_id;
        self.valid = true;
        self.dirty = dirty;
        self.pin_count = 1;
        self.ref_bit = true;
    }

    /// Return to the empty, unbound state. Page bytes and the I/O state are
    /// left as they are.
    pub fn reset(&mut self) {
        self.content.write().page_id = INVALID_PAGE_ID;
        self.page_id = INVALID_PAGE_ID;
        self.valid = false;
        self.dirty = false;
        self.pin_count = 0;
        self.ref_bit = false;
    }

    pub fn replace_content(&mut self, data: &PageData) {
        self.content.write().data.copy_from_slice(data);
    }

    pub fn content_matches(&self, data: &[u8]) -> bool {
        self.content.read().data[..] == *data
    }
}
