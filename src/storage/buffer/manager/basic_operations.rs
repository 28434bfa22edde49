use log::{debug, trace, warn};
use parking_lot::MutexGuard;

use crate::common::types::{PageData, PageId, PagePtr, INVALID_PAGE_ID, PAGE_SIZE};
use crate::storage::buffer::error::{BufferPoolError, Result};
use crate::storage::buffer::frame::FrameIo;
use super::{BufferPoolManager, Dirtiness, PinMode, PoolState};

impl BufferPoolManager {
    /// Pin a page into the pool and return a handle to its bytes.
    ///
    /// A resident page only gains a pin. Otherwise a victim frame is
    /// evicted (written back first if dirty) and filled according to
    /// `mode`. Fails with `PoolExhausted` when every frame is pinned; waits
    /// if the only candidates are busy with disk I/O.
    pub fn pin_page(&self, page_id: PageId, mode: PinMode<'_>) -> Result<PagePtr> {
        if page_id == INVALID_PAGE_ID {
            return Err(BufferPoolError::InvalidPageId(page_id));
        }

        let mut state = self.state.lock();

        let frame_id = loop {
            if let Some(frame_id) = self.lookup_frame(&mut state, page_id, false) {
                let frame = &mut state.frames[frame_id as usize];
                let pin_count = frame.increment_pin();
                frame.set_ref_bit(true);
                trace!("Pin hit: page {} in frame {} (pin count {})", page_id, frame_id, pin_count);
                return Ok(frame.content());
            }

            match self.select_victim(&mut state, page_id)? {
                Some(frame_id) => break frame_id,
                None => self.io_done.wait(&mut state),
            }
        };

        if matches!(mode, PinMode::MemoryCopy(_)) && state.frames[frame_id as usize].pin_count() > 0 {
            return Err(BufferPoolError::AlreadyPinned(page_id));
        }

        self.load_frame(state, frame_id, page_id, mode)
    }

    /// Drop one pin on a page, marking it dirty if the holder modified it.
    /// Dirtiness is sticky until the frame is evicted.
    pub fn unpin_page(&self, page_id: PageId, dirtiness: impl Into<Dirtiness>) -> Result<()> {
        let dirtiness = dirtiness.into();
        let mut state = self.state.lock();

        let frame_id = self
            .lookup_frame(&mut state, page_id, false)
            .ok_or(BufferPoolError::NotFound(page_id))?;
        let frame = &mut state.frames[frame_id as usize];

        let pin_count = frame
            .decrement_pin()
            .ok_or(BufferPoolError::NotPinned(page_id))?;
        if dirtiness.is_dirty() {
            frame.set_dirty(true);
        }

        trace!("Unpinned page {} ({:?}, pin count {})", page_id, dirtiness, pin_count);
        Ok(())
    }

    /// Allocate a run of disk pages and pin the first with `initial` as its content.
    ///
    /// If no frame is free the run stays allocated on disk and is not
    /// reclaimed; the caller gets `PoolExhausted`.
    pub fn allocate_page(&self, run_size: u32, initial: &PageData) -> Result<(PagePtr, PageId)> {
        let page_id = self.disk_manager.allocate_pages(run_size)?;

        match self.pin_page(page_id, PinMode::MemoryCopy(initial)) {
            Ok(page) => {
                debug!("Allocated {} page(s) starting at {}", run_size, page_id);
                Ok((page, page_id))
            }
            Err(e) => {
                warn!(
                    "Leaked disk run of {} page(s) starting at {}: {}",
                    run_size, page_id, e
                );
                Err(e)
            }
        }
    }

    /// Create a new zeroed page
    pub fn new_page(&self) -> Result<(PagePtr, PageId)> {
        self.allocate_page(1, &[0u8; PAGE_SIZE])
    }

    /// Release a page's disk space and its frame. Pages that are not
    /// resident are left alone. A flush in progress finishes first.
    pub fn free_page(&self, page_id: PageId) -> Result<()> {
        let mut state = self.state.lock();

        let Some(frame_id) = self.lookup_frame(&mut state, page_id, true) else {
            return Ok(());
        };
        let PoolState { frames, page_table, .. } = &mut *state;
        let frame = &mut frames[frame_id as usize];

        if frame.pin_count() > 0 {
            return Err(BufferPoolError::PagePinned(page_id));
        }

        self.disk_manager.deallocate_page(page_id)?;
        page_table.remove(&page_id);
        frame.reset();

        debug!("Freed page {} from frame {}", page_id, frame_id);
        Ok(())
    }

    /// Write a resident page to disk if it is dirty.
    ///
    /// Flushing does not clear the dirty flag and leaves the pin count
    /// alone. The write runs with the pool lock released; meanwhile the page
    /// can still be pinned and unpinned but is not evicted or freed.
    pub fn flush_page(&self, page_id: PageId) -> Result<()> {
        let mut state = self.state.lock();

        let frame_id = self
            .lookup_frame(&mut state, page_id, true)
            .ok_or(BufferPoolError::NotFound(page_id))?;
        let frame = &mut state.frames[frame_id as usize];

        if !(frame.is_valid() && frame.is_dirty()) {
            return Ok(());
        }
        frame.set_io(FrameIo::Flushing);
        let content = frame.content();

        let result = MutexGuard::unlocked(&mut state, || {
            let page = content.read();
            self.disk_manager.write_page(page_id, &page.data)
        });

        state.frames[frame_id as usize].set_io(FrameIo::Idle);
        self.io_done.notify_all();
        result?;

        debug!("Flushed page {} from frame {}", page_id, frame_id);
        Ok(())
    }

    /// Flush every resident page that is dirty
    pub fn flush_all_pages(&self) -> Result<()> {
        let page_ids: Vec<PageId> = {
            let state = self.state.lock();
            state
                .page_table
                .iter()
                .filter(|&(_, &frame_id)| {
                    let frame = &state.frames[frame_id as usize];
                    frame.is_valid() && frame.is_dirty()
                })
                .map(|(&page_id, _)| page_id)
                .collect()
        };

        for page_id in page_ids {
            match self.flush_page(page_id) {
                // Evicted since the snapshot; eviction already wrote it
                Ok(()) | Err(BufferPoolError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}
