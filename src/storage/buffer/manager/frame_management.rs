use log::{debug, warn};
use parking_lot::MutexGuard;

use crate::common::types::{FrameId, PageId, PagePtr};
use crate::storage::buffer::error::{BufferPoolError, Result};
use crate::storage::buffer::frame::FrameIo;
use super::{BufferPoolManager, PinMode, PoolState};

impl BufferPoolManager {
    /// Frame holding `page_id`, if resident.
    ///
    /// Waits while the frame is loading. With `exclusive` it also waits out
    /// a flush, so the caller may tear the frame down or write it itself.
    pub(super) fn lookup_frame(
        &self,
        state: &mut MutexGuard<'_, PoolState>,
        page_id: PageId,
        exclusive: bool,
    ) -> Option<FrameId> {
        loop {
            let &frame_id = state.page_table.get(&page_id)?;
            match state.frames[frame_id as usize].io() {
                FrameIo::Idle => return Some(frame_id),
                FrameIo::Flushing if !exclusive => return Some(frame_id),
                _ => self.io_done.wait(state),
            }
        }
    }

    /// Ask the clock for a victim.
    ///
    /// `Ok(None)` means every candidate is busy with disk I/O and the caller
    /// should wait on `io_done` and retry. `PoolExhausted` means every frame
    /// is pinned.
    pub(super) fn select_victim(&self, state: &mut PoolState, page_id: PageId) -> Result<Option<FrameId>> {
        let PoolState { frames, replacer, .. } = state;

        if let Some(frame_id) = replacer.pick_victim(frames.as_mut_slice()) {
            return Ok(Some(frame_id));
        }
        if frames.iter().any(|frame| frame.io() != FrameIo::Idle && frame.pin_count() == 0) {
            return Ok(None);
        }

        debug!("No victim frame for page {}: all {} frames pinned", page_id, frames.len());
        Err(BufferPoolError::PoolExhausted)
    }

    /// Evict whatever `frame_id` holds and load `page_id` into it, pinned once.
    ///
    /// The frame is marked `Loading` and both page ids stay mapped to it
    /// while the pool lock is released for the write-back and the read, so
    /// concurrent callers for either page wait instead of racing the I/O.
    /// A failed write-back leaves the victim resident and dirty. A failed
    /// read leaves the frame empty.
    pub(super) fn load_frame(
        &self,
        mut state: MutexGuard<'_, PoolState>,
        frame_id: FrameId,
        page_id: PageId,
        mode: PinMode<'_>,
    ) -> Result<PagePtr> {
        let index = frame_id as usize;
        let frame = &mut state.frames[index];
        let victim = frame.is_valid().then(|| (frame.page_id(), frame.is_dirty()));
        let content = frame.content();
        frame.set_io(FrameIo::Loading);
        state.page_table.insert(page_id, frame_id);

        if let Some((old_page_id, true)) = victim {
            let written = MutexGuard::unlocked(&mut state, || {
                let page = content.read();
                self.disk_manager.write_page(old_page_id, &page.data)
            });

            if let Err(e) = written {
                warn!(
                    "Write-back of page {} from frame {} failed, keeping it resident: {}",
                    old_page_id, frame_id, e
                );
                state.page_table.remove(&page_id);
                state.frames[index].set_io(FrameIo::Idle);
                self.io_done.notify_all();
                return Err(e.into());
            }
        }

        if let Some((old_page_id, dirty)) = victim {
            state.page_table.remove(&old_page_id);
            debug!("Evicted page {} from frame {} (dirty: {})", old_page_id, frame_id, dirty);
        }
        state.frames[index].reset();

        let loaded = match mode {
            PinMode::DiskRead => MutexGuard::unlocked(&mut state, || {
                let mut page = content.write();
                self.disk_manager.read_page(page_id, &mut page.data)
            }),
            PinMode::MemoryCopy(data) => {
                state.frames[index].replace_content(data);
                Ok(())
            }
            PinMode::NoOp => Ok(()),
        };

        state.frames[index].set_io(FrameIo::Idle);
        self.io_done.notify_all();

        if let Err(e) = loaded {
            state.page_table.remove(&page_id);
            return Err(e.into());
        }

        let frame = &mut state.frames[index];
        frame.bind(page_id, mode.marks_dirty());
        debug!("Pin miss: loaded page {} into frame {} ({})", page_id, frame_id, mode.name());
        Ok(frame.content())
    }
}
