use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use parking_lot::{Condvar, Mutex};

use crate::common::types::{FrameId, PageData, PageId};
use crate::storage::buffer::config::BufferPoolConfig;
use crate::storage::buffer::error::Result;
use crate::storage::buffer::frame::{FrameDescriptor, FrameIo};
use crate::storage::buffer::replacer::ClockReplacer;
use crate::storage::disk::{DiskManager, FileDiskManager};

mod basic_operations;
mod frame_management;

/// How the content of a frame is produced when a pin misses the pool
#[derive(Debug, Clone, Copy)]
pub enum PinMode<'a> {
    /// Read the page from disk
    DiskRead,
    /// Copy the supplied bytes into the frame, no disk I/O
    MemoryCopy(&'a PageData),
    /// Leave the frame bytes as they are; the caller fills the page
    NoOp,
}

impl PinMode<'_> {
    /// Copied content has never been written to disk
    fn marks_dirty(&self) -> bool {
        matches!(self, PinMode::MemoryCopy(_))
    }

    fn name(&self) -> &'static str {
        match self {
            PinMode::DiskRead => "disk-read",
            PinMode::MemoryCopy(_) => "memory-copy",
            PinMode::NoOp => "no-op",
        }
    }
}

/// Whether the holder modified a page before unpinning it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dirtiness {
    Clean,
    Dirty,
}

impl Dirtiness {
    pub fn is_dirty(self) -> bool {
        self == Dirtiness::Dirty
    }
}

impl From<bool> for Dirtiness {
    fn from(is_dirty: bool) -> Self {
        if is_dirty { Dirtiness::Dirty } else { Dirtiness::Clean }
    }
}

/// Everything guarded by the pool-wide lock
pub(crate) struct PoolState {
    pub(crate) frames: Vec<FrameDescriptor>,
    pub(crate) page_table: HashMap<PageId, FrameId>,
    pub(crate) replacer: ClockReplacer,
}

/// Caches disk pages in a fixed set of frames.
///
/// Frame metadata, the page table and the clock hand live behind a single
/// mutex. Disk reads and writes run with that mutex released; the frame
/// involved is marked with a [`FrameIo`] state and callers that need it wait
/// on `io_done` until the I/O finishes.
///
/// Page bytes are handed out as [`PagePtr`](crate::common::types::PagePtr)
/// handles that stay valid while the page is pinned. Drop any guard taken on
/// a handle before unpinning it.
pub struct BufferPoolManager {
    pub(crate) num_frames: usize,
    pub(crate) state: Mutex<PoolState>,
    pub(crate) io_done: Condvar,
    pub(crate) disk_manager: Arc<dyn DiskManager>,
}

impl BufferPoolManager {
    pub fn new(config: BufferPoolConfig, disk_manager: Arc<dyn DiskManager>) -> Result<Self> {
        let num_frames = config.validate()?;
        let frames = (0..num_frames).map(|_| FrameDescriptor::new()).collect();

        Ok(Self {
            num_frames,
            state: Mutex::new(PoolState {
                frames,
                page_table: HashMap::with_capacity(num_frames),
                replacer: ClockReplacer::new(),
            }),
            io_done: Condvar::new(),
            disk_manager,
        })
    }

    /// Create a pool backed by a database file at `db_path`
    pub fn open(num_frames: i64, db_path: impl AsRef<Path>) -> Result<Self> {
        let disk_manager = Arc::new(FileDiskManager::new(db_path)?);
        Self::new(BufferPoolConfig::default().with_num_frames(num_frames), disk_manager)
    }

    /// Total number of frames, fixed for the pool's lifetime
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Number of resident pages nobody holds a pin on. Frames in the middle
    /// of a load are not counted; a page being flushed is.
    pub fn num_unpinned(&self) -> usize {
        let state = self.state.lock();
        state
            .frames
            .iter()
            .filter(|frame| {
                frame.is_valid() && frame.pin_count() == 0 && frame.io() != FrameIo::Loading
            })
            .count()
    }

    pub fn contains_page(&self, page_id: PageId) -> bool {
        let mut state = self.state.lock();
        self.lookup_frame(&mut state, page_id, false).is_some()
    }

    /// Pin count of a resident page
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let mut state = self.state.lock();
        let frame_id = self.lookup_frame(&mut state, page_id, false)?;
        Some(state.frames[frame_id as usize].pin_count())
    }

    /// Dirty flag of a resident page
    pub fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        let mut state = self.state.lock();
        let frame_id = self.lookup_frame(&mut state, page_id, false)?;
        Some(state.frames[frame_id as usize].is_dirty())
    }

    /// Get a reference to the disk manager
    pub fn disk_manager(&self) -> Arc<dyn DiskManager> {
        Arc::clone(&self.disk_manager)
    }
}
