use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;

use crate::common::types::{PageData, PageId, INVALID_PAGE_ID, PAGE_SIZE};
use crate::storage::disk::disk_manager::{DiskManager, DiskManagerError};

/// Counters of the I/O requests a disk manager has served
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskStats {
    pub reads: u64,
    pub writes: u64,
    pub allocations: u64,
    pub deallocations: u64,
}

/// Pages below `next_page_id` are allocated; only written ones take memory
struct MemoryDisk {
    pages: HashMap<PageId, Box<PageData>>,
    deallocated: HashSet<PageId>,
    next_page_id: PageId,
}

/// Volatile disk manager keeping every page in memory.
///
/// Useful for tests and for pools that never need to outlive the process.
/// Every served request is counted, see [`MemoryDiskManager::stats`].
pub struct MemoryDiskManager {
    disk: Mutex<MemoryDisk>,
    reads: AtomicU64,
    writes: AtomicU64,
    allocations: AtomicU64,
    deallocations: AtomicU64,
}

impl Default for MemoryDiskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDiskManager {
    pub fn new() -> Self {
        Self {
            disk: Mutex::new(MemoryDisk {
                pages: HashMap::new(),
                deallocated: HashSet::new(),
                next_page_id: INVALID_PAGE_ID + 1,
            }),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            allocations: AtomicU64::new(0),
            deallocations: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> DiskStats {
        DiskStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            deallocations: self.deallocations.load(Ordering::Relaxed),
        }
    }

    /// Copy of the persisted bytes of a live page, bypassing the counters
    pub fn page_data(&self, page_id: PageId) -> Option<Box<PageData>> {
        let disk = self.disk.lock();
        Self::check_live(&disk, page_id).ok()?;
        Some(
            disk.pages
                .get(&page_id)
                .cloned()
                .unwrap_or_else(|| Box::new([0u8; PAGE_SIZE])),
        )
    }

    fn check_live(disk: &MemoryDisk, page_id: PageId) -> Result<(), DiskManagerError> {
        if page_id == INVALID_PAGE_ID || page_id >= disk.next_page_id {
            return Err(DiskManagerError::InvalidPageId(page_id));
        }
        if disk.deallocated.contains(&page_id) {
            return Err(DiskManagerError::DeallocatedPage(page_id));
        }
        Ok(())
    }
}

impl DiskManager for MemoryDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut PageData) -> Result<(), DiskManagerError> {
        let disk = self.disk.lock();
        Self::check_live(&disk, page_id)?;
        match disk.pages.get(&page_id) {
            Some(page) => buf.copy_from_slice(&page[..]),
            None => buf.fill(0),
        }
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &PageData) -> Result<(), DiskManagerError> {
        let mut disk = self.disk.lock();
        Self::check_live(&disk, page_id)?;
        disk.pages.insert(page_id, Box::new(*buf));
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn allocate_pages(&self, run_size: u32) -> Result<PageId, DiskManagerError> {
        if run_size == 0 {
            return Err(DiskManagerError::InvalidRunSize(run_size));
        }

        let mut disk = self.disk.lock();
        let first_page_id = disk.next_page_id;
        disk.next_page_id = first_page_id
            .checked_add(run_size)
            .ok_or(DiskManagerError::InvalidRunSize(run_size))?;

        self.allocations.fetch_add(1, Ordering::Relaxed);
        Ok(first_page_id)
    }

    fn deallocate_page(&self, page_id: PageId) -> Result<(), DiskManagerError> {
        let mut disk = self.disk.lock();
        Self::check_live(&disk, page_id)?;
        disk.pages.remove(&page_id);
        disk.deallocated.insert(page_id);
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
