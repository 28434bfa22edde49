use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write, Seek, SeekFrom};
use std::path::Path;
use parking_lot::Mutex;
use thiserror::Error;

use crate::common::types::{PageData, PageId, INVALID_PAGE_ID, PAGE_SIZE};

#[derive(Error, Debug)]
pub enum DiskManagerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid page ID: {0}")]
    InvalidPageId(PageId),
    #[error("Page {0} has been deallocated")]
    DeallocatedPage(PageId),
    #[error("Invalid run size: {0}")]
    InvalidRunSize(u32),
}

/// Block storage underneath the buffer pool.
///
/// Implementations use interior mutability so a single instance can be
/// shared by the pool and by whoever created it.
pub trait DiskManager: Send + Sync {
    /// Fill `buf` with the persisted bytes of `page_id`
    fn read_page(&self, page_id: PageId, buf: &mut PageData) -> Result<(), DiskManagerError>;

    /// Persist `buf` at the location of `page_id`
    fn write_page(&self, page_id: PageId, buf: &PageData) -> Result<(), DiskManagerError>;

    /// Reserve `run_size` contiguous pages and return the first ID
    fn allocate_pages(&self, run_size: u32) -> Result<PageId, DiskManagerError>;

    /// Release the disk space of a single page
    fn deallocate_page(&self, page_id: PageId) -> Result<(), DiskManagerError>;
}

/// FileDiskManager stores pages as a flat array in a single database file
pub struct FileDiskManager {
    db_file: Mutex<File>,
    deallocated: Mutex<HashSet<PageId>>,
}

impl FileDiskManager {
    /// Create a new FileDiskManager with the specified database file
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, DiskManagerError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(db_path)?;

        Ok(Self {
            db_file: Mutex::new(file),
            deallocated: Mutex::new(HashSet::new()),
        })
    }

    /// Number of pages currently backed by the file
    pub fn num_pages(&self) -> Result<u64, DiskManagerError> {
        let file = self.db_file.lock();
        Ok(file.metadata()?.len() / PAGE_SIZE as u64)
    }

    fn check_live(&self, page_id: PageId) -> Result<(), DiskManagerError> {
        if page_id == INVALID_PAGE_ID {
            return Err(DiskManagerError::InvalidPageId(page_id));
        }
        if self.deallocated.lock().contains(&page_id) {
            return Err(DiskManagerError::DeallocatedPage(page_id));
        }
        Ok(())
    }

    /// Calculate the offset of a page in the file
    fn page_offset(page_id: PageId) -> u64 {
        (page_id as u64 - 1) * PAGE_SIZE as u64
    }

    /// Offset of `page_id`, which must lie inside the allocated file
    fn allocated_offset(file: &File, page_id: PageId) -> Result<u64, DiskManagerError> {
        let offset = Self::page_offset(page_id);
        if offset + PAGE_SIZE as u64 > file.metadata()?.len() {
            return Err(DiskManagerError::InvalidPageId(page_id));
        }
        Ok(offset)
    }
}

impl DiskManager for FileDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut PageData) -> Result<(), DiskManagerError> {
        self.check_live(page_id)?;

        let mut file = self.db_file.lock();
        let offset = Self::allocated_offset(&file, page_id)?;

        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;

        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &PageData) -> Result<(), DiskManagerError> {
        self.check_live(page_id)?;

        let mut file = self.db_file.lock();
        let offset = Self::allocated_offset(&file, page_id)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        file.flush()?;

        Ok(())
    }

    fn allocate_pages(&self, run_size: u32) -> Result<PageId, DiskManagerError> {
        if run_size == 0 {
            return Err(DiskManagerError::InvalidRunSize(run_size));
        }

        let file = self.db_file.lock();
        let num_pages = file.metadata()?.len() / PAGE_SIZE as u64;
        let last_page_id = num_pages + run_size as u64;
        if last_page_id > PageId::MAX as u64 {
            return Err(DiskManagerError::InvalidRunSize(run_size));
        }

        // The new pages read back as zeros
        file.set_len(last_page_id * PAGE_SIZE as u64)?;

        Ok((num_pages + 1) as PageId)
    }

    fn deallocate_page(&self, page_id: PageId) -> Result<(), DiskManagerError> {
        self.check_live(page_id)?;

        Self::allocated_offset(&self.db_file.lock(), page_id)?;
        self.deallocated.lock().insert(page_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_disk_manager() -> (FileDiskManager, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let disk = FileDiskManager::new(file.path()).unwrap();
        (disk, file)
    }

    #[test]
    fn test_allocate_run_returns_first_id() {
        let (disk, _file) = create_disk_manager();

        assert_eq!(disk.allocate_pages(3).unwrap(), 1);
        assert_eq!(disk.allocate_pages(1).unwrap(), 4);
        assert_eq!(disk.num_pages().unwrap(), 4);
    }

    #[test]
    fn test_zero_run_rejected() {
        let (disk, _file) = create_disk_manager();
        assert!(matches!(disk.allocate_pages(0), Err(DiskManagerError::InvalidRunSize(0))));
    }

    #[test]
    fn test_write_then_read() {
        let (disk, _file) = create_disk_manager();
        let page_id = disk.allocate_pages(2).unwrap() + 1;

        let mut data = [0u8; PAGE_SIZE];
        data[..5].copy_from_slice(b"hello");
        disk.write_page(page_id, &data).unwrap();

        let mut read_back = [0xFFu8; PAGE_SIZE];
        disk.read_page(page_id, &mut read_back).unwrap();
        assert_eq!(&read_back[..5], b"hello");
        assert!(read_back[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_io_past_end_is_rejected() {
        let (disk, _file) = create_disk_manager();
        disk.allocate_pages(2).unwrap();

        let mut buf = [7u8; PAGE_SIZE];
        assert!(matches!(disk.read_page(3, &mut buf), Err(DiskManagerError::InvalidPageId(3))));
        assert!(matches!(disk.write_page(42, &buf), Err(DiskManagerError::InvalidPageId(42))));
        assert_eq!(disk.num_pages().unwrap(), 2);

        // Allocated but never written pages read as zeros
        disk.read_page(2, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_run_past_last_page_id_rejected() {
        let (disk, _file) = create_disk_manager();
        disk.allocate_pages(2).unwrap();

        assert!(matches!(
            disk.allocate_pages(u32::MAX),
            Err(DiskManagerError::InvalidRunSize(u32::MAX))
        ));
        // Nothing was allocated by the failed request
        assert_eq!(disk.num_pages().unwrap(), 2);
        assert_eq!(disk.allocate_pages(1).unwrap(), 3);
    }

    #[test]
    fn test_invalid_page_id() {
        let (disk, _file) = create_disk_manager();
        let mut buf = [0u8; PAGE_SIZE];
        assert!(matches!(
            disk.read_page(INVALID_PAGE_ID, &mut buf),
            Err(DiskManagerError::InvalidPageId(_))
        ));
    }

    #[test]
    fn test_deallocated_page_rejects_io() {
        let (disk, _file) = create_disk_manager();
        let page_id = disk.allocate_pages(1).unwrap();
        disk.deallocate_page(page_id).unwrap();

        let mut buf = [0u8; PAGE_SIZE];
        assert!(matches!(
            disk.read_page(page_id, &mut buf),
            Err(DiskManagerError::DeallocatedPage(_))
        ));
        assert!(matches!(
            disk.deallocate_page(page_id),
            Err(DiskManagerError::DeallocatedPage(_))
        ));
    }

    #[test]
    fn test_deallocate_unallocated_page() {
        let (disk, _file) = create_disk_manager();
        assert!(matches!(disk.deallocate_page(9), Err(DiskManagerError::InvalidPageId(9))));
    }
}
