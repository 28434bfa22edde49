// Clockpool: a clock-replacement buffer pool manager

pub mod common;
pub mod storage;

// Re-export key items for convenient access
pub use common::types::{Page, PageData, PageId, PagePtr, INVALID_PAGE_ID, PAGE_SIZE};
pub use storage::buffer::{BufferPoolConfig, BufferPoolError, BufferPoolManager, Dirtiness, PinMode};
pub use storage::disk::{DiskManager, DiskManagerError, FileDiskManager, MemoryDiskManager};
