use thiserror::Error;
use crate::common::types::PageId;
use crate::storage::disk::DiskManagerError;

#[derive(Error, Debug)]
pub enum BufferPoolError {
    #[error("Buffer pool is exhausted: every frame is pinned")]
    PoolExhausted,
    #[error("Page {0} not found in buffer pool")]
    NotFound(PageId),
    #[error("Page {0} is not pinned")]
    NotPinned(PageId),
    #[error("Frame chosen for page {0} is still pinned")]
    AlreadyPinned(PageId),
    #[error("Page {0} is pinned")]
    PagePinned(PageId),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid page ID: {0}")]
    InvalidPageId(PageId),
    #[error("Storage I/O error: {0}")]
    StorageIo(#[from] DiskManagerError),
}

pub type Result<T> = std::result::Result<T, BufferPoolError>;
