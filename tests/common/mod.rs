#![allow(dead_code)]

use std::sync::Arc;
use tempfile::NamedTempFile;
use clockpool::{BufferPoolConfig, BufferPoolManager, MemoryDiskManager, PageData, PAGE_SIZE};
use anyhow::Result;

// Create a temporary database file for testing
pub fn create_temp_db_file() -> Result<(NamedTempFile, String)> {
    let file = NamedTempFile::new()?;
    let path = file.path().to_str().unwrap().to_string();
    Ok((file, path))
}

// Create a buffer pool manager with a temporary database
pub fn create_test_buffer_pool(pool_size: i64) -> Result<(Arc<BufferPoolManager>, NamedTempFile)> {
    let (file, path) = create_temp_db_file()?;
    let buffer_pool = Arc::new(BufferPoolManager::open(pool_size, path)?);
    Ok((buffer_pool, file))
}

// Create a buffer pool manager over an in-memory disk whose I/O counters can be inspected
pub fn create_memory_buffer_pool(pool_size: i64) -> Result<(Arc<BufferPoolManager>, Arc<MemoryDiskManager>)> {
    let disk = Arc::new(MemoryDiskManager::new());
    let config = BufferPoolConfig::default().with_num_frames(pool_size);
    let buffer_pool = Arc::new(BufferPoolManager::new(config, disk.clone())?);
    Ok((buffer_pool, disk))
}

// Page content starting with `prefix`, zero padded
pub fn page_with(prefix: &[u8]) -> PageData {
    let mut data = [0u8; PAGE_SIZE];
    data[..prefix.len()].copy_from_slice(prefix);
    data
}

// Generate test data of specified size
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}
