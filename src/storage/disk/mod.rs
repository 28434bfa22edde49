pub mod disk_manager;
pub mod memory;

pub use disk_manager::{DiskManager, DiskManagerError, FileDiskManager};
pub use memory::{DiskStats, MemoryDiskManager};
