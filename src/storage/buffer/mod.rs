pub mod config;
pub mod error;
pub mod frame;
pub mod manager;
mod replacer;

pub use config::BufferPoolConfig;
pub use error::BufferPoolError;
pub use frame::{FrameDescriptor, FrameIo};
pub use manager::{BufferPoolManager, Dirtiness, PinMode};
pub use replacer::ClockReplacer;
