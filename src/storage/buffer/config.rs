use serde::{Deserialize, Serialize};

use crate::storage::buffer::error::{BufferPoolError, Result};

/// Configuration for the buffer pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferPoolConfig {
    /// Number of page frames in the pool. Negative counts fail validation.
    pub num_frames: i64,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            num_frames: 1024, // 8 MB with 8KB pages
        }
    }
}

impl BufferPoolConfig {
    pub fn with_num_frames(mut self, num_frames: i64) -> Self {
        self.num_frames = num_frames;
        self
    }

    /// Check the configuration and return the frame count
    pub fn validate(&self) -> Result<usize> {
        if self.num_frames < 0 {
            return Err(BufferPoolError::InvalidConfiguration(format!(
                "num_frames must not be negative, got {}",
                self.num_frames
            )));
        }

        usize::try_from(self.num_frames).map_err(|_| {
            BufferPoolError::InvalidConfiguration(format!(
                "num_frames {} does not fit in memory",
                self.num_frames
            ))
        })
    }
}
