use crate::common::types::FrameId;
use crate::storage::buffer::frame::FrameDescriptor;

/// Second-chance (clock) page replacement policy.
///
/// The only state is the clock hand; frame state is read from and written
/// back to the frame table passed into [`ClockReplacer::pick_victim`].
#[derive(Debug, Default)]
pub struct ClockReplacer {
    hand: usize,
}

impl ClockReplacer {
    pub fn new() -> Self {
        Self { hand: 0 }
    }

    /// Index the next sweep starts from
    pub fn hand(&self) -> usize {
        self.hand
    }

    /// Victim selection: sweep at most two full rotations.
    ///
    /// Empty frames win immediately. Pinned frames and frames with disk I/O
    /// in flight are skipped. A set reference bit buys an unpinned frame one
    /// more rotation. `None` means no frame can be evicted right now.
    pub fn pick_victim(&mut self, frames: &mut [FrameDescriptor]) -> Option<FrameId> {
        let num_frames = frames.len();
        if num_frames == 0 {
            return None;
        }
        // The hand may be stale if the caller swapped in a smaller table
        self.hand %= num_frames;

        for _ in 0..num_frames * 2 {
            let current = self.hand;
            let frame = &mut frames[current];
            self.hand = (current + 1) % num_frames;

            if !frame.is_evictable() {
                continue;
            }
            if frame.is_valid() && frame.ref_bit() {
                frame.set_ref_bit(false);
                continue;
            }
            return Some(current as FrameId);
        }

        None
    }
}
