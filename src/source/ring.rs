use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Frame, FrameSource};

/// Thread-safe ring buffer for camera frames.
///
/// A camera thread pushes frames; the pipeline reads the latest one.
/// Frames are wrapped in `Arc` so readers get a cheap reference-counted
/// pointer instead of cloning multi-megabyte pixel buffers.
pub struct FrameRing {
    slots: Mutex<RingSlots>,
    capacity: usize,
    /// Monotonic counter incremented on each push, independent of the
    /// camera's own timestamps.
    sequence: AtomicU64,
}

struct RingSlots {
    frames: Vec<Option<Arc<Frame>>>,
    write_idx: usize,
}

impl FrameRing {
    /// Create a new ring with the given capacity (at least one slot).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Mutex::new(RingSlots {
                frames: (0..capacity).map(|_| None).collect(),
                write_idx: 0,
            }),
            capacity,
            sequence: AtomicU64::new(0),
        }
    }

    /// Push a new frame, overwriting the oldest if full.
    pub fn push(&self, frame: Frame) {
        let mut slots = self.slots.lock();
        let idx = slots.write_idx;
        slots.frames[idx] = Some(Arc::new(frame));
        slots.write_idx = (idx + 1) % self.capacity;
        self.sequence.fetch_add(1, Ordering::Release);
    }

    /// Number of frames pushed so far.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// The most recently pushed frame, if any.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        let slots = self.slots.lock();
        let latest_idx = if slots.write_idx == 0 {
            self.capacity - 1
        } else {
            slots.write_idx - 1
        };
        slots.frames[latest_idx].clone()
    }
}

impl FrameSource for FrameRing {
    fn is_ready(&self) -> bool {
        self.sequence() > 0
    }

    fn frame(&self) -> Option<Arc<Frame>> {
        self.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(value: u8, timestamp: u64) -> Frame {
        Frame {
            data: vec![value; 4 * 4 * 4],
            width: 4,
            height: 4,
            timestamp_us: timestamp,
        }
    }

    #[test]
    fn ring_returns_none_when_empty() {
        let ring = FrameRing::new(3);
        assert!(ring.latest().is_none());
        assert!(!ring.is_ready());
    }

    #[test]
    fn ring_stores_and_retrieves_latest() {
        let ring = FrameRing::new(3);
        ring.push(make_frame(1, 100));
        ring.push(make_frame(2, 200));

        let latest = ring.latest().unwrap();
        assert_eq!(latest.data[0], 2);
        assert_eq!(latest.timestamp_us, 200);
        assert!(ring.is_ready());
    }

    #[test]
    fn ring_overwrites_oldest_when_full() {
        let ring = FrameRing::new(3);
        for i in 1..=4 {
            ring.push(make_frame(i, u64::from(i) * 100));
        }

        let latest = ring.latest().unwrap();
        assert_eq!(latest.data[0], 4);
        assert_eq!(ring.sequence(), 4);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let ring = FrameRing::new(0);
        ring.push(make_frame(9, 1));
        assert_eq!(ring.latest().unwrap().data[0], 9);
    }

    #[test]
    fn snapshot_reads_through_trait() {
        let ring = FrameRing::new(2);
        ring.push(make_frame(7, 10));
        let frame = ring.snapshot().unwrap();
        assert_eq!(frame.timestamp_us, 10);
    }

    #[test]
    fn concurrent_push_and_read_do_not_panic() {
        let ring = Arc::new(FrameRing::new(3));
        let writer = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || {
                for i in 0..200u64 {
                    ring.push(make_frame((i % 255) as u8, i));
                }
            })
        };
        for _ in 0..200 {
            let _ = ring.latest();
        }
        writer.join().unwrap();
        assert_eq!(ring.sequence(), 200);
    }
}
