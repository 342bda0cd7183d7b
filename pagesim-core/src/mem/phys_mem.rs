use crate::error::{Error, Result};
use crate::mem::ByteStore;
use crate::params::{MEMORY_ACCESS_TIME_MS, MEMORY_SIZE, PAGE_SIZE};

/// Simulated physical memory.
///
/// A fixed-length sequence of byte cells partitioned into frames of
/// [`PAGE_SIZE`](../../params/constant.PAGE_SIZE.html) bytes. All accesses
/// are range-checked and counted; the derived access time is the number of
/// accesses times the per-access cost constant.
#[derive(Debug)]
pub struct PhysicalMemory {
    cells: Box<[u8]>,
    reads: u64,
    writes: u64,
}

impl PhysicalMemory {
    /// Creates a store of the default [`MEMORY_SIZE`](../../params/constant.MEMORY_SIZE.html).
    pub fn new() -> Self {
        Self::with_size(MEMORY_SIZE)
    }

    /// Creates a store of `size` bytes, zero-initialized.
    pub fn with_size(size: usize) -> Self {
        Self {
            cells: vec![0u8; size].into_boxed_slice(),
            reads: 0,
            writes: 0,
        }
    }

    /// Number of whole frames the store holds.
    pub fn frame_count(&self) -> usize {
        self.cells.len() / PAGE_SIZE
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Simulated time spent accessing this store so far, in milliseconds.
    pub fn access_time_ms(&self) -> f64 {
        (self.reads + self.writes) as f64 * MEMORY_ACCESS_TIME_MS
    }

    pub fn reset_stats(&mut self) {
        self.reads = 0;
        self.writes = 0;
    }

    fn check_bounds(&self, position: usize) -> Result<()> {
        if position >= self.cells.len() {
            Err(Error::Bounds {
                position,
                size: self.cells.len(),
            })
        } else {
            Ok(())
        }
    }
}

impl Default for PhysicalMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStore for PhysicalMemory {
    fn size(&self) -> usize {
        self.cells.len()
    }

    fn read(&mut self, position: usize) -> Result<u8> {
        self.check_bounds(position)?;
        self.reads += 1;
        Ok(self.cells[position])
    }

    fn write(&mut self, position: usize, value: u8) -> Result<()> {
        self.check_bounds(position)?;
        self.cells[position] = value;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn read_write_round_trip() {
        let mut mem = PhysicalMemory::with_size(1024);
        mem.write(513, 0x5a).unwrap();
        assert_eq!(mem.read(513).unwrap(), 0x5a);
        assert_eq!(mem.read(512).unwrap(), 0);
    }

    #[test]
    pub fn bounds_are_checked() {
        let mut mem = PhysicalMemory::with_size(1024);
        assert_eq!(
            mem.read(1024).unwrap_err(),
            Error::Bounds {
                position: 1024,
                size: 1024
            }
        );
        assert!(mem.write(4096, 1).is_err());
        // Failed accesses do not count.
        assert_eq!(mem.reads(), 0);
        assert_eq!(mem.writes(), 0);
    }

    #[test]
    pub fn statistics_accumulate() {
        let mut mem = PhysicalMemory::with_size(PAGE_SIZE);
        for i in 0..10 {
            mem.write(i, i as u8).unwrap();
        }
        for i in 0..5 {
            mem.read(i).unwrap();
        }
        assert_eq!(mem.reads(), 5);
        assert_eq!(mem.writes(), 10);
        let expected = 15.0 * MEMORY_ACCESS_TIME_MS;
        assert!((mem.access_time_ms() - expected).abs() < f64::EPSILON);

        mem.reset_stats();
        assert_eq!(mem.reads(), 0);
        assert_eq!(mem.writes(), 0);
    }
}
