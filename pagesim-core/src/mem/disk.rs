use crate::error::{Error, Result};
use crate::mem::ByteStore;
use crate::params::{DISK_ACCESS_TIME_MS, DISK_SIZE, DISK_TRANSFER_TIME_MS, PAGE_SIZE};

/// Simulated swap disk.
///
/// The same byte-store contract as physical memory over a much larger
/// array, plus whole-frame transfers used by the pager. Disk statistics
/// distinguish accesses (seeks) from transferred bytes because the two
/// carry very different simulated costs.
#[derive(Debug)]
pub struct Disk {
    cells: Box<[u8]>,
    access_reads: u64,
    access_writes: u64,
    transfer_read: u64,
    transfer_write: u64,
}

impl Disk {
    /// Creates a disk of the default [`DISK_SIZE`](../../params/constant.DISK_SIZE.html).
    pub fn new() -> Self {
        Self::with_size(DISK_SIZE)
    }

    /// Creates a disk of `size` bytes, zero-initialized.
    pub fn with_size(size: usize) -> Self {
        Self {
            cells: vec![0u8; size].into_boxed_slice(),
            access_reads: 0,
            access_writes: 0,
            transfer_read: 0,
            transfer_write: 0,
        }
    }

    /// Number of whole frames the disk holds.
    pub fn frame_count(&self) -> usize {
        self.cells.len() / PAGE_SIZE
    }

    /// Reads one full frame from the disk.
    pub fn read_frame(&mut self, disk_frame: usize) -> Result<[u8; PAGE_SIZE]> {
        let base = self.frame_base(disk_frame)?;
        let mut data = [0u8; PAGE_SIZE];
        data.copy_from_slice(&self.cells[base..base + PAGE_SIZE]);
        self.access_reads += 1;
        self.transfer_read += PAGE_SIZE as u64;
        Ok(data)
    }

    /// Writes one full frame to the disk.
    pub fn write_frame(&mut self, disk_frame: usize, data: &[u8; PAGE_SIZE]) -> Result<()> {
        let base = self.frame_base(disk_frame)?;
        self.cells[base..base + PAGE_SIZE].copy_from_slice(data);
        self.access_writes += 1;
        self.transfer_write += PAGE_SIZE as u64;
        Ok(())
    }

    pub fn accesses(&self) -> u64 {
        self.access_reads + self.access_writes
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transfer_read + self.transfer_write
    }

    /// Simulated time spent on disk I/O so far, in milliseconds.
    pub fn io_time_ms(&self) -> u64 {
        self.accesses() * DISK_ACCESS_TIME_MS + self.transferred_bytes() * DISK_TRANSFER_TIME_MS
    }

    pub fn reset_stats(&mut self) {
        self.access_reads = 0;
        self.access_writes = 0;
        self.transfer_read = 0;
        self.transfer_write = 0;
    }

    fn frame_base(&self, disk_frame: usize) -> Result<usize> {
        let base = disk_frame * PAGE_SIZE;
        // A whole-frame transfer must fit entirely inside the store.
        self.check_bounds(base + PAGE_SIZE - 1)?;
        Ok(base)
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

impl Default for Disk {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStore for Disk {
    fn size(&self) -> usize {
        self.cells.len()
    }

    fn read(&mut self, position: usize) -> Result<u8> {
        self.check_bounds(position)?;
        self.access_reads += 1;
        self.transfer_read += 1;
        Ok(self.cells[position])
    }

    fn write(&mut self, position: usize, value: u8) -> Result<()> {
        self.check_bounds(position)?;
        self.cells[position] = value;
        self.access_writes += 1;
        self.transfer_write += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn frame_round_trip() {
        let mut disk = Disk::with_size(PAGE_SIZE * 4);
        let mut frame = [0u8; PAGE_SIZE];
        for (i, cell) in frame.iter_mut().enumerate() {
            *cell = i as u8;
        }
        disk.write_frame(2, &frame).unwrap();
        assert_eq!(disk.read_frame(2).unwrap(), frame);
        assert_eq!(disk.read_frame(1).unwrap(), [0u8; PAGE_SIZE]);
    }

    #[test]
    pub fn frame_bounds_are_checked() {
        let mut disk = Disk::with_size(PAGE_SIZE * 4);
        let frame = [0u8; PAGE_SIZE];
        assert_eq!(
            disk.write_frame(4, &frame).unwrap_err(),
            Error::Bounds {
                position: 4 * PAGE_SIZE + PAGE_SIZE - 1,
                size: 4 * PAGE_SIZE
            }
        );
        assert!(disk.read_frame(100).is_err());
    }

    #[test]
    pub fn byte_level_access() {
        let mut disk = Disk::with_size(PAGE_SIZE * 2);
        disk.write(300, 0x42).unwrap();
        assert_eq!(disk.read(300).unwrap(), 0x42);
        assert_eq!(
            disk.read(2 * PAGE_SIZE).unwrap_err(),
            Error::Bounds {
                position: 2 * PAGE_SIZE,
                size: 2 * PAGE_SIZE
            }
        );
        // A single-byte access is one seek and one transferred byte.
        assert_eq!(disk.accesses(), 2);
        assert_eq!(disk.transferred_bytes(), 2);
    }

    #[test]
    pub fn io_time_accounts_seeks_and_transfers() {
        let mut disk = Disk::with_size(PAGE_SIZE * 4);
        let frame = [7u8; PAGE_SIZE];
        disk.write_frame(0, &frame).unwrap();
        disk.read_frame(0).unwrap();
        assert_eq!(disk.accesses(), 2);
        assert_eq!(disk.transferred_bytes(), 2 * PAGE_SIZE as u64);
        assert_eq!(
            disk.io_time_ms(),
            2 * DISK_ACCESS_TIME_MS + 2 * PAGE_SIZE as u64 * DISK_TRANSFER_TIME_MS
        );

        disk.reset_stats();
        assert_eq!(disk.io_time_ms(), 0);
    }
}
