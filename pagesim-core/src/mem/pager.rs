use crate::error::{Error, Result};
use crate::mem::disk::Disk;
use crate::params::PAGE_SIZE;

use log::trace;

/// Moves whole frames between physical memory and the disk on behalf of
/// the eviction path.
///
/// Disk frames are handed out by a monotonically increasing counter and
/// are never returned to it: a frame is only ever reused by explicitly
/// paging out to the same frame number again, which mirrors the page
/// table's own per-page disk-frame slot.
#[derive(Debug)]
pub struct Pager {
    disk: Disk,
    next_free_frame: usize,
}

impl Pager {
    pub fn new(disk: Disk) -> Self {
        Self {
            disk,
            next_free_frame: 0,
        }
    }

    /// Writes `data` to a freshly allocated disk frame and returns the
    /// frame number. Fails with a capacity error when the disk is full.
    pub fn page_out(&mut self, data: &[u8; PAGE_SIZE]) -> Result<usize> {
        let disk_frame = self.take_free_frame()?;
        self.page_out_at(data, disk_frame)
    }

    /// Writes `data` to an explicit disk frame (the reuse path) and
    /// returns the frame number.
    pub fn page_out_at(&mut self, data: &[u8; PAGE_SIZE], disk_frame: usize) -> Result<usize> {
        trace!("page_out: disk_frame={}", disk_frame);
        self.disk.write_frame(disk_frame, data)?;
        Ok(disk_frame)
    }

    /// Reads one frame back from the disk. The disk frame stays allocated;
    /// a caller that logically frees the slot reuses it by passing the same
    /// frame number to [`page_out_at`](#method.page_out_at) later.
    pub fn page_in(&mut self, disk_frame: usize) -> Result<[u8; PAGE_SIZE]> {
        trace!("page_in: disk_frame={}", disk_frame);
        self.disk.read_frame(disk_frame)
    }

    /// Read-only view of the disk, for statistics.
    pub fn disk(&self) -> &Disk {
        &self.disk
    }

    fn take_free_frame(&mut self) -> Result<usize> {
        if self.next_free_frame >= self.disk.frame_count() {
            return Err(Error::Capacity("the disk is full"));
        }
        let frame = self.next_free_frame;
        self.next_free_frame += 1;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> [u8; PAGE_SIZE] {
        let mut data = [0u8; PAGE_SIZE];
        for (i, cell) in data.iter_mut().enumerate() {
            *cell = i as u8;
        }
        data
    }

    #[test]
    pub fn page_out_then_in() {
        let mut pager = Pager::new(Disk::with_size(PAGE_SIZE * 16));
        let data = pattern();
        pager.page_out(&data).unwrap();
        let frame = pager.page_out(&data).unwrap();
        assert_eq!(frame, 1);
        assert_eq!(pager.page_in(frame).unwrap(), data);
    }

    #[test]
    pub fn frames_are_allocated_monotonically() {
        let mut pager = Pager::new(Disk::with_size(PAGE_SIZE * 16));
        let data = pattern();
        assert_eq!(pager.page_out(&data).unwrap(), 0);
        assert_eq!(pager.page_out(&data).unwrap(), 1);
        // Paging in does not free the frame for the allocator.
        pager.page_in(0).unwrap();
        assert_eq!(pager.page_out(&data).unwrap(), 2);
        // Explicit reuse does not advance the allocator either.
        pager.page_out_at(&data, 0).unwrap();
        assert_eq!(pager.page_out(&data).unwrap(), 3);
    }

    #[test]
    pub fn full_disk_is_a_capacity_error() {
        let mut pager = Pager::new(Disk::with_size(PAGE_SIZE * 2));
        let data = pattern();
        pager.page_out(&data).unwrap();
        pager.page_out(&data).unwrap();
        assert_eq!(
            pager.page_out(&data).unwrap_err(),
            Error::Capacity("the disk is full")
        );
        // Reuse by address still works once the allocator is exhausted.
        assert_eq!(pager.page_out_at(&data, 1).unwrap(), 1);
    }
}
