/*!
Binary page-table entry layout.

An entry occupies [`PTE_SIZE`](../../params/constant.PTE_SIZE.html) bytes
inside physical memory: a flag byte, a physical frame byte, and a two-byte
big-endian disk frame number.
*/

use crate::params::PTE_SIZE;

bitflags! {
    /// Flag bits of a page-table entry.
    pub struct PageFlags: u8 {
        /// The page is not backed by a physical frame right now.
        const INVALID  = 1 << 0;
        /// The page belongs to the reserved address space.
        const USED     = 1 << 1;
        /// Reserved for a clock/second-chance policy; never set by the
        /// current replacement policies.
        const CLOCK    = 1 << 2;
        /// The page content has been written to a disk frame at least once;
        /// the disk frame number in the entry is valid.
        const ON_DISK  = 1 << 3;
        /// The page was translated for a write since it became resident.
        const DIRTY    = 1 << 4;
    }
}

/// The residency state encoded by an entry's flag bits.
///
/// Every entry is in exactly one of these states at all times.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PageState {
    /// `USED` clear: the page is outside the reserved address space.
    Unallocated,
    /// `USED` set, `INVALID` set, `ON_DISK` clear: part of the address
    /// space but never materialized in a frame.
    Reserved,
    /// `USED` set, `INVALID` clear: backed by the physical frame recorded
    /// in the entry.
    Resident,
    /// `USED`, `INVALID` and `ON_DISK` set: content lives in the disk frame
    /// recorded in the entry.
    SwappedOut,
}

/// Decoded form of one page-table entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PageTableEntry {
    pub flags: PageFlags,
    /// Physical frame number; meaningful only when the entry is resident.
    pub frame: u8,
    /// Disk frame number; meaningful only when `ON_DISK` is set.
    pub disk_frame: u16,
}

impl PageTableEntry {
    /// An all-zero entry, i.e. an unallocated page.
    pub fn unallocated() -> Self {
        Self {
            flags: PageFlags::empty(),
            frame: 0,
            disk_frame: 0,
        }
    }

    /// An entry for a page that belongs to the address space but has no
    /// frame yet (pure demand paging reserves nothing up front).
    pub fn reserved() -> Self {
        Self {
            flags: PageFlags::USED | PageFlags::INVALID,
            frame: 0,
            disk_frame: 0,
        }
    }

    pub fn from_bytes(raw: [u8; PTE_SIZE]) -> Self {
        Self {
            flags: PageFlags::from_bits_truncate(raw[0]),
            frame: raw[1],
            disk_frame: u16::from_be_bytes([raw[2], raw[3]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; PTE_SIZE] {
        let disk = self.disk_frame.to_be_bytes();
        [self.flags.bits(), self.frame, disk[0], disk[1]]
    }

    pub fn state(&self) -> PageState {
        if !self.flags.contains(PageFlags::USED) {
            PageState::Unallocated
        } else if !self.flags.contains(PageFlags::INVALID) {
            PageState::Resident
        } else if self.flags.contains(PageFlags::ON_DISK) {
            PageState::SwappedOut
        } else {
            PageState::Reserved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn state_classification() {
        assert_eq!(PageTableEntry::unallocated().state(), PageState::Unallocated);
        assert_eq!(PageTableEntry::reserved().state(), PageState::Reserved);

        let resident = PageTableEntry {
            flags: PageFlags::USED,
            frame: 42,
            disk_frame: 0,
        };
        assert_eq!(resident.state(), PageState::Resident);

        // A page that came back from disk stays resident while keeping its
        // disk frame number for later reuse.
        let resident_with_disk_copy = PageTableEntry {
            flags: PageFlags::USED | PageFlags::ON_DISK,
            frame: 42,
            disk_frame: 7,
        };
        assert_eq!(resident_with_disk_copy.state(), PageState::Resident);

        let swapped = PageTableEntry {
            flags: PageFlags::USED | PageFlags::INVALID | PageFlags::ON_DISK,
            frame: 0,
            disk_frame: 513,
        };
        assert_eq!(swapped.state(), PageState::SwappedOut);
    }

    #[test]
    pub fn codec() {
        let entry = PageTableEntry {
            flags: PageFlags::USED | PageFlags::DIRTY,
            frame: 0xab,
            disk_frame: 0x0102,
        };
        let raw = entry.to_bytes();
        assert_eq!(raw, [0b1_0010, 0xab, 0x01, 0x02]);
        assert_eq!(PageTableEntry::from_bytes(raw), entry);
    }

    #[test]
    pub fn unknown_flag_bits_are_dropped() {
        let entry = PageTableEntry::from_bytes([0xff, 0, 0, 0]);
        assert_eq!(entry.flags, PageFlags::all());
    }
}
