/*!
Address-space manager.

The [`Mmu`] owns the physical store, the pager and the TLB, and keeps the
per-process page tables and resident-page lists *inside* the physical store
it manages, as plain bytes at computed offsets. The bottom frames of
physical memory are reserved for this metadata; user frames are handed out
above it by a monotonic counter until the store is full, after which every
new page steals the frame of the longest-resident page.
*/

use crate::error::{Error, Result};
use crate::mem::cache::TLBCache;
use crate::mem::disk::Disk;
use crate::mem::pager::Pager;
use crate::mem::phys_mem::PhysicalMemory;
use crate::mem::ByteStore;
use crate::params::{
    MAX_NUMBER_PROCESSES, NB_PAGES_IN_PROCESS_ADDRESS_SPACE, PAGE_SIZE, PTE_SIZE,
};
use crate::types::{PageFlags, PageState, PageTableEntry, Pid};

use hashbrown::HashMap;
use log::{debug, trace};

/// Byte size of one process's page-table slot in the table area.
const TABLE_STRIDE: usize = NB_PAGES_IN_PROCESS_ADDRESS_SPACE * PTE_SIZE;

/// Byte size of one process's resident-list slot: head byte, tail byte,
/// then a ring of one byte per possible resident page.
const LIST_STRIDE: usize = NB_PAGES_IN_PROCESS_ADDRESS_SPACE + LIST_RING_OFFSET;

/// Offset of the ring relative to the list base.
const LIST_RING_OFFSET: usize = 2;

/// Most physical frames the one-byte PTE frame field can index.
const MAX_PHYS_FRAMES: usize = 1 << 8;

/// Most disk frames the two-byte PTE disk-frame field can index.
const MAX_DISK_FRAMES: usize = 1 << 16;

/// The MMU of the simulator.
///
/// Translates `(pid, virtual address)` pairs to physical addresses through
/// page tables embedded in physical memory, paging on demand and evicting
/// the longest-resident page when physical frames run out.
#[derive(Debug)]
pub struct Mmu {
    phys_mem: PhysicalMemory,
    pager: Pager,
    tlb: TLBCache,
    /// Page Table Base Register per process.
    page_table_base: HashMap<Pid, usize>,
    /// Resident-list base per process.
    page_list_base: HashMap<Pid, usize>,
    /// Current number of resident pages per process. Kept out of the byte
    /// store because head/tail alone cannot distinguish an empty ring from
    /// a full one.
    resident_count: HashMap<Pid, usize>,
    frame_count: usize,
    next_frame: usize,
    next_table_offset: usize,
    next_list_offset: usize,
}

impl Mmu {
    /// Creates an MMU over default-sized stores.
    pub fn new() -> Self {
        Self::build(PhysicalMemory::new(), Pager::new(Disk::new()))
    }

    /// Creates an MMU over caller-built stores, e.g. a smaller physical
    /// memory to force eviction early.
    ///
    /// Fails with a capacity error when a store holds more frames than the
    /// page-table entry fields can index: the frame field is one byte and
    /// the disk-frame field two, so anything past that would be silently
    /// truncated inside the table.
    pub fn with_stores(phys_mem: PhysicalMemory, pager: Pager) -> Result<Self> {
        if phys_mem.frame_count() > MAX_PHYS_FRAMES {
            return Err(Error::Capacity(
                "more physical frames than the frame field can index",
            ));
        }
        if pager.disk().frame_count() > MAX_DISK_FRAMES {
            return Err(Error::Capacity(
                "more disk frames than the disk-frame field can index",
            ));
        }
        Ok(Self::build(phys_mem, pager))
    }

    fn build(phys_mem: PhysicalMemory, pager: Pager) -> Self {
        let frame_count = phys_mem.frame_count();
        Self {
            phys_mem,
            pager,
            tlb: TLBCache::new(),
            page_table_base: HashMap::new(),
            page_list_base: HashMap::new(),
            resident_count: HashMap::new(),
            frame_count,
            next_frame: Self::metadata_frames(),
            next_table_offset: 0,
            next_list_offset: TABLE_STRIDE * MAX_NUMBER_PROCESSES,
        }
    }

    /// Number of bottom frames reserved for page tables and resident lists.
    fn metadata_frames() -> usize {
        let metadata_bytes = (TABLE_STRIDE + LIST_STRIDE) * MAX_NUMBER_PROCESSES;
        (metadata_bytes + PAGE_SIZE - 1) / PAGE_SIZE
    }

    /// Registers a process and creates its page table and resident list.
    ///
    /// `size` is the byte length of the valid address space; pages covering
    /// it are marked allocated-but-not-resident and everything beyond is
    /// left unallocated. No physical frame is assigned here: frames are
    /// bound on first touch only.
    pub fn reserve_memory(&mut self, pid: Pid, size: usize) -> Result<()> {
        if self.page_table_base.contains_key(&pid) {
            return Err(Error::ProcessExists(pid));
        }
        if self.page_table_base.len() >= MAX_NUMBER_PROCESSES {
            return Err(Error::Capacity("process table is full"));
        }
        if size > self.phys_mem.size() {
            return Err(Error::Capacity("reservation exceeds the memory size"));
        }
        let pages = (size + PAGE_SIZE - 1) / PAGE_SIZE;
        if pages > NB_PAGES_IN_PROCESS_ADDRESS_SPACE {
            return Err(Error::Capacity("reservation exceeds the address space"));
        }

        let table_base = self.next_table_offset;
        let list_base = self.next_list_offset;

        for page in 0..NB_PAGES_IN_PROCESS_ADDRESS_SPACE {
            let entry = if page < pages {
                PageTableEntry::reserved()
            } else {
                PageTableEntry::unallocated()
            };
            self.write_pte(table_base + page * PTE_SIZE, &entry)?;
        }
        // Empty ring: head and tail both at zero.
        self.phys_mem.write(list_base, 0)?;
        self.phys_mem.write(list_base + 1, 0)?;

        // Commit the registers only once the metadata is in place.
        self.next_table_offset += TABLE_STRIDE;
        self.next_list_offset += LIST_STRIDE;
        self.page_table_base.insert(pid, table_base);
        self.page_list_base.insert(pid, list_base);
        self.resident_count.insert(pid, 0);

        debug!(
            "reserve_memory: pid={} size={} pages={} table_base={} list_base={}",
            pid, size, pages, table_base, list_base
        );
        Ok(())
    }

    /// Reads the byte at `vaddr` in the process's address space.
    pub fn read(&mut self, pid: Pid, vaddr: usize) -> Result<u8> {
        let paddr = self.translate(pid, vaddr, false)?;
        self.phys_mem.read(paddr)
    }

    /// Writes the byte at `vaddr` in the process's address space and marks
    /// the page dirty.
    pub fn write(&mut self, pid: Pid, vaddr: usize, value: u8) -> Result<()> {
        let paddr = self.translate(pid, vaddr, true)?;
        self.phys_mem.write(paddr, value)
    }

    /// Copies one whole frame out of physical memory.
    ///
    /// Used by the eviction path before a frame is recycled; also a raw
    /// inspection hook for tests.
    pub fn get_page(&mut self, frame: usize) -> Result<[u8; PAGE_SIZE]> {
        let base = self.frame_base(frame)?;
        let mut data = [0u8; PAGE_SIZE];
        for (i, cell) in data.iter_mut().enumerate() {
            *cell = self.phys_mem.read(base + i)?;
        }
        Ok(data)
    }

    /// Overwrites one whole frame of physical memory.
    pub fn replace_page(&mut self, frame: usize, data: &[u8; PAGE_SIZE]) -> Result<()> {
        let base = self.frame_base(frame)?;
        for (i, cell) in data.iter().enumerate() {
            self.phys_mem.write(base + i, *cell)?;
        }
        Ok(())
    }

    /// Read-only view of physical memory, for statistics.
    pub fn phys_mem(&self) -> &PhysicalMemory {
        &self.phys_mem
    }

    /// Read-only view of the swap disk, for statistics.
    pub fn disk(&self) -> &Disk {
        self.pager.disk()
    }

    /// Read-only view of the TLB, for statistics.
    pub fn tlb(&self) -> &TLBCache {
        &self.tlb
    }

    /// Translates a virtual address, faulting the page in if needed, and
    /// returns the physical address.
    fn translate(&mut self, pid: Pid, vaddr: usize, for_write: bool) -> Result<usize> {
        let table_base = self.table_base(pid)?;
        if vaddr >= self.phys_mem.size() {
            return Err(Error::Bounds {
                position: vaddr,
                size: self.phys_mem.size(),
            });
        }
        let page = vaddr / PAGE_SIZE;
        let offset = vaddr % PAGE_SIZE;
        if page >= NB_PAGES_IN_PROCESS_ADDRESS_SPACE {
            return Err(Error::PageNotReserved { pid, vaddr });
        }
        let pte_addr = table_base + page * PTE_SIZE;

        // Fast path. Evictions invalidate their victim's entry, so a hit
        // implies the page is still resident.
        if let Some(frame) = self.tlb.lookup(pid, page) {
            if for_write {
                self.mark_dirty(pte_addr)?;
            }
            return Ok(frame * PAGE_SIZE + offset);
        }

        let mut pte = self.read_pte(pte_addr)?;
        let frame = match pte.state() {
            PageState::Unallocated => return Err(Error::PageNotReserved { pid, vaddr }),
            PageState::Resident => pte.frame as usize,
            PageState::Reserved | PageState::SwappedOut => {
                self.page_fault(pid, page, &mut pte)?
            }
        };
        if for_write {
            pte.flags.insert(PageFlags::DIRTY);
        }
        self.write_pte(pte_addr, &pte)?;
        self.tlb.insert(pid, page, frame);

        Ok(frame * PAGE_SIZE + offset)
    }

    /// Makes `page` resident: binds a frame (evicting if necessary) and
    /// loads the page content back from disk when it was swapped out.
    /// The caller writes the updated entry back to the page table.
    fn page_fault(&mut self, pid: Pid, page: usize, pte: &mut PageTableEntry) -> Result<usize> {
        trace!("page fault: pid={} page={}", pid, page);

        let frame = self.take_free_frame(pid)?;
        pte.frame = frame as u8;
        if pte.flags.contains(PageFlags::ON_DISK) {
            let data = self.pager.page_in(pte.disk_frame as usize)?;
            self.replace_page(frame, &data)?;
        }
        pte.flags.remove(PageFlags::INVALID);

        self.push_resident(pid, page)?;
        Ok(frame)
    }

    /// Hands out the next free physical frame, or recycles one by evicting
    /// the longest-resident page once the store is exhausted.
    fn take_free_frame(&mut self, pid: Pid) -> Result<usize> {
        if self.next_frame < self.frame_count {
            let frame = self.next_frame;
            self.next_frame += 1;
            return Ok(frame);
        }
        self.evict_one(pid)
    }

    /// Pages out the victim at the tail of a resident list and returns its
    /// recycled frame. The faulting process's own list is preferred; when
    /// that list is empty (first touch under full memory) any process with
    /// resident pages serves instead.
    fn evict_one(&mut self, pid: Pid) -> Result<usize> {
        let victim_pid = if self.resident_count.get(&pid).copied().unwrap_or(0) > 0 {
            pid
        } else {
            self.resident_count
                .iter()
                .find(|(_, &count)| count > 0)
                .map(|(&p, _)| p)
                .ok_or(Error::Capacity("no resident page left to evict"))?
        };

        let list_base = self.list_base(victim_pid)?;
        let tail = self.phys_mem.read(list_base + 1)? as usize;
        let victim_page = self.phys_mem.read(list_base + LIST_RING_OFFSET + tail)? as usize;
        let next_tail = (tail + 1) % NB_PAGES_IN_PROCESS_ADDRESS_SPACE;
        self.phys_mem.write(list_base + 1, next_tail as u8)?;
        if let Some(count) = self.resident_count.get_mut(&victim_pid) {
            *count -= 1;
        }

        let pte_addr = self.table_base(victim_pid)? + victim_page * PTE_SIZE;
        let mut pte = self.read_pte(pte_addr)?;
        let frame = pte.frame as usize;

        let data = self.get_page(frame)?;
        if pte.flags.contains(PageFlags::ON_DISK) {
            // The page already owns a disk frame from an earlier eviction.
            self.pager.page_out_at(&data, pte.disk_frame as usize)?;
        } else {
            let disk_frame = self.pager.page_out(&data)?;
            pte.disk_frame = disk_frame as u16;
            pte.flags.insert(PageFlags::ON_DISK);
        }
        pte.flags.insert(PageFlags::INVALID);
        self.write_pte(pte_addr, &pte)?;
        self.tlb.invalidate(victim_pid, victim_page);

        debug!(
            "evict: pid={} page={} frame={} disk_frame={}",
            victim_pid, victim_page, frame, pte.disk_frame
        );
        Ok(frame)
    }

    /// Pushes a freshly resident page onto the head of the process's ring.
    fn push_resident(&mut self, pid: Pid, page: usize) -> Result<()> {
        let list_base = self.list_base(pid)?;
        let head = self.phys_mem.read(list_base)? as usize;
        self.phys_mem
            .write(list_base + LIST_RING_OFFSET + head, page as u8)?;
        let next_head = (head + 1) % NB_PAGES_IN_PROCESS_ADDRESS_SPACE;
        self.phys_mem.write(list_base, next_head as u8)?;
        if let Some(count) = self.resident_count.get_mut(&pid) {
            *count += 1;
        }
        Ok(())
    }

    fn read_pte(&mut self, pte_addr: usize) -> Result<PageTableEntry> {
        let mut raw = [0u8; PTE_SIZE];
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = self.phys_mem.read(pte_addr + i)?;
        }
        Ok(PageTableEntry::from_bytes(raw))
    }

    fn write_pte(&mut self, pte_addr: usize, pte: &PageTableEntry) -> Result<()> {
        let raw = pte.to_bytes();
        for (i, byte) in raw.iter().enumerate() {
            self.phys_mem.write(pte_addr + i, *byte)?;
        }
        Ok(())
    }

    /// Sets the dirty bit without rewriting the rest of the entry.
    fn mark_dirty(&mut self, pte_addr: usize) -> Result<()> {
        let flags = PageFlags::from_bits_truncate(self.phys_mem.read(pte_addr)?);
        self.phys_mem
            .write(pte_addr, (flags | PageFlags::DIRTY).bits())
    }

    fn table_base(&self, pid: Pid) -> Result<usize> {
        self.page_table_base
            .get(&pid)
            .copied()
            .ok_or(Error::ProcessUnknown(pid))
    }

    fn list_base(&self, pid: Pid) -> Result<usize> {
        self.page_list_base
            .get(&pid)
            .copied()
            .ok_or(Error::ProcessUnknown(pid))
    }

    fn frame_base(&self, frame: usize) -> Result<usize> {
        if frame >= self.frame_count {
            return Err(Error::Bounds {
                position: frame * PAGE_SIZE,
                size: self.phys_mem.size(),
            });
        }
        Ok(frame * PAGE_SIZE)
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}
