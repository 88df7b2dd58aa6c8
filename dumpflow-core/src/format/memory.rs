/*!
Bulk memory and memory info records.

The 64-bit memory list consists of a header, the descriptor array and a
single contiguous data region starting at `base_rva`. The descriptor
array is fully written and sized before that region is allocated, so
`base_rva` becomes known only at the end of the first encoding phase.
*/

use std::mem::MaybeUninit;

use dataview::Pod;

/// Region state recorded for every memory info entry.
pub const MEM_COMMIT: u32 = 0x1000;

/// Page protection codes for the `protect`/`allocation_protect` fields.
pub mod page_protect {
    pub const NOACCESS: u32 = 0x01;
    pub const READONLY: u32 = 0x02;
    pub const READWRITE: u32 = 0x04;
    pub const EXECUTE: u32 = 0x10;
    pub const EXECUTE_READ: u32 = 0x20;
    pub const EXECUTE_READWRITE: u32 = 0x40;
}

/// Region type codes for the `region_type` field.
pub mod region_type {
    pub const PRIVATE: u32 = 0x2_0000;
    pub const MAPPED: u32 = 0x4_0000;
    pub const IMAGE: u32 = 0x100_0000;
}

/// One bulk memory range: start address and byte count.
///
/// The range's bytes live in the contiguous data region, at the offset
/// obtained by summing the sizes of all preceding descriptors.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MemoryDescriptor64 {
    pub start_of_memory_range: u64, // 0x0000
    pub data_size: u64,             // 0x0008
} // size: 0x10

impl MemoryDescriptor64 {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MemoryDescriptor64 {}

/// Header of the 64-bit memory list stream.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct Memory64List {
    pub number_of_memory_ranges: u64, // 0x0000
    pub base_rva: u64,                // 0x0008
} // size: 0x10

impl Memory64List {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for Memory64List {}

/// Header of the memory info list stream.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MemoryInfoList {
    pub size_of_header: u32,    // 0x0000
    pub size_of_entry: u32,     // 0x0004
    pub number_of_entries: u64, // 0x0008
} // size: 0x10

impl MemoryInfoList {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MemoryInfoList {}

/// Metadata of one virtual memory region.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MemoryInfo {
    pub base_address: u64,       // 0x0000
    pub allocation_base: u64,    // 0x0008
    pub allocation_protect: u32, // 0x0010
    pub alignment1: u32,         // 0x0014
    pub region_size: u64,        // 0x0018
    pub state: u32,              // 0x0020
    pub protect: u32,            // 0x0024
    pub region_type: u32,        // 0x0028
    pub alignment2: u32,         // 0x002c
} // size: 0x30

impl MemoryInfo {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MemoryInfo {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(size_of::<MemoryDescriptor64>(), 0x10);
        assert_eq!(size_of::<Memory64List>(), 0x10);
        assert_eq!(size_of::<MemoryInfoList>(), 0x10);
        assert_eq!(size_of::<MemoryInfo>(), 0x30);
    }

    #[test]
    fn test_struct_members() {
        let info = MemoryInfo::zeroed();
        assert_eq!(
            &info.region_size as *const _ as usize - &info as *const _ as usize,
            0x18
        );
        assert_eq!(
            &info.state as *const _ as usize - &info as *const _ as usize,
            0x20
        );
        assert_eq!(
            &info.region_type as *const _ as usize - &info as *const _ as usize,
            0x28
        );
    }
}
