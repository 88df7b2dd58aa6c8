/*!
The system info record, one instance per file.
*/

use std::mem::MaybeUninit;

use dataview::Pod;

/// Default processor level, the Pentium II / Pentium Pro baseline.
pub const PROCESSOR_LEVEL_PENTIUM2: u16 = 6;

/// Default processor revision.
pub const PROCESSOR_REVISION_DEFAULT: u16 = 0x5e03;

/// Product type codes for the `product_type` field.
pub mod product_type {
    pub const WORKSTATION: u8 = 1;
    pub const DOMAIN_CONTROLLER: u8 = 2;
    pub const SERVER: u8 = 3;
}

/// Platform identifiers for the `platform_id` field.
pub mod platform_id {
    pub const WIN32S: u32 = 0;
    pub const WIN32_WINDOWS: u32 = 1;
    pub const WIN32_NT: u32 = 2;
}

/// Opaque per-vendor CPU identification block.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct CpuInformation {
    pub data: [u8; 24], // 0x0000
} // size: 0x18

unsafe impl Pod for CpuInformation {}

/// CPU and OS identity of the dumped system.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MinidumpSystemInfo {
    pub processor_architecture: u16, // 0x0000
    pub processor_level: u16,        // 0x0002
    pub processor_revision: u16,     // 0x0004
    pub number_of_processors: u8,    // 0x0006
    pub product_type: u8,            // 0x0007
    pub major_version: u32,          // 0x0008
    pub minor_version: u32,          // 0x000c
    pub build_number: u32,           // 0x0010
    pub platform_id: u32,            // 0x0014
    pub csd_version_rva: u32,        // 0x0018
    pub suite_mask: u16,             // 0x001c
    pub reserved2: u16,              // 0x001e
    pub cpu: CpuInformation,         // 0x0020
} // size: 0x38

impl MinidumpSystemInfo {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MinidumpSystemInfo {}
