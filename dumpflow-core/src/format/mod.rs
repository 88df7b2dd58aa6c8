/*!
Fixed-layout records of the minidump container format.

Every record is a `#[repr(C)]` struct with no implicit padding that is
moved to and from the backing file through its raw byte view, the same
way the coredump headers are handled elsewhere in the stack. Offsets of
all members are asserted in the tests at the bottom of each module.

All multi-byte fields are stored in the byte order of the machine
running the writer, which is little endian on every supported target.
*/

pub mod context;
pub mod memory;
pub mod module;
pub mod system_info;
pub mod thread;

pub use context::{Context32, Context64};
pub use memory::{Memory64List, MemoryDescriptor64, MemoryInfo, MemoryInfoList};
pub use module::{MinidumpModule, MinidumpModuleList, VsFixedFileInfo};
pub use system_info::MinidumpSystemInfo;
pub use thread::{MemoryDescriptor, MinidumpThread, MinidumpThreadList};

use std::mem::MaybeUninit;

use dataview::Pod;

/// Header signature, 'MDMP'.
pub const MINIDUMP_SIGNATURE: u32 = 0x504d_444d;

/// Header version constant mandated by the format.
pub const MINIDUMP_VERSION: u32 = 0xa0ba_a793;

/// Stream type codes of the streams this writer produces.
pub mod stream_type {
    pub const THREAD_LIST: u32 = 3;
    pub const MODULE_LIST: u32 = 4;
    pub const SYSTEM_INFO: u32 = 7;
    pub const MEMORY64_LIST: u32 = 9;
    pub const MEMORY_INFO_LIST: u32 = 16;
}

bitflags! {
    /// Dump type bits stored in the header's `Flags` field.
    pub struct DumpFlags: u64 {
        const WITH_FULL_MEMORY = 0x0000_0002;
        const WITH_FULL_MEMORY_INFO = 0x0000_0800;
        const IGNORE_INACCESSIBLE_MEMORY = 0x0002_0000;
    }
}

/// A (size, offset) pair pointing at encoded bytes elsewhere in the file.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct LocationDescriptor {
    pub data_size: u32, // 0x0000
    pub rva: u32,       // 0x0004
} // size: 0x8

impl LocationDescriptor {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for LocationDescriptor {}

/// The file header, always at offset 0.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MinidumpHeader {
    pub signature: u32,            // 0x0000
    pub version: u32,              // 0x0004
    pub number_of_streams: u32,    // 0x0008
    pub stream_directory_rva: u32, // 0x000c
    pub checksum: u32,             // 0x0010 unused, always zero
    pub time_date_stamp: u32,      // 0x0014
    pub flags: u64,                // 0x0018
} // size: 0x20

impl MinidumpHeader {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MinidumpHeader {}

/// One stream catalog slot of the directory following the header.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MinidumpDirectory {
    pub stream_type: u32,             // 0x0000
    pub location: LocationDescriptor, // 0x0004
} // size: 0xc

impl MinidumpDirectory {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MinidumpDirectory {}

/// Length prefix of an out-of-line UTF-16 string blob.
///
/// The prefix counts the bytes of the encoded text, not the prefix
/// itself and not the two zero bytes terminating the blob.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MinidumpString {
    pub length: u32, // 0x0000
} // size: 0x4

impl MinidumpString {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MinidumpString {}
