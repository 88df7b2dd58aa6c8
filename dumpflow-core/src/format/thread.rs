/*!
Thread list records.

Each thread record carries an inline stack descriptor and an
out-of-line location for its CPU context. Threads without a sampled
context leave the context location zeroed.
*/

use super::LocationDescriptor;

use std::mem::MaybeUninit;

use dataview::Pod;

/// A memory range described by a 32-bit location descriptor.
///
/// Used for the stack of a thread record. This writer does not capture
/// stack snapshots so the descriptor stays zeroed.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MemoryDescriptor {
    pub start_of_memory_range: u64,  // 0x0000
    pub memory: LocationDescriptor,  // 0x0008
} // size: 0x10

unsafe impl Pod for MemoryDescriptor {}

/// One execution thread.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MinidumpThread {
    pub thread_id: u32,                     // 0x0000
    pub suspend_count: u32,                 // 0x0004
    pub priority_class: u32,                // 0x0008
    pub priority: u32,                      // 0x000c
    pub teb: u64,                           // 0x0010
    pub stack: MemoryDescriptor,            // 0x0018
    pub thread_context: LocationDescriptor, // 0x0028
} // size: 0x30

impl MinidumpThread {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MinidumpThread {}

/// Header of the thread list stream, followed by the thread records.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MinidumpThreadList {
    pub number_of_threads: u32, // 0x0000
} // size: 0x4

impl MinidumpThreadList {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MinidumpThreadList {}
