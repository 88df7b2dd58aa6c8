/*!
The per-stream translation pipeline.

Every stream the writer produces is handled by a [`StreamEncoder`]:
it pulls its data from the provider, encodes it into on-disk records
through the arena and returns the location descriptor for the stream's
directory slot. A stream may additionally carry a post-processing phase
which runs after its directory entry has been written back to the file
and may perform further bulk I/O based on the re-readable directory
state. Only the 64-bit memory list uses that phase.

The registry order is fixed: system info, module list, thread list,
memory info list, memory64 list. Bulk memory goes last so its
potentially enormous body never blocks the construction of the smaller
streams and its post-processing can assume everything else is final.
*/

pub mod memory64_list;
pub mod memory_info_list;
pub mod module_list;
pub mod system_info;
pub mod thread_list;

pub use memory64_list::{ChunkSize, Memory64ListStream};
pub use memory_info_list::MemoryInfoListStream;
pub use module_list::ModuleListStream;
pub use system_info::SystemInfoStream;
pub use thread_list::ThreadListStream;

use crate::arena::Arena;
use crate::architecture::ProcessorArchitecture;
use crate::error::Result;
use crate::format::{LocationDescriptor, MinidumpDirectory};

/// State discovered mid-write and threaded into later stages.
///
/// The system info stream records the architecture it encoded here;
/// the thread list stream keys its context record shape off it. The
/// state lives for a single write operation.
#[derive(Debug, Clone, Copy)]
pub struct DumpState {
    pub arch: ProcessorArchitecture,
    pub bitness: u8,
}

impl DumpState {
    pub fn new() -> Self {
        Self {
            arch: ProcessorArchitecture::Unknown,
            bitness: 32,
        }
    }
}

impl Default for DumpState {
    fn default() -> Self {
        Self::new()
    }
}

/// One stream of the dump.
///
/// `encode` fetches from the provider and writes the stream body;
/// `post_process` runs after the directory slot has been patched and
/// rewritten, with the slot contents re-read from the file.
pub trait StreamEncoder<T, P> {
    /// The stream type code written into the directory.
    fn stream_type(&self) -> u32;

    /// Fetches the stream's data and encodes it through the arena.
    fn encode(
        &mut self,
        arena: &mut Arena<T>,
        provider: &mut P,
        state: &mut DumpState,
    ) -> Result<LocationDescriptor>;

    /// Optional second phase, runs once the directory entry is durable.
    fn post_process(
        &mut self,
        _arena: &mut Arena<T>,
        _provider: &mut P,
        _directory: &MinidumpDirectory,
    ) -> Result<()> {
        Ok(())
    }
}
