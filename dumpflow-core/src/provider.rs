/*!
The capability surface a snapshot data source must expose.

A provider hands the writer everything that ends up in the dump: the
system identity, loaded modules, threads with optionally sampled
register contexts, memory region metadata and the raw bytes of the
memory ranges. Only [`DumpProvider::system_info`] and
[`DumpProvider::read_bytes`] are mandatory, the remaining operations
default to empty so a minimal provider implements just that pair.
*/

use crate::architecture::ProcessorArchitecture;
use crate::error::{Error, Result};
use crate::format::context::RegisterMap;
use crate::format::memory::{page_protect, region_type};

use std::collections::BTreeMap;

use log::warn;

/// CPU and OS identity of the dumped system.
///
/// Optional fields fall back to fixed defaults when left `None`:
/// processor level 6 (the Pentium II baseline), processor revision
/// `0x5e03`, one processor, a workstation product on the NT platform.
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub processor_architecture: ProcessorArchitecture,
    pub major_version: u32,
    pub minor_version: u32,
    pub build_number: u32,
    pub processor_level: Option<u16>,
    pub processor_revision: Option<u16>,
    pub number_of_processors: Option<u8>,
    pub product_type: Option<u8>,
    pub platform_id: Option<u32>,
}

impl SystemInfo {
    /// Creates a system info record with only the required fields set.
    pub fn new(
        processor_architecture: ProcessorArchitecture,
        major_version: u32,
        minor_version: u32,
        build_number: u32,
    ) -> Self {
        Self {
            processor_architecture,
            major_version,
            minor_version,
            build_number,
            processor_level: None,
            processor_revision: None,
            number_of_processors: None,
            product_type: None,
            platform_id: None,
        }
    }
}

/// One loaded image.
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    pub base_of_image: u64,
    pub size_of_image: u32,
    pub name: String,
    /// Link timestamp of the image, 0 if unknown.
    pub time_date_stamp: u32,
}

/// Per-thread snapshot data, keyed by thread id in the thread map.
///
/// The context is a sparse register sample; an empty map means no
/// context was captured and the thread record's context location stays
/// zeroed.
#[derive(Debug, Clone, Default)]
pub struct ThreadInfo {
    pub priority: u32,
    pub priority_class: u32,
    pub teb: u64,
    pub context: RegisterMap,
}

/// Threads keyed by id. Records are emitted in ascending id order.
pub type ThreadMap = BTreeMap<u32, ThreadInfo>;

/// A page protection value, either a resolved `PAGE_*` code or an
/// `"rwx"`-style triplet resolved through a fixed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protection {
    Raw(u32),
    Symbolic(String),
}

impl Protection {
    /// Resolves to the numeric protection code.
    ///
    /// A string outside the fixed table is a fatal error.
    pub fn resolve(&self) -> Result<u32> {
        match self {
            Protection::Raw(value) => Ok(*value),
            Protection::Symbolic(value) => match value.as_str() {
                "---" => Ok(page_protect::NOACCESS),
                "r--" => Ok(page_protect::READONLY),
                "-w-" => Ok(page_protect::READWRITE),
                "rw-" => Ok(page_protect::READWRITE),
                "--x" => Ok(page_protect::EXECUTE),
                "r-x" => Ok(page_protect::EXECUTE_READ),
                "-wx" => Ok(page_protect::EXECUTE_READWRITE),
                "rwx" => Ok(page_protect::EXECUTE_READWRITE),
                _ => {
                    warn!("unknown protection string: {}", value);
                    Err(Error::Flags("unknown protection string"))
                }
            },
        }
    }
}

impl From<u32> for Protection {
    fn from(value: u32) -> Self {
        Protection::Raw(value)
    }
}

impl From<&str> for Protection {
    fn from(value: &str) -> Self {
        Protection::Symbolic(value.into())
    }
}

/// A region type value, either a resolved `MEM_*` code or one of
/// `"Private"`, `"Mapped"`, `"Image"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionType {
    Raw(u32),
    Symbolic(String),
}

impl RegionType {
    /// Resolves to the numeric region type code.
    ///
    /// A string outside the fixed table is a fatal error.
    pub fn resolve(&self) -> Result<u32> {
        match self {
            RegionType::Raw(value) => Ok(*value),
            RegionType::Symbolic(value) => match value.as_str() {
                "Private" => Ok(region_type::PRIVATE),
                "Mapped" => Ok(region_type::MAPPED),
                "Image" => Ok(region_type::IMAGE),
                _ => {
                    warn!("unknown region type string: {}", value);
                    Err(Error::Flags("unknown region type string"))
                }
            },
        }
    }
}

impl Default for RegionType {
    fn default() -> Self {
        RegionType::Symbolic("Private".into())
    }
}

impl From<u32> for RegionType {
    fn from(value: u32) -> Self {
        RegionType::Raw(value)
    }
}

impl From<&str> for RegionType {
    fn from(value: &str) -> Self {
        RegionType::Symbolic(value.into())
    }
}

/// Metadata of one virtual memory region, independent of the bulk
/// memory ranges.
#[derive(Debug, Clone)]
pub struct MemoryRegionInfo {
    pub base_address: u64,
    /// Base of the enclosing allocation; `None` falls back to
    /// `base_address`.
    pub allocation_base: Option<u64>,
    pub allocation_protect: Protection,
    pub protect: Protection,
    pub region_size: u64,
    pub region_type: RegionType,
}

/// One bulk memory range scheduled for the full-memory stream.
///
/// The tag travels back into [`DumpProvider::read_bytes`] untouched so
/// a provider can precompute per-range lookup state once.
#[derive(Debug, Clone)]
pub struct MemoryRange<Tag> {
    pub start: u64,
    pub size: u64,
    pub tag: Tag,
}

/// A source of process snapshot data.
///
/// Providers are driven synchronously by the writer; calls may be slow
/// but are never retried. A provider that cannot read part of a range
/// must substitute filler bytes itself, a short buffer aborts the
/// whole write.
pub trait DumpProvider {
    /// Opaque per-range state passed from [`DumpProvider::memory_descriptors`]
    /// back into [`DumpProvider::read_bytes`].
    type MemoryTag;

    /// Returns the system identity written to the system info stream.
    fn system_info(&mut self) -> Result<SystemInfo>;

    /// Returns the loaded modules of the dumped process.
    fn modules(&mut self) -> Result<Vec<ModuleInfo>> {
        Ok(Vec::new())
    }

    /// Returns the threads of the dumped process.
    fn threads(&mut self) -> Result<ThreadMap> {
        Ok(ThreadMap::new())
    }

    /// Returns metadata of the virtual memory regions. Only consulted
    /// while the memory info stream is enabled.
    fn memory_info(&mut self) -> Result<Vec<MemoryRegionInfo>> {
        Ok(Vec::new())
    }

    /// Returns the memory ranges whose bytes end up in the dump.
    fn memory_descriptors(&mut self) -> Result<Vec<MemoryRange<Self::MemoryTag>>> {
        Ok(Vec::new())
    }

    /// Reads exactly `size` bytes at `address` from one of the ranges
    /// previously returned by [`DumpProvider::memory_descriptors`].
    fn read_bytes(&mut self, address: u64, size: usize, tag: &Self::MemoryTag)
        -> Result<Vec<u8>>;
}
