use super::{DumpState, StreamEncoder};
use crate::arena::Arena;
use crate::error::Result;
use crate::format::memory::MEM_COMMIT;
use crate::format::{stream_type, LocationDescriptor, MemoryInfo, MemoryInfoList};
use crate::provider::DumpProvider;

use std::io::{Read, Seek, Write};
use std::mem::size_of;

use dataview::Pod;
use log::debug;

/// Encodes the memory info list stream.
///
/// Regions are always recorded as committed. A region without an
/// allocation base inherits its own base address.
pub struct MemoryInfoListStream;

impl<T: Read + Write + Seek, P: DumpProvider> StreamEncoder<T, P> for MemoryInfoListStream {
    fn stream_type(&self) -> u32 {
        stream_type::MEMORY_INFO_LIST
    }

    fn encode(
        &mut self,
        arena: &mut Arena<T>,
        provider: &mut P,
        _state: &mut DumpState,
    ) -> Result<LocationDescriptor> {
        let regions = provider.memory_info()?;

        let list_size = size_of::<MemoryInfoList>() + regions.len() * size_of::<MemoryInfo>();
        let list_rva = arena.reserve(list_size)?;

        let mut list = MemoryInfoList::zeroed();
        list.size_of_header = size_of::<MemoryInfoList>() as u32;
        list.size_of_entry = size_of::<MemoryInfo>() as u32;
        list.number_of_entries = regions.len() as u64;
        arena.write_at(list_rva, list.as_bytes())?;

        for (index, region) in regions.iter().enumerate() {
            let mut record = MemoryInfo::zeroed();
            record.base_address = region.base_address;
            record.allocation_base = region.allocation_base.unwrap_or(region.base_address);
            record.allocation_protect = region.allocation_protect.resolve()?;
            record.protect = region.protect.resolve()?;
            record.region_size = region.region_size;
            record.state = MEM_COMMIT;
            record.region_type = region.region_type.resolve()?;

            let record_rva = list_rva
                + size_of::<MemoryInfoList>() as u64
                + (index * size_of::<MemoryInfo>()) as u64;
            arena.write_at(record_rva, record.as_bytes())?;
        }

        debug!("memory info list encoded: {} regions", regions.len());

        Ok(LocationDescriptor {
            data_size: list_size as u32,
            rva: list_rva as u32,
        })
    }
}
