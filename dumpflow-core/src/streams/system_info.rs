use super::{DumpState, StreamEncoder};
use crate::arena::Arena;
use crate::error::Result;
use crate::format::system_info::{
    platform_id, product_type, PROCESSOR_LEVEL_PENTIUM2, PROCESSOR_REVISION_DEFAULT,
};
use crate::format::{stream_type, LocationDescriptor, MinidumpSystemInfo};
use crate::provider::DumpProvider;

use std::io::{Read, Seek, Write};
use std::mem::size_of;

use dataview::Pod;
use log::debug;

/// Encodes the system info stream and records the discovered
/// architecture for the stages that follow.
pub struct SystemInfoStream;

impl<T: Read + Write + Seek, P: DumpProvider> StreamEncoder<T, P> for SystemInfoStream {
    fn stream_type(&self) -> u32 {
        stream_type::SYSTEM_INFO
    }

    fn encode(
        &mut self,
        arena: &mut Arena<T>,
        provider: &mut P,
        state: &mut DumpState,
    ) -> Result<LocationDescriptor> {
        let info = provider.system_info()?;

        state.arch = info.processor_architecture;
        state.bitness = info.processor_architecture.bits();
        debug!(
            "system architecture {:?} ({} bit)",
            state.arch, state.bitness
        );

        let mut record = MinidumpSystemInfo::zeroed();
        record.processor_architecture = info.processor_architecture.code();
        record.processor_level = info.processor_level.unwrap_or(PROCESSOR_LEVEL_PENTIUM2);
        record.processor_revision = info
            .processor_revision
            .unwrap_or(PROCESSOR_REVISION_DEFAULT);
        record.number_of_processors = info.number_of_processors.unwrap_or(1);
        record.product_type = info.product_type.unwrap_or(product_type::WORKSTATION);
        record.major_version = info.major_version;
        record.minor_version = info.minor_version;
        record.build_number = info.build_number;
        record.platform_id = info.platform_id.unwrap_or(platform_id::WIN32_NT);

        let rva = arena.reserve_write(record.as_bytes())?;

        Ok(LocationDescriptor {
            data_size: size_of::<MinidumpSystemInfo>() as u32,
            rva: rva as u32,
        })
    }
}
