use super::{DumpState, StreamEncoder};
use crate::arena::Arena;
use crate::error::Result;
use crate::format::{stream_type, LocationDescriptor, MinidumpModule, MinidumpModuleList};
use crate::provider::DumpProvider;

use std::io::{Read, Seek, Write};
use std::mem::size_of;

use dataview::Pod;
use log::debug;

/// Encodes the module list stream.
///
/// The list header and the fixed module records are reserved as one
/// block; every module name lands behind that block as an out-of-line
/// string blob referenced by offset.
pub struct ModuleListStream;

impl<T: Read + Write + Seek, P: DumpProvider> StreamEncoder<T, P> for ModuleListStream {
    fn stream_type(&self) -> u32 {
        stream_type::MODULE_LIST
    }

    fn encode(
        &mut self,
        arena: &mut Arena<T>,
        provider: &mut P,
        _state: &mut DumpState,
    ) -> Result<LocationDescriptor> {
        let modules = provider.modules()?;

        let list_size = size_of::<MinidumpModuleList>() + modules.len() * size_of::<MinidumpModule>();
        let list_rva = arena.reserve(list_size)?;

        let mut list = MinidumpModuleList::zeroed();
        list.number_of_modules = modules.len() as u32;
        arena.write_at(list_rva, list.as_bytes())?;

        for (index, module) in modules.iter().enumerate() {
            let mut record = MinidumpModule::zeroed();
            record.base_of_image = module.base_of_image;
            record.size_of_image = module.size_of_image;
            record.time_date_stamp = module.time_date_stamp;
            record.module_name_rva = arena.encode_string(&module.name)? as u32;

            let record_rva = list_rva
                + size_of::<MinidumpModuleList>() as u64
                + (index * size_of::<MinidumpModule>()) as u64;
            arena.write_at(record_rva, record.as_bytes())?;
        }

        debug!("module list encoded: {} modules", modules.len());

        Ok(LocationDescriptor {
            data_size: list_size as u32,
            rva: list_rva as u32,
        })
    }
}
