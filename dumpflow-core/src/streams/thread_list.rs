use super::{DumpState, StreamEncoder};
use crate::arena::Arena;
use crate::error::Result;
use crate::format::context::encode_context;
use crate::format::{stream_type, LocationDescriptor, MinidumpThread, MinidumpThreadList};
use crate::provider::DumpProvider;

use std::io::{Read, Seek, Write};
use std::mem::size_of;

use dataview::Pod;
use log::debug;

/// Encodes the thread list stream.
///
/// Threads with a sampled register context get the encoded context
/// record stored out-of-line; threads without one keep a zeroed
/// context location.
pub struct ThreadListStream;

impl<T: Read + Write + Seek, P: DumpProvider> StreamEncoder<T, P> for ThreadListStream {
    fn stream_type(&self) -> u32 {
        stream_type::THREAD_LIST
    }

    fn encode(
        &mut self,
        arena: &mut Arena<T>,
        provider: &mut P,
        state: &mut DumpState,
    ) -> Result<LocationDescriptor> {
        let threads = provider.threads()?;

        let list_size = size_of::<MinidumpThreadList>() + threads.len() * size_of::<MinidumpThread>();
        let list_rva = arena.reserve(list_size)?;

        let mut list = MinidumpThreadList::zeroed();
        list.number_of_threads = threads.len() as u32;
        arena.write_at(list_rva, list.as_bytes())?;

        for (index, (thread_id, info)) in threads.iter().enumerate() {
            let mut record = MinidumpThread::zeroed();
            record.thread_id = *thread_id;
            record.priority_class = info.priority_class;
            record.priority = info.priority;
            record.teb = info.teb;

            if let Some(context) = encode_context(&info.context, state.arch) {
                let context_rva = arena.reserve_write(&context)?;
                record.thread_context = LocationDescriptor {
                    data_size: context.len() as u32,
                    rva: context_rva as u32,
                };
            }

            let record_rva = list_rva
                + size_of::<MinidumpThreadList>() as u64
                + (index * size_of::<MinidumpThread>()) as u64;
            arena.write_at(record_rva, record.as_bytes())?;
        }

        debug!("thread list encoded: {} threads", threads.len());

        Ok(LocationDescriptor {
            data_size: list_size as u32,
            rva: list_rva as u32,
        })
    }
}
