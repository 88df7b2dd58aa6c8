use super::{DumpState, StreamEncoder};
use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::format::{
    stream_type, LocationDescriptor, Memory64List, MemoryDescriptor64, MinidumpDirectory,
};
use crate::provider::{DumpProvider, MemoryRange};

use std::cmp;
use std::io::{Read, Seek, Write};
use std::mem::size_of;

use dataview::Pod;
use log::debug;

/// Default chunk granularity of the bulk memory copy.
pub const DEFAULT_CHUNK_SIZE: usize = 0x10000;

/// Chunk granularity of the bulk memory copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSize {
    /// Fetch ranges in chunks of at most this many bytes. Must not be
    /// zero.
    Fixed(usize),
    /// Fetch each range with a single provider call regardless of its
    /// size.
    WholeRange,
}

impl Default for ChunkSize {
    fn default() -> Self {
        ChunkSize::Fixed(DEFAULT_CHUNK_SIZE)
    }
}

/// Encodes the 64-bit memory list stream in two phases.
///
/// The first phase writes the list header and one descriptor per
/// range, then reserves the contiguous data region sized to the sum of
/// all ranges; its base offset only exists once every descriptor has
/// been sized. The second phase runs as the stream's post-processor:
/// it re-reads the list header from the file, which is the source of
/// truth for the base offset, and streams every range's bytes into the
/// region in bounded chunks.
pub struct Memory64ListStream<Tag> {
    chunk_size: ChunkSize,
    ranges: Vec<MemoryRange<Tag>>,
}

impl<Tag> Memory64ListStream<Tag> {
    pub fn new(chunk_size: ChunkSize) -> Self {
        Self {
            chunk_size,
            ranges: Vec::new(),
        }
    }
}

impl<T: Read + Write + Seek, P: DumpProvider> StreamEncoder<T, P>
    for Memory64ListStream<P::MemoryTag>
{
    fn stream_type(&self) -> u32 {
        stream_type::MEMORY64_LIST
    }

    fn encode(
        &mut self,
        arena: &mut Arena<T>,
        provider: &mut P,
        _state: &mut DumpState,
    ) -> Result<LocationDescriptor> {
        self.ranges = provider.memory_descriptors()?;

        let list_size =
            size_of::<Memory64List>() + self.ranges.len() * size_of::<MemoryDescriptor64>();
        let list_rva = arena.reserve(list_size)?;

        let mut total_size = 0u64;
        for (index, range) in self.ranges.iter().enumerate() {
            let mut record = MemoryDescriptor64::zeroed();
            record.start_of_memory_range = range.start;
            record.data_size = range.size;
            total_size += range.size;

            let record_rva = list_rva
                + size_of::<Memory64List>() as u64
                + (index * size_of::<MemoryDescriptor64>()) as u64;
            arena.write_at(record_rva, record.as_bytes())?;
        }

        // every descriptor is sized at this point, only now does the
        // contiguous data region come into existence
        let mut list = Memory64List::zeroed();
        list.number_of_memory_ranges = self.ranges.len() as u64;
        list.base_rva = arena.reserve(total_size as usize)?;
        arena.write_at(list_rva, list.as_bytes())?;

        debug!(
            "memory64 list encoded: {} ranges, {:x} bytes of bulk data at {:x}",
            self.ranges.len(),
            total_size,
            list.base_rva
        );

        Ok(LocationDescriptor {
            data_size: list_size as u32,
            rva: list_rva as u32,
        })
    }

    fn post_process(
        &mut self,
        arena: &mut Arena<T>,
        provider: &mut P,
        directory: &MinidumpDirectory,
    ) -> Result<()> {
        if let ChunkSize::Fixed(0) = self.chunk_size {
            return Err(Error::Other("chunk size must not be zero"));
        }

        // the list header on the file is the source of truth for the
        // base offset of the data region
        let mut list = Memory64List::zeroed();
        arena.read_exact_at(directory.location.rva as u64, list.as_bytes_mut())?;

        let mut disk_rva = list.base_rva;
        for range in self.ranges.iter() {
            copy_range(arena, provider, range, self.chunk_size, disk_rva)?;
            disk_rva += range.size;
        }

        Ok(())
    }
}

/// Streams one range from the provider to the file in bounded chunks.
///
/// Every read must return exactly the requested length; a diverging
/// buffer aborts the write, the copy is never padded or truncated.
fn copy_range<T: Read + Write + Seek, P: DumpProvider>(
    arena: &mut Arena<T>,
    provider: &mut P,
    range: &MemoryRange<P::MemoryTag>,
    chunk_size: ChunkSize,
    disk_rva: u64,
) -> Result<()> {
    let mut written = 0u64;
    while written < range.size {
        let request = match chunk_size {
            ChunkSize::Fixed(limit) => cmp::min(limit as u64, range.size - written),
            ChunkSize::WholeRange => range.size - written,
        };

        let buffer = provider.read_bytes(range.start + written, request as usize, &range.tag)?;
        if buffer.len() as u64 != request {
            return Err(Error::ByteCount);
        }

        arena.write_at(disk_rva + written, &buffer)?;
        written += buffer.len() as u64;
    }

    debug!(
        "copied memory range: start={:x} size={:x} rva={:x}",
        range.start, range.size, disk_rva
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::ProcessorArchitecture;
    use crate::provider::SystemInfo;

    use std::io::Cursor;

    struct PatternProvider {
        ranges: Vec<(u64, u64)>,
        reads: Vec<usize>,
        short_read: bool,
    }

    impl PatternProvider {
        fn new(ranges: &[(u64, u64)]) -> Self {
            Self {
                ranges: ranges.to_vec(),
                reads: Vec::new(),
                short_read: false,
            }
        }
    }

    impl DumpProvider for PatternProvider {
        type MemoryTag = u8;

        fn system_info(&mut self) -> Result<SystemInfo> {
            Ok(SystemInfo::new(ProcessorArchitecture::Amd64, 10, 0, 19041))
        }

        fn memory_descriptors(&mut self) -> Result<Vec<MemoryRange<u8>>> {
            Ok(self
                .ranges
                .iter()
                .enumerate()
                .map(|(index, (start, size))| MemoryRange {
                    start: *start,
                    size: *size,
                    tag: index as u8,
                })
                .collect())
        }

        fn read_bytes(&mut self, _address: u64, size: usize, tag: &u8) -> Result<Vec<u8>> {
            self.reads.push(size);
            if self.short_read {
                return Ok(vec![0; size / 2]);
            }
            Ok(vec![0x10 + tag; size])
        }
    }

    fn run(provider: &mut PatternProvider, chunk_size: ChunkSize) -> Result<Vec<u8>> {
        let mut arena = Arena::new(Cursor::new(Vec::new()));
        let mut stream = Memory64ListStream::new(chunk_size);
        let location =
            StreamEncoder::<_, PatternProvider>::encode(&mut stream, &mut arena, provider, &mut DumpState::new())?;

        let mut directory = MinidumpDirectory::zeroed();
        directory.stream_type = stream_type::MEMORY64_LIST;
        directory.location = location;

        StreamEncoder::<_, PatternProvider>::post_process(&mut stream, &mut arena, provider, &directory)?;
        Ok(arena.into_inner().into_inner())
    }

    #[test]
    fn test_two_phase_layout() {
        let mut provider = PatternProvider::new(&[(0x1000, 0x30), (0x8000, 0x20)]);
        let bytes = run(&mut provider, ChunkSize::default()).unwrap();

        let mut list = Memory64List::zeroed();
        list.as_bytes_mut()
            .copy_from_slice(&bytes[0..size_of::<Memory64List>()]);
        assert_eq!(list.number_of_memory_ranges, 2);
        // list + 2 descriptors precede the data region
        assert_eq!(list.base_rva, 0x30);

        let blob = &bytes[list.base_rva as usize..];
        assert_eq!(blob.len(), 0x50);
        assert!(blob[..0x30].iter().all(|b| *b == 0x10));
        assert!(blob[0x30..].iter().all(|b| *b == 0x11));
    }

    #[test]
    fn test_chunked_and_whole_range_are_identical() {
        let ranges = [(0x1000, 0x300), (0x8000, 0x50)];

        let mut provider = PatternProvider::new(&ranges);
        let chunked = run(&mut provider, ChunkSize::Fixed(0x100)).unwrap();
        // 0x300 bytes in 3 chunks, 0x50 in one trailing chunk
        assert_eq!(provider.reads, vec![0x100, 0x100, 0x100, 0x50]);

        let mut provider = PatternProvider::new(&ranges);
        let whole = run(&mut provider, ChunkSize::WholeRange).unwrap();
        assert_eq!(provider.reads, vec![0x300, 0x50]);

        assert_eq!(chunked, whole);
    }

    #[test]
    fn test_short_read_aborts() {
        let mut provider = PatternProvider::new(&[(0x1000, 0x30)]);
        provider.short_read = true;

        assert_eq!(
            run(&mut provider, ChunkSize::default()).unwrap_err(),
            Error::ByteCount
        );
    }

    #[test]
    fn test_zero_chunk_size_aborts() {
        let mut provider = PatternProvider::new(&[(0x1000, 0x30)]);

        assert_eq!(
            run(&mut provider, ChunkSize::Fixed(0)).unwrap_err(),
            Error::Other("chunk size must not be zero")
        );
    }
}
