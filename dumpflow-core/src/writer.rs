/*!
The minidump writer.

A write is a strictly sequential three step machine: the fixed header,
then one directory slot per registered stream with a zeroed location,
then the stream bodies in file order. For each slot the writer re-reads
the slot from the file to recover its stream type, encodes the stream
through its [`StreamEncoder`], patches the slot with the real location
and finally runs the stream's post-processor if it has one.

`write` consumes the writer, so a finished (or failed) write can never
be re-entered. The backing file is neither synced nor closed here, that
is left to the caller, as is discarding the output of a failed write.
*/

use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::format::{
    stream_type, DumpFlags, MinidumpDirectory, MinidumpHeader, MINIDUMP_SIGNATURE,
    MINIDUMP_VERSION,
};
use crate::provider::DumpProvider;
use crate::streams::{
    ChunkSize, DumpState, Memory64ListStream, MemoryInfoListStream, ModuleListStream,
    StreamEncoder, SystemInfoStream, ThreadListStream,
};

use std::io::{Read, Seek, Write};
use std::mem::size_of;
use std::time::{SystemTime, UNIX_EPOCH};

use dataview::Pod;
use log::info;

fn unix_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as u32)
        .unwrap_or_default()
}

/// Encodes one process snapshot into a minidump file.
pub struct MinidumpWriter<T, P: DumpProvider> {
    arena: Arena<T>,
    provider: P,
    streams: Vec<Box<dyn StreamEncoder<T, P>>>,
    timestamp: Option<u32>,
}

impl<T, P> MinidumpWriter<T, P>
where
    T: Read + Write + Seek,
    P: DumpProvider,
    P::MemoryTag: 'static,
{
    /// Creates a writer with the default configuration.
    pub fn new(file: T, provider: P) -> Self {
        Self::builder(file, provider).build()
    }

    /// Creates a builder for a customized writer.
    pub fn builder(file: T, provider: P) -> MinidumpWriterBuilder<T, P> {
        MinidumpWriterBuilder {
            file,
            provider,
            chunk_size: ChunkSize::default(),
            memory_info: true,
            timestamp: None,
        }
    }

    /// Performs the write and hands back the backing file and the
    /// provider.
    ///
    /// On failure the file is left truncated or partially populated;
    /// the caller is responsible for discarding it.
    pub fn write(mut self) -> Result<(T, P)> {
        let mut state = DumpState::new();

        let directory_rva = self.write_header()?;
        self.write_directory_skeleton(directory_rva)?;
        self.write_stream_bodies(directory_rva, &mut state)?;

        let written = self.arena.end()?;
        info!(
            "dump written: {} streams, {:#x} bytes",
            self.streams.len(),
            written
        );

        Ok((self.arena.into_inner(), self.provider))
    }

    fn has_stream(&self, stream_type: u32) -> bool {
        self.streams
            .iter()
            .any(|stream| stream.stream_type() == stream_type)
    }

    fn dump_flags(&self) -> DumpFlags {
        let mut flags = DumpFlags::empty();
        if self.has_stream(stream_type::MEMORY64_LIST) {
            flags |= DumpFlags::WITH_FULL_MEMORY | DumpFlags::IGNORE_INACCESSIBLE_MEMORY;
        }
        if self.has_stream(stream_type::MEMORY_INFO_LIST) {
            flags |= DumpFlags::WITH_FULL_MEMORY_INFO;
        }
        flags
    }

    fn write_header(&mut self) -> Result<u64> {
        let mut header = MinidumpHeader::zeroed();
        header.signature = MINIDUMP_SIGNATURE;
        header.version = MINIDUMP_VERSION;
        header.number_of_streams = self.streams.len() as u32;
        header.stream_directory_rva = size_of::<MinidumpHeader>() as u32;
        header.time_date_stamp = self.timestamp.unwrap_or_else(unix_timestamp);
        header.flags = self.dump_flags().bits();

        self.arena.write_at(0, header.as_bytes())?;

        Ok(header.stream_directory_rva as u64)
    }

    fn write_directory_skeleton(&mut self, directory_rva: u64) -> Result<()> {
        for (index, stream) in self.streams.iter().enumerate() {
            let mut directory = MinidumpDirectory::zeroed();
            directory.stream_type = stream.stream_type();

            self.arena.write_at(
                directory_rva + (index * size_of::<MinidumpDirectory>()) as u64,
                directory.as_bytes(),
            )?;
        }
        Ok(())
    }

    fn write_stream_bodies(&mut self, directory_rva: u64, state: &mut DumpState) -> Result<()> {
        for index in 0..self.streams.len() {
            let slot_rva = directory_rva + (index * size_of::<MinidumpDirectory>()) as u64;

            // the slot on the file is the source of truth for the
            // stream type of this index
            let mut directory = MinidumpDirectory::zeroed();
            self.arena
                .read_exact_at(slot_rva, directory.as_bytes_mut())?;

            let stream = self
                .streams
                .iter()
                .position(|stream| stream.stream_type() == directory.stream_type)
                .ok_or(Error::Other("no encoder registered for stream type"))?;

            directory.location =
                self.streams[stream].encode(&mut self.arena, &mut self.provider, state)?;
            self.arena.write_at(slot_rva, directory.as_bytes())?;

            self.streams[stream].post_process(&mut self.arena, &mut self.provider, &directory)?;
        }
        Ok(())
    }
}

/// Builder for a [`MinidumpWriter`].
///
/// # Examples
///
/// Using the builder with default values:
/// ```no_run
/// use std::fs::File;
/// use dumpflow_core::provider::DumpProvider;
/// use dumpflow_core::writer::MinidumpWriter;
///
/// fn write_dump<P: DumpProvider<MemoryTag = ()>>(file: File, provider: P) {
///     MinidumpWriter::new(file, provider).write().unwrap();
/// }
/// ```
///
/// Customizing the bulk copy and pinning the header timestamp:
/// ```no_run
/// use std::fs::File;
/// use dumpflow_core::provider::DumpProvider;
/// use dumpflow_core::writer::MinidumpWriter;
///
/// fn write_dump<P: DumpProvider<MemoryTag = ()>>(file: File, provider: P) {
///     MinidumpWriter::builder(file, provider)
///         .whole_range()
///         .timestamp(0x5f00_0000)
///         .build()
///         .write()
///         .unwrap();
/// }
/// ```
pub struct MinidumpWriterBuilder<T, P> {
    file: T,
    provider: P,
    chunk_size: ChunkSize,
    memory_info: bool,
    timestamp: Option<u32>,
}

impl<T, P> MinidumpWriterBuilder<T, P>
where
    T: Read + Write + Seek,
    P: DumpProvider,
    P::MemoryTag: 'static,
{
    /// Sets the chunk granularity of the bulk memory copy.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = ChunkSize::Fixed(chunk_size);
        self
    }

    /// Fetches each bulk memory range with a single provider call.
    pub fn whole_range(mut self) -> Self {
        self.chunk_size = ChunkSize::WholeRange;
        self
    }

    /// Enables or disables the memory info stream. Enabled by default;
    /// when disabled the provider's region metadata is never consulted
    /// and the corresponding header flag stays clear.
    pub fn memory_info(mut self, enabled: bool) -> Self {
        self.memory_info = enabled;
        self
    }

    /// Pins the header timestamp instead of sampling the wall clock,
    /// making repeated writes of the same snapshot byte-identical.
    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Builds the writer with its stream registry in fixed order.
    pub fn build(self) -> MinidumpWriter<T, P> {
        let mut streams: Vec<Box<dyn StreamEncoder<T, P>>> = vec![
            Box::new(SystemInfoStream),
            Box::new(ModuleListStream),
            Box::new(ThreadListStream),
        ];

        if self.memory_info {
            streams.push(Box::new(MemoryInfoListStream));
        }

        // bulk memory stays last so its body never blocks the smaller
        // streams and its post-processing finds everything else final
        streams.push(Box::new(Memory64ListStream::<P::MemoryTag>::new(
            self.chunk_size,
        )));

        MinidumpWriter {
            arena: Arena::new(self.file),
            provider: self.provider,
            streams,
            timestamp: self.timestamp,
        }
    }
}
