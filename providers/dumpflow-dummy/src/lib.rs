/*!
A static fixture provider for the dumpflow minidump writer.

The fixture describes a small fictional 32-bit process: three loaded
modules, two threads (one with a sampled register context), two memory
regions worth of metadata and two bulk memory ranges filled with
recognizable byte patterns. It exists to exercise the writer end to
end without touching a live process.

# Examples

```
use std::io::Cursor;
use dumpflow_core::writer::MinidumpWriter;
use dumpflow_dummy::DummyProvider;

let writer = MinidumpWriter::new(Cursor::new(Vec::new()), DummyProvider::new());
let (cursor, _) = writer.write().unwrap();
assert!(!cursor.into_inner().is_empty());
```
*/

use dumpflow_core::architecture::ProcessorArchitecture;
use dumpflow_core::error::Result;
use dumpflow_core::provider::{
    DumpProvider, MemoryRange, MemoryRegionInfo, ModuleInfo, Protection, RegionType, SystemInfo,
    ThreadInfo, ThreadMap,
};

/// Provides the static snapshot data of the fixture process.
#[derive(Debug, Default)]
pub struct DummyProvider;

impl DummyProvider {
    pub fn new() -> Self {
        Self
    }
}

impl DumpProvider for DummyProvider {
    type MemoryTag = ();

    fn system_info(&mut self) -> Result<SystemInfo> {
        let mut info = SystemInfo::new(ProcessorArchitecture::Intel, 0xa, 0, 0x295a);
        info.processor_level = Some(6);
        info.processor_revision = Some(0x5e03);
        Ok(info)
    }

    fn modules(&mut self) -> Result<Vec<ModuleInfo>> {
        Ok((0..3u64)
            .map(|index| ModuleInfo {
                base_of_image: 0x10000 + index * 0x20000,
                size_of_image: 0x10000,
                name: format!("c:\\file_{}", index),
                time_date_stamp: 0,
            })
            .collect())
    }

    fn threads(&mut self) -> Result<ThreadMap> {
        let mut threads = ThreadMap::new();
        for index in 0..2u32 {
            let mut info = ThreadInfo::default();
            info.teb = 0x400 + (0x400 * index) as u64;
            info.priority = 40;
            info.priority_class = 40;

            if index == 1 {
                info.context.insert("Eip".into(), 0x100);
                info.context.insert("Eax".into(), 0x1337);
            }

            threads.insert(4 + index * 4, info);
        }
        Ok(threads)
    }

    fn memory_info(&mut self) -> Result<Vec<MemoryRegionInfo>> {
        Ok(vec![
            MemoryRegionInfo {
                base_address: 0x10000,
                allocation_base: None,
                allocation_protect: Protection::from("r-x"),
                protect: Protection::from("r-x"),
                region_size: 0x1000,
                region_type: RegionType::default(),
            },
            MemoryRegionInfo {
                base_address: 0xff0000,
                allocation_base: None,
                allocation_protect: Protection::from("rwx"),
                protect: Protection::from("rwx"),
                region_size: 0x100_0000,
                region_type: RegionType::from("Mapped"),
            },
        ])
    }

    fn memory_descriptors(&mut self) -> Result<Vec<MemoryRange<()>>> {
        Ok(vec![
            MemoryRange {
                start: 0x10000,
                size: 0x300,
                tag: (),
            },
            MemoryRange {
                start: 0x50_0000,
                size: 0x5000,
                tag: (),
            },
        ])
    }

    fn read_bytes(&mut self, address: u64, size: usize, _tag: &()) -> Result<Vec<u8>> {
        // the first range reads as 0x01, everything else as 0x55
        if address >= 0x10000 && address < 0x10300 {
            Ok(vec![0x01; size])
        } else {
            Ok(vec![0x55; size])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dumpflow_core::format::memory::MEM_COMMIT;
    use dumpflow_core::format::{
        stream_type, Context32, Memory64List, MemoryDescriptor64, MemoryInfo, MemoryInfoList,
        MinidumpDirectory, MinidumpHeader, MinidumpModule, MinidumpModuleList, MinidumpString,
        MinidumpThread, MinidumpThreadList,
    };
    use dumpflow_core::writer::MinidumpWriter;

    use std::io::Cursor;
    use std::mem::size_of;

    use dataview::Pod;

    const TIMESTAMP: u32 = 0x5f39_0c00;

    fn read_record<R: Pod + Copy>(bytes: &[u8], offset: usize, mut record: R) -> R {
        record
            .as_bytes_mut()
            .copy_from_slice(&bytes[offset..offset + size_of::<R>()]);
        record
    }

    fn write_dump() -> Vec<u8> {
        let writer = MinidumpWriter::builder(Cursor::new(Vec::new()), DummyProvider::new())
            .timestamp(TIMESTAMP)
            .build();
        let (cursor, _) = writer.write().unwrap();
        cursor.into_inner()
    }

    fn stream_location(bytes: &[u8], stream: u32) -> (u32, u32) {
        let header = read_record(bytes, 0, MinidumpHeader::zeroed());
        for index in 0..header.number_of_streams as usize {
            let directory = read_record(
                bytes,
                header.stream_directory_rva as usize + index * size_of::<MinidumpDirectory>(),
                MinidumpDirectory::zeroed(),
            );
            if directory.stream_type == stream {
                return (directory.location.rva, directory.location.data_size);
            }
        }
        panic!("stream {} not present in directory", stream);
    }

    #[test]
    fn test_module_list() {
        let bytes = write_dump();
        let (rva, _) = stream_location(&bytes, stream_type::MODULE_LIST);

        let list = read_record(&bytes, rva as usize, MinidumpModuleList::zeroed());
        assert_eq!(list.number_of_modules, 3);

        for index in 0..3usize {
            let record = read_record(
                &bytes,
                rva as usize + size_of::<MinidumpModuleList>() + index * size_of::<MinidumpModule>(),
                MinidumpModule::zeroed(),
            );
            assert_eq!({ record.base_of_image }, 0x10000 + index as u64 * 0x20000);
            assert_eq!({ record.size_of_image }, 0x10000);

            // decode the out-of-line name string
            let name_rva = { record.module_name_rva } as usize;
            let prefix = read_record(&bytes, name_rva, MinidumpString::zeroed());
            let expected = format!("c:\\file_{}", index);
            assert_eq!(prefix.length as usize, expected.len() * 2);

            let text = &bytes[name_rva + 4..name_rva + 4 + prefix.length as usize];
            let units: Vec<u16> = text
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            assert_eq!(String::from_utf16(&units).unwrap(), expected);

            // terminated by two zero bytes behind the text
            assert_eq!(
                &bytes[name_rva + 4 + prefix.length as usize..][..2],
                &[0, 0]
            );
        }
    }

    #[test]
    fn test_thread_list() {
        let bytes = write_dump();
        let (rva, _) = stream_location(&bytes, stream_type::THREAD_LIST);

        let list = read_record(&bytes, rva as usize, MinidumpThreadList::zeroed());
        assert_eq!(list.number_of_threads, 2);

        let first = read_record(
            &bytes,
            rva as usize + size_of::<MinidumpThreadList>(),
            MinidumpThread::zeroed(),
        );
        assert_eq!(first.thread_id, 4);
        assert_eq!(first.teb, 0x400);
        assert_eq!(first.priority, 40);
        assert_eq!(first.thread_context.data_size, 0);

        let second = read_record(
            &bytes,
            rva as usize + size_of::<MinidumpThreadList>() + size_of::<MinidumpThread>(),
            MinidumpThread::zeroed(),
        );
        assert_eq!(second.thread_id, 8);
        assert_eq!(second.teb, 0x800);
        assert_eq!(
            second.thread_context.data_size as usize,
            size_of::<Context32>()
        );

        let context = read_record(
            &bytes,
            second.thread_context.rva as usize,
            Context32::zeroed(),
        );
        assert_eq!(context.eip, 0x100);
        assert_eq!(context.eax, 0x1337);

        // everything outside the sampled registers stays zero
        let mut expected = Context32::zeroed();
        expected.eip = 0x100;
        expected.eax = 0x1337;
        assert_eq!(context.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn test_memory_info_list() {
        let bytes = write_dump();
        let (rva, _) = stream_location(&bytes, stream_type::MEMORY_INFO_LIST);

        let list = read_record(&bytes, rva as usize, MemoryInfoList::zeroed());
        assert_eq!(list.number_of_entries, 2);
        assert_eq!(list.size_of_entry as usize, size_of::<MemoryInfo>());

        let first = read_record(
            &bytes,
            rva as usize + size_of::<MemoryInfoList>(),
            MemoryInfo::zeroed(),
        );
        assert_eq!(first.base_address, 0x10000);
        assert_eq!(first.allocation_base, 0x10000);
        assert_eq!(first.protect, 0x20);
        assert_eq!(first.state, MEM_COMMIT);
        assert_eq!(first.region_type, 0x2_0000);

        let second = read_record(
            &bytes,
            rva as usize + size_of::<MemoryInfoList>() + size_of::<MemoryInfo>(),
            MemoryInfo::zeroed(),
        );
        assert_eq!(second.base_address, 0xff0000);
        assert_eq!(second.protect, 0x40);
        assert_eq!(second.region_type, 0x4_0000);
    }

    #[test]
    fn test_bulk_memory_layout() {
        let bytes = write_dump();
        let (rva, _) = stream_location(&bytes, stream_type::MEMORY64_LIST);

        let list = read_record(&bytes, rva as usize, Memory64List::zeroed());
        assert_eq!(list.number_of_memory_ranges, 2);

        let first = read_record(
            &bytes,
            rva as usize + size_of::<Memory64List>(),
            MemoryDescriptor64::zeroed(),
        );
        assert_eq!(first.start_of_memory_range, 0x10000);
        assert_eq!(first.data_size, 0x300);

        let second = read_record(
            &bytes,
            rva as usize + size_of::<Memory64List>() + size_of::<MemoryDescriptor64>(),
            MemoryDescriptor64::zeroed(),
        );
        assert_eq!(second.start_of_memory_range, 0x50_0000);
        assert_eq!(second.data_size, 0x5000);

        // the data region is the concatenation of both ranges
        let blob = &bytes[list.base_rva as usize..];
        assert_eq!(blob.len(), 0x5300);
        assert!(blob[..0x300].iter().all(|b| *b == 0x01));
        assert!(blob[0x300..].iter().all(|b| *b == 0x55));
    }

    #[test]
    fn test_chunk_size_does_not_change_output() {
        let reference = write_dump();

        let (cursor, _) = MinidumpWriter::builder(Cursor::new(Vec::new()), DummyProvider::new())
            .timestamp(TIMESTAMP)
            .chunk_size(0x100)
            .build()
            .write()
            .unwrap();
        assert_eq!(cursor.into_inner(), reference);

        let (cursor, _) = MinidumpWriter::builder(Cursor::new(Vec::new()), DummyProvider::new())
            .timestamp(TIMESTAMP)
            .whole_range()
            .build()
            .write()
            .unwrap();
        assert_eq!(cursor.into_inner(), reference);
    }

    #[test]
    fn test_header() {
        let bytes = write_dump();
        let header = read_record(&bytes, 0, MinidumpHeader::zeroed());

        assert_eq!(header.signature, 0x504d_444d);
        assert_eq!(header.number_of_streams, 5);
        assert_eq!(header.time_date_stamp, TIMESTAMP);
        // full memory + ignore inaccessible + full memory info
        assert_eq!(header.flags, 0x2_0802);
    }
}
