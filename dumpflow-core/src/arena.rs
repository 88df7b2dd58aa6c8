/*!
The growing-file arena allocator.

Allocation is strictly monotonic: the arena only ever appends to the
backing store and never reuses or frees a region. The end of the file
is read back fresh on every allocation, so exactly one arena must
operate on a given store at a time.
*/

use crate::error::{Error, Result};
use crate::format::MinidumpString;

use std::io::{Read, Seek, SeekFrom, Write};

use dataview::Pod;
use widestring::U16String;

/// Append-only bump allocator over a seekable backing store.
pub struct Arena<T> {
    file: T,
}

impl<T: Read + Write + Seek> Arena<T> {
    pub fn new(file: T) -> Self {
        Self { file }
    }

    /// Returns the backing store.
    pub fn into_inner(self) -> T {
        self.file
    }

    /// Returns the current extent of the backing store.
    pub fn end(&mut self) -> Result<u64> {
        self.file
            .seek(SeekFrom::End(0))
            .map_err(|_| Error::IO("unable to seek to end of file"))
    }

    /// Appends `size` zero bytes and returns the offset where they begin.
    ///
    /// The region is extended by seeking past it and poking a single
    /// zero byte, so reserving a large bulk area does not stream zeros
    /// through the file.
    pub fn reserve(&mut self, size: usize) -> Result<u64> {
        let offset = self.end()?;
        if size > 0 {
            self.file
                .seek(SeekFrom::Start(offset + size as u64 - 1))
                .map_err(|_| Error::IO("unable to seek past reserved region"))?;
            self.file
                .write_all(&[0])
                .map_err(|_| Error::IO("unable to extend reserved region"))?;
        }
        Ok(offset)
    }

    /// Appends `buffer` and returns the offset where it begins.
    pub fn reserve_write(&mut self, buffer: &[u8]) -> Result<u64> {
        let offset = self.reserve(buffer.len())?;
        self.write_at(offset, buffer)?;
        Ok(offset)
    }

    /// Writes `buffer` at an absolute file offset.
    pub fn write_at(&mut self, rva: u64, buffer: &[u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(rva))
            .map_err(|_| Error::IO("unable to seek to write offset"))?;
        self.file
            .write_all(buffer)
            .map_err(|_| Error::IO("unable to write to backing file"))
    }

    /// Reads back an already-written region at an absolute file offset.
    pub fn read_exact_at(&mut self, rva: u64, buffer: &mut [u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(rva))
            .map_err(|_| Error::IO("unable to seek to read offset"))?;
        self.file
            .read_exact(buffer)
            .map_err(|_| Error::IO("unable to read back from backing file"))
    }

    /// Stores `value` as a length-prefixed UTF-16 string blob and
    /// returns the offset of the length prefix.
    ///
    /// The prefix counts the bytes of the encoded text and two zero
    /// bytes terminate the blob, see [`MinidumpString`].
    pub fn encode_string(&mut self, value: &str) -> Result<u64> {
        let encoded = U16String::from_str(value).into_vec();

        let mut prefix = MinidumpString::zeroed();
        prefix.length = (encoded.len() * 2) as u32;

        let mut buffer = Vec::with_capacity(prefix.as_bytes().len() + encoded.len() * 2 + 2);
        buffer.extend_from_slice(prefix.as_bytes());
        for unit in encoded {
            buffer.extend_from_slice(&unit.to_le_bytes());
        }
        buffer.extend_from_slice(&[0, 0]);

        self.reserve_write(&buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reserve_is_monotonic() {
        let mut arena = Arena::new(Cursor::new(Vec::new()));

        assert_eq!(arena.reserve(0x10).unwrap(), 0);
        assert_eq!(arena.reserve(0x8).unwrap(), 0x10);
        assert_eq!(arena.reserve(0).unwrap(), 0x18);
        assert_eq!(arena.reserve(1).unwrap(), 0x18);
        assert_eq!(arena.end().unwrap(), 0x19);
    }

    #[test]
    fn test_reserve_zero_fills() {
        let mut arena = Arena::new(Cursor::new(Vec::new()));
        arena.reserve(0x20).unwrap();

        let buffer = arena.into_inner().into_inner();
        assert_eq!(buffer, vec![0u8; 0x20]);
    }

    #[test]
    fn test_reserve_write_roundtrip() {
        let mut arena = Arena::new(Cursor::new(Vec::new()));
        arena.reserve(4).unwrap();
        let offset = arena.reserve_write(b"abcd").unwrap();
        assert_eq!(offset, 4);

        let mut readback = [0u8; 4];
        arena.read_exact_at(offset, &mut readback).unwrap();
        assert_eq!(&readback, b"abcd");
    }

    #[test]
    fn test_write_at_patches_in_place() {
        let mut arena = Arena::new(Cursor::new(Vec::new()));
        arena.reserve_write(b"xxxx").unwrap();
        arena.write_at(1, b"yy").unwrap();

        let buffer = arena.into_inner().into_inner();
        assert_eq!(&buffer, b"xyyx");
    }

    #[test]
    fn test_encode_string() {
        let mut arena = Arena::new(Cursor::new(Vec::new()));
        let offset = arena.encode_string("ab").unwrap();
        assert_eq!(offset, 0);

        let buffer = arena.into_inner().into_inner();
        // 4 byte length prefix counting the text only, then the
        // utf-16le text, then the two byte terminator
        assert_eq!(
            buffer,
            vec![0x04, 0x00, 0x00, 0x00, 0x61, 0x00, 0x62, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_encode_string_non_ascii() {
        let mut arena = Arena::new(Cursor::new(Vec::new()));
        arena.encode_string("f\u{fc}r").unwrap();

        let buffer = arena.into_inner().into_inner();
        assert_eq!(&buffer[0..4], &[0x06, 0x00, 0x00, 0x00]);
        assert_eq!(&buffer[4..12], &[0x66, 0x00, 0xfc, 0x00, 0x72, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut arena = Arena::new(Cursor::new(Vec::new()));
        arena.reserve(4).unwrap();

        let mut readback = [0u8; 8];
        assert_eq!(
            arena.read_exact_at(0, &mut readback),
            Err(Error::IO("unable to read back from backing file"))
        );
    }
}
