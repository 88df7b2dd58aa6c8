/*!
Module list records, one fixed record per loaded image.

The module name is stored out-of-line as a length-prefixed UTF-16
string and referenced through `module_name_rva`.
*/

use super::LocationDescriptor;

use std::mem::MaybeUninit;

use dataview::Pod;

/// The fixed version info block embedded in every module record.
///
/// This writer leaves it zeroed, image version data is not part of the
/// provider contract.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct VsFixedFileInfo {
    pub signature: u32,          // 0x0000
    pub struc_version: u32,      // 0x0004
    pub file_version_ms: u32,    // 0x0008
    pub file_version_ls: u32,    // 0x000c
    pub product_version_ms: u32, // 0x0010
    pub product_version_ls: u32, // 0x0014
    pub file_flags_mask: u32,    // 0x0018
    pub file_flags: u32,         // 0x001c
    pub file_os: u32,            // 0x0020
    pub file_type: u32,          // 0x0024
    pub file_subtype: u32,       // 0x0028
    pub file_date_ms: u32,       // 0x002c
    pub file_date_ls: u32,       // 0x0030
} // size: 0x34

unsafe impl Pod for VsFixedFileInfo {}

/// One loaded image.
///
/// The record is byte-packed on disk: `reserved0` follows the two
/// location descriptors without alignment padding.
#[repr(C, packed)]
#[derive(Copy, Clone)]
pub struct MinidumpModule {
    pub base_of_image: u64,               // 0x0000
    pub size_of_image: u32,               // 0x0008
    pub checksum: u32,                    // 0x000c
    pub time_date_stamp: u32,             // 0x0010
    pub module_name_rva: u32,             // 0x0014
    pub version_info: VsFixedFileInfo,    // 0x0018
    pub cv_record: LocationDescriptor,    // 0x004c
    pub misc_record: LocationDescriptor,  // 0x0054
    pub reserved0: u64,                   // 0x005c
    pub reserved1: u64,                   // 0x0064
} // size: 0x6c

impl MinidumpModule {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MinidumpModule {}

/// Header of the module list stream, followed by the module records.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct MinidumpModuleList {
    pub number_of_modules: u32, // 0x0000
} // size: 0x4

impl MinidumpModuleList {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }
}

unsafe impl Pod for MinidumpModuleList {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(size_of::<VsFixedFileInfo>(), 0x34);
        assert_eq!(size_of::<MinidumpModule>(), 0x6c);
        assert_eq!(size_of::<MinidumpModuleList>(), 0x4);
    }

    #[test]
    fn test_module_encoding() {
        let mut module = MinidumpModule::zeroed();
        module.base_of_image = 0x7ff6_0000_0000;
        module.size_of_image = 0x1000;
        module.module_name_rva = 0xdead_beef;

        let bytes = module.as_bytes();
        // packed layout: name rva directly after the three u32 fields
        assert_eq!(&bytes[0x14..0x18], &0xdead_beefu32.to_le_bytes());
        assert_eq!(&bytes[0x5c..0x6c], &[0u8; 0x10][..]);
    }
}
