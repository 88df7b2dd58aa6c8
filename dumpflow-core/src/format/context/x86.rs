/*!
The 32-bit CPU context record.
*/

use std::mem::MaybeUninit;

use dataview::Pod;

/// Legacy x87 floating point state.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct FloatingSaveArea {
    pub control_word: u32,       // 0x0000
    pub status_word: u32,        // 0x0004
    pub tag_word: u32,           // 0x0008
    pub error_offset: u32,       // 0x000c
    pub error_selector: u32,     // 0x0010
    pub data_offset: u32,        // 0x0014
    pub data_selector: u32,      // 0x0018
    pub register_area: [u8; 80], // 0x001c
    pub cr0_npx_state: u32,      // 0x006c
} // size: 0x70

unsafe impl Pod for FloatingSaveArea {}

/// A 32-bit register snapshot.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct Context32 {
    pub context_flags: u32,               // 0x0000
    pub dr0: u32,                         // 0x0004
    pub dr1: u32,                         // 0x0008
    pub dr2: u32,                         // 0x000c
    pub dr3: u32,                         // 0x0010
    pub dr6: u32,                         // 0x0014
    pub dr7: u32,                         // 0x0018
    pub float_save: FloatingSaveArea,     // 0x001c
    pub seg_gs: u32,                      // 0x008c
    pub seg_fs: u32,                      // 0x0090
    pub seg_es: u32,                      // 0x0094
    pub seg_ds: u32,                      // 0x0098
    pub edi: u32,                         // 0x009c
    pub esi: u32,                         // 0x00a0
    pub ebx: u32,                         // 0x00a4
    pub edx: u32,                         // 0x00a8
    pub ecx: u32,                         // 0x00ac
    pub eax: u32,                         // 0x00b0
    pub ebp: u32,                         // 0x00b4
    pub eip: u32,                         // 0x00b8
    pub seg_cs: u32,                      // 0x00bc
    pub e_flags: u32,                     // 0x00c0
    pub esp: u32,                         // 0x00c4
    pub seg_ss: u32,                      // 0x00c8
    pub extended_registers: [u8; 512],    // 0x00cc
} // size: 0x2cc

impl Context32 {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }

    /// Assigns a register by its Windows name. Returns false if the
    /// name does not denote a scalar field of this record.
    pub fn set_register(&mut self, name: &str, value: u64) -> bool {
        let value = value as u32;
        match name {
            "ContextFlags" => self.context_flags = value,
            "Dr0" => self.dr0 = value,
            "Dr1" => self.dr1 = value,
            "Dr2" => self.dr2 = value,
            "Dr3" => self.dr3 = value,
            "Dr6" => self.dr6 = value,
            "Dr7" => self.dr7 = value,
            "SegGs" => self.seg_gs = value,
            "SegFs" => self.seg_fs = value,
            "SegEs" => self.seg_es = value,
            "SegDs" => self.seg_ds = value,
            "Edi" => self.edi = value,
            "Esi" => self.esi = value,
            "Ebx" => self.ebx = value,
            "Edx" => self.edx = value,
            "Ecx" => self.ecx = value,
            "Eax" => self.eax = value,
            "Ebp" => self.ebp = value,
            "Eip" => self.eip = value,
            "SegCs" => self.seg_cs = value,
            "EFlags" => self.e_flags = value,
            "Esp" => self.esp = value,
            "SegSs" => self.seg_ss = value,
            _ => return false,
        }
        true
    }
}

unsafe impl Pod for Context32 {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(size_of::<FloatingSaveArea>(), 0x70);
        assert_eq!(size_of::<Context32>(), 0x2cc);
    }

    #[test]
    fn test_struct_members() {
        let context = Context32::zeroed();
        assert_eq!(
            &context.float_save as *const _ as usize - &context as *const _ as usize,
            0x1c
        );
        assert_eq!(
            &context.eax as *const _ as usize - &context as *const _ as usize,
            0xb0
        );
        assert_eq!(
            &context.eip as *const _ as usize - &context as *const _ as usize,
            0xb8
        );
        assert_eq!(
            &context.extended_registers as *const _ as usize - &context as *const _ as usize,
            0xcc
        );
    }

    #[test]
    fn test_set_register() {
        let mut context = Context32::zeroed();
        assert!(context.set_register("Eip", 0x100));
        assert!(context.set_register("Eax", 0x1337));
        assert!(!context.set_register("Rip", 0x100));

        assert_eq!(context.eip, 0x100);
        assert_eq!(context.eax, 0x1337);
        assert_eq!(context.esp, 0);
    }
}
