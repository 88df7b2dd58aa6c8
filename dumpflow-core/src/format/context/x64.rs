/*!
The 64-bit CPU context record.
*/

use super::M128A;

use std::mem::MaybeUninit;

use dataview::Pod;

/// FXSAVE layout of the legacy floating point and SSE state.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct XSaveFormat64 {
    pub control_word: u16,              // 0x0000
    pub status_word: u16,               // 0x0002
    pub tag_word: u8,                   // 0x0004
    pub reserved1: u8,                  // 0x0005
    pub error_opcode: u16,              // 0x0006
    pub error_offset: u32,              // 0x0008
    pub error_selector: u16,            // 0x000c
    pub reserved2: u16,                 // 0x000e
    pub data_offset: u32,               // 0x0010
    pub data_selector: u16,             // 0x0014
    pub reserved3: u16,                 // 0x0016
    pub mx_csr: u32,                    // 0x0018
    pub mx_csr_mask: u32,               // 0x001c
    pub float_registers: [M128A; 8],    // 0x0020
    pub xmm_registers: [M128A; 16],     // 0x00a0
    pub reserved4: [u8; 96],            // 0x01a0
} // size: 0x200

unsafe impl Pod for XSaveFormat64 {}

/// A 64-bit register snapshot.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct Context64 {
    pub p1_home: u64,                   // 0x0000
    pub p2_home: u64,                   // 0x0008
    pub p3_home: u64,                   // 0x0010
    pub p4_home: u64,                   // 0x0018
    pub p5_home: u64,                   // 0x0020
    pub p6_home: u64,                   // 0x0028
    pub context_flags: u32,             // 0x0030
    pub mx_csr: u32,                    // 0x0034
    pub seg_cs: u16,                    // 0x0038
    pub seg_ds: u16,                    // 0x003a
    pub seg_es: u16,                    // 0x003c
    pub seg_fs: u16,                    // 0x003e
    pub seg_gs: u16,                    // 0x0040
    pub seg_ss: u16,                    // 0x0042
    pub e_flags: u32,                   // 0x0044
    pub dr0: u64,                       // 0x0048
    pub dr1: u64,                       // 0x0050
    pub dr2: u64,                       // 0x0058
    pub dr3: u64,                       // 0x0060
    pub dr6: u64,                       // 0x0068
    pub dr7: u64,                       // 0x0070
    pub rax: u64,                       // 0x0078
    pub rcx: u64,                       // 0x0080
    pub rdx: u64,                       // 0x0088
    pub rbx: u64,                       // 0x0090
    pub rsp: u64,                       // 0x0098
    pub rbp: u64,                       // 0x00a0
    pub rsi: u64,                       // 0x00a8
    pub rdi: u64,                       // 0x00b0
    pub r8: u64,                        // 0x00b8
    pub r9: u64,                        // 0x00c0
    pub r10: u64,                       // 0x00c8
    pub r11: u64,                       // 0x00d0
    pub r12: u64,                       // 0x00d8
    pub r13: u64,                       // 0x00e0
    pub r14: u64,                       // 0x00e8
    pub r15: u64,                       // 0x00f0
    pub rip: u64,                       // 0x00f8
    pub flt_save: XSaveFormat64,        // 0x0100
    pub vector_register: [M128A; 26],   // 0x0300
    pub vector_control: u64,            // 0x04a0
    pub debug_control: u64,             // 0x04a8
    pub last_branch_to_rip: u64,        // 0x04b0
    pub last_branch_from_rip: u64,      // 0x04b8
    pub last_exception_to_rip: u64,     // 0x04c0
    pub last_exception_from_rip: u64,   // 0x04c8
} // size: 0x4d0

impl Context64 {
    pub fn zeroed() -> Self {
        unsafe { MaybeUninit::zeroed().assume_init() }
    }

    /// Assigns a register by its Windows name. Returns false if the
    /// name does not denote a scalar field of this record.
    pub fn set_register(&mut self, name: &str, value: u64) -> bool {
        match name {
            "P1Home" => self.p1_home = value,
            "P2Home" => self.p2_home = value,
            "P3Home" => self.p3_home = value,
            "P4Home" => self.p4_home = value,
            "P5Home" => self.p5_home = value,
            "P6Home" => self.p6_home = value,
            "ContextFlags" => self.context_flags = value as u32,
            "MxCsr" => self.mx_csr = value as u32,
            "SegCs" => self.seg_cs = value as u16,
            "SegDs" => self.seg_ds = value as u16,
            "SegEs" => self.seg_es = value as u16,
            "SegFs" => self.seg_fs = value as u16,
            "SegGs" => self.seg_gs = value as u16,
            "SegSs" => self.seg_ss = value as u16,
            "EFlags" => self.e_flags = value as u32,
            "Dr0" => self.dr0 = value,
            "Dr1" => self.dr1 = value,
            "Dr2" => self.dr2 = value,
            "Dr3" => self.dr3 = value,
            "Dr6" => self.dr6 = value,
            "Dr7" => self.dr7 = value,
            "Rax" => self.rax = value,
            "Rcx" => self.rcx = value,
            "Rdx" => self.rdx = value,
            "Rbx" => self.rbx = value,
            "Rsp" => self.rsp = value,
            "Rbp" => self.rbp = value,
            "Rsi" => self.rsi = value,
            "Rdi" => self.rdi = value,
            "R8" => self.r8 = value,
            "R9" => self.r9 = value,
            "R10" => self.r10 = value,
            "R11" => self.r11 = value,
            "R12" => self.r12 = value,
            "R13" => self.r13 = value,
            "R14" => self.r14 = value,
            "R15" => self.r15 = value,
            "Rip" => self.rip = value,
            "VectorControl" => self.vector_control = value,
            "DebugControl" => self.debug_control = value,
            "LastBranchToRip" => self.last_branch_to_rip = value,
            "LastBranchFromRip" => self.last_branch_from_rip = value,
            "LastExceptionToRip" => self.last_exception_to_rip = value,
            "LastExceptionFromRip" => self.last_exception_from_rip = value,
            _ => return false,
        }
        true
    }
}

unsafe impl Pod for Context64 {}
