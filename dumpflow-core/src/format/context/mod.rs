/*!
CPU context records and their architecture-keyed selection.

A thread context is supplied by the provider as a sparse mapping of
Windows register names to values. Only the named registers are copied
into the record, every other field stays zero, so callers may sample
just an instruction pointer and a couple of general purpose registers
without fabricating a full register set.

The record shape follows the architecture recorded while encoding the
system info stream: `Amd64` and `Ia64` take the 64-bit record,
`Intel` and `Arm` the 32-bit one. An entirely unrecognized architecture
has no record shape at all, the context is skipped with a warning.
*/

pub mod x64;
pub mod x86;

pub use x64::Context64;
pub use x86::Context32;

use crate::architecture::ProcessorArchitecture;

use std::collections::HashMap;

use dataview::Pod;
use log::{debug, warn};

/// Sparse register sample, keyed by Windows register name (`"Rip"`,
/// `"Eax"`, ...). Names not present in the selected record shape are
/// ignored.
pub type RegisterMap = HashMap<String, u64>;

/// A 128-bit vector register value.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct M128A {
    pub low: u64,  // 0x0000
    pub high: i64, // 0x0008
} // size: 0x10

unsafe impl Pod for M128A {}

/// Encodes a sparse register sample into the context record shape of
/// the given architecture.
///
/// Returns `None` for an empty sample, and for architectures without a
/// record shape (with a warning, the rest of the dump stays valid).
pub fn encode_context(registers: &RegisterMap, arch: ProcessorArchitecture) -> Option<Vec<u8>> {
    if registers.is_empty() {
        return None;
    }

    match arch {
        ProcessorArchitecture::Amd64 | ProcessorArchitecture::Ia64 => {
            let mut context = Context64::zeroed();
            for (name, value) in registers.iter() {
                if !context.set_register(name, *value) {
                    debug!("register {} not present in the 64-bit context record", name);
                }
            }
            Some(context.as_bytes().to_vec())
        }
        ProcessorArchitecture::Intel | ProcessorArchitecture::Arm => {
            let mut context = Context32::zeroed();
            for (name, value) in registers.iter() {
                if !context.set_register(name, *value) {
                    debug!("register {} not present in the 32-bit context record", name);
                }
            }
            Some(context.as_bytes().to_vec())
        }
        ProcessorArchitecture::Unknown => {
            warn!("context record for architecture {:?} is not defined", arch);
            None
        }
    }
}
