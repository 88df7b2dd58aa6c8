/*!
Module for handling the processor architectures a dump can describe.

The architecture is supplied by the provider as part of the system
information and is recorded in the dump verbatim. It also selects the
shape of the CPU context records written for threads, see the
[`context`](../format/context/index.html) module.
*/

/// The processor architecture of the dumped system.
///
/// `Unknown` is a valid architecture for the system info record itself,
/// but no context record shape exists for it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ProcessorArchitecture {
    Intel,
    Arm,
    Ia64,
    Amd64,
    Unknown,
}

impl ProcessorArchitecture {
    /// Returns the architecture code stored in the system info record.
    pub const fn code(self) -> u16 {
        match self {
            ProcessorArchitecture::Intel => 0,
            ProcessorArchitecture::Arm => 5,
            ProcessorArchitecture::Ia64 => 6,
            ProcessorArchitecture::Amd64 => 9,
            ProcessorArchitecture::Unknown => 0xffff,
        }
    }

    /// Returns the number of bits of a pointers width on this architecture.
    /// Currently this will either return 64 or 32 depending on the pointer width of the target.
    ///
    /// # Examples
    ///
    /// ```
    /// use dumpflow_core::architecture::ProcessorArchitecture;
    ///
    /// let arch = ProcessorArchitecture::Amd64;
    /// assert_eq!(arch.bits(), 64);
    /// ```
    pub const fn bits(self) -> u8 {
        match self {
            ProcessorArchitecture::Amd64 | ProcessorArchitecture::Ia64 => 64,
            _ => 32,
        }
    }
}
