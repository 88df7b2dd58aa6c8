/*!
This crate contains the foundation of dumpflow's minidump encoding.

It turns one snapshot of a process — system identity, loaded modules,
threads with optionally sampled register contexts and raw memory
ranges — into a single minidump file that external crash analysis
tools can open. The snapshot data itself comes from a
[`DumpProvider`](provider/index.html) implementation supplied by the
caller; everything in here is the encoding side: the
[fixed-layout records](format/index.html) of the container format, the
[growing-file arena](arena/index.html) handing out non-overlapping
file regions, the [per-stream translators](streams/index.html) and the
[orchestrating writer](writer/index.html).
*/

#[macro_use]
extern crate bitflags;

pub mod error;
#[doc(hidden)]
pub use error::*;

pub mod architecture;
#[doc(hidden)]
pub use architecture::*;

pub mod format;
#[doc(hidden)]
pub use format::*;

pub mod arena;
#[doc(hidden)]
pub use arena::*;

pub mod provider;
#[doc(hidden)]
pub use provider::*;

pub mod streams;
#[doc(hidden)]
pub use streams::{
    ChunkSize, DumpState, Memory64ListStream, MemoryInfoListStream, ModuleListStream,
    StreamEncoder, SystemInfoStream, ThreadListStream,
};

pub mod writer;
#[doc(hidden)]
pub use writer::*;
