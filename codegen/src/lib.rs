//! Artifact generators for epicsgen.
//!
//! Every generator consumes the same immutable parameter model:
//!
//! - [`db`] emits the EPICS record graph, including the four-node
//!   bidirectional read/write emulation for writable parameters.
//! - [`screen`] emits Display Builder screen descriptions.
//! - [`pvtable`] emits snapshot tables and merges them against
//!   pre-existing files.
//! - [`archive`] emits archiver engine-config fragments.

pub mod archive;
pub mod db;
mod emit;
pub mod pvtable;
pub mod screen;
pub mod topology;
