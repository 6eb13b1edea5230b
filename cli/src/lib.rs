//! Command line behavior for epicsgen.

pub mod cli;
pub mod logger;
