//! Source file handling for epicsgen.
//!
//! This crate owns everything that touches the filesystem on the input
//! side: reading driver sources with encoding detection, memoizing parsed
//! units within one invocation, and parsing IOC startup descriptors that
//! tell the table and archive generators which devices exist.

pub mod cache;
pub mod source;
pub mod startup;
