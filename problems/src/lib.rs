//! Problem codes and messages for the epicsgen compiler suite.
//!
//! The enumeration is generated at build time from
//! `resources/problem-codes.csv` so that the set of codes, their stable
//! user-facing identifiers and their messages live in one reviewable table.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));
