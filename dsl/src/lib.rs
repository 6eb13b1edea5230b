//! Model objects shared by the epicsgen parser and generators.
//!
//! The central type is [`param::Param`]: one declared device register or
//! derived value, constructed once per matched declaration line and immutable
//! thereafter. Diagnostics carry a problem code plus a location in the
//! scanned driver source.

pub mod core;
pub mod diagnostic;
pub mod param;
