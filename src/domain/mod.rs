//! Domain layer - pure types and rules, no I/O.

pub mod access;
pub mod foundation;
pub mod payment;
pub mod submission;
