//! Command implementations.
//!
//! Each handler takes its parsed arguments, the store built once in
//! `main`, and the resolved JSON flag. Human output goes to stdout,
//! warnings to stderr.

pub mod bug;
pub mod memory;
pub mod meta;
pub mod query;
