//! Shared types, adapter traits, and core utilities for menucard.
//!
//! This crate contains the foundational types that are shared between the
//! link subsystem and the document store adapter implementations. Keeping
//! them here allows adapter crates to compile independently of the
//! synchronizer.

pub mod doc_adapter;
pub mod error;
pub mod link;
pub mod prelude;
pub mod types;
pub mod utils;

// vim: ts=4
