//! Storage layer for Protean
//!
//! This crate implements the in-process reference backend:
//! - MemoryStore: DashMap of tables, one RwLock per table
//! - Filter evaluation, ILIKE pattern matching and result ordering
//!
//! # Concurrency
//!
//! - Distinct tables never contend: each lives behind its own lock
//! - Reads of one table share a read lock; writes take the write lock, so a
//!   single `update_where` or `delete_where` is atomic with respect to reads

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod eval;
pub mod memory;

pub use eval::{ilike, matches, resolve};
pub use memory::MemoryStore;
