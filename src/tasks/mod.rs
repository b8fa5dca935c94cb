//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: sweeps expired entries out of a [`MemoryStore`](crate::store::MemoryStore)

mod cleanup;

pub use cleanup::spawn_cleanup_task;
