//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache cleanup: Sweeps expired entries from the memory cache backend

mod cleanup;

pub use cleanup::spawn_cleanup_task;
