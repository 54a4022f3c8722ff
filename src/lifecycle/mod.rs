//! Lifecycle management subsystem.
//!
//! Startup is orchestrated by the binary (config first, then observability,
//! then the listener); shutdown is coordinated through a broadcast channel
//! so tests and signal handlers share one mechanism.

pub mod shutdown;

pub use shutdown::Shutdown;
