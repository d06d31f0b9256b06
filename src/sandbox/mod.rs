//! Sandbox module containing all execution-related components.

pub mod cache;
pub mod config;
pub mod document;
pub mod executor;
pub mod io;
pub mod limits;
pub mod message;
pub mod session;
pub mod shim;
