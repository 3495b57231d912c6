//! Foundation types for the JUNOS device simulator.
//!
//! Shared by every other crate in the workspace: the error type, the
//! TOML-backed server configuration, and the interactive channel trait
//! that decouples the terminal engine from any concrete transport.

pub mod channel;
pub mod config;
pub mod error;

pub use channel::Channel;
pub use config::{SimConfig, Transport};
pub use error::{Result, SimError};
