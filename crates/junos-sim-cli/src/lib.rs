//! Operational CLI of the simulated router.
//!
//! A fixed, ordered rule table maps command lines onto canned renderers.
//! Every outcome, including bad input, is returned as CRLF-terminated text;
//! only `exit`/`quit` changes the device state.

mod device;
mod dispatch;
mod error;
pub mod render;

/// Per-session device model.
pub use device::{DeviceState, InterfaceStatus};
/// Parse and execute one command line.
pub use dispatch::{HELP_ENTRIES, dispatch};
/// Recoverable command failures rendered as operator text.
pub use error::CommandError;
