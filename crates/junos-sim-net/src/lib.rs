//! Networking: the SSH server, the plain TCP channel with telnet option
//! filtering, and the accept loops that give every connection its own
//! device.

mod host_key;
mod listener;
mod ssh;
mod std_backend;
pub mod telnet;

pub use host_key::load_or_generate as load_or_generate_host_key;
pub use listener::{DeviceServer, handle_connection};
pub use ssh::{SshChannel, SshConnection, SshDeviceServer};
pub use std_backend::TcpChannel;
pub use telnet::TelnetFilter;

#[cfg(test)]
mod tests;
