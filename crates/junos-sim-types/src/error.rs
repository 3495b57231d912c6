//! Error types for the device simulator.

use std::io;

/// Errors produced outside the command dispatcher.
///
/// Command-level problems (unknown command, bad argument) are never errors
/// at this layer; they are rendered as text for the operator.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("host key error: {0}")]
    HostKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = SimError::Config("missing key".into());
        assert_eq!(format!("{e}"), "config error: missing key");
    }

    #[test]
    fn transport_error_display() {
        let e = SimError::Transport("peer reset".into());
        assert_eq!(format!("{e}"), "transport error: peer reset");
    }

    #[test]
    fn auth_error_display() {
        let e = SimError::Auth("too many attempts".into());
        assert_eq!(format!("{e}"), "authentication error: too many attempts");
    }

    #[test]
    fn host_key_error_display() {
        let e = SimError::HostKey("host_key: unsupported format".into());
        assert_eq!(format!("{e}"), "host key error: host_key: unsupported format");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let e: SimError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("pipe closed"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("port = [[[").unwrap_err();
        let e: SimError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn error_is_debug() {
        let e = SimError::Transport("x".into());
        assert!(format!("{e:?}").contains("Transport"));
    }
}
