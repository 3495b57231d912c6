//! Recoverable command failures.

/// Something wrong with what the operator typed.
///
/// `Display` gives a single-line summary for logs; [`CommandError::to_response`]
/// gives the exact text sent back over the channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Error: Interface name required")]
    InterfaceNameRequired,

    #[error("Error: Interface {0} not found")]
    InterfaceNotFound(String),

    #[error("Unknown system subcommand: {0}")]
    UnknownSystemSubcommand(String),

    #[error("Configuration section '{0}' not found or not implemented.")]
    SectionNotFound(String),
}

impl CommandError {
    /// CRLF-terminated operator text for this error.
    pub fn to_response(&self) -> String {
        match self {
            Self::UnknownCommand(_) => {
                format!("{self}\r\nType 'help' for available commands.\r\n")
            },
            Self::InterfaceNameRequired | Self::InterfaceNotFound(_) => format!("{self}\r\n"),
            Self::UnknownSystemSubcommand(_) => format!(
                "{self}\r\nAvailable: {}\r\n",
                crate::dispatch::SYSTEM_REPORTS
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::SectionNotFound(_) => format!(
                "\r\n{self}\r\nAvailable sections: {}\r\n\r\n",
                crate::render::CONFIG_SECTIONS
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}
