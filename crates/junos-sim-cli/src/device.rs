//! Device state owned by a single session.

/// Operational status of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceStatus {
    Up,
    Down,
}

impl InterfaceStatus {
    /// Lowercase form used in the interface table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Capitalized form used in the interface detail block.
    pub fn title(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
        }
    }
}

/// Interfaces every device starts with, in display order.
const DEFAULT_INTERFACES: [(&str, InterfaceStatus); 4] = [
    ("ge-0/0/0", InterfaceStatus::Up),
    ("ge-0/0/1", InterfaceStatus::Down),
    ("ge-0/0/2", InterfaceStatus::Up),
    ("lo0", InterfaceStatus::Up),
];

/// Hostname used when none is configured.
pub const DEFAULT_HOSTNAME: &str = "JUNOS-MX";

/// Hostname, ordered interface table, and the session-running flag.
///
/// Interface order is insertion order and is never re-sorted. The only
/// mutation is [`DeviceState::shut_down`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    hostname: String,
    interfaces: Vec<(String, InterfaceStatus)>,
    running: bool,
}

impl DeviceState {
    /// Build a freshly booted device with the stock interface set.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            interfaces: DEFAULT_INTERFACES
                .iter()
                .map(|(name, status)| ((*name).to_string(), *status))
                .collect(),
            running: true,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Interfaces in display order.
    pub fn interfaces(&self) -> impl Iterator<Item = (&str, InterfaceStatus)> {
        self.interfaces
            .iter()
            .map(|(name, status)| (name.as_str(), *status))
    }

    /// Exact, case-sensitive lookup.
    pub fn interface_status(&self, name: &str) -> Option<InterfaceStatus> {
        self.interfaces
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, status)| *status)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Clear the running flag; the owning session ends after this.
    pub fn shut_down(&mut self) {
        self.running = false;
    }

    /// Operator prompt, e.g. `JUNOS-MX> `.
    pub fn prompt(&self) -> String {
        format!("{}> ", self.hostname)
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(DEFAULT_HOSTNAME)
    }
}
