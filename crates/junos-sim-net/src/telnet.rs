//! Minimal telnet handling (RFC 854).
//!
//! The server only asks the client for character mode with remote echo.
//! Everything the client sends back in the IAC namespace is discarded so
//! the terminal engine only ever sees keystrokes.

pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
pub const SB: u8 = 250;
pub const SE: u8 = 240;

pub const OPT_ECHO: u8 = 1;
pub const OPT_SUPPRESS_GO_AHEAD: u8 = 3;

/// Sent on connect: server echoes, no go-ahead, i.e. character mode.
pub const CHAR_MODE_NEGOTIATION: &[u8] = &[IAC, WILL, OPT_ECHO, IAC, WILL, OPT_SUPPRESS_GO_AHEAD];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Iac,
    /// After WILL/WONT/DO/DONT, waiting for the option byte.
    Option,
    Subnegotiation,
    SubnegotiationIac,
}

/// Strips IAC sequences from inbound data. State carries across reads.
#[derive(Debug, Clone)]
pub struct TelnetFilter {
    state: State,
}

impl TelnetFilter {
    pub fn new() -> Self {
        Self { state: State::Data }
    }

    /// Compact `buf` in place, keeping only user data. Returns the new length.
    pub fn filter_in_place(&mut self, buf: &mut [u8]) -> usize {
        let mut kept = 0;
        for i in 0..buf.len() {
            let byte = buf[i];
            let keep = match (self.state, byte) {
                (State::Data, IAC) => {
                    self.state = State::Iac;
                    false
                },
                (State::Data, _) => true,
                (State::Iac, IAC) => {
                    // Escaped 0xFF data byte.
                    self.state = State::Data;
                    true
                },
                (State::Iac, WILL | WONT | DO | DONT) => {
                    self.state = State::Option;
                    false
                },
                (State::Iac, SB) => {
                    self.state = State::Subnegotiation;
                    false
                },
                (State::Iac, _) | (State::Option, _) => {
                    self.state = State::Data;
                    false
                },
                (State::Subnegotiation, IAC) => {
                    self.state = State::SubnegotiationIac;
                    false
                },
                (State::Subnegotiation, _) => false,
                (State::SubnegotiationIac, SE) => {
                    self.state = State::Data;
                    false
                },
                (State::SubnegotiationIac, _) => {
                    self.state = State::Subnegotiation;
                    false
                },
            };
            if keep {
                buf[kept] = byte;
                kept += 1;
            }
        }
        kept
    }
}

impl Default for TelnetFilter {
    fn default() -> Self {
        Self::new()
    }
}
