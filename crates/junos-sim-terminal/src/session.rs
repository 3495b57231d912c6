//! Per-connection terminal session.

use junos_sim_cli::{DeviceState, dispatch};
use junos_sim_types::{Channel, SimError};

use crate::line_editor::LineEditor;

/// Sent once when the session starts, before the first prompt.
pub const WELCOME_BANNER: &[u8] = b"\r\nWelcome to Simulated JUNOS Device\r\n";

/// Size of a single channel read.
const READ_CHUNK: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Terminated,
}

/// Why a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The operator ran `exit` or `quit`.
    Exited,
    /// The peer closed the channel.
    Disconnected,
    /// Reading from or writing to the channel failed.
    Fault(SimError),
}

/// One device, one line editor, one channel's worth of state.
#[derive(Debug)]
pub struct TerminalSession {
    device: DeviceState,
    editor: LineEditor,
    state: SessionState,
    commands: usize,
}

impl TerminalSession {
    pub fn new(device: DeviceState) -> Self {
        Self::with_editor(device, LineEditor::default())
    }

    /// Start with an editor already carrying state, e.g. from the login prompt.
    pub fn with_editor(device: DeviceState, editor: LineEditor) -> Self {
        Self {
            device,
            editor,
            state: SessionState::Active,
            commands: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn device(&self) -> &DeviceState {
        &self.device
    }

    /// Number of non-blank lines dispatched so far.
    pub fn commands(&self) -> usize {
        self.commands
    }

    /// Welcome banner followed by the first prompt.
    pub fn greeting(&self) -> Vec<u8> {
        let mut out = WELCOME_BANNER.to_vec();
        out.extend_from_slice(self.device.prompt().as_bytes());
        out
    }

    /// Process `input` in order, appending everything to send to `out`.
    ///
    /// Bytes after the one that terminates the session are ignored.
    pub fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &byte in input {
            if self.state == SessionState::Terminated {
                break;
            }
            if let Some(line) = self.editor.feed(byte, out) {
                self.complete_line(&line, out);
            }
        }
    }

    fn complete_line(&mut self, line: &str, out: &mut Vec<u8>) {
        if !line.trim().is_empty() {
            log::debug!("{}: {}", self.device.hostname(), line.trim());
            self.commands += 1;
            let response = dispatch(line, &mut self.device);
            out.extend_from_slice(response.as_bytes());
            if !self.device.is_running() {
                self.state = SessionState::Terminated;
                return;
            }
        }
        out.extend_from_slice(self.device.prompt().as_bytes());
    }

    /// Drive the session over `channel` until exit, EOF, or a transport fault.
    ///
    /// `typeahead` is input that arrived before the session started. The
    /// channel is closed exactly once on the way out.
    pub fn run<C: Channel + ?Sized>(mut self, channel: &mut C, typeahead: &[u8]) -> SessionEnd {
        let mut out = self.greeting();
        self.feed(typeahead, &mut out);
        let end = match channel.send(&out) {
            Ok(()) => self.pump(channel, &mut out),
            Err(e) => SessionEnd::Fault(e),
        };
        self.state = SessionState::Terminated;

        if let Err(e) = channel.close() {
            log::debug!("close failed: {e}");
        }
        end
    }

    fn pump<C: Channel + ?Sized>(&mut self, channel: &mut C, out: &mut Vec<u8>) -> SessionEnd {
        let mut buf = [0u8; READ_CHUNK];
        while self.state == SessionState::Active {
            let n = match channel.recv(&mut buf) {
                Ok(0) => return SessionEnd::Disconnected,
                Ok(n) => n,
                Err(e) => return SessionEnd::Fault(e),
            };
            out.clear();
            self.feed(&buf[..n], out);
            if !out.is_empty() {
                if let Err(e) = channel.send(out) {
                    return SessionEnd::Fault(e);
                }
            }
        }
        SessionEnd::Exited
    }
}
