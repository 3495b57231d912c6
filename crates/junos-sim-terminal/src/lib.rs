//! Terminal session engine.
//!
//! The remote terminal runs in raw mode: it sends keystrokes one at a time
//! and never echoes locally. Everything here is byte-driven so it can be
//! tested by feeding canned input instead of a live connection; the
//! [`Channel`](junos_sim_types::Channel) trait is only touched by the `run`
//! and `authenticate` drivers.

mod line_editor;
mod login;
mod session;

pub use line_editor::{ERASE_SEQUENCE, Echo, LineEditor, MAX_LINE_LEN};
pub use login::{Authenticated, Credentials, LoginOutcome, LoginPrompt, authenticate};
pub use session::{SessionEnd, SessionState, TerminalSession, WELCOME_BANNER};
