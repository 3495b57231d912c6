//! Login handshake for the single fixed credential pair.

use junos_sim_types::{Channel, Result, SimError};

use crate::line_editor::{Echo, LineEditor};

const LOGIN_PROMPT: &[u8] = b"login: ";
const PASSWORD_PROMPT: &[u8] = b"\r\nPassword: ";
const LOGIN_INCORRECT: &[u8] = b"Login incorrect\r\n";

/// Constant-time comparison of two byte slices.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// The one user name / password pair the device accepts.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields are always compared, whichever one differs.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        user_ok & pass_ok
    }
}

#[derive(Debug)]
enum Stage {
    Username,
    Password { username: String },
}

/// Result of feeding one byte to the login prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// More input needed.
    Pending,
    /// Credentials accepted for this user.
    Accepted(String),
    /// Too many failed attempts; drop the connection.
    Rejected,
}

/// `login:` / `Password:` exchange driven one byte at a time.
#[derive(Debug)]
pub struct LoginPrompt {
    credentials: Credentials,
    editor: LineEditor,
    stage: Stage,
    failures: u32,
    max_attempts: u32,
}

impl LoginPrompt {
    pub fn new(credentials: Credentials, max_attempts: u32) -> Self {
        Self {
            credentials,
            editor: LineEditor::new(Echo::On),
            stage: Stage::Username,
            failures: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Bytes to send before any input is read.
    pub fn banner(&self) -> &'static [u8] {
        LOGIN_PROMPT
    }

    /// Hand the line editor to the session so a CR LF split across the
    /// login and the first command still counts as one Enter.
    pub fn into_editor(self) -> LineEditor {
        self.editor
    }

    /// Failed attempts so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn feed(&mut self, byte: u8, out: &mut Vec<u8>) -> LoginOutcome {
        let Some(line) = self.editor.feed(byte, out) else {
            return LoginOutcome::Pending;
        };

        match std::mem::replace(&mut self.stage, Stage::Username) {
            Stage::Username => {
                let username = line.trim();
                if username.is_empty() {
                    out.extend_from_slice(b"\r\n");
                    out.extend_from_slice(LOGIN_PROMPT);
                } else {
                    self.stage = Stage::Password {
                        username: username.to_string(),
                    };
                    self.editor.set_echo(Echo::Off);
                    out.extend_from_slice(PASSWORD_PROMPT);
                }
                LoginOutcome::Pending
            },
            Stage::Password { username } => {
                self.editor.set_echo(Echo::On);
                out.extend_from_slice(b"\r\n");
                if self.credentials.matches(&username, &line) {
                    return LoginOutcome::Accepted(username);
                }
                self.failures += 1;
                log::warn!(
                    "failed login for {username:?} ({}/{})",
                    self.failures,
                    self.max_attempts
                );
                out.extend_from_slice(LOGIN_INCORRECT);
                if self.failures >= self.max_attempts {
                    LoginOutcome::Rejected
                } else {
                    out.extend_from_slice(LOGIN_PROMPT);
                    LoginOutcome::Pending
                }
            },
        }
    }
}

/// A completed login.
#[derive(Debug)]
pub struct Authenticated {
    pub username: String,
    /// Bytes received after the password line, to be replayed into the session.
    pub typeahead: Vec<u8>,
    /// Editor state at the end of login.
    pub editor: LineEditor,
}

/// Run the login exchange over `channel`.
///
/// Fails with [`SimError::Auth`] after too many bad attempts and with
/// [`SimError::Transport`] if the peer disconnects first. The channel is
/// left open either way; closing it is the caller's job.
pub fn authenticate<C: Channel + ?Sized>(
    channel: &mut C,
    mut prompt: LoginPrompt,
) -> Result<Authenticated> {
    channel.send(prompt.banner())?;
    let mut buf = [0u8; 512];
    let mut out = Vec::new();
    loop {
        let n = channel.recv(&mut buf)?;
        if n == 0 {
            return Err(SimError::Transport("closed during login".into()));
        }
        out.clear();
        for (i, &byte) in buf[..n].iter().enumerate() {
            match prompt.feed(byte, &mut out) {
                LoginOutcome::Pending => {},
                LoginOutcome::Accepted(username) => {
                    channel.send(&out)?;
                    return Ok(Authenticated {
                        username,
                        typeahead: buf[i + 1..n].to_vec(),
                        editor: prompt.into_editor(),
                    });
                },
                LoginOutcome::Rejected => {
                    channel.send(&out)?;
                    return Err(SimError::Auth(format!(
                        "{} failed login attempts",
                        prompt.failures()
                    )));
                },
            }
        }
        if !out.is_empty() {
            channel.send(&out)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::session::tests::ScriptedChannel;

    fn prompt() -> LoginPrompt {
        LoginPrompt::new(Credentials::new("admin", "admin"), 3)
    }

    fn feed_str(prompt: &mut LoginPrompt, input: &[u8]) -> (Vec<LoginOutcome>, Vec<u8>) {
        let mut out = Vec::new();
        let outcomes = input
            .iter()
            .map(|&b| prompt.feed(b, &mut out))
            .filter(|o| *o != LoginOutcome::Pending)
            .collect();
        (outcomes, out)
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"admin", b"admin"));
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"admin", b"Admin"));
        assert!(!constant_time_eq(b"admin", b"admin1"));
    }

    #[test]
    fn credentials_require_both_fields() {
        let creds = Credentials::new("admin", "admin");
        assert!(creds.matches("admin", "admin"));
        assert!(!creds.matches("admin", "root"));
        assert!(!creds.matches("root", "admin"));
    }

    #[test]
    fn debug_hides_password() {
        let dbg = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(dbg.contains("admin"));
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn successful_login() {
        let mut p = prompt();
        let (outcomes, out) = feed_str(&mut p, b"admin\radmin\r");
        assert_eq!(outcomes, [LoginOutcome::Accepted("admin".into())]);
        assert_eq!(out, b"admin\r\nPassword: \r\n");
    }

    #[test]
    fn password_is_not_echoed() {
        let mut p = prompt();
        let (_, out) = feed_str(&mut p, b"admin\rsecret");
        assert!(!String::from_utf8_lossy(&out).contains("secret"));
    }

    #[test]
    fn wrong_password_restarts_login() {
        let mut p = prompt();
        let (outcomes, out) = feed_str(&mut p, b"admin\rnope\r");
        assert!(outcomes.is_empty());
        assert!(out.ends_with(b"Login incorrect\r\nlogin: "));
        assert_eq!(p.failures(), 1);
    }

    #[test]
    fn blank_username_reprompts() {
        let mut p = prompt();
        let (_, out) = feed_str(&mut p, b"\r");
        assert_eq!(out, b"\r\nlogin: ");
        assert_eq!(p.failures(), 0);
    }

    #[test]
    fn rejected_after_max_attempts() {
        let mut p = prompt();
        let (outcomes, _) = feed_str(&mut p, b"a\rb\rc\rd\re\rf\r");
        assert_eq!(outcomes, [LoginOutcome::Rejected]);
        assert_eq!(p.failures(), 3);
    }

    #[test]
    fn authenticate_returns_typeahead() {
        let mut channel = ScriptedChannel::new(vec![b"admin\r\nadmin\r\nshow version\r\n".to_vec()]);
        let auth = authenticate(&mut channel, prompt()).unwrap();
        assert_eq!(auth.username, "admin");
        assert_eq!(auth.typeahead, b"\nshow version\r\n");
        assert!(channel.sent_text().starts_with("login: admin\r\nPassword: "));
    }

    #[test]
    fn authenticate_fails_on_eof() {
        let mut channel = ScriptedChannel::new(vec![b"adm".to_vec()]);
        let err = authenticate(&mut channel, prompt()).unwrap_err();
        assert!(matches!(err, SimError::Transport(_)));
    }

    #[test]
    fn authenticate_fails_after_bad_attempts() {
        let mut channel = ScriptedChannel::new(vec![b"x\ry\r".to_vec()]);
        let p = LoginPrompt::new(Credentials::new("admin", "admin"), 1);
        let err = authenticate(&mut channel, p).unwrap_err();
        assert!(matches!(err, SimError::Auth(_)));
        assert!(channel.sent_text().ends_with("Login incorrect\r\n"));
    }
}
