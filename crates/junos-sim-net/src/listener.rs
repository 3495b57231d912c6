//! Accept loop.
//!
//! Every accepted connection gets its own thread, its own login exchange,
//! and its own `DeviceState`. Nothing mutable is shared between sessions
//! except the connection counter.

use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use junos_sim_cli::DeviceState;
use junos_sim_terminal::{Credentials, LoginPrompt, SessionEnd, TerminalSession, authenticate};
use junos_sim_types::{Channel, Result, SimConfig};

use crate::std_backend::TcpChannel;

const TOO_MANY_CONNECTIONS: &[u8] = b"Too many connections, try again later.\r\n";

/// One occupied connection slot; released on drop.
pub(crate) struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    pub(crate) fn acquire(counter: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()
            .map(|_| Self(Arc::clone(counter)))
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Listening socket plus the shared, read-only configuration.
pub struct DeviceServer {
    config: Arc<SimConfig>,
    listener: TcpListener,
    active: Arc<AtomicUsize>,
}

impl DeviceServer {
    /// Validate `config` and bind the listening socket.
    pub fn bind(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(config.listen_addr())?;
        log::info!("listening on {}", listener.local_addr()?);
        Ok(Self {
            config: Arc::new(config),
            listener,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Sessions currently holding a connection slot.
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Accept connections forever. Accept errors are logged and skipped.
    pub fn run(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.spawn_session(stream),
                Err(e) => log::warn!("accept error: {e}"),
            }
        }
        Ok(())
    }

    fn spawn_session(&self, mut stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map_or_else(|_| "unknown".to_string(), |a| a.to_string());

        let Some(slot) = ConnectionSlot::acquire(&self.active, self.config.max_connections) else {
            log::warn!("{peer}: rejected, {} sessions active", self.active_sessions());
            if let Err(e) = stream.write_all(TOO_MANY_CONNECTIONS) {
                log::debug!("{peer}: {e}");
            }
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                log::debug!("{peer}: {e}");
            }
            return;
        };

        log::info!("{peer}: connected");
        let config = Arc::clone(&self.config);
        let spawned = std::thread::Builder::new()
            .name(format!("session-{peer}"))
            .spawn(move || {
                let _slot = slot;
                handle_connection(stream, &config);
            });
        if let Err(e) = spawned {
            log::warn!("{peer}: could not start session thread: {e}");
        }
    }
}

/// Log in and run one terminal session on `stream`, closing it afterwards.
pub fn handle_connection(stream: TcpStream, config: &SimConfig) {
    let mut channel = match TcpChannel::new(stream, config.telnet_negotiation) {
        Ok(channel) => channel,
        Err(e) => {
            log::debug!("connection setup failed: {e}");
            return;
        },
    };
    let peer = channel
        .peer_addr()
        .map_or_else(|| "unknown".to_string(), |a| a.to_string());

    let login_timeout =
        (config.login_timeout_secs > 0).then(|| Duration::from_secs(config.login_timeout_secs));
    if let Err(e) = channel.set_read_timeout(login_timeout) {
        log::debug!("{peer}: {e}");
    }

    let prompt = LoginPrompt::new(
        Credentials::new(config.username.as_str(), config.password.as_str()),
        config.max_login_attempts,
    );
    let auth = match authenticate(&mut channel, prompt) {
        Ok(auth) => auth,
        Err(e) => {
            log::warn!("{peer}: login failed: {e}");
            if let Err(e) = channel.close() {
                log::debug!("{peer}: {e}");
            }
            return;
        },
    };
    log::info!("{peer}: {} logged in", auth.username);

    if let Err(e) = channel.set_read_timeout(None) {
        log::debug!("{peer}: {e}");
    }

    let session =
        TerminalSession::with_editor(DeviceState::new(config.hostname.as_str()), auth.editor);
    match session.run(&mut channel, &auth.typeahead) {
        SessionEnd::Exited => log::info!("{peer}: session ended by operator"),
        SessionEnd::Disconnected => log::info!("{peer}: closed by peer"),
        SessionEnd::Fault(e) => log::info!("{peer}: session dropped: {e}"),
    }
}
