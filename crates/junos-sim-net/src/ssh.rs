//! SSH transport.
//!
//! Password authentication against the single configured credential pair,
//! `session` channels only, and a PTY shell per channel. The terminal
//! engine is blocking, so each shell runs on a blocking worker that drives
//! the async channel through [`SshChannel`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use russh::server::{self, Auth, Msg, Session};
use russh::{ChannelId, ChannelMsg, Pty};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Handle;

use junos_sim_cli::DeviceState;
use junos_sim_terminal::{Credentials, SessionEnd, TerminalSession};
use junos_sim_types::{Channel, Result as SimResult, SimConfig, SimError};

use crate::host_key;
use crate::listener::ConnectionSlot;

/// `Channel` over one SSH session channel.
///
/// Must be used from a thread where blocking is allowed; every call parks
/// on `runtime` until the async side completes.
pub struct SshChannel {
    channel: russh::Channel<Msg>,
    runtime: Handle,
    pending: Vec<u8>,
    closed: bool,
}

impl SshChannel {
    pub fn new(channel: russh::Channel<Msg>, runtime: Handle) -> Self {
        Self {
            channel,
            runtime,
            pending: Vec::new(),
            closed: false,
        }
    }
}

impl Channel for SshChannel {
    fn recv(&mut self, buf: &mut [u8]) -> SimResult<usize> {
        while self.pending.is_empty() {
            match self.runtime.block_on(self.channel.wait()) {
                Some(ChannelMsg::Data { data }) => self.pending.extend_from_slice(&data),
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => return Ok(0),
                Some(other) => log::trace!("ignoring channel message {other:?}"),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }

    fn send(&mut self, data: &[u8]) -> SimResult<()> {
        if self.closed {
            return Err(SimError::Transport("send on closed channel".into()));
        }
        self.runtime
            .block_on(self.channel.data(data))
            .map_err(|e| SimError::Transport(e.to_string()))
    }

    fn close(&mut self) -> SimResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let channel = &self.channel;
        self.runtime
            .block_on(async {
                channel.eof().await?;
                channel.close().await
            })
            .map_err(|e: russh::Error| SimError::Transport(e.to_string()))
    }
}

/// Per-connection SSH handler.
pub struct SshConnection {
    peer: String,
    credentials: Credentials,
    hostname: String,
    authenticated: Arc<AtomicBool>,
    channels: HashMap<ChannelId, russh::Channel<Msg>>,
}

impl SshConnection {
    fn new(peer: String, config: &SimConfig) -> Self {
        Self {
            peer,
            credentials: Credentials::new(config.username.as_str(), config.password.as_str()),
            hostname: config.hostname.clone(),
            authenticated: Arc::new(AtomicBool::new(false)),
            channels: HashMap::new(),
        }
    }
}

impl server::Handler for SshConnection {
    type Error = russh::Error;

    async fn auth_password(&mut self, user: &str, password: &str) -> Result<Auth, Self::Error> {
        if self.credentials.matches(user, password) {
            log::info!("{}: {user} logged in", self.peer);
            self.authenticated.store(true, Ordering::SeqCst);
            Ok(Auth::Accept)
        } else {
            log::warn!("{}: password rejected for {user:?}", self.peer);
            Ok(Auth::reject())
        }
    }

    async fn channel_open_session(
        &mut self,
        channel: russh::Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        log::debug!("{}: session channel {:?} opened", self.peer, channel.id());
        self.channels.insert(channel.id(), channel);
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        log::debug!("{}: pty {term} {col_width}x{row_height}", self.peer);
        session.channel_success(channel)?;
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        let Some(ssh_channel) = self.channels.remove(&channel) else {
            session.channel_failure(channel)?;
            return Ok(());
        };
        session.channel_success(channel)?;

        let peer = self.peer.clone();
        let device = DeviceState::new(self.hostname.as_str());
        let runtime = Handle::current();
        tokio::task::spawn_blocking(move || {
            let mut channel = SshChannel::new(ssh_channel, runtime);
            match TerminalSession::new(device).run(&mut channel, &[]) {
                SessionEnd::Exited => log::info!("{peer}: session ended by operator"),
                SessionEnd::Disconnected => log::info!("{peer}: closed by peer"),
                SessionEnd::Fault(e) => log::info!("{peer}: session dropped: {e}"),
            }
        });
        Ok(())
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        log::debug!(
            "{}: refusing exec {:?}",
            self.peer,
            String::from_utf8_lossy(data)
        );
        session.channel_failure(channel)?;
        Ok(())
    }
}

/// SSH listener plus the shared, read-only configuration.
pub struct SshDeviceServer {
    config: Arc<SimConfig>,
    ssh_config: Arc<server::Config>,
    listener: TcpListener,
    active: Arc<AtomicUsize>,
}

impl SshDeviceServer {
    /// Validate `config`, load or create the host key, and bind.
    pub async fn bind(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let key = host_key::load_or_generate(&config.host_key_path)?;
        let ssh_config = server::Config {
            keys: vec![key],
            max_auth_attempts: config.max_login_attempts as usize,
            auth_rejection_time: Duration::from_secs(1),
            auth_rejection_time_initial: Some(Duration::ZERO),
            inactivity_timeout: None,
            ..Default::default()
        };
        let listener = TcpListener::bind(config.listen_addr()).await?;
        log::info!("ssh listening on {}", listener.local_addr()?);
        Ok(Self {
            config: Arc::new(config),
            ssh_config: Arc::new(ssh_config),
            listener,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn local_addr(&self) -> SimResult<SocketAddr> {
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
    pub async fn run(mut self) -> SimResult<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::warn!("accept error: {e}");
                    continue;
                },
            };
            let Some(slot) = ConnectionSlot::acquire(&self.active, self.config.max_connections)
            else {
                log::warn!("{peer}: rejected, {} sessions active", self.active_sessions());
                continue;
            };

            log::info!("{peer}: connected");
            let handler = server::Server::new_client(&mut self, Some(peer));
            let ssh_config = Arc::clone(&self.ssh_config);
            let login_timeout = (self.config.login_timeout_secs > 0)
                .then(|| Duration::from_secs(self.config.login_timeout_secs));
            tokio::spawn(async move {
                let _slot = slot;
                if let Err(e) = serve(ssh_config, stream, handler, login_timeout).await {
                    log::debug!("{peer}: {e}");
                }
                log::info!("{peer}: disconnected");
            });
        }
    }
}

impl server::Server for SshDeviceServer {
    type Handler = SshConnection;

    fn new_client(&mut self, peer_addr: Option<SocketAddr>) -> SshConnection {
        let peer = peer_addr.map_or_else(|| "unknown".to_string(), |a| a.to_string());
        SshConnection::new(peer, &self.config)
    }

    fn handle_session_error(&mut self, error: russh::Error) {
        log::warn!("ssh session error: {error}");
    }
}

/// Run one SSH connection, dropping it if login does not finish in time.
async fn serve(
    ssh_config: Arc<server::Config>,
    stream: TcpStream,
    handler: SshConnection,
    login_timeout: Option<Duration>,
) -> Result<(), russh::Error> {
    let authenticated = Arc::clone(&handler.authenticated);
    let session = server::run_stream(ssh_config, stream, handler).await?;
    tokio::pin!(session);

    if let Some(limit) = login_timeout {
        tokio::select! {
            result = &mut session => return result,
            () = tokio::time::sleep(limit) => {},
        }
        if !authenticated.load(Ordering::SeqCst) {
            log::warn!("login timed out after {}s", limit.as_secs());
            return Ok(());
        }
    }
    session.await
}
