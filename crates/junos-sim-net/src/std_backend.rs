//! `Channel` over a blocking `std::net::TcpStream`.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use junos_sim_types::{Channel, Result, SimError};

use crate::telnet::{CHAR_MODE_NEGOTIATION, TelnetFilter};

/// One accepted TCP connection.
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    telnet: Option<TelnetFilter>,
    closed: bool,
}

impl TcpChannel {
    /// Wrap an accepted stream. With `telnet` set, the client is asked for
    /// character mode and inbound IAC sequences are stripped.
    pub fn new(stream: TcpStream, telnet: bool) -> Result<Self> {
        stream.set_nodelay(true)?;
        let mut channel = Self {
            stream,
            telnet: telnet.then(TelnetFilter::new),
            closed: false,
        };
        if telnet {
            channel.send(CHAR_MODE_NEGOTIATION)?;
        }
        Ok(channel)
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr().ok()
    }

    /// Bound how long `recv` may block (`None` = forever).
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }
}

impl Channel for TcpChannel {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            let n = match self.stream.read(buf) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(SimError::Transport("read timed out".into()));
                },
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                return Ok(0);
            }
            let kept = match self.telnet.as_mut() {
                Some(filter) => filter.filter_in_place(&mut buf[..n]),
                None => n,
            };
            // A read made only of protocol bytes is not EOF.
            if kept > 0 {
                return Ok(kept);
            }
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(SimError::Transport("send on closed channel".into()));
        }
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }
}
