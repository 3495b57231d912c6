//! Loopback tests for the TCP transport.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use junos_sim_types::{Channel, SimConfig};

use super::*;
use crate::telnet::{CHAR_MODE_NEGOTIATION, DO, IAC, OPT_ECHO};

/// Start a server on an ephemeral port and return its address.
fn start_server(config: SimConfig) -> SocketAddr {
    let server = DeviceServer::bind(SimConfig { port: 0, ..config }).unwrap();
    let addr = server.local_addr().unwrap();
    std::thread::spawn(move || server.run());
    addr
}

fn plain_config() -> SimConfig {
    SimConfig {
        telnet_negotiation: false,
        ..Default::default()
    }
}

fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream
}

/// Read until `needle` shows up or the peer closes.
fn read_until(stream: &mut TcpStream, needle: &str) -> String {
    let mut collected = Vec::new();
    let mut buf = [0u8; 1024];
    while !String::from_utf8_lossy(&collected).contains(needle) {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&collected).into_owned()
}

/// Read until EOF.
fn read_to_close(stream: &mut TcpStream) -> String {
    let mut collected = Vec::new();
    stream.read_to_end(&mut collected).unwrap();
    String::from_utf8_lossy(&collected).into_owned()
}

fn login(stream: &mut TcpStream) -> String {
    read_until(stream, "login: ");
    stream.write_all(b"admin\r\n").unwrap();
    read_until(stream, "Password: ");
    stream.write_all(b"admin\r\n").unwrap();
    read_until(stream, "JUNOS-MX> ")
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[test]
fn login_shows_welcome_and_prompt() {
    let addr = start_server(plain_config());
    let mut client = connect(addr);
    let text = login(&mut client);
    assert!(text.contains("Welcome to Simulated JUNOS Device\r\n"));
    assert!(text.ends_with("JUNOS-MX> "));
}

#[test]
fn help_round_trip() {
    let addr = start_server(plain_config());
    let mut client = connect(addr);
    login(&mut client);
    client.write_all(b"help\r\n").unwrap();
    let text = read_until(&mut client, "Exit the session\r\n\r\nJUNOS-MX> ");
    assert!(text.starts_with("help\r\nAvailable commands:\r\n"));
}

#[test]
fn keystrokes_one_at_a_time() {
    let addr = start_server(plain_config());
    let mut client = connect(addr);
    login(&mut client);
    for &b in b"show interface lo0\r" {
        client.write_all(&[b]).unwrap();
    }
    let text = read_until(&mut client, "Statistics last cleared: Never\r\n\r\nJUNOS-MX> ");
    assert!(text.contains("Physical interface: lo0\r\n"));
}

#[test]
fn exit_closes_connection() {
    let addr = start_server(plain_config());
    let mut client = connect(addr);
    login(&mut client);
    client.write_all(b"exit\r\n").unwrap();
    let text = read_to_close(&mut client);
    assert_eq!(text, "exitGoodbye!\r\n");
}

#[test]
fn typeahead_after_password_is_executed() {
    let addr = start_server(plain_config());
    let mut client = connect(addr);
    read_until(&mut client, "login: ");
    client
        .write_all(b"admin\r\nadmin\r\nshow system storage\r\nquit\r\n")
        .unwrap();
    let text = read_to_close(&mut client);
    assert!(text.contains("/dev/da0s1a"));
    assert!(text.ends_with("quitGoodbye!\r\n"));
}

#[test]
fn sessions_are_independent() {
    let addr = start_server(plain_config());
    let mut first = connect(addr);
    let mut second = connect(addr);
    login(&mut first);
    login(&mut second);

    first.write_all(b"exit\r").unwrap();
    read_to_close(&mut first);

    second.write_all(b"show version\r").unwrap();
    let text = read_until(&mut second, "UTC\r\n\r\nJUNOS-MX> ");
    assert!(text.contains("Device Information:"));
}

#[test]
fn configured_hostname_in_prompt() {
    let addr = start_server(SimConfig {
        hostname: "EDGE-01".into(),
        ..plain_config()
    });
    let mut client = connect(addr);
    read_until(&mut client, "login: ");
    client.write_all(b"admin\radmin\r").unwrap();
    let text = read_until(&mut client, "EDGE-01> ");
    assert!(text.ends_with("EDGE-01> "));
}

// ---------------------------------------------------------------------------
// Login failures and limits
// ---------------------------------------------------------------------------

#[test]
fn bad_credentials_disconnect() {
    let addr = start_server(SimConfig {
        max_login_attempts: 2,
        ..plain_config()
    });
    let mut client = connect(addr);
    read_until(&mut client, "login: ");
    client.write_all(b"admin\rwrong\rroot\rroot\r").unwrap();
    let text = read_to_close(&mut client);
    assert_eq!(text.matches("Login incorrect").count(), 2);
    assert!(!text.contains("Welcome"));
}

#[test]
fn login_timeout_disconnects() {
    let addr = start_server(SimConfig {
        login_timeout_secs: 1,
        ..plain_config()
    });
    let mut client = connect(addr);
    let text = read_to_close(&mut client);
    assert_eq!(text, "login: ");
}

#[test]
fn connection_limit_rejects_extra_clients() {
    let addr = start_server(SimConfig {
        max_connections: 1,
        ..plain_config()
    });
    let mut first = connect(addr);
    read_until(&mut first, "login: ");

    let mut second = connect(addr);
    let text = read_to_close(&mut second);
    assert_eq!(text, "Too many connections, try again later.\r\n");
}

#[test]
fn slot_is_released_after_session_ends() {
    let addr = start_server(SimConfig {
        max_connections: 1,
        ..plain_config()
    });
    let mut first = connect(addr);
    login(&mut first);
    first.write_all(b"quit\r").unwrap();
    read_to_close(&mut first);
    std::thread::sleep(Duration::from_millis(100));

    let mut second = connect(addr);
    assert!(login(&mut second).ends_with("JUNOS-MX> "));
}

#[test]
fn bind_rejects_invalid_config() {
    let result = DeviceServer::bind(SimConfig {
        port: 0,
        max_connections: 0,
        ..Default::default()
    });
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Telnet
// ---------------------------------------------------------------------------

#[test]
fn telnet_negotiation_sent_first() {
    let addr = start_server(SimConfig::default());
    let mut client = connect(addr);
    let mut buf = [0u8; CHAR_MODE_NEGOTIATION.len()];
    client.read_exact(&mut buf).unwrap();
    assert_eq!(buf, CHAR_MODE_NEGOTIATION);
}

#[test]
fn telnet_replies_are_not_keystrokes() {
    let addr = start_server(SimConfig::default());
    let mut client = connect(addr);
    read_until(&mut client, "login: ");
    // Option replies interleaved with the user name, as a real client does.
    client.write_all(&[IAC, DO, OPT_ECHO]).unwrap();
    client.write_all(b"adm").unwrap();
    client.write_all(&[IAC, 251, b'"']).unwrap();
    client.write_all(b"in\r\0admin\r\0").unwrap();
    let text = read_until(&mut client, "JUNOS-MX> ");
    assert!(text.contains("admin\r\nPassword: "));
    assert!(text.ends_with("JUNOS-MX> "));
}

// ---------------------------------------------------------------------------
// TcpChannel
// ---------------------------------------------------------------------------

#[test]
fn tcp_channel_close_is_idempotent() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = std::thread::spawn(move || {
        let mut stream = connect(addr);
        read_to_close(&mut stream)
    });
    let (stream, _) = listener.accept().unwrap();
    let mut channel = TcpChannel::new(stream, false).unwrap();
    channel.send(b"bye\r\n").unwrap();
    channel.close().unwrap();
    channel.close().unwrap();
    assert!(channel.send(b"late").is_err());
    assert_eq!(client.join().unwrap(), "bye\r\n");
}

#[test]
fn tcp_channel_reports_eof() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = std::thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(b"hi").unwrap();
    });
    let (stream, _) = listener.accept().unwrap();
    let mut channel = TcpChannel::new(stream, false).unwrap();
    client.join().unwrap();
    let mut buf = [0u8; 16];
    assert_eq!(channel.recv(&mut buf).unwrap(), 2);
    assert_eq!(&buf[..2], b"hi");
    assert_eq!(channel.recv(&mut buf).unwrap(), 0);
}

#[test]
fn tcp_channel_knows_its_peer() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).unwrap();
    let (stream, _) = listener.accept().unwrap();
    let channel = TcpChannel::new(stream, false).unwrap();
    assert_eq!(channel.peer_addr(), Some(client.local_addr().unwrap()));
}
