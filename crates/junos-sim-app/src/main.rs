//! Simulated JUNOS router.
//!
//! Accepts SSH logins for the fixed account and drops each client into its
//! own copy of the device's operational CLI. Set `transport = "telnet"` in
//! the config file to serve a plain `login:` prompt instead.
//!
//! Usage: `junos-sim [port]`. Set `JUNOS_SIM_CONFIG` to load a TOML config
//! file; a port given on the command line overrides the file.

use anyhow::{Context, Result};

use junos_sim_net::{DeviceServer, SshDeviceServer};
use junos_sim_types::{SimConfig, Transport};

/// Defaults, then the config file, then the command-line port.
fn resolve_config() -> Result<SimConfig> {
    let mut config = match std::env::var_os("JUNOS_SIM_CONFIG") {
        Some(path) => SimConfig::load(&path)
            .with_context(|| format!("loading {}", path.to_string_lossy()))?,
        None => SimConfig::default(),
    };
    if let Some(arg) = std::env::args().nth(1) {
        config.port = parse_port(&arg)?;
    }
    Ok(config)
}

fn parse_port(arg: &str) -> Result<u16> {
    arg.parse()
        .with_context(|| format!("invalid port {arg:?}"))
}

fn log_credentials(config: &SimConfig) {
    log::info!(
        "Login credentials: username='{}', password='{}'",
        config.username,
        config.password
    );
}

fn run_ssh(config: SimConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(async {
        let server = SshDeviceServer::bind(config).await?;
        let addr = server.local_addr()?;
        log_credentials(server.config());
        log::info!(
            "To connect: ssh {}@{} -p {}",
            server.config().username,
            addr.ip(),
            addr.port()
        );
        server.run().await?;
        Ok(())
    })
}

fn run_telnet(config: SimConfig) -> Result<()> {
    let server = DeviceServer::bind(config)?;
    let addr = server.local_addr()?;
    log_credentials(server.config());
    log::info!("To connect: telnet {} {}", addr.ip(), addr.port());
    server.run()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = resolve_config()?;
    log::info!(
        "Starting simulated device {} on {}",
        config.hostname,
        config.listen_addr()
    );

    match config.transport {
        Transport::Ssh => run_ssh(config),
        Transport::Telnet => run_telnet(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_port_accepts_numbers() {
        assert_eq!(parse_port("2222").unwrap(), 2222);
    }

    #[test]
    fn parse_port_rejects_garbage() {
        assert!(parse_port("ssh").is_err());
        assert!(parse_port("70000").is_err());
    }
}
