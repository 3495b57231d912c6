//! Persistent SSH host key.
//!
//! The key is generated on first start and written in OpenSSH format, so
//! clients see the same fingerprint across restarts.

use std::path::Path;

use rand::rngs::OsRng;
use russh::keys::ssh_key::LineEnding;
use russh::keys::{Algorithm, PrivateKey};

use junos_sim_types::{Result, SimError};

/// Load the host key at `path`, generating and saving a new one if the
/// file does not exist yet.
pub fn load_or_generate(path: &Path) -> Result<PrivateKey> {
    if path.exists() {
        let text = std::fs::read_to_string(path)?;
        let key = PrivateKey::from_openssh(&text)
            .map_err(|e| SimError::HostKey(format!("{}: {e}", path.display())))?;
        log::info!("loaded host key from {}", path.display());
        return Ok(key);
    }

    let key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519)
        .map_err(|e| SimError::HostKey(format!("generation failed: {e}")))?;
    let encoded = key
        .to_openssh(LineEnding::LF)
        .map_err(|e| SimError::HostKey(format!("encoding failed: {e}")))?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, encoded.as_bytes())?;
    restrict_permissions(path)?;
    log::info!("generated new host key at {}", path.display());
    Ok(key)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_then_reloads_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host_key");

        let first = load_or_generate(&path).unwrap();
        assert!(path.exists());
        let second = load_or_generate(&path).unwrap();
        assert_eq!(first.public_key(), second.public_key());
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("host_key");
        load_or_generate(&path).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn saved_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host_key");
        load_or_generate(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn garbage_file_is_host_key_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host_key");
        std::fs::write(&path, "not a key").unwrap();
        assert!(matches!(load_or_generate(&path), Err(SimError::HostKey(_))));
    }
}
