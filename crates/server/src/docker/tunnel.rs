//! SSH local forward for the `DirectSsh` transport.
//!
//! bollard speaks unix sockets and HTTP, not SSH, so a `DirectSsh` spec is
//! mapped onto a spawned OpenSSH subprocess forwarding an ephemeral local
//! port to the remote daemon socket. The child is killed when the tunnel is
//! dropped.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::process::{Child, Command};

use crate::conf::ConnectionSpec;
use super::client::DockerError;

/// Interval between readiness probes of the forwarded port.
const PROBE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct SshTunnel {
    local_port: u16,
    child: Child,
    key_file: Option<TempKeyFile>,
}

impl SshTunnel {
    /// Spawn an `ssh -N -L` forward for a `DirectSsh` spec and wait until
    /// the local endpoint accepts connections.
    pub async fn open(spec: &ConnectionSpec) -> Result<Self, DockerError> {
        let ConnectionSpec::DirectSsh {
            host,
            port,
            username,
            socket_path,
            private_key,
            passphrase,
            timeout_ms,
        } = spec
        else {
            return Err(DockerError::ConnectionFailed(
                "SSH tunnel requires a DirectSsh connection spec".to_string(),
            ));
        };

        if passphrase.is_some() {
            // BatchMode cannot prompt; an encrypted key must come from an agent.
            tracing::warn!(
                "Key passphrases are not supported for the spawned SSH forward; \
                 use ssh-agent or an unencrypted key"
            );
        }

        let local_port = pick_local_port()?;
        let key_file = match private_key {
            Some(material) => Some(TempKeyFile::write(material)?),
            None => None,
        };

        let mut cmd = Command::new("ssh");
        cmd.arg("-N")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg("StrictHostKeyChecking=accept-new")
            .arg("-o")
            .arg("ExitOnForwardFailure=yes")
            .arg("-p")
            .arg(port.to_string())
            .arg("-L")
            .arg(format!("127.0.0.1:{}:{}", local_port, socket_path))
            .arg(format!("{}@{}", username, host));
        if let Some(key) = &key_file {
            cmd.arg("-i").arg(&key.path);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true);

        tracing::info!(
            "Opening SSH forward 127.0.0.1:{} -> {}@{}:{}:{}",
            local_port,
            username,
            host,
            port,
            socket_path
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| DockerError::ConnectionFailed(format!("failed to spawn ssh: {}", e)))?;

        wait_for_forward(&mut child, local_port, *timeout_ms).await?;

        Ok(Self {
            local_port,
            child,
            key_file,
        })
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }
}

impl Drop for SshTunnel {
    fn drop(&mut self) {
        // kill_on_drop covers the child; start the kill eagerly so the
        // forward closes before the key file is removed.
        let _ = self.child.start_kill();
        self.key_file.take();
    }
}

/// Bind port 0 to let the kernel pick a free port, then release it for ssh.
fn pick_local_port() -> Result<u16, DockerError> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")
        .map_err(|e| DockerError::ConnectionFailed(format!("no free local port: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        .port();
    Ok(port)
}

/// Poll the forwarded port until it accepts, the child exits, or the
/// timeout elapses.
async fn wait_for_forward(
    child: &mut Child,
    local_port: u16,
    timeout_ms: u64,
) -> Result<(), DockerError> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms.max(1000));
    let addr = format!("127.0.0.1:{}", local_port);

    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        {
            return Err(DockerError::ConnectionFailed(format!(
                "ssh exited before the forward came up: {}",
                status
            )));
        }

        if TcpStream::connect(&addr).await.is_ok() {
            return Ok(());
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(DockerError::ConnectionFailed(format!(
                "SSH forward on {} did not come up within {}ms",
                addr, timeout_ms
            )));
        }

        tokio::time::sleep(PROBE_INTERVAL).await;
    }
}

/// Key material written to a 0600 temp file for `ssh -i`; removed on drop.
#[derive(Debug)]
struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn write(material: &str) -> Result<Self, DockerError> {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let path = std::env::temp_dir().join(format!(
            "docker-mcp-key-{}-{:x}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default()
        ));

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&path)
            .map_err(|e| DockerError::ConnectionFailed(format!("key temp file: {}", e)))?;
        file.write_all(material.as_bytes())
            .map_err(|e| DockerError::ConnectionFailed(format!("key temp file: {}", e)))?;

        Ok(Self { path })
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!("Failed to remove temp key file {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_ports_are_nonzero() {
        let port = pick_local_port().unwrap();
        assert_ne!(port, 0);
    }

    #[test]
    fn temp_key_file_is_written_and_removed() {
        let key = TempKeyFile::write("-----BEGIN TEST KEY-----").unwrap();
        let path = key.path.clone();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "-----BEGIN TEST KEY-----"
        );
        drop(key);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn tunnel_rejects_non_ssh_spec() {
        let err = SshTunnel::open(&ConnectionSpec::Local).await.unwrap_err();
        assert!(matches!(err, DockerError::ConnectionFailed(_)));
    }
}
