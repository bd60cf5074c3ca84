/// Remote collection transport
///
/// The agent script is piped to `bash -s` over SSH, which avoids any quoting
/// of the script itself. Every failure mode comes back as a `TransportError`;
/// the whole call is bounded by the poll timeout and the child is killed if
/// the call is abandoned.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::trace;

use crate::core::config::OverseerConfig;
use crate::core::error::TransportError;

/// Raw result of a collection call that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    /// Process exit code, `-1` when terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
}

impl FetchOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostTransport: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<FetchOutput, TransportError>;
}

/// OpenSSH client transport
#[derive(Debug, Clone)]
pub struct SshTransport {
    program: PathBuf,
    user: String,
    port: Option<u16>,
    identity_file: Option<PathBuf>,
    agent_script: PathBuf,
    connect_timeout: Duration,
    poll_timeout: Duration,
}

impl SshTransport {
    pub fn from_config(config: &OverseerConfig) -> Self {
        Self {
            program: config.ssh_program.clone(),
            user: config.ssh_user.clone(),
            port: config.ssh_port,
            identity_file: config.identity_file.clone(),
            agent_script: config.agent_script.clone(),
            connect_timeout: config.connect_timeout,
            poll_timeout: config.poll_timeout,
        }
    }

    /// Arguments passed to `ssh` for one host
    pub fn ssh_args(&self, address: &str) -> Vec<String> {
        // ssh only takes whole seconds; round up so the bound is never tighter
        let connect_secs = self.connect_timeout.as_secs()
            + u64::from(self.connect_timeout.subsec_nanos() > 0);

        let mut args = vec![
            "-o".to_string(),
            format!("ConnectTimeout={}", connect_secs.max(1)),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-q".to_string(),
        ];

        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }

        if let Some(ref identity) = self.identity_file {
            args.push("-i".to_string());
            args.push(identity.to_string_lossy().to_string());
        }

        args.push(format!("{}@{}", self.user, address));
        args.push("bash -s".to_string());
        args
    }
}

#[async_trait]
impl HostTransport for SshTransport {
    async fn fetch(&self, address: &str) -> Result<FetchOutput, TransportError> {
        let script = tokio::fs::read(&self.agent_script)
            .await
            .map_err(|source| TransportError::Script {
                path: self.agent_script.display().to_string(),
                source,
            })?;

        trace!(address, program = %self.program.display(), "spawning ssh");

        let mut child = Command::new(&self.program)
            .args(self.ssh_args(address))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(TransportError::Spawn)?;

        let mut stdin = child.stdin.take();

        let run = async move {
            if let Some(ref mut pipe) = stdin {
                // ssh may exit before reading the script; its exit code tells why
                if let Err(e) = pipe.write_all(&script).await {
                    if e.kind() != std::io::ErrorKind::BrokenPipe {
                        return Err(e);
                    }
                }
            }
            // Close stdin so `bash -s` sees EOF
            drop(stdin);
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.poll_timeout, run)
            .await
            .map_err(|_| TransportError::Timeout(self.poll_timeout))?
            .map_err(TransportError::Io)?;

        Ok(FetchOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8(output.stdout)?,
        })
    }
}
