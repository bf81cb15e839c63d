//! SSH-backed machine handle
//!
//! Shells out to the system `ssh` binary so existing SSH configuration,
//! agents and known_hosts apply unchanged.

use std::process::Command;
use std::time::{Duration, Instant};

use libmeshperf_core::{CommandOutput, Machine, MachineError};
use tracing::{debug, warn};

use crate::inventory::MachineEntry;

/// Default SSH connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Exit status ssh itself uses for connection failures
const SSH_ERROR_EXIT: i32 = 255;

pub struct SshMachine {
    entry: MachineEntry,
    connect_timeout: Duration,
}

impl SshMachine {
    pub fn new(entry: MachineEntry) -> Self {
        Self {
            entry,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// `user@host`, or just `host` when no user is configured
    pub fn destination(&self) -> String {
        match self.entry.user {
            Some(ref user) => format!("{}@{}", user, self.entry.host),
            None => self.entry.host.clone(),
        }
    }

    /// Arguments passed to `ssh` before the remote command
    pub fn ssh_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
        ];
        if let Some(port) = self.entry.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(ref identity) = self.entry.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        args.push(self.destination());
        args
    }

    fn run_checked(&self, command: &str) -> Result<CommandOutput, MachineError> {
        self.remote_command(command)?.check(self.name(), command)
    }
}

impl Machine for SshMachine {
    fn name(&self) -> &str {
        &self.entry.name
    }

    fn internal_address(&self) -> &str {
        self.entry.internal_address()
    }

    fn remote_command(&self, command: &str) -> Result<CommandOutput, MachineError> {
        debug!(machine = %self.entry.name, command = %command, "Executing SSH command");

        let start = Instant::now();
        let output = Command::new("ssh")
            .args(self.ssh_args())
            .arg(command)
            .output()
            .map_err(|e| MachineError::Transport {
                machine: self.entry.name.clone(),
                reason: format!("failed to spawn ssh: {}", e),
            })?;

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        if exit_code == SSH_ERROR_EXIT && is_ssh_failure(&stderr) {
            warn!(
                machine = %self.entry.name,
                host = %self.entry.host,
                stderr = %stderr.trim(),
                "SSH connection failed"
            );
            return Err(MachineError::Transport {
                machine: self.entry.name.clone(),
                reason: stderr.trim().to_string(),
            });
        }

        debug!(
            machine = %self.entry.name,
            exit_code,
            duration_ms = %duration.as_millis(),
            stdout_len = stdout.len(),
            "SSH command finished"
        );

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
            duration,
        })
    }

    fn install_package(&self, name: &str) -> Result<(), MachineError> {
        self.run_checked(&format!(
            "sudo DEBIAN_FRONTEND=noninteractive apt-get install -y {}",
            name
        ))?;
        Ok(())
    }

    fn uninstall_package(&self, name: &str) -> Result<(), MachineError> {
        self.run_checked(&format!(
            "sudo DEBIAN_FRONTEND=noninteractive apt-get remove -y {}",
            name
        ))?;
        Ok(())
    }

    /// Copies machine-to-machine over the internal network, so this machine
    /// must be able to SSH to `destination` as the same user.
    fn move_file(&self, destination: &dyn Machine, filename: &str) -> Result<(), MachineError> {
        self.run_checked(&scp_command(destination.internal_address(), filename))?;
        Ok(())
    }
}

fn scp_command(address: &str, filename: &str) -> String {
    format!(
        "scp -o StrictHostKeyChecking=accept-new {} {}:{}",
        filename, address, filename
    )
}

/// Whether stderr comes from ssh itself rather than the remote command
fn is_ssh_failure(stderr: &str) -> bool {
    let stderr = stderr.trim_start();
    stderr.starts_with("ssh:")
        || stderr.contains("Permission denied (")
        || stderr.contains("Host key verification failed")
        || stderr.contains("Connection closed by")
}
