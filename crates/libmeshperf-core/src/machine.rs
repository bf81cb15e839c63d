//! Machine handle contract
//!
//! The benchmark only ever talks to machines through [`Machine`]. How a
//! command reaches the machine (SSH, a local shell, a test double) is up to
//! the implementation.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a machine handle
#[derive(Debug, Error)]
pub enum MachineError {
    /// The command could not be delivered or its output could not be collected
    #[error("machine {machine} unreachable: {reason}")]
    Transport { machine: String, reason: String },

    /// The command ran and exited non-zero
    #[error("command on {machine} exited with {exit_code}: {command}{}", stderr_suffix(.stderr))]
    CommandFailed {
        machine: String,
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(" ({})", trimmed)
    }
}

/// Output of a remote command that ran to completion
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandOutput {
    /// Check if the command succeeded (exit code 0)
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a non-zero exit into [`MachineError::CommandFailed`]
    pub fn check(self, machine: &str, command: &str) -> Result<Self, MachineError> {
        if self.success() {
            Ok(self)
        } else {
            Err(MachineError::CommandFailed {
                machine: machine.to_string(),
                command: command.to_string(),
                exit_code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// A provisioned machine taking part in the mesh.
///
/// All calls block until the remote side is done. `remote_command` returns
/// `Ok` for any command that ran, including ones that exited non-zero;
/// `Err` is reserved for transport failures.
pub trait Machine: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Address other machines in the mesh use to reach this one
    fn internal_address(&self) -> &str;

    /// Run a shell command and wait for it to exit
    fn remote_command(&self, command: &str) -> Result<CommandOutput, MachineError>;

    /// Install an OS package
    fn install_package(&self, name: &str) -> Result<(), MachineError>;

    /// Remove an OS package
    fn uninstall_package(&self, name: &str) -> Result<(), MachineError>;

    /// Copy `filename` from this machine's home directory to `destination`'s
    fn move_file(&self, destination: &dyn Machine, filename: &str) -> Result<(), MachineError>;
}

impl<M: Machine + ?Sized> Machine for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn internal_address(&self) -> &str {
        (**self).internal_address()
    }

    fn remote_command(&self, command: &str) -> Result<CommandOutput, MachineError> {
        (**self).remote_command(command)
    }

    fn install_package(&self, name: &str) -> Result<(), MachineError> {
        (**self).install_package(name)
    }

    fn uninstall_package(&self, name: &str) -> Result<(), MachineError> {
        (**self).uninstall_package(name)
    }

    fn move_file(&self, destination: &dyn Machine, filename: &str) -> Result<(), MachineError> {
        (**self).move_file(destination, filename)
    }
}

impl<M: Machine + ?Sized> Machine for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn internal_address(&self) -> &str {
        (**self).internal_address()
    }

    fn remote_command(&self, command: &str) -> Result<CommandOutput, MachineError> {
        (**self).remote_command(command)
    }

    fn install_package(&self, name: &str) -> Result<(), MachineError> {
        (**self).install_package(name)
    }

    fn uninstall_package(&self, name: &str) -> Result<(), MachineError> {
        (**self).uninstall_package(name)
    }

    fn move_file(&self, destination: &dyn Machine, filename: &str) -> Result<(), MachineError> {
        (**self).move_file(destination, filename)
    }
}
