//! Lifecycle command runner
//!
//! Dependency materialization is owned by an external tool; this module
//! dispatches the named lifecycle commands against a module alias and
//! inspects the outcome. No timeout is applied; a dispatched command runs to
//! completion or failure.

use crate::core::error::{PanelError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// Named lifecycle commands understood by the external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    Install,
    Uninstall,
}

impl LifecycleCommand {
    /// Command name as passed to the external tool
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleCommand::Install => "install",
            LifecycleCommand::Uninstall => "uninstall",
        }
    }
}

impl std::fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Executor of named lifecycle commands against a target alias
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a lifecycle command to completion
    async fn run(&self, command: LifecycleCommand, alias: &str) -> Result<()>;
}

/// Command runner that spawns the configured external binary
///
/// Invoked as `<bin> <command> <alias>`; a non-zero exit status is a
/// command failure and surfaces the tail of stderr.
pub struct ProcessCommandRunner {
    bin: PathBuf,
}

impl ProcessCommandRunner {
    /// Create a runner for the given binary
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, command: LifecycleCommand, alias: &str) -> Result<()> {
        debug!(
            bin = %self.bin.display(),
            command = %command,
            alias = %alias,
            "Dispatching lifecycle command"
        );

        let output = tokio::process::Command::new(&self.bin)
            .arg(command.as_str())
            .arg(alias)
            .output()
            .await
            .map_err(|e| {
                PanelError::CommandFailed(format!(
                    "failed to spawn {} {} {}: {}",
                    self.bin.display(),
                    command,
                    alias,
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PanelError::CommandFailed(format!(
                "{} {} exited with {}: {}",
                command,
                alias,
                output.status,
                stderr.trim()
            )));
        }

        info!(command = %command, alias = %alias, "Lifecycle command completed");

        Ok(())
    }
}
