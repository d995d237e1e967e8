//! Command building for the agent subprocess

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::VERSION;

use super::config::{DANGEROUS_ENV_VARS, SubprocessConfig};

/// Command builder for the agent program
pub struct CommandBuilder<'a> {
    program: &'a Path,
    config: &'a SubprocessConfig,
}

impl<'a> CommandBuilder<'a> {
    /// Create a new command builder
    pub fn new(program: &'a Path, config: &'a SubprocessConfig) -> Self {
        Self { program, config }
    }

    /// Build the command with arguments, filtered environment and piped stdio
    pub fn build(&self) -> Command {
        let mut cmd = Command::new(self.program);
        cmd.args(&self.config.args);

        for (key, value) in &self.config.env {
            if DANGEROUS_ENV_VARS.contains(&key.as_str()) {
                log::warn!("Ignoring dangerous environment variable for agent: {key}");
            } else {
                cmd.env(key, value);
            }
        }
        cmd.env("CHATBOT_SESSION_VERSION", VERSION);

        if let Some(ref cwd) = self.config.cwd {
            cmd.current_dir(cwd);
        }

        // stderr is piped rather than inherited so the child cannot touch the
        // parent's terminal; it is drained into the log.
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }
}
