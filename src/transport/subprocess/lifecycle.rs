//! Lifecycle management for the subprocess agent (connect, close)

use std::sync::atomic::Ordering;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::codec::{FramedRead, LinesCodec};

use crate::error::{ChatError, Result};

use super::command::CommandBuilder;
use super::transport::{ProcessState, SubprocessAgent};

impl SubprocessAgent {
    /// Spawn the agent process unless it is already running
    ///
    /// # Errors
    /// Returns error if process spawning fails or stdio handles cannot be obtained
    pub(super) async fn connect_impl(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        if let Some(child) = state.process.as_mut() {
            match child.try_wait()? {
                None => return Ok(()),
                Some(status) => {
                    log::warn!("Agent process exited ({status}), restarting");
                    self.ready.store(false, Ordering::SeqCst);
                    if let Some(task) = state.stderr_task.take() {
                        task.abort();
                    }
                    *state = ProcessState::default();
                }
            }
        }

        let mut cmd = CommandBuilder::new(&self.program, &self.config).build();

        let mut child = cmd.spawn().map_err(|e| {
            if let Some(ref cwd) = self.config.cwd
                && !cwd.exists()
            {
                return ChatError::connection(format!(
                    "Working directory does not exist: {}",
                    cwd.display()
                ));
            }
            ChatError::connection(format!(
                "Failed to start agent {}: {e}",
                self.program.display()
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChatError::connection("Failed to get stdin handle"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChatError::connection("Failed to get stdout handle"))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ChatError::connection("Failed to get stderr handle"))?;

        // Drain stderr so the child never blocks on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut lines = FramedRead::new(stderr, LinesCodec::new());
            while let Some(Ok(line)) = lines.next().await {
                log::debug!("[agent stderr] {line}");
            }
        });

        log::info!(
            "Agent process started: {} (pid {:?})",
            self.program.display(),
            child.id()
        );

        state.stdin = Some(stdin);
        state.stdout = Some(FramedRead::new(
            stdout,
            LinesCodec::new_with_max_length(self.config.max_buffer_size),
        ));
        state.process = Some(child);
        state.stderr_task = Some(stderr_task);
        self.ready.store(true, Ordering::SeqCst);

        Ok(())
    }

    /// Close the process and clean up resources
    ///
    /// # Errors
    /// Returns error if waiting on the process fails
    pub(super) async fn close_impl(&self) -> Result<()> {
        self.ready.store(false, Ordering::SeqCst);
        let mut state = self.state.lock().await;

        // Closing stdin asks the agent to exit on its own.
        if let Some(mut stdin) = state.stdin.take() {
            let _ = stdin.shutdown().await;
        }

        if let Some(task) = state.stderr_task.take() {
            task.abort();
        }

        state.stdout = None;

        if let Some(mut child) = state.process.take() {
            match tokio::time::timeout(self.config.close_timeout, child.wait()).await {
                Ok(Ok(status)) => log::debug!("Agent process exited: {status}"),
                Ok(Err(e)) => return Err(ChatError::Io(e)),
                Err(_) => {
                    log::warn!(
                        "Agent process did not exit within {} ms, killing it",
                        self.config.close_timeout.as_millis()
                    );
                    let _ = child.kill().await;
                    let _ = child.wait().await;
                }
            }
        }

        Ok(())
    }

    /// Handle Drop cleanup
    pub(super) fn drop_impl(&mut self) {
        let state = self.state.get_mut();

        state.stdin = None;

        if let Some(task) = state.stderr_task.take() {
            task.abort();
        }

        if let Some(mut child) = state.process.take() {
            let _ = child.start_kill();
        }
    }
}
