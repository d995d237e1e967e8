//! Subprocess agent speaking newline-delimited JSON over stdio

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

use crate::error::{ChatError, Result};
use crate::transport::{AgentOutput, AgentSession};

use super::config::SubprocessConfig;

/// One request line written to the agent
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum AgentRequest<'a> {
    Turn { conversation: &'a str },
}

/// One reply line read from the agent
#[derive(Debug, Deserialize)]
pub(super) struct AgentReply {
    #[serde(default)]
    final_output: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Live process handles
#[derive(Default)]
pub(super) struct ProcessState {
    pub process: Option<Child>,
    pub stdin: Option<ChildStdin>,
    pub stdout: Option<FramedRead<ChildStdout, LinesCodec>>,
    pub stderr_task: Option<JoinHandle<()>>,
}

/// Agent session backed by a long-lived child process
///
/// The program reads `{"type":"turn","conversation":"..."}` lines on stdin
/// and answers each with `{"final_output":"..."}` or `{"error":"..."}` on
/// stdout.
pub struct SubprocessAgent {
    pub(super) config: SubprocessConfig,
    pub(super) program: PathBuf,
    pub(super) state: Mutex<ProcessState>,
    pub(super) ready: AtomicBool,
}

impl SubprocessAgent {
    /// Create an unconnected agent
    ///
    /// # Errors
    /// Returns `ProgramNotFound` if the program cannot be located
    pub fn new(config: SubprocessConfig) -> Result<Self> {
        let program = Self::find_program(&config.program)?;

        Ok(Self {
            config,
            program,
            state: Mutex::new(ProcessState::default()),
            ready: AtomicBool::new(false),
        })
    }

    /// Resolve a program name or path to an executable path
    ///
    /// # Errors
    /// Returns `ProgramNotFound` if nothing matches
    pub fn find_program(program: &std::path::Path) -> Result<PathBuf> {
        if program.components().count() > 1 {
            if program.is_file() {
                return Ok(program.to_path_buf());
            }
            return Err(ChatError::program_not_found(program.display().to_string()));
        }

        which::which(program)
            .map_err(|e| ChatError::program_not_found(format!("{}: {e}", program.display())))
    }

    /// Whether the process is running and its pipes are attached
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn exchange(&self, conversation: &str) -> Result<AgentOutput> {
        let mut state = self.state.lock().await;

        let mut line = serde_json::to_string(&AgentRequest::Turn { conversation })?;
        line.push('\n');

        let stdin = state
            .stdin
            .as_mut()
            .ok_or_else(|| ChatError::transport("stdin not available"))?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ChatError::transport(format!("Failed to write to stdin: {e}")))?;
        stdin
            .flush()
            .await
            .map_err(|e| ChatError::transport(format!("Failed to flush stdin: {e}")))?;

        let stdout = state
            .stdout
            .as_mut()
            .ok_or_else(|| ChatError::connection("Not connected - stdout not available"))?;

        loop {
            let next = tokio::time::timeout(self.config.response_timeout, stdout.next())
                .await
                .map_err(|_| {
                    ChatError::timeout(format!(
                        "agent did not reply within {} ms",
                        self.config.response_timeout.as_millis()
                    ))
                })?;

            let line = match next {
                None => {
                    self.ready.store(false, Ordering::SeqCst);
                    return Err(ChatError::connection("agent closed its output"));
                }
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    return Err(ChatError::transport(format!(
                        "reply exceeded maximum buffer size of {} bytes",
                        self.config.max_buffer_size
                    )));
                }
                Some(Err(LinesCodecError::Io(e))) => return Err(ChatError::Io(e)),
                Some(Ok(line)) => line,
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let reply: AgentReply = serde_json::from_str(line)?;
            return match (reply.final_output, reply.error) {
                (_, Some(error)) => Err(ChatError::transport(format!("agent error: {error}"))),
                (Some(final_output), None) => Ok(AgentOutput { final_output }),
                (None, None) => Err(ChatError::transport(
                    "agent reply has neither final_output nor error",
                )),
            };
        }
    }
}

impl AgentSession for SubprocessAgent {
    async fn connect(&self) -> Result<()> {
        self.connect_impl().await
    }

    async fn send(&self, conversation: &str) -> Result<AgentOutput> {
        // Always (re)connect before sending; a no-op while the process lives.
        self.connect_impl().await?;
        self.exchange(conversation).await
    }

    async fn close(&self) -> Result<()> {
        self.close_impl().await
    }
}

impl Drop for SubprocessAgent {
    fn drop(&mut self) {
        self.drop_impl();
    }
}
