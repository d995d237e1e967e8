//! Configuration constants and types for the subprocess agent

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default maximum size of one reply line (1MB)
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Default time to wait for the agent's reply to one turn
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(120);

/// Default grace period for the agent to exit after stdin closes
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Dangerous environment variables that should not be passed to subprocess
///
/// These variables can affect how the subprocess loads and executes code,
/// potentially creating security vulnerabilities.
pub const DANGEROUS_ENV_VARS: &[&str] = &[
    "LD_PRELOAD",
    "LD_LIBRARY_PATH",
    "DYLD_INSERT_LIBRARIES",
    "DYLD_LIBRARY_PATH",
    "PATH",
    "NODE_OPTIONS",
    "PYTHONPATH",
    "PERL5LIB",
    "RUBYLIB",
];

/// How to launch and talk to an agent program
#[derive(Debug, Clone)]
pub struct SubprocessConfig {
    /// Program name (looked up on `PATH`) or path
    pub program: PathBuf,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Extra environment variables; dangerous names are dropped
    pub env: HashMap<String, String>,
    /// Working directory for the process
    pub cwd: Option<PathBuf>,
    /// Time to wait for one reply line
    pub response_timeout: Duration,
    /// Grace period on close before the process is killed
    pub close_timeout: Duration,
    /// Maximum length of one reply line in bytes
    pub max_buffer_size: usize,
}

impl SubprocessConfig {
    /// Configuration for `program` with default limits
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable for the process
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.cwd = Some(path.into());
        self
    }

    /// Set the reply timeout
    #[must_use]
    pub const fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the close grace period
    #[must_use]
    pub const fn close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Set the maximum reply line length
    #[must_use]
    pub const fn max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }
}
