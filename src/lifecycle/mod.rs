//! Session lifecycle management
//!
//! Owns the single current agent session: lazy creation, initialization
//! under a timeout, and forced teardown after failures.
//!
//! # Module Structure
//!
//! - `core` - `SessionLifecycle` with the current-session slot and reset
//! - `init` - Initialization raced against the timeout
//! - `interaction` - Turn execution and teardown on failure
//! - `handle` - `SessionHandle` and its state

mod core;
mod handle;
mod init;
mod interaction;

pub use self::core::SessionLifecycle;
pub use handle::{ReadySession, SessionHandle};
