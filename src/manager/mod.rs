//! Chat session management
//!
//! Provides `SessionManager`, the single object a request handler needs:
//! it gates turns and owns the agent session's lifecycle.
//!
//! # Module Structure
//!
//! - `core` - `SessionManager` struct, status and shutdown
//! - `interaction` - Turn sending, reset and new-session operations

mod core;
mod interaction;

pub use self::core::SessionManager;
