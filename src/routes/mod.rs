//! Router Module Index
//!
//! The API is split by whether answers depend on the caller. Page paths are not
//! routed here: they fall through to `handlers::navigation_shell`.

/// Route table queries, identical for every caller.
pub mod public;

/// Routes evaluated against the caller's session.
pub mod session;
