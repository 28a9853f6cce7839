//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`].

pub mod chmod;
pub mod dispatcher;
pub mod lookup;
pub mod path;
pub mod set;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
