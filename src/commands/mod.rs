//! # Custom commands.
//!
//! - [`CommandSpec`] - one configured external command
//! - [`CommandResult`] - what one execution produced, and its block

mod result;
mod spec;

pub use result::{CommandResult, TIMED_OUT_TEXT};
pub use spec::CommandSpec;
