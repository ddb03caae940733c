//! Runtime core: orchestration and lifecycle.
//!
//! The only public entry points are [`Wrapper`] (built through [`WrapperBuilder`]),
//! which owns the stream loop, and [`shutdown_token`] for signal-driven cancellation.
//!
//! Internal modules:
//! - [`runner`]: executes one command with its deadline and event publishing;
//! - [`scheduler`]: fans commands out per cycle and merges results in order;
//! - [`wrapper`]: reads, merges and writes block sets until the stream ends;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod runner;
mod scheduler;
mod shutdown;
mod wrapper;

pub use builder::WrapperBuilder;
pub use runner::run_command;
pub use scheduler::Scheduler;
pub use shutdown::shutdown_token;
pub use wrapper::Wrapper;
