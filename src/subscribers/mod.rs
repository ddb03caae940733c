//! # Event subscribers for the wrapper runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`] for handling runtime events broadcast through
//! the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Runner/Scheduler/Wrapper ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                                │
//!                                                        SubscriberSet::emit
//!                                                         ┌──────┴──────┐
//!                                                         ▼             ▼
//!                                                     LogWriter      Custom
//! ```

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
