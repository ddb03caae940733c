//! # i3bar protocol codec.
//!
//! - [`StatusBlock`], [`StreamHeader`] - the protocol data model
//! - [`BlockReader`] - pull-based decoder for the upstream stream
//! - [`BlockWriter`] - encoder for the downstream stream

mod block;
mod header;
mod reader;
mod writer;

pub use block::{CUSTOM_BLOCK_NAME, MinWidth, StatusBlock};
pub use header::{PROTOCOL_VERSION, StreamHeader};
pub use reader::BlockReader;
pub use writer::BlockWriter;
