//! # Protocol header sent once at the start of the stream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FramingError;

/// The only protocol version understood by i3bar.
pub const PROTOCOL_VERSION: u32 = 1;

/// Header object, e.g. `{"version":1,"stop_signal":10,"cont_signal":12,"click_events":true}`.
///
/// Forwarded to the consumer unchanged, including fields not listed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamHeader {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cont_signal: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_events: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StreamHeader {
    /// Returns the header as written by the wrapper when it is the producer itself.
    pub fn new() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            stop_signal: None,
            cont_signal: None,
            click_events: None,
            extra: Map::new(),
        }
    }

    /// Checks that the header announces a supported version.
    pub fn validate(&self) -> Result<(), FramingError> {
        if self.version == PROTOCOL_VERSION {
            Ok(())
        } else {
            Err(FramingError::UnsupportedVersion {
                version: self.version,
            })
        }
    }
}

impl Default for StreamHeader {
    fn default() -> Self {
        Self::new()
    }
}
