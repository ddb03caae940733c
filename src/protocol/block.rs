//! # Status block as defined by the i3bar protocol.
//!
//! See <https://i3wm.org/docs/i3bar-protocol.html>. Every field except
//! `full_text` is optional; absent fields stay absent when re-encoded and
//! fields unknown to this crate are carried through unchanged in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Block name used for blocks synthesized from custom command output.
pub const CUSTOM_BLOCK_NAME: &str = "customCmd";

/// Minimum block width: either a pixel count or a sample text whose width is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinWidth {
    /// Width in pixels.
    Pixels(u32),
    /// The block is at least as wide as this text.
    Text(String),
}

/// One segment of the status bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
    /// Always emitted: i3bar drops blocks without it.
    #[serde(default)]
    pub full_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<MinWidth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator_block_width: Option<u32>,
    /// Fields this crate does not interpret (`border_top`, `_custom`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusBlock {
    /// Creates a block with only `full_text` set.
    pub fn new(full_text: impl Into<String>) -> Self {
        Self {
            full_text: full_text.into(),
            ..Default::default()
        }
    }

    /// Creates the block shown for plain-text custom command output.
    ///
    /// `instance` is the program name so several custom blocks can be told apart.
    pub fn custom(instance: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self::new(full_text)
            .with_name(CUSTOM_BLOCK_NAME)
            .with_instance(instance)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = Some(urgent);
        self
    }
}
