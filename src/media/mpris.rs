//! # MPRIS title lookup over the session D-Bus.
//!
//! ```text
//! org.freedesktop.DBus.ListNames
//!   └─► names starting with "org.mpris.MediaPlayer2." (bus order, first wins)
//!         └─► /org/mpris/MediaPlayer2  org.mpris.MediaPlayer2.Player.Metadata
//!               └─► "xesam:title" (string)
//! ```
//!
//! The connection is opened on first use and shared afterwards. If opening
//! fails the error is reported for that cycle and the next lookup retries.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use zbus::{
    Connection, fdo, proxy,
    zvariant::{OwnedValue, Value},
};

use super::TitleSource;
use crate::error::BusError;

const PLAYER_PREFIX: &str = "org.mpris.MediaPlayer2.";
const TITLE_KEY: &str = "xesam:title";

#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2",
    gen_blocking = false
)]
trait Player {
    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;
}

/// Title source backed by the MPRIS D-Bus interface.
#[derive(Default)]
pub struct MprisTitleSource {
    conn: OnceCell<Connection>,
}

impl MprisTitleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared session bus connection, opening it if needed.
    pub async fn connection(&self) -> Result<&Connection, BusError> {
        self.conn
            .get_or_try_init(|| async {
                Connection::session()
                    .await
                    .map_err(|e| BusError::Connect(e.to_string()))
            })
            .await
    }

    async fn list_players(conn: &Connection) -> Result<Vec<String>, BusError> {
        let names = fdo::DBusProxy::new(conn).await?.list_names().await?;
        Ok(names
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| name.starts_with(PLAYER_PREFIX))
            .collect())
    }
}

#[async_trait]
impl TitleSource for MprisTitleSource {
    async fn current_title(&self) -> Result<Option<String>, BusError> {
        let conn = self.connection().await?;
        let players = Self::list_players(conn).await?;
        // TODO: prefer a player whose PlaybackStatus is "Playing" over bus order.
        let Some(player) = players.first() else {
            return Ok(None);
        };

        // One plain Get per cycle; no match rules or cache task per lookup.
        let proxy = PlayerProxy::builder(conn)
            .destination(player.as_str())?
            .cache_properties(proxy::CacheProperties::No)
            .build()
            .await?;
        let metadata = proxy.metadata().await?;
        Ok(title_from_metadata(&metadata))
    }
}

/// Extracts the title string; any other value type counts as no title.
fn title_from_metadata(metadata: &HashMap<String, OwnedValue>) -> Option<String> {
    match metadata.get(TITLE_KEY).map(|value| &**value) {
        Some(Value::Str(title)) => Some(title.as_str().to_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(value: Value<'_>) -> OwnedValue {
        OwnedValue::try_from(value).unwrap()
    }

    #[test]
    fn reads_string_title() {
        let mut metadata = HashMap::new();
        metadata.insert(TITLE_KEY.to_string(), owned(Value::from("Song")));
        metadata.insert("xesam:album".to_string(), owned(Value::from("Album")));
        assert_eq!(title_from_metadata(&metadata).as_deref(), Some("Song"));
    }

    #[test]
    fn missing_or_mistyped_title_is_none() {
        let mut metadata = HashMap::new();
        assert_eq!(title_from_metadata(&metadata), None);

        metadata.insert(TITLE_KEY.to_string(), owned(Value::from(7u32)));
        assert_eq!(title_from_metadata(&metadata), None);
    }

    #[tokio::test]
    async fn repeated_lookups_on_a_live_bus() {
        use std::time::Duration;

        let source = MprisTitleSource::new();
        if source.connection().await.is_err() {
            // No session bus in this environment.
            return;
        }
        for _ in 0..3 {
            let lookup = tokio::time::timeout(Duration::from_secs(5), source.current_title());
            assert!(lookup.await.is_ok());
        }
    }
}
