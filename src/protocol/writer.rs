//! # Encoder for the downstream i3bar stream.
//!
//! Produces the same framing i3status does:
//!
//! ```text
//! {"version":1}\n
//! [\n
//! [...]\n,
//! [...]\n,
//! ```
//!
//! The comma after every block set keeps the outer array open for the next
//! one; i3bar fails to parse the stream without it. Every write is flushed so
//! the bar updates as soon as a cycle is merged.

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{StatusBlock, StreamHeader};

/// Encoder over any async byte sink (stdout in production).
pub struct BlockWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> BlockWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Writes the header as a single line.
    pub async fn write_header(&mut self, header: &StreamHeader) -> std::io::Result<()> {
        self.write_json(header, b"\n").await
    }

    /// Writes the `[` token that opens the endless array.
    pub async fn write_array_start(&mut self) -> std::io::Result<()> {
        self.inner.write_all(b"[\n").await?;
        self.inner.flush().await
    }

    /// Writes one merged block set followed by the separating comma.
    pub async fn write_block_set(&mut self, blocks: &[StatusBlock]) -> std::io::Result<()> {
        self.write_json(blocks, b"\n,").await
    }

    /// Returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    async fn write_json<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
        suffix: &[u8],
    ) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(value)?;
        line.extend_from_slice(suffix);
        self.inner.write_all(&line).await?;
        self.inner.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_i3bar_framing() {
        let mut writer = BlockWriter::new(Vec::new());
        writer.write_header(&StreamHeader::new()).await.unwrap();
        writer.write_array_start().await.unwrap();
        writer
            .write_block_set(&[StatusBlock::custom("echo", "hi"), StatusBlock::new("100%")])
            .await
            .unwrap();
        writer.write_block_set(&[]).await.unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"version\":1}\n[\n[{\"name\":\"customCmd\",\"instance\":\"echo\",\"full_text\":\"hi\"},{\"full_text\":\"100%\"}]\n,[]\n,"
        );
    }
}
