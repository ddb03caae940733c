//! # Pull-based decoder for the upstream i3bar stream.
//!
//! The producer writes a header object, the `[` token and then an endless
//! sequence of block sets, never closing the outer array:
//!
//! ```text
//! {"version":1}
//! [
//! [{"full_text":"W: up"},{"full_text":"100%"}]
//! ,[{"full_text":"W: up"},{"full_text":"99%"}]
//! ...
//! ```
//!
//! [`BlockReader`] buffers raw bytes and hands complete JSON values to
//! `serde_json` one at a time. A value split across reads is completed by
//! reading more input; anything else that fails to parse is a
//! [`FramingError`].
//!
//! ## Rules
//! - Whitespace and newlines between values are ignored.
//! - One comma is accepted before each block set.
//! - End of input, or a closing `]`, ends the stream (`Ok(None)`).
//! - End of input inside a value is [`FramingError::Truncated`].

use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{StatusBlock, StreamHeader};
use crate::error::FramingError;

const READ_CHUNK: usize = 8 * 1024;

/// Outcome of one decode attempt over the buffered bytes.
enum Decoded<T> {
    Value(T),
    Incomplete,
}

/// Decoder over any async byte source (stdin in production).
pub struct BlockReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    closed: bool,
}

impl<R: AsyncRead + Unpin> BlockReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(READ_CHUNK),
            pos: 0,
            eof: false,
            closed: false,
        }
    }

    /// Reads and validates the header object.
    pub async fn read_header(&mut self) -> Result<StreamHeader, FramingError> {
        if !self.skip_whitespace().await? {
            return Err(FramingError::MissingHeader);
        }
        let header: StreamHeader = self.decode_value(FramingError::Header).await?;
        header.validate()?;
        Ok(header)
    }

    /// Consumes the `[` token that opens the endless array.
    pub async fn read_array_start(&mut self) -> Result<(), FramingError> {
        if !self.skip_whitespace().await? {
            return Err(FramingError::MissingArrayStart);
        }
        match self.buf[self.pos] {
            b'[' => {
                self.pos += 1;
                Ok(())
            }
            other => Err(FramingError::ArrayStart {
                found: char::from(other),
            }),
        }
    }

    /// Returns the next block set, or `None` once the stream has ended.
    ///
    /// Waits until a complete element is available.
    pub async fn next_block_set(&mut self) -> Result<Option<Vec<StatusBlock>>, FramingError> {
        if self.closed {
            return Ok(None);
        }
        if !self.skip_whitespace().await? {
            return Ok(None);
        }
        if self.buf[self.pos] == b',' {
            self.pos += 1;
            if !self.skip_whitespace().await? {
                return Ok(None);
            }
        }
        if self.buf[self.pos] == b']' {
            self.pos += 1;
            self.closed = true;
            return Ok(None);
        }
        self.decode_value(FramingError::BlockSet).await.map(Some)
    }

    /// Decodes one JSON value starting at the cursor, reading more input while it is incomplete.
    async fn decode_value<T, F>(&mut self, malformed: F) -> Result<T, FramingError>
    where
        T: DeserializeOwned,
        F: Fn(serde_json::Error) -> FramingError,
    {
        loop {
            match self.try_decode::<T>().map_err(&malformed)? {
                Decoded::Value(value) => return Ok(value),
                Decoded::Incomplete => {
                    if !self.fill().await? {
                        return Err(FramingError::Truncated);
                    }
                }
            }
        }
    }

    fn try_decode<T: DeserializeOwned>(&mut self) -> Result<Decoded<T>, serde_json::Error> {
        let mut stream = serde_json::Deserializer::from_slice(&self.buf[self.pos..]).into_iter::<T>();
        match stream.next() {
            Some(Ok(value)) => {
                self.pos += stream.byte_offset();
                Ok(Decoded::Value(value))
            }
            Some(Err(e)) if e.is_eof() => Ok(Decoded::Incomplete),
            Some(Err(e)) => Err(e),
            None => Ok(Decoded::Incomplete),
        }
    }

    /// Advances past whitespace. Returns `false` if input ended first.
    async fn skip_whitespace(&mut self) -> Result<bool, FramingError> {
        loop {
            while let Some(byte) = self.buf.get(self.pos) {
                if !byte.is_ascii_whitespace() {
                    return Ok(true);
                }
                self.pos += 1;
            }
            if !self.fill().await? {
                return Ok(false);
            }
        }
    }

    /// Reads another chunk, dropping consumed bytes first. Returns `false` on end of input.
    async fn fill(&mut self) -> Result<bool, FramingError> {
        if self.eof {
            return Ok(false);
        }
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        self.buf.reserve(READ_CHUNK);
        let n = self.inner.read_buf(&mut self.buf).await?;
        if n == 0 {
            self.eof = true;
            return Ok(false);
        }
        Ok(true)
    }
}
