use bytes::Bytes;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::UnixStream;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Longest line accepted before the session is dropped.
pub const DEFAULT_MAX_RECORD_BYTES: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Failed to connect to event socket {}: {source}", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error reading from event socket: {0}")]
    Io(#[from] std::io::Error),
    #[error("Event record exceeds {max} bytes")]
    RecordTooLong { max: usize },
    #[error("Event socket connection closed locally")]
    Interrupted,
}

/// One connection to the Faucet event socket, split into newline-delimited
/// records.
///
/// Dropping the reader closes the connection.
pub struct StreamReader {
    path: PathBuf,
    frames: FramedRead<UnixStream, AnyDelimiterCodec>,
    closer: CancellationToken,
    max_record_bytes: usize,
}

impl StreamReader {
    pub async fn connect(path: &Path, max_record_bytes: usize) -> Result<Self, StreamError> {
        let stream = UnixStream::connect(path)
            .await
            .map_err(|source| StreamError::Connect {
                path: path.to_path_buf(),
                source,
            })?;

        info!(socket = %path.display(), "Connected to event socket");

        let codec = AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), Vec::new(), max_record_bytes);

        Ok(Self {
            path: path.to_path_buf(),
            frames: FramedRead::new(stream, codec),
            closer: CancellationToken::new(),
            max_record_bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Token that interrupts [`next_record`](Self::next_record) when cancelled.
    pub fn closer(&self) -> CancellationToken {
        self.closer.clone()
    }

    pub fn close(&self) {
        self.closer.cancel();
    }

    /// Waits for the next complete line.
    ///
    /// `Ok(None)` is a clean end of stream. A trailing `\r` is stripped and a
    /// final line without a terminator is still returned before the end of
    /// stream. Once closed, every call returns `Interrupted`.
    pub async fn next_record(&mut self) -> Result<Option<Bytes>, StreamError> {
        tokio::select! {
            biased;
            () = self.closer.cancelled() => Err(StreamError::Interrupted),
            frame = self.frames.next() => match frame {
                None => Ok(None),
                Some(Ok(line)) => Ok(Some(strip_carriage_return(line))),
                Some(Err(AnyDelimiterCodecError::Io(e))) => Err(StreamError::Io(e)),
                Some(Err(_)) => Err(StreamError::RecordTooLong {
                    max: self.max_record_bytes,
                }),
            },
        }
    }
}

impl std::fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamReader")
            .field("path", &self.path)
            .field("closed", &self.closer.is_cancelled())
            .field("max_record_bytes", &self.max_record_bytes)
            .finish()
    }
}

fn strip_carriage_return(line: Bytes) -> Bytes {
    match line.last() {
        Some(b'\r') => line.slice(..line.len() - 1),
        _ => line,
    }
}
