//! Serial channel with a dedicated writer task
//!
//! Exactly one physical wire exists, so all sends are funneled through a
//! single task that owns the port handle. Concurrent callers queue on the
//! request channel and each write is flushed before its reply is sent,
//! which keeps lines from interleaving on the wire.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_serial::SerialPortBuilderExt;

/// Errors raised while acquiring the serial device at startup
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("serial device not found: {path}")]
    NotFound { path: String },

    #[error("serial device busy (claimed by another process): {path}")]
    Busy { path: String },

    #[error("permission denied opening serial device: {path}")]
    PermissionDenied { path: String },

    #[error("failed to open serial device {path}: {source}")]
    Open {
        path: String,
        source: tokio_serial::Error,
    },
}

/// Errors raised per-send while the channel is live
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("serial write did not complete within {limit:?}")]
    Timeout { limit: Duration },

    #[error("serial device disconnected")]
    Disconnected,
}

enum Request {
    Send {
        line: String,
        reply: oneshot::Sender<Result<(), TransportError>>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Handle to the writer task that owns the open serial port.
///
/// Cheap to clone; all clones share the one underlying connection.
#[derive(Clone)]
pub struct SerialChannel {
    tx: mpsc::Sender<Request>,
}

impl SerialChannel {
    /// Open the named device and spawn the writer task.
    ///
    /// Must be called before any send; a failure here is fatal for the
    /// process, which cannot serve its purpose without the device.
    pub fn open(
        device_path: &str,
        baud_rate: u32,
        io_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let port = tokio_serial::new(device_path, baud_rate)
            .open_native_async()
            .map_err(|e| classify_open_error(device_path, e))?;

        Ok(Self::start(port, io_timeout))
    }

    /// Spawn the writer task over an arbitrary sink. Tests drive this with
    /// an in-memory duplex stream instead of real hardware.
    pub(crate) fn start<W>(writer: W, io_timeout: Duration) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel::<Request>(16);
        tokio::spawn(writer_loop(writer, rx, io_timeout));
        Self { tx }
    }

    /// Write one line and flush it to the device before returning.
    ///
    /// No retries: a stateful hardware command must not be silently
    /// re-issued without an acknowledgement from the device.
    pub async fn send_line(&self, line: String) -> Result<(), TransportError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Send {
                line,
                reply: reply_tx,
            })
            .await
            .map_err(|_| TransportError::Disconnected)?;

        reply_rx.await.map_err(|_| TransportError::Disconnected)?
    }

    /// Release the device handle. Sends issued after this fail with
    /// `Disconnected`; the connection is never implicitly reopened.
    pub async fn shutdown(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Request::Shutdown { done: done_tx }).await.is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn writer_loop<W>(mut writer: W, mut rx: mpsc::Receiver<Request>, io_timeout: Duration)
where
    W: AsyncWrite + Send + Unpin,
{
    while let Some(request) = rx.recv().await {
        match request {
            Request::Send { line, reply } => {
                let result = write_line(&mut writer, line.as_bytes(), io_timeout).await;
                let device_gone = matches!(result, Err(TransportError::Disconnected));
                let _ = reply.send(result);
                if device_gone {
                    break;
                }
            }
            Request::Shutdown { done } => {
                let _ = writer.shutdown().await;
                let _ = done.send(());
                return;
            }
        }
    }

    let _ = writer.shutdown().await;
}

/// Write all bytes and flush, bounded by the configured timeout.
///
/// The flush is what lets the caller claim the bytes physically left the
/// process rather than sitting in an output buffer.
async fn write_line<W>(
    writer: &mut W,
    bytes: &[u8],
    limit: Duration,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Send + Unpin,
{
    let io = async {
        writer.write_all(bytes).await?;
        writer.flush().await?;
        Ok::<_, io::Error>(())
    };

    match timeout(limit, io).await {
        Ok(Ok(())) => Ok(()),
        // Any I/O failure mid-write means the device vanished under us
        Ok(Err(_)) => Err(TransportError::Disconnected),
        Err(_) => Err(TransportError::Timeout { limit }),
    }
}

fn classify_open_error(path: &str, err: tokio_serial::Error) -> ConnectionError {
    match err.kind() {
        tokio_serial::ErrorKind::NoDevice => ConnectionError::NotFound { path: path.into() },
        tokio_serial::ErrorKind::Io(io::ErrorKind::NotFound) => {
            ConnectionError::NotFound { path: path.into() }
        }
        tokio_serial::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
            ConnectionError::PermissionDenied { path: path.into() }
        }
        tokio_serial::ErrorKind::Io(io::ErrorKind::ResourceBusy) => {
            ConnectionError::Busy { path: path.into() }
        }
        _ => ConnectionError::Open {
            path: path.into(),
            source: err,
        },
    }
}
