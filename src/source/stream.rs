//! Stream-based data source.
//!
//! Receives reports from an async byte stream.
//! This is useful for network-based sources like a probe's TCP output.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use topowatch_types::Report;

use super::{check_version, DataSource};

/// A data source that receives reports from an async stream.
///
/// This source spawns a background task that reads newline-delimited JSON
/// from the provided async reader and makes reports available via `poll()`.
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use topowatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<Report>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// The reader should provide newline-delimited JSON reports. Blank
    /// lines are skipped and a line that fails to parse is recorded as the
    /// source's error without ending the stream.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();
        let desc = description.to_string();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        tracing::debug!(source = %desc, "stream closed");
                        *error_handle.lock() = Some("Connection closed".to_string());
                        break;
                    }
                    Ok(_) if line.trim().is_empty() => continue,
                    Ok(_) => match serde_json::from_str::<Report>(line.trim()) {
                        Ok(report) => {
                            check_version(&report, &desc);
                            *error_handle.lock() = None;
                            if tx.send(report).await.is_err() {
                                // Receiver dropped
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(source = %desc, error = %e, "skipping malformed report");
                            *error_handle.lock() = Some(format!("Parse error: {}", e));
                        }
                    },
                    Err(e) => {
                        tracing::warn!(source = %desc, error = %e, "stream read failed");
                        *error_handle.lock() = Some(format!("Read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
        }
    }

    /// Create a StreamSource from raw bytes channel.
    ///
    /// Each message is parsed as one complete JSON report.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, report_rx) = mpsc::channel(16);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();
        let desc = description.to_string();

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                match serde_json::from_slice::<Report>(&bytes) {
                    Ok(report) => {
                        check_version(&report, &desc);
                        *error_handle.lock() = None;
                        if tx.send(report).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        *error_handle.lock() = Some(format!("Parse error: {}", e));
                    }
                }
            }
        });

        Self {
            receiver: report_rx,
            description: format!("stream: {}", description),
            last_error,
        }
    }

    /// Wait for the next report.
    ///
    /// Returns `None` once the background task has finished and every
    /// buffered report has been received.
    pub async fn recv(&mut self) -> Option<Report> {
        self.receiver.recv().await
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<Report> {
        // Try to receive without blocking
        match self.receiver.try_recv() {
            Ok(report) => Some(report),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                let mut error = self.last_error.lock();
                if error.is_none() {
                    *error = Some("Stream disconnected".to_string());
                }
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use topowatch_types::{Node, CONTAINER};

    fn sample_json() -> String {
        let report = Report::builder()
            .id("stream-test")
            .node(CONTAINER, Node::new("abc;<container>"))
            .build();
        serde_json::to_string(&report).unwrap()
    }

    #[tokio::test]
    async fn test_stream_source_spawn() {
        let data = format!("{}\n", sample_json());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        // Give the background task time to process
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let report = source.poll().unwrap();
        assert!(report.container.get("abc;<container>").is_some());
    }

    #[tokio::test]
    async fn test_stream_source_multiple_reports() {
        let data = format!("{}\n\n{}\n", sample_json(), sample_json());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert!(source.poll().is_some());
        assert!(source.poll().is_some());

        // No more data
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_recv() {
        let data = format!("{}\n", sample_json());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        assert!(source.recv().await.is_some());
        assert!(source.recv().await.is_none());
        assert_eq!(source.error().as_deref(), Some("Connection closed"));
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "tcp://localhost:4040");
        assert_eq!(source.description(), "stream: tcp://localhost:4040");
    }

    #[tokio::test]
    async fn test_stream_source_from_bytes_channel() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
        let mut source = StreamSource::from_bytes_channel(rx, "test-channel");

        tx.send(b"{ nope".to_vec()).await.unwrap();
        tx.send(sample_json().into_bytes()).await.unwrap();

        let report = source.recv().await.unwrap();
        assert_eq!(report.container.len(), 1);
        assert!(source.error().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_invalid_json() {
        let data = "not valid json\n";
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        // The malformed line is skipped and the stream then closes
        assert!(source.recv().await.is_none());
        assert!(source.poll().is_none());
        assert!(source.error().is_some());
    }
}
