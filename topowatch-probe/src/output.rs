//! Output backends for publishing reports.

use std::path::PathBuf;

use topowatch_types::Report;

/// Where a probe publishes its reports.
#[derive(Debug)]
pub enum Output {
    /// Write each report to a JSON file.
    ///
    /// The file is overwritten with each report.
    File(PathBuf),

    /// Send reports to a TCP server.
    ///
    /// Each report is sent as a newline-delimited JSON message.
    Tcp(String),

    /// Send reports through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    #[cfg(feature = "tokio")]
    Channel(tokio::sync::mpsc::Sender<Report>),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use topowatch_probe::Output;
    ///
    /// let output = Output::file("report.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a TCP output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use topowatch_probe::Output;
    ///
    /// let output = Output::tcp("localhost:4040");
    /// ```
    pub fn tcp(addr: impl Into<String>) -> Self {
        Output::Tcp(addr.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use topowatch_probe::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive reports
    /// // while let Some(report) = rx.recv().await {
    /// //     println!("Got report with {} nodes", report.node_count());
    /// // }
    /// ```
    #[cfg(feature = "tokio")]
    pub fn channel(buffer: usize) -> (Self, tokio::sync::mpsc::Receiver<Report>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Publish a report to this output.
    ///
    /// TCP and channel outputs are best effort: an unreachable server or a
    /// full channel drops the report without an error.
    #[cfg(feature = "tokio")]
    pub(crate) async fn emit(&self, report: &Report) -> crate::Result<()> {
        match self {
            Output::File(path) => {
                let json = serde_json::to_string_pretty(report)?;
                tokio::fs::write(path, json).await?;
            }
            Output::Tcp(addr) => {
                use tokio::io::AsyncWriteExt;
                use tokio::net::TcpStream;

                let json = serde_json::to_string(report)?;
                match TcpStream::connect(addr).await {
                    Ok(mut stream) => {
                        let _ = stream.write_all(json.as_bytes()).await;
                        let _ = stream.write_all(b"\n").await;
                    }
                    Err(e) => tracing::debug!(addr = %addr, error = %e, "report dropped"),
                }
            }
            Output::Channel(tx) => {
                if tx.try_send(report.clone()).is_err() {
                    tracing::debug!("report channel full or closed; report dropped");
                }
            }
        }
        Ok(())
    }
}
