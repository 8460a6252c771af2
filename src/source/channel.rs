//! Channel-based data source.
//!
//! Receives reports via a tokio watch channel, for probes running in the
//! same process as the aggregator.

use tokio::sync::watch;
use topowatch_types::Report;

use super::DataSource;

/// A data source that receives reports via a channel.
///
/// The producer publishes its latest report into the channel; intermediate
/// reports that were never polled are superseded.
///
/// # Example
///
/// ```
/// use topowatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("in-process probe");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Report>,
    description: String,
}

impl ChannelSource {
    /// Create a new channel source.
    pub fn new(receiver: watch::Receiver<Report>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
        }
    }

    /// Create a channel pair for sending reports to a ChannelSource.
    ///
    /// The channel starts out holding an empty report, which `poll` skips.
    pub fn create(source_description: &str) -> (watch::Sender<Report>, Self) {
        let (tx, rx) = watch::channel(Report::new());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Report> {
        if !self.receiver.has_changed().unwrap_or(false) {
            return None;
        }
        let report = self.receiver.borrow_and_update().clone();
        (!report.is_empty()).then_some(report)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topowatch_types::{Node, HOST};

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // Nothing published yet
        assert!(source.poll().is_none());

        let report = Report::builder().node(HOST, Node::new("web-1;<host>")).build();
        tx.send(report.clone()).unwrap();

        assert_eq!(source.poll(), Some(report));
        // No change, so poll returns None
        assert!(source.poll().is_none());
        assert_eq!(source.description(), "channel: test");
    }

    #[test]
    fn test_channel_source_keeps_latest() {
        let (tx, mut source) = ChannelSource::create("test");
        let first = Report::builder().node(HOST, Node::new("a;<host>")).build();
        let second = Report::builder().node(HOST, Node::new("b;<host>")).build();
        tx.send(first).unwrap();
        tx.send(second.clone()).unwrap();

        assert_eq!(source.poll(), Some(second));
        assert!(source.poll().is_none());
    }
}
