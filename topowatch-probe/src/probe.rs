//! The probe: collects reporters into one report and publishes it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use topowatch_types::{Report, ReportId};

use crate::output::Output;
use crate::reporter::Reporter;
use crate::tagger::Tagger;

/// The main entry point on the probe side.
///
/// A probe owns a set of reporters and taggers. Each tick asks every
/// reporter for a report, merges the results, and runs the taggers over the
/// merged report; the background loop publishes the result to every output.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use topowatch_probe::{HostTagger, Output, Probe};
///
/// #[tokio::main]
/// async fn main() {
///     let probe = Probe::builder()
///         .tagger(HostTagger::new("web-1", "probe-1"))
///         .output(Output::tcp("localhost:4040"))
///         .interval(Duration::from_secs(1))
///         .build();
///
///     // Start background publishing
///     let handle = probe.start();
///
///     tokio::time::sleep(Duration::from_secs(5)).await;
///     handle.stop();
/// }
/// ```
pub struct Probe {
    pipeline: Arc<Pipeline>,
    outputs: Arc<Vec<Output>>,
    interval: Duration,
}

struct Pipeline {
    reporters: Vec<Box<dyn Reporter>>,
    taggers: Vec<Box<dyn Tagger>>,
    window_ms: u64,
}

impl Pipeline {
    fn tick(&self) -> Report {
        let mut report = Report::new();
        for reporter in &self.reporters {
            match reporter.report() {
                Ok(r) => report = report.merge(&r),
                Err(e) => tracing::warn!(reporter = reporter.name(), error = %e, "reporter failed"),
            }
        }
        // Every tick is a new report instance, whatever IDs the reporters used
        report.id = ReportId::random();

        for tagger in &self.taggers {
            match tagger.tag(report.clone()) {
                Ok(tagged) => report = tagged,
                Err(e) => tracing::warn!(tagger = tagger.name(), error = %e, "tagger failed"),
            }
        }

        report.window_ms = report.window_ms.max(self.window_ms);
        report
    }
}

impl Probe {
    /// Create a builder for configuring the probe.
    pub fn builder() -> ProbeBuilder {
        ProbeBuilder::new()
    }

    /// Collect one report from all reporters.
    ///
    /// Failing reporters and taggers are logged and skipped, so a tick
    /// always yields a report. Its window is at least the publish interval.
    pub fn tick(&self) -> Report {
        self.pipeline.tick()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Collect a report and publish it to all outputs immediately.
    #[cfg(feature = "tokio")]
    pub async fn publish_now(&self) -> Report {
        let report = self.tick();
        publish(&self.outputs, &report).await;
        report
    }

    /// Start background publishing.
    ///
    /// This spawns a tokio task that publishes a fresh report every
    /// interval, the first one immediately, until the returned handle is
    /// stopped or dropped.
    #[cfg(feature = "tokio")]
    pub fn start(&self) -> crate::PublishHandle {
        use tokio::sync::watch;

        let (stop_tx, stop_rx) = watch::channel(false);
        let pipeline = self.pipeline.clone();
        let outputs = self.outputs.clone();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            let mut stop_rx = stop_rx;

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let report = pipeline.tick();
                        tracing::trace!(nodes = report.node_count(), "publishing report");
                        publish(&outputs, &report).await;
                    }
                    changed = stop_rx.changed() => {
                        // a dropped handle closes the channel
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("probe stopped publishing");
        });

        crate::PublishHandle { stop_tx, task }
    }
}

#[cfg(feature = "tokio")]
async fn publish(outputs: &[Output], report: &Report) {
    for output in outputs {
        if let Err(e) = output.emit(report).await {
            tracing::warn!(output = ?output, error = %e, "failed to publish report");
        }
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reporters: Vec<&str> = self.pipeline.reporters.iter().map(|r| r.name()).collect();
        let taggers: Vec<&str> = self.pipeline.taggers.iter().map(|t| t.name()).collect();
        f.debug_struct("Probe")
            .field("reporters", &reporters)
            .field("taggers", &taggers)
            .field("outputs", &self.outputs)
            .field("interval", &self.interval)
            .finish()
    }
}

/// Builder for configuring a [`Probe`].
#[derive(Default)]
pub struct ProbeBuilder {
    reporters: Vec<Box<dyn Reporter>>,
    taggers: Vec<Box<dyn Tagger>>,
    outputs: Vec<Output>,
    interval: Option<Duration>,
}

impl ProbeBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    /// Add a tagger. Taggers run in the order they are added.
    pub fn tagger(mut self, tagger: impl Tagger + 'static) -> Self {
        self.taggers.push(Box::new(tagger));
        self
    }

    /// Add an output destination.
    ///
    /// Multiple outputs can be added; reports will be published to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the publish interval.
    ///
    /// Defaults to 1 second if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Build the probe.
    pub fn build(self) -> Probe {
        let interval = self.interval.unwrap_or(Duration::from_secs(1));
        Probe {
            pipeline: Arc::new(Pipeline {
                reporters: self.reporters,
                taggers: self.taggers,
                window_ms: interval.as_millis() as u64,
            }),
            outputs: Arc::new(self.outputs),
            interval,
        }
    }
}

impl fmt::Debug for ProbeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeBuilder")
            .field("reporters", &self.reporters.len())
            .field("taggers", &self.taggers.len())
            .field("outputs", &self.outputs)
            .field("interval", &self.interval)
            .finish()
    }
}
