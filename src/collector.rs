//! Rolling aggregation of the reports published by probes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use topowatch_types::Report;

/// Default retention window for collected reports.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15);

/// Keeps every report received within a sliding window and serves their
/// merge.
///
/// Reports may arrive from many probes concurrently and in any order; the
/// merged view does not depend on arrival order. The merge is computed
/// outside the lock and cached until the retained set changes.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use topowatch::Collector;
/// use topowatch_types::{Node, Report, PROCESS};
///
/// let collector = Collector::new(Duration::from_secs(15));
/// collector.add(Report::builder().node(PROCESS, Node::new("h;1")).build());
/// collector.add(Report::builder().node(PROCESS, Node::new("h;2")).build());
///
/// assert_eq!(collector.report().process.len(), 2);
/// ```
#[derive(Debug)]
pub struct Collector {
    window: Duration,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    reports: Vec<(Instant, Arc<Report>)>,
    waiters: Vec<mpsc::Sender<()>>,
    /// Bumped whenever `reports` changes.
    generation: u64,
    merged: Option<(u64, Arc<Report>)>,
}

impl Inner {
    fn prune(&mut self, now: Instant, window: Duration) {
        let before = self.reports.len();
        self.reports
            .retain(|(at, _)| now.saturating_duration_since(*at) < window);
        let pruned = before - self.reports.len();
        if pruned > 0 {
            self.generation += 1;
            tracing::debug!(pruned, retained = self.reports.len(), "pruned expired reports");
        }
    }
}

impl Collector {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Add a report received now.
    pub fn add(&self, report: Report) {
        self.add_at(report, Instant::now());
    }

    /// Add a report received at `now`.
    ///
    /// Empty reports are ignored. Every registered waiter is signalled once
    /// the report is stored.
    pub fn add_at(&self, report: Report, now: Instant) {
        if report.is_empty() {
            tracing::trace!(id = %report.id, "ignoring empty report");
            return;
        }

        let mut inner = self.inner.lock();
        tracing::debug!(id = %report.id, nodes = report.node_count(), "collected report");
        inner.reports.push((now, Arc::new(report)));
        inner.generation += 1;
        inner.prune(now, self.window);

        // closed channels unregister themselves
        inner.waiters.retain(|waiter| match waiter.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    /// The merge of every report within the window.
    pub fn report(&self) -> Report {
        self.report_at(Instant::now())
    }

    /// The merge of every report within the window ending at `now`.
    pub fn report_at(&self, now: Instant) -> Report {
        let (generation, reports) = {
            let mut inner = self.inner.lock();
            inner.prune(now, self.window);
            if let Some((generation, merged)) = &inner.merged {
                if *generation == inner.generation {
                    return Report::clone(merged);
                }
            }
            let reports: Vec<Arc<Report>> = inner.reports.iter().map(|(_, r)| r.clone()).collect();
            (inner.generation, reports)
        };

        let merged = match reports.split_first() {
            Some((first, rest)) => rest
                .iter()
                .fold(Report::clone(first), |acc, report| acc.merge(report)),
            None => Report::new(),
        };

        let mut inner = self.inner.lock();
        if inner.generation == generation {
            inner.merged = Some((generation, Arc::new(merged.clone())));
        }
        merged
    }

    /// Number of reports currently retained.
    pub fn len(&self) -> usize {
        self.inner.lock().reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a channel to be signalled whenever a report is added.
    ///
    /// Signals are best effort: a full channel misses the signal, which is
    /// harmless for a channel of capacity one since a wake-up is pending.
    pub fn wait_on(&self, waiter: mpsc::Sender<()>) {
        self.inner.lock().waiters.push(waiter);
    }

    /// Unregister a channel registered with [`Collector::wait_on`].
    pub fn un_wait(&self, waiter: &mpsc::Sender<()>) {
        self.inner
            .lock()
            .waiters
            .retain(|registered| !registered.same_channel(waiter));
    }

    /// Register a fresh channel and return its receiving end.
    pub fn subscribe(&self) -> mpsc::Receiver<()> {
        let (tx, rx) = mpsc::channel(1);
        self.wait_on(tx);
        rx
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
