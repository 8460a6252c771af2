//! Caching of rendered graphs per report.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use lru::LruCache;
use parking_lot::Mutex;
use topowatch_types::{Report, ReportId};

use crate::renderable::RenderableNodes;
use crate::renderer::{Renderer, SharedRenderer, Stats};

/// Default number of (renderer, report) results kept.
pub const DEFAULT_CACHE_SIZE: usize = 100;

static NEXT_RENDERER_ID: AtomicUsize = AtomicUsize::new(0);

type Slot = Arc<OnceLock<RenderableNodes>>;

/// A bounded cache of rendered graphs shared by every [`Memoise`] built on
/// it.
///
/// Entries are keyed by the memoising renderer and the report ID, so the
/// cache is only sound for reports whose ID changes whenever their content
/// does. The collector guarantees that for the reports it hands out.
pub struct RenderCache {
    entries: Mutex<LruCache<(usize, ReportId), Slot>>,
}

impl RenderCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Drop every cached graph.
    pub fn reset(&self) {
        self.entries.lock().clear();
        tracing::debug!("render cache reset");
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn slot(&self, key: (usize, ReportId)) -> Slot {
        let mut entries = self.entries.lock();
        if let Some(slot) = entries.get(&key) {
            return Arc::clone(slot);
        }
        let slot = Slot::default();
        entries.put(key, Arc::clone(&slot));
        slot
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl std::fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCache")
            .field("len", &self.len())
            .finish()
    }
}

/// Renders at most once per report ID.
///
/// Concurrent renders of the same report wait for the first one instead of
/// duplicating the work. Callers that need to post-process a memoised graph
/// get their own copy, see [`crate::Decorated`].
pub struct Memoise {
    id: usize,
    inner: SharedRenderer,
    cache: Arc<RenderCache>,
}

impl Memoise {
    pub fn new(inner: SharedRenderer, cache: Arc<RenderCache>) -> Self {
        Self {
            id: NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed),
            inner,
            cache,
        }
    }
}

impl Renderer for Memoise {
    fn render(&self, report: &Report) -> RenderableNodes {
        let slot = self.cache.slot((self.id, report.id.clone()));

        // the lock is released by now; only renders of the same key wait here
        if let Some(nodes) = slot.get() {
            tracing::trace!(renderer = self.id, report = %report.id, "render cache hit");
            return nodes.clone();
        }
        slot.get_or_init(|| {
            tracing::trace!(renderer = self.id, report = %report.id, "render cache miss");
            self.inner.render(report)
        })
        .clone()
    }

    fn stats(&self, report: &Report) -> Stats {
        self.inner.stats(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderable::RenderableNode;
    use crate::renderer::RenderFn;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;
    use topowatch_types::{Node, PROCESS};

    fn counting(calls: Arc<AtomicUsize>) -> SharedRenderer {
        Arc::new(RenderFn(move |report: &Report| {
            calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            report
                .process
                .iter()
                .map(|(id, _)| RenderableNode::new(id))
                .collect::<RenderableNodes>()
        }))
    }

    fn report(id: &str) -> Report {
        Report::builder()
            .id(id)
            .node(PROCESS, Node::new("h;1"))
            .build()
    }

    #[test]
    fn renders_once_per_report() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(RenderCache::default());
        let memo = Memoise::new(counting(calls.clone()), cache.clone());

        let first = memo.render(&report("r1"));
        let second = memo.render(&report("r1"));
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        memo.render(&report("r2"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.reset();
        memo.render(&report("r1"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn renderers_do_not_share_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(RenderCache::default());
        let a = Memoise::new(counting(calls.clone()), cache.clone());
        let b = Memoise::new(counting(calls.clone()), cache.clone());

        a.render(&report("r1"));
        b.render(&report("r1"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn concurrent_renders_are_coalesced() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = Arc::new(Memoise::new(
            counting(calls.clone()),
            Arc::new(RenderCache::default()),
        ));
        let report = Arc::new(report("r1"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = memo.clone();
                let report = report.clone();
                thread::spawn(move || memo.render(&report))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn ids_with_the_same_rendering_do_not_collide() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = Memoise::new(counting(calls.clone()), Arc::new(RenderCache::default()));

        let joined = report("a,b");
        let mut merged = Report::builder()
            .node(PROCESS, Node::new("h;2"))
            .build();
        merged.id = ReportId::new("a").merge(&ReportId::new("b"));
        assert_eq!(joined.id.to_string(), merged.id.to_string());

        let first = memo.render(&joined);
        let second = memo.render(&merged);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(first.get("h;1").is_some());
        assert!(second.get("h;2").is_some());
        assert!(second.get("h;1").is_none());
    }

    #[test]
    fn capacity_evicts_least_recent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(RenderCache::new(1));
        let memo = Memoise::new(counting(calls.clone()), cache.clone());

        memo.render(&report("r1"));
        memo.render(&report("r2"));
        memo.render(&report("r1"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 1);
    }
}
