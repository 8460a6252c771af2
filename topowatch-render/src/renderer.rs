//! The renderer contract and the combinators that do not transform nodes.

use std::ops::{Add, AddAssign};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use topowatch_types::Report;

use crate::renderable::RenderableNodes;

/// Summary counts gathered while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Nodes removed by filters on the way to the result.
    pub filtered_nodes: usize,
}

impl Add for Stats {
    type Output = Stats;

    fn add(self, other: Stats) -> Stats {
        Stats {
            filtered_nodes: self.filtered_nodes + other.filtered_nodes,
        }
    }
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Stats) {
        *self = *self + other;
    }
}

/// A pure transformation from a report to a graph of rendered nodes.
///
/// Renderers compose by wrapping: a [`crate::Map`] wraps the renderer whose
/// output it regroups, a [`crate::Filter`] wraps the one it filters, and so
/// on. Rendering the same report twice yields the same graph.
pub trait Renderer: Send + Sync {
    fn render(&self, report: &Report) -> RenderableNodes;

    fn stats(&self, _report: &Report) -> Stats {
        Stats::default()
    }

    /// Render and gather stats together.
    ///
    /// Renderers whose stats depend on their own output override this so
    /// that a stack of them renders its source once.
    fn render_with_stats(&self, report: &Report) -> (RenderableNodes, Stats) {
        (self.render(report), self.stats(report))
    }
}

/// Renderers are shared between the pipelines that build on them.
pub type SharedRenderer = Arc<dyn Renderer>;

impl<R: Renderer + ?Sized> Renderer for Arc<R> {
    fn render(&self, report: &Report) -> RenderableNodes {
        (**self).render(report)
    }

    fn stats(&self, report: &Report) -> Stats {
        (**self).stats(report)
    }

    fn render_with_stats(&self, report: &Report) -> (RenderableNodes, Stats) {
        (**self).render_with_stats(report)
    }
}

/// Any closure can be a renderer.
pub struct RenderFn<F>(pub F);

impl<F> Renderer for RenderFn<F>
where
    F: Fn(&Report) -> RenderableNodes + Send + Sync,
{
    fn render(&self, report: &Report) -> RenderableNodes {
        (self.0)(report)
    }
}

/// Union of several renderers' outputs.
pub struct Reduce {
    renderers: Vec<SharedRenderer>,
}

impl Reduce {
    pub fn new(renderers: Vec<SharedRenderer>) -> Self {
        Self { renderers }
    }
}

impl Renderer for Reduce {
    fn render(&self, report: &Report) -> RenderableNodes {
        let mut out = RenderableNodes::new();
        for renderer in &self.renderers {
            for (_, node) in renderer.render(report) {
                out.add(node);
            }
        }
        out
    }

    fn stats(&self, report: &Report) -> Stats {
        self.renderers
            .iter()
            .fold(Stats::default(), |acc, r| acc + r.stats(report))
    }
}

/// Post-processing applied by a caller on top of a (possibly cached) base
/// pipeline.
pub type Decorator = Arc<dyn Fn(RenderableNodes, &Report) -> RenderableNodes + Send + Sync>;

/// A renderer followed by a caller-supplied [`Decorator`].
///
/// The decorator receives its own copy of the base output, so decorating a
/// memoised renderer never alters what the cache holds.
pub struct Decorated {
    inner: SharedRenderer,
    decorator: Decorator,
}

impl Decorated {
    pub fn new(inner: SharedRenderer, decorator: Decorator) -> Self {
        Self { inner, decorator }
    }
}

impl Renderer for Decorated {
    fn render(&self, report: &Report) -> RenderableNodes {
        (self.decorator)(self.inner.render(report), report)
    }

    fn stats(&self, report: &Report) -> Stats {
        self.inner.stats(report)
    }

    fn render_with_stats(&self, report: &Report) -> (RenderableNodes, Stats) {
        let (nodes, stats) = self.inner.render_with_stats(report);
        ((self.decorator)(nodes, report), stats)
    }
}

/// Render `report`, applying `decorator` to the result if one is given.
pub fn render_with(
    renderer: &dyn Renderer,
    report: &Report,
    decorator: Option<&Decorator>,
) -> RenderableNodes {
    let nodes = renderer.render(report);
    match decorator {
        Some(decorate) => decorate(nodes, report),
        None => nodes,
    }
}
