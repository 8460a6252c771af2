//! Application state: sources feeding a collector, served through the
//! topology registry.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use topowatch_render::detailed::NodeDetails;
use topowatch_render::{RenderableNodes, TopologyRegistry, TopologySummary};
use topowatch_types::Report;

use crate::collector::Collector;
use crate::config::Settings;
use crate::source::DataSource;

/// Main application state.
pub struct App {
    collector: Arc<Collector>,
    sources: Vec<Box<dyn DataSource>>,
    registry: TopologyRegistry,
}

impl App {
    /// Create an App with no sources yet.
    pub fn new(collector: Arc<Collector>, registry: TopologyRegistry) -> Self {
        Self {
            collector,
            sources: Vec::new(),
            registry,
        }
    }

    /// Create an App sized by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            Arc::new(Collector::new(settings.window()?)),
            TopologyRegistry::new(settings.cache_size),
        ))
    }

    pub fn add_source(&mut self, source: Box<dyn DataSource>) {
        tracing::info!(source = source.description(), "added source");
        self.sources.push(source);
    }

    pub fn with_source(mut self, source: Box<dyn DataSource>) -> Self {
        self.add_source(source);
        self
    }

    /// Returns a description of every source.
    pub fn source_descriptions(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.description()).collect()
    }

    /// Drain every source into the collector.
    ///
    /// Returns how many reports were collected.
    pub fn poll(&mut self) -> usize {
        let mut collected = 0;
        for source in &mut self.sources {
            while let Some(report) = source.poll() {
                self.collector.add(report);
                collected += 1;
            }
        }
        collected
    }

    /// The current error of each failing source, keyed by its description.
    pub fn errors(&self) -> Vec<(String, String)> {
        self.sources
            .iter()
            .filter_map(|s| s.error().map(|e| (s.description().to_string(), e)))
            .collect()
    }

    pub fn collector(&self) -> &Arc<Collector> {
        &self.collector
    }

    pub fn registry(&self) -> &TopologyRegistry {
        &self.registry
    }

    /// The merge of every report within the window.
    pub fn report(&self) -> Report {
        self.collector.report()
    }

    /// Render a view of the current report.
    pub fn topology(&self, name: &str, full: bool) -> Result<RenderableNodes> {
        Ok(self.registry.render_topology(name, &self.report(), full)?)
    }

    /// Details of one node of a view.
    pub fn node(&self, name: &str, id: &str) -> Result<NodeDetails> {
        Ok(self.registry.node_details(name, id, &self.report())?)
    }

    /// Every view with its current size.
    pub fn topologies(&self) -> Vec<TopologySummary> {
        self.registry.summaries(&self.report())
    }

    /// Write a rendered view to `path` as pretty JSON.
    pub fn export(&self, name: &str, full: bool, path: &Path) -> Result<()> {
        let nodes = self.topology(name, full)?;
        let json = serde_json::to_string_pretty(&nodes)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("sources", &self.source_descriptions())
            .field("reports", &self.collector.len())
            .finish_non_exhaustive()
    }
}
