//! Time series of gauge samples.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Samples older than this, measured back from the newest sample, are dropped.
pub const METRIC_WINDOW_MS: u64 = 15_000;

/// A single observation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub value: f64,
}

/// An ordered series of samples, at most one per timestamp.
///
/// The series is bounded to [`METRIC_WINDOW_MS`] and may carry a declared
/// maximum, e.g. the number of CPUs for a percentage gauge.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawMetric"))]
pub struct Metric {
    samples: Vec<Sample>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    max: Option<f64>,
}

/// Wire shape of a [`Metric`]; normalized on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawMetric {
    #[serde(default)]
    samples: Vec<Sample>,
    #[serde(default)]
    max: Option<f64>,
}

#[cfg(feature = "serde")]
impl From<RawMetric> for Metric {
    fn from(raw: RawMetric) -> Self {
        let mut metric = Metric {
            samples: Vec::new(),
            max: raw.max,
        };
        for sample in raw.samples {
            metric.insert(sample);
        }
        metric.trim();
        metric
    }
}

/// Windowed summary for display.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSummary {
    pub first: Option<u64>,
    pub last: Option<u64>,
    pub count: usize,
    pub min: f64,
    pub max: f64,
}

/// Greater of two floats under the IEEE total order.
fn max_f64(a: f64, b: f64) -> f64 {
    if a.total_cmp(&b) == Ordering::Less {
        b
    } else {
        a
    }
}

impl Metric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample; a sample at an existing timestamp keeps the greater value.
    pub fn add(mut self, timestamp: u64, value: f64) -> Self {
        self.insert(Sample { timestamp, value });
        self.trim();
        self
    }

    /// Declare the maximum value this gauge can take.
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    fn insert(&mut self, sample: Sample) {
        match self
            .samples
            .binary_search_by(|s| s.timestamp.cmp(&sample.timestamp))
        {
            Ok(pos) => {
                let existing = &mut self.samples[pos];
                existing.value = max_f64(existing.value, sample.value);
            }
            Err(pos) => self.samples.insert(pos, sample),
        }
    }

    fn trim(&mut self) {
        let Some(newest) = self.samples.last().map(|s| s.timestamp) else {
            return;
        };
        let oldest_kept = newest.saturating_sub(METRIC_WINDOW_MS);
        let cut = self.samples.partition_point(|s| s.timestamp < oldest_kept);
        if cut > 0 {
            self.samples.drain(..cut);
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The declared maximum, if any.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn last_value(&self) -> Option<f64> {
        self.samples.last().map(|s| s.value)
    }

    pub fn summary(&self) -> MetricSummary {
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.value), hi.max(s.value))
            });
        MetricSummary {
            first: self.samples.first().map(|s| s.timestamp),
            last: self.samples.last().map(|s| s.timestamp),
            count: self.samples.len(),
            min: if self.samples.is_empty() { 0.0 } else { min },
            max: if self.samples.is_empty() { 0.0 } else { max },
        }
    }

    /// Union of both series, re-trimmed to the window.
    pub fn merge(&self, other: &Metric) -> Metric {
        let mut samples = Vec::with_capacity(self.samples.len() + other.samples.len());
        let (mut i, mut j) = (0, 0);
        while i < self.samples.len() && j < other.samples.len() {
            let (a, b) = (self.samples[i], other.samples[j]);
            match a.timestamp.cmp(&b.timestamp) {
                Ordering::Less => {
                    samples.push(a);
                    i += 1;
                }
                Ordering::Greater => {
                    samples.push(b);
                    j += 1;
                }
                Ordering::Equal => {
                    samples.push(Sample {
                        timestamp: a.timestamp,
                        value: max_f64(a.value, b.value),
                    });
                    i += 1;
                    j += 1;
                }
            }
        }
        samples.extend_from_slice(&self.samples[i..]);
        samples.extend_from_slice(&other.samples[j..]);

        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(max_f64(a, b)),
            (a, b) => a.or(b),
        };

        let mut out = Metric { samples, max };
        out.trim();
        out
    }
}

/// Named metric series of a node.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Metrics(BTreeMap<String, Metric>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `metric` into the series stored under `key`.
    pub fn add(&mut self, key: impl Into<String>, metric: Metric) {
        let key = key.into();
        let merged = match self.0.get(&key) {
            Some(existing) => existing.merge(&metric),
            None => metric,
        };
        self.0.insert(key, merged);
    }

    pub fn lookup(&self, key: &str) -> Option<&Metric> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Metric)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn merge(&self, other: &Metrics) -> Metrics {
        let mut out = self.clone();
        for (key, metric) in &other.0 {
            out.add(key.clone(), metric.clone());
        }
        out
    }
}
