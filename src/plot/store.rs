//! Per-series sample storage
//!
//! Each series is an append-only list of samples; the sample index is the
//! X axis. Series keep first-seen order so iteration is deterministic.

use crate::filter::PatternFilter;
use crate::types::{IncrementalStats, XWindow};
use std::collections::HashMap;

/// A named, append-only sample sequence
#[derive(Debug, Clone)]
pub struct Series {
    name: String,
    values: Vec<f64>,
    stats: IncrementalStats,
}

impl Series {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
            stats: IncrementalStats::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Running statistics over the full history
    pub fn stats(&self) -> &IncrementalStats {
        &self.stats
    }

    fn push(&mut self, value: f64) {
        self.values.push(value);
        self.stats.push(value);
    }
}

/// Insertion-ordered map from series name to samples
#[derive(Debug, Clone, Default)]
pub struct PlotStore {
    series: Vec<Series>,
    index: HashMap<String, usize>,
}

impl PlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, creating the series on first use
    pub fn append(&mut self, name: &str, value: f64) {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                tracing::debug!("New series {:?}", name);
                self.series.push(Series::new(name));
                let idx = self.series.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        self.series[idx].push(value);
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.index.get(name).map(|&idx| &self.series[idx])
    }

    /// All series in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &Series> + '_ {
        self.series.iter()
    }

    /// Series whose name passes `graph_filter`, as `(name, samples)`
    ///
    /// Each call starts a fresh pass over whatever has been appended so far.
    pub fn iterate<'a>(
        &'a self,
        graph_filter: &'a PatternFilter,
    ) -> impl Iterator<Item = (&'a str, &'a [f64])> + 'a {
        self.series
            .iter()
            .filter(move |s| graph_filter.matches(&s.name))
            .map(|s| (s.name.as_str(), s.values.as_slice()))
    }

    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    /// Length of the longest series
    pub fn max_len(&self) -> usize {
        self.series.iter().map(Series::len).max().unwrap_or(0)
    }

    pub fn total_samples(&self) -> usize {
        self.series.iter().map(Series::len).sum()
    }

    /// X-axis range for this frame
    ///
    /// Without follow the full history is shown. With follow the range ends
    /// at the longest series and spans at most `window_size` samples.
    pub fn compute_window(&self, follow: bool, window_size: usize) -> XWindow {
        if !follow {
            return XWindow::Unbounded;
        }
        XWindow::follow(self.max_len(), window_size)
    }

    /// Number of series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Remove every series and sample
    pub fn clear(&mut self) {
        self.series.clear();
        self.index.clear();
    }
}
