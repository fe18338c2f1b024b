//! Per-frame plot query
//!
//! [`PlotView`] holds the display-side settings (graph filter and follow
//! window) and turns the current [`PlotStore`] contents into a
//! [`PlotFrame`] the renderer can draw directly.

use crate::config::{validate_follow_window, DataConfig};
use crate::error::Result;
use crate::filter::PatternFilter;
use crate::plot::store::PlotStore;
use crate::types::{IncrementalStats, XWindow};

/// One visible series in a frame
#[derive(Debug, Clone)]
pub struct SeriesView<'a> {
    pub name: &'a str,
    /// Full history, indexed from 0
    pub values: &'a [f64],
    /// Part of `values` inside the frame's X window
    pub visible: &'a [f64],
}

impl SeriesView<'_> {
    /// Min/max/average over the visible samples
    pub fn visible_stats(&self) -> IncrementalStats {
        IncrementalStats::from_slice(self.visible)
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct PlotFrame<'a> {
    pub window: XWindow,
    pub series: Vec<SeriesView<'a>>,
}

impl PlotFrame<'_> {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Display settings for the plot panel
#[derive(Debug, Clone)]
pub struct PlotView {
    graph_filter: PatternFilter,
    follow: bool,
    follow_window: usize,
}

impl PlotView {
    /// Build from configuration; the graph filter must compile
    pub fn from_config(config: &DataConfig) -> Result<Self> {
        validate_follow_window(config.follow_window)?;
        Ok(Self {
            graph_filter: PatternFilter::new(&config.graph_filter)?,
            follow: config.follow,
            follow_window: config.follow_window,
        })
    }

    pub fn graph_filter(&self) -> &PatternFilter {
        &self.graph_filter
    }

    /// Replace the graph filter text, keeping the old pattern on error
    pub fn set_graph_filter(&mut self, text: &str) -> Result<()> {
        self.graph_filter.set_text(text)
    }

    pub fn follow(&self) -> bool {
        self.follow
    }

    pub fn set_follow(&mut self, follow: bool) {
        self.follow = follow;
    }

    pub fn follow_window(&self) -> usize {
        self.follow_window
    }

    pub fn set_follow_window(&mut self, window: usize) -> Result<()> {
        validate_follow_window(window)?;
        self.follow_window = window;
        Ok(())
    }

    /// Compute the frame for the current store contents
    pub fn frame<'a>(&'a self, store: &'a PlotStore) -> PlotFrame<'a> {
        let window = store.compute_window(self.follow, self.follow_window);
        let series = store
            .iterate(&self.graph_filter)
            .map(|(name, values)| SeriesView {
                name,
                values,
                visible: window.slice(values),
            })
            .collect();
        PlotFrame { window, series }
    }
}

impl Default for PlotView {
    fn default() -> Self {
        Self {
            graph_filter: PatternFilter::default(),
            follow: true,
            follow_window: crate::config::DEFAULT_FOLLOW_WINDOW,
        }
    }
}
