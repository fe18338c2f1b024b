//! Plot data model
//!
//! - [`PlotStore`] - series storage fed by the entry parser
//! - [`PlotView`] - graph filter and follow window applied per frame

pub mod store;
pub mod view;

pub use store::{PlotStore, Series};
pub use view::{PlotFrame, PlotView, SeriesView};
