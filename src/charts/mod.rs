//! Charts module - interactive plots and PNG export

mod plotter;
mod renderer;

pub use plotter::{short_label, ChartPlotter};
pub use renderer::StaticChartRenderer;
