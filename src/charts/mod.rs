//! Charts module - interactive and static chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartData, ChartPlotter};
pub use renderer::StaticChartRenderer;
