pub mod legend;
pub mod style;

pub use legend::{LegendEntry, clear_legend_area, draw_legend};
pub use style::{COLOR_PATTERN, HATCH_PATTERN, Hatch, StyleError, parse_color};
