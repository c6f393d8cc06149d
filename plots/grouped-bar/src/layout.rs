use common::{
    error::ChartError,
    table::{COLUMN_COUNT, MeasurementTable},
};
use tracing::{debug, warn};

use crate::GroupedBar;

/// One bar in chart coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub trace: usize,
    pub column: usize,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// Everything the renderer draws, already clipped to the visible ranges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub bars: Vec<Bar>,
    pub ticks: Vec<Tick>,
    pub legend: Vec<String>,
}

/// Subdivisions of one x unit on the drawn axis, which is integer valued so that its
/// key points can carry trace names
pub const X_STEPS: f64 = 1000.0;

/// Position `x` in axis steps
pub fn x_step(x: f64) -> i32 {
    (x * X_STEPS).round() as i32
}

impl Bar {
    /// Whether anything of the bar shows, values clamped to the y minimum leave nothing
    pub fn is_visible(&self) -> bool {
        self.top > self.bottom
    }
}

impl Layout {
    /// Trace name for an x axis key point in axis steps, empty for anything else
    pub fn tick_label(&self, step: i32) -> String {
        self.ticks
            .iter()
            .find(|tick| x_step(tick.position) == step)
            .map(|tick| tick.label.clone())
            .unwrap_or_default()
    }

    pub fn key_points(&self) -> Vec<i32> {
        self.ticks.iter().map(|tick| x_step(tick.position)).collect()
    }
}

/// Pulls `value` into `[min, max]`. Anything not above `min`, NaN included, becomes `min`,
/// which leaves a zero height bar on a log axis.
pub fn clamp_to_range(value: f64, [min, max]: [f64; 2]) -> f64 {
    if value > min { value.min(max) } else { min }
}

impl GroupedBar {
    fn check_ranges(&self) -> Result<(), ChartError> {
        let [x_min, x_max] = self.x_range;
        if !(x_min.is_finite() && x_max.is_finite() && x_min < x_max) {
            return Err(ChartError::InvalidRange {
                axis: "x",
                min: x_min,
                max: x_max,
            });
        }
        let [y_min, y_max] = self.y_range;
        if !(y_min > 0.0 && y_max.is_finite() && y_min < y_max) {
            return Err(ChartError::InvalidRange {
                axis: "y",
                min: y_min,
                max: y_max,
            });
        }
        Ok(())
    }

    pub(crate) fn check_palettes(&self) -> Result<(), ChartError> {
        if self.colors.len() < COLUMN_COUNT {
            return Err(ChartError::PaletteExhausted {
                palette: "colour",
                available: self.colors.len(),
            });
        }
        if self.hatches.len() < COLUMN_COUNT {
            return Err(ChartError::PaletteExhausted {
                palette: "hatch",
                available: self.hatches.len(),
            });
        }
        Ok(())
    }

    /// Places one group of [`COLUMN_COUNT`] bars per trace.
    ///
    /// Bar `j` of trace `i` spans `i + bar_width * (offset_slots + j)` to one bar width
    /// further, and the trace's tick sits at `i + bar_width * tick_offset`.
    pub fn layout(&self, table: &MeasurementTable) -> Result<Layout, ChartError> {
        table.validate()?;
        self.check_palettes()?;
        self.check_ranges()?;

        let [x_min, x_max] = self.x_range;
        let mut layout = Layout::default();
        let mut hidden = 0;
        for (i, (trace, values)) in table.rows().enumerate() {
            let base = i as f64;
            let tick = base + self.bar_width * self.tick_offset;
            if (x_min..=x_max).contains(&tick) {
                layout.ticks.push(Tick {
                    position: tick,
                    label: trace.to_owned(),
                });
            } else {
                hidden += 1;
            }

            for (j, value) in values.into_iter().enumerate() {
                let left = base + self.bar_width * (self.offset_slots + j) as f64;
                let right = left + self.bar_width;
                if right <= x_min || left >= x_max {
                    continue;
                }
                layout.bars.push(Bar {
                    trace: i,
                    column: j,
                    left: left.max(x_min),
                    right: right.min(x_max),
                    bottom: self.y_range[0],
                    top: clamp_to_range(value, self.y_range),
                });
            }
        }
        if hidden > 0 {
            warn!("{hidden} traces fall outside the x range [{x_min}, {x_max}] and are not labelled");
        }

        if table.labels().len() < COLUMN_COUNT && !table.is_empty() {
            warn!(
                "Header has {} labels for {COLUMN_COUNT} series",
                table.labels().len()
            );
        }
        layout.legend = table
            .labels()
            .iter()
            .take(COLUMN_COUNT)
            .cloned()
            .collect();

        debug!(
            "bars={} ticks={} legend={:?}",
            layout.bars.len(),
            layout.ticks.len(),
            layout.legend
        );
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(traces: &[&str], columns: [Vec<f64>; COLUMN_COUNT]) -> MeasurementTable {
        MeasurementTable::new(
            vec!["X".into(), "Y".into(), "Z".into()],
            traces.iter().map(|t| (*t).to_owned()).collect(),
            columns,
        )
        .unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn bars_are_offset_by_three_widths() {
        let table = table(
            &["t1", "t2"],
            [vec![10.0, 40.0], vec![20.0, 50.0], vec![30.0, 60.0]],
        );
        let layout = GroupedBar::default().layout(&table).unwrap();

        assert_eq!(layout.bars.len(), 6);
        for bar in &layout.bars {
            let left = bar.trace as f64 + 0.1 * (3 + bar.column) as f64;
            assert!(close(bar.left, left), "{bar:?}");
            assert!(close(bar.right, left + 0.1), "{bar:?}");
            assert_eq!(bar.bottom, 1.0);
        }
        assert_eq!(layout.bars[4].top, 50.0);

        let ticks: Vec<_> = layout.ticks.iter().map(|t| t.position).collect();
        assert!(close(ticks[0], 0.45) && close(ticks[1], 1.45));
        assert_eq!(layout.key_points(), [450, 1450]);
        assert_eq!(layout.tick_label(1450), "t2");
        assert_eq!(layout.tick_label(700), "");
        assert_eq!(layout.legend, ["X", "Y", "Z"]);
    }

    #[test]
    fn traces_past_four_slots_are_cropped() {
        let names = ["1", "2", "4", "8", "16", "32"];
        let values = vec![100.0; names.len()];
        let table = table(&names, [values.clone(), values.clone(), values]);
        let layout = GroupedBar::default().layout(&table).unwrap();

        assert_eq!(layout.bars.len(), 4 * COLUMN_COUNT);
        assert!(layout.bars.iter().all(|bar| bar.trace < 4));
        let labels: Vec<_> = layout.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["1", "2", "4", "8"]);
    }

    #[test]
    fn bars_straddling_the_edge_are_clipped() {
        let chart = GroupedBar {
            x_range: [0.0, 0.45],
            ..GroupedBar::default()
        };
        let table = table(&["t1"], [vec![5.0], vec![5.0], vec![5.0]]);
        let layout = chart.layout(&table).unwrap();
        assert_eq!(layout.bars.len(), 2);
        assert!(close(layout.bars[1].right, 0.45));
    }

    #[test]
    fn values_are_clamped_to_the_log_range() {
        let table = table(&["t1"], [vec![0.0], vec![-5.0], vec![1e9]]);
        let layout = GroupedBar::default().layout(&table).unwrap();
        let tops: Vec<_> = layout.bars.iter().map(|b| b.top).collect();
        assert_eq!(tops, [1.0, 1.0, 300000.0]);
        let visible: Vec<_> = layout.bars.iter().map(Bar::is_visible).collect();
        assert_eq!(visible, [false, false, true]);
        assert_eq!(clamp_to_range(f64::NAN, [1.0, 10.0]), 1.0);
        assert_eq!(clamp_to_range(5.0, [1.0, 10.0]), 5.0);
    }

    #[test]
    fn empty_table_has_nothing_to_draw() {
        let table = MeasurementTable::from_reader("A\tB\tX\tY\tZ\n".as_bytes(), '\t').unwrap();
        let layout = GroupedBar::default().layout(&table).unwrap();
        assert!(layout.bars.is_empty());
        assert!(layout.ticks.is_empty());
        assert_eq!(layout.legend, ["X", "Y", "Z"]);

        let layout = GroupedBar::default()
            .layout(&MeasurementTable::default())
            .unwrap();
        assert_eq!(layout, Layout::default());
    }

    #[test]
    fn legend_uses_the_first_three_labels() {
        let table = MeasurementTable::from_reader(
            "A\tB\tW\tX\tY\tZ\nt1\t_\t1\t2\t3\n".as_bytes(),
            '\t',
        )
        .unwrap();
        let layout = GroupedBar::default().layout(&table).unwrap();
        assert_eq!(layout.legend, ["W", "X", "Y"]);
    }

    #[test]
    fn short_palettes_are_rejected() {
        let chart = GroupedBar {
            colors: vec!["0.9".into(), "0.6".into()],
            ..GroupedBar::default()
        };
        assert_eq!(
            chart.layout(&MeasurementTable::default()),
            Err(ChartError::PaletteExhausted {
                palette: "colour",
                available: 2
            })
        );

        let chart = GroupedBar {
            hatches: Vec::new(),
            ..GroupedBar::default()
        };
        assert!(matches!(
            chart.layout(&MeasurementTable::default()),
            Err(ChartError::PaletteExhausted { palette: "hatch", .. })
        ));
    }

    #[test]
    fn log_axis_needs_a_positive_minimum() {
        let chart = GroupedBar {
            y_range: [0.0, 100.0],
            ..GroupedBar::default()
        };
        assert!(matches!(
            chart.layout(&MeasurementTable::default()),
            Err(ChartError::InvalidRange { axis: "y", .. })
        ));

        let chart = GroupedBar {
            x_range: [4.0, 0.0],
            ..GroupedBar::default()
        };
        assert!(matches!(
            chart.layout(&MeasurementTable::default()),
            Err(ChartError::InvalidRange { axis: "x", .. })
        ));
    }
}
