use std::path::Path;

use common::{
    plot::Plot,
    table::{COLUMN_COUNT, MeasurementTable},
};
use eyre::Result;
use plot_common::{
    COLOR_PATTERN, HATCH_PATTERN, Hatch, LegendEntry, clear_legend_area, draw_legend, parse_color,
};
use plotters::{coord::Shift, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod layout;

pub use layout::{Bar, Layout, Tick, X_STEPS, x_step};

/// Grouped bar chart of throughput per trace on a log scale.
///
/// Every field has a default, so a config only needs to name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupedBar {
    /// Width of a bar in x axis units, one trace occupies one unit
    pub bar_width: f64,
    /// Bar widths skipped before the first bar of each group
    pub offset_slots: usize,
    /// Position of the trace label inside its group, in bar widths
    pub tick_offset: f64,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub x_label: String,
    pub y_label: String,
    /// Fill colour per column, see [`plot_common::parse_color`]
    pub colors: Vec<String>,
    /// Hatch per column, see [`plot_common::Hatch::parse`]
    pub hatches: Vec<String>,
    pub legend_columns: usize,
    pub font_size: u32,
    /// Padding around labels and the legend, in pixels
    pub label_pad: u32,
    /// Image size in pixels
    pub size: [u32; 2],
}

impl Default for GroupedBar {
    fn default() -> Self {
        Self {
            bar_width: 0.1,
            offset_slots: 3,
            tick_offset: 4.5,
            x_range: [0.0, 4.0],
            y_range: [1.0, 300000.0],
            x_label: "Threads".to_owned(),
            y_label: "Ops per second".to_owned(),
            colors: COLOR_PATTERN.iter().map(|s| (*s).to_owned()).collect(),
            hatches: HATCH_PATTERN.iter().map(|s| (*s).to_owned()).collect(),
            legend_columns: 3,
            font_size: 30,
            label_pad: 10,
            size: [1600, 1200],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: RGBColor,
    pub hatch: Hatch,
}

impl GroupedBar {
    /// Colour and hatch of each of the [`COLUMN_COUNT`] series, by column position
    pub fn series_styles(&self) -> Result<Vec<SeriesStyle>> {
        self.check_palettes()?;
        let styles = self
            .colors
            .iter()
            .zip(&self.hatches)
            .take(COLUMN_COUNT)
            .map(|(color, hatch)| -> Result<SeriesStyle> {
                Ok(SeriesStyle {
                    color: parse_color(color)?,
                    hatch: Hatch::parse(hatch)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(styles)
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: DrawingArea<DB, Shift>,
        layout: &Layout,
        styles: &[SeriesStyle],
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let [x_min, x_max] = self.x_range;
        let [y_min, y_max] = self.y_range;
        let font = ("sans-serif", self.font_size).into_font();

        let mut chart = ChartBuilder::on(&root)
            .margin(self.label_pad * 2)
            .x_label_area_size(self.font_size * 2 + self.label_pad * 3)
            .y_label_area_size(self.font_size * 4 + self.label_pad * 3)
            .build_cartesian_2d(
                (x_step(x_min)..x_step(x_max)).with_key_points(layout.key_points()),
                (y_min..y_max).log_scale(),
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(layout.ticks.len().max(1))
            .x_label_formatter(&|step: &i32| layout.tick_label(*step))
            .y_label_formatter(&|y| format!("{y:e}"))
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .label_style(font.clone())
            .axis_desc_style(font.clone())
            .draw()?;

        let bar_rect = |bar: &Bar| {
            [
                (x_step(bar.left), bar.bottom),
                (x_step(bar.right), bar.top),
            ]
        };
        let visible = || layout.bars.iter().filter(|bar| bar.is_visible());
        chart.draw_series(
            visible().map(|bar| Rectangle::new(bar_rect(bar), styles[bar.column].color.filled())),
        )?;

        let hatch_spacing = (self.font_size / 3).max(4) as i32;
        for bar in visible() {
            let hatch = styles[bar.column].hatch;
            if hatch.is_empty() {
                continue;
            }
            let [bottom_left, top_right] = bar_rect(bar);
            let a = chart.backend_coord(&bottom_left);
            let b = chart.backend_coord(&top_right);
            hatch.draw(&root, a, b, hatch_spacing, &BLACK)?;
        }

        chart.draw_series(
            visible().map(|bar| Rectangle::new(bar_rect(bar), BLACK.stroke_width(1))),
        )?;

        let entries = layout
            .legend
            .iter()
            .zip(styles)
            .map(|(label, style)| LegendEntry {
                label: label.clone(),
                color: style.color,
                hatch: style.hatch,
            })
            .collect::<Vec<_>>();
        let (left, top) = chart.backend_coord(&(x_step(x_min), y_max));
        let pad = self.label_pad as i32;
        let origin = (left + pad, top + pad);
        clear_legend_area(
            &root,
            origin,
            &entries,
            self.legend_columns,
            self.font_size,
        )?;
        draw_legend(
            &root,
            origin,
            &entries,
            self.legend_columns,
            self.font_size,
        )?;

        root.present()?;
        Ok(())
    }
}

fn is_svg(plot_path: &Path) -> bool {
    plot_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

#[typetag::serde]
impl Plot for GroupedBar {
    fn name(&self) -> &'static str {
        "GroupedBar"
    }

    fn plot(&self, table: &MeasurementTable, plot_path: &Path) -> Result<()> {
        let layout = self.layout(table)?;
        let styles = self.series_styles()?;
        let size = (self.size[0], self.size[1]);

        debug!(
            "Drawing {} bars for {} traces to {}",
            layout.bars.len(),
            table.len(),
            plot_path.display()
        );
        if is_svg(plot_path) {
            self.draw(
                SVGBackend::new(plot_path, size).into_drawing_area(),
                &layout,
                &styles,
            )
        } else {
            self.draw(
                BitMapBackend::new(plot_path, size).into_drawing_area(),
                &layout,
                &styles,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use plot_common::StyleError;

    use super::*;

    const SAMPLE: &str = "A\tB\tX\tY\tZ\nt1\t_\t10\t20\t30\nt2\t_\t40\t50\t60\n";

    #[test]
    fn default_styles_match_the_palettes() {
        let styles = GroupedBar::default().series_styles().unwrap();
        assert_eq!(styles.len(), COLUMN_COUNT);
        assert_eq!(styles[1].color, RGBColor(153, 153, 153));
        assert!(styles[0].color.0 > styles[1].color.0 && styles[1].color.0 > styles[2].color.0);
        assert!(styles.iter().all(|s| s.hatch.is_empty()));
    }

    #[test]
    fn bad_colour_is_reported() {
        let chart = GroupedBar {
            colors: vec!["0.9".into(), "purple-ish".into(), "0.3".into()],
            ..GroupedBar::default()
        };
        let err = chart.series_styles().unwrap_err();
        assert_eq!(
            err.downcast_ref::<StyleError>(),
            Some(&StyleError::InvalidColor("purple-ish".to_owned()))
        );
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let chart: GroupedBar = serde_yml::from_str("font_size: 12\ny_range: [1, 1000]").unwrap();
        assert_eq!(chart.font_size, 12);
        assert_eq!(chart.y_range, [1.0, 1000.0]);
        assert_eq!(chart.bar_width, 0.1);
        assert_eq!(chart.x_label, "Threads");
    }

    #[test]
    fn tagged_yaml_selects_the_plot() {
        let plots: Vec<Box<dyn Plot>> =
            serde_yml::from_str("- type: GroupedBar\n  legend_columns: 1\n").unwrap();
        assert_eq!(plots.len(), 1);
        assert_eq!(plots[0].name(), "GroupedBar");
        assert!(format!("{:?}", plots[0]).contains("legend_columns: 1"));
    }

    #[test]
    fn demo_config_parses() {
        let config: common::config::Config =
            serde_yml::from_str(include_str!("../../../demos/config.yaml")).unwrap();
        let plots = config.plots.unwrap();
        assert_eq!(plots.len(), 1);
        let table = MeasurementTable::from_path(
            Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/results.tsv")),
            config.separator,
        )
        .unwrap();
        assert_eq!(table.labels(), ["ext4", "nova", "pmfs"]);
        assert_eq!(table.traces(), ["1", "2", "4", "8"]);
    }

    #[test]
    fn svg_is_picked_by_extension() {
        assert!(is_svg(Path::new("out/chart.SVG")));
        assert!(!is_svg(Path::new("out/chart.png")));
        assert!(!is_svg(Path::new("chart")));
    }

    #[test]
    fn invalid_table_is_not_drawn() {
        let dir = tempfile::tempdir().unwrap();
        let plot_path = dir.path().join("chart.svg");
        let chart = GroupedBar {
            y_range: [-1.0, 10.0],
            ..GroupedBar::default()
        };
        assert!(chart.plot(&MeasurementTable::default(), &plot_path).is_err());
        assert!(!plot_path.exists());
    }

    /// Body and position of every `<text>` element, bodies trimmed
    fn svg_texts(svg: &str) -> Vec<(String, f64, f64)> {
        let attribute = |tag: &str, name: &str| -> Option<f64> {
            let start = tag.find(&format!(" {name}=\""))? + name.len() + 3;
            tag[start..].split('"').next()?.parse().ok()
        };
        svg.split("<text")
            .skip(1)
            .filter_map(|chunk| {
                let (tag, rest) = chunk.split_once('>')?;
                let (body, _) = rest.split_once("</text>")?;
                Some((
                    body.trim().to_owned(),
                    attribute(tag, "x")?,
                    attribute(tag, "y")?,
                ))
            })
            .collect()
    }

    #[test]
    fn renders_svg() {
        let dir = tempfile::tempdir().unwrap();
        let plot_path = dir.path().join("chart.svg");
        let table = MeasurementTable::from_reader(SAMPLE.as_bytes(), '\t').unwrap();
        GroupedBar::default().plot(&table, &plot_path).unwrap();

        let texts = svg_texts(&read_to_string(&plot_path).unwrap());
        let find = |text: &str| {
            texts
                .iter()
                .find(|(body, ..)| body == text)
                .map(|(_, x, y)| (*x, *y))
                .unwrap_or_else(|| panic!("missing {text} in {texts:?}"))
        };
        for text in ["Z", "t2", "Threads", "Ops per second"] {
            find(text);
        }

        // legend reads left to right in the upper left, above the trace names
        let (x, y) = (find("X"), find("Y"));
        let (t1, t2) = (find("t1"), find("t2"));
        assert!(x.0 < y.0 && y.0 < find("Z").0);
        assert_eq!(x.1, y.1);
        assert!(x.0 < t2.0 && t1.0 < t2.0);
        assert!(x.1 < t1.1);
        assert!(x.0 < 1600.0 / 4.0 && x.1 < 1200.0 / 4.0);
    }

    #[test]
    fn clamped_bars_leave_no_outline() {
        let dir = tempfile::tempdir().unwrap();
        let table =
            MeasurementTable::from_reader("A\tB\tX\tY\tZ\nt1\t_\t0\t0\t0\n".as_bytes(), '\t')
                .unwrap();
        let empty = dir.path().join("empty.svg");
        GroupedBar::default().plot(&table, &empty).unwrap();
        let table =
            MeasurementTable::from_reader("A\tB\tX\tY\tZ\nt1\t_\t9\t9\t9\n".as_bytes(), '\t')
                .unwrap();
        let drawn = dir.path().join("drawn.svg");
        GroupedBar::default().plot(&table, &drawn).unwrap();

        let rects = |path: &Path| read_to_string(path).unwrap().matches("<rect").count();
        assert_eq!(rects(&drawn) - rects(&empty), 2 * COLUMN_COUNT);
    }

    #[test]
    #[ignore = "rasterizes text, needs a sans-serif system font"]
    fn renders_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let plot_path = dir.path().join("empty.png");
        GroupedBar::default()
            .plot(&MeasurementTable::default(), &plot_path)
            .unwrap();
        assert!(plot_path.metadata().unwrap().len() > 0);
    }
}
