use plotters::{
    coord::Shift,
    prelude::{DrawingArea, DrawingAreaErrorKind, DrawingBackend, Rectangle, Text},
    style::{BLACK, Color, IntoFont, RGBColor, WHITE},
};

use crate::style::{Hatch, Pixel};

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
    pub hatch: Hatch,
}

/// Sizes of a legend laid out in a grid, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendGrid {
    pub columns: usize,
    pub cell_width: i32,
    pub row_height: i32,
    pub swatch: i32,
}

impl LegendGrid {
    /// Sizes the grid so the longest label fits. Text width is approximated from the
    /// font size, which keeps the layout independent of the fonts installed.
    pub fn new(entries: &[LegendEntry], columns: usize, font_size: u32) -> Self {
        let font_size = font_size as i32;
        let longest = entries
            .iter()
            .map(|e| e.label.chars().count())
            .max()
            .unwrap_or(0) as i32;
        let swatch = font_size * 3 / 2;
        Self {
            columns: columns.max(1),
            cell_width: swatch + font_size / 2 + longest * font_size * 3 / 5 + font_size,
            row_height: font_size * 8 / 5,
            swatch,
        }
    }

    /// Top left corner of every entry relative to the legend origin, filling rows first
    pub fn offsets(&self, count: usize) -> Vec<Pixel> {
        (0..count)
            .map(|i| {
                let (row, column) = (i / self.columns, i % self.columns);
                (column as i32 * self.cell_width, row as i32 * self.row_height)
            })
            .collect()
    }
}

/// Draws swatches and labels starting at `origin`, in up to `columns` columns
pub fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    origin: Pixel,
    entries: &[LegendEntry],
    columns: usize,
    font_size: u32,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    if entries.is_empty() {
        return Ok(());
    }

    let grid = LegendGrid::new(entries, columns, font_size);
    let font = ("sans-serif", font_size).into_font();
    let swatch_height = grid.row_height * 3 / 5;
    for (entry, (dx, dy)) in entries.iter().zip(grid.offsets(entries.len())) {
        let top_left = (origin.0 + dx, origin.1 + dy + (grid.row_height - swatch_height) / 2);
        let bottom_right = (top_left.0 + grid.swatch, top_left.1 + swatch_height);

        area.draw(&Rectangle::new([top_left, bottom_right], entry.color.filled()))?;
        entry
            .hatch
            .draw(area, top_left, bottom_right, swatch_height / 3, &BLACK)?;
        area.draw(&Rectangle::new([top_left, bottom_right], BLACK.stroke_width(1)))?;
        area.draw(&Text::new(
            entry.label.clone(),
            (bottom_right.0 + font_size as i32 / 2, origin.1 + dy),
            font.color(&BLACK),
        ))?;
    }
    Ok(())
}

/// Fills the legend background so grid lines do not run through it
pub fn clear_legend_area<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    origin: Pixel,
    entries: &[LegendEntry],
    columns: usize,
    font_size: u32,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    if entries.is_empty() {
        return Ok(());
    }
    let grid = LegendGrid::new(entries, columns, font_size);
    let shown_columns = grid.columns.min(entries.len()) as i32;
    let rows = entries.len().div_ceil(grid.columns) as i32;
    area.draw(&Rectangle::new(
        [
            origin,
            (
                origin.0 + shown_columns * grid.cell_width,
                origin.1 + rows * grid.row_height,
            ),
        ],
        WHITE.mix(0.8).filled(),
    ))
}
