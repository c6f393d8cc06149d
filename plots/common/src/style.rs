use plotters::{
    coord::Shift,
    prelude::{Circle, DrawingArea, DrawingAreaErrorKind, DrawingBackend, PathElement},
    style::{Color, RGBColor},
};
use thiserror::Error;

/// Pixel position on the drawing area
pub type Pixel = (i32, i32);

/// Bar fill colours, indexed by column
pub const COLOR_PATTERN: &[&str] = &[
    "0.9", "0.6", "0.3", "#eeefff", "c", "b", "1", "0", "0.7", "0.3", "0.6", "0.9", "0.2", "0.5",
    "0.8", "0.1", "0.4", "0.7", "1",
];

/// Bar hatch patterns, indexed by column
pub const HATCH_PATTERN: &[&str] = &[
    "", "", "", "\\", "/", "x", ".", "*", "+", "/", " ", "x", " ", "-",
];

#[derive(Error, Debug, PartialEq)]
pub enum StyleError {
    #[error("Invalid colour: {0:?}")]
    InvalidColor(String),
    #[error("Invalid hatch pattern: {0:?}")]
    InvalidHatch(String),
}

/// Parses a colour written as a grey level (`"0.0"` black to `"1.0"` white), `#rrggbb`,
/// or one of the single letter base colours `b g r c m y k w`.
pub fn parse_color(text: &str) -> Result<RGBColor, StyleError> {
    let invalid = || StyleError::InvalidColor(text.to_owned());
    let text = text.trim();

    if let Some(hex) = text.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        return Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?));
    }

    let color = match text {
        "b" => RGBColor(0, 0, 255),
        "g" => RGBColor(0, 128, 0),
        "r" => RGBColor(255, 0, 0),
        "c" => RGBColor(0, 191, 191),
        "m" => RGBColor(191, 0, 191),
        "y" => RGBColor(191, 191, 0),
        "k" => RGBColor(0, 0, 0),
        "w" => RGBColor(255, 255, 255),
        _ => {
            let level = text.parse::<f64>().map_err(|_| invalid())?;
            if !(0.0..=1.0).contains(&level) {
                return Err(invalid());
            }
            let v = (level * 255.0).round() as u8;
            RGBColor(v, v, v)
        }
    };
    Ok(color)
}

/// Line families drawn over a bar
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hatch {
    pub forward: bool,
    pub back: bool,
    pub horizontal: bool,
    pub vertical: bool,
    pub dots: bool,
}

impl Hatch {
    /// Parses a hatch written with the characters `/ \ | - + x o O . *`.
    /// Blank strings mean no hatch.
    pub fn parse(text: &str) -> Result<Self, StyleError> {
        let mut hatch = Self::default();
        for c in text.chars() {
            match c {
                '/' => hatch.forward = true,
                '\\' => hatch.back = true,
                '|' => hatch.vertical = true,
                '-' => hatch.horizontal = true,
                '+' => {
                    hatch.vertical = true;
                    hatch.horizontal = true;
                }
                'x' | 'X' => {
                    hatch.forward = true;
                    hatch.back = true;
                }
                'o' | 'O' | '.' | '*' => hatch.dots = true,
                ' ' => {}
                _ => return Err(StyleError::InvalidHatch(text.to_owned())),
            }
        }
        Ok(hatch)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Line segments covering the pixel rectangle spanned by `a` and `b`, `spacing` pixels apart
    pub fn segments(&self, a: Pixel, b: Pixel, spacing: i32) -> Vec<[Pixel; 2]> {
        let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
        let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
        let spacing = spacing.max(1);
        let mut segments = Vec::new();

        if self.forward {
            // x + y = c
            let mut c = x0 + y0 + spacing;
            while c < x1 + y1 {
                let (xa, xb) = (x0.max(c - y1), x1.min(c - y0));
                if xa < xb {
                    segments.push([(xa, c - xa), (xb, c - xb)]);
                }
                c += spacing;
            }
        }
        if self.back {
            // y - x = c
            let mut c = y0 - x1 + spacing;
            while c < y1 - x0 {
                let (xa, xb) = (x0.max(y0 - c), x1.min(y1 - c));
                if xa < xb {
                    segments.push([(xa, xa + c), (xb, xb + c)]);
                }
                c += spacing;
            }
        }
        if self.horizontal {
            let mut y = y0 + spacing;
            while y < y1 {
                segments.push([(x0, y), (x1, y)]);
                y += spacing;
            }
        }
        if self.vertical {
            let mut x = x0 + spacing;
            while x < x1 {
                segments.push([(x, y0), (x, y1)]);
                x += spacing;
            }
        }
        segments
    }

    /// Dot centres covering the pixel rectangle spanned by `a` and `b`
    pub fn dot_centres(&self, a: Pixel, b: Pixel, spacing: i32) -> Vec<Pixel> {
        if !self.dots {
            return Vec::new();
        }
        let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
        let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
        let spacing = spacing.max(2);

        let mut centres = Vec::new();
        let mut y = y0 + spacing / 2;
        while y < y1 {
            let mut x = x0 + spacing / 2;
            while x < x1 {
                centres.push((x, y));
                x += spacing;
            }
            y += spacing;
        }
        centres
    }

    pub fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        a: Pixel,
        b: Pixel,
        spacing: i32,
        color: &RGBColor,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        for [from, to] in self.segments(a, b, spacing) {
            area.draw(&PathElement::new(vec![from, to], color.stroke_width(1)))?;
        }
        for centre in self.dot_centres(a, b, spacing) {
            area.draw(&Circle::new(centre, 1, color.filled()))?;
        }
        Ok(())
    }
}
