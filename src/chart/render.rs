//! RC-011: Chart renderers — SVG (labelled) and PNG (rasterized bars).
//!
//! Both share one layout: bars sorted by the caller, y axis in whole-number
//! ticks with one step of headroom above the tallest bar.

use crate::core::markup;
use image::{ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

const SLOT: u32 = 48;
const BAR: u32 = 32;
const LEFT: u32 = 70;
const RIGHT: u32 = 30;
const TOP: u32 = 60;
const PLOT_H: u32 = 360;
const BOTTOM_FLAT: u32 = 70;
const BOTTOM_ROTATED: u32 = 150;

/// Tick labels are rotated 45° above this many bars.
pub const ROTATE_LABELS_ABOVE: usize = 6;

pub const TITLE: &str = "Most Popular Ingredients in Recipes";

const SKY_BLUE: [u8; 3] = [135, 206, 235];
const GRID: [u8; 3] = [230, 230, 230];
const AXIS: [u8; 3] = [40, 40, 40];
const WHITE: [u8; 3] = [255, 255, 255];

/// Rendering failure.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("nothing to render")]
    NoBars,

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot encode {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Turns ranked `(ingredient, count)` bars into an image file.
pub trait ChartRenderer: Send + Sync {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, bars: &[(String, usize)], path: &Path) -> Result<(), RenderError>;
}

/// On-disk chart format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Svg,
    Png,
}

impl ChartFormat {
    pub const ALL: [ChartFormat; 2] = [Self::Svg, Self::Png];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    pub fn renderer(self) -> Box<dyn ChartRenderer> {
        match self {
            Self::Svg => Box::new(SvgRenderer),
            Self::Png => Box::new(PngRenderer),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
        }
    }

    /// Format for a file extension, if it is one we produce.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Geometry shared by both renderers.
struct Layout {
    bars: usize,
    step: usize,
    y_max: usize,
    rotate: bool,
}

impl Layout {
    fn new(bars: &[(String, usize)]) -> Result<Self, RenderError> {
        let max = bars.iter().map(|(_, c)| *c).max().ok_or(RenderError::NoBars)?;
        let step = max.div_ceil(5).max(1);
        Ok(Self {
            bars: bars.len(),
            step,
            y_max: step * (max / step + 1),
            rotate: bars.len() > ROTATE_LABELS_ABOVE,
        })
    }

    fn width(&self) -> u32 {
        LEFT + SLOT * self.bars as u32 + RIGHT
    }

    fn height(&self) -> u32 {
        TOP + PLOT_H + if self.rotate { BOTTOM_ROTATED } else { BOTTOM_FLAT }
    }

    fn baseline(&self) -> u32 {
        TOP + PLOT_H
    }

    fn scale(&self, value: usize) -> u32 {
        (value as u64 * PLOT_H as u64 / self.y_max as u64) as u32
    }

    fn bar_x(&self, index: usize) -> u32 {
        LEFT + SLOT * index as u32 + (SLOT - BAR) / 2
    }

    fn ticks(&self) -> impl Iterator<Item = usize> {
        (0..=self.y_max).step_by(self.step)
    }
}

/// Labelled vector chart.
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn to_svg(&self, bars: &[(String, usize)]) -> Result<String, RenderError> {
        let layout = Layout::new(bars)?;
        let (w, h) = (layout.width(), layout.height());
        let base = layout.baseline();
        let mut svg = String::new();

        // fmt::Write into a String cannot fail
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#
        );
        let _ = writeln!(svg, r#"<rect width="{w}" height="{h}" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="32" text-anchor="middle" font-size="18">{TITLE}</text>"#,
            w / 2
        );

        for tick in layout.ticks() {
            let y = base - layout.scale(tick);
            let _ = writeln!(
                svg,
                r##"<line x1="{LEFT}" y1="{y}" x2="{}" y2="{y}" stroke="#000000" stroke-opacity="0.1"/>"##,
                w - RIGHT
            );
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="end" font-size="11">{tick}</text>"#,
                LEFT - 8,
                y + 4
            );
        }

        for (i, (name, count)) in bars.iter().enumerate() {
            let x = layout.bar_x(i);
            let bar_h = layout.scale(*count);
            let cx = x + BAR / 2;
            let _ = writeln!(
                svg,
                r#"<rect x="{x}" y="{}" width="{BAR}" height="{bar_h}" fill="skyblue"/>"#,
                base - bar_h
            );
            let _ = writeln!(
                svg,
                r#"<text x="{cx}" y="{}" text-anchor="middle" font-size="11">{count}</text>"#,
                base - bar_h - 4
            );
            let ly = base + 16;
            if layout.rotate {
                let _ = writeln!(
                    svg,
                    r#"<text x="{cx}" y="{ly}" text-anchor="end" font-size="10" transform="rotate(-45 {cx} {ly})">{}</text>"#,
                    markup::escape(name)
                );
            } else {
                let _ = writeln!(
                    svg,
                    r#"<text x="{cx}" y="{ly}" text-anchor="middle" font-size="10">{}</text>"#,
                    markup::escape(name)
                );
            }
        }

        let _ = writeln!(
            svg,
            r##"<line x1="{LEFT}" y1="{TOP}" x2="{LEFT}" y2="{base}" stroke="#282828"/>"##
        );
        let _ = writeln!(
            svg,
            r##"<line x1="{LEFT}" y1="{base}" x2="{}" y2="{base}" stroke="#282828"/>"##,
            w - RIGHT
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="12">Ingredients</text>"#,
            w / 2,
            h - 12
        );
        let mid = TOP + PLOT_H / 2;
        let _ = writeln!(
            svg,
            r#"<text x="18" y="{mid}" text-anchor="middle" font-size="12" transform="rotate(-90 18 {mid})">Frequency</text>"#
        );
        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

impl ChartRenderer for SvgRenderer {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, bars: &[(String, usize)], path: &Path) -> Result<(), RenderError> {
        let svg = self.to_svg(bars)?;
        std::fs::write(path, svg).map_err(|e| RenderError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Raster chart: bars, grid and axes. Text is left to the SVG variant.
pub struct PngRenderer;

impl PngRenderer {
    pub fn to_image(&self, bars: &[(String, usize)]) -> Result<RgbImage, RenderError> {
        let layout = Layout::new(bars)?;
        let (w, h) = (layout.width(), layout.height());
        let base = layout.baseline();
        let mut img = RgbImage::from_pixel(w, h, Rgb(WHITE));

        for tick in layout.ticks() {
            let y = base - layout.scale(tick);
            fill_rect(&mut img, LEFT, y, w - LEFT - RIGHT, 1, GRID);
        }
        for (i, (_, count)) in bars.iter().enumerate() {
            let bar_h = layout.scale(*count);
            fill_rect(&mut img, layout.bar_x(i), base - bar_h, BAR, bar_h, SKY_BLUE);
        }
        fill_rect(&mut img, LEFT - 1, TOP, 2, PLOT_H + 1, AXIS);
        fill_rect(&mut img, LEFT - 1, base, w - LEFT - RIGHT + 1, 2, AXIS);
        Ok(img)
    }
}

impl ChartRenderer for PngRenderer {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn render(&self, bars: &[(String, usize)], path: &Path) -> Result<(), RenderError> {
        let img = self.to_image(bars)?;
        img.save_with_format(path, ImageFormat::Png)
            .map_err(|e| RenderError::Image {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

/// Fill a rectangle, clipped to the image.
fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: [u8; 3]) {
    let x1 = x0.saturating_add(w).min(img.width());
    let y1 = y0.saturating_add(h).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, Rgb(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(n: usize) -> Vec<(String, usize)> {
        (0..n).map(|i| (format!("ing{i}"), n - i)).collect()
    }

    #[test]
    fn test_rc011_layout_ticks() {
        let layout = Layout::new(&[("a".to_string(), 10)]).unwrap();
        assert_eq!(layout.step, 2);
        assert_eq!(layout.y_max, 12);
        assert_eq!(layout.ticks().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8, 10, 12]);

        let single = Layout::new(&[("a".to_string(), 1)]).unwrap();
        assert_eq!(single.step, 1);
        assert_eq!(single.y_max, 2);
    }

    #[test]
    fn test_rc011_empty_bars_rejected() {
        assert!(matches!(SvgRenderer.to_svg(&[]), Err(RenderError::NoBars)));
        assert!(matches!(PngRenderer.to_image(&[]), Err(RenderError::NoBars)));
    }

    #[test]
    fn test_rc011_svg_labels_and_counts() {
        let svg = SvgRenderer
            .to_svg(&[("Milti".to_string(), 3), ("Piens".to_string(), 1)])
            .unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(TITLE));
        assert!(svg.contains(">Milti</text>"));
        assert!(svg.contains(">3</text>"));
        assert!(svg.contains("Frequency"));
        assert!(!svg.contains("rotate(-45"));
    }

    #[test]
    fn test_rc011_svg_rotates_long_label_sets() {
        let svg = SvgRenderer.to_svg(&bars(ROTATE_LABELS_ABOVE + 1)).unwrap();
        assert_eq!(
            svg.matches("rotate(-45").count(),
            ROTATE_LABELS_ABOVE + 1
        );
    }

    #[test]
    fn test_rc011_svg_escapes_names() {
        let svg = SvgRenderer
            .to_svg(&[("Sāls & <pipari>".to_string(), 1)])
            .unwrap();
        assert!(svg.contains("Sāls &amp; &lt;pipari&gt;"));
    }

    #[test]
    fn test_rc011_png_dimensions_and_bar_pixel() {
        let img = PngRenderer.to_image(&bars(3)).unwrap();
        assert_eq!(img.width(), LEFT + SLOT * 3 + RIGHT);
        assert_eq!(img.height(), TOP + PLOT_H + BOTTOM_FLAT);
        let x = LEFT + (SLOT - BAR) / 2 + BAR / 2;
        let y = TOP + PLOT_H - 5;
        assert_eq!(img.get_pixel(x, y), &Rgb(SKY_BLUE));
    }

    #[test]
    fn test_rc011_png_render_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.tmp");
        PngRenderer.render(&bars(2), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_rc011_format_roundtrip() {
        for format in [ChartFormat::Svg, ChartFormat::Png] {
            let ext = format.renderer().extension();
            assert_eq!(ChartFormat::from_extension(ext), Some(format));
            assert_eq!(format.to_string(), ext);
        }
        assert_eq!(ChartFormat::from_extension("gif"), None);
    }
}
