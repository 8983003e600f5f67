//! PNG chart rendering for aggregates and run trends
//!
//! # Limitations
//!
//! Charts are diagram-only: axis labels and category names are not drawn.
//! Text rendering is not supported due to the complexity of font handling;
//! pair the chart with its CSV for exact values.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use thiserror::Error;
use tracing::debug;

/// Default chart width in pixels
pub const CHART_WIDTH: u32 = 640;
/// Default chart height in pixels
pub const CHART_HEIGHT: u32 = 400;

const MARGIN_LEFT: u32 = 48;
const MARGIN_RIGHT: u32 = 16;
const MARGIN_TOP: u32 = 16;
const MARGIN_BOTTOM: u32 = 32;

const BACKGROUND: Rgb<u8> = Rgb([255u8, 255u8, 255u8]);
const AXIS: Rgb<u8> = Rgb([0u8, 0u8, 0u8]);
const BAR_FILL: Rgb<u8> = Rgb([135u8, 206u8, 235u8]);
const LINE_STROKE: Rgb<u8> = Rgb([70u8, 130u8, 180u8]);
const GRID: Rgb<u8> = Rgb([220u8, 220u8, 220u8]);

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum RenderError {
    /// Requested image too small to hold the plot area
    #[error("Chart dimensions too small: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Label and value series differ in length
    #[error("Series length mismatch: {labels} labels, {values} values")]
    SeriesMismatch { labels: usize, values: usize },

    /// Image encoding or write error
    #[error("Image error: {0}")]
    Image(String),
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Image(err.to_string())
    }
}

/// Render a bar chart of `values` (one bar per label) to a PNG at `path`.
///
/// An empty series produces an empty plot (axes only), not an error.
pub fn render_bar_chart(
    labels: &[String],
    values: &[f64],
    path: &Path,
    width: u32,
    height: u32,
) -> Result<(), RenderError> {
    if labels.len() != values.len() {
        return Err(RenderError::SeriesMismatch {
            labels: labels.len(),
            values: values.len(),
        });
    }

    let mut img = blank_canvas(width, height)?;
    draw_axes(&mut img, width, height);

    let max = values.iter().cloned().fold(0.0f64, f64::max);
    if !values.is_empty() && max > 0.0 {
        let plot_w = (width - MARGIN_LEFT - MARGIN_RIGHT) as f32;
        let plot_h = (height - MARGIN_TOP - MARGIN_BOTTOM) as f32;
        let slot = plot_w / values.len() as f32;
        let bar_w = (slot * 0.7).max(1.0);

        for (i, &value) in values.iter().enumerate() {
            if value <= 0.0 {
                continue;
            }
            let bar_h = ((value / max) as f32 * plot_h).max(1.0);
            let x = MARGIN_LEFT as f32 + slot * i as f32 + slot * 0.15;
            let y = MARGIN_TOP as f32 + (plot_h - bar_h);
            draw_filled_rect_mut(
                &mut img,
                Rect::at(x as i32, y as i32).of_size(bar_w as u32, bar_h as u32),
                BAR_FILL,
            );
        }
    }

    img.save(path)?;
    debug!(chart = %path.display(), bars = labels.len(), "Rendered bar chart");
    Ok(())
}

/// Render a line chart of `values` over an evenly spaced x axis to a PNG.
///
/// Used by the dashboard for the total-sales trend. Empty series renders an
/// empty plot.
pub fn render_trend_chart(
    values: &[f64],
    path: &Path,
    width: u32,
    height: u32,
) -> Result<(), RenderError> {
    let mut img = blank_canvas(width, height)?;

    let plot_w = (width - MARGIN_LEFT - MARGIN_RIGHT) as f32;
    let plot_h = (height - MARGIN_TOP - MARGIN_BOTTOM) as f32;

    for i in 1..4 {
        let y = MARGIN_TOP as f32 + plot_h * i as f32 / 4.0;
        draw_line_segment_mut(
            &mut img,
            (MARGIN_LEFT as f32, y),
            ((width - MARGIN_RIGHT) as f32, y),
            GRID,
        );
    }
    draw_axes(&mut img, width, height);

    if !values.is_empty() {
        let max = values.iter().cloned().fold(0.0f64, f64::max);
        let min = values.iter().cloned().fold(max, f64::min).min(0.0);
        let span = (max - min).max(f64::EPSILON);
        let step = if values.len() > 1 {
            plot_w / (values.len() - 1) as f32
        } else {
            0.0
        };

        let point = |i: usize, v: f64| -> (f32, f32) {
            let x = if values.len() > 1 {
                MARGIN_LEFT as f32 + step * i as f32
            } else {
                MARGIN_LEFT as f32 + plot_w / 2.0
            };
            let y = MARGIN_TOP as f32 + plot_h - ((v - min) / span) as f32 * plot_h;
            (x, y)
        };

        for i in 1..values.len() {
            draw_line_segment_mut(
                &mut img,
                point(i - 1, values[i - 1]),
                point(i, values[i]),
                LINE_STROKE,
            );
        }
        for (i, &v) in values.iter().enumerate() {
            let (x, y) = point(i, v);
            draw_filled_circle_mut(&mut img, (x as i32, y as i32), 3, LINE_STROKE);
        }
    }

    img.save(path)?;
    debug!(chart = %path.display(), points = values.len(), "Rendered trend chart");
    Ok(())
}

fn blank_canvas(width: u32, height: u32) -> Result<RgbImage, RenderError> {
    if width < MARGIN_LEFT + MARGIN_RIGHT + 16 || height < MARGIN_TOP + MARGIN_BOTTOM + 16 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    let mut img: RgbImage = ImageBuffer::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = BACKGROUND;
    }
    Ok(img)
}

fn draw_axes(img: &mut RgbImage, width: u32, height: u32) {
    let x0 = MARGIN_LEFT as f32;
    let y0 = (height - MARGIN_BOTTOM) as f32;
    draw_line_segment_mut(img, (x0, MARGIN_TOP as f32), (x0, y0), AXIS);
    draw_line_segment_mut(img, (x0, y0), ((width - MARGIN_RIGHT) as f32, y0), AXIS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bar_chart_writes_png() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("bars.png");
        let labels = vec!["East".to_string(), "West".to_string()];

        render_bar_chart(&labels, &[20.0, 5.0], &path, CHART_WIDTH, CHART_HEIGHT)
            .expect("render");
        let meta = std::fs::metadata(&path).expect("chart file");
        assert!(meta.len() > 0);
    }

    #[test]
    fn test_empty_series_renders_axes_only() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("empty.png");

        render_bar_chart(&[], &[], &path, CHART_WIDTH, CHART_HEIGHT).expect("render");
        assert!(path.exists());
    }

    #[test]
    fn test_series_mismatch_is_error() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("bad.png");
        let labels = vec!["East".to_string()];

        let err = render_bar_chart(&labels, &[1.0, 2.0], &path, CHART_WIDTH, CHART_HEIGHT)
            .expect_err("should fail");
        assert!(matches!(err, RenderError::SeriesMismatch { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_tiny_dimensions_are_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("tiny.png");

        let err = render_bar_chart(&[], &[], &path, 10, 10).expect_err("should fail");
        assert!(matches!(err, RenderError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_trend_chart_writes_png() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("trend.png");

        render_trend_chart(&[10.0, 25.0, 17.5], &path, CHART_WIDTH, 320).expect("render");
        assert!(path.exists());
    }

    #[test]
    fn test_trend_chart_single_point() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("single.png");

        render_trend_chart(&[42.0], &path, CHART_WIDTH, 320).expect("render");
        assert!(path.exists());
    }
}
