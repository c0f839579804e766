//! Pie chart of a result summary, rendered to a PNG data URL for use in an Adaptive Card image.

use crate::drain::{DrainError, DrainResult};
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgba, RgbaImage};
use source::ResultSummary;
use std::f64::consts::TAU;

pub const DEFAULT_CHART_SIZE: u32 = 100;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartColors {
    pub pass: [u8; 3],
    pub fail: [u8; 3],
    pub pending: [u8; 3],
    pub skipped: [u8; 3],
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            pass: [0x4C, 0xAF, 0x50],
            fail: [0xF4, 0x43, 0x36],
            pending: [0x99, 0x99, 0x00],
            skipped: [0xFF, 0xC1, 0x07],
        }
    }
}

/// Renders a square pie chart of `size` pixels.
///
/// Slices start at three o'clock and run clockwise in the order skipped, pending, failed,
/// passed. Statuses without tests get no slice; an empty summary yields a transparent image.
pub fn pie_chart(summary: &ResultSummary, size: u32, colors: &ChartColors) -> RgbaImage {
    let slices: Vec<(usize, [u8; 3])> = [
        (summary.skipped, colors.skipped),
        (summary.pending, colors.pending),
        (summary.failed, colors.fail),
        (summary.passed, colors.pass),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .collect();
    let total: usize = slices.iter().map(|(count, _)| count).sum();

    let radius = f64::from(size) / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        if total == 0 {
            return TRANSPARENT;
        }

        let dx = f64::from(x) + 0.5 - radius;
        let dy = f64::from(y) + 0.5 - radius;
        if dx * dx + dy * dy > radius * radius {
            return TRANSPARENT;
        }

        // image y grows downwards, so increasing angles run clockwise
        let mut angle = dy.atan2(dx);
        if angle < 0.0 {
            angle += TAU;
        }
        let position = angle / TAU * total as f64;

        let mut end = 0.0;
        for (count, [r, g, b]) in &slices {
            end += *count as f64;
            if position < end {
                return Rgba([*r, *g, *b, 0xFF]);
            }
        }
        slices
            .last()
            .map_or(TRANSPARENT, |(_, [r, g, b])| Rgba([*r, *g, *b, 0xFF]))
    })
}

pub fn encode_png(image: &RgbaImage) -> DrainResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| DrainError::Chart {
            message: format!("Failed to encode PNG: {}", e),
        })?;
    Ok(out)
}

/// The chart as a `data:image/png;base64,...` URL.
pub fn pie_chart_data_url(summary: &ResultSummary) -> DrainResult<String> {
    let png = encode_png(&pie_chart(summary, DEFAULT_CHART_SIZE, &ChartColors::default()))?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}
