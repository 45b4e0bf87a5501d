//! Intensity windowing: raw scanner values to display-ready 8-bit images

use crate::error::{NeurosiftError, Result};
use image::GrayImage;

/// Guards the rescale against a zero-width percentile range
pub const WINDOW_EPSILON: f64 = 1e-8;

/// One 2D slice of rescaled intensities in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSlice {
    rows: u32,
    columns: u32,
    data: Vec<f32>,
}

impl PixelSlice {
    /// Creates a slice, checking that `data` holds `rows * columns` values
    pub fn new(rows: u32, columns: u32, data: Vec<f32>) -> Result<Self> {
        let expected = rows as usize * columns as usize;
        if data.len() != expected {
            return Err(NeurosiftError::PixelDataError(format!(
                "expected {} samples for {}x{}, found {}",
                expected,
                rows,
                columns,
                data.len()
            )));
        }
        Ok(Self {
            rows,
            columns,
            data,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Applies the modality rescale `value * slope + intercept` in place
    pub fn rescale(mut self, slope: f64, intercept: f64) -> Self {
        if slope != 1.0 || intercept != 0.0 {
            for v in self.data.iter_mut() {
                *v = (*v as f64 * slope + intercept) as f32;
            }
        }
        self
    }
}

/// A fixed visualization window
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowLevel {
    pub center: f64,
    pub width: f64,
}

/// How raw intensities are mapped to 8-bit
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WindowStrategy {
    /// Clip to the given percentiles of the strictly positive values, then
    /// rescale linearly. Background zeros do not influence the percentiles.
    Percentile { low: f64, high: f64 },
    /// Clip to `[center - width/2, center + width/2]`, then rescale linearly
    Fixed(WindowLevel),
}

impl Default for WindowStrategy {
    fn default() -> Self {
        WindowStrategy::Percentile {
            low: 1.0,
            high: 99.0,
        }
    }
}

/// Converts a slice to an 8-bit grayscale image of the same shape
///
/// With the default percentile strategy, a slice with no strictly positive
/// value (e.g. an empty background slice) is cast to 8-bit unchanged
/// (saturating), which maps an all-zero slice to an all-zero image.
///
/// The mapping is monotonically non-decreasing in input intensity.
///
/// # Example
///
/// ```
/// use neurosift_core::windowing::{window, PixelSlice, WindowStrategy};
///
/// let slice = PixelSlice::new(1, 4, vec![0.0, 100.0, 200.0, 300.0]).unwrap();
/// let img = window(&slice, WindowStrategy::default());
///
/// assert_eq!(img.dimensions(), (4, 1));
/// assert_eq!(img.get_pixel(0, 0)[0], 0);
/// assert!(img.get_pixel(3, 0)[0] >= img.get_pixel(2, 0)[0]);
/// ```
pub fn window(slice: &PixelSlice, strategy: WindowStrategy) -> GrayImage {
    let (lower, upper) = match strategy {
        WindowStrategy::Percentile { low, high } => {
            let mut positive: Vec<f64> = slice
                .data
                .iter()
                .map(|&v| v as f64)
                .filter(|&v| v > 0.0)
                .collect();

            if positive.is_empty() {
                return cast_to_u8(slice);
            }

            positive.sort_by(|a, b| a.total_cmp(b));
            (percentile(&positive, low), percentile(&positive, high))
        }
        WindowStrategy::Fixed(level) => {
            let half = level.width / 2.0;
            (level.center - half, level.center + half)
        }
    };

    let scale = upper - lower + WINDOW_EPSILON;
    let buffer = slice
        .data
        .iter()
        .map(|&v| {
            let clipped = (v as f64).clamp(lower, upper.max(lower));
            ((clipped - lower) / scale * 255.0) as u8
        })
        .collect();

    to_image(slice, buffer)
}

/// Linear-interpolated percentile of an ascending, non-empty sample
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    let frac = rank - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

fn cast_to_u8(slice: &PixelSlice) -> GrayImage {
    let buffer = slice.data.iter().map(|&v| v as u8).collect();
    to_image(slice, buffer)
}

fn to_image(slice: &PixelSlice, buffer: Vec<u8>) -> GrayImage {
    // PixelSlice::new guarantees the buffer length
    GrayImage::from_raw(slice.columns, slice.rows, buffer)
        .unwrap_or_else(|| GrayImage::new(slice.columns, slice.rows))
}
