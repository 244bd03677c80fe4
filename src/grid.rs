//! Side-by-side grids of original samples and their reconstructions.
//!
//! Every cell holds an original bitmap followed by its reconstruction, `gap`
//! pixels apart. Cells are separated from each other and from the canvas border
//! by `spacing` pixels. Anything not covered by a bitmap keeps the background
//! colour, which is never a shade of gray so padding can't be mistaken for pixels.

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use rand::Rng;
use tracing::debug;

use super::dataset::DataSet;
use super::error::Result;

pub const GRID_SPACING: u32 = 3;
pub const SMALL_GRID_SPACE: u32 = 1;
pub const BACKGROUND: Rgb<u8> = Rgb([0x2e, 0x86, 0xc1]);

/// Produces an output image for an input image, e.g. an autoencoder.
/// The output must have the same length as the input.
pub trait Reconstructor {
    fn reconstruct(&self, intensities: &[f32]) -> Vec<f32>;
}

impl<F> Reconstructor for F
where
    F: Fn(&[f32]) -> Vec<f32>,
{
    fn reconstruct(&self, intensities: &[f32]) -> Vec<f32> {
        self(intensities)
    }
}

/// Intensity in [0, 1] to luma; 1.0 is black.
pub fn luma(v: f32) -> u8 {
    255 - (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    spacing: u32,
    gap: u32,
    background: Rgb<u8>,
}

impl Default for GridLayout {
    fn default() -> Self {
        GridLayout {
            spacing: GRID_SPACING,
            gap: SMALL_GRID_SPACE,
            background: BACKGROUND,
        }
    }
}

impl GridLayout {
    pub fn new(spacing: u32, gap: u32, background: Rgb<u8>) -> std::result::Result<Self, String> {
        let Rgb([r, g, b]) = background;
        if r == g && g == b {
            return Err("[GridLayout] Background colour must not be a shade of gray!".into());
        }
        Ok(GridLayout {
            spacing,
            gap,
            background,
        })
    }

    pub fn background(&self) -> Rgb<u8> {
        self.background
    }

    /// Canvas (width, height) for a `rows x cols` grid of `width x height` bitmaps.
    pub fn canvas_size(&self, rows: u32, cols: u32, width: u32, height: u32) -> (u32, u32) {
        (
            self.spacing * (cols + 1) + cols * (2 * width + self.gap),
            self.spacing * (rows + 1) + rows * height,
        )
    }

    /// Top-left corner of the original bitmap in cell `(row, col)`.
    pub fn cell_origin(&self, row: u32, col: u32, width: u32, height: u32) -> (u32, u32) {
        (
            self.spacing * (col + 1) + col * (2 * width + self.gap),
            self.spacing * (row + 1) + row * height,
        )
    }

    /// Top-left corner of the reconstruction in cell `(row, col)`.
    pub fn reconstruction_origin(&self, row: u32, col: u32, width: u32, height: u32) -> (u32, u32) {
        let (x, y) = self.cell_origin(row, col, width, height);
        (x + width + self.gap, y)
    }

    /// Draws `rows * cols` samples picked uniformly at random (with replacement)
    /// from `data`.
    ///
    /// Panics if `data` is empty while the grid isn't, if the reconstructor
    /// returns fewer values than a bitmap holds, or if a bitmap dimension does
    /// not fit in a `u32`.
    pub fn compose_with_rng<R, G>(
        &self,
        reconstructor: &R,
        data: &DataSet,
        rows: u32,
        cols: u32,
        rng: &mut G,
    ) -> RgbImage
    where
        R: Reconstructor + ?Sized,
        G: Rng,
    {
        let w = u32::try_from(data.width()).expect("bitmap width exceeds u32::MAX");
        let h = u32::try_from(data.height()).expect("bitmap height exceeds u32::MAX");
        let (canvas_w, canvas_h) = self.canvas_size(rows, cols, w, h);
        debug!(rows, cols, canvas_w, canvas_h, "composing reconstruction grid");
        let mut canvas = RgbImage::from_pixel(canvas_w, canvas_h, self.background);

        for row in 0..rows {
            for col in 0..cols {
                let sample = &data[rng.gen_range(0..data.len())];
                let reconstruction = reconstructor.reconstruct(sample.intensities());

                let (x, y) = self.cell_origin(row, col, w, h);
                draw(&mut canvas, x, y, w, h, sample.intensities());
                let (x, y) = self.reconstruction_origin(row, col, w, h);
                draw(&mut canvas, x, y, w, h, &reconstruction);
            }
        }

        canvas
    }

    pub fn compose<R>(&self, reconstructor: &R, data: &DataSet, rows: u32, cols: u32) -> RgbImage
    where
        R: Reconstructor + ?Sized,
    {
        self.compose_with_rng(reconstructor, data, rows, cols, &mut rand::thread_rng())
    }

    pub fn save<R: Reconstructor + ?Sized>(
        &self,
        path: &Path,
        reconstructor: &R,
        data: &DataSet,
        rows: u32,
        cols: u32,
    ) -> Result<()> {
        let canvas = self.compose(reconstructor, data, rows, cols);
        canvas.save_with_format(path, ImageFormat::Png)?;
        debug!(path = %path.display(), "saved reconstruction grid");
        Ok(())
    }
}

fn draw(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, values: &[f32]) {
    for ry in 0..height {
        for rx in 0..width {
            let l = luma(values[(ry * width + rx) as usize]);
            canvas.put_pixel(x + rx, y + ry, Rgb([l, l, l]));
        }
    }
}

pub fn reconstruction_grid<R>(reconstructor: &R, data: &DataSet, rows: u32, cols: u32) -> RgbImage
where
    R: Reconstructor + ?Sized,
{
    GridLayout::default().compose(reconstructor, data, rows, cols)
}

/// Like [`reconstruction_grid`], but writes the result to `path` as a PNG.
pub fn save_reconstruction_grid<R: Reconstructor + ?Sized>(
    path: &Path,
    reconstructor: &R,
    data: &DataSet,
    rows: u32,
    cols: u32,
) -> Result<()> {
    GridLayout::default().save(path, reconstructor, data, rows, cols)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn identity(x: &[f32]) -> Vec<f32> {
        x.to_vec()
    }

    fn invert(x: &[f32]) -> Vec<f32> {
        x.iter().map(|v| 1.0 - v).collect()
    }

    // `count` 28x28 samples; sample i is a horizontal ramp offset by i.
    fn digits(count: usize) -> DataSet {
        let records = (0..count)
            .map(|i| (0..28 * 28).map(|p| ((p % 28) * 9 + i) as u8).collect())
            .collect();
        let labels = (0..count).map(|i| (i % 10) as u8).collect();
        DataSet::assemble(records, labels, 28, 28).unwrap()
    }

    fn inside_bitmap(layout: &GridLayout, rows: u32, cols: u32, px: u32, py: u32) -> bool {
        (0..rows).any(|row| {
            (0..cols).any(|col| {
                let (ox, oy) = layout.cell_origin(row, col, 28, 28);
                let (rx, ry) = layout.reconstruction_origin(row, col, 28, 28);
                let hit = |x: u32, y: u32| px >= x && px < x + 28 && py >= y && py < y + 28;
                hit(ox, oy) || hit(rx, ry)
            })
        })
    }

    #[test]
    fn luma_darkens_with_intensity() {
        assert_eq!(luma(0.0), 255);
        assert_eq!(luma(1.0), 0);
        assert_eq!(luma(128.0 / 255.0), 127);
        assert_eq!(luma(-0.5), 255);
        assert_eq!(luma(3.0), 0);
    }

    #[test]
    fn canvas_matches_layout_formulas() {
        let layout = GridLayout::default();

        // 3*(3+1) + 3*(2*28+1), 3*(2+1) + 2*28
        assert_eq!(layout.canvas_size(2, 3, 28, 28), (183, 65));
        assert_eq!(layout.cell_origin(0, 0, 28, 28), (3, 3));
        assert_eq!(layout.cell_origin(1, 2, 28, 28), (3 * 3 + 2 * 57, 3 * 2 + 28));
        assert_eq!(layout.reconstruction_origin(1, 2, 28, 28), (3 * 3 + 2 * 57 + 29, 3 * 2 + 28));
    }

    #[test]
    fn padding_keeps_background_colour() {
        let layout = GridLayout::default();
        let (rows, cols) = (2, 3);
        let mut rng = StdRng::seed_from_u64(7);
        let grid = layout.compose_with_rng(&identity, &digits(5), rows, cols, &mut rng);

        assert_eq!(grid.dimensions(), layout.canvas_size(rows, cols, 28, 28));
        for (px, py, pixel) in grid.enumerate_pixels() {
            if inside_bitmap(&layout, rows, cols, px, py) {
                let Rgb([r, g, b]) = *pixel;
                assert!(r == g && g == b, "non-gray pixel at ({}, {})", px, py);
            } else {
                assert_eq!(*pixel, BACKGROUND, "pixel at ({}, {})", px, py);
            }
        }
    }

    #[test]
    fn pair_shows_original_then_reconstruction() {
        let layout = GridLayout::default();
        let data = digits(1);
        let sample = &data[0];
        let grid = layout.compose_with_rng(&invert, &data, 1, 2, &mut StdRng::seed_from_u64(1));

        for col in 0..2 {
            let (ox, oy) = layout.cell_origin(0, col, 28, 28);
            let (rx, ry) = layout.reconstruction_origin(0, col, 28, 28);
            for (i, &v) in sample.intensities().iter().enumerate() {
                let (dx, dy) = ((i % 28) as u32, (i / 28) as u32);
                let l = luma(v);
                assert_eq!(*grid.get_pixel(ox + dx, oy + dy), Rgb([l, l, l]));
                let l = luma(1.0 - v);
                assert_eq!(*grid.get_pixel(rx + dx, ry + dy), Rgb([l, l, l]));
            }
        }
    }

    #[test]
    fn same_seed_same_grid() {
        let data = digits(50);
        let a = reconstruction_grid_seeded(&data, 11);
        let b = reconstruction_grid_seeded(&data, 11);
        assert_eq!(a, b);
    }

    fn reconstruction_grid_seeded(data: &DataSet, seed: u64) -> RgbImage {
        let mut rng = StdRng::seed_from_u64(seed);
        GridLayout::default().compose_with_rng(&identity, data, 3, 3, &mut rng)
    }

    #[test]
    fn gray_background_is_rejected() {
        assert!(GridLayout::new(3, 1, Rgb([40, 40, 40])).is_err());
        let layout = GridLayout::new(5, 2, Rgb([255, 0, 0])).unwrap();
        assert_eq!(layout.canvas_size(1, 1, 2, 2), (5 * 2 + 4 + 2, 5 * 2 + 2));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "bitmap width exceeds u32::MAX")]
    fn oversized_bitmap_width_is_a_contract_violation() {
        let data = DataSet::assemble(vec![], vec![], u32::MAX as usize + 1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        GridLayout::default().compose_with_rng(&identity, &data, 0, 0, &mut rng);
    }

    #[test]
    #[should_panic]
    fn short_reconstruction_is_a_contract_violation() {
        let data = digits(1);
        reconstruction_grid(&|_: &[f32]| vec![0.0; 3], &data, 1, 1);
    }
}
