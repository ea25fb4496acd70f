// THEORY:
// The `grid` module is the bridge between a rendered page and the detection
// algorithm. The rasterizer is an external collaborator; all the detector needs is
// the `PixelSampler` contract: a width, a height, and an in-bounds RGB read.
//
// Key architectural principles:
// 1.  **Read-only**: A sampler is never mutated by detection. Scratch state (the
//     visited set) lives in the detector, not here.
// 2.  **Validation at the boundary**: `PixelGrid` rejects zero-sized pages and byte
//     buffers whose length does not match the declared dimensions. Once a grid
//     exists, row-major indexing inside it cannot go out of range.
// 3.  **Adapters**: `image` buffers implement the contract directly, so a decoded
//     page can be scanned without copying. `PixelGrid` is the owned, validated
//     form used when pages cross task or thread boundaries.

use crate::core_modules::pixel::pixel::{Pixel, RGB_CHANNELS, RGBA_CHANNELS};
use crate::error::MarkupError;
use image::{DynamicImage, RgbImage, RgbaImage};

/// Read access to a rasterized page. Origin is the top-left corner.
pub trait PixelSampler {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Callers guarantee `x < width()` and `y < height()`.
    fn pixel(&self, x: u32, y: u32) -> Pixel;
}

/// An owned, immutable, row-major RGB pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, MarkupError> {
        Self::check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(invalid_grid(
                width,
                height,
                format!("expected {expected} pixels, got {}", pixels.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid where every pixel is `fill`.
    pub fn filled(width: u32, height: u32, fill: Pixel) -> Result<Self, MarkupError> {
        Self::check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        })
    }

    /// Builds a grid from tightly packed RGB bytes.
    pub fn from_rgb_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, MarkupError> {
        Self::from_packed(width, height, bytes, RGB_CHANNELS)
    }

    /// Builds a grid from tightly packed RGBA bytes. Alpha is ignored.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, MarkupError> {
        Self::from_packed(width, height, bytes, RGBA_CHANNELS)
    }

    pub fn from_image(image: &DynamicImage) -> Result<Self, MarkupError> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self::from_rgb_bytes(width, height, rgb.as_raw())
    }

    fn from_packed(
        width: u32,
        height: u32,
        bytes: &[u8],
        channels: usize,
    ) -> Result<Self, MarkupError> {
        Self::check_dimensions(width, height)?;
        let expected = width as usize * height as usize * channels;
        if bytes.len() != expected {
            return Err(invalid_grid(
                width,
                height,
                format!("expected {expected} bytes, got {}", bytes.len()),
            ));
        }
        let pixels = bytes
            .chunks_exact(channels)
            .map(Pixel::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    fn check_dimensions(width: u32, height: u32) -> Result<(), MarkupError> {
        if width == 0 || height == 0 {
            return Err(invalid_grid(width, height, "page has no pixels".to_string()));
        }
        Ok(())
    }

    /// Bounds-checked read.
    pub fn try_pixel(&self, x: u32, y: u32) -> Result<Pixel, MarkupError> {
        if x >= self.width || y >= self.height {
            return Err(MarkupError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.pixels[self.index(x, y)])
    }

    /// Mutable access for building fixtures and test pages.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) -> Result<(), MarkupError> {
        self.try_pixel(x, y)?;
        let index = self.index(x, y);
        self.pixels[index] = pixel;
        Ok(())
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(self.pixel(x, y).into())
        })
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

fn invalid_grid(width: u32, height: u32, reason: String) -> MarkupError {
    tracing::warn!(width, height, %reason, "rejecting page grid");
    MarkupError::InvalidGrid {
        width,
        height,
        reason,
    }
}

impl PixelSampler for PixelGrid {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Pixel {
        self.pixels[self.index(x, y)]
    }
}

impl PixelSampler for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> Pixel {
        Pixel::from(self.get_pixel(x, y).0)
    }
}

impl PixelSampler for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> Pixel {
        let [r, g, b, _] = self.get_pixel(x, y).0;
        Pixel::new(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            PixelGrid::filled(0, 4, Pixel::default()),
            Err(MarkupError::InvalidGrid { width: 0, height: 4, .. })
        ));
        assert!(PixelGrid::new(3, 0, Vec::new()).is_err());
    }

    #[test]
    fn rejects_mismatched_buffers() {
        assert!(PixelGrid::new(2, 2, vec![Pixel::default(); 3]).is_err());
        assert!(PixelGrid::from_rgb_bytes(2, 1, &[0; 5]).is_err());
        assert!(PixelGrid::from_rgba_bytes(2, 1, &[0; 6]).is_err());
    }

    #[test]
    fn reads_row_major() {
        let bytes = [
            1, 1, 1, 2, 2, 2, 3, 3, 3, //
            4, 4, 4, 5, 5, 5, 6, 6, 6,
        ];
        let grid = PixelGrid::from_rgb_bytes(3, 2, &bytes).unwrap();
        assert_eq!(grid.pixel(0, 0), Pixel::new(1, 1, 1));
        assert_eq!(grid.pixel(2, 0), Pixel::new(3, 3, 3));
        assert_eq!(grid.pixel(0, 1), Pixel::new(4, 4, 4));
        assert_eq!(grid.pixel(2, 1), Pixel::new(6, 6, 6));
    }

    #[test]
    fn rgba_bytes_ignore_alpha() {
        let grid = PixelGrid::from_rgba_bytes(1, 1, &[9, 8, 7, 0]).unwrap();
        assert_eq!(grid.pixel(0, 0), Pixel::new(9, 8, 7));
    }

    #[test]
    fn try_pixel_checks_bounds() {
        let grid = PixelGrid::filled(4, 4, Pixel::new(1, 2, 3)).unwrap();
        assert_eq!(grid.try_pixel(3, 3).unwrap(), Pixel::new(1, 2, 3));
        assert!(matches!(
            grid.try_pixel(4, 0),
            Err(MarkupError::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(grid.try_pixel(0, 4).is_err());
    }

    #[test]
    fn set_pixel_writes_one_cell() {
        let mut grid = PixelGrid::filled(2, 2, Pixel::default()).unwrap();
        grid.set_pixel(1, 0, Pixel::new(255, 0, 0)).unwrap();
        assert_eq!(grid.pixel(1, 0), Pixel::new(255, 0, 0));
        assert_eq!(grid.pixel(0, 1), Pixel::default());
        assert!(grid.set_pixel(2, 0, Pixel::default()).is_err());
    }

    #[test]
    fn image_adapters_agree_with_grid() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(1, 0, image::Rgba([10, 20, 30, 40]));
        assert_eq!(PixelSampler::pixel(&rgba, 1, 0), Pixel::new(10, 20, 30));

        let grid = PixelGrid::from_image(&DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(grid.pixel(1, 0), Pixel::new(10, 20, 30));

        let rgb = grid.to_rgb_image();
        assert_eq!(PixelSampler::width(&rgb), 2);
        assert_eq!(PixelSampler::pixel(&rgb, 1, 0), Pixel::new(10, 20, 30));
    }
}
