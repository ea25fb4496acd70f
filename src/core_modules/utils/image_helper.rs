pub mod image_helper {
    use crate::core_modules::annotator::StrokeColor;
    use crate::core_modules::grid::{PixelGrid, PixelSampler};
    use crate::core_modules::rectangle::Rectangle;
    use crate::error::MarkupError;
    use image::{ImageEncoder, RgbImage};
    use std::path::Path;

    /// Decodes a rasterized page (PNG, JPEG, ...) into a validated grid.
    pub fn load_page(path: &Path) -> Result<PixelGrid, MarkupError> {
        let decoded = image::open(path)?;
        let grid = PixelGrid::from_image(&decoded)?;
        tracing::debug!(
            path = %path.display(),
            width = grid.width(),
            height = grid.height(),
            "loaded page"
        );
        Ok(grid)
    }

    pub fn save_png(path: &Path, canvas: &RgbImage) -> Result<(), MarkupError> {
        let output = std::io::BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            image::ExtendedColorType::Rgb8,
        )?;

        Ok(())
    }

    /// Draws the outline of `rect` inward, `border` pixels thick, clipped to the image.
    pub fn draw_outline(canvas: &mut RgbImage, rect: &Rectangle, stroke: StrokeColor, border: u32) {
        let x1 = rect.x1.min(canvas.width());
        let y1 = rect.y1.min(canvas.height());
        if rect.x0 >= x1 || rect.y0 >= y1 {
            return;
        }
        // A border wider than the clipped box just fills it.
        let border = border.clamp(1, (x1 - rect.x0).min(y1 - rect.y0));
        let color = image::Rgb([stroke.red, stroke.green, stroke.blue]);

        for y in rect.y0..y1 {
            for x in rect.x0..x1 {
                let on_edge = x < rect.x0.saturating_add(border)
                    || y < rect.y0.saturating_add(border)
                    || x.saturating_add(border) >= x1
                    || y.saturating_add(border) >= y1;
                if on_edge {
                    canvas.put_pixel(x, y, color);
                }
            }
        }
    }
}
