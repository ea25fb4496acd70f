// THEORY:
// The `RegionAnnotator` is the top of the core: it turns a list of markup requests
// into annotation records for one page.
//
// Each `AnnotationRequest` is processed on its own: detect the request's color on
// the page, merge the resulting rectangles, and stamp every merged rectangle with the
// request's comment and stroke color. Requests run in the order given and their
// records are concatenated in that order. No detection or merge state carries over
// from one request to the next.
//
// Stroke colors are 0-255 RGB at this boundary. Writers that want the 0.0-1.0 scale
// call `StrokeColor::normalized`.

use crate::core_modules::color_spec::ColorSpec;
use crate::core_modules::grid::PixelSampler;
use crate::core_modules::pixel::pixel::{NormalizedChannel, Pixel};
use crate::core_modules::rectangle::{OverlapRule, Rectangle};
use crate::core_modules::rectangle_merger::RectangleMerger;
use crate::core_modules::region_detector::region_detector;
use serde::{Deserialize, Serialize};

/// Outline color of an annotation, 0-255 per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl StrokeColor {
    pub const RED: StrokeColor = StrokeColor::new(255, 0, 0);
    pub const GREEN: StrokeColor = StrokeColor::new(0, 255, 0);
    pub const BLUE: StrokeColor = StrokeColor::new(0, 0, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Channels divided by 255.
    pub fn normalized(&self) -> [NormalizedChannel; 3] {
        Pixel::from(*self).normalized()
    }

    /// Inverse of [`normalized`](Self::normalized): clamps to 0.0..=1.0 and rounds.
    pub fn from_normalized(rgb: [NormalizedChannel; 3]) -> Self {
        let channel = |v: NormalizedChannel| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }
}

impl From<StrokeColor> for Pixel {
    fn from(stroke: StrokeColor) -> Self {
        Pixel::new(stroke.red, stroke.green, stroke.blue)
    }
}

impl From<Pixel> for StrokeColor {
    fn from(pixel: Pixel) -> Self {
        StrokeColor::new(pixel.red, pixel.green, pixel.blue)
    }
}

/// One markup pass: which color to find, and how to label what is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRequest {
    pub color: ColorSpec,
    pub comment: String,
    pub stroke: StrokeColor,
}

impl AnnotationRequest {
    pub fn new(color: ColorSpec, comment: impl Into<String>, stroke: StrokeColor) -> Self {
        Self {
            color,
            comment: comment.into(),
            stroke,
        }
    }
}

/// A merged region ready for the annotation writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub rect: Rectangle,
    pub comment: String,
    pub stroke: StrokeColor,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegionAnnotator {
    merger: RectangleMerger,
}

impl RegionAnnotator {
    pub fn new(rule: OverlapRule) -> Self {
        Self {
            merger: RectangleMerger::new(rule),
        }
    }

    /// Runs every request against `grid`, in order.
    pub fn annotate<S: PixelSampler + ?Sized>(
        &self,
        grid: &S,
        requests: &[AnnotationRequest],
    ) -> Vec<AnnotationRecord> {
        requests
            .iter()
            .flat_map(|request| self.annotate_request(grid, request))
            .collect()
    }

    /// Detect, merge and label for a single request.
    pub fn annotate_request<S: PixelSampler + ?Sized>(
        &self,
        grid: &S,
        request: &AnnotationRequest,
    ) -> Vec<AnnotationRecord> {
        let regions = region_detector::detect_regions(grid, &request.color);
        if regions.is_empty() {
            tracing::debug!(
                color = %request.color.target,
                comment = %request.comment,
                "no matching pixels"
            );
            return Vec::new();
        }

        let pixels_matched: usize = regions.iter().map(|r| r.pixel_count).sum();
        let components = regions.len();
        let rects = regions.into_iter().map(|r| r.bounds).collect();
        let merged = self.merger.merge(rects);

        tracing::debug!(
            color = %request.color.target,
            comment = %request.comment,
            pixels_matched,
            components,
            regions = merged.len(),
            "color regions found"
        );

        merged
            .into_iter()
            .map(|rect| AnnotationRecord {
                rect,
                comment: request.comment.clone(),
                stroke: request.stroke,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::grid::PixelGrid;
    use pretty_assertions::assert_eq;

    const SLAB: Pixel = Pixel::new(235, 128, 138);
    const ARCH: Pixel = Pixel::new(128, 253, 128);
    const PAPER: Pixel = Pixel::new(255, 255, 255);

    fn page() -> PixelGrid {
        // Two slab patches touching at a corner, one arch patch far away.
        let mut grid = PixelGrid::filled(12, 8, PAPER).unwrap();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2)] {
            grid.set_pixel(x, y, SLAB).unwrap();
        }
        for (x, y) in [(9, 5), (10, 5), (9, 6)] {
            grid.set_pixel(x, y, ARCH).unwrap();
        }
        grid
    }

    fn requests() -> Vec<AnnotationRequest> {
        vec![
            AnnotationRequest::new(
                ColorSpec::new(SLAB, 30).unwrap(),
                "Structural slab",
                StrokeColor::RED,
            ),
            AnnotationRequest::new(
                ColorSpec::new(ARCH, 30).unwrap(),
                "Arch slab",
                StrokeColor::GREEN,
            ),
        ]
    }

    #[test]
    fn records_follow_request_order() {
        let records = RegionAnnotator::default().annotate(&page(), &requests());
        assert_eq!(
            records,
            vec![
                AnnotationRecord {
                    rect: Rectangle::new(0, 0, 4, 3),
                    comment: "Structural slab".to_string(),
                    stroke: StrokeColor::RED,
                },
                AnnotationRecord {
                    rect: Rectangle::new(9, 5, 11, 7),
                    comment: "Arch slab".to_string(),
                    stroke: StrokeColor::GREEN,
                },
            ]
        );
    }

    #[test]
    fn reversing_requests_reverses_records_only() {
        let mut reversed = requests();
        reversed.reverse();
        let annotator = RegionAnnotator::default();
        let forward = annotator.annotate(&page(), &requests());
        let backward = annotator.annotate(&page(), &reversed);
        assert_eq!(backward.len(), forward.len());
        assert_eq!(backward[0], forward[1]);
        assert_eq!(backward[1], forward[0]);
    }

    #[test]
    fn interior_rule_keeps_corner_patches_apart() {
        let records = RegionAnnotator::new(OverlapRule::Interior).annotate(&page(), &requests()[..1]);
        let rects: Vec<_> = records.iter().map(|r| r.rect).collect();
        assert_eq!(rects, vec![Rectangle::new(0, 0, 2, 2), Rectangle::new(2, 2, 4, 3)]);
    }

    #[test]
    fn absent_color_contributes_nothing() {
        let request = AnnotationRequest::new(
            ColorSpec::exact(Pixel::new(0, 0, 255)),
            "Missing",
            StrokeColor::BLUE,
        );
        assert!(RegionAnnotator::default().annotate(&page(), &[request]).is_empty());
    }

    #[test]
    fn no_requests_no_records() {
        assert!(RegionAnnotator::default().annotate(&page(), &[]).is_empty());
    }

    #[test]
    fn zero_sized_page_has_no_records() {
        let empty = image::RgbImage::new(0, 4);
        let annotator = RegionAnnotator::default();
        assert!(annotator.annotate(&empty, &requests()).is_empty());
        assert!(annotator.annotate_request(&empty, &requests()[0]).is_empty());
    }

    #[test]
    fn stroke_scale_conversion() {
        assert_eq!(StrokeColor::RED.normalized(), [1.0, 0.0, 0.0]);
        assert_eq!(StrokeColor::from_normalized([0.0, 1.0, 0.0]), StrokeColor::GREEN);
        assert_eq!(
            StrokeColor::from_normalized([0.5, -2.0, 7.0]),
            StrokeColor::new(128, 0, 255)
        );
    }
}
