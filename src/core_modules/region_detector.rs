// THEORY:
// The `RegionDetector` is the engine of the detection layer. It implements a
// connected-component scan over a page: every maximal set of 4-connected pixels
// that match a `ColorSpec` becomes one region, and each region is reduced to its
// tight bounding rectangle.
//
// Key architectural principles & algorithm steps:
// 1.  **Row-major seeding**: Every pixel is visited in (y, x) order. An unvisited
//     pixel becomes the seed of a flood fill. Regions are therefore emitted in the
//     scan order of their first-visited pixel, which makes output deterministic.
// 2.  **Explicit work-list**: The flood fill pops coordinates from a `Vec` stack.
//     It never recurses, so page size is bounded by memory and not by call depth.
// 3.  **Fill only through matches**: A popped pixel is marked visited first, then
//     tested. Only matching pixels join the region and push their up/down/left/right
//     neighbors. A non-matching pixel is visited once and contributes nothing.
// 4.  **Pass-local scratch**: The visited set is allocated per call and dropped at
//     the end of it. Two passes (two colors, or two pages) never share fill state.
// 5.  **Resource ceiling**: Memory is one `bool` per pixel for the visited set plus
//     the work-list, which can grow to a few entries per pixel of a page-sized
//     region. There is no guard beyond that.

use crate::core_modules::color_spec::ColorSpec;
use crate::core_modules::grid::PixelSampler;
use crate::core_modules::rectangle::Rectangle;

pub mod region_detector {
    use super::*; // Make types from parent module available.

    /// One connected component of matching pixels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Region {
        /// Tight bounding box, right/bottom edges exclusive.
        pub bounds: Rectangle,
        /// Number of matching pixels in the component. Holes are not counted.
        pub pixel_count: usize,
    }

    /// Scans `grid` and returns one bounding rectangle per matching component.
    pub fn detect<S: PixelSampler + ?Sized>(grid: &S, target: &ColorSpec) -> Vec<Rectangle> {
        detect_regions(grid, target)
            .into_iter()
            .map(|region| region.bounds)
            .collect()
    }

    /// Like [`detect`], but keeps the pixel count of each component.
    pub fn detect_regions<S: PixelSampler + ?Sized>(grid: &S, target: &ColorSpec) -> Vec<Region> {
        let width = grid.width();
        let height = grid.height();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let mut visited = VisitedSet::new(width, height);
        let mut stack: Vec<(u32, u32)> = Vec::new();
        let mut regions: Vec<Region> = Vec::new();

        for y in 0..height {
            for x in 0..width {
                if visited.contains(x, y) {
                    continue;
                }
                if let Some(region) = flood_fill(grid, target, (x, y), &mut visited, &mut stack) {
                    regions.push(region);
                }
            }
        }

        tracing::trace!(
            target_color = %target.target,
            tolerance = target.tolerance,
            regions = regions.len(),
            "detection pass finished"
        );
        regions
    }

    /// Grows one component from `seed`. Returns `None` when the seed does not match.
    fn flood_fill<S: PixelSampler + ?Sized>(
        grid: &S,
        target: &ColorSpec,
        seed: (u32, u32),
        visited: &mut VisitedSet,
        stack: &mut Vec<(u32, u32)>,
    ) -> Option<Region> {
        let width = grid.width();
        let height = grid.height();

        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut pixel_count = 0usize;

        stack.clear();
        stack.push(seed);

        while let Some((cx, cy)) = stack.pop() {
            if !visited.insert(cx, cy) {
                continue;
            }
            if !target.matches(&grid.pixel(cx, cy)) {
                continue;
            }

            pixel_count += 1;
            min_x = min_x.min(cx);
            min_y = min_y.min(cy);
            max_x = max_x.max(cx);
            max_y = max_y.max(cy);

            // 4-connected neighbors only.
            if cx > 0 {
                stack.push((cx - 1, cy));
            }
            if cx + 1 < width {
                stack.push((cx + 1, cy));
            }
            if cy > 0 {
                stack.push((cx, cy - 1));
            }
            if cy + 1 < height {
                stack.push((cx, cy + 1));
            }
        }

        if pixel_count == 0 {
            return None;
        }
        Some(Region {
            bounds: Rectangle {
                x0: min_x,
                y0: min_y,
                x1: max_x + 1,
                y1: max_y + 1,
            },
            pixel_count,
        })
    }

    /// Per-pass visited flags, one per pixel, row-major.
    struct VisitedSet {
        width: usize,
        flags: Vec<bool>,
    }

    impl VisitedSet {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width: width as usize,
                flags: vec![false; width as usize * height as usize],
            }
        }

        #[inline]
        fn contains(&self, x: u32, y: u32) -> bool {
            self.flags[y as usize * self.width + x as usize]
        }

        /// Marks (x, y) visited. Returns `false` if it already was.
        #[inline]
        fn insert(&mut self, x: u32, y: u32) -> bool {
            let flag = &mut self.flags[y as usize * self.width + x as usize];
            !std::mem::replace(flag, true)
        }
    }
}
