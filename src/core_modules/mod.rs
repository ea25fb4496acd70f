pub mod annotator;
pub mod color_spec;
pub mod grid;
pub mod pixel;
pub mod rectangle;
pub mod rectangle_merger;
pub mod region_detector;
pub mod utils;
