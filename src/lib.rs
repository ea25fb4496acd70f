// THEORY:
// This file is the main entry point for the `color_markup` library crate.
// It exposes the region-markup engine: a rasterized page goes in, and a list of
// rectangle annotations (with a comment and a stroke color) comes out.
//
// The public surface is intentionally small. `pipeline::MarkupPipeline` is the
// sequential, page-by-page driver; `parallel_pipeline::ParallelPipeline` runs the
// same work as one task per (page, request) pair. The algorithmic pieces in
// `core_modules` (detection, merging, annotation) are public so that callers with
// their own page source can drive them directly.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use error::{MarkupError, Result};
