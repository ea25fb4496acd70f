// THEORY:
// The `pipeline` module is the top-level API for marking up a document. It wraps the
// core (detect -> merge -> annotate) in a driver that walks a document one page at a
// time and reports, per page and per request, what was found.
//
// A pass that finds nothing is `PassOutcome::NoMatches`. That is a normal result
// (the color is simply not on the page) and is reported as such, never as an error.
// Precondition failures (bad tolerance, empty page) are rejected before a scan starts
// by `MarkupConfig::validate` and `PixelGrid`'s constructors.

use crate::config::MarkupConfig;
use crate::core_modules::annotator::{AnnotationRecord, AnnotationRequest, RegionAnnotator, StrokeColor};
use crate::core_modules::grid::PixelSampler;
use crate::core_modules::rectangle::Rectangle;
use crate::error::MarkupError;
use serde::{Deserialize, Serialize};

/// Result of one request applied to one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    NoMatches,
    Regions(Vec<AnnotationRecord>),
}

impl PassOutcome {
    pub fn from_records(records: Vec<AnnotationRecord>) -> Self {
        if records.is_empty() {
            PassOutcome::NoMatches
        } else {
            PassOutcome::Regions(records)
        }
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        match self {
            PassOutcome::NoMatches => &[],
            PassOutcome::Regions(records) => records,
        }
    }
}

/// Everything found on one page, one outcome per request in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page: usize,
    pub passes: Vec<PassOutcome>,
}

impl PageReport {
    pub fn records(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.passes.iter().flat_map(|pass| pass.records().iter())
    }

    pub fn has_matches(&self) -> bool {
        self.passes
            .iter()
            .any(|pass| matches!(pass, PassOutcome::Regions(_)))
    }
}

/// A record placed on a specific page, in the shape the annotation writer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAnnotation {
    pub page: usize,
    pub rect: Rectangle,
    pub comment: String,
    pub stroke: StrokeColor,
    pub border_width: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarkupSummary {
    pub pages: usize,
    pub pages_without_matches: usize,
    pub records: usize,
    pub empty_passes: usize,
}

impl MarkupSummary {
    pub fn from_reports(reports: &[PageReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.pages += 1;
            if !report.has_matches() {
                summary.pages_without_matches += 1;
            }
            summary.records += report.records().count();
            summary.empty_passes += report
                .passes
                .iter()
                .filter(|pass| matches!(pass, PassOutcome::NoMatches))
                .count();
            summary
        })
    }
}

/// Sequential, page-by-page markup driver.
#[derive(Debug, Clone)]
pub struct MarkupPipeline {
    annotator: RegionAnnotator,
    requests: Vec<AnnotationRequest>,
    border_width: f32,
}

impl MarkupPipeline {
    pub fn new(config: &MarkupConfig) -> Result<Self, MarkupError> {
        config.validate()?;
        Ok(Self {
            annotator: RegionAnnotator::new(config.overlap),
            requests: config.annotation_requests()?,
            border_width: config.border_width,
        })
    }

    pub fn requests(&self) -> &[AnnotationRequest] {
        &self.requests
    }

    pub fn process_page<S: PixelSampler + ?Sized>(&self, page: usize, grid: &S) -> PageReport {
        let _span = tracing::info_span!("page", page).entered();
        let passes: Vec<PassOutcome> = self
            .requests
            .iter()
            .map(|request| PassOutcome::from_records(self.annotator.annotate_request(grid, request)))
            .collect();
        let report = PageReport { page, passes };
        log_page(&report);
        report
    }

    pub fn process_document<S: PixelSampler>(&self, pages: &[S]) -> Vec<PageReport> {
        pages
            .iter()
            .enumerate()
            .map(|(page, grid)| self.process_page(page, grid))
            .collect()
    }

    /// Flattens reports into writer-ready annotations, page order then request order.
    pub fn page_annotations(&self, reports: &[PageReport]) -> Vec<PageAnnotation> {
        page_annotations(reports, self.border_width)
    }
}

pub(crate) fn page_annotations(reports: &[PageReport], border_width: f32) -> Vec<PageAnnotation> {
    reports
        .iter()
        .flat_map(|report| {
            report.records().map(move |record| PageAnnotation {
                page: report.page,
                rect: record.rect,
                comment: record.comment.clone(),
                stroke: record.stroke,
                border_width,
            })
        })
        .collect()
}

pub(crate) fn log_page(report: &PageReport) {
    let empty_passes = report
        .passes
        .iter()
        .filter(|pass| matches!(pass, PassOutcome::NoMatches))
        .count();
    if report.has_matches() {
        tracing::info!(
            page = report.page,
            records = report.records().count(),
            empty_passes,
            "page annotated"
        );
    } else {
        tracing::info!(page = report.page, "no requested colors on page");
    }
}
