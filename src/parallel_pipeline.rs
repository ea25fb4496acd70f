// THEORY:
// `ParallelPipeline` runs the same work as `MarkupPipeline`, spread over the tokio
// blocking pool. The unit of work is one (page, request) pair: it owns its visited
// set and its rectangle working set, and shares nothing mutable with any other pair.
//
// Results are collected in (page, request) order, so the output is identical to the
// sequential pipeline regardless of which task finishes first. Concurrency is bounded
// by a semaphore sized from `MarkupConfig::workers`.

use crate::config::MarkupConfig;
use crate::core_modules::annotator::{AnnotationRequest, RegionAnnotator};
use crate::core_modules::grid::PixelGrid;
use crate::error::MarkupError;
use crate::pipeline::{self, PageAnnotation, PageReport, PassOutcome};
use std::sync::Arc;
use tokio::sync::Semaphore;

pub struct ParallelPipeline {
    annotator: RegionAnnotator,
    requests: Arc<[AnnotationRequest]>,
    permits: Arc<Semaphore>,
    border_width: f32,
}

impl ParallelPipeline {
    pub fn new(config: &MarkupConfig) -> Result<Self, MarkupError> {
        config.validate()?;
        Ok(Self {
            annotator: RegionAnnotator::new(config.overlap),
            requests: config.annotation_requests()?.into(),
            permits: Arc::new(Semaphore::new(config.workers)),
            border_width: config.border_width,
        })
    }

    pub fn requests(&self) -> &[AnnotationRequest] {
        &self.requests
    }

    pub async fn process_document(
        &self,
        pages: &[Arc<PixelGrid>],
    ) -> Result<Vec<PageReport>, MarkupError> {
        let request_count = self.requests.len();
        if request_count == 0 {
            return Ok((0..pages.len())
                .map(|page| PageReport {
                    page,
                    passes: Vec::new(),
                })
                .collect());
        }

        let mut tasks = Vec::with_capacity(pages.len() * request_count);
        for grid in pages {
            for request_index in 0..request_count {
                let permit = Arc::clone(&self.permits)
                    .acquire_owned()
                    .await
                    .map_err(|e| MarkupError::Worker(e.to_string()))?;
                let grid = Arc::clone(grid);
                let requests = Arc::clone(&self.requests);
                let annotator = self.annotator;

                tasks.push(tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    let records = annotator.annotate_request(grid.as_ref(), &requests[request_index]);
                    PassOutcome::from_records(records)
                }));
            }
        }

        let outcomes = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.map_err(|e| MarkupError::Worker(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        let reports: Vec<PageReport> = outcomes
            .chunks(request_count)
            .enumerate()
            .map(|(page, passes)| PageReport {
                page,
                passes: passes.to_vec(),
            })
            .collect();

        for report in &reports {
            pipeline::log_page(report);
        }
        Ok(reports)
    }

    pub fn page_annotations(&self, reports: &[PageReport]) -> Vec<PageAnnotation> {
        pipeline::page_annotations(reports, self.border_width)
    }
}
