use anyhow::Context;
use clap::Parser;
use color_markup::config::MarkupConfig;
use color_markup::core_modules::grid::PixelGrid;
use color_markup::core_modules::utils::image_helper::image_helper;
use color_markup::parallel_pipeline::ParallelPipeline;
use color_markup::pipeline::{MarkupPipeline, MarkupSummary, PageAnnotation, PageReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "markup_tester")]
#[command(about = "Find color regions on rendered pages and emit rectangle annotations")]
struct Cli {
    /// Rendered pages, one image per page, in page order
    #[arg(required = true)]
    pages: Vec<PathBuf>,

    /// YAML markup configuration (defaults to the built-in slab passes)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the top-level per-channel tolerance (0-255)
    #[arg(short, long)]
    tolerance: Option<i64>,

    /// Run one task per page and request instead of page by page
    #[arg(long)]
    parallel: bool,

    /// Write each annotated page with its rectangles drawn on it into this directory
    #[arg(long)]
    overlay_dir: Option<PathBuf>,

    /// Write records as JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "color_markup=info,markup_tester=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => MarkupConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MarkupConfig::default(),
    };
    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
    }
    config.validate()?;

    let pages = cli
        .pages
        .iter()
        .map(|path| {
            image_helper::load_page(path).with_context(|| format!("loading page {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<PixelGrid>>>()?;

    let (reports, annotations) = if cli.parallel {
        let pipeline = ParallelPipeline::new(&config)?;
        let shared: Vec<Arc<PixelGrid>> = pages.iter().cloned().map(Arc::new).collect();
        let reports = pipeline.process_document(&shared).await?;
        let annotations = pipeline.page_annotations(&reports);
        (reports, annotations)
    } else {
        let pipeline = MarkupPipeline::new(&config)?;
        let reports = pipeline.process_document(&pages);
        let annotations = pipeline.page_annotations(&reports);
        (reports, annotations)
    };

    if let Some(dir) = &cli.overlay_dir {
        write_overlays(dir, &pages, &reports, config.border_width)?;
    }
    write_records(cli.output.as_deref(), &annotations)?;

    let summary = MarkupSummary::from_reports(&reports);
    tracing::info!(
        pages = summary.pages,
        records = summary.records,
        pages_without_matches = summary.pages_without_matches,
        empty_passes = summary.empty_passes,
        "markup complete"
    );
    Ok(())
}

fn write_records(output: Option<&Path>, annotations: &[PageAnnotation]) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(std::io::BufWriter::new(file), annotations)?;
            tracing::info!(path = %path.display(), records = annotations.len(), "records written");
        }
        None => {
            let stdout = std::io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), annotations)?;
            println!();
        }
    }
    Ok(())
}

fn write_overlays(
    dir: &Path,
    pages: &[PixelGrid],
    reports: &[PageReport],
    border_width: f32,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let border = border_width.round().max(1.0) as u32;

    for (grid, report) in pages.iter().zip(reports) {
        if !report.has_matches() {
            continue;
        }
        let mut canvas = grid.to_rgb_image();
        for record in report.records() {
            image_helper::draw_outline(&mut canvas, &record.rect, record.stroke, border);
        }
        let path = dir.join(format!("page-{:03}.png", report.page + 1));
        image_helper::save_png(&path, &canvas)?;
        tracing::info!(path = %path.display(), "overlay written");
    }
    Ok(())
}
