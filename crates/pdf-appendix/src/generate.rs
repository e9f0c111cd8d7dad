//! End-to-end bundle generation

use std::time::Instant;

use lopdf::Document;

use crate::assemble::{appendix_stamp, assemble, AppendixPart};
use crate::bidi::Shaper;
use crate::cover::{render_cover, CoverSpec};
use crate::fonts::FontSet;
use crate::io::{document_to_bytes, SourceDocument};
use crate::paginate::{plan, PaginationPlan};
use crate::types::{AppendixError, AppendixSummary, LayoutSettings, Result};

/// One appendix in bundle order
#[derive(Debug, Clone)]
pub struct Appendix {
    /// Shown after the label; may be empty
    pub title: String,
    pub source: SourceDocument,
}

impl Appendix {
    pub fn new(title: impl Into<String>, source: SourceDocument) -> Self {
        Self {
            title: title.into(),
            source,
        }
    }
}

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub main: SourceDocument,
    pub appendices: Vec<Appendix>,
    pub settings: LayoutSettings,
}

impl GenerationJob {
    pub fn summaries(&self) -> Vec<AppendixSummary> {
        self.appendices
            .iter()
            .map(|a| AppendixSummary::new(a.title.clone(), a.source.page_count))
            .collect()
    }

    /// Page layout the bundle will have
    pub fn plan(&self, fonts: &FontSet, shaper: &Shaper) -> Result<PaginationPlan> {
        plan(
            self.main.page_count,
            &self.summaries(),
            &self.settings,
            fonts,
            shaper,
        )
    }
}

/// Build the bundle document along with the plan it follows
pub fn build_bundle(
    job: &GenerationJob,
    fonts: &FontSet,
    shaper: &Shaper,
) -> Result<(Document, PaginationPlan)> {
    let started = Instant::now();
    let plan = job.plan(fonts, shaper)?;

    let mut parts = Vec::with_capacity(job.appendices.len());
    for (entry, appendix) in plan.entries.iter().zip(&job.appendices) {
        let cover = render_cover(&CoverSpec::from(entry), job.settings.template, fonts, shaper);
        let content = appendix.source.document.clone();
        let stamp = if job.settings.stamp_appendices {
            appendix_stamp(&content, &appendix.source.name, &entry.label, fonts, shaper)?
        } else {
            None
        };
        parts.push(AppendixPart {
            cover,
            content,
            stamp,
        });
    }

    let toc = plan.toc.pages.clone();
    let bundle = assemble(job.main.document.clone(), toc, parts, fonts)?;
    let pages = bundle.get_pages().len();
    if pages != plan.total_pages {
        return Err(AppendixError::PageCountChanged {
            name: "bundle".to_string(),
            before: plan.total_pages,
            after: pages,
        });
    }

    log::info!(
        "Generated {} page(s) with {} appendices in {:.1}ms ({} pagination pass(es))",
        pages,
        job.appendices.len(),
        started.elapsed().as_secs_f64() * 1000.0,
        plan.passes
    );
    Ok((bundle, plan))
}

/// Generate the bundle and serialise it
pub fn generate_with(job: &GenerationJob, fonts: &FontSet, shaper: &Shaper) -> Result<Vec<u8>> {
    let (mut bundle, _) = build_bundle(job, fonts, shaper)?;
    bundle.compress();
    document_to_bytes(&mut bundle)
}

/// Generate with full bidirectional shaping
pub fn generate_sync(job: &GenerationJob, fonts: &FontSet) -> Result<Vec<u8>> {
    generate_with(job, fonts, &Shaper::default())
}

/// Generate on the blocking thread pool
pub async fn generate(job: GenerationJob, fonts: FontSet) -> Result<Vec<u8>> {
    let bytes = tokio::task::spawn_blocking(move || generate_sync(&job, &fonts)).await??;
    Ok(bytes)
}
