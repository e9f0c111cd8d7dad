//! Page numbering for the assembled bundle
//!
//! The table of contents prints the page range of every appendix, but how many
//! pages the table itself takes depends on what it prints. Entries are first
//! computed against a one-page draft table, the draft is rendered to measure
//! its real length, and entries are recomputed with that length. A final check
//! renders the table for the final entries and retries until its length agrees
//! with the one the entries assumed.

use crate::bidi::Shaper;
use crate::constants::{DRAFT_TOC_PAGES, MAX_PAGINATION_PASSES};
use crate::fonts::FontSet;
use crate::numbering::format_label;
use crate::toc::{render_toc, TocLayout};
use crate::types::{AppendixError, AppendixSummary, LayoutSettings, NumberingSystem, Result, TocEntry};

/// Page ranges of every appendix, assuming the table takes `toc_pages`
pub fn compute_entries(
    main_pages: usize,
    toc_pages: usize,
    appendices: &[AppendixSummary],
    numbering: NumberingSystem,
) -> Vec<TocEntry> {
    let mut next_page = main_pages + toc_pages + 1;
    appendices
        .iter()
        .enumerate()
        .map(|(i, appendix)| {
            let start_page = next_page;
            let end_page = start_page + appendix.page_count;
            next_page = end_page + 1;
            TocEntry {
                label: format_label(i + 1, numbering),
                title: appendix.title.clone(),
                start_page,
                end_page,
            }
        })
        .collect()
}

/// Outcome of settling the table length
#[derive(Debug, Clone)]
pub struct Settled<T> {
    pub entries: Vec<TocEntry>,
    /// Whatever the last measurement produced, for the final entries
    pub measured: T,
    pub toc_pages: usize,
    pub draft_toc_pages: usize,
    pub passes: usize,
}

/// Find a table length that matches the table rendered for it.
///
/// `measure` renders the table for a set of entries and reports its page
/// count along with the rendering. Gives up with
/// [`AppendixError::PaginationDiverged`] after `MAX_PAGINATION_PASSES`
/// passes beyond the draft.
pub fn settle<T, M>(
    main_pages: usize,
    appendices: &[AppendixSummary],
    numbering: NumberingSystem,
    mut measure: M,
) -> Result<Settled<T>>
where
    M: FnMut(&[TocEntry]) -> (usize, T),
{
    let draft = compute_entries(main_pages, DRAFT_TOC_PAGES, appendices, numbering);
    let (draft_toc_pages, _) = measure(&draft);
    log::debug!(
        "Draft pass: assumed {} TOC page(s), measured {}",
        DRAFT_TOC_PAGES,
        draft_toc_pages
    );

    let mut assumed = draft_toc_pages;
    let mut last_measured = draft_toc_pages;
    for pass in 1..=MAX_PAGINATION_PASSES {
        let entries = compute_entries(main_pages, assumed, appendices, numbering);
        let (measured_pages, measured) = measure(&entries);
        log::debug!(
            "Pass {}: assumed {} TOC page(s), measured {}",
            pass,
            assumed,
            measured_pages
        );
        if measured_pages == assumed {
            return Ok(Settled {
                entries,
                measured,
                toc_pages: assumed,
                draft_toc_pages,
                passes: pass,
            });
        }
        last_measured = measured_pages;
        assumed = measured_pages;
    }

    Err(AppendixError::PaginationDiverged {
        passes: MAX_PAGINATION_PASSES,
        last_assumed: assumed,
        last_measured,
    })
}

/// Final page layout of a bundle
#[derive(Debug, Clone)]
pub struct PaginationPlan {
    pub entries: Vec<TocEntry>,
    /// Table of contents rendered for `entries`
    pub toc: TocLayout,
    pub toc_pages: usize,
    /// Length measured from the draft pass
    pub draft_toc_pages: usize,
    pub passes: usize,
    pub total_pages: usize,
}

/// Work out the final entries and the table of contents that lists them
pub fn plan(
    main_pages: usize,
    appendices: &[AppendixSummary],
    settings: &LayoutSettings,
    fonts: &FontSet,
    shaper: &Shaper,
) -> Result<PaginationPlan> {
    let settled = settle(main_pages, appendices, settings.numbering, |entries| {
        let toc = render_toc(entries, settings.template, fonts, shaper);
        (toc.page_count(), toc)
    })?;

    let appendix_pages: usize = appendices.iter().map(|a| a.page_count + 1).sum();
    let total_pages = main_pages + settled.toc_pages + appendix_pages;

    log::info!(
        "Planned {} page(s): main {}, TOC {}, {} appendices",
        total_pages,
        main_pages,
        settled.toc_pages,
        appendices.len()
    );

    Ok(PaginationPlan {
        entries: settled.entries,
        toc: settled.measured,
        toc_pages: settled.toc_pages,
        draft_toc_pages: settled.draft_toc_pages,
        passes: settled.passes,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appendices(counts: &[usize]) -> Vec<AppendixSummary> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &n)| AppendixSummary::new(format!("Doc {}", i + 1), n))
            .collect()
    }

    #[test]
    fn test_single_appendix_ranges() {
        let entries = compute_entries(3, 1, &appendices(&[5]), NumberingSystem::Hebrew);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "א");
        assert_eq!(entries[0].start_page, 5);
        assert_eq!(entries[0].end_page, 10);
        assert_eq!(entries[0].first_content_page(), Some(6));
    }

    #[test]
    fn test_adjacent_entries() {
        let entries = compute_entries(10, 2, &appendices(&[3, 0, 7]), NumberingSystem::Arabic);
        assert_eq!(entries[0].start_page, 13);
        for pair in entries.windows(2) {
            assert_eq!(pair[1].start_page, pair[0].end_page + 1);
        }
        // Zero-page appendix still has its cover
        assert_eq!(entries[1].start_page, entries[1].end_page);
        assert_eq!(entries[1].first_content_page(), None);
        assert!(entries.iter().all(|e| e.start_page <= e.end_page));
    }

    #[test]
    fn test_settle_converges_immediately() {
        let settled = settle(3, &appendices(&[5]), NumberingSystem::Hebrew, |_| (1, ())).unwrap();
        assert_eq!(settled.toc_pages, 1);
        assert_eq!(settled.draft_toc_pages, 1);
        assert_eq!(settled.passes, 1);
    }

    #[test]
    fn test_settle_uses_measured_length() {
        // Always two pages, whatever the entries say
        let settled = settle(3, &appendices(&[5, 5]), NumberingSystem::Hebrew, |_| (2, ())).unwrap();
        assert_eq!(settled.draft_toc_pages, 2);
        assert_eq!(settled.toc_pages, 2);
        assert_eq!(settled.entries[0].start_page, 6);
    }

    #[test]
    fn test_settle_retries_when_length_shifts() {
        // Length depends on the first start page: one page until it moves past 5
        let measure = |entries: &[TocEntry]| {
            let pages = if entries[0].start_page < 6 { 2 } else { 3 };
            (pages, entries[0].start_page)
        };
        let settled = settle(3, &appendices(&[1]), NumberingSystem::Hebrew, measure).unwrap();
        assert_eq!(settled.draft_toc_pages, 2);
        assert_eq!(settled.toc_pages, 3);
        assert_eq!(settled.passes, 2);
        assert_eq!(settled.measured, 7);
    }

    #[test]
    fn test_settle_reports_divergence() {
        // Oscillates between one and two pages
        let measure = |entries: &[TocEntry]| {
            let pages = if entries[0].start_page == 5 { 2 } else { 1 };
            (pages, ())
        };
        let err = settle(3, &appendices(&[1]), NumberingSystem::Hebrew, measure).unwrap_err();
        match err {
            AppendixError::PaginationDiverged { passes, .. } => {
                assert_eq!(passes, MAX_PAGINATION_PASSES)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plan_total_pages() {
        let plan = plan(
            3,
            &appendices(&[5, 2]),
            &LayoutSettings::default(),
            &FontSet::builtin(),
            &Shaper::default(),
        )
        .unwrap();
        assert_eq!(plan.toc_pages, 1);
        assert_eq!(plan.total_pages, 3 + 1 + 6 + 3);
        assert_eq!(plan.entries.last().unwrap().end_page, plan.total_pages);
    }
}
