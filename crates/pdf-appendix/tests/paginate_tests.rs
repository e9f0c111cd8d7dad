use pdf_appendix::toc::render_toc;
use pdf_appendix::*;

fn summaries(count: usize, pages: usize) -> Vec<AppendixSummary> {
    (1..=count)
        .map(|i| AppendixSummary::new(format!("Exhibit {i}"), pages))
        .collect()
}

fn plan_for(main_pages: usize, appendices: &[AppendixSummary], numbering: NumberingSystem) -> PaginationPlan {
    let settings = LayoutSettings {
        numbering,
        ..Default::default()
    };
    plan(
        main_pages,
        appendices,
        &settings,
        &FontSet::builtin(),
        &Shaper::default(),
    )
    .unwrap()
}

#[test]
fn test_single_appendix_after_short_main_document() {
    let plan = plan_for(3, &summaries(1, 5), NumberingSystem::Hebrew);
    assert_eq!(plan.toc_pages, 1);
    let entry = &plan.entries[0];
    assert_eq!(entry.cover_page(), 5);
    assert_eq!(entry.first_content_page(), Some(6));
    assert_eq!(entry.end_page, 10);
    assert_eq!(plan.total_pages, 10);
}

#[test]
fn test_labels_fall_back_to_decimal_past_thirty() {
    let plan = plan_for(3, &summaries(40, 1), NumberingSystem::Hebrew);
    let labels: Vec<_> = plan.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels[0], "א");
    assert_eq!(labels[29], "ל");
    let tail: Vec<String> = (31..=40).map(|n| n.to_string()).collect();
    assert_eq!(&labels[30..], tail.iter().map(String::as_str).collect::<Vec<_>>().as_slice());
}

#[test]
fn test_long_table_shifts_every_entry() {
    // 40 rows need three table pages: 17 + 19 + 4
    let plan = plan_for(3, &summaries(40, 1), NumberingSystem::Hebrew);
    assert_eq!(plan.draft_toc_pages, 3);
    assert_eq!(plan.toc_pages, 3);
    assert_eq!(plan.entries[0].start_page, 7);
    assert_eq!(plan.entries[39].end_page, 3 + 3 + 40 * 2);
    assert_eq!(plan.total_pages, 3 + 3 + 40 * 2);
    assert_eq!(plan.toc.page_count(), 3);
}

#[test]
fn test_entries_are_contiguous() {
    let appendices = vec![
        AppendixSummary::new("A", 4),
        AppendixSummary::new("", 0),
        AppendixSummary::new("C", 12),
    ];
    let plan = plan_for(7, &appendices, NumberingSystem::Arabic);
    assert_eq!(plan.entries[0].start_page, 7 + 1 + 1);
    for pair in plan.entries.windows(2) {
        assert_eq!(pair[1].start_page, pair[0].end_page + 1);
    }
    assert_eq!(plan.entries.last().unwrap().end_page, plan.total_pages);
}

#[test]
fn test_table_page_thresholds() {
    let fonts = FontSet::builtin();
    let shaper = Shaper::default();
    for (rows, pages) in [(1, 1), (17, 1), (18, 2), (36, 2), (37, 3)] {
        let entries = compute_entries(3, 1, &summaries(rows, 1), NumberingSystem::Arabic);
        let toc = render_toc(&entries, Template::Classic, &fonts, &shaper);
        assert_eq!(toc.page_count(), pages, "{rows} rows");
    }
}

#[test]
fn test_table_document_matches_layout() {
    let entries = compute_entries(3, 1, &summaries(20, 2), NumberingSystem::Roman);
    let fonts = FontSet::builtin();
    let toc = render_toc(&entries, Template::Minimal, &fonts, &Shaper::default());
    let doc = toc.to_document(&fonts).unwrap();
    assert_eq!(doc.get_pages().len(), toc.page_count());
}
