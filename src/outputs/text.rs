//! Plain-text summary printed at the end of a run.

use std::fmt::Write;

use itertools::Itertools;

use crate::models::{Report, Skipped};

/// Render `report` for a terminal.
///
/// Repeated words are listed by descending count, then alphabetically.
pub fn render(report: &Report) -> String {
    let mut out = String::new();

    writeln!(out, "Opinion digest ({})", report.generated_at.format("%Y-%m-%d %H:%M")).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "Articles ({}):", report.articles.len()).unwrap();
    for article in &report.articles {
        writeln!(out, "- {}", article.title).unwrap();
        writeln!(out, "  {}", article.content).unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "Images found: {}", report.images.len()).unwrap();
    for url in &report.images {
        writeln!(out, "- {url}").unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "Translated titles:").unwrap();
    for title in &report.translated_titles {
        writeln!(out, "- {}", title.translated).unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "Repeated words (>= 2):").unwrap();
    if report.word_counts.is_empty() {
        writeln!(out, "  none").unwrap();
    }
    for (word, count) in report
        .word_counts
        .iter()
        .sorted_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)))
    {
        writeln!(out, "{word}: {count}").unwrap();
    }

    if !report.downloads.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Saved images:").unwrap();
        for path in &report.downloads {
            writeln!(out, "- {}", path.display()).unwrap();
        }
    }

    if !report.skipped.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Skipped ({}):", report.skipped.len()).unwrap();
        for skipped in &report.skipped {
            writeln!(out, "- {}", describe(skipped)).unwrap();
        }
    }

    out
}

fn describe(skipped: &Skipped) -> String {
    match skipped {
        Skipped::Article { index, reason } => format!("article #{}: {reason}", index + 1),
        Skipped::DuplicateTitle { title, .. } => format!("duplicate title, earlier content replaced: {title}"),
        Skipped::NoImage { title } => format!("no image: {title}"),
        Skipped::MalformedImage { title, reason } => format!("bad image descriptor for {title}: {reason}"),
        Skipped::Translation { title, reason } => format!("not translated: {title} ({reason})"),
        Skipped::Download { url, reason } => format!("image not saved: {url} ({reason})"),
    }
}
