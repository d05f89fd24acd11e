//! Status aggregation: buckets project records by status, computes progress
//! and renders the generated block of the status document.
//!
//! Rendering is a pure function of the records and the reference date; every
//! ordering is explicit so identical input yields byte-identical output.

use crate::config::{Config, Markers};
use crate::project::ProjectRecord;
use crate::types::Status;
use crate::workdays::count_workdays;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;
use std::fmt::Write as _;

pub const NONE_PLACEHOLDER: &str = "None";
pub const GANTT_DATE_FORMAT: &str = "YYYY-MM-DD";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BoardOptions {
    pub timeline_title: String,
    pub completed_limit: usize,
    pub markers: Markers,
}

impl BoardOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeline_title: config.timeline.title.clone(),
            completed_limit: config.timeline.completed_limit,
            markers: config.markers.clone(),
        }
    }
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Completion percentage of `record` as of `reference`.
///
/// Completed is always 100; In-Progress is elapsed workdays over the estimate,
/// floored and capped at 100, and 0 when the estimate is unknown or zero.
/// Pending and unrecognised statuses have no percentage.
pub fn progress(record: &ProjectRecord, reference: NaiveDate) -> Option<u32> {
    match record.status? {
        Status::Completed => Some(100),
        Status::Pending => None,
        Status::InProgress => {
            let estimate = u64::from(record.estimated_workdays.unwrap_or(0));
            if estimate == 0 {
                return Some(0);
            }
            let elapsed = record
                .start_date
                .date()
                .map(|start| u64::from(count_workdays(start, reference)))
                .unwrap_or(0);
            Some((elapsed * 100 / estimate).min(100) as u32)
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardItem {
    pub label: String,
    pub file_name: String,
    pub progress: Option<u32>,
    /// Progress-report lines shown beneath in-progress items.
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub status: Status,
    pub items: Vec<BoardItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineSection {
    pub status: Status,
    pub entries: Vec<TimelineEntry>,
}

/// Aggregated view of all project records, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct StatusBoard {
    pub reference_date: NaiveDate,
    /// One per status, in `Status::all()` order, empty ones included.
    pub categories: Vec<Category>,
    /// Only sections with at least one entry.
    pub timeline: Vec<TimelineSection>,
}

/// Remove every occurrence of either marker from text copied into the block.
///
/// Repeats until stable, since a removal can splice a new marker together.
fn scrub_markers(text: &str, markers: &Markers) -> String {
    let mut out = text.to_string();
    loop {
        let next = out.replace(&markers.start, "").replace(&markers.end, "");
        if next == out {
            return out;
        }
        out = next;
    }
}

fn item_label(record: &ProjectRecord, markers: &Markers) -> String {
    scrub_markers(&record.label(), markers)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn note_lines(progress_report: &str, markers: &Markers) -> Vec<String> {
    progress_report
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("```") && !l.starts_with("~~~"))
        .map(|l| {
            let l = l
                .strip_prefix("- ")
                .or_else(|| l.strip_prefix("* "))
                .unwrap_or(l);
            scrub_markers(l, markers).trim().to_string()
        })
        .filter(|l| !l.is_empty())
        .collect()
}

fn timeline_entry(
    record: &ProjectRecord,
    markers: &Markers,
) -> Option<(TimelineEntry, NaiveDate)> {
    let start = record.start_date.date()?;
    let end = match record.status {
        Some(Status::Completed) => record
            .actual_end_date
            .date()
            .or_else(|| record.due_date.date())?,
        _ => record.due_date.date()?,
    };
    let entry = TimelineEntry {
        label: item_label(record, markers),
        start,
        end,
    };
    Some((entry, end))
}

/// Bucket `records` by status and build the timeline.
///
/// Records with an unrecognised status are dropped. Each category is ordered
/// by source file name, descending. Completed timeline entries are ordered by
/// end date, descending, and truncated to `options.completed_limit`.
pub fn aggregate(
    records: &[ProjectRecord],
    reference: NaiveDate,
    options: &BoardOptions,
) -> StatusBoard {
    let mut categories = Vec::new();
    let mut timeline = Vec::new();

    for &status in Status::all() {
        let mut members: Vec<&ProjectRecord> =
            records.iter().filter(|r| r.status == Some(status)).collect();
        members.sort_by(|a, b| {
            (b.file_name(), &b.source_path).cmp(&(a.file_name(), &a.source_path))
        });

        let items = members
            .iter()
            .map(|r| BoardItem {
                label: item_label(r, &options.markers),
                file_name: r.file_name(),
                progress: progress(r, reference),
                notes: if status == Status::InProgress {
                    note_lines(&r.progress_report, &options.markers)
                } else {
                    Vec::new()
                },
            })
            .collect();
        categories.push(Category { status, items });

        let mut entries: Vec<(TimelineEntry, NaiveDate, String)> = members
            .iter()
            .filter_map(|r| {
                timeline_entry(r, &options.markers).map(|(e, end)| (e, end, r.file_name()))
            })
            .collect();
        if status == Status::Completed {
            // Stable sort keeps the file-name order among equal end dates.
            entries.sort_by_key(|(_, end, _)| Reverse(*end));
            entries.truncate(options.completed_limit);
        }
        if !entries.is_empty() {
            timeline.push(TimelineSection {
                status,
                entries: entries.into_iter().map(|(e, _, _)| e).collect(),
            });
        }
    }

    StatusBoard {
        reference_date: reference,
        categories,
        timeline,
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Strip characters the gantt syntax treats as delimiters.
fn gantt_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .filter(|c| !matches!(c, ':' | '#' | ';'))
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn gantt_tag(status: Status) -> &'static str {
    match status {
        Status::InProgress => "active, ",
        Status::Completed => "done, ",
        Status::Pending => "",
    }
}

impl StatusBoard {
    /// The fenced mermaid gantt chart, without a trailing newline.
    pub fn render_timeline(&self, title: &str) -> String {
        let mut out = String::new();
        out.push_str("```mermaid\ngantt\n");
        let _ = writeln!(out, "    title {}", gantt_label(title));
        let _ = writeln!(out, "    dateFormat {GANTT_DATE_FORMAT}");
        for section in &self.timeline {
            let _ = writeln!(out, "    section {}", section.status);
            for entry in &section.entries {
                let _ = writeln!(
                    out,
                    "    {} :{}{}, {}",
                    gantt_label(&entry.label),
                    gantt_tag(section.status),
                    entry.start,
                    entry.end
                );
            }
        }
        out.push_str("```");
        out
    }

    /// The category lists, one `###` heading per status.
    pub fn render_categories(&self) -> String {
        let mut out = String::new();
        for category in &self.categories {
            let _ = writeln!(out, "### {}", category.status.heading());
            if category.items.is_empty() {
                let _ = writeln!(out, "- {NONE_PLACEHOLDER}");
            }
            for item in &category.items {
                match item.progress {
                    Some(pct) => {
                        let _ = writeln!(out, "- {} ({pct}%)", item.label);
                    }
                    None => {
                        let _ = writeln!(out, "- {}", item.label);
                    }
                }
                for note in &item.notes {
                    let _ = writeln!(out, "  * {note}");
                }
            }
            out.push('\n');
        }
        out
    }

    /// The complete delimited block, start marker through end marker.
    pub fn render(&self, options: &BoardOptions) -> String {
        let mut out = String::new();
        out.push_str(&options.markers.start);
        out.push('\n');
        out.push_str(&self.render_timeline(&options.timeline_title));
        out.push_str("\n\n");
        out.push_str(&self.render_categories());
        out.push_str(&options.markers.end);
        out
    }
}

/// Aggregate and render in one step.
pub fn render_block(
    records: &[ProjectRecord],
    reference: NaiveDate,
    options: &BoardOptions,
) -> String {
    aggregate(records, reference, options).render(options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::DateField;
    use std::path::PathBuf;

    fn date(raw: &str) -> NaiveDate {
        crate::workdays::parse_date(raw).unwrap()
    }

    fn record(file: &str, status: Option<Status>) -> ProjectRecord {
        let stem = file.trim_end_matches(".md");
        ProjectRecord {
            id: stem.to_string(),
            title: format!("Title {stem}"),
            project: String::new(),
            status,
            start_date: DateField::Missing,
            due_date: DateField::Missing,
            actual_end_date: DateField::Missing,
            estimated_workdays: None,
            progress_report: String::new(),
            source_path: PathBuf::from("projects").join(file),
        }
    }

    fn dated(file: &str, status: Status, start: &str, due: &str) -> ProjectRecord {
        let mut r = record(file, Some(status));
        r.start_date = DateField::Date(date(start));
        r.due_date = DateField::Date(date(due));
        r.estimated_workdays = Some(count_workdays(date(start), date(due)));
        r
    }

    #[test]
    fn progress_by_status() {
        let today = date("2025-01-15");
        assert_eq!(progress(&record("a.md", Some(Status::Completed)), today), Some(100));
        assert_eq!(progress(&record("a.md", Some(Status::Pending)), today), None);
        assert_eq!(progress(&record("a.md", None), today), None);
        // Unknown estimate guards the division.
        assert_eq!(progress(&record("a.md", Some(Status::InProgress)), today), Some(0));
    }

    #[test]
    fn in_progress_percentage_is_floored_and_capped() {
        // Ten workdays: 2025-01-06 .. 2025-01-17.
        let r = dated("P1.md", Status::InProgress, "2025-01-06", "2025-01-17");
        assert_eq!(r.estimated_workdays, Some(10));
        assert_eq!(progress(&r, date("2025-01-06")), Some(10));
        assert_eq!(progress(&r, date("2025-01-08")), Some(30));
        assert_eq!(progress(&r, date("2025-01-17")), Some(100));
        assert_eq!(progress(&r, date("2025-03-01")), Some(100));
        assert_eq!(progress(&r, date("2025-01-01")), Some(0));

        let mut three = dated("P2.md", Status::InProgress, "2025-01-06", "2025-01-08");
        three.estimated_workdays = Some(3);
        assert_eq!(progress(&three, date("2025-01-06")), Some(33));
    }

    #[test]
    fn zero_estimate_yields_zero() {
        let mut r = dated("P1.md", Status::InProgress, "2025-01-06", "2025-01-17");
        r.estimated_workdays = Some(0);
        assert_eq!(progress(&r, date("2025-02-01")), Some(0));
    }

    #[test]
    fn categories_sorted_by_file_name_descending() {
        let records = vec![
            record("P003.md", Some(Status::InProgress)),
            record("P001.md", Some(Status::InProgress)),
            record("P010.md", Some(Status::InProgress)),
        ];
        let board = aggregate(&records, date("2025-01-15"), &BoardOptions::default());
        let files: Vec<&str> = board.categories[0]
            .items
            .iter()
            .map(|i| i.file_name.as_str())
            .collect();
        assert_eq!(files, vec!["P010.md", "P003.md", "P001.md"]);
    }

    #[test]
    fn unknown_status_is_dropped_and_empty_categories_kept() {
        let records = vec![record("P001.md", None)];
        let board = aggregate(&records, date("2025-01-15"), &BoardOptions::default());
        assert_eq!(board.categories.len(), 3);
        assert!(board.categories.iter().all(|c| c.items.is_empty()));
        assert!(board.timeline.is_empty());

        let block = board.render(&BoardOptions::default());
        assert_eq!(block.matches("- None\n").count(), 3);
        assert!(!block.contains("P001"));
    }

    #[test]
    fn completed_timeline_keeps_three_most_recent() {
        let mut records = Vec::new();
        for (file, end) in [
            ("C1.md", "2025-01-10"),
            ("C2.md", "2025-03-10"),
            ("C3.md", "2025-02-10"),
            ("C4.md", "2025-05-10"),
            ("C5.md", "2025-04-10"),
        ] {
            let mut r = dated(file, Status::Completed, "2025-01-02", "2025-06-30");
            r.actual_end_date = DateField::Date(date(end));
            records.push(r);
        }
        let board = aggregate(&records, date("2025-07-01"), &BoardOptions::default());

        assert_eq!(board.timeline.len(), 1);
        let ends: Vec<String> = board.timeline[0]
            .entries
            .iter()
            .map(|e| e.end.to_string())
            .collect();
        assert_eq!(ends, vec!["2025-05-10", "2025-04-10", "2025-03-10"]);
        // The category list itself is not truncated.
        assert_eq!(board.categories[2].items.len(), 5);
    }

    #[test]
    fn completed_end_falls_back_to_due_date() {
        let r = dated("C1.md", Status::Completed, "2025-01-06", "2025-01-31");
        let board = aggregate(&[r], date("2025-02-01"), &BoardOptions::default());
        assert_eq!(board.timeline[0].entries[0].end, date("2025-01-31"));
    }

    #[test]
    fn placeholder_dates_stay_off_the_timeline() {
        let mut r = record("P1.md", Some(Status::Pending));
        r.start_date = DateField::Date(date("2025-01-06"));
        r.due_date = DateField::Placeholder("TBD".into());
        let board = aggregate(&[r], date("2025-01-06"), &BoardOptions::default());
        assert!(board.timeline.is_empty());
        assert_eq!(board.categories[1].items.len(), 1);
    }

    #[test]
    fn render_full_block() {
        let mut active = dated("P002.md", Status::InProgress, "2025-01-06", "2025-01-17");
        active.progress_report = "- wired API\n\n* added tests".into();
        let pending = dated("P003.md", Status::Pending, "2025-02-03", "2025-02-14");
        let done = dated("P001.md", Status::Completed, "2024-12-02", "2024-12-20");
        let options = BoardOptions::default();

        let block = render_block(&[done, pending, active], date("2025-01-08"), &options);

        let expected = "\
<!-- AUTO_UPDATE_START -->
```mermaid
gantt
    title Project Timeline
    dateFormat YYYY-MM-DD
    section In-Progress
    P002 Title P002 :active, 2025-01-06, 2025-01-17
    section Pending
    P003 Title P003 :2025-02-03, 2025-02-14
    section Completed
    P001 Title P001 :done, 2024-12-02, 2024-12-20
```

### In-Progress Projects
- P002 Title P002 (30%)
  * wired API
  * added tests

### Pending Projects
- P003 Title P003

### Completed Projects
- P001 Title P001 (100%)

<!-- AUTO_UPDATE_END -->";
        assert_eq!(block, expected);
    }

    #[test]
    fn render_is_deterministic_across_input_order() {
        let a = dated("A.md", Status::InProgress, "2025-01-06", "2025-01-17");
        let b = dated("B.md", Status::InProgress, "2025-01-06", "2025-01-17");
        let options = BoardOptions::default();
        let today = date("2025-01-10");
        assert_eq!(
            render_block(&[a.clone(), b.clone()], today, &options),
            render_block(&[b, a], today, &options)
        );
    }

    #[test]
    fn marker_text_never_reaches_the_block() {
        let options = BoardOptions::default();
        let mut r = dated("P1.md", Status::InProgress, "2025-01-06", "2025-01-17");
        r.title = format!("Docs {}", options.markers.start);
        r.progress_report = format!(
            "- moved the {} marker docs\n- {}\n- <!-- AUTO_UPDATE_<!-- AUTO_UPDATE_END -->END -->",
            options.markers.end, options.markers.start
        );

        let board = aggregate(&[r], date("2025-01-08"), &options);
        let item = &board.categories[0].items[0];
        assert_eq!(item.label, "P1 Docs");
        assert_eq!(item.notes, vec!["moved the  marker docs"]);

        let block = board.render(&options);
        assert_eq!(block.matches(options.markers.start.as_str()).count(), 1);
        assert_eq!(block.matches(options.markers.end.as_str()).count(), 1);
    }

    #[test]
    fn html_comments_other_than_markers_survive() {
        let mut r = dated("P1.md", Status::InProgress, "2025-01-06", "2025-01-17");
        r.progress_report = "- shipped <!-- internal --> build".into();
        let board = aggregate(&[r], date("2025-01-08"), &BoardOptions::default());
        assert_eq!(
            board.categories[0].items[0].notes,
            vec!["shipped <!-- internal --> build"]
        );
    }

    #[test]
    fn gantt_label_strips_syntax_characters() {
        assert_eq!(gantt_label("P1 Fix: auth; #2"), "P1 Fix auth 2");
    }
}
