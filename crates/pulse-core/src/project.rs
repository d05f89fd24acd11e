//! Project records: one markdown file per project, metadata in frontmatter.

use crate::error::{PulseError, Result};
use crate::frontmatter::{self, Fields};
use crate::paths;
use crate::types::Status;
use crate::workdays::{count_workdays, parse_date};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const WORKDAYS_KEY: &str = "estimated_workdays";
pub const DEFAULT_TITLE: &str = "N/A";

// ---------------------------------------------------------------------------
// DateField
// ---------------------------------------------------------------------------

/// A header date that may be absent or hold placeholder text such as `TBD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum DateField {
    Missing,
    Placeholder(String),
    Date(NaiveDate),
}

impl DateField {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => DateField::Missing,
            Some(text) => match parse_date(text) {
                Some(date) => DateField::Date(date),
                None => DateField::Placeholder(text.to_string()),
            },
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateField::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Text for tables: the date, the placeholder verbatim, or empty.
    pub fn display(&self) -> String {
        match self {
            DateField::Missing => String::new(),
            DateField::Placeholder(raw) => raw.clone(),
            DateField::Date(d) => d.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    pub project: String,
    /// `None` when the header carries no status or one outside the known set.
    pub status: Option<Status>,
    pub start_date: DateField,
    pub due_date: DateField,
    pub actual_end_date: DateField,
    /// Recomputed from the dates; `None` when either date is unusable.
    pub estimated_workdays: Option<u32>,
    pub progress_report: String,
    pub source_path: PathBuf,
}

impl ProjectRecord {
    /// Build a record from header fields, applying the per-field defaults.
    pub fn from_fields(fields: &Fields, progress_report: String, source_path: &Path) -> Self {
        let text = |key: &str| {
            fields
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let status = match text("status") {
            Some(raw) => match raw.parse::<Status>() {
                Ok(s) => Some(s),
                Err(_) => {
                    debug!(path = %source_path.display(), status = %raw, "unknown status");
                    None
                }
            },
            None => None,
        };

        let start_date = DateField::from_raw(fields.get("start_date").map(String::as_str));
        let due_date = DateField::from_raw(fields.get("due_date").map(String::as_str));
        let estimated_workdays = match (start_date.date(), due_date.date()) {
            (Some(s), Some(d)) => Some(count_workdays(s, d)),
            _ => None,
        };

        Self {
            id: text("id").unwrap_or_else(|| paths::file_stem(source_path)),
            title: text("title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            project: text("project").unwrap_or_default(),
            status,
            start_date,
            due_date,
            actual_end_date: DateField::from_raw(
                fields.get("actual_end_date").map(String::as_str),
            ),
            estimated_workdays,
            progress_report,
            source_path: source_path.to_path_buf(),
        }
    }

    /// Source file name, the sort key for category lists.
    pub fn file_name(&self) -> String {
        paths::file_name(&self.source_path)
    }

    /// Human-facing label: `"<id> <title>"` on a single line, with runs of
    /// whitespace (including newlines from block scalars) collapsed.
    pub fn label(&self) -> String {
        self.id
            .split_whitespace()
            .chain(self.title.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// Progress report section
// ---------------------------------------------------------------------------

static HEADING_RE: OnceLock<Regex> = OnceLock::new();

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"^(#{1,6})[ \t]+(.*?)[ \t#]*$").unwrap())
}

/// Parse an ATX heading line into `(level, text)`.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let caps = heading_re().captures(line.trim_end_matches(['\r', '\n']))?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((level, text))
}

fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

/// Raw text of the section introduced by `heading` (e.g. `## Progress Report`),
/// trimmed; empty when the section is absent.
///
/// The section runs until the next heading of the same or a higher level,
/// ignoring `#` lines inside fenced code.
pub fn progress_section(body: &str, heading: &str) -> String {
    let Some((level, wanted)) = parse_heading(heading.trim()) else {
        return String::new();
    };

    let mut in_fence = false;
    let mut collecting = false;
    let mut section = String::new();
    for line in body.split_inclusive('\n') {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some((lvl, text)) = parse_heading(line) {
                if collecting && lvl <= level {
                    break;
                }
                if !collecting && lvl == level && text.eq_ignore_ascii_case(wanted) {
                    collecting = true;
                    continue;
                }
            }
        }
        if collecting {
            section.push_str(line);
        }
    }
    section.trim().to_string()
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Whether extraction may rewrite project files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Apply,
    DryRun,
}

#[derive(Debug, Clone)]
pub struct Extracted {
    pub record: ProjectRecord,
    /// True when the stored `estimated_workdays` was (or, in a dry run, would
    /// be) rewritten.
    pub rewritten: bool,
}

/// Read one project file, recompute its derived fields and, when the stored
/// `estimated_workdays` differs, rewrite that single header line in place.
pub fn extract(path: &Path, progress_heading: &str, mode: WriteMode) -> Result<Extracted> {
    let content = std::fs::read_to_string(path)?;
    let fm = frontmatter::split(&content)?;
    let fields = fm.fields()?;
    let progress = progress_section(fm.body, progress_heading);
    let record = ProjectRecord::from_fields(&fields, progress, path);

    for (key, field) in [("start_date", &record.start_date), ("due_date", &record.due_date)] {
        if let DateField::Placeholder(raw) = field {
            debug!(path = %path.display(), key, value = %raw, "unparseable date, workdays unknown");
        }
    }

    let mut rewritten = false;
    if let Some(workdays) = record.estimated_workdays {
        let computed = workdays.to_string();
        let stored = fields.get(WORKDAYS_KEY).map(|v| v.trim());
        if stored != Some(computed.as_str()) {
            let updated = frontmatter::set_field(&content, WORKDAYS_KEY, &computed)?;
            rewritten = match mode {
                WriteMode::Apply => crate::io::write_if_changed(path, &content, &updated)?,
                WriteMode::DryRun => updated != content,
            };
            if rewritten {
                info!(
                    path = %path.display(),
                    from = stored.unwrap_or("<missing>"),
                    to = workdays,
                    "estimated_workdays updated"
                );
            }
        }
    }

    Ok(Extracted { record, rewritten })
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// A project file left out of the aggregate, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Scan {
    pub records: Vec<ProjectRecord>,
    /// Files whose `estimated_workdays` line was rewritten.
    pub rewritten: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

impl Scan {
    pub fn scanned(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Extract every `*.md` file in `dir`, sequentially and in path order.
///
/// A failure in one file is recorded in `skipped` and the scan moves on.
pub fn scan(dir: &Path, progress_heading: &str, mode: WriteMode) -> Result<Scan> {
    let mut scan = Scan::default();
    for path in paths::markdown_files(dir)? {
        match extract(&path, progress_heading, mode) {
            Ok(extracted) => {
                debug!(path = %path.display(), "extracted project record");
                if extracted.rewritten {
                    scan.rewritten.push(path.clone());
                }
                scan.records.push(extracted.record);
            }
            Err(e) => {
                let reason = match &e {
                    PulseError::MissingHeader => "no frontmatter header".to_string(),
                    other => other.to_string(),
                };
                warn!(path = %path.display(), %reason, "skipping project file");
                scan.skipped.push(SkippedFile { path, reason });
            }
        }
    }
    Ok(scan)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
