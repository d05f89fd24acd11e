use crate::output::{display_path, print_json, print_table, Align};
use anyhow::Context;
use chrono::NaiveDate;
use pulse_core::{
    aggregate::progress,
    config::Config,
    project::{self, ProjectRecord, WriteMode},
};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ProjectRow<'a> {
    #[serde(flatten)]
    record: &'a ProjectRecord,
    progress: Option<u32>,
}

pub fn run(root: &Path, today: Option<NaiveDate>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let reference = super::reference_date(today);
    // Listing never rewrites project files.
    let scan = project::scan(
        &config.projects_path(root),
        &config.progress_heading,
        WriteMode::DryRun,
    )
    .context("failed to scan project files")?;

    if json {
        let rows: Vec<ProjectRow> = scan
            .records
            .iter()
            .map(|record| ProjectRow {
                record,
                progress: progress(record, reference),
            })
            .collect();
        let value = serde_json::json!({
            "reference_date": reference,
            "projects": rows,
            "skipped": scan.skipped,
        });
        return print_json(&value);
    }

    if scan.records.is_empty() {
        println!("No project files found in {}.", config.projects_dir);
    } else {
        let rows: Vec<Vec<String>> = scan
            .records
            .iter()
            .map(|r| {
                vec![
                    display_path(root, &r.source_path),
                    r.id.clone(),
                    r.title.split_whitespace().collect::<Vec<_>>().join(" "),
                    r.status.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                    r.start_date.display(),
                    r.due_date.display(),
                    r.estimated_workdays
                        .map(|w| w.to_string())
                        .unwrap_or_else(|| "?".into()),
                    progress(r, reference)
                        .map(|p| format!("{p}%"))
                        .unwrap_or_default(),
                ]
            })
            .collect();
        print_table(
            &[
                ("FILE", Align::Left),
                ("ID", Align::Left),
                ("TITLE", Align::Left),
                ("STATUS", Align::Left),
                ("START", Align::Left),
                ("DUE", Align::Left),
                ("WORKDAYS", Align::Right),
                ("PROGRESS", Align::Right),
            ],
            &rows,
        );
    }

    for skipped in &scan.skipped {
        println!(
            "skipped {}: {}",
            display_path(root, &skipped.path),
            skipped.reason
        );
    }
    Ok(())
}
