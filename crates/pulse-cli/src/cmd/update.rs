use crate::output::{display_path, print_json};
use anyhow::Context;
use chrono::NaiveDate;
use pulse_core::{
    config::Config,
    paths,
    pipeline::{self, UpdateReport},
    project::WriteMode,
};
use std::path::Path;

pub fn run(root: &Path, today: Option<NaiveDate>, check: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let reference = super::reference_date(today);
    let mode = if check {
        WriteMode::DryRun
    } else {
        WriteMode::Apply
    };

    if !json {
        println!("Starting update process...");
    }
    let report = pipeline::run_update(root, &config, reference, mode)
        .context("update failed")?;

    if json {
        print_json(&report)?;
    } else {
        print_summary(root, &report);
    }

    if check && report.changed() {
        anyhow::bail!("status files are out of date; run 'pulse update'");
    }
    Ok(())
}

fn print_summary(root: &Path, report: &UpdateReport) {
    let verb = if report.dry_run { "Would update" } else { "Updated" };

    println!(
        "{verb} {} of {} project files.",
        report.rewritten.len(),
        report.scanned
    );
    for path in &report.rewritten {
        println!("  {}", display_path(root, path));
    }

    if !report.skipped.is_empty() {
        println!("Skipped {} file(s):", report.skipped.len());
        for skipped in &report.skipped {
            println!("  {}: {}", display_path(root, &skipped.path), skipped.reason);
        }
    }

    let name = paths::file_name(&report.target);
    if report.document_changed {
        println!("{verb} people file: {name}");
    } else {
        println!("People file unchanged: {name}");
    }

    println!("Update process finished.");
}
