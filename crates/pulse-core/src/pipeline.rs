//! Batch jobs: `update` (project files → status board → status document)
//! and `present` (status document → slide deck).

use crate::aggregate::{self, BoardOptions};
use crate::config::{Config, DeckFormat};
use crate::deck::{self, Deck};
use crate::diagram::DiagramRenderer;
use crate::error::Result;
use crate::inject;
use crate::paths;
use crate::project::{self, SkippedFile, WriteMode};
use crate::slides;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub reference_date: NaiveDate,
    pub target: PathBuf,
    pub scanned: usize,
    pub records: usize,
    /// Project files whose `estimated_workdays` changed.
    pub rewritten: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub document_changed: bool,
    pub dry_run: bool,
}

impl UpdateReport {
    /// True when any file was (or in a dry run would be) written.
    pub fn changed(&self) -> bool {
        self.document_changed || !self.rewritten.is_empty()
    }
}

/// Run the full pipeline under `root`.
///
/// The status document is located and its region validated before any
/// project file is touched, so a missing or broken target leaves the tree
/// unmodified. The document itself is written last and only when its text
/// changed.
pub fn run_update(
    root: &Path,
    config: &Config,
    reference: NaiveDate,
    mode: WriteMode,
) -> Result<UpdateReport> {
    let target = paths::find_target_document(&config.people_path(root))?;
    let document = std::fs::read_to_string(&target)?;
    inject::find_region(&document, &config.markers)?;

    let scan = project::scan(&config.projects_path(root), &config.progress_heading, mode)?;
    info!(
        scanned = scan.scanned(),
        rewritten = scan.rewritten.len(),
        skipped = scan.skipped.len(),
        "project scan finished"
    );

    let options = BoardOptions::from_config(config);
    let block = aggregate::render_block(&scan.records, reference, &options);
    let updated = inject::inject(&document, &block, &config.markers)?;
    let document_changed = match mode {
        WriteMode::Apply => crate::io::write_if_changed(&target, &document, &updated)?,
        WriteMode::DryRun => updated != document,
    };
    if document_changed {
        info!(path = %target.display(), "status document updated");
    }

    Ok(UpdateReport {
        reference_date: reference,
        target,
        scanned: scan.scanned(),
        records: scan.records.len(),
        rewritten: scan.rewritten,
        skipped: scan.skipped,
        document_changed,
        dry_run: mode == WriteMode::DryRun,
    })
}

// ---------------------------------------------------------------------------
// present
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PresentReport {
    pub source: PathBuf,
    pub deck: PathBuf,
    /// Output of the converter command, when one is configured.
    pub converted: Option<PathBuf>,
    pub slides: usize,
    pub diagrams_rendered: usize,
    pub diagram_fallbacks: usize,
}

/// Render the status document under `root` into a slide deck.
///
/// The deck is written to `deck.output_dir` as `<document-stem>.<ext>`,
/// diagram images beside it. A failing diagram renderer never aborts the run.
pub fn run_present(
    root: &Path,
    config: &Config,
    format: DeckFormat,
    renderer: &dyn DiagramRenderer,
) -> Result<PresentReport> {
    let source = paths::find_target_document(&config.people_path(root))?;
    let markdown = std::fs::read_to_string(&source)?;
    let outline = slides::parse(&markdown, &config.timeline.title);

    let out_dir = config.deck_output_path(root);
    crate::io::ensure_dir(&out_dir)?;
    let stem = paths::file_stem(&source);
    let deck = Deck::build(outline, renderer, &out_dir, &stem, config.diagram.format);

    let deck_path = out_dir.join(format!("{stem}.{}", format.extension()));
    deck::writer_for(format, &config.deck).write(&deck, &deck_path)?;
    info!(path = %deck_path.display(), slides = deck.slides.len() + 1, "deck written");

    let converted = match &config.deck.converter {
        Some(template) => {
            let output = out_dir.join(format!("{stem}.{}", config.deck.converted_extension));
            deck::convert(template, &deck_path, &output)?;
            Some(output)
        }
        None => None,
    };

    Ok(PresentReport {
        source,
        deck: deck_path,
        converted,
        // The title slide counts.
        slides: deck.slides.len() + 1,
        diagrams_rendered: deck.image_count(),
        diagram_fallbacks: deck.fallback_count(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
