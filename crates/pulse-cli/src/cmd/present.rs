use crate::output::{display_path, print_json};
use anyhow::Context;
use pulse_core::{
    config::{Config, DeckFormat},
    diagram::CommandRenderer,
    pipeline,
};
use std::path::Path;

pub fn run(root: &Path, format: Option<DeckFormat>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let format = format.unwrap_or(config.deck.format);
    let renderer = CommandRenderer::from_config(&config.diagram);
    if !renderer.is_available() {
        tracing::warn!(
            program = %renderer.program,
            "diagram renderer not found; timeline will be embedded as text"
        );
    }

    let report = pipeline::run_present(root, &config, format, &renderer)
        .context("failed to build presentation")?;

    if json {
        return print_json(&report);
    }

    println!("Processing file: {}", display_path(root, &report.source));
    println!(
        "Saving presentation to: {} ({} slides)",
        display_path(root, &report.deck),
        report.slides
    );
    if report.diagram_fallbacks > 0 {
        println!(
            "{} diagram(s) could not be rendered and were embedded as text.",
            report.diagram_fallbacks
        );
    }
    if let Some(converted) = &report.converted {
        println!("Converted deck: {}", display_path(root, converted));
    }
    println!("Presentation created successfully.");
    Ok(())
}
