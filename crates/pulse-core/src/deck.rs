//! Slide deck assembly and output.
//!
//! A `Deck` is the outline with every diagram resolved to an image or its
//! text fallback. Writers turn it into a file; an optional converter command
//! turns that file into whatever binary format the team presents from.

use crate::config::{DeckConfig, DeckFormat, ImageFormat};
use crate::diagram::{render_or_fallback, DiagramRenderer, Rendered};
use crate::error::{PulseError, Result};
use crate::slides::{Bullet, Outline, OutlineBody};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SlideBody {
    Bullets(Vec<Bullet>),
    Image(PathBuf),
    Preformatted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slide {
    pub title: String,
    pub body: SlideBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deck {
    pub title: String,
    pub subtitle: Vec<String>,
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Resolve `outline` into a deck, rendering diagrams into `image_dir` as
    /// `<stem>-diagram-<n>.<ext>`.
    pub fn build(
        outline: Outline,
        renderer: &dyn DiagramRenderer,
        image_dir: &Path,
        stem: &str,
        format: ImageFormat,
    ) -> Self {
        let mut diagrams = 0;
        let slides = outline
            .slides
            .into_iter()
            .map(|slide| {
                let body = match slide.body {
                    OutlineBody::Bullets(bullets) => SlideBody::Bullets(bullets),
                    OutlineBody::Diagram(source) => {
                        diagrams += 1;
                        let output = image_dir
                            .join(format!("{stem}-diagram-{diagrams}.{}", format.extension()));
                        match render_or_fallback(renderer, &source, &output) {
                            Rendered::Image(path) => SlideBody::Image(path),
                            Rendered::Fallback(source) => SlideBody::Preformatted(source),
                        }
                    }
                };
                Slide {
                    title: slide.title,
                    body,
                }
            })
            .collect();

        Self {
            title: outline.title,
            subtitle: outline.subtitle,
            slides,
        }
    }

    pub fn image_count(&self) -> usize {
        self.slides
            .iter()
            .filter(|s| matches!(s.body, SlideBody::Image(_)))
            .count()
    }

    pub fn fallback_count(&self) -> usize {
        self.slides
            .iter()
            .filter(|s| matches!(s.body, SlideBody::Preformatted(_)))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

pub trait DeckWriter {
    /// Serialize `deck` as it will be stored at `path`.
    fn render(&self, deck: &Deck, path: &Path) -> Result<String>;

    fn write(&self, deck: &Deck, path: &Path) -> Result<()> {
        let text = self.render(deck, path)?;
        crate::io::atomic_write(path, text.as_bytes())
    }
}

/// Image reference relative to the deck file's directory when possible.
fn relative_to(path: &Path, deck_path: &Path) -> String {
    let base = deck_path.parent().unwrap_or(Path::new(""));
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Marp-flavoured markdown: front matter, `---` between slides.
#[derive(Debug, Clone)]
pub struct MarpWriter {
    pub theme: String,
}

const MARP_STYLE: &str = "\
  section { font-family: 'Helvetica Neue', Arial, sans-serif; }
  section.lead h1 { font-size: 56px; }
  section li { font-size: 26px; }
  section pre { font-size: 16px; }
";

impl DeckWriter for MarpWriter {
    fn render(&self, deck: &Deck, path: &Path) -> Result<String> {
        let mut out = String::new();
        out.push_str("---\nmarp: true\n");
        let _ = writeln!(out, "theme: {}", self.theme);
        out.push_str("paginate: true\nstyle: |\n");
        out.push_str(MARP_STYLE);
        out.push_str("---\n\n<!-- _class: lead -->\n\n");
        let _ = writeln!(out, "# {}", deck.title);
        for line in &deck.subtitle {
            let _ = write!(out, "\n{line}\n");
        }

        for slide in &deck.slides {
            let _ = write!(out, "\n---\n\n## {}\n", slide.title);
            match &slide.body {
                SlideBody::Bullets(bullets) => {
                    if !bullets.is_empty() {
                        out.push('\n');
                    }
                    for b in bullets {
                        let indent = "  ".repeat(usize::from(b.level));
                        let _ = writeln!(out, "{indent}- {}", b.text);
                    }
                }
                SlideBody::Image(image) => {
                    let _ = write!(out, "\n![w:1100]({})\n", relative_to(image, path));
                }
                SlideBody::Preformatted(text) => {
                    let _ = write!(out, "\n```text\n{}\n```\n", text.trim_end());
                }
            }
        }
        Ok(out)
    }
}

/// The deck as pretty JSON, for external slide generators.
#[derive(Debug, Clone, Copy)]
pub struct JsonWriter;

impl DeckWriter for JsonWriter {
    fn render(&self, deck: &Deck, path: &Path) -> Result<String> {
        let mut relative = deck.clone();
        for slide in &mut relative.slides {
            if let SlideBody::Image(image) = &mut slide.body {
                *image = PathBuf::from(relative_to(image, path));
            }
        }
        let mut json = serde_json::to_string_pretty(&relative)?;
        json.push('\n');
        Ok(json)
    }
}

pub fn writer_for(format: DeckFormat, config: &DeckConfig) -> Box<dyn DeckWriter> {
    match format {
        DeckFormat::Marp => Box::new(MarpWriter {
            theme: config.theme.clone(),
        }),
        DeckFormat::Json => Box::new(JsonWriter),
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Substitute `{input}` and `{output}` into the converter argv template.
pub fn converter_args(template: &[String], input: &Path, output: &Path) -> Vec<String> {
    let input = input.to_string_lossy();
    let output = output.to_string_lossy();
    template
        .iter()
        .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
        .collect()
}

/// Run the configured converter on the written deck.
pub fn convert(template: &[String], input: &Path, output: &Path) -> Result<()> {
    let args = converter_args(template, input, output);
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| PulseError::DeckConvert("converter command is empty".into()))?;

    info!(program = %program, output = %output.display(), "converting deck");
    let result = Command::new(program)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| PulseError::DeckConvert(format!("failed to run {program}: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let hint: String = stderr.trim().chars().take(500).collect();
        return Err(PulseError::DeckConvert(format!(
            "{program} exited with {}: {hint}",
            result.status
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
