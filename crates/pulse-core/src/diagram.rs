//! Diagram rendering through an external renderer (mermaid-cli by default).
//!
//! The renderer is a black box: diagram source in, image file out. Any
//! failure degrades to embedding the raw source as preformatted text.

use crate::config::DiagramConfig;
use crate::error::{PulseError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

pub trait DiagramRenderer {
    /// Render `source` into an image at `output`.
    fn render(&self, source: &str, output: &Path) -> Result<()>;
}

/// Runs `<program> -i <input> -o <output>`; the image type follows the
/// output file's extension.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    pub program: String,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &DiagramConfig) -> Self {
        Self::new(config.program.clone())
    }

    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }
}

impl DiagramRenderer for CommandRenderer {
    fn render(&self, source: &str, output: &Path) -> Result<()> {
        let program = which::which(&self.program).map_err(|_| {
            PulseError::DiagramRender(format!("'{}' not found on PATH", self.program))
        })?;

        let mut input = tempfile::Builder::new()
            .prefix("pulse-diagram-")
            .suffix(".mmd")
            .tempfile()?;
        input.write_all(source.as_bytes())?;
        input.flush()?;

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        debug!(program = %program.display(), output = %output.display(), "rendering diagram");
        let result = Command::new(&program)
            .arg("-i")
            .arg(input.path())
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| PulseError::DiagramRender(e.to_string()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let hint: String = stderr.trim().chars().take(500).collect();
            return Err(PulseError::DiagramRender(format!(
                "{} exited with {}: {hint}",
                self.program, result.status
            )));
        }
        if !output.is_file() {
            return Err(PulseError::DiagramRender(format!(
                "{} produced no file at {}",
                self.program,
                output.display()
            )));
        }
        Ok(())
    }
}

/// Outcome of rendering one diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Rendered {
    Image(PathBuf),
    /// The renderer failed; carries the diagram source verbatim.
    Fallback(String),
}

/// Render `source` to `output`, falling back to the raw source on any failure.
pub fn render_or_fallback(renderer: &dyn DiagramRenderer, source: &str, output: &Path) -> Rendered {
    match renderer.render(source, output) {
        Ok(()) => Rendered::Image(output.to_path_buf()),
        Err(e) => {
            warn!(error = %e, "diagram render failed, embedding source as text");
            Rendered::Fallback(source.to_string())
        }
    }
}
