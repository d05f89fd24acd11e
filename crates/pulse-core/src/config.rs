use crate::error::{PulseError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// Start/end tokens delimiting the generated region of the status document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markers {
    #[serde(default = "default_start_marker")]
    pub start: String,
    #[serde(default = "default_end_marker")]
    pub end: String,
}

fn default_start_marker() -> String {
    "<!-- AUTO_UPDATE_START -->".to_string()
}

fn default_end_marker() -> String {
    "<!-- AUTO_UPDATE_END -->".to_string()
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: default_start_marker(),
            end: default_end_marker(),
        }
    }
}

// ---------------------------------------------------------------------------
// TimelineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_timeline_title")]
    pub title: String,
    /// Completed projects kept on the chart, most recent first.
    #[serde(default = "default_completed_limit")]
    pub completed_limit: usize,
}

fn default_timeline_title() -> String {
    "Project Timeline".to_string()
}

fn default_completed_limit() -> usize {
    3
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            title: default_timeline_title(),
            completed_limit: default_completed_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// DiagramConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramConfig {
    /// Renderer executable, invoked as `<program> -i <input> -o <output>`.
    #[serde(default = "default_diagram_program")]
    pub program: String,
    #[serde(default)]
    pub format: ImageFormat,
}

fn default_diagram_program() -> String {
    "mmdc".to_string()
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            program: default_diagram_program(),
            format: ImageFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// DeckConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckFormat {
    /// Marp-flavoured markdown deck.
    #[default]
    Marp,
    /// Plain slide outline for downstream tooling.
    Json,
}

impl DeckFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DeckFormat::Marp => "marp",
            DeckFormat::Json => "json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DeckFormat::Marp => "md",
            DeckFormat::Json => "json",
        }
    }
}

impl fmt::Display for DeckFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeckFormat {
    type Err = PulseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "marp" => Ok(DeckFormat::Marp),
            "json" => Ok(DeckFormat::Json),
            _ => Err(PulseError::InvalidDeckFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    #[serde(default = "default_deck_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub format: DeckFormat,
    #[serde(default = "default_deck_theme")]
    pub theme: String,
    /// Argv template run after the deck is written; `{input}` and `{output}`
    /// are substituted, e.g. `[marp, "{input}", --pptx, -o, "{output}"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<Vec<String>>,
    /// Extension of the file the converter produces.
    #[serde(default = "default_converted_extension")]
    pub converted_extension: String,
}

fn default_deck_output_dir() -> String {
    "slides".to_string()
}

fn default_deck_theme() -> String {
    "default".to_string()
}

fn default_converted_extension() -> String {
    "pptx".to_string()
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            output_dir: default_deck_output_dir(),
            format: DeckFormat::default(),
            theme: default_deck_theme(),
            converter: None,
            converted_extension: default_converted_extension(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,
    #[serde(default = "default_people_dir")]
    pub people_dir: String,
    #[serde(default)]
    pub markers: Markers,
    #[serde(default = "default_progress_heading")]
    pub progress_heading: String,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub diagram: DiagramConfig,
    #[serde(default)]
    pub deck: DeckConfig,
}

fn default_projects_dir() -> String {
    "projects".to_string()
}

fn default_people_dir() -> String {
    "people".to_string()
}

fn default_progress_heading() -> String {
    "## Progress Report".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            people_dir: default_people_dir(),
            markers: Markers::default(),
            progress_heading: default_progress_heading(),
            timeline: TimelineConfig::default(),
            diagram: DiagramConfig::default(),
            deck: DeckConfig::default(),
        }
    }
}

impl Config {
    /// Load `pulse.yaml` from `root`; a missing file means all defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn projects_path(&self, root: &Path) -> PathBuf {
        root.join(&self.projects_dir)
    }

    pub fn people_path(&self, root: &Path) -> PathBuf {
        root.join(&self.people_dir)
    }

    pub fn deck_output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.deck.output_dir)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut push = |level: WarnLevel, message: String| {
            warnings.push(ConfigWarning { level, message })
        };

        if self.markers.start.trim().is_empty() || self.markers.end.trim().is_empty() {
            push(WarnLevel::Error, "markers.start and markers.end must not be empty".into());
        } else if self.markers.start == self.markers.end {
            push(
                WarnLevel::Error,
                format!("markers.start and markers.end are identical ('{}')", self.markers.start),
            );
        }

        if !self.progress_heading.trim_start().starts_with('#') {
            push(
                WarnLevel::Warning,
                format!(
                    "progress_heading '{}' is not a markdown heading; progress reports will not be found",
                    self.progress_heading
                ),
            );
        }

        if self.timeline.completed_limit == 0 {
            push(
                WarnLevel::Warning,
                "timeline.completed_limit is 0: completed projects never appear on the timeline"
                    .into(),
            );
        }

        if self.projects_dir == self.people_dir {
            push(
                WarnLevel::Error,
                format!(
                    "projects_dir and people_dir are both '{}': the status page would be scanned as a project",
                    self.projects_dir
                ),
            );
        }

        if self.deck.output_dir == self.people_dir && self.deck.format == DeckFormat::Marp {
            push(
                WarnLevel::Error,
                "deck.output_dir equals people_dir: a markdown deck there makes the status page ambiguous"
                    .into(),
            );
        }

        if let Some(argv) = &self.deck.converter {
            if argv.is_empty() {
                push(WarnLevel::Error, "deck.converter is empty".into());
            } else if !argv.iter().any(|a| a.contains("{input}")) {
                push(
                    WarnLevel::Warning,
                    "deck.converter never references {input}".into(),
                );
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
