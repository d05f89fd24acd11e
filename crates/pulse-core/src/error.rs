use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PulseError {
    #[error("no markdown file found in {}", .0.display())]
    NoTargetDocument(PathBuf),

    #[error("expected exactly one markdown file in {}, found {}", .dir.display(), .found.len())]
    AmbiguousTargetDocument { dir: PathBuf, found: Vec<PathBuf> },

    #[error("region start marker '{0}' has no matching end marker")]
    UnterminatedRegion(String),

    #[error("missing frontmatter header")]
    MissingHeader,

    #[error("malformed frontmatter header: {0}")]
    MalformedHeader(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid deck format '{0}': expected 'marp' or 'json'")]
    InvalidDeckFormat(String),

    #[error("diagram render failed: {0}")]
    DiagramRender(String),

    #[error("deck conversion failed: {0}")]
    DeckConvert(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PulseError>;
