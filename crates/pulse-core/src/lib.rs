pub mod aggregate;
pub mod config;
pub mod deck;
pub mod diagram;
pub mod error;
pub mod frontmatter;
pub mod inject;
pub mod io;
pub mod paths;
pub mod pipeline;
pub mod project;
pub mod slides;
pub mod types;
pub mod workdays;

pub use error::{PulseError, Result};
