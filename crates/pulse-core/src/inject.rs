use crate::config::Markers;
use crate::error::{PulseError, Result};
use std::ops::Range;
use std::path::Path;

/// Byte span of the delimited region in `document`, markers inclusive.
///
/// `Ok(None)` when there is no start marker; a start marker without a later
/// end marker is an error rather than a region running to end of file.
pub fn find_region(document: &str, markers: &Markers) -> Result<Option<Range<usize>>> {
    let Some(start) = document.find(&markers.start) else {
        return Ok(None);
    };
    let search_from = start + markers.start.len();
    let Some(offset) = document[search_from..].find(&markers.end) else {
        return Err(PulseError::UnterminatedRegion(markers.start.clone()));
    };
    Ok(Some(start..search_from + offset + markers.end.len()))
}

/// Replace the delimited region of `document` with `block`, or append `block`
/// after two blank lines when the document has no region yet.
///
/// Bytes outside the region are never altered.
pub fn inject(document: &str, block: &str, markers: &Markers) -> Result<String> {
    match find_region(document, markers)? {
        Some(span) => {
            let mut out = String::with_capacity(document.len() - span.len() + block.len());
            out.push_str(&document[..span.start]);
            out.push_str(block);
            out.push_str(&document[span.end..]);
            Ok(out)
        }
        None => {
            let head = document.trim_end();
            if head.is_empty() {
                Ok(format!("{block}\n"))
            } else {
                Ok(format!("{head}\n\n\n{block}\n"))
            }
        }
    }
}

/// Inject `block` into the file at `path`, writing only if the text changed.
/// Returns true if the file was written.
pub fn inject_file(path: &Path, block: &str, markers: &Markers) -> Result<bool> {
    let document = std::fs::read_to_string(path)?;
    let updated = inject(&document, block, markers)?;
    crate::io::write_if_changed(path, &document, &updated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
