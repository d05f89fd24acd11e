use serde::Serialize;
use std::path::Path;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// `path` relative to `root` for display, unchanged when outside it.
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Column layout for [`render_table`]: header text and cell alignment.
pub type Column<'a> = (&'a str, Align);

/// Lay out `rows` under `columns`, two spaces between columns, widths counted
/// in characters. Missing cells render blank; extra cells are dropped. No line
/// carries trailing whitespace.
pub fn render_table(columns: &[Column<'_>], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, (header, _))| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();

    let line = |cells: &mut dyn Iterator<Item = &str>| -> String {
        let padded: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|((_, align), &width)| {
                let cell = cells.next().unwrap_or("");
                match align {
                    Align::Left => format!("{cell:<width$}"),
                    Align::Right => format!("{cell:>width$}"),
                }
            })
            .collect();
        let mut text = padded.join("  ");
        text.truncate(text.trim_end().len());
        text.push('\n');
        text
    };

    let mut out = line(&mut columns.iter().map(|(header, _)| *header));
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&line(&mut row.iter().map(String::as_str)));
    }
    out
}

pub fn print_table(columns: &[Column<'_>], rows: &[Vec<String>]) {
    print!("{}", render_table(columns, rows));
}
