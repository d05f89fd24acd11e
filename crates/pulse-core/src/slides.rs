//! Slide outline parsing for the status document.
//!
//! The first `# ` heading and the lines under it (up to a `---` rule) form the
//! title slide. Every `### ` heading opens a content slide whose bullets keep
//! one level of nesting. A fenced `mermaid` block becomes a diagram slide of
//! its own.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bullet {
    pub text: String,
    pub level: u8,
}

impl Bullet {
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum OutlineBody {
    Bullets(Vec<Bullet>),
    /// Diagram source, still to be rendered.
    Diagram(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineSlide {
    pub title: String,
    pub body: OutlineBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outline {
    pub title: String,
    pub subtitle: Vec<String>,
    pub slides: Vec<OutlineSlide>,
}

fn is_fence(line: &str) -> bool {
    line.starts_with("```") || line.starts_with("~~~")
}

fn is_heading(line: &str) -> bool {
    line.starts_with('#')
}

fn title_slide(lines: &[&str]) -> (String, Vec<String>) {
    let Some(pos) = lines.iter().position(|l| l.starts_with("# ")) else {
        return (String::new(), Vec::new());
    };
    let title = lines[pos][2..].trim().to_string();
    let subtitle = lines[pos + 1..]
        .iter()
        .map(|l| l.trim())
        .take_while(|l| *l != "---" && !is_heading(l) && !l.starts_with("<!--"))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    (title, subtitle)
}

fn bullet(line: &str) -> Bullet {
    if line.starts_with("* ") {
        Bullet::new(line.trim_start_matches(['*', ' ']), 1)
    } else if line.starts_with("- ") {
        Bullet::new(line.trim_start_matches(['-', ' ']), 0)
    } else {
        Bullet::new(line, 0)
    }
}

/// Parse `markdown` into a slide outline. Diagram slides are titled
/// `diagram_title`.
pub fn parse(markdown: &str, diagram_title: &str) -> Outline {
    let lines: Vec<&str> = markdown.lines().collect();
    let (title, subtitle) = title_slide(&lines);

    let mut slides = Vec::new();
    let mut current: Option<(String, Vec<Bullet>)> = None;
    let mut diagram: Option<String> = None;
    let mut in_code = false;

    for raw in &lines {
        let line = raw.trim();

        if let Some(source) = diagram.as_mut() {
            if is_fence(line) {
                slides.push(OutlineSlide {
                    title: diagram_title.to_string(),
                    body: OutlineBody::Diagram(source.trim_end().to_string()),
                });
                diagram = None;
            } else {
                source.push_str(raw.trim_end());
                source.push('\n');
            }
            continue;
        }

        if let Some(heading) = raw.strip_prefix("### ").filter(|_| !in_code) {
            if let Some((t, bullets)) = current.take() {
                slides.push(OutlineSlide {
                    title: t,
                    body: OutlineBody::Bullets(bullets),
                });
            }
            current = Some((heading.trim().to_string(), Vec::new()));
            continue;
        }

        if !in_code && line.starts_with("```mermaid") {
            if let Some((t, bullets)) = current.take() {
                slides.push(OutlineSlide {
                    title: t,
                    body: OutlineBody::Bullets(bullets),
                });
            }
            diagram = Some(String::new());
            continue;
        }

        if is_fence(line) {
            in_code = !in_code;
            continue;
        }

        if !in_code && is_heading(line) {
            // Any other heading level closes the slide being collected.
            if let Some((t, bullets)) = current.take() {
                slides.push(OutlineSlide {
                    title: t,
                    body: OutlineBody::Bullets(bullets),
                });
            }
            continue;
        }

        if let Some((_, bullets)) = current.as_mut() {
            if !line.is_empty() && !line.starts_with("<!--") {
                bullets.push(bullet(line));
            }
        }
    }

    if let Some((t, bullets)) = current {
        slides.push(OutlineSlide {
            title: t,
            body: OutlineBody::Bullets(bullets),
        });
    }
    // An unclosed diagram fence still gets its slide.
    if let Some(source) = diagram {
        slides.push(OutlineSlide {
            title: diagram_title.to_string(),
            body: OutlineBody::Diagram(source.trim_end().to_string()),
        });
    }

    Outline {
        title,
        subtitle,
        slides,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Team Status
Platform squad
Week 3

---

### Highlights
Shipped the importer
- kept scope tight

<!-- AUTO_UPDATE_START -->
```mermaid
gantt
    title Project Timeline
    section In-Progress
    P1 Billing :active, 2025-01-06, 2025-01-17
```

### In-Progress Projects
- P1 Billing (30%)
  * wired API

### Pending Projects
- None

<!-- AUTO_UPDATE_END -->

## Appendix
not on a slide
";

    fn bullets(slide: &OutlineSlide) -> &[Bullet] {
        match &slide.body {
            OutlineBody::Bullets(b) => b,
            other => panic!("expected bullets, got {other:?}"),
        }
    }

    #[test]
    fn title_slide_stops_at_rule() {
        let outline = parse(DOC, "Timeline");
        assert_eq!(outline.title, "Team Status");
        assert_eq!(outline.subtitle, vec!["Platform squad", "Week 3"]);
    }

    #[test]
    fn slides_follow_document_order() {
        let outline = parse(DOC, "Timeline");
        let titles: Vec<&str> = outline.slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Highlights", "Timeline", "In-Progress Projects", "Pending Projects"]
        );
    }

    #[test]
    fn bullets_keep_nesting_and_skip_comments() {
        let outline = parse(DOC, "Timeline");
        assert_eq!(
            bullets(&outline.slides[0]),
            &[
                Bullet::new("Shipped the importer", 0),
                Bullet::new("kept scope tight", 0)
            ]
        );
        assert_eq!(
            bullets(&outline.slides[2]),
            &[Bullet::new("P1 Billing (30%)", 0), Bullet::new("wired API", 1)]
        );
        assert_eq!(bullets(&outline.slides[3]), &[Bullet::new("None", 0)]);
    }

    #[test]
    fn mermaid_block_becomes_diagram_slide() {
        let outline = parse(DOC, "Timeline");
        match &outline.slides[1].body {
            OutlineBody::Diagram(source) => {
                assert!(source.starts_with("gantt\n"));
                assert!(source.ends_with(":active, 2025-01-06, 2025-01-17"));
            }
            other => panic!("expected diagram, got {other:?}"),
        }
    }

    #[test]
    fn other_code_blocks_keep_their_text() {
        let outline = parse("### Notes\n```\n- inside code\n```\n", "Timeline");
        assert_eq!(bullets(&outline.slides[0]), &[Bullet::new("inside code", 0)]);
    }

    #[test]
    fn missing_title_yields_empty_title_slide() {
        let outline = parse("### Only\n- one\n", "Timeline");
        assert_eq!(outline.title, "");
        assert!(outline.subtitle.is_empty());
        assert_eq!(outline.slides.len(), 1);
    }
}
