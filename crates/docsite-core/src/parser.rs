//! Markdown document parsing: front-matter, HTML rendering, heading ids,
//! excerpt, and category/slug derivation from the file location.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sources::SourceFile;
use crate::types::{DocMeta, Heading, ParsedDocument, TitleSource, DEFAULT_ORDER};

/// Maximum excerpt length, in characters.
pub const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    description: Option<String>,
    #[serde(deserialize_with = "lenient_order")]
    order: Option<i32>,
    #[serde(deserialize_with = "lenient_tags")]
    tags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderValue {
    Number(i32),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// `order: 3` and `order: "3"` are both accepted.
fn lenient_order<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<OrderValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(OrderValue::Number(order)) => Ok(Some(order)),
        Some(OrderValue::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("order must be an integer, got {text:?}"))),
    }
}

/// `tags: rust` is read as a single-element list.
fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(tag)) if !tag.trim().is_empty() => vec![tag.trim().to_string()],
        Some(OneOrMany::Many(tags)) => tags,
        _ => Vec::new(),
    })
}

/// Read and parse one source file.
pub fn parse_file(file: &SourceFile) -> Result<ParsedDocument> {
    let origin = file.rel_path.display().to_string();
    let bytes = fs::read(&file.abs_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::NotFound(origin.clone()),
        _ => Error::io(&file.abs_path, e),
    })?;
    let text = String::from_utf8(bytes).map_err(|e| Error::parse(origin, e))?;
    parse_source(&file.rel_path, &text)
}

/// Parse a document's text. `rel_path` is its location under the docs
/// root and only feeds the category, the slug, and error messages.
pub fn parse_source(rel_path: &Path, text: &str) -> Result<ParsedDocument> {
    let origin = rel_path.display().to_string();
    let (raw_front, body) = split_front_matter(text, &origin)?;
    let front = match raw_front {
        Some(raw) => parse_front_matter(raw, &origin)?,
        None => FrontMatter::default(),
    };
    let (category, slug) = locate(rel_path);
    let (html, headings) = render_markdown(body);

    let first_h1 = headings.iter().find(|h| h.level == 1 && !h.text.is_empty());
    let (title, title_source) = match (non_empty(front.title), first_h1) {
        (Some(title), _) => (title, TitleSource::FrontMatter),
        (None, Some(heading)) => (heading.text.clone(), TitleSource::Heading),
        (None, None) => (humanize(&slug), TitleSource::Slug),
    };
    debug!(path = %origin, %title, headings = headings.len(), "parsed document");

    Ok(ParsedDocument {
        meta: DocMeta {
            title,
            description: non_empty(front.description),
            order: front.order.unwrap_or(DEFAULT_ORDER),
            tags: front.tags,
            category,
            slug,
        },
        title_source,
        excerpt: excerpt(body),
        body_text: body.to_string(),
        html,
        headings,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Split off a leading `---` delimited metadata block. Returns the raw block
/// (if any) and the remaining body.
fn split_front_matter<'a>(text: &'a str, origin: &str) -> Result<(Option<&'a str>, &'a str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == "---" => {
            let start = first.len();
            let mut offset = start;
            for line in lines {
                let marker = line.trim_end();
                if marker == "---" || marker == "..." {
                    return Ok((Some(&text[start..offset]), &text[offset + line.len()..]));
                }
                offset += line.len();
            }
            Err(Error::parse(origin, "unterminated front-matter block"))
        }
        _ => Ok((None, text)),
    }
}

fn parse_front_matter(raw: &str, origin: &str) -> Result<FrontMatter> {
    if raw.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    serde_yaml::from_str(raw)
        .map_err(|e| Error::parse(origin, format!("invalid front-matter: {}", e)))
}

/// `category/name.ext` gives `("category", "name")`, `name.ext` gives
/// `("", "name")`. Deeper files keep the first segment and the file stem.
fn locate(rel_path: &Path) -> (String, String) {
    let slug = rel_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut components = rel_path.components();
    let category = if rel_path.components().count() >= 2 {
        components
            .next()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        String::new()
    };
    (category, slug)
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Render markdown to HTML and collect headings in the same pass, so the
/// anchor ids in the HTML are exactly the ids in the heading list.
fn render_markdown(body: &str) -> (String, Vec<Heading>) {
    let mut headings = Vec::new();
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut open_heading: Option<(HeadingLevel, Vec<Event<'_>>)> = None;

    for event in Parser::new_ext(body, markdown_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                open_heading = Some((level, Vec::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some((level, inner)) = open_heading.take() else {
                    continue;
                };
                let text = clean_heading_text(&plain_text(&inner));
                let id = heading_id(&text);
                headings.push(Heading {
                    text,
                    level: level_number(level),
                    id: id.clone(),
                });
                // The page shell renders the title itself.
                if level == HeadingLevel::H1 {
                    continue;
                }
                events.push(Event::Start(Tag::Heading {
                    level,
                    id: (!id.is_empty()).then(|| CowStr::from(id)),
                    classes: Vec::new(),
                    attrs: Vec::new(),
                }));
                events.extend(inner);
                events.push(Event::End(TagEnd::Heading(level)));
            }
            other => match open_heading.as_mut() {
                Some((_, inner)) => inner.push(other),
                None => events.push(other),
            },
        }
    }

    let mut out = String::with_capacity(body.len() + body.len() / 2);
    html::push_html(&mut out, events.into_iter());
    (out, headings)
}

/// Text content of inline events; markup and raw HTML are dropped, entities
/// arrive already decoded from the markdown parser.
fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

fn clean_heading_text(raw: &str) -> String {
    strip_emoji(raw).split_whitespace().collect::<Vec<_>>().join(" ")
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2B00..=0x2BFF
            | 0x231A..=0x231B
            | 0x23E9..=0x23FA
            | 0xFE00..=0xFE0F
            | 0x200D
            | 0x20E3
            | 0xE0020..=0xE007F
    )
}

pub fn strip_emoji(text: &str) -> String {
    text.chars().filter(|c| !is_emoji(*c)).collect()
}

/// Anchor id of a heading: emoji removed, lowercased, every run of non-word
/// characters collapsed to one `-`, no leading or trailing `-`.
pub fn heading_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut gap = false;
    for c in strip_emoji(text).chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            if gap && !id.is_empty() {
                id.push('-');
            }
            gap = false;
            id.push(c);
        } else {
            gap = true;
        }
    }
    id
}

/// `quick-start` becomes `Quick start`.
pub fn humanize(slug: &str) -> String {
    let spaced = slug.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Body text up to the first blank line, capped at `EXCERPT_CHARS`. A line
/// holding only whitespace counts as blank.
pub fn excerpt(body: &str) -> String {
    let mut paragraph = String::new();
    for line in body.trim().split_inclusive('\n') {
        if line.trim().is_empty() {
            break;
        }
        paragraph.push_str(line);
    }
    paragraph.trim_end().chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_id_collapses_punctuation() {
        assert_eq!(heading_id("Hello, World!"), "hello-world");
        assert_eq!(heading_id("  --Already--dashed--  "), "already-dashed");
        assert_eq!(heading_id("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn heading_id_drops_emoji() {
        assert_eq!(heading_id("🚀 Launch"), "launch");
        assert_eq!(heading_id("Launch ✨ now"), "launch-now");
    }

    #[test]
    fn humanize_first_letter_only() {
        assert_eq!(humanize("quick-start-guide"), "Quick start guide");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn excerpt_stops_at_blank_line() {
        assert_eq!(excerpt("First para.\n\nSecond."), "First para.");
        assert_eq!(excerpt("First para.\n   \nSecond para."), "First para.");
        assert_eq!(excerpt("One\r\ntwo\r\n\t\r\nthree"), "One\r\ntwo");
        let long = "x".repeat(250);
        assert_eq!(excerpt(&long).chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn front_matter_requires_closing_marker() {
        assert!(split_front_matter("---\ntitle: x\n", "a.md").is_err());
        let (raw, body) =
            split_front_matter("---\ntitle: x\n---\nbody", "a.md").expect("split");
        assert_eq!(raw, Some("title: x\n"));
        assert_eq!(body, "body");
    }

    #[test]
    fn locate_uses_first_segment_and_stem() {
        assert_eq!(locate(Path::new("a.md")), (String::new(), "a".to_string()));
        assert_eq!(locate(Path::new("guide/b.md")), ("guide".to_string(), "b".to_string()));
        assert_eq!(
            locate(Path::new("guide/deep/c.md")),
            ("guide".to_string(), "c".to_string())
        );
    }
}
