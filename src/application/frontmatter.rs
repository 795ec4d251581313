//! Front matter extraction.
//!
//! Content files open with a YAML header fenced by `---` lines. The header is
//! decoded into [`FrontMatter`], a fixed schema where every field carries its own
//! default: a key that is missing or has the wrong shape only resets that field.
//! Extraction itself never fails.

use std::collections::HashSet;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};
use tracing::debug;

const DELIMITER: &str = "---";
pub const DEFAULT_TITLE: &str = "Untitled";

/// Typed front matter with defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    /// Falls back to the processing time, never absent.
    pub date: OffsetDateTime,
    pub tags: Vec<String>,
    pub featured: bool,
    pub cover: Option<String>,
    pub repo: Option<String>,
    pub link: Option<String>,
}

impl FrontMatter {
    pub fn defaults(now: OffsetDateTime) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            date: now,
            tags: Vec::new(),
            featured: false,
            cover: None,
            repo: None,
            link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Raw header as written. Each field is captured untyped so a bad value in one
/// key cannot fail decoding of the others.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontMatter {
    title: Option<Value>,
    description: Option<Value>,
    date: Option<Value>,
    tags: Option<Value>,
    featured: Option<Value>,
    cover: Option<Value>,
    repo: Option<Value>,
    link: Option<Value>,
}

/// Split `raw` into front matter and body, using `now` for a missing date.
pub fn extract(raw: &str, now: OffsetDateTime) -> Extracted {
    let source = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let Some((header, body)) = split_header(source) else {
        return Extracted {
            front_matter: FrontMatter::defaults(now),
            body: source.to_string(),
        };
    };

    let front_matter = match decode_header(header) {
        Some(raw_header) => resolve(raw_header, now),
        None => FrontMatter::defaults(now),
    };

    Extracted {
        front_matter,
        body: body.to_string(),
    }
}

/// Locate the header block. Returns `(header, body)` or `None` when the file does
/// not open with a delimiter line or the block is never closed.
fn split_header(source: &str) -> Option<(&str, &str)> {
    let mut lines = source.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let header = &source[header_start..offset];
            let body = &source[offset + line.len()..];
            return Some((header, body));
        }
        offset += line.len();
    }

    None
}

fn decode_header(header: &str) -> Option<RawFrontMatter> {
    if header.trim().is_empty() {
        return Some(RawFrontMatter::default());
    }

    let value: Value = match serde_yaml::from_str(header) {
        Ok(value) => value,
        Err(err) => {
            debug!(
                target = "application::frontmatter",
                error = %err,
                "Front matter is not valid YAML; decoding keys one by one"
            );
            Value::Mapping(decode_keys(header))
        }
    };

    match value {
        Value::Mapping(_) => serde_yaml::from_value(value)
            .map_err(|err| {
                debug!(
                    target = "application::frontmatter",
                    error = %err,
                    "Front matter mapping could not be decoded; using defaults"
                );
            })
            .ok(),
        Value::Null => Some(RawFrontMatter::default()),
        _ => {
            debug!(
                target = "application::frontmatter",
                "Front matter is not a mapping; using defaults"
            );
            None
        }
    }
}

/// Decode each top-level `key:` entry on its own so a syntax error only costs
/// the entry it appears in.
fn decode_keys(header: &str) -> Mapping {
    let mut mapping = Mapping::new();
    for entry in top_level_entries(header) {
        match serde_yaml::from_str::<Value>(entry) {
            Ok(Value::Mapping(decoded)) => {
                for (key, value) in decoded {
                    mapping.insert(key, value);
                }
            }
            Ok(_) => {}
            Err(err) => {
                let key = entry.split(':').next().unwrap_or_default().trim();
                debug!(
                    target = "application::frontmatter",
                    key,
                    error = %err,
                    "Front matter key is not valid YAML; using its default"
                );
            }
        }
    }
    mapping
}

/// Split a header into chunks that each start with an unindented `key:` line.
/// Indented lines, list items and comments stay with the preceding key.
fn top_level_entries(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = None;
    let mut offset = 0;

    for line in header.split_inclusive('\n') {
        let opens_key = !line.starts_with([' ', '\t', '-', '#']) && line.contains(':');
        if opens_key {
            if let Some(begin) = start {
                entries.push(&header[begin..offset]);
            }
            start = Some(offset);
        }
        offset += line.len();
    }
    if let Some(begin) = start {
        entries.push(&header[begin..]);
    }

    entries
}

fn resolve(raw: RawFrontMatter, now: OffsetDateTime) -> FrontMatter {
    let defaults = FrontMatter::defaults(now);

    FrontMatter {
        title: raw.title.and_then(text_value).unwrap_or(defaults.title),
        description: raw
            .description
            .and_then(text_value)
            .unwrap_or(defaults.description),
        date: raw
            .date
            .and_then(text_value)
            .and_then(|value| parse_date(&value))
            .unwrap_or(defaults.date),
        tags: raw.tags.map(tag_values).unwrap_or(defaults.tags),
        featured: match raw.featured {
            Some(Value::Bool(flag)) => flag,
            _ => defaults.featured,
        },
        cover: raw.cover.and_then(text_value),
        repo: raw.repo.and_then(text_value),
        link: raw.link.and_then(text_value),
    }
}

/// Scalar text: strings and numbers, trimmed. Empty strings count as absent.
fn text_value(value: Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Tags from a YAML list or a comma-separated string, deduplicated by case with
/// the first spelling kept.
fn tag_values(value: Value) -> Vec<String> {
    let candidates: Vec<String> = match value {
        Value::Sequence(items) => items.into_iter().filter_map(text_value).collect(),
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .collect()
}

fn parse_date(value: &str) -> Option<OffsetDateTime> {
    let trimmed = value.trim();

    if let Ok(datetime) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(datetime);
    }

    let naive_formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];
    for format in naive_formats {
        if let Ok(datetime) = PrimitiveDateTime::parse(trimmed, format) {
            return Some(datetime.assume_utc());
        }
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}
