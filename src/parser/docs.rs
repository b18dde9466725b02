//! Structured doc-comment parsing.
//!
//! GML doc comments use triple-slash lines with JSDoc-style tags:
//!
//! ```text
//! /// @desc Moves the instance.
//! /// @param {real} _speed Pixels per step.
//! ```
//!
//! This module is off the injection path; authoring tooling uses it to pull
//! tag metadata out of the token stream.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_SLASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*///").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{@link ([^}]+)\}").unwrap());
static TAG_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*@([a-z]+)").unwrap());
static TAG_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\{([^}]*)\}").unwrap());
static PARAM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*\[?([a-z_][a-z0-9_]*)\]?").unwrap());
static TAG_ANYWHERE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[a-z]+").unwrap());
static PROSE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One parsed `@tag` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub tag: String,
    /// Text of a `{type}` annotation, if present.
    pub value_type: Option<String>,
    /// Parameter name; only `@param` tags carry one.
    pub name: Option<String>,
    pub description: String,
}

/// Tags of one doc comment, keyed by tag name in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Documentation {
    tags: IndexMap<String, Vec<Tag>>,
}

impl Documentation {
    /// Parse the raw text of a run of `///` lines.
    ///
    /// A description runs to the next `@tag` occurrence that does not sit
    /// behind a `/// ` prefix. The regex crate has no lookbehind, so the
    /// boundary is found by scanning candidates and checking the preceding
    /// bytes by hand.
    pub fn parse(raw: &str) -> Documentation {
        let stripped: Vec<_> = raw
            .lines()
            .map(|line| LEADING_SLASHES.replace(line, ""))
            .collect();
        let text = LINK
            .replace_all(&stripped.join("\n"), "[$1]($1.html)")
            .into_owned();

        let mut docs = Documentation::default();
        let mut pos = 0;

        while let Some(caps) = TAG_START.captures(&text[pos..]) {
            let tag = caps[1].to_string();
            pos += caps.get(0).map_or(0, |m| m.end());

            let value_type = TAG_TYPE.captures(&text[pos..]).map(|caps| {
                pos += caps.get(0).map_or(0, |m| m.end());
                caps[1].to_string()
            });

            let name = if tag == "param" {
                PARAM_NAME.captures(&text[pos..]).map(|caps| {
                    pos += caps.get(0).map_or(0, |m| m.end());
                    caps[1].to_string()
                })
            } else {
                None
            };

            let end = pos + description_end(&text[pos..]);
            let description = normalize_description(text[pos..end].trim());
            pos = end;

            docs.add(Tag {
                tag,
                value_type,
                name,
                description,
            });
        }

        docs
    }

    fn add(&mut self, tag: Tag) {
        self.tags.entry(tag.tag.clone()).or_default().push(tag);
    }

    /// First tag with the given name.
    pub fn get(&self, tag: &str) -> Option<&Tag> {
        self.tags.get(tag).and_then(|tags| tags.first())
    }

    /// All tags with the given name, in source order.
    pub fn get_all(&self, tag: &str) -> &[Tag] {
        self.tags.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Iterate tag names in first-seen order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Byte offset where the current description ends: the first `@tag`
/// candidate not preceded by `/// `, or the end of the text.
fn description_end(text: &str) -> usize {
    for m in TAG_ANYWHERE.find_iter(text) {
        let before = &text[..m.start()];
        if !before.ends_with("/// ") {
            return m.start();
        }
    }
    text.len()
}

/// Collapse prose runs to single spaces while keeping fenced code spans
/// intact, minus one space of indent per line.
fn normalize_description(desc: &str) -> String {
    let segments: Vec<String> = desc
        .split("```")
        .enumerate()
        .map(|(i, segment)| {
            if i % 2 == 1 {
                segment.replace("\n ", "\n")
            } else {
                format!(
                    "\n{}\n",
                    PROSE_WHITESPACE.replace_all(segment, " ").trim()
                )
            }
        })
        .collect();
    segments.join("```").trim().to_string()
}
