//! In-memory tag catalogue and the HTML fragments the find-tags route returns.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result};
use shared::domain::normalize_tag_name;

const SAMPLE_TAGS: &[&str] = &[
    "Beach",
    "Birthday",
    "Bushwalk",
    "Camping",
    "Christmas",
    "Family",
    "Hiking",
    "Holiday",
    "Lake",
    "Mountains",
    "Museum",
    "Picnic",
    "Snow",
    "Sunset",
    "Wedding",
];

#[derive(Debug, Clone)]
struct TagEntry {
    name: String,
    normalized: String,
}

#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    // Sorted by normalized name.
    entries: Vec<TagEntry>,
}

impl TagCatalog {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries: Vec<TagEntry> = names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref().trim();
                let normalized = normalize_tag_name(name);
                if normalized.is_empty() || !seen.insert(normalized.clone()) {
                    return None;
                }
                Some(TagEntry {
                    name: name.to_string(),
                    normalized,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.normalized.cmp(&b.normalized));
        Self { entries }
    }

    pub fn sample() -> Self {
        Self::from_names(SAMPLE_TAGS.iter().copied())
    }

    /// One tag per line; blank lines and `#` comments are skipped.
    pub fn parse(raw: &str) -> Self {
        Self::from_names(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read tag catalogue '{}'", path.display()))?;
        Ok(Self::parse(&raw))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prefix matches first, then other substring matches, each alphabetical.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&str> {
        let needle = normalize_tag_name(query);
        if needle.is_empty() {
            return Vec::new();
        }

        let (prefix, infix): (Vec<&TagEntry>, Vec<&TagEntry>) = self
            .entries
            .iter()
            .filter(|entry| entry.normalized.contains(&needle))
            .partition(|entry| entry.normalized.starts_with(&needle));

        prefix
            .into_iter()
            .chain(infix)
            .take(limit)
            .map(|entry| entry.name.as_str())
            .collect()
    }
}

pub fn render_search_results(query: &str, matches: &[&str]) -> String {
    if normalize_tag_name(query).is_empty() {
        return String::new();
    }

    if matches.is_empty() {
        return "<p class=\"tag-search-empty\">No matching tags</p>".to_string();
    }

    let mut html = String::from("<ul class=\"tag-search-results\">");
    for name in matches {
        let escaped = escape_html(name);
        html.push_str(&format!(
            "<li><a href=\"#\" data-tag=\"{escaped}\">{escaped}</a></li>"
        ));
    }
    html.push_str("</ul>");
    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
