//! BibTeX formatting for arXiv Atom entries that carry no DOI.

use chrono::{DateTime, Datelike};

use super::xml::{XmlDocument, XmlElement, XmlError};

const ARXIV_ABS_URL: &str = "https://arxiv.org/abs";

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Format the first entry of an arXiv Atom feed as a `@misc` record.
///
/// Fails with [`XmlError::TagNotFound`] when the feed has no entry, or when the
/// entry is arXiv's error report for an unknown id.
pub fn format_arxiv_entry(arxiv_id: &str, feed: &XmlDocument) -> Result<String, XmlError> {
    let entry = feed.find_path(&["feed", "entry"])?;

    let entry_id = entry.child("id").map(|e| e.text()).unwrap_or("");
    if entry_id.contains("/api/errors") {
        return Err(XmlError::TagNotFound(format!(
            "feed/entry for {} ({})",
            arxiv_id,
            child_text(entry, "summary").unwrap_or_default()
        )));
    }

    let title = child_text(entry, "title");
    let authors: Vec<String> = entry
        .children_named("author")
        .filter_map(|a| child_text(a, "name"))
        .collect();
    let published = entry
        .child("published")
        .and_then(|p| DateTime::parse_from_rfc3339(p.text().trim()).ok());
    let primary_class = entry
        .child("primary_category")
        .and_then(|c| c.attr("term"))
        .map(str::to_string);
    let summary = child_text(entry, "summary");

    let key = cite_key(
        authors.first().map(String::as_str),
        published.map(|d| d.year()),
        title.as_deref(),
    );

    let mut fields: Vec<String> = Vec::new();
    if let Some(title) = &title {
        fields.push(format!("  title = {{{}}}", title));
    }
    if !authors.is_empty() {
        fields.push(format!("  author = {{{}}}", authors.join(" and ")));
    }
    if let Some(date) = published {
        fields.push(format!("  year = {{{}}}", date.year()));
        fields.push(format!("  month = {}", MONTHS[date.month0() as usize]));
    }
    fields.push(format!("  eprint = {{{}}}", arxiv_id));
    fields.push("  archivePrefix = {arXiv}".to_string());
    if let Some(class) = primary_class {
        fields.push(format!("  primaryClass = {{{}}}", class));
    }
    fields.push(format!("  url = {{{}/{}}}", ARXIV_ABS_URL, arxiv_id));
    if let Some(summary) = summary {
        fields.push(format!("  abstract = {{{}}}", summary));
    }

    Ok(format!("@misc{{{},\n{}\n}}\n", key, fields.join(",\n")))
}

/// Text of a named child with internal whitespace collapsed
fn child_text(element: &XmlElement, name: &str) -> Option<String> {
    element
        .child(name)
        .map(|c| collapse_whitespace(c.text()))
        .filter(|t| !t.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Citation key: first author surname, year, first title word
fn cite_key(first_author: Option<&str>, year: Option<i32>, title: Option<&str>) -> String {
    let surname = first_author
        .and_then(|a| a.split_whitespace().last())
        .map(key_part)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "arxiv".to_string());
    let year = year.map(|y| y.to_string()).unwrap_or_default();
    let word = title
        .and_then(|t| t.split_whitespace().map(key_part).find(|w| !w.is_empty()))
        .unwrap_or_default();

    format!("{}{}{}", surname, year, word)
}

fn key_part(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
