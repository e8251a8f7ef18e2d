use crate::error::DocsError;
use crate::markdown::{line_at, parser_options};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// A link of a markdown page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLink {
    /// The link text.
    pub label: String,
    /// The destination, as written in the page.
    pub target: String,
    /// 1-based line of the link.
    pub line: usize,
}

/// Options for [`render_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// The heading of the page.
    pub title: String,
    /// Directory of the generated example pages, relative to the site root.
    pub examples_dir: String,
    /// File name of the statistics page inside [`Self::examples_dir`].
    pub statistics_page: String,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            title: "SPARQL examples".to_owned(),
            examples_dir: "examples".to_owned(),
            statistics_page: "algebra-statistics.md".to_owned(),
        }
    }
}

/// Returns all the links of a markdown page in document order.
pub fn extract_links(markdown: &str) -> Vec<IndexLink> {
    let mut links = Vec::new();
    let mut current: Option<IndexLink> = None;
    for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                current = Some(IndexLink {
                    label: String::new(),
                    target: dest_url.into_string(),
                    line: line_at(markdown, range.start),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(link) = &mut current {
                    link.label.push_str(&text);
                }
            }
            Event::End(TagEnd::Link) => links.extend(current.take()),
            _ => (),
        }
    }
    links
}

/// Generates the example index page of a published site.
///
/// Lists one link per directory of `<site_root>/<examples_dir>` in name order, followed by the
/// statistics page when it exists.
pub fn render_index(site_root: &Path, options: &IndexOptions) -> Result<String, DocsError> {
    let examples = site_root.join(&options.examples_dir);
    let mut names = Vec::new();
    for entry in fs::read_dir(&examples).map_err(|source| DocsError::Read {
        path: examples.clone(),
        source,
    })? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') && entry.path().is_dir() {
            names.push(name);
        }
    }
    names.sort();
    tracing::debug!(examples = names.len(), "Rendering index of {}", examples.display());

    let mut page = format!("# {}\n\n", options.title);
    for name in &names {
        push_link(
            &mut page,
            name,
            &format!("./{}/{name}/", options.examples_dir),
        );
    }
    if examples.join(&options.statistics_page).is_file() {
        push_link(
            &mut page,
            "Statistics",
            &format!("./{}/{}", options.examples_dir, options.statistics_page),
        );
    }
    Ok(page)
}

fn push_link(page: &mut String, label: &str, target: &str) {
    // Destinations with spaces or parentheses need the pointy bracket form.
    if target.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        let _ = writeln!(page, "- [{}](<{target}>)", escape_label(label));
    } else {
        let _ = writeln!(page, "- [{}]({target})", escape_label(label));
    }
}

fn escape_label(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for c in label.chars() {
        if matches!(c, '[' | ']' | '\\' | '*' | '_' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
