use crate::error::DocsError;
use crate::index::{extract_links, IndexLink};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// The outcome of a link check.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkReport {
    /// Number of links resolved against the site.
    pub checked: usize,
    /// Number of external and fragment-only links.
    pub skipped: usize,
    pub broken: Vec<BrokenLink>,
}

impl LinkReport {
    pub fn is_ok(&self) -> bool {
        self.broken.is_empty()
    }
}

/// A link whose target is not part of the published site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    pub link: IndexLink,
    pub reason: BrokenReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokenReason {
    /// Nothing exists at the path, relative to the site root.
    Missing(PathBuf),
    /// The link ends with `/` but the path is a file.
    NotADirectory(PathBuf),
    /// The link leaves the site root with `..`.
    OutsideSite,
}

impl fmt::Display for BrokenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "{} does not exist", path.display()),
            Self::NotADirectory(path) => write!(f, "{} is not a directory", path.display()),
            Self::OutsideSite => f.write_str("target is outside the site root"),
        }
    }
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "broken link [{}]({}): {}",
            self.link.label, self.link.target, self.reason
        )
    }
}

/// Checks that every link of the markdown page `page` resolves inside `site_root`.
///
/// Relative links are resolved from the directory of the page, links starting with `/` from the
/// site root.
pub fn check_links(page: &Path, site_root: &Path) -> Result<LinkReport, DocsError> {
    let markdown = fs::read_to_string(page).map_err(|source| DocsError::Read {
        path: page.to_owned(),
        source,
    })?;
    let site_root = fs::canonicalize(site_root).map_err(|source| DocsError::Read {
        path: site_root.to_owned(),
        source,
    })?;
    let page_path = fs::canonicalize(page)?;
    let page_dir = page_path
        .parent()
        .and_then(|dir| dir.strip_prefix(&site_root).ok())
        .ok_or_else(|| DocsError::OutsideSite {
            page: page.to_owned(),
            site_root: site_root.clone(),
        })?;
    let base = page_dir
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>();
    Ok(check_markdown_links(&markdown, &site_root, &base))
}

/// Checks the links of `markdown` for a page located in the `base` directory of the site.
pub fn check_markdown_links(markdown: &str, site_root: &Path, base: &[String]) -> LinkReport {
    let mut report = LinkReport::default();
    for link in extract_links(markdown) {
        let Some(path) = local_path(&link.target) else {
            tracing::debug!(link = %link.target, "Skipping link");
            report.skipped += 1;
            continue;
        };
        report.checked += 1;
        if let Err(reason) = resolve(site_root, base, path) {
            tracing::debug!(link = %link.target, %reason, "Broken link");
            report.broken.push(BrokenLink { link, reason });
        }
    }
    report
}

/// Returns the path part of a link, or `None` for links that do not point into the site.
fn local_path(target: &str) -> Option<&str> {
    if target.starts_with("//") || has_scheme(target) {
        return None;
    }
    let path = target.split(['#', '?']).next().unwrap_or_default();
    (!path.is_empty()).then_some(path)
}

/// Whether the link starts with a URI scheme like `https:` or `mailto:`.
fn has_scheme(target: &str) -> bool {
    let Some((scheme, _)) = target.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn resolve(site_root: &Path, base: &[String], path: &str) -> Result<(), BrokenReason> {
    let mut components: Vec<&str> = if path.starts_with('/') {
        Vec::new()
    } else {
        base.iter().map(String::as_str).collect()
    };
    for segment in path.split('/') {
        match segment {
            "" | "." => (),
            ".." => {
                components.pop().ok_or(BrokenReason::OutsideSite)?;
            }
            segment => components.push(segment),
        }
    }
    let relative = components.iter().collect::<PathBuf>();
    let full = site_root.join(&relative);
    if path.ends_with('/') {
        if full.is_dir() {
            Ok(())
        } else if full.exists() {
            Err(BrokenReason::NotADirectory(relative))
        } else {
            Err(BrokenReason::Missing(relative))
        }
    } else if full.exists() || rendered_page_exists(&full) {
        Ok(())
    } else {
        Err(BrokenReason::Missing(relative))
    }
}

/// A link to a markdown page is also satisfied by its rendered HTML page.
fn rendered_page_exists(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension == "md")
        && path.with_extension("html").is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_and_fragment_links_are_skipped() {
        assert_eq!(local_path("https://example.org/x"), None);
        assert_eq!(local_path("mailto:someone@example.org"), None);
        assert_eq!(local_path("//cdn.example.org/x.js"), None);
        assert_eq!(local_path("#usage"), None);
        assert_eq!(local_path("./a.md#usage"), Some("./a.md"));
        assert_eq!(local_path("./examples/METRINKG/?x=1"), Some("./examples/METRINKG/"));
        assert_eq!(local_path("docs/a:b.md"), Some("docs/a:b.md"));
    }

    #[test]
    fn parent_links_cannot_leave_the_site() {
        let root = Path::new("/nonexistent-site-root");
        assert_eq!(
            resolve(root, &[], "../outside.md"),
            Err(BrokenReason::OutsideSite)
        );
        assert_eq!(
            resolve(root, &["docs".to_owned()], "../examples/x.md"),
            Err(BrokenReason::Missing(PathBuf::from("examples/x.md")))
        );
        assert_eq!(
            resolve(root, &["docs".to_owned()], "/examples/"),
            Err(BrokenReason::Missing(PathBuf::from("examples")))
        );
    }

    #[test]
    fn report_message_names_the_target() {
        let broken = BrokenLink {
            link: IndexLink {
                label: "METRINKG".to_owned(),
                target: "./examples/METRINKG/".to_owned(),
                line: 3,
            },
            reason: BrokenReason::Missing(PathBuf::from("examples/METRINKG")),
        };
        assert_eq!(
            broken.to_string(),
            "broken link [METRINKG](./examples/METRINKG/): examples/METRINKG does not exist"
        );
    }
}
