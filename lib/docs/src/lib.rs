//! Tooling for the operator notes and the example index page of a published SPARQL example
//! site.
//!
//! The notes are markdown pages with shell recipes for external tools. This crate lists and
//! renders those recipes and checks that they are well-formed. It also generates the index page
//! of the generated example directories and checks that every link of a page resolves inside
//! the site.

mod error;
mod index;
mod links;
mod markdown;
mod recipes;
mod shell;
mod snippets;

pub use error::DocsError;
pub use index::{extract_links, render_index, IndexLink, IndexOptions};
pub use links::{check_links, check_markdown_links, BrokenLink, BrokenReason, LinkReport};
pub use markdown::{lint_markdown, MarkdownIssue, MarkdownIssueKind};
pub use recipes::{placeholders, render, Rendered};
pub use shell::{check_shell, SnippetIssue, SnippetIssueKind};
pub use snippets::{extract_snippets, Snippet, SHELL_LANGUAGES};
