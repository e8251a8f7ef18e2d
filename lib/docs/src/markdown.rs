use pulldown_cmark::{BrokenLink, CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd};
use std::fmt;
use std::ops::Range;

/// A malformed construct of a markdown page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownIssue {
    /// 1-based line of the construct.
    pub line: usize,
    pub kind: MarkdownIssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownIssueKind {
    /// A fenced code block runs until the end of the page.
    UnclosedFence { fence: String },
    /// An inline link without destination, like `[label]()`.
    EmptyLinkTarget { label: String },
    /// A reference link whose definition is missing.
    UndefinedReference { reference: String },
}

impl fmt::Display for MarkdownIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MarkdownIssueKind::UnclosedFence { fence } => {
                write!(f, "code block opened with {fence} is never closed")
            }
            MarkdownIssueKind::EmptyLinkTarget { label } => {
                write!(f, "link [{label}] has an empty target")
            }
            MarkdownIssueKind::UndefinedReference { reference } => {
                write!(f, "link reference [{reference}] is not defined")
            }
        }
    }
}

pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES | Options::ENABLE_STRIKETHROUGH
}

/// Returns the 1-based line of a byte offset.
pub(crate) fn line_at(source: &str, offset: usize) -> usize {
    source.as_bytes()[..offset.min(source.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

/// Checks a markdown page for malformed constructs.
///
/// Reports fenced code blocks that are never closed, inline links with an empty destination and
/// reference links without definition.
pub fn lint_markdown(source: &str) -> Vec<MarkdownIssue> {
    let mut undefined = Vec::new();
    let mut issues = Vec::new();
    {
        let callback = |link: BrokenLink<'_>| {
            // Undefined shortcut links like `[x]` are plain text.
            if matches!(link.link_type, LinkType::Reference | LinkType::ReferenceUnknown) {
                undefined.push((link.span.start, link.reference.to_string()));
            }
            None
        };
        let parser =
            Parser::new_with_broken_link_callback(source, parser_options(), Some(callback));
        let mut link: Option<(usize, String)> = None;
        for (event, range) in parser.into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                    if let Some(fence) = unclosed_fence(source, range.clone()) {
                        issues.push(MarkdownIssue {
                            line: line_at(source, range.start),
                            kind: MarkdownIssueKind::UnclosedFence { fence },
                        });
                    }
                }
                Event::Start(Tag::Link {
                    link_type: LinkType::Inline,
                    dest_url,
                    ..
                }) if dest_url.trim().is_empty() => {
                    link = Some((range.start, String::new()));
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, label)) = &mut link {
                        label.push_str(&text);
                    }
                }
                Event::End(TagEnd::Link) => {
                    if let Some((start, label)) = link.take() {
                        issues.push(MarkdownIssue {
                            line: line_at(source, start),
                            kind: MarkdownIssueKind::EmptyLinkTarget { label },
                        });
                    }
                }
                _ => (),
            }
        }
    }
    issues.extend(
        undefined
            .into_iter()
            .map(|(start, reference)| MarkdownIssue {
                line: line_at(source, start),
                kind: MarkdownIssueKind::UndefinedReference { reference },
            }),
    );
    issues.sort_by_key(|issue| issue.line);
    issues
}

/// Returns the opening fence of a fenced code block that has no closing fence.
///
/// The closing fence may be indented by at most 3 columns more than the opening one, deeper
/// fences are code.
fn unclosed_fence(source: &str, range: Range<usize>) -> Option<String> {
    let line_start = source[..range.start].rfind('\n').map_or(0, |index| index + 1);
    let mut lines = source[line_start..range.end]
        .lines()
        .map(strip_quote_markers);
    let opening = lines.next()?;
    let fence_start = opening.find(|c: char| c == '`' || c == '~')?;
    let fence = &opening[fence_start..];
    let fence_char = fence.chars().next()?;
    let fence_len = fence.chars().take_while(|c| *c == fence_char).count();
    let closed = lines.last().is_some_and(|last| {
        let content = last.trim_start_matches(|c: char| c == ' ' || c == '\t');
        let indent = indentation(&last[..last.len() - content.len()]);
        let count = content.chars().take_while(|c| *c == fence_char).count();
        indent < indentation(&opening[..fence_start]) + 4
            && count >= fence_len
            && content[count..].trim().is_empty()
    });
    if closed {
        None
    } else {
        Some(fence[..fence_len].to_owned())
    }
}

/// Removes the block quote markers in front of a line.
fn strip_quote_markers(mut line: &str) -> &str {
    loop {
        let trimmed = line.trim_start_matches(' ');
        match trimmed.strip_prefix('>') {
            Some(rest) if line.len() - trimmed.len() <= 3 => {
                line = rest.strip_prefix(' ').unwrap_or(rest);
            }
            _ => return line,
        }
    }
}

/// Width of a line prefix in columns, with tab stops every 4 columns.
fn indentation(prefix: &str) -> usize {
    prefix.chars().fold(0, |width, c| match c {
        '\t' => width + 4 - width % 4,
        _ => width + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_page_has_no_issue() {
        let page = "# Notes\n\n```bash\necho ok\n```\n\n~~~~\ncode\n~~~~~\n\n[link](./a.md) and [ref][r]\n\n[r]: ./b.md\n";
        assert!(lint_markdown(page).is_empty());
    }

    #[test]
    fn unclosed_fence_is_reported() {
        let page = "# Notes\n\n```bash\necho ok\n``\n";
        assert_eq!(
            lint_markdown(page),
            [MarkdownIssue {
                line: 3,
                kind: MarkdownIssueKind::UnclosedFence {
                    fence: "```".to_owned()
                },
            }]
        );
    }

    #[test]
    fn fence_in_block_quote_is_closed() {
        let page = "> ```sh\n> ls\n> ```\n";
        assert!(lint_markdown(page).is_empty());
    }

    #[test]
    fn deeply_indented_fence_does_not_close() {
        let issues = lint_markdown("```sh\nls\n      ```\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 1);
        assert!(lint_markdown("```sh\nls\n   ```\n").is_empty());
    }

    #[test]
    fn fence_in_list_item_is_closed() {
        let page = "- install\n\n  ```sh\n  cargo install spex\n  ```\n- done\n";
        assert!(lint_markdown(page).is_empty());
    }

    #[test]
    fn empty_link_target_is_reported() {
        let page = "intro\n\n- [METRINKG]()\n";
        let issues = lint_markdown(page);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 3);
        assert_eq!(issues[0].to_string(), "link [METRINKG] has an empty target");
    }

    #[test]
    fn undefined_reference_is_reported() {
        let page = "text\nsee [stats][missing]\n";
        let issues = lint_markdown(page);
        assert_eq!(
            issues,
            [MarkdownIssue {
                line: 2,
                kind: MarkdownIssueKind::UndefinedReference {
                    reference: "missing".to_owned()
                },
            }]
        );
    }

    #[test]
    fn line_numbers_are_one_based() {
        assert_eq!(line_at("a\nb\nc", 0), 1);
        assert_eq!(line_at("a\nb\nc", 2), 2);
        assert_eq!(line_at("a\nb\nc", 100), 3);
    }
}
