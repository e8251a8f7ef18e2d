use crate::markdown::{line_at, parser_options};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

/// Info strings of the code blocks that hold shell commands.
///
/// Untagged code blocks are treated as shell commands as well.
pub const SHELL_LANGUAGES: [&str; 5] = ["sh", "bash", "shell", "zsh", "console"];

/// A fenced shell code block of a markdown page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// The closest heading above the block.
    pub heading: Option<String>,
    /// The first word of the info string.
    pub language: Option<String>,
    /// 1-based line of the first line of code in the page.
    pub line: usize,
    pub code: String,
}

impl Snippet {
    /// Whether the block is a terminal session with `$ ` prompts and command output.
    pub fn is_console(&self) -> bool {
        self.language.as_deref() == Some("console")
    }

    /// The shell text of the block.
    ///
    /// For console sessions, only the prompted commands (and their continuation lines) are kept.
    /// Output lines become empty lines so that line numbers are unchanged.
    pub fn commands(&self) -> String {
        if !self.is_console() {
            return self.code.clone();
        }
        let mut continued = false;
        let mut commands = Vec::new();
        for line in self.code.lines() {
            let command = if let Some(command) = line.strip_prefix("$ ") {
                Some(command)
            } else if continued {
                Some(line)
            } else {
                None
            };
            continued = command.is_some_and(|command| command.ends_with('\\'));
            commands.push(command.unwrap_or_default());
        }
        commands.join("\n")
    }
}

/// Returns the shell code blocks of a markdown page, in document order.
pub fn extract_snippets(markdown: &str) -> Vec<Snippet> {
    let mut snippets = Vec::new();
    let mut heading: Option<String> = None;
    let mut heading_text: Option<String> = None;
    let mut current: Option<Snippet> = None;
    for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { .. }) => heading_text = Some(String::new()),
            Event::End(TagEnd::Heading(_)) => {
                heading = heading_text.take().map(|text| text.trim().to_owned());
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let language = info
                    .split_whitespace()
                    .next()
                    .map(str::to_ascii_lowercase);
                let is_shell = match &language {
                    Some(language) => SHELL_LANGUAGES.contains(&language.as_str()),
                    None => true,
                };
                if is_shell {
                    current = Some(Snippet {
                        heading: heading.clone(),
                        language,
                        line: line_at(markdown, range.start) + 1,
                        code: String::new(),
                    });
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(snippet) = &mut current {
                    snippet.code.push_str(&text);
                } else if let Some(heading) = &mut heading_text {
                    heading.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => snippets.extend(current.take()),
            _ => (),
        }
    }
    snippets
}
