//! Syntactic checks of shell snippets.
//!
//! This is a lexer, not a shell parser: it tracks quotes, command substitutions, here-documents
//! and line continuations well enough to find snippets that a shell would reject or keep
//! reading from. What the commands mean is up to the tools they invoke.

use std::fmt;

/// A syntax problem found in a shell snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetIssue {
    /// 1-based line in the snippet.
    pub line: usize,
    pub kind: SnippetIssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetIssueKind {
    UnterminatedSingleQuote,
    UnterminatedDoubleQuote,
    UnterminatedBacktick,
    /// A `(` or `$(` without matching `)`.
    UnclosedParenthesis,
    /// A `${` without matching `}`.
    UnclosedBrace,
    UnexpectedClosingParenthesis,
    /// A line ends with a pipe or a list operator and no command follows.
    DanglingOperator(&'static str),
    /// The last line ends with `\`.
    TrailingContinuation,
    /// A here-document whose delimiter line never comes.
    UnterminatedHeredoc(String),
}

impl fmt::Display for SnippetIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedSingleQuote => f.write_str("unterminated single quote"),
            Self::UnterminatedDoubleQuote => f.write_str("unterminated double quote"),
            Self::UnterminatedBacktick => f.write_str("unterminated backtick"),
            Self::UnclosedParenthesis => f.write_str("unclosed parenthesis"),
            Self::UnclosedBrace => f.write_str("unclosed ${ brace"),
            Self::UnexpectedClosingParenthesis => f.write_str("unexpected closing parenthesis"),
            Self::DanglingOperator(operator) => {
                write!(f, "'{operator}' is not followed by a command")
            }
            Self::TrailingContinuation => f.write_str("line continuation at the end of the snippet"),
            Self::UnterminatedHeredoc(delimiter) => {
                write!(f, "here-document is not terminated by {delimiter}")
            }
        }
    }
}

impl fmt::Display for SnippetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Single,
    Double,
    Backtick,
    /// `$(`
    Substitution,
    /// `(`
    Group,
    /// `${`
    Parameter,
    /// `$((`
    Arithmetic,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    context: Context,
    line: usize,
}

/// Something that still waits for more input at the end of a line.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Operator(&'static str, usize),
    Continuation(usize),
}

struct Heredoc {
    delimiter: String,
    strip_tabs: bool,
    line: usize,
}

struct Lexer<'a> {
    bytes: &'a [u8],
    position: usize,
    line: usize,
    stack: Vec<Frame>,
    pending: Option<Pending>,
    /// Operator that ends the current line so far.
    trailing_operator: Option<&'static str>,
    heredocs: Vec<Heredoc>,
    word_start: bool,
    issues: Vec<SnippetIssue>,
}

/// Checks a shell snippet for unbalanced quotes and groups and for incomplete commands.
pub fn check_shell(code: &str) -> Vec<SnippetIssue> {
    let mut lexer = Lexer {
        bytes: code.as_bytes(),
        position: 0,
        line: 1,
        stack: Vec::new(),
        pending: None,
        trailing_operator: None,
        heredocs: Vec::new(),
        word_start: true,
        issues: Vec::new(),
    };
    lexer.run();
    lexer.finish()
}

impl Lexer<'_> {
    fn run(&mut self) {
        while let Some(byte) = self.peek(0) {
            match self.stack.last().map(|frame| frame.context) {
                Some(Context::Single) => self.quoted_single(byte),
                Some(Context::Double) => self.quoted_double(byte),
                Some(Context::Backtick) => self.backtick(byte),
                Some(Context::Parameter) => self.parameter(byte),
                Some(Context::Arithmetic) => self.arithmetic(byte),
                None | Some(Context::Substitution | Context::Group) => self.command(byte),
            }
        }
    }

    fn finish(mut self) -> Vec<SnippetIssue> {
        if let Some(operator) = self.trailing_operator.take() {
            self.pending = Some(Pending::Operator(operator, self.line));
        }
        match self.pending {
            Some(Pending::Operator(operator, line)) => {
                self.issue(line, SnippetIssueKind::DanglingOperator(operator));
            }
            Some(Pending::Continuation(line)) => {
                self.issue(line, SnippetIssueKind::TrailingContinuation);
            }
            None => (),
        }
        for heredoc in std::mem::take(&mut self.heredocs) {
            self.issue(
                heredoc.line,
                SnippetIssueKind::UnterminatedHeredoc(heredoc.delimiter),
            );
        }
        for frame in std::mem::take(&mut self.stack) {
            let kind = match frame.context {
                Context::Single => SnippetIssueKind::UnterminatedSingleQuote,
                Context::Double => SnippetIssueKind::UnterminatedDoubleQuote,
                Context::Backtick => SnippetIssueKind::UnterminatedBacktick,
                Context::Substitution | Context::Group | Context::Arithmetic => {
                    SnippetIssueKind::UnclosedParenthesis
                }
                Context::Parameter => SnippetIssueKind::UnclosedBrace,
            };
            self.issue(frame.line, kind);
        }
        self.issues.sort_by_key(|issue| issue.line);
        self.issues
    }

    fn quoted_single(&mut self, byte: u8) {
        if byte == b'\'' {
            self.stack.pop();
        }
        self.advance(1);
    }

    fn quoted_double(&mut self, byte: u8) {
        match byte {
            b'\\' => self.advance(2),
            b'"' => {
                self.stack.pop();
                self.advance(1);
            }
            b'`' => self.open(Context::Backtick, 1),
            b'$' => self.dollar(),
            _ => self.advance(1),
        }
    }

    fn backtick(&mut self, byte: u8) {
        match byte {
            b'\\' => self.advance(2),
            b'`' => {
                self.stack.pop();
                self.advance(1);
            }
            b'\'' => self.open(Context::Single, 1),
            b'"' => self.open(Context::Double, 1),
            b'$' => self.dollar(),
            _ => self.advance(1),
        }
    }

    fn parameter(&mut self, byte: u8) {
        match byte {
            b'\\' => self.advance(2),
            b'}' => {
                self.stack.pop();
                self.advance(1);
            }
            b'\'' => self.open(Context::Single, 1),
            b'"' => self.open(Context::Double, 1),
            b'$' => self.dollar(),
            _ => self.advance(1),
        }
    }

    /// `<<` is a shift in arithmetic expansions, parentheses only group.
    fn arithmetic(&mut self, byte: u8) {
        match byte {
            b'\\' => self.advance(2),
            b')' if self.peek(1) == Some(b')') => {
                self.stack.pop();
                self.advance(2);
            }
            b'(' => self.open(Context::Group, 1),
            b'$' => self.dollar(),
            _ => self.advance(1),
        }
    }

    fn in_arithmetic(&self) -> bool {
        self.stack
            .iter()
            .any(|frame| frame.context == Context::Arithmetic)
    }

    fn command(&mut self, byte: u8) {
        match byte {
            b'\n' => {
                self.end_of_line();
                return;
            }
            b' ' | b'\t' | b'\r' => {
                self.word_start = true;
                self.advance(1);
                return;
            }
            b'#' if self.word_start => {
                while self.peek(0).is_some_and(|byte| byte != b'\n') {
                    self.position += 1;
                }
                return;
            }
            b'\\' if self.peek(1) == Some(b'\n') => {
                self.pending = Some(Pending::Continuation(self.line));
                self.word_start = true;
                self.advance(2);
                return;
            }
            _ => (),
        }

        // Anything else is part of a command.
        self.pending = None;
        self.trailing_operator = None;
        self.word_start = false;
        match byte {
            b'\\' => self.advance(2),
            b'\'' => self.open(Context::Single, 1),
            b'"' => self.open(Context::Double, 1),
            b'`' => self.open(Context::Backtick, 1),
            b'$' => self.dollar(),
            b'(' => {
                self.open(Context::Group, 1);
                self.word_start = true;
            }
            b')' => {
                if matches!(
                    self.stack.last().map(|frame| frame.context),
                    Some(Context::Substitution | Context::Group)
                ) {
                    self.stack.pop();
                } else {
                    self.issue(self.line, SnippetIssueKind::UnexpectedClosingParenthesis);
                }
                self.advance(1);
            }
            b'|' | b'&' => self.operator(byte),
            b';' => {
                self.word_start = true;
                self.advance(1);
            }
            // `<<<` is a here-string.
            b'<' if self.peek(1) == Some(b'<') && self.peek(2) == Some(b'<') => self.advance(3),
            b'<' if self.peek(1) == Some(b'<') && !self.in_arithmetic() => self.heredoc(),
            _ => self.advance(1),
        }
    }

    fn operator(&mut self, byte: u8) {
        let doubled = self.peek(1) == Some(byte);
        self.trailing_operator = match (byte, doubled) {
            (b'|', true) => Some("||"),
            (b'|', false) => Some("|"),
            (_, true) => Some("&&"),
            // A single `&` sends the command to the background.
            (_, false) => None,
        };
        self.word_start = true;
        self.advance(if doubled { 2 } else { 1 });
    }

    /// Handles `$((`, `$(`, `${` and plain `$`.
    fn dollar(&mut self) {
        match self.peek(1) {
            Some(b'(') if self.peek(2) == Some(b'(') => self.open(Context::Arithmetic, 3),
            Some(b'(') => self.open(Context::Substitution, 2),
            Some(b'{') => self.open(Context::Parameter, 2),
            _ => self.advance(1),
        }
    }

    /// Registers the here-document started by `<<` or `<<-` at the current position.
    fn heredoc(&mut self) {
        self.advance(2);
        let strip_tabs = self.peek(0) == Some(b'-');
        if strip_tabs {
            self.advance(1);
        }
        while matches!(self.peek(0), Some(b' ' | b'\t')) {
            self.advance(1);
        }
        let start = self.position;
        while self
            .peek(0)
            .is_some_and(|byte| !byte.is_ascii_whitespace() && !b";|&<>()".contains(&byte))
        {
            self.position += 1;
        }
        let delimiter = String::from_utf8_lossy(&self.bytes[start..self.position])
            .chars()
            .filter(|c| !matches!(c, '\'' | '"' | '\\'))
            .collect::<String>();
        if !delimiter.is_empty() {
            self.heredocs.push(Heredoc {
                delimiter,
                strip_tabs,
                line: self.line,
            });
        }
    }

    fn end_of_line(&mut self) {
        if let Some(operator) = self.trailing_operator.take() {
            self.pending = Some(Pending::Operator(operator, self.line));
        }
        self.word_start = true;
        self.advance(1);
        // Here-document bodies start on the line after their operator.
        let heredocs = std::mem::take(&mut self.heredocs);
        let unterminated = heredocs
            .iter()
            .position(|heredoc| !self.skip_heredoc_body(heredoc));
        if let Some(index) = unterminated {
            self.heredocs = heredocs.into_iter().skip(index).collect();
        }
    }

    /// Skips the body of a here-document, returns `false` if the input ends first.
    fn skip_heredoc_body(&mut self, heredoc: &Heredoc) -> bool {
        while self.position < self.bytes.len() {
            let end = self.bytes[self.position..]
                .iter()
                .position(|byte| *byte == b'\n')
                .map_or(self.bytes.len(), |offset| self.position + offset);
            let line = String::from_utf8_lossy(&self.bytes[self.position..end]);
            let line = if heredoc.strip_tabs {
                line.trim_start_matches('\t')
            } else {
                &line[..]
            };
            let found = line.trim_end_matches('\r') == heredoc.delimiter;
            self.position = end;
            if self.peek(0) == Some(b'\n') {
                self.advance(1);
            }
            if found {
                return true;
            }
        }
        false
    }

    fn open(&mut self, context: Context, length: usize) {
        self.stack.push(Frame {
            context,
            line: self.line,
        });
        self.advance(length);
    }

    /// Moves forward, counting the newlines that are skipped.
    fn advance(&mut self, length: usize) {
        let end = (self.position + length).min(self.bytes.len());
        self.line += self.bytes[self.position..end]
            .iter()
            .filter(|byte| **byte == b'\n')
            .count();
        self.position = end;
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.position + offset).copied()
    }

    fn issue(&mut self, line: usize, kind: SnippetIssueKind) {
        self.issues.push(SnippetIssue { line, kind });
    }
}
