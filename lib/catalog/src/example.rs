use crate::error::CatalogError;
use crate::vocab::{sh, spex};
use oxrdf::{Graph, NamedNodeRef, SubjectRef, TermRef};
use std::cmp::Ordering;
use std::path::Path;

/// The predicates that may hold the query text, by priority.
///
/// The first predicate with a value wins.
pub const QUERY_PREDICATES: [NamedNodeRef<'static>; 4] =
    [sh::SELECT, sh::ASK, sh::CONSTRUCT, spex::DESCRIBE];

/// A single row of the example catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRow {
    pub identifier: String,
    pub backend_id: i64,
    pub name: String,
    pub query: String,
}

impl ExampleRow {
    /// Prefixes the name with the identifier (e.g. `ex:1 Title`).
    pub fn prefix_identifier_in_name(&mut self) {
        self.name = format!("ex:{} {}", self.identifier, self.name);
    }

    pub fn sort_key(&self) -> SortKey<'_> {
        SortKey::new(&self.identifier)
    }
}

/// Orders identifiers so that numeric ones come first, in numeric order.
///
/// Identifiers made only of ASCII digits are compared by value regardless of their length, so
/// `007` and `7` are equal. All other identifiers come after them in lexicographic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey<'a> {
    /// The digits without leading zeros.
    Numeric(&'a str),
    Text(&'a str),
}

impl<'a> SortKey<'a> {
    pub fn new(identifier: &'a str) -> Self {
        if !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit()) {
            Self::Numeric(identifier.trim_start_matches('0'))
        } else {
            Self::Text(identifier)
        }
    }
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Self::Numeric(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Numeric(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Extracts a readable identifier from a subject IRI or blank node.
///
/// This is the last `#` fragment, then the last `/` segment. Falls back to the file stem when
/// nothing is left.
pub fn extract_identifier(subject: SubjectRef<'_>, file: &Path) -> String {
    let mut text = match subject {
        SubjectRef::NamedNode(node) => node.as_str(),
        SubjectRef::BlankNode(node) => node.as_str(),
    }
    .trim();
    for separator in ['#', '/'] {
        if let Some((_, tail)) = text.rsplit_once(separator) {
            text = tail;
        }
    }
    if text.is_empty() {
        file_stem(file)
    } else {
        text.to_owned()
    }
}

/// Picks the preferred comment, favouring English literals.
///
/// Non-literal objects are ignored. Without any English literal the first literal is used, and
/// without any non-empty literal the file stem is used.
pub fn pick_comment<'a>(comments: impl IntoIterator<Item = TermRef<'a>>, file: &Path) -> String {
    let mut fallback = None;
    for comment in comments {
        let TermRef::Literal(literal) = comment else {
            continue;
        };
        if literal.language() == Some("en") {
            return literal.value().to_owned();
        }
        if fallback.is_none() {
            fallback = Some(literal.value());
        }
    }
    match fallback {
        Some(comment) if !comment.is_empty() => comment.to_owned(),
        _ => {
            tracing::warn!(file = %file.display(), "No comment found, using the file name");
            file_stem(file)
        }
    }
}

/// Returns the query text of `subject`, checking [`QUERY_PREDICATES`] in order.
pub fn pick_query(
    graph: &Graph,
    subject: SubjectRef<'_>,
    file: &Path,
) -> Result<String, CatalogError> {
    QUERY_PREDICATES
        .iter()
        .find_map(|predicate| graph.object_for_subject_predicate(subject, *predicate))
        .map(|object| term_value(object).to_owned())
        .ok_or_else(|| CatalogError::MissingQuery {
            file: file.to_owned(),
            subject: subject.to_string(),
        })
}

fn term_value(term: TermRef<'_>) -> &str {
    match term {
        TermRef::NamedNode(node) => node.as_str(),
        TermRef::BlankNode(node) => node.as_str(),
        TermRef::Literal(literal) => literal.value(),
    }
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNodeRef, Literal, LiteralRef, NamedNode, Triple};

    const FILE: &str = "/data/examples/42.ttl";

    #[test]
    fn identifier_is_fragment_or_last_segment() {
        let file = Path::new(FILE);
        let node = NamedNodeRef::new_unchecked("https://example.org/sparql/examples#7");
        assert_eq!(extract_identifier(node.into(), file), "7");
        let node = NamedNodeRef::new_unchecked("https://example.org/sparql/examples/003");
        assert_eq!(extract_identifier(node.into(), file), "003");
        let node = NamedNodeRef::new_unchecked("https://example.org/a#b/c");
        assert_eq!(extract_identifier(node.into(), file), "c");
    }

    #[test]
    fn identifier_falls_back_to_file_stem() {
        let file = Path::new(FILE);
        let node = NamedNodeRef::new_unchecked("https://example.org/examples/");
        assert_eq!(extract_identifier(node.into(), file), "42");
        let blank = BlankNodeRef::new_unchecked("b0");
        assert_eq!(extract_identifier(blank.into(), file), "b0");
    }

    #[test]
    fn english_comment_wins() {
        let comments = [
            LiteralRef::new_language_tagged_literal_unchecked("Beispiel", "de").into(),
            LiteralRef::new_language_tagged_literal_unchecked("Example", "en").into(),
        ];
        assert_eq!(pick_comment(comments, Path::new(FILE)), "Example");
    }

    #[test]
    fn first_literal_is_the_fallback_comment() {
        let comments = [
            NamedNodeRef::new_unchecked("https://example.org/not-a-literal").into(),
            LiteralRef::new_simple_literal("First").into(),
            LiteralRef::new_language_tagged_literal_unchecked("Zweiter", "de").into(),
        ];
        assert_eq!(pick_comment(comments, Path::new(FILE)), "First");
    }

    #[test]
    fn missing_or_empty_comment_uses_file_stem() {
        assert_eq!(pick_comment([], Path::new(FILE)), "42");
        let comments = [LiteralRef::new_simple_literal("").into()];
        assert_eq!(pick_comment(comments, Path::new(FILE)), "42");
    }

    #[test]
    fn query_predicates_are_checked_by_priority() -> Result<(), CatalogError> {
        let subject = NamedNode::new_unchecked("https://example.org/examples#1");
        let mut graph = Graph::new();
        graph.insert(&Triple::new(
            subject.clone(),
            spex::DESCRIBE,
            Literal::new_simple_literal("DESCRIBE <x>"),
        ));
        graph.insert(&Triple::new(
            subject.clone(),
            sh::ASK,
            Literal::new_simple_literal("ASK {}"),
        ));
        assert_eq!(
            pick_query(&graph, subject.as_ref().into(), Path::new(FILE))?,
            "ASK {}"
        );
        Ok(())
    }

    #[test]
    fn missing_query_is_an_error() {
        let subject = NamedNode::new_unchecked("https://example.org/examples#1");
        let graph = Graph::new();
        let error = pick_query(&graph, subject.as_ref().into(), Path::new(FILE)).unwrap_err();
        assert!(matches!(error, CatalogError::MissingQuery { .. }));
        assert!(error.to_string().contains("42.ttl"));
    }

    #[test]
    fn numeric_identifiers_sort_first_by_value() {
        let mut identifiers = vec!["b", "10", "a", "9", "007", "100000000000000000000000", "7"];
        identifiers.sort_by(|a, b| SortKey::new(a).cmp(&SortKey::new(b)));
        assert_eq!(
            identifiers,
            ["007", "7", "9", "10", "100000000000000000000000", "a", "b"]
        );
    }

    #[test]
    fn empty_identifier_is_text() {
        assert_eq!(SortKey::new(""), SortKey::Text(""));
        assert!(SortKey::new("") > SortKey::new("0"));
    }

    #[test]
    fn prefix_identifier() {
        let mut row = ExampleRow {
            identifier: "12".to_owned(),
            backend_id: 69,
            name: "Count proteins".to_owned(),
            query: "SELECT * {}".to_owned(),
        };
        row.prefix_identifier_in_name();
        assert_eq!(row.name, "ex:12 Count proteins");
    }
}
