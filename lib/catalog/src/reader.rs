use crate::error::CatalogError;
use crate::example::{extract_identifier, pick_comment, pick_query, ExampleRow};
use crate::vocab::{rdf, rdfs, sh};
use oxrdf::Graph;
use oxttl::TurtleParser;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

/// The value of the backend column when none is given.
pub const DEFAULT_BACKEND_ID: i64 = 69;

/// Options of the example catalog conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Numeric identifier of the SPARQL endpoint written to every row.
    pub backend_id: i64,
    /// Whether titles are prefixed with their identifier (e.g. `ex:1 Title`).
    ///
    /// The identifier column is left empty in that case.
    pub prefix_id_in_title: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            backend_id: DEFAULT_BACKEND_ID,
            prefix_id_in_title: false,
        }
    }
}

/// Reads the examples of a single Turtle file.
///
/// One row is returned for each `sh:SPARQLExecutable` of the file.
pub fn read_examples(file: &Path, backend_id: i64) -> Result<Vec<ExampleRow>, CatalogError> {
    tracing::debug!(file = %file.display(), "Reading examples");
    let graph = load_graph(file)?;
    graph
        .subjects_for_predicate_object(rdf::TYPE, sh::SPARQL_EXECUTABLE)
        .map(|subject| -> Result<_, CatalogError> {
            Ok(ExampleRow {
                identifier: extract_identifier(subject, file),
                backend_id,
                name: pick_comment(
                    graph.objects_for_subject_predicate(subject, rdfs::COMMENT),
                    file,
                ),
                query: pick_query(&graph, subject, file)?,
            })
        })
        .collect()
}

/// Reads all the Turtle files of `directory` into sorted catalog rows.
///
/// Files are read in path order and rows are then ordered by their identifier, numeric
/// identifiers first.
pub fn collect_examples(
    directory: &Path,
    options: &CatalogOptions,
) -> Result<Vec<ExampleRow>, CatalogError> {
    let files = turtle_files(directory)?;
    let mut rows = Vec::new();
    for file in &files {
        rows.extend(read_examples(file, options.backend_id)?);
    }
    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    if options.prefix_id_in_title {
        for row in &mut rows {
            row.prefix_identifier_in_name();
        }
    }
    tracing::info!(
        files = files.len(),
        examples = rows.len(),
        "Collected examples from {}",
        directory.display()
    );
    Ok(rows)
}

/// Lists the `.ttl` files of a directory (case-insensitive extension), sorted by path.
pub fn turtle_files(directory: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    if !directory.is_dir() {
        return Err(CatalogError::DirectoryNotFound(directory.to_owned()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let is_turtle = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("ttl"));
        if is_turtle && path.is_file() {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(CatalogError::NoTurtleFiles(directory.to_owned()));
    }
    files.sort();
    Ok(files)
}

fn load_graph(file: &Path) -> Result<Graph, CatalogError> {
    let mut parser = TurtleParser::new();
    // Relative IRIs are resolved against the file location.
    if let Some(base) = fs::canonicalize(file)
        .ok()
        .and_then(|path| Url::from_file_path(path).ok())
    {
        parser = parser
            .with_base_iri(base.as_str())
            .map_err(|source| CatalogError::BaseIri {
                file: file.to_owned(),
                source,
            })?;
    }
    let mut graph = Graph::new();
    for triple in parser.for_reader(BufReader::new(File::open(file)?)) {
        let triple = triple.map_err(|source| CatalogError::Parse {
            file: file.to_owned(),
            source,
        })?;
        graph.insert(&triple);
    }
    Ok(graph)
}
