use assert_fs::prelude::*;
use assert_fs::TempDir;
use oxttl::TurtleParseError;
use spex_catalog::{collect_examples, write_catalog, CatalogError, CatalogOptions};

const PREFIXES: &str = "@prefix sh: <http://www.w3.org/ns/shacl#> .\n\
    @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
    @prefix spex: <https://purl.expasy.org/sparql-examples/ontology#> .\n\
    @prefix ex: <https://example.org/sparql/examples/> .\n";

fn example_collection() -> Result<TempDir, Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    dir.child("10.ttl").write_str(&format!(
        "{PREFIXES}ex:10 a sh:SPARQLExecutable, sh:SPARQLSelectExecutable ;\n\
         rdfs:comment \"Zehn\"@de, \"Ten\"@en ;\n\
         sh:select \"SELECT ?s WHERE {{ ?s ?p ?o }}\" .\n"
    ))?;
    dir.child("2.TTL").write_str(&format!(
        "{PREFIXES}ex:2 a sh:SPARQLExecutable ;\n\
         rdfs:comment \"Two\" ;\n\
         sh:ask \"ASK {{ ?s ?p ?o }}\" .\n\
         ex:alpha a sh:SPARQLExecutable ;\n\
         spex:describe \"DESCRIBE <urn:x>\" .\n"
    ))?;
    dir.child("notes.txt").write_str("not turtle")?;
    Ok(dir)
}

#[test]
fn rows_are_sorted_with_numeric_identifiers_first() -> Result<(), Box<dyn std::error::Error>> {
    let dir = example_collection()?;
    let rows = collect_examples(dir.path(), &CatalogOptions::default())?;
    let identifiers = rows
        .iter()
        .map(|row| row.identifier.as_str())
        .collect::<Vec<_>>();
    assert_eq!(identifiers, ["2", "10", "alpha"]);
    assert_eq!(rows[1].name, "Ten");
    assert_eq!(rows[1].query, "SELECT ?s WHERE { ?s ?p ?o }");
    assert_eq!(rows[2].name, "2");
    assert_eq!(rows[2].query, "DESCRIBE <urn:x>");
    assert!(rows.iter().all(|row| row.backend_id == 69));
    Ok(())
}

#[test]
fn prefixed_titles_leave_the_id_column_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = example_collection()?;
    let options = CatalogOptions {
        backend_id: 3,
        prefix_id_in_title: true,
    };
    let rows = collect_examples(dir.path(), &options)?;
    let output = write_catalog(Vec::new(), &rows, !options.prefix_id_in_title)?;
    let output = String::from_utf8(output)?;
    let lines = output.lines().collect::<Vec<_>>();
    assert_eq!(
        lines[1],
        "\"\",\"3\",\"ex:2 Two\",\"ASK { ?s ?p ?o }\",\"\",\"~\""
    );
    assert_eq!(lines.len(), 4);
    Ok(())
}

#[test]
fn relative_iris_resolve_against_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    dir.child("relative.ttl").write_str(
        "@prefix sh: <http://www.w3.org/ns/shacl#> .\n\
         <#first> a sh:SPARQLExecutable ; sh:construct \"CONSTRUCT WHERE { ?s ?p ?o }\" .\n",
    )?;
    let rows = collect_examples(dir.path(), &CatalogOptions::default())?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].identifier, "first");
    assert_eq!(rows[0].name, "relative");
    Ok(())
}

#[test]
fn missing_directory_is_reported() {
    let error = collect_examples("does/not/exist".as_ref(), &CatalogOptions::default())
        .unwrap_err();
    assert!(matches!(error, CatalogError::DirectoryNotFound(_)));
    assert_eq!(error.to_string(), "Directory not found: does/not/exist");
}

#[test]
fn directory_without_turtle_files_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    dir.child("README.md").write_str("# Examples")?;
    let error = collect_examples(dir.path(), &CatalogOptions::default()).unwrap_err();
    assert!(matches!(error, CatalogError::NoTurtleFiles(_)));
    Ok(())
}

#[test]
fn syntax_errors_name_the_file_and_position() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    dir.child("broken.ttl")
        .write_str("<a> <b> <c> .\n<d> <e> .\n")?;
    let error = collect_examples(dir.path(), &CatalogOptions::default()).unwrap_err();
    let CatalogError::Parse {
        source: TurtleParseError::Syntax(syntax_error),
        ..
    } = &error
    else {
        panic!("expected a syntax error, got {error}");
    };
    assert_eq!(syntax_error.location().start.line, 1);
    let message = error.to_string();
    assert!(message.contains("broken.ttl"));
    assert!(message.contains("line 2"));
    Ok(())
}

#[test]
fn executables_without_query_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    dir.child("1.ttl").write_str(&format!(
        "{PREFIXES}ex:1 a sh:SPARQLExecutable ; rdfs:comment \"No query\" .\n"
    ))?;
    let error = collect_examples(dir.path(), &CatalogOptions::default()).unwrap_err();
    assert!(matches!(error, CatalogError::MissingQuery { .. }));
    Ok(())
}
