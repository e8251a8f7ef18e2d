use oxiri::IriParseError;
use oxttl::TurtleParseError;
use std::io;
use std::path::PathBuf;

/// An error raised while building the example catalog.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// Error from the OS I/O layer.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Error while writing the CSV output.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("No .ttl files found in {}", .0.display())]
    NoTurtleFiles(PathBuf),
    /// The Turtle file is not valid.
    #[error("Failed to parse {}: {source}", file.display())]
    Parse {
        file: PathBuf,
        #[source]
        source: TurtleParseError,
    },
    #[error("Invalid base IRI for {}: {source}", file.display())]
    BaseIri {
        file: PathBuf,
        #[source]
        source: IriParseError,
    },
    /// An executable has none of the query predicates.
    #[error("No SPARQL query found in {} for subject {subject}", file.display())]
    MissingQuery { file: PathBuf, subject: String },
}

