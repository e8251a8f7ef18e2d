//! Builds the example catalog CSV from SPARQL example Turtle files.
//!
//! Each Turtle file of an example collection describes one or more `sh:SPARQLExecutable`
//! resources. Every executable becomes one catalog row holding its identifier, its English
//! comment and its query text.

mod error;
mod example;
mod reader;
pub mod vocab;
mod writer;

pub use error::CatalogError;
pub use example::{
    extract_identifier, pick_comment, pick_query, ExampleRow, SortKey, QUERY_PREDICATES,
};
pub use reader::{
    collect_examples, read_examples, turtle_files, CatalogOptions, DEFAULT_BACKEND_ID,
};
pub use writer::{write_catalog, CatalogWriter, HEADER};
