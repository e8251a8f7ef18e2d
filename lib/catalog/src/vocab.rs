//! IRIs of the vocabularies used to describe SPARQL examples.

pub use oxrdf::vocab::{rdf, rdfs};

pub mod sh {
    //! [SHACL](https://www.w3.org/TR/shacl/) vocabulary.
    use oxrdf::NamedNodeRef;

    /// The class of resources that carry an executable SPARQL query.
    pub const SPARQL_EXECUTABLE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#SPARQLExecutable");
    pub const SELECT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#select");
    pub const ASK: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#ask");
    pub const CONSTRUCT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#construct");
}

pub mod spex {
    //! The SPARQL examples ontology.
    use oxrdf::NamedNodeRef;

    /// SHACL has no predicate for `DESCRIBE` queries.
    pub const DESCRIBE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("https://purl.expasy.org/sparql-examples/ontology#describe");
}
