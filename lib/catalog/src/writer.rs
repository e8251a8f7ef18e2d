use crate::error::CatalogError;
use crate::example::ExampleRow;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::Write;

/// The header row of the catalog.
pub const HEADER: [&str; 6] = [
    "id",
    "backend",
    "name",
    "query",
    "Structure of sortKey [idcode]",
    "sortKey",
];

/// Value of the `sortKey` column, which is not computed by the catalog.
const SORT_KEY_PLACEHOLDER: &str = "~";

/// Writes catalog rows as CSV.
///
/// Every field is quoted and records are terminated by `\n`.
pub struct CatalogWriter<W: Write> {
    inner: csv::Writer<W>,
    include_identifier: bool,
}

impl<W: Write> CatalogWriter<W> {
    /// Creates a writer and writes the header row.
    ///
    /// Without `include_identifier` the `id` column is written empty.
    pub fn new(writer: W, include_identifier: bool) -> Result<Self, CatalogError> {
        let mut inner = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer);
        inner.write_record(HEADER)?;
        Ok(Self {
            inner,
            include_identifier,
        })
    }

    pub fn write_row(&mut self, row: &ExampleRow) -> Result<(), CatalogError> {
        let identifier = if self.include_identifier {
            row.identifier.as_str()
        } else {
            ""
        };
        let backend = row.backend_id.to_string();
        self.inner.write_record([
            identifier,
            backend.as_str(),
            row.name.as_str(),
            row.query.as_str(),
            "",
            SORT_KEY_PLACEHOLDER,
        ])?;
        Ok(())
    }

    /// Flushes the CSV buffer and returns the underlying writer.
    pub fn finish(self) -> Result<W, CatalogError> {
        self.inner
            .into_inner()
            .map_err(|error| CatalogError::Io(error.into_error()))
    }
}

/// Writes `rows` with the header to `writer`.
pub fn write_catalog<W: Write>(
    writer: W,
    rows: &[ExampleRow],
    include_identifier: bool,
) -> Result<W, CatalogError> {
    let mut writer = CatalogWriter::new(writer, include_identifier)?;
    for row in rows {
        writer.write_row(row)?;
    }
    writer.finish()
}
