use std::io;
use std::path::PathBuf;

/// An error raised while reading or generating documentation pages.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DocsError {
    /// Error from the OS I/O layer.
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The page to check is not part of the site it is checked against.
    #[error("{} is not inside the site root {}", page.display(), site_root.display())]
    OutsideSite { page: PathBuf, site_root: PathBuf },
}
