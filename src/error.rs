//! Typed build errors

use thiserror::Error;

/// Errors that abort a site build
#[derive(Debug, Error)]
pub enum BuildError {
    /// Two published items resolve to the same output file
    #[error("{url} is produced by both {first} and {second}")]
    DuplicatePermalink {
        url: String,
        first: String,
        second: String,
    },

    /// A content item names a layout that is neither built in nor in the includes dir
    #[error("layout {layout:?} used by {source_file} does not exist")]
    MissingLayout { layout: String, source_file: String },

    /// The output dir is the site root or contains the content
    #[error("output dir {output_dir} contains the site sources")]
    OutputContainsSources { output_dir: String },
}
