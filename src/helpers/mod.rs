//! Helper functions shared by templates and commands

mod date;
mod url;

pub use date::*;
pub use url::*;
