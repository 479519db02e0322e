//! Site configuration (`blog.yml`)

mod site;

pub use site::HighlightConfig;
pub use site::SiteConfig;
pub use site::CONFIG_FILE;
