use thiserror::Error;

use super::dom::ElementId;

/// Failures inside an enhancement; logged, never surfaced to the reader
#[derive(Debug, Clone, Error)]
pub enum EnhanceError {
    #[error("document has no body element")]
    MissingBody,

    #[error("{0:?} is not a valid selector")]
    InvalidSelector(String),

    #[error("element {0:?} does not belong to this document")]
    UnknownElement(ElementId),

    #[error("cannot resolve {0:?} against the page location: {1}")]
    InvalidUrl(String, #[source] url::ParseError),
}
