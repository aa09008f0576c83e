use thiserror::Error;

/// Why a document string could not be turned into a scene.
///
/// Offsets are byte positions into the input. A failed parse never touches
/// an existing scene; callers keep whatever they had.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,

    #[error("unexpected end of input at byte {offset} inside {context}")]
    UnexpectedEof {
        offset: usize,
        context: &'static str,
    },

    #[error("expected {expected} at byte {offset}")]
    Unexpected {
        offset: usize,
        expected: &'static str,
    },

    #[error("closing tag </{found}> at byte {offset} does not match <{expected}>")]
    MismatchedTag {
        offset: usize,
        expected: String,
        found: String,
    },

    #[error("duplicate attribute `{name}` at byte {offset}")]
    DuplicateAttribute { offset: usize, name: String },

    #[error("unknown entity `&{name};` at byte {offset}")]
    UnknownEntity { offset: usize, name: String },

    #[error("content after the root element at byte {offset}")]
    TrailingContent { offset: usize },

    #[error("elements nested deeper than {limit} levels at byte {offset}")]
    TooDeep { offset: usize, limit: usize },

    #[error("root element is <{found}>, expected <svg>")]
    NotSvg { found: String },
}

impl ParseError {
    /// Byte offset of the failure, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Empty | ParseError::NotSvg { .. } => None,
            ParseError::UnexpectedEof { offset, .. }
            | ParseError::Unexpected { offset, .. }
            | ParseError::MismatchedTag { offset, .. }
            | ParseError::DuplicateAttribute { offset, .. }
            | ParseError::UnknownEntity { offset, .. }
            | ParseError::TrailingContent { offset }
            | ParseError::TooDeep { offset, .. } => Some(*offset),
        }
    }
}
