use orion_core::error::ParseError;
use thiserror::Error;

/// A tool, brush or preset name from the host that the editor doesn't know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("unknown brush: {0}")]
    UnknownBrush(String),

    #[error("unknown canvas preset: {0}")]
    UnknownPreset(String),
}

/// Failure to build an editor from its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("initial document: {0}")]
    Document(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ToolError),
}
