//! Error types for tool gestures and the warnings surfaced to the host.

use crate::kernel::{Reason, codes};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A gesture rejected by a tool before reaching the kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("the tool needs a selection")]
    NoSelection,
    #[error("numeric input cannot be applied: {0}")]
    InvalidEditNumeric(String),
    #[error("numeric input is invalid: {0}")]
    InvalidDrawNumeric(String),
    #[error("transform would collapse the selection: {0}")]
    TransformWouldDegenerate(String),
    #[error("horizontal and vertical locks are both active")]
    ConstraintConflict,
    #[error("not enough points: {0}")]
    InsufficientInput(String),
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
    #[error("the document has no layer to draw on")]
    NoLayer,
    #[error("invalid pattern parameters: {0}")]
    InvalidPattern(String),
    #[error("mirror axis has zero length")]
    MirrorAxisInvalid,
}

impl ToolError {
    /// Stable reason code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::NoSelection => codes::EDIT_NO_SELECTION,
            ToolError::InvalidEditNumeric(_) => codes::EDIT_INVALID_NUMERIC,
            ToolError::InvalidDrawNumeric(_) => codes::DRAW_INVALID_NUMERIC,
            ToolError::TransformWouldDegenerate(_) => codes::EDIT_TRANSFORM_WOULD_DEGENERATE,
            ToolError::ConstraintConflict => codes::DRAW_CONSTRAINT_CONFLICT,
            ToolError::InsufficientInput(_) => codes::DRAW_INSUFFICIENT_INPUT,
            ToolError::Degenerate(_) => codes::GEOM_DEGENERATE,
            ToolError::NoLayer => codes::MODEL_LAYER_NOT_FOUND,
            ToolError::InvalidPattern(_) => codes::EDIT_PATTERN_INVALID_PARAMS,
            ToolError::MirrorAxisInvalid => codes::EDIT_MIRROR_AXIS_INVALID,
        }
    }
}

/// Failure of one tool step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// Rejected locally by the tool.
    #[error(transparent)]
    Precondition(#[from] ToolError),
    /// Rejected by the kernel.
    #[error(transparent)]
    Kernel(#[from] Reason),
}

impl EditError {
    pub fn code(&self) -> &str {
        match self {
            EditError::Precondition(e) => e.code(),
            EditError::Kernel(r) => &r.code,
        }
    }
}

/// Result of a tool handler.
pub type ToolResult = Result<(), EditError>;

/// A user-visible notice: tool title plus reason code and message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub title: String,
    pub code: String,
    pub message: String,
}

impl Warning {
    pub fn from_error(title: &str, error: &EditError) -> Self {
        let message = match error {
            EditError::Precondition(e) => e.to_string(),
            EditError::Kernel(r) => r.message.clone(),
        };
        Self {
            title: title.to_string(),
            code: error.code().to_string(),
            message,
        }
    }
}
