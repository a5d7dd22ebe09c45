//! Protocol types exchanged between the engine and its host
//!
//! The host (an editor extension, an MCP tool, a test harness) builds an
//! [`ExtractionContext`] from the user's selection and consumes the resulting
//! [`RefactorResult`] as two text edits: replace the selected span with
//! `replace_jsx_code`, then insert `component_code` (followed by a blank
//! line) at the start of the line containing `insert_at`.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Input parameters for one extraction run.
///
/// `component_name` is expected to already be normalized to PascalCase (see
/// [`crate::validation::normalize_component_name`]); offsets are byte offsets
/// into `text`, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionContext {
    /// Name of the component to create
    pub component_name: String,
    /// Full document text
    pub text: String,
    /// Inclusive start offset of the selection
    pub start: usize,
    /// Exclusive end offset of the selection
    pub end: usize,
    /// Emit a class component instead of the configured function style
    pub produce_class: bool,
}

impl ExtractionContext {
    /// Check the `0 <= start <= end <= text.len()` invariant.
    pub fn validate(&self) -> CoreResult<()> {
        if self.start > self.end {
            return Err(CoreError::invalid_data(format!(
                "Selection start {} is past its end {}",
                self.start, self.end
            )));
        }
        if self.end > self.text.len() {
            return Err(CoreError::invalid_data(format!(
                "Selection end {} is past the document length {}",
                self.end,
                self.text.len()
            )));
        }
        Ok(())
    }

    /// The selected slice of the document.
    pub fn selected_text(&self) -> &str {
        &self.text[self.start..self.end]
    }
}

/// The two text edits (plus insertion point) produced by an extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactorResult {
    /// Markup that replaces the original selection
    #[serde(rename = "replaceJSXCode")]
    pub replace_jsx_code: String,
    /// Full source of the new component declaration
    #[serde(rename = "componentCode")]
    pub component_code: String,
    /// Byte offset in the original document at which to insert the component
    #[serde(rename = "insertAt")]
    pub insert_at: usize,
}

/// Function-style choice offered by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionStyle {
    #[serde(rename = "function")]
    Function,
    #[serde(rename = "arrowFunction")]
    ArrowFunction,
}

impl Default for FunctionStyle {
    fn default() -> Self {
        Self::Function
    }
}

/// Shape of the emitted component declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStyle {
    Function,
    ArrowFunction,
    Class,
}

impl ComponentStyle {
    /// Resolve the effective style: an explicit class request beats the
    /// configured function style.
    pub fn resolve(produce_class: bool, function_style: FunctionStyle) -> Self {
        if produce_class {
            Self::Class
        } else {
            match function_style {
                FunctionStyle::Function => Self::Function,
                FunctionStyle::ArrowFunction => Self::ArrowFunction,
            }
        }
    }
}
