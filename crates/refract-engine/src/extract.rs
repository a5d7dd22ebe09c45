//! Extraction orchestration
//!
//! Sequences the pipeline end to end: probe (with the `<div>` auto-wrap
//! recovery), full-document parse, selected-node and component resolution,
//! reference collection, container coalescing, prop binding, emission and
//! insertion-offset computation. The caller applies the resulting edits;
//! nothing here touches a document.

use std::borrow::Cow;

use refract_foundation::error::CoreError;
use refract_foundation::protocol::{
    ComponentStyle, ExtractionContext, FunctionStyle, RefactorResult,
};

use crate::binder::{bind_props, render_invocation};
use crate::coalesce::coalesce;
use crate::emitter::{render_component, render_jsx};
use crate::error::{ExtractError, ExtractResult};
use crate::parser::{ParsedSource, SourceParser};
use crate::probe::JsxProbe;
use crate::resolver::{
    analyze_scope, find_enclosing_component, find_external_references, find_selected_element,
    ComponentFrame,
};

const WRAPPER_OPEN: &str = "<div>";
const WRAPPER_CLOSE: &str = "</div>";

/// Engine construction parameters, usually filled from host configuration.
#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    /// Grammar-extension names enabled when parsing documents.
    pub dialect_plugins: Vec<String>,
    /// Declaration shape for extracted function components.
    pub function_style: FunctionStyle,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            dialect_plugins: vec![
                "jsx".to_string(),
                "typescript".to_string(),
                "classProperties".to_string(),
                "objectRestSpread".to_string(),
            ],
            function_style: FunctionStyle::Function,
        }
    }
}

/// External capability that moves an inserted declaration into a new file.
///
/// The extract-to-file mode reuses the in-place extraction and then hands
/// the inserted component's line range to this black box.
#[cfg_attr(test, mockall::automock)]
pub trait DeclarationMover {
    fn move_declaration(
        &self,
        start_line: usize,
        end_line: usize,
        component_name: &str,
    ) -> Result<(), CoreError>;
}

/// The extraction engine exposed to hosts.
pub struct ComponentExtractor {
    parser: SourceParser,
    function_style: FunctionStyle,
}

impl ComponentExtractor {
    pub fn new(options: ExtractorOptions) -> Self {
        Self {
            parser: SourceParser::new(&options.dialect_plugins),
            function_style: options.function_style,
        }
    }

    /// Replace the parser dialect, dropping every cached tree.
    pub fn set_dialect_plugins(&mut self, plugins: &[String]) {
        self.parser.set_plugins(plugins);
    }

    fn probe(&self) -> JsxProbe {
        JsxProbe::new(self.parser.syntax())
    }

    /// Whether a fragment of text could be extracted as a component.
    pub fn is_extractable(&self, fragment: &str) -> bool {
        self.probe().is_jsx(fragment)
    }

    /// Run one extraction, returning the artifacts the caller must apply.
    pub fn extract(&self, ctx: &ExtractionContext) -> ExtractResult<RefactorResult> {
        ctx.validate()?;

        let probe = self.probe();
        let raw = ctx.selected_text();
        let (document, end) = if probe.is_jsx(raw) {
            (Cow::Borrowed(ctx.text.as_str()), ctx.end)
        } else {
            // Multi-root and text-only selections become extractable once
            // wrapped; the wrapped form is what gets extracted and replaced.
            let wrapped = format!("{}{}{}", WRAPPER_OPEN, raw, WRAPPER_CLOSE);
            if !probe.is_jsx(&wrapped) {
                return Err(ExtractError::InvalidJsx);
            }
            tracing::debug!("Selection is not self-contained JSX, using wrapped form");
            let mut doc =
                String::with_capacity(ctx.text.len() + WRAPPER_OPEN.len() + WRAPPER_CLOSE.len());
            doc.push_str(&ctx.text[..ctx.start]);
            doc.push_str(&wrapped);
            doc.push_str(&ctx.text[ctx.end..]);
            (
                Cow::Owned(doc),
                ctx.end + WRAPPER_OPEN.len() + WRAPPER_CLOSE.len(),
            )
        };

        // Scope and binding information needs the whole document, not just
        // the fragment.
        let parsed = self.parser.parse(&document).map_err(|e| {
            ExtractError::extraction_with_source("Failed to parse the selected document", e)
        })?;

        let selected =
            find_selected_element(&parsed, ctx.start, end).ok_or(ExtractError::InvalidJsx)?;
        let scope = analyze_scope(&parsed, selected.span())?;
        let component = find_enclosing_component(&scope)?;

        let refs = find_external_references(&parsed, &selected, &scope);
        let containers = coalesce(&refs);
        let bound = bind_props(&parsed, selected, &refs, &containers, scope.is_class_component());

        let body = render_jsx(&parsed, &bound.node)?;
        let style = ComponentStyle::resolve(ctx.produce_class, self.function_style);
        let component_code = render_component(&ctx.component_name, &body, style);
        let replace_jsx_code = render_invocation(&ctx.component_name, &bound.props);
        let insert_at = insertion_offset(&parsed, component);

        tracing::info!(
            component = %ctx.component_name,
            props = bound.props.len(),
            insert_at,
            "Extraction complete"
        );

        Ok(RefactorResult {
            replace_jsx_code,
            component_code,
            insert_at,
        })
    }

    /// Extract and hand the inserted component's line range to an external
    /// "move declaration to a new file" capability.
    pub fn extract_to_file(
        &self,
        ctx: &ExtractionContext,
        mover: &dyn DeclarationMover,
    ) -> ExtractResult<RefactorResult> {
        let result = self.extract(ctx)?;

        let start_line = ctx.text[..result.insert_at].matches('\n').count();
        let end_line = start_line + result.component_code.lines().count().saturating_sub(1);
        mover
            .move_declaration(start_line, end_line, &ctx.component_name)
            .map_err(|e| {
                ExtractError::extraction_with_source(
                    "Failed to hand the new component off to the file mover",
                    e,
                )
            })?;

        Ok(result)
    }
}

/// Start of the enclosing component's node, or of its first leading comment
/// so doc comments keep pointing at their declaration after the insert.
fn insertion_offset(parsed: &ParsedSource, frame: &ComponentFrame) -> usize {
    let anchor = parsed
        .leading_comment_start(frame.stmt_lo)
        .or_else(|| parsed.leading_comment_start(frame.node_lo))
        .unwrap_or(frame.node_lo);
    parsed.offset_of(anchor)
}
