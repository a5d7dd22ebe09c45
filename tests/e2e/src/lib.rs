//! End-to-end scenario tests and shared test utilities for Refract

use refract_foundation::protocol::{ExtractionContext, RefactorResult};

#[cfg(test)]
mod extraction_scenarios;
#[cfg(test)]
mod probe_scenarios;

/// Build a context by locating `needle` inside `text`.
pub fn context_for(text: &str, needle: &str, name: &str, produce_class: bool) -> ExtractionContext {
    let start = text
        .find(needle)
        .unwrap_or_else(|| panic!("selection {:?} not found in document", needle));
    ExtractionContext {
        component_name: name.to_string(),
        text: text.to_string(),
        start,
        end: start + needle.len(),
        produce_class,
    }
}

/// Apply an extraction result the way a host would: replace the selection,
/// then insert the component (followed by a blank line) at the start of the
/// line containing `insert_at`.
pub fn apply_refactor(ctx: &ExtractionContext, result: &RefactorResult) -> String {
    let mut text = ctx.text.clone();
    text.replace_range(ctx.start..ctx.end, &result.replace_jsx_code);

    // The insertion point precedes the selection (it anchors on the
    // enclosing component), so its offset survives the replacement.
    let line_start = ctx.text[..result.insert_at]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    text.insert_str(line_start, &format!("{}\n\n", result.component_code));
    text
}
