//! Container coalescing
//!
//! When several references share an object root (`this.state.user.name`,
//! `this.state.user.age`), passing each leaf as its own prop is redundant;
//! the shared root becomes a single "container" prop instead.

use indexmap::IndexMap;

use crate::ast_util::{is_path_prefix, last_path_segment};
use crate::resolver::{ExternalRef, RefKind};

/// Roots that are never coalesced into a container of their own.
const RESERVED_ROOTS: [&str; 3] = ["this.props", "this.state", "props"];

/// A shared object root referenced more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerObject {
    /// Rendered source of the root expression, e.g. `"this.state.user"`.
    pub object: String,
    /// Its final path segment, e.g. `"user"`.
    pub property: String,
}

/// Group references by their rendered root expression and keep the roots
/// worth passing whole: referenced at least twice, not reserved, and not
/// covered by a shorter kept root (the outermost shared root wins).
pub fn coalesce(refs: &[ExternalRef]) -> Vec<ContainerObject> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for reference in refs {
        let root = match &reference.kind {
            RefKind::Member { object, .. } if object != "this" => object.as_str(),
            RefKind::Ident { name } => name.as_str(),
            _ => continue,
        };
        *counts.entry(root.to_string()).or_insert(0) += 1;
    }

    let kept: Vec<String> = counts
        .iter()
        .filter(|(root, count)| **count > 1 && !RESERVED_ROOTS.contains(&root.as_str()))
        .map(|(root, _)| root.clone())
        .collect();

    let containers: Vec<ContainerObject> = kept
        .iter()
        .filter(|root| !kept.iter().any(|other| is_path_prefix(other, root)))
        .map(|root| ContainerObject {
            object: root.clone(),
            property: last_path_segment(root).to_string(),
        })
        .collect();

    tracing::debug!(count = containers.len(), "Coalesced container objects");
    containers
}
