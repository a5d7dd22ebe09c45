//! JSX component extraction engine
//!
//! Given a span of JSX selected inside a React source file, the engine
//! extracts that markup into a new component, replaces the span with an
//! invocation of it, and threads every outer-scope value the markup
//! references through as props. The pipeline:
//!
//! 1. [`probe`] validates the selection is self-contained JSX
//! 2. [`parser`] parses the full document (cached, dialect-configurable)
//! 3. [`resolver`] finds the selected node, its enclosing component and the
//!    references that resolve outside the selection
//! 4. [`coalesce`] groups references sharing an object root into containers
//! 5. [`binder`] names the props and rewrites the markup in place
//! 6. [`emitter`] renders the markup and wraps it in a component shape
//! 7. [`extract`] sequences it all and computes the insertion offset

pub mod ast_util;
pub mod binder;
pub mod coalesce;
pub mod emitter;
pub mod error;
pub mod extract;
pub mod parser;
pub mod probe;
pub mod resolver;

pub use coalesce::ContainerObject;
pub use error::{ExtractError, ExtractResult};
pub use extract::{ComponentExtractor, DeclarationMover, ExtractorOptions};
pub use parser::{DialectPlugin, ParsedSource, SourceParser};
pub use probe::JsxProbe;
