//! Foundation layer for Refract
//!
//! This crate provides the building blocks shared by the rest of the
//! workspace:
//! - the core error type surfaced to hosts
//! - protocol types exchanged with the editor-facing shell
//! - validation helpers applied at the host boundary

pub mod error;
pub mod protocol;
pub mod validation;

pub use error::{CoreError, CoreResult};
pub use protocol::{ComponentStyle, ExtractionContext, FunctionStyle, RefactorResult};
