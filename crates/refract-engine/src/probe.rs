//! Speculative JSX validity probing
//!
//! The probe is called often and optimistically (on every selection change in
//! a host), so a parse failure is an answer, never an error.

use swc_common::sync::Lrc;
use swc_common::{FileName, FilePathMapping, SourceMap};
use swc_ecma_ast::{Expr, Stmt};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

/// Decides whether a text fragment is a self-contained JSX expression.
#[derive(Debug, Clone, Copy)]
pub struct JsxProbe {
    syntax: Syntax,
}

impl JsxProbe {
    pub fn new(syntax: Syntax) -> Self {
        Self { syntax }
    }

    /// `true` when the fragment parses as exactly one expression statement
    /// whose expression is a JSX element or fragment.
    pub fn is_jsx(&self, fragment: &str) -> bool {
        let trimmed = fragment.trim();
        if !trimmed.starts_with('<') || !trimmed.ends_with('>') {
            return false;
        }

        let cm: Lrc<SourceMap> = Lrc::new(SourceMap::new(FilePathMapping::empty()));
        let fm = cm.new_source_file(FileName::Anon.into(), trimmed.to_string());
        let lexer = Lexer::new(
            self.syntax,
            Default::default(),
            StringInput::from(&*fm),
            None,
        );
        let mut parser = Parser::new_from(lexer);

        let script = match parser.parse_script() {
            Ok(script) => script,
            Err(_) => return false,
        };
        if !parser.take_errors().is_empty() {
            return false;
        }
        if script.body.len() != 1 {
            return false;
        }
        match &script.body[0] {
            Stmt::Expr(stmt) => {
                matches!(&*stmt.expr, Expr::JSXElement(_) | Expr::JSXFragment(_))
            }
            _ => false,
        }
    }
}
