//! Component emission
//!
//! Rendering is split in two: SWC code generation turns the rewritten JSX
//! node back into markup text, and three string templates wrap that markup
//! in the requested component shape. No analysis happens here.

use swc_common::DUMMY_SP;
use swc_ecma_ast::{Expr, ExprStmt, Module, ModuleItem, Stmt};
use swc_ecma_codegen::{text_writer::JsWriter, Emitter};

use refract_foundation::protocol::ComponentStyle;

use crate::error::{ExtractError, ExtractResult};
use crate::parser::ParsedSource;
use crate::resolver::SelectedNode;

/// Render a (possibly rewritten) JSX node back to source text.
pub fn render_jsx(parsed: &ParsedSource, node: &SelectedNode) -> ExtractResult<String> {
    let expr = match node {
        SelectedNode::Element(el) => Expr::JSXElement(el.clone()),
        SelectedNode::Fragment(frag) => Expr::JSXFragment((**frag).clone()),
    };
    let module = Module {
        span: DUMMY_SP,
        body: vec![ModuleItem::Stmt(Stmt::Expr(ExprStmt {
            span: DUMMY_SP,
            expr: Box::new(expr),
        }))],
        shebang: None,
    };

    let cm = parsed.source_map();
    let mut buf = vec![];
    {
        let mut emitter = Emitter {
            cfg: Default::default(),
            cm: cm.clone(),
            comments: None,
            wr: JsWriter::new(cm.clone(), "\n", &mut buf, None),
        };
        emitter
            .emit_module(&module)
            .map_err(|e| ExtractError::extraction(format!("Failed to render JSX: {:?}", e)))?;
    }

    let rendered = String::from_utf8(buf).map_err(|e| {
        ExtractError::extraction(format!("Rendered JSX is not valid UTF-8: {}", e))
    })?;
    // The node was emitted as an expression statement; the statement
    // punctuation is not part of the markup.
    Ok(rendered
        .trim()
        .trim_end_matches(';')
        .trim_end()
        .to_string())
}

/// Wrap rendered markup in a component declaration.
pub fn render_component(name: &str, body: &str, style: ComponentStyle) -> String {
    match style {
        ComponentStyle::Function => format!(
            "function {}(props) {{\n  return (\n    {}\n  );\n}}",
            name, body
        ),
        ComponentStyle::ArrowFunction => {
            format!("const {} = (props) => (\n  {}\n);", name, body)
        }
        ComponentStyle::Class => format!(
            "class {} extends Component {{\n  render() {{\n    return (\n      {}\n    );\n  }}\n}}",
            name, body
        ),
    }
}
