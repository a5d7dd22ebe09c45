//! Prop binding and in-place reference rewriting
//!
//! Takes the collected external references, assigns each a prop name,
//! rewrites the selected markup to read from `props` / `this.props`, and
//! renders the replacement invocation tag.

use std::collections::HashMap;

use indexmap::IndexMap;
use swc_common::{Span, Spanned, SyntaxContext, DUMMY_SP};
use swc_ecma_ast::{
    Expr, Ident, IdentName, JSXAttrOrSpread, JSXAttrValue, JSXElementName, JSXExpr,
    JSXMemberExpr, JSXObject, KeyValueProp, MemberExpr, MemberProp, Prop, PropName, ThisExpr,
};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::coalesce::ContainerObject;
use crate::parser::ParsedSource;
use crate::resolver::{ExternalRef, RefKind, SelectedNode};

/// Ordered prop-name -> rendered-value mapping for the replacement tag.
#[derive(Debug, Default)]
pub struct PropsMap {
    entries: IndexMap<String, String>,
}

impl PropsMap {
    /// Register a prop under `desired`, probing with underscore prefixes
    /// until the name is free or already holds the identical value.
    pub fn assign(&mut self, desired: &str, value: &str) -> String {
        let mut name = desired.to_string();
        loop {
            match self.entries.get(&name) {
                None => {
                    self.entries.insert(name.clone(), value.to_string());
                    return name;
                }
                Some(existing) if existing == value => return name,
                Some(_) => name = format!("_{}", name),
            }
        }
    }

    fn insert_fixed(&mut self, name: &str, value: &str) {
        self.entries.insert(name.to_string(), value.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The binder's output: the registered props and the rewritten markup node.
pub struct BoundProps {
    pub props: PropsMap,
    pub node: SelectedNode,
}

/// Bind every surviving reference to a prop and rewrite the markup in place.
///
/// The selected element's `key` attribute is captured first: its expression
/// becomes the prop named exactly `key`, the attribute is removed from the
/// markup, and its span is tombstoned so references inside it are skipped.
pub fn bind_props(
    parsed: &ParsedSource,
    mut node: SelectedNode,
    refs: &[ExternalRef],
    containers: &[ContainerObject],
    class_mode: bool,
) -> BoundProps {
    let mut props = PropsMap::default();
    let mut tombstones: Vec<Span> = Vec::new();

    if let SelectedNode::Element(el) = &mut node {
        if let Some((span, key_expr)) = take_key_attr(parsed, el) {
            props.insert_fixed("key", &key_expr);
            tombstones.push(span);
        }
    }

    let mut rewrites: HashMap<(u32, u32), Vec<String>> = HashMap::new();
    for reference in refs {
        if tombstones
            .iter()
            .any(|t| t.lo <= reference.span.lo && reference.span.hi <= t.hi)
        {
            tracing::trace!(expr = %reference.expr, "Skipping reference removed with its attribute");
            continue;
        }

        let path = match &reference.kind {
            RefKind::BoundMethod { method } => vec![props.assign(method, &reference.expr)],
            RefKind::Member { object, property } => {
                match containers.iter().find(|c| c.object == *object) {
                    Some(container) => {
                        let container_name = props.assign(&container.property, &container.object);
                        vec![container_name, property.clone()]
                    }
                    None => vec![props.assign(property, &reference.expr)],
                }
            }
            RefKind::Ident { name } => vec![props.assign(name, &reference.expr)],
            RefKind::Tag { name } => vec![props.assign(name, &reference.expr)],
        };
        rewrites.insert((reference.span.lo.0, reference.span.hi.0), path);
    }

    let mut rewriter = RefRewriter {
        rewrites,
        class_mode,
    };
    match &mut node {
        SelectedNode::Element(el) => el.visit_mut_with(&mut rewriter),
        SelectedNode::Fragment(frag) => frag.visit_mut_with(&mut rewriter),
    }

    tracing::debug!(props = props.len(), "Bound props");
    BoundProps { props, node }
}

/// Render the invocation tag that replaces the original selection,
/// `<Name key={expr} a={expr} />`, props in registration order.
pub fn render_invocation(name: &str, props: &PropsMap) -> String {
    if props.is_empty() {
        return format!("<{} />", name);
    }
    let attrs = props
        .iter()
        .map(|(prop, value)| format!("{}={{{}}}", prop, value))
        .collect::<Vec<_>>()
        .join(" ");
    format!("<{} {} />", name, attrs)
}

/// Remove a `key={expr}` attribute from the element's opening tag, returning
/// the removed attribute's span and the expression's source text.
fn take_key_attr(
    parsed: &ParsedSource,
    el: &mut swc_ecma_ast::JSXElement,
) -> Option<(Span, String)> {
    let index = el.opening.attrs.iter().position(|attr| {
        let JSXAttrOrSpread::JSXAttr(attr) = attr else {
            return false;
        };
        let swc_ecma_ast::JSXAttrName::Ident(name) = &attr.name else {
            return false;
        };
        if name.sym.as_ref() != "key" {
            return false;
        }
        matches!(
            &attr.value,
            Some(JSXAttrValue::JSXExprContainer(container))
                if matches!(&container.expr, JSXExpr::Expr(_))
        )
    })?;

    let JSXAttrOrSpread::JSXAttr(attr) = el.opening.attrs.remove(index) else {
        return None;
    };
    let Some(JSXAttrValue::JSXExprContainer(container)) = attr.value else {
        return None;
    };
    let JSXExpr::Expr(expr) = container.expr else {
        return None;
    };
    Some((attr.span, parsed.span_text(expr.span()).to_string()))
}

struct RefRewriter {
    rewrites: HashMap<(u32, u32), Vec<String>>,
    class_mode: bool,
}

impl RefRewriter {
    fn take(&self, span: Span) -> Option<&Vec<String>> {
        self.rewrites.get(&(span.lo.0, span.hi.0))
    }

    fn props_base(&self) -> Expr {
        if self.class_mode {
            Expr::Member(MemberExpr {
                span: DUMMY_SP,
                obj: Box::new(Expr::This(ThisExpr { span: DUMMY_SP })),
                prop: MemberProp::Ident(IdentName::new("props".into(), DUMMY_SP)),
            })
        } else {
            Expr::Ident(Ident::new("props".into(), DUMMY_SP, SyntaxContext::empty()))
        }
    }

    fn member_path(&self, path: &[String]) -> Expr {
        let mut expr = self.props_base();
        for segment in path {
            expr = Expr::Member(MemberExpr {
                span: DUMMY_SP,
                obj: Box::new(expr),
                prop: MemberProp::Ident(IdentName::new(segment.clone().into(), DUMMY_SP)),
            });
        }
        expr
    }

    fn jsx_member_path(&self, path: &[String]) -> JSXMemberExpr {
        let mut obj = if self.class_mode {
            JSXObject::JSXMemberExpr(Box::new(JSXMemberExpr {
                span: DUMMY_SP,
                obj: JSXObject::Ident(Ident::new(
                    "this".into(),
                    DUMMY_SP,
                    SyntaxContext::empty(),
                )),
                prop: IdentName::new("props".into(), DUMMY_SP),
            }))
        } else {
            JSXObject::Ident(Ident::new(
                "props".into(),
                DUMMY_SP,
                SyntaxContext::empty(),
            ))
        };
        let (last, init) = path.split_last().expect("tag rewrite path is never empty");
        for segment in init {
            obj = JSXObject::JSXMemberExpr(Box::new(JSXMemberExpr {
                span: DUMMY_SP,
                obj,
                prop: IdentName::new(segment.clone().into(), DUMMY_SP),
            }));
        }
        JSXMemberExpr {
            span: DUMMY_SP,
            obj,
            prop: IdentName::new(last.clone().into(), DUMMY_SP),
        }
    }
}

impl VisitMut for RefRewriter {
    fn visit_mut_expr(&mut self, e: &mut Expr) {
        if let Some(path) = self.take(e.span()) {
            *e = self.member_path(path);
            return;
        }
        e.visit_mut_children_with(self);
    }

    fn visit_mut_prop(&mut self, p: &mut Prop) {
        if let Prop::Shorthand(ident) = p {
            let span = ident.span;
            let key_sym = ident.sym.clone();
            if let Some(path) = self.take(span) {
                // `{ user }` becomes `{ user: props.user }`.
                let value = self.member_path(path);
                *p = Prop::KeyValue(KeyValueProp {
                    key: PropName::Ident(IdentName::new(key_sym, DUMMY_SP)),
                    value: Box::new(value),
                });
                return;
            }
        }
        p.visit_mut_children_with(self);
    }

    fn visit_mut_jsx_element_name(&mut self, n: &mut JSXElementName) {
        if let JSXElementName::Ident(ident) = n {
            if let Some(path) = self.take(ident.span) {
                *n = JSXElementName::JSXMemberExpr(self.jsx_member_path(path));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coalesce::coalesce;
    use crate::emitter::render_jsx;
    use crate::parser::{ParsedSource, SourceParser};
    use crate::resolver::{analyze_scope, find_external_references, find_selected_element};
    use std::sync::Arc;

    fn bind_selection(text: &str, needle: &str, class_mode: bool) -> (Arc<ParsedSource>, BoundProps) {
        let parser = SourceParser::new(&["jsx".to_string()]);
        let parsed = parser.parse(text).unwrap();
        let start = text.find(needle).unwrap();
        let selected = find_selected_element(&parsed, start, start + needle.len()).unwrap();
        let scope = analyze_scope(&parsed, selected.span()).unwrap();
        let refs = find_external_references(&parsed, &selected, &scope);
        let containers = coalesce(&refs);
        let bound = bind_props(&parsed, selected, &refs, &containers, class_mode);
        (parsed, bound)
    }

    #[test]
    fn class_references_rewrite_to_this_props() {
        let text =
            "class Foo extends Component { render() { return <div>{this.state.x}</div>; } }";
        let (parsed, bound) = bind_selection(text, "<div>{this.state.x}</div>", true);
        assert_eq!(bound.props.get("x"), Some("this.state.x"));
        let body = render_jsx(&parsed, &bound.node).unwrap();
        assert!(body.contains("this.props.x"), "body: {}", body);
    }

    #[test]
    fn function_references_rewrite_to_props() {
        let text = "function App({ user }) { return <div>{user.name}</div>; }";
        let (parsed, bound) = bind_selection(text, "<div>{user.name}</div>", false);
        assert_eq!(bound.props.get("name"), Some("user.name"));
        let body = render_jsx(&parsed, &bound.node).unwrap();
        assert!(body.contains("props.name"), "body: {}", body);
    }

    #[test]
    fn identical_expressions_share_one_prop() {
        let text = "function App(props) { const x = 1; return <div>{x}{x}</div>; }";
        let (_, bound) = bind_selection(text, "<div>{x}{x}</div>", false);
        assert_eq!(bound.props.len(), 1);
        assert_eq!(bound.props.get("x"), Some("x"));
    }

    #[test]
    fn colliding_names_with_distinct_values_get_mangled() {
        let text = "function App(props) { const a = f(); const b = g(); return <div>{a.value}{b.value}</div>; }";
        let (parsed, bound) = bind_selection(text, "<div>{a.value}{b.value}</div>", false);
        assert_eq!(bound.props.get("value"), Some("a.value"));
        assert_eq!(bound.props.get("_value"), Some("b.value"));
        let body = render_jsx(&parsed, &bound.node).unwrap();
        assert!(body.contains("props.value"));
        assert!(body.contains("props._value"));
    }

    #[test]
    fn container_references_bind_under_the_shared_root() {
        let text = "class Foo extends Component { render() { return <div>{this.state.user.name}{this.state.user.age}</div>; } }";
        let (parsed, bound) = bind_selection(
            text,
            "<div>{this.state.user.name}{this.state.user.age}</div>",
            true,
        );
        assert_eq!(bound.props.len(), 1);
        assert_eq!(bound.props.get("user"), Some("this.state.user"));
        let body = render_jsx(&parsed, &bound.node).unwrap();
        assert!(body.contains("this.props.user.name"), "body: {}", body);
        assert!(body.contains("this.props.user.age"), "body: {}", body);
    }

    #[test]
    fn bound_methods_use_the_method_name() {
        let text = "class Foo extends Component { render() { return <button onClick={this.save.bind(this)}>s</button>; } }";
        let (parsed, bound) =
            bind_selection(text, "<button onClick={this.save.bind(this)}>s</button>", true);
        assert_eq!(bound.props.get("save"), Some("this.save.bind(this)"));
        let body = render_jsx(&parsed, &bound.node).unwrap();
        assert!(body.contains("this.props.save"), "body: {}", body);
        assert!(!body.contains("bind"), "body: {}", body);
    }

    #[test]
    fn key_attribute_moves_to_the_invocation() {
        let text = "function App({ items }) { return <ul>{items.map(item => <li key={item.id}>{item.name}</li>)}</ul>; }";
        let (parsed, bound) = bind_selection(text, "<li key={item.id}>{item.name}</li>", false);
        assert_eq!(bound.props.get("key"), Some("item.id"));
        assert_eq!(bound.props.get("name"), Some("item.name"));
        let body = render_jsx(&parsed, &bound.node).unwrap();
        assert!(!body.contains("key="), "key must leave the markup: {}", body);

        let tag = render_invocation("Row", &bound.props);
        assert_eq!(tag, "<Row key={item.id} name={item.name} />");
    }

    #[test]
    fn tag_references_become_member_tags() {
        let text = "function App(props) { const Row = makeRow(); return <div><Row /></div>; }";
        let (parsed, bound) = bind_selection(text, "<div><Row /></div>", false);
        assert_eq!(bound.props.get("Row"), Some("Row"));
        let body = render_jsx(&parsed, &bound.node).unwrap();
        assert!(body.contains("<props.Row"), "body: {}", body);
    }

    #[test]
    fn shorthand_props_expand_on_rewrite() {
        let text =
            "function App(props) { const user = props.user; return <Card data={{ user }} />; }";
        let (parsed, bound) = bind_selection(text, "<Card data={{ user }} />", false);
        assert_eq!(bound.props.get("user"), Some("user"));
        let body = render_jsx(&parsed, &bound.node).unwrap();
        assert!(body.contains("user: props.user"), "body: {}", body);
    }

    #[test]
    fn invocation_without_props_is_self_closing() {
        let props = PropsMap::default();
        assert_eq!(render_invocation("Empty", &props), "<Empty />");
    }

    #[test]
    fn props_map_probes_until_free() {
        let mut props = PropsMap::default();
        assert_eq!(props.assign("value", "a.value"), "value");
        assert_eq!(props.assign("value", "b.value"), "_value");
        assert_eq!(props.assign("value", "c.value"), "__value");
        assert_eq!(props.assign("value", "a.value"), "value");
    }
}
