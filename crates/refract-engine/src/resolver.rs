//! Reference resolution
//!
//! Three concerns live here: locating the selected JSX node by offset
//! containment, finding the component that encloses it (while snapshotting
//! the lexical scope along the ancestor path), and collecting every
//! reference inside the selection that resolves to a binding declared
//! outside it.

use std::collections::HashSet;

use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, CallExpr, Decl, Expr, ForHead, ForInStmt, ForOfStmt, ForStmt,
    Function, JSXElement, JSXElementName, JSXFragment, MemberExpr, MemberProp, ModuleItem, Prop,
    Stmt, VarDecl, VarDeclOrExpr, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::ast_util::{
    bind_call_target, chain_capture, collect_pat_names, iteration_callee, member_prop_name,
    member_spine,
};
use crate::error::{ExtractError, ExtractResult};
use crate::parser::ParsedSource;

/// The JSX node a selection resolved to, cloned out of the parsed tree so
/// the binder can rewrite it without touching the cached document.
#[derive(Clone)]
pub enum SelectedNode {
    Element(Box<JSXElement>),
    Fragment(Box<JSXFragment>),
}

impl SelectedNode {
    pub fn span(&self) -> Span {
        match self {
            Self::Element(el) => el.span,
            Self::Fragment(frag) => frag.span,
        }
    }
}

/// What kind of component definition encloses the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Class,
    Function,
    Arrow,
}

/// One component-shaped ancestor of the selection.
#[derive(Debug, Clone)]
pub struct ComponentFrame {
    pub kind: ComponentKind,
    /// Start of the component node itself, the insertion anchor.
    pub node_lo: BytePos,
    /// Start of the enclosing statement, where leading comments attach.
    pub stmt_lo: BytePos,
}

/// Lexical context captured on the ancestor path of the selection.
pub struct ScopeSnapshot {
    /// Component-shaped ancestors, outermost first.
    components: Vec<ComponentFrame>,
    /// Names declared in enclosing blocks, loop heads and function
    /// parameter lists (including the component's own props parameter and
    /// anything destructured from it).
    pub tracked: HashSet<String>,
}

impl ScopeSnapshot {
    /// The innermost enclosing component, when there is one.
    pub fn component(&self) -> Option<&ComponentFrame> {
        self.components.last()
    }

    pub fn is_class_component(&self) -> bool {
        matches!(
            self.component().map(|frame| frame.kind),
            Some(ComponentKind::Class)
        )
    }
}

/// A use of an outer binding inside the selected markup.
#[derive(Debug, Clone)]
pub struct ExternalRef {
    /// Span of the expression the binder will replace.
    pub span: Span,
    /// Rendered source of that expression.
    pub expr: String,
    pub kind: RefKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind {
    /// Outermost member chain; `object` is the rendered object
    /// sub-expression and `property` the final path segment.
    Member { object: String, property: String },
    /// Bare identifier read.
    Ident { name: String },
    /// `x.y.bind(this)`-shaped call; the prop takes the method's name.
    BoundMethod { method: String },
    /// Component-typed local used as a JSX tag name.
    Tag { name: String },
}

/// First JSX element or fragment in document order whose span lies entirely
/// within `[start, end)`. `None` signals an invalid selection.
pub fn find_selected_element(
    parsed: &ParsedSource,
    start: usize,
    end: usize,
) -> Option<SelectedNode> {
    let mut finder = SelectionFinder {
        parsed,
        start,
        end,
        found: None,
    };
    parsed.module.visit_with(&mut finder);
    finder.found
}

struct SelectionFinder<'a> {
    parsed: &'a ParsedSource,
    start: usize,
    end: usize,
    found: Option<SelectedNode>,
}

impl Visit for SelectionFinder<'_> {
    fn visit_jsx_element(&mut self, n: &JSXElement) {
        if self.found.is_some() {
            return;
        }
        if self.parsed.span_within(n.span, self.start, self.end) {
            self.found = Some(SelectedNode::Element(Box::new(n.clone())));
            return;
        }
        n.visit_children_with(self);
    }

    fn visit_jsx_fragment(&mut self, n: &JSXFragment) {
        if self.found.is_some() {
            return;
        }
        if self.parsed.span_within(n.span, self.start, self.end) {
            self.found = Some(SelectedNode::Fragment(Box::new(n.clone())));
            return;
        }
        n.visit_children_with(self);
    }
}

/// Walk the document and capture the scope context at the selected node:
/// component-shaped ancestors plus every name the selection could close
/// over from enclosing blocks and parameter lists.
pub fn analyze_scope(parsed: &ParsedSource, target: Span) -> ExtractResult<ScopeSnapshot> {
    let mut probe = ScopeProbe {
        target,
        blocks: Vec::new(),
        params: Vec::new(),
        components: Vec::new(),
        stmt_lo: Vec::new(),
        snapshot: None,
    };
    parsed.module.visit_with(&mut probe);
    probe.snapshot.ok_or_else(|| {
        ExtractError::extraction("Selected markup was not found in the parsed document")
    })
}

/// The innermost class / function declaration / declarator ancestor;
/// reaching the file root first is an `InvalidComponent` failure.
pub fn find_enclosing_component(scope: &ScopeSnapshot) -> ExtractResult<&ComponentFrame> {
    scope.component().ok_or(ExtractError::InvalidComponent)
}

struct ScopeProbe {
    target: Span,
    blocks: Vec<Vec<String>>,
    params: Vec<Vec<String>>,
    components: Vec<ComponentFrame>,
    stmt_lo: Vec<BytePos>,
    snapshot: Option<ScopeSnapshot>,
}

impl ScopeProbe {
    fn current_stmt_lo(&self, fallback: BytePos) -> BytePos {
        self.stmt_lo.last().copied().unwrap_or(fallback)
    }

    fn take_snapshot(&mut self) {
        if self.snapshot.is_some() {
            return;
        }
        let mut tracked = HashSet::new();
        for names in self.blocks.iter().chain(self.params.iter()) {
            tracked.extend(names.iter().cloned());
        }
        self.snapshot = Some(ScopeSnapshot {
            components: self.components.clone(),
            tracked,
        });
    }
}

fn var_decl_names(var: &VarDecl, out: &mut Vec<String>) {
    for declarator in &var.decls {
        collect_pat_names(&declarator.name, out);
    }
}

fn for_head_names(head: &ForHead, out: &mut Vec<String>) {
    match head {
        ForHead::VarDecl(var) => var_decl_names(var, out),
        ForHead::UsingDecl(using) => {
            for declarator in &using.decls {
                collect_pat_names(&declarator.name, out);
            }
        }
        ForHead::Pat(pat) => collect_pat_names(pat, out),
    }
}

impl Visit for ScopeProbe {
    fn visit_module_item(&mut self, n: &ModuleItem) {
        self.stmt_lo.push(n.span().lo);
        n.visit_children_with(self);
        self.stmt_lo.pop();
    }

    fn visit_stmt(&mut self, n: &Stmt) {
        self.stmt_lo.push(n.span().lo);
        n.visit_children_with(self);
        self.stmt_lo.pop();
    }

    fn visit_block_stmt(&mut self, n: &BlockStmt) {
        let mut names = Vec::new();
        for stmt in &n.stmts {
            if let Stmt::Decl(Decl::Var(var)) = stmt {
                var_decl_names(var, &mut names);
            }
        }
        self.blocks.push(names);
        n.visit_children_with(self);
        self.blocks.pop();
    }

    fn visit_function(&mut self, n: &Function) {
        let mut names = Vec::new();
        for param in &n.params {
            collect_pat_names(&param.pat, &mut names);
        }
        self.params.push(names);
        n.visit_children_with(self);
        self.params.pop();
    }

    fn visit_arrow_expr(&mut self, n: &ArrowExpr) {
        let mut names = Vec::new();
        for pat in &n.params {
            collect_pat_names(pat, &mut names);
        }
        self.params.push(names);
        n.visit_children_with(self);
        self.params.pop();
    }

    fn visit_for_of_stmt(&mut self, n: &ForOfStmt) {
        let mut names = Vec::new();
        for_head_names(&n.left, &mut names);
        self.blocks.push(names);
        n.visit_children_with(self);
        self.blocks.pop();
    }

    fn visit_for_in_stmt(&mut self, n: &ForInStmt) {
        let mut names = Vec::new();
        for_head_names(&n.left, &mut names);
        self.blocks.push(names);
        n.visit_children_with(self);
        self.blocks.pop();
    }

    fn visit_for_stmt(&mut self, n: &ForStmt) {
        let mut names = Vec::new();
        if let Some(VarDeclOrExpr::VarDecl(var)) = &n.init {
            var_decl_names(var, &mut names);
        }
        self.blocks.push(names);
        n.visit_children_with(self);
        self.blocks.pop();
    }

    fn visit_class_decl(&mut self, n: &swc_ecma_ast::ClassDecl) {
        let node_lo = n.class.span.lo;
        self.components.push(ComponentFrame {
            kind: ComponentKind::Class,
            node_lo,
            stmt_lo: self.current_stmt_lo(node_lo),
        });
        n.visit_children_with(self);
        self.components.pop();
    }

    fn visit_fn_decl(&mut self, n: &swc_ecma_ast::FnDecl) {
        let node_lo = n.function.span.lo;
        self.components.push(ComponentFrame {
            kind: ComponentKind::Function,
            node_lo,
            stmt_lo: self.current_stmt_lo(node_lo),
        });
        n.visit_children_with(self);
        self.components.pop();
    }

    fn visit_var_declarator(&mut self, n: &VarDeclarator) {
        let kind = match n.init.as_deref() {
            Some(Expr::Fn(_)) => ComponentKind::Function,
            _ => ComponentKind::Arrow,
        };
        let node_lo = n.span.lo;
        self.components.push(ComponentFrame {
            kind,
            node_lo,
            stmt_lo: self.current_stmt_lo(node_lo),
        });
        n.visit_children_with(self);
        self.components.pop();
    }

    fn visit_jsx_element(&mut self, n: &JSXElement) {
        if n.span == self.target {
            self.take_snapshot();
            return;
        }
        n.visit_children_with(self);
    }

    fn visit_jsx_fragment(&mut self, n: &JSXFragment) {
        if n.span == self.target {
            self.take_snapshot();
            return;
        }
        n.visit_children_with(self);
    }
}

/// Collect every reference inside the selection that resolves outside it:
/// `this`-rooted chains (class components), reads of tracked outer names
/// expanded to their outermost member chains, bind-call patterns and
/// component-typed tag names. References are returned in document order and
/// are not deduplicated here.
pub fn find_external_references(
    parsed: &ParsedSource,
    selected: &SelectedNode,
    scope: &ScopeSnapshot,
) -> Vec<ExternalRef> {
    let mut collector = RefCollector {
        parsed,
        tracked: &scope.tracked,
        class_mode: scope.is_class_component(),
        locals: Vec::new(),
        refs: Vec::new(),
    };
    match selected {
        SelectedNode::Element(el) => el.visit_with(&mut collector),
        SelectedNode::Fragment(frag) => frag.visit_with(&mut collector),
    }
    let mut refs = collector.refs;
    refs.sort_by_key(|r| r.span.lo);
    tracing::debug!(count = refs.len(), "Collected external references");
    refs
}

struct RefCollector<'a> {
    parsed: &'a ParsedSource,
    tracked: &'a HashSet<String>,
    class_mode: bool,
    /// Bindings introduced inside the selection; they shadow tracked names.
    locals: Vec<HashSet<String>>,
    refs: Vec<ExternalRef>,
}

impl RefCollector<'_> {
    fn is_tracked(&self, name: &str) -> bool {
        self.tracked.contains(name) && !self.locals.iter().any(|scope| scope.contains(name))
    }

    fn push_ref(&mut self, span: Span, kind: RefKind) {
        let expr = self.parsed.span_text(span).to_string();
        tracing::trace!(expr = %expr, "Collected external reference");
        self.refs.push(ExternalRef { span, expr, kind });
    }

    fn chain_is_external(&self, member: &MemberExpr) -> bool {
        let (_, root) = member_spine(member);
        match root {
            Expr::This(_) => self.class_mode,
            Expr::Ident(ident) => self.is_tracked(ident.sym.as_ref()),
            _ => false,
        }
    }

    /// Capture the outermost chain of an external member access. Returns
    /// `false` when the chain is not externally rooted, leaving traversal to
    /// the caller.
    fn try_capture_member(&mut self, member: &MemberExpr) -> bool {
        let (spine, root) = member_spine(member);
        let eligible = match root {
            Expr::This(_) => self.class_mode,
            Expr::Ident(ident) => self.is_tracked(ident.sym.as_ref()),
            _ => false,
        };
        if !eligible {
            return false;
        }

        match chain_capture(&spine) {
            Some(capture) => {
                let object = self.parsed.span_text(capture.obj.span()).to_string();
                let property = member_prop_name(capture).unwrap_or_default().to_string();
                self.push_ref(capture.span, RefKind::Member { object, property });
                // Links above the capture stay in place; their index
                // expressions may still close over outer bindings.
                for link in &spine {
                    if std::ptr::eq(*link, capture) {
                        break;
                    }
                    if let MemberProp::Computed(computed) = &link.prop {
                        computed.expr.visit_with(self);
                    }
                }
            }
            None => {
                // The first link off the root is computed: only the root
                // identifier itself can be threaded.
                if let Expr::Ident(ident) = root {
                    self.push_ref(
                        ident.span,
                        RefKind::Ident {
                            name: ident.sym.to_string(),
                        },
                    );
                }
                for link in &spine {
                    if let MemberProp::Computed(computed) = &link.prop {
                        computed.expr.visit_with(self);
                    }
                }
            }
        }
        true
    }

    fn handle_call(&mut self, call: &CallExpr) {
        if let Some((target, method)) = bind_call_target(call) {
            if self.chain_is_external(target) {
                self.push_ref(call.span, RefKind::BoundMethod { method });
                return;
            }
        }

        if let Some(callee_member) = iteration_callee(call) {
            // `xs.map(...)` is terminal: the reference is `xs`, and the
            // callback is scanned on its own.
            let captured = match &*callee_member.obj {
                Expr::Member(obj_member) => self.try_capture_member(obj_member),
                Expr::Ident(ident) if self.is_tracked(ident.sym.as_ref()) => {
                    self.push_ref(
                        ident.span,
                        RefKind::Ident {
                            name: ident.sym.to_string(),
                        },
                    );
                    true
                }
                _ => false,
            };
            if captured {
                for arg in &call.args {
                    arg.visit_with(self);
                }
                return;
            }
        }

        call.visit_children_with(self);
    }
}

impl Visit for RefCollector<'_> {
    fn visit_expr(&mut self, e: &Expr) {
        match e {
            Expr::Call(call) => self.handle_call(call),
            Expr::Member(member) => {
                if !self.try_capture_member(member) {
                    e.visit_children_with(self);
                }
            }
            Expr::Ident(ident) => {
                if self.is_tracked(ident.sym.as_ref()) {
                    self.push_ref(
                        ident.span,
                        RefKind::Ident {
                            name: ident.sym.to_string(),
                        },
                    );
                }
            }
            _ => e.visit_children_with(self),
        }
    }

    fn visit_prop(&mut self, p: &Prop) {
        // Shorthand properties read the outer binding without a member
        // access around it.
        if let Prop::Shorthand(ident) = p {
            if self.is_tracked(ident.sym.as_ref()) {
                self.push_ref(
                    ident.span,
                    RefKind::Ident {
                        name: ident.sym.to_string(),
                    },
                );
            }
            return;
        }
        p.visit_children_with(self);
    }

    fn visit_jsx_element_name(&mut self, n: &JSXElementName) {
        if let JSXElementName::Ident(ident) = n {
            let name = ident.sym.as_ref();
            let is_component = name
                .chars()
                .next()
                .map(|c| c.is_uppercase())
                .unwrap_or(false);
            if is_component && self.is_tracked(name) {
                self.push_ref(
                    ident.span,
                    RefKind::Tag {
                        name: name.to_string(),
                    },
                );
            }
        }
    }

    fn visit_arrow_expr(&mut self, n: &ArrowExpr) {
        let mut names = Vec::new();
        for pat in &n.params {
            collect_pat_names(pat, &mut names);
        }
        self.locals.push(names.into_iter().collect());
        n.visit_children_with(self);
        self.locals.pop();
    }

    fn visit_function(&mut self, n: &Function) {
        let mut names = Vec::new();
        for param in &n.params {
            collect_pat_names(&param.pat, &mut names);
        }
        self.locals.push(names.into_iter().collect());
        n.visit_children_with(self);
        self.locals.pop();
    }

    fn visit_block_stmt(&mut self, n: &BlockStmt) {
        let mut names = Vec::new();
        for stmt in &n.stmts {
            if let Stmt::Decl(Decl::Var(var)) = stmt {
                var_decl_names(var, &mut names);
            }
        }
        self.locals.push(names.into_iter().collect());
        n.visit_children_with(self);
        self.locals.pop();
    }
}
