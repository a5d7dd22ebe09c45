//! Supporting AST predicates and member-chain helpers

use swc_ecma_ast::{Callee, CallExpr, Expr, MemberExpr, MemberProp, ObjectPatProp, Pat};

/// Array iteration methods that terminate the outward member-chain walk:
/// for `this.items.map(...)` the reference is `this.items`, not
/// `this.items.map`.
const ITERATION_METHODS: [&str; 3] = ["map", "filter", "reduce"];

pub fn is_iteration_method(name: &str) -> bool {
    ITERATION_METHODS.contains(&name)
}

/// The plain-identifier property name of a member access, if it has one.
pub fn member_prop_name(member: &MemberExpr) -> Option<&str> {
    match &member.prop {
        MemberProp::Ident(ident) => Some(ident.sym.as_ref()),
        _ => None,
    }
}

/// Walk a member expression down to its spine and root.
///
/// Returns the member links ordered outermost-first and the base expression
/// the chain hangs off (`this`, an identifier, a call, ...).
pub fn member_spine(outer: &MemberExpr) -> (Vec<&MemberExpr>, &Expr) {
    let mut spine = vec![outer];
    let mut current = &*outer.obj;
    while let Expr::Member(member) = current {
        spine.push(member);
        current = &*member.obj;
    }
    (spine, current)
}

/// The outermost spine link reachable from the root through plain-identifier
/// properties only. A computed or private link terminates the chain, so
/// `a.b[i].c` captures `a.b` and leaves `[i].c` in place around the rewrite.
pub fn chain_capture<'a>(spine: &[&'a MemberExpr]) -> Option<&'a MemberExpr> {
    let mut capture = None;
    for member in spine.iter().rev() {
        if matches!(member.prop, MemberProp::Ident(_)) {
            capture = Some(*member);
        } else {
            break;
        }
    }
    capture
}

/// Match a `x.y.bind(this)`-shaped call, yielding the bound member chain and
/// the method name the prop should take.
pub fn bind_call_target(call: &CallExpr) -> Option<(&MemberExpr, String)> {
    let callee = match &call.callee {
        Callee::Expr(expr) => expr,
        _ => return None,
    };
    let bind_member = match &**callee {
        Expr::Member(member) => member,
        _ => return None,
    };
    if member_prop_name(bind_member) != Some("bind") {
        return None;
    }
    let target = match &*bind_member.obj {
        Expr::Member(member) => member,
        _ => return None,
    };
    let method = member_prop_name(target)?.to_string();
    Some((target, method))
}

/// A call whose callee is `<chain>.map/filter/reduce`, yielding the callee
/// member so the walk can stop at its object.
pub fn iteration_callee(call: &CallExpr) -> Option<&MemberExpr> {
    let callee = match &call.callee {
        Callee::Expr(expr) => expr,
        _ => return None,
    };
    match &**callee {
        Expr::Member(member) => match member_prop_name(member) {
            Some(name) if is_iteration_method(name) => Some(member),
            _ => None,
        },
        _ => None,
    }
}

/// Collect every name a binding pattern introduces, including destructured
/// and rest names.
pub fn collect_pat_names(pat: &Pat, out: &mut Vec<String>) {
    match pat {
        Pat::Ident(ident) => out.push(ident.id.sym.to_string()),
        Pat::Array(array) => {
            for element in array.elems.iter().flatten() {
                collect_pat_names(element, out);
            }
        }
        Pat::Rest(rest) => collect_pat_names(&rest.arg, out),
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => collect_pat_names(&kv.value, out),
                    ObjectPatProp::Assign(assign) => out.push(assign.key.sym.to_string()),
                    ObjectPatProp::Rest(rest) => collect_pat_names(&rest.arg, out),
                }
            }
        }
        Pat::Assign(assign) => collect_pat_names(&assign.left, out),
        Pat::Expr(_) | Pat::Invalid(_) => {}
    }
}

/// Last `.`-separated segment of a rendered path expression.
pub fn last_path_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Whether `shorter` is a strict path-segment prefix of `longer`
/// (`"a.b"` of `"a.b.c"`, but not of `"a.bc"`).
pub fn is_path_prefix(shorter: &str, longer: &str) -> bool {
    if shorter.len() >= longer.len() {
        return false;
    }
    longer.starts_with(shorter) && longer.as_bytes()[shorter.len()] == b'.'
}
