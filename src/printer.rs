//! Built-in test-support printer for [`crate::emitter::EmissionPlan`].
//!
//! Not part of the core surface (§1, §6): a real embedder brings its own
//! syntax-tree printer and should consume the plan returned by
//! [`crate::api::serialize_to_plan`] directly. This renderer exists only so
//! the crate is testable end-to-end without linking one in — see
//! DESIGN.md. It favors obviously-correct output over pretty output: no
//! attempt is made to honor `options.compact`, `keep_comments`, or
//! `assume_strict_env` beyond the bare minimum.

use std::fmt::Write as _;

use crate::emitter::{DescriptorValueLit, EmissionPlan, Expr, PropLit, Stmt};
use crate::options::OutputFormat;
use crate::value::ClassifiedPrimitive;

/// Renders a finished plan to a single JavaScript-flavored text blob.
pub fn render(plan: &EmissionPlan) -> String {
    let mut out = String::new();

    for stmt in &plan.prelude {
        render_stmt(&mut out, stmt);
        out.push('\n');
    }

    let root = render_expr(&plan.root);
    match plan.format {
        OutputFormat::Expression => {
            let _ = write!(out, "{root}");
        }
        OutputFormat::ScriptCjs => {
            if plan.exec {
                let _ = write!(out, "{root};");
            } else {
                let _ = write!(out, "module.exports = {root};");
            }
        }
        OutputFormat::ScriptEsm => {
            let _ = write!(out, "export default {root};");
        }
    }
    out
}

/// A minimal, empty source map payload — enough to round-trip through a
/// consumer that expects valid JSON, without claiming to carry real
/// position data (the emission plan carries none to map from yet; see
/// DESIGN.md's note on `produce_source_map`).
pub fn empty_source_map() -> String {
    r#"{"version":3,"sources":[],"names":[],"mappings":""}"#.to_string()
}

fn render_stmt(out: &mut String, stmt: &Stmt) {
    match stmt {
        Stmt::ConstBinding { name, value } => {
            let _ = write!(out, "const {name} = {};", render_expr(value));
        }
        Stmt::FunctionDecl { name, body_source } => {
            let _ = write!(out, "function {name}{}", render_function_body(body_source));
        }
        Stmt::Assign { target, value } => {
            let _ = write!(out, "{} = {};", render_expr(target), render_expr(value));
        }
        Stmt::DefineProperty { target, key, descriptor } => {
            let value_lit = match &descriptor.value {
                DescriptorValueLit::Data(e) => format!("value: {}", render_expr(e)),
                DescriptorValueLit::Accessor { getter, setter } => {
                    let g = getter.as_ref().map(render_expr).unwrap_or_else(|| "undefined".to_string());
                    let s = setter.as_ref().map(render_expr).unwrap_or_else(|| "undefined".to_string());
                    format!("get: {g}, set: {s}")
                }
            };
            let _ = write!(
                out,
                "Object.defineProperty({}, {}, {{ {}, writable: {}, enumerable: {}, configurable: {} }});",
                render_expr(target),
                render_prop_key(key),
                value_lit,
                descriptor.writable,
                descriptor.enumerable,
                descriptor.configurable
            );
        }
        Stmt::SetPrototype { target, value } => {
            let _ = write!(out, "Object.setPrototypeOf({}, {});", render_expr(target), render_expr(value));
        }
        Stmt::MapSet { target, key, value } => {
            let _ = write!(out, "{}.set({}, {});", render_expr(target), render_expr(key), render_expr(value));
        }
        Stmt::SetAdd { target, value } => {
            let _ = write!(out, "{}.add({});", render_expr(target), render_expr(value));
        }
        Stmt::Return(e) => {
            let _ = write!(out, "return {};", render_expr(e));
        }
    }
}

fn render_function_body(body_source: &str) -> String {
    // `body_source` is the captured original source text, already a full
    // `(params) { ... }` suffix (the tracer never strips the `function`
    // keyword, only the name, which the emitter supplies separately).
    if body_source.trim_start().starts_with('(') {
        body_source.to_string()
    } else {
        format!("() {{ {body_source} }}")
    }
}

fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(v) => render_primitive(v),
        Expr::Null => "null".to_string(),
        Expr::Undefined => "undefined".to_string(),
        Expr::Ident(name) => name.clone(),
        Expr::ArrayLiteral(items) => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| item.as_ref().map(render_expr).unwrap_or_default())
                .collect();
            format!("[{}]", rendered.join(", "))
        }
        Expr::ObjectLiteral(props) => {
            let rendered: Vec<String> = props
                .iter()
                .map(|(key, value)| format!("{}: {}", render_prop_lit(key), render_expr(value)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Expr::MapLiteral => "new Map()".to_string(),
        Expr::SetLiteral => "new Set()".to_string(),
        Expr::RegExpLiteral { source, flags } => format!("/{source}/{flags}"),
        Expr::DateLiteral(millis) => format!("new Date({millis})"),
        Expr::BufferLiteral { bytes, shared } => {
            let ctor = if *shared { "SharedArrayBuffer" } else { "ArrayBuffer" };
            let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            format!("__bytesToBuffer(\"{hex}\", {ctor})")
        }
        Expr::SymbolLiteral { description, global } => {
            let desc = description.as_deref().unwrap_or("");
            if *global {
                format!("Symbol.for({desc:?})")
            } else if description.is_some() {
                format!("Symbol({desc:?})")
            } else {
                "Symbol()".to_string()
            }
        }
        Expr::Member(target, key) => format!("{}.{key}", render_expr(target)),
        Expr::Index(target, key) => format!("{}[{}]", render_expr(target), render_expr(key)),
        Expr::Call(callee, args) => {
            let rendered: Vec<String> = args.iter().map(render_expr).collect();
            format!("({})({})", render_expr(callee), rendered.join(", "))
        }
        Expr::GetPrototypeOf(target) => format!("Object.getPrototypeOf({})", render_expr(target)),
        Expr::AccessorOf(target, key, is_setter) => {
            let accessor = if *is_setter { "__lookupSetter__" } else { "__lookupGetter__" };
            format!("{}.{accessor}({key:?})", render_expr(target))
        }
        Expr::Require(module, export) => match export {
            Some(export) => format!("require({module:?}).{export}"),
            None => format!("require({module:?})"),
        },
        Expr::Iife { params, body, returns } => {
            let mut inner = String::new();
            for stmt in body {
                render_stmt(&mut inner, stmt);
                inner.push(' ');
            }
            let _ = write!(inner, "return {};", render_expr(returns));
            format!("(function({}) {{ {inner} }})", params.join(", "))
        }
    }
}

fn render_primitive(v: &ClassifiedPrimitive) -> String {
    match v {
        ClassifiedPrimitive::Boolean(b) => b.to_string(),
        ClassifiedPrimitive::Integer(i) => i.to_string(),
        ClassifiedPrimitive::Floating(f) => {
            if f.is_nan() {
                "NaN".to_string()
            } else if f.is_infinite() {
                if *f > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
            } else {
                f.to_string()
            }
        }
        ClassifiedPrimitive::BigInteger(digits) => format!("{digits}n"),
        ClassifiedPrimitive::Text(s) => format!("{s:?}"),
    }
}

fn render_prop_lit(key: &PropLit) -> String {
    match key {
        PropLit::Named(name) if is_plain_ident(name) => name.clone(),
        PropLit::Named(name) => format!("{name:?}"),
        PropLit::Index(i) => i.to_string(),
        PropLit::Computed(e) => format!("[{}]", render_expr(e)),
    }
}

fn render_prop_key(key: &PropLit) -> String {
    match key {
        PropLit::Named(name) => format!("{name:?}"),
        PropLit::Index(i) => i.to_string(),
        PropLit::Computed(e) => render_expr(e),
    }
}

fn is_plain_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SerializeOptions;

    #[test]
    fn expression_format_renders_bare_root() {
        let plan = EmissionPlan {
            prelude: Vec::new(),
            root: Expr::Literal(ClassifiedPrimitive::Integer(9)),
            format: OutputFormat::Expression,
            exec: false,
            compact: false,
            assume_strict_env: false,
        };
        assert_eq!(render(&plan), "9");
    }

    #[test]
    fn cjs_format_wraps_in_module_exports() {
        let opts = SerializeOptions::builder().format(OutputFormat::ScriptCjs).build().unwrap();
        let plan = EmissionPlan {
            prelude: Vec::new(),
            root: Expr::Literal(ClassifiedPrimitive::Integer(1)),
            format: opts.format,
            exec: opts.exec,
            compact: opts.compact,
            assume_strict_env: opts.assume_strict_env,
        };
        assert_eq!(render(&plan), "module.exports = 1;");
    }

    #[test]
    fn array_literal_preserves_holes() {
        let plan = EmissionPlan {
            prelude: Vec::new(),
            root: Expr::ArrayLiteral(vec![Some(Expr::Literal(ClassifiedPrimitive::Integer(1))), None]),
            format: OutputFormat::Expression,
            exec: false,
            compact: false,
            assume_strict_env: false,
        };
        assert_eq!(render(&plan), "[1, ]");
    }
}
