//! Identifier allocator (§4.1).
//!
//! Produces short, legal identifiers, one scope (lexical nesting level) at a
//! time. The default implementation is deliberately the whole of the state
//! this component needs — no dependency on records, globals, or the tracer —
//! so a host embedding this crate can swap in its own naming scheme by
//! implementing [`IdentifierAllocator`] directly.

use std::collections::HashSet;

use crate::error::{Error, Result};

/// Reserved words the allocator will never hand out as a mangled or
/// sanitized-hint name. This is deliberately a generic, conservative list
/// (it is a superset across common C-family/ECMAScript-like surface
/// languages) rather than tied to one target language, since the emission
/// planner — not this module — knows the output format.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with", "yield", "let", "static", "await", "enum",
    "implements", "package", "private", "protected", "public", "interface",
];

/// A lexical scope the allocator tracks names within. Scopes nest: a name
/// allocated or reserved in an ancestor scope is visible (and therefore
/// unavailable) to every descendant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeHandle(pub usize);

/// The external collaborator that produces fresh legal names (§4.1).
pub trait IdentifierAllocator {
    /// A name not colliding with any name already allocated or reserved in
    /// `scope` or any enclosing scope, and not a reserved word.
    fn allocate(&mut self, hint: &str, scope: ScopeHandle) -> String;

    /// Marks `name` as taken in `scope` without producing it. Idempotent.
    fn reserve(&mut self, name: &str, scope: ScopeHandle);

    /// Reserves `name` and additionally marks it frozen: no later call to
    /// `allocate` may rename the binding that owns it, regardless of
    /// `mangle`.
    ///
    /// Fails with [`Error::FrozenNameExhaustion`] when `name` is already
    /// frozen directly in `scope` — two distinct bindings in the same scope
    /// both forced to keep the same name (spec §7 kind 4). A name already
    /// frozen in an *enclosing* scope is not a conflict: shadowing is legal,
    /// only a scope freezing the same name twice over itself is not.
    fn freeze_with_name(&mut self, name: &str, scope: ScopeHandle) -> Result<()>;

    /// True if `name` is frozen anywhere visible from `scope`.
    fn is_frozen(&self, name: &str, scope: ScopeHandle) -> bool;

    /// Declares a new child scope nested inside `parent` (or a root scope if
    /// `parent` is `None`) and returns its handle.
    fn new_scope(&mut self, parent: Option<ScopeHandle>) -> ScopeHandle;
}

struct ScopeNode {
    parent: Option<ScopeHandle>,
    taken: HashSet<String>,
    frozen: HashSet<String>,
}

/// Short-identifier mangler: `a, b, c, ..., z, aa, ab, ...` per scope, falling
/// back to a sanitized hint when mangling is disabled.
pub struct DefaultAllocator {
    scopes: Vec<ScopeNode>,
    mangle: bool,
    next_short: Vec<usize>,
}

impl DefaultAllocator {
    pub fn new(mangle: bool) -> Self {
        DefaultAllocator { scopes: Vec::new(), mangle, next_short: Vec::new() }
    }

    fn visible_taken(&self, scope: ScopeHandle, name: &str) -> bool {
        let mut cur = Some(scope);
        while let Some(ScopeHandle(idx)) = cur {
            let node = &self.scopes[idx];
            if node.taken.contains(name) {
                return true;
            }
            cur = node.parent;
        }
        false
    }

    fn short_name(counter: usize) -> String {
        // Bijective base-26: a, b, ..., z, aa, ab, ...
        let mut n = counter + 1;
        let mut digits = Vec::new();
        while n > 0 {
            n -= 1;
            digits.push((b'a' + (n % 26) as u8) as char);
            n /= 26;
        }
        digits.iter().rev().collect()
    }

    fn sanitize(hint: &str) -> String {
        let mut out = String::new();
        for (i, c) in hint.chars().enumerate() {
            let valid = if i == 0 {
                c.is_ascii_alphabetic() || c == '_' || c == '$'
            } else {
                c.is_ascii_alphanumeric() || c == '_' || c == '$'
            };
            out.push(if valid { c } else { '_' });
        }
        if out.is_empty() || out.chars().next().unwrap().is_ascii_digit() {
            out.insert(0, '_');
        }
        out
    }
}

impl IdentifierAllocator for DefaultAllocator {
    fn allocate(&mut self, hint: &str, scope: ScopeHandle) -> String {
        let base = if self.mangle {
            loop {
                let ScopeHandle(idx) = scope;
                let counter = self.next_short[idx];
                self.next_short[idx] += 1;
                let candidate = Self::short_name(counter);
                if RESERVED.contains(&candidate.as_str()) {
                    continue;
                }
                if !self.visible_taken(scope, &candidate) {
                    break candidate;
                }
            }
        } else {
            let sanitized = Self::sanitize(hint);
            let mut candidate = sanitized.clone();
            let mut suffix = 0usize;
            while RESERVED.contains(&candidate.as_str()) || self.visible_taken(scope, &candidate) {
                suffix += 1;
                candidate = format!("{sanitized}{suffix}");
            }
            candidate
        };
        self.scopes[scope.0].taken.insert(base.clone());
        base
    }

    fn reserve(&mut self, name: &str, scope: ScopeHandle) {
        self.scopes[scope.0].taken.insert(name.to_string());
    }

    fn freeze_with_name(&mut self, name: &str, scope: ScopeHandle) -> Result<()> {
        if self.scopes[scope.0].frozen.contains(name) {
            return Err(Error::FrozenNameExhaustion { scope, name: name.to_string() });
        }
        self.reserve(name, scope);
        self.scopes[scope.0].frozen.insert(name.to_string());
        Ok(())
    }

    fn is_frozen(&self, name: &str, scope: ScopeHandle) -> bool {
        let mut cur = Some(scope);
        while let Some(ScopeHandle(idx)) = cur {
            let node = &self.scopes[idx];
            if node.frozen.contains(name) {
                return true;
            }
            cur = node.parent;
        }
        false
    }

    fn new_scope(&mut self, parent: Option<ScopeHandle>) -> ScopeHandle {
        self.scopes.push(ScopeNode { parent, taken: HashSet::new(), frozen: HashSet::new() });
        self.next_short.push(0);
        ScopeHandle(self.scopes.len() - 1)
    }
}
