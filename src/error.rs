//! Crate-wide error type and the trace breadcrumb it carries.
//!
//! Every fatal error surfaces the path from the root value to the value that
//! tripped it, the way the teacher crate's verify errors surface which
//! algebraic check failed rather than just "verification failed".

use std::fmt;

use crate::allocator::ScopeHandle;

/// One step of the human-readable path from the root value to a failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BreadcrumbSegment {
    Field(String),
    Index(usize),
    SymbolKey,
    ClosureCapture(String),
    Prototype,
    Root,
}

/// The location of a value relative to the serialization root, rendered as
/// `<value at .foo[2].bar>`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Breadcrumb(pub Vec<BreadcrumbSegment>);

impl Breadcrumb {
    pub fn root() -> Self {
        Breadcrumb(vec![BreadcrumbSegment::Root])
    }

    pub fn push(&self, segment: BreadcrumbSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Breadcrumb(segments)
    }
}

impl fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<value at ")?;
        for segment in self.0.iter().filter(|s| !matches!(s, BreadcrumbSegment::Root)) {
            match segment {
                BreadcrumbSegment::Field(name) => write!(f, ".{name}")?,
                BreadcrumbSegment::Index(i) => write!(f, "[{i}]")?,
                BreadcrumbSegment::SymbolKey => write!(f, "[@@symbol]")?,
                BreadcrumbSegment::ClosureCapture(name) => write!(f, "{{capture {name}}}")?,
                BreadcrumbSegment::Prototype => write!(f, ".__proto__")?,
                BreadcrumbSegment::Root => {}
            }
        }
        write!(f, ">")
    }
}

/// The five fatal error kinds of spec §7. There is no recoverable variant:
/// any of these aborts the current `serialize()` call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("unsupported value at {breadcrumb}: {reason}")]
    UnsupportedValue { breadcrumb: Breadcrumb, reason: String },

    #[error("missing closure metadata for function at {breadcrumb}")]
    MissingClosureMetadata { breadcrumb: Breadcrumb },

    #[error("option conflict: {0}")]
    OptionConflict(&'static str),

    #[error("frozen-name exhaustion in scope {scope:?}: {name}")]
    FrozenNameExhaustion { scope: ScopeHandle, name: String },

    #[error("cycle through non-rewritable slot at {breadcrumb}")]
    UnrewritableCycle { breadcrumb: Breadcrumb },
}

pub type Result<T> = std::result::Result<T, Error>;
