//! `valuegraph` — serializes a live in-memory value graph into a
//! self-contained reconstruction program.
//!
//! This module is the single canonical entry point for downstream users:
//! it re-exports the collaborator traits a host must implement
//! ([`value::IntrospectedValue`], [`closure::ClosureRegistry`],
//! [`allocator::IdentifierAllocator`]), the configuration surface
//! ([`options::SerializeOptions`]), and the crate-wide [`error::Error`].
//!
//! ## Invariants
//!
//! - **Identity-stable.** Every source value is represented by exactly one
//!   [`record::Record`], keyed by the introspector's reported identity; two
//!   references to the same live value in the source graph become two
//!   references to the same binding in the output, never two copies.
//! - **Deterministic.** Record ids are assigned in strict discovery order
//!   (depth-first, left-to-right); the same input value graph produces
//!   byte-identical output across runs.
//! - **No unsafe.** We `forbid(unsafe_code)` throughout the crate.
//! - **Fatal-only errors.** Every error variant in [`error::Error`] aborts
//!   the current [`api::serialize`] call outright; there is no partial or
//!   best-effort output.
//!
//! If any invariant is violated at runtime, the failure mode is a precise
//! [`error::Error`], never a panic or silently wrong output.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs)]

/// Identifier allocator (§4.1): produces short, legal, collision-free names.
pub mod allocator;
/// Crate entry point: wires tracing, cycle breaking, scheduling, and emission together.
pub mod api;
/// Closure registry collaborator and scope reifier (§4.5).
pub mod closure;
/// Dependency graph construction and cycle breaker (§4.6).
pub mod depgraph;
/// Emission planner (§4.8): abstract `Expr`/`Stmt` output plan.
pub mod emitter;
/// Crate-wide error type and trace breadcrumb (§7).
pub mod error;
/// Global resolver (§4.4): host intrinsics reachable without serializing data.
pub mod globals;
/// Stable integer ids for the record arena.
pub mod ids;
/// `SerializeOptions` and its builder (§6).
pub mod options;
/// Built-in test-support printer (not part of the core surface; see DESIGN.md).
pub mod printer;
/// The record arena (§3) and its lifecycle invariants.
pub mod record;
/// Topological scheduler (§4.7).
pub mod scheduler;
/// The tracer (§4.3): walks from the root and produces records.
pub mod tracer;
/// Value introspector adapter (§4.2) and the value kind taxonomy (§3).
pub mod value;

pub use api::{serialize, serialize_to_plan, Artifact, ArtifactKind, Output};
pub use closure::{CapturedBinding, CapturedEnvEntry, ClosureInfo, ClosureRegistry};
pub use error::{Breadcrumb, BreadcrumbSegment, Error, Result};
pub use globals::{GlobalPath, GlobalRow, GlobalTable, GlobalTableBuilder};
pub use ids::{GlobalId, PropKey, RecordId, ScopeId, SlotPath, SlotStep};
pub use options::{OutputFormat, SerializeOptions, SerializeOptionsBuilder};
pub use value::{
    Classification, ClassifiedPrimitive, FunctionKind, Identity, IntrinsicSlots,
    IntrospectedValue, OwnProperty, PropertyDescriptor, PropertyValueKind, ValueHandle, ValueKind,
};
