//! Crate entry point (§6): wires the five internal stages into one call.
//!
//! `serialize` owns nothing past the call itself — every collaborator
//! (`GlobalTable`, `ClosureRegistry`, the identifier allocator) is supplied
//! or selected by the caller, the way the teacher crate's
//! `scheduler::Prover` takes its `AirSpec`/`ProveParams` rather than
//! constructing them internally. `GlobalTable` in particular is built once
//! per embedding engine (§4.4) and is expected to outlive any single call,
//! so it is a borrowed parameter here rather than something `serialize`
//! could plausibly own.

#![forbid(unsafe_code)]

use tracing::{debug, info_span};

use crate::allocator::{DefaultAllocator, IdentifierAllocator};
use crate::closure::ClosureRegistry;
use crate::depgraph::break_cycles;
use crate::emitter::{self, EmissionPlan};
use crate::error::Result;
use crate::globals::GlobalTable;
use crate::ids::RecordId;
use crate::options::SerializeOptions;
use crate::printer;
use crate::scheduler::schedule;
use crate::tracer::Tracer;
use crate::value::ValueHandle;

/// One named artifact of a multi-file emission (§6 "Output").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The reconstruction program itself.
    Entry,
    /// A source map accompanying the entry artifact.
    SourceMap,
    /// Reserved for future diagnostic/statistics output; unused today.
    Stats,
}

/// One file of a multi-artifact [`Output`].
#[derive(Clone, Debug)]
pub struct Artifact {
    /// What this artifact is.
    pub kind: ArtifactKind,
    /// Short logical name (e.g. `"entry"`, `"source-map"`).
    pub name: String,
    /// Suggested filename, honoring `options.ext`/`options.map_ext`.
    pub filename: String,
    /// The artifact's full text content.
    pub content: String,
}

/// The result of a `serialize()` call: either a single rendered string, or
/// a multi-artifact bundle (entry program plus a source map) when
/// `options.produce_source_map` is set.
#[derive(Clone, Debug)]
pub enum Output {
    /// A single self-contained program, no source map requested.
    Text(String),
    /// Entry program plus accompanying artifacts (e.g. a source map).
    Artifacts(Vec<Artifact>),
}

/// Runs the full pipeline (trace → dependency graph → cycle breaking →
/// schedule → emission planning) and returns the abstract plan without
/// rendering it to text.
///
/// This is the seam an external syntax-tree printer hooks into (§1
/// explicitly keeps the printer out of this crate's scope); [`serialize`]
/// is a thin convenience wrapper around this plus the crate's bundled
/// test-support printer.
pub fn serialize_to_plan(
    root: &ValueHandle,
    globals: &GlobalTable,
    closures: &dyn ClosureRegistry,
    options: &SerializeOptions,
) -> Result<EmissionPlan> {
    let span = info_span!("serialize", format = ?options.format, exec = options.exec);
    let _enter = span.enter();

    let mut allocator = DefaultAllocator::new(options.mangle);

    let (store, root_id, root_scope) = {
        let span = info_span!("trace");
        let _enter = span.enter();
        let mut tracer = Tracer::new(globals, closures, &mut allocator);
        let root_id = tracer.trace_root(root)?;
        debug!(records = tracer.store.len(), "trace complete");
        (tracer.store, root_id, tracer.root_scope())
    };

    emit_from_store(store, root_id, root_scope, &mut allocator, options)
}

fn emit_from_store(
    mut store: crate::record::RecordStore,
    root_id: RecordId,
    root_scope: crate::allocator::ScopeHandle,
    allocator: &mut dyn IdentifierAllocator,
    options: &SerializeOptions,
) -> Result<EmissionPlan> {
    let post_hoc = {
        let span = info_span!("reify_scopes");
        let _enter = span.enter();
        let post_hoc = break_cycles(&mut store);
        debug!(assignments = post_hoc.len(), "cycle breaking complete");
        post_hoc
    };

    let order = {
        let span = info_span!("schedule");
        let _enter = span.enter();
        schedule(&store, post_hoc)?
    };

    let span = info_span!("emit");
    let _enter = span.enter();
    emitter::plan_emission(&store, order, root_id, allocator, root_scope, options)
}

/// Runs the pipeline and renders the result with the crate's built-in
/// test-support printer (DESIGN.md marks `printer` as test-support, not
/// core surface — a production embedder supplies its own syntax-tree
/// printer and should call [`serialize_to_plan`] directly instead).
pub fn serialize(
    root: &ValueHandle,
    globals: &GlobalTable,
    closures: &dyn ClosureRegistry,
    options: SerializeOptions,
) -> Result<Output> {
    let plan = serialize_to_plan(root, globals, closures, &options)?;
    let text = printer::render(&plan);

    if !options.produce_source_map {
        return Ok(Output::Text(text));
    }

    Ok(Output::Artifacts(vec![
        Artifact {
            kind: ArtifactKind::Entry,
            name: "entry".to_string(),
            filename: format!("output.{}", options.ext),
            content: text,
        },
        Artifact {
            kind: ArtifactKind::SourceMap,
            name: "source-map".to_string(),
            filename: format!("output.{}", options.map_ext),
            content: printer::empty_source_map(),
        },
    ]))
}
