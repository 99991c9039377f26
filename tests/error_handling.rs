//! Binary-adjacent call sites that need to aggregate this crate's error into
//! a wider failure type. No binary ships in this crate, so this integration
//! suite stands in for one: each helper wraps a `valuegraph::Error` in
//! `anyhow::anyhow!`, the way the teacher's `api.rs` one-shot helpers wrap
//! `scheduler`/`prove` errors before handing them to a caller that doesn't
//! care about the specific variant, only the message.

mod support;

use support::mock_runtime::{int, MapRegistry, MockArray, MockFunction};
use valuegraph::{serialize, GlobalTable, Output, SerializeOptions};

/// Stands in for a binary's top-level `main`-style entry point: reduces
/// every `valuegraph::Error` to a single contextualized `anyhow::Error`.
fn serialize_or_report(
    root: &valuegraph::ValueHandle,
    closures: &dyn valuegraph::ClosureRegistry,
) -> anyhow::Result<String> {
    let globals = GlobalTable::builder().build();
    let options = SerializeOptions::builder().build().map_err(|e| anyhow::anyhow!("option conflict: {e}"))?;
    match serialize(root, &globals, closures, options).map_err(|e| anyhow::anyhow!("serialize failed: {e}"))? {
        Output::Text(s) => Ok(s),
        Output::Artifacts(_) => Err(anyhow::anyhow!("expected a single text artifact")),
    }
}

#[test]
fn missing_closure_metadata_surfaces_through_anyhow() -> anyhow::Result<()> {
    // No `registry.insert(7, ...)` call — the registry has no entry at all
    // for this function, which the tracer treats as fatal (spec kind 2)
    // rather than guessing the function captures nothing.
    let registry = MapRegistry::new();
    let f = MockFunction::new(7, "() { }");

    let err = serialize_or_report(&f.handle(), &registry).unwrap_err();
    assert!(err.to_string().contains("serialize failed"));
    assert!(err.to_string().contains("missing closure metadata"));
    Ok(())
}

#[test]
fn well_formed_value_serializes_cleanly_through_anyhow() -> anyhow::Result<()> {
    let arr = MockArray::new(1);
    arr.push(int(1, 101));
    let registry = MapRegistry::new();

    let text = serialize_or_report(&arr.handle(), &registry)?;
    assert_eq!(text, "const a = [1];\na");
    Ok(())
}
