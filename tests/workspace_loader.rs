use std::path::PathBuf;

use callgraph_dot::domain::callgraph::CallGraph;
use callgraph_dot::error::LoadError;
use callgraph_dot::infrastructure::{SynCallGraphBuilder, WorkspaceLoader};
use callgraph_dot::ports::{CallGraphBuilder, ProgramLoader};

fn fixture(rel: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(rel)
        .display()
        .to_string()
}

fn callees<'a>(cg: &'a CallGraph, caller: &str) -> Vec<&'a str> {
    cg.callees(caller)
        .unwrap_or_else(|| panic!("{caller} missing from {:?}", cg.callers().collect::<Vec<_>>()))
        .iter()
        .map(|d| d.callee.as_str())
        .collect()
}

fn load_all() -> CallGraph {
    let loader = WorkspaceLoader::from_pattern(&format!("{}/...", fixture("workspace")));
    let program = loader.load().expect("fixture workspace loads");
    SynCallGraphBuilder::new().build_call_graph(&program)
}

#[test]
fn loads_every_member_with_module_paths() {
    let loader = WorkspaceLoader::from_pattern(&format!("{}/...", fixture("workspace")));
    let program = loader.load().unwrap();

    let mut modules: Vec<String> = program.units.iter().map(|u| u.module_key()).collect();
    modules.sort();
    assert_eq!(modules, vec!["bin_demo", "lib_base", "lib_trait", "lib_trait::ops"]);
}

#[test]
fn cross_crate_calls_resolve_through_reexports() {
    let cg = load_all();

    assert_eq!(
        callees(&cg, "bin_demo.main"),
        vec![
            "lib_trait::ops.new",
            "bin_demo.run_trait",
            "bin_demo.run_trait",
            "lib_base.base_fn",
            "lib_base::util_mod.util_fn",
            "lib_trait.run_all",
        ]
    );
    assert_eq!(callees(&cg, "lib_base::util_mod.util_fn"), vec!["lib_base.base_fn"]);
    assert!(callees(&cg, "lib_base.base_fn").is_empty());
}

#[test]
fn trait_method_calls_name_the_trait_module() {
    let cg = load_all();
    assert_eq!(callees(&cg, "bin_demo.run_trait"), vec!["lib_trait.apply"]);
    assert_eq!(callees(&cg, "lib_trait.run_all"), vec!["lib_trait.apply"]);
    // Both impls live in one module and share one node.
    assert!(callees(&cg, "lib_trait::ops.apply").is_empty());
}

#[test]
fn labels_point_at_member_sources() {
    let cg = load_all();
    let run_trait = &cg.callees("bin_demo.run_trait").unwrap()[0];
    let file = PathBuf::from(&run_trait.file);
    assert!(file.ends_with("bin_demo/src/main.rs"), "{}", run_trait.file);
    assert_eq!((run_trait.line, run_trait.column), (5, 5));
}

#[test]
fn single_package_selection() {
    let loader = WorkspaceLoader::from_pattern(&fixture("workspace/lib_base"));
    let program = loader.load().unwrap();
    let modules: Vec<String> = program.units.iter().map(|u| u.module_key()).collect();
    assert_eq!(modules, vec!["lib_base"]);
}

#[test]
fn pattern_without_packages_is_fatal() {
    let loader = WorkspaceLoader::from_pattern(&fixture("workspace/Cargo.toml"));
    let err = loader.load().unwrap_err();
    assert!(matches!(err, LoadError::NoPackages(_)), "{err}");
}
