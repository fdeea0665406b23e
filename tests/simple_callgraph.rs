use std::path::Path;

use callgraph_dot::domain::unit::{CompilationUnit, Program};
use callgraph_dot::infrastructure::SynCallGraphBuilder;
use callgraph_dot::ports::CallGraphBuilder;

fn unit(crate_name: &str, file: &str, src: &str) -> CompilationUnit {
    CompilationUnit::parse(crate_name, vec![crate_name.to_string()], Path::new(file), src).unwrap()
}

#[test]
fn node_ids_include_crate_names() {
    // Build an in-memory set of source files across two crates
    let crate_one = r#"
        fn foo() {}
        fn bar() { foo(); }
    "#;
    let crate_two = r#"
        fn foo() {}
        fn baz() { crate_one::exported(); crate_one::foo(); }
    "#;
    let crate_one_extra = "pub fn exported() {}\n";

    let program = Program::new(
        vec![
            unit("crate_one", "one/lib.rs", &format!("{crate_one}{crate_one_extra}")),
            unit("crate_two", "two/lib.rs", crate_two),
        ],
        &[],
    );
    let cg = SynCallGraphBuilder::new().build_call_graph(&program);
    let ids: Vec<&str> = cg.callers().collect();

    assert_eq!(
        ids,
        vec!["crate_one.foo", "crate_one.bar", "crate_one.exported", "crate_two.foo", "crate_two.baz"]
    );

    // Same-named functions in different crates stay apart.
    let bar: Vec<&str> = cg.callees("crate_one.bar").unwrap().iter().map(|d| d.callee.as_str()).collect();
    assert_eq!(bar, vec!["crate_one.foo"]);

    // `crate_one::foo` is private to crate_one: no edge, no error.
    let baz: Vec<&str> = cg.callees("crate_two.baz").unwrap().iter().map(|d| d.callee.as_str()).collect();
    assert_eq!(baz, vec!["crate_one.exported"]);
}

#[test]
fn leaf_and_caller_with_call_site() {
    let src = "fn a() {\n    b()\n}\n\nfn b() {}\n";
    let program = Program::new(vec![unit("example", "example.rs", src)], &[]);
    let cg = SynCallGraphBuilder::new().build_call_graph(&program);

    let calls = cg.callees("example.a").unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].callee, "example.b");
    assert_eq!(calls[0].label(), "example.rs:2:5");
    assert!(cg.callees("example.b").unwrap().is_empty());
    assert_eq!(cg.len(), 2);
}
