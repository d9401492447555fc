//! Integration tests for the Tangler API

use litloom::{
    LitloomError, Tangler,
    config::{AppConfig, ReferenceConfig},
    fragment::{NewFragment, Operation, Placement},
    identifier::Id,
    location::SourceLocation,
    registry::{FrozenRegistry, Registry},
};
use litloom_core::error::ErrorCode;

fn block(name: &str, scope: Option<&str>, lines: &[&str]) -> NewFragment {
    NewFragment::new(name, SourceLocation::new("doc", 1))
        .with_scope(scope)
        .with_lines(lines.iter().copied())
}

fn freeze(registry: Registry) -> FrozenRegistry {
    registry.freeze().expect("Registry should have no pending override")
}

fn error_code(err: &LitloomError) -> Option<ErrorCode> {
    err.diagnostics().first().and_then(|diagnostic| diagnostic.code())
}

fn program() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_fragment(
            block(
                "file:main.c",
                None,
                &["{{Includes}}", "", "int main() {", "    {{Main content}}", "}"],
            ),
            Operation::New,
        )
        .expect("Failed to register");
    registry
        .register_fragment(block("Includes", None, &["#include <stdio.h>"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(
            block("Main content", None, &["{{Greeting}}", "return 0;"]),
            Operation::New,
        )
        .expect("Failed to register");
    registry
        .register_fragment(
            block("Greeting", None, &["printf(\"Hello\\n\");"]),
            Operation::New,
        )
        .expect("Failed to register");
    registry
}

#[test]
fn test_tangle_resolves_nested_references() {
    let registry = freeze(program());

    let lines = Tangler::default()
        .tangle(&registry, "file:main.c", None)
        .expect("Failed to tangle");

    assert_eq!(
        lines,
        [
            "#include <stdio.h>",
            "",
            "int main() {",
            "    printf(\"Hello\\n\");",
            "    return 0;",
            "}",
        ]
    );
}

#[test]
fn test_tangle_is_idempotent() {
    let registry = freeze(program());
    let tangler = Tangler::default();

    let first = tangler
        .tangle(&registry, "file:main.c", None)
        .expect("Failed to tangle");
    let second = tangler
        .tangle(&registry, "file:main.c", None)
        .expect("Failed to tangle");

    assert_eq!(first, second);
}

#[test]
fn test_content_keeps_references() {
    let registry = freeze(program());

    let lines = Tangler::default()
        .content(&registry, "Main content", None)
        .expect("Failed to expand");

    assert_eq!(lines, ["{{Greeting}}", "return 0;"]);
}

#[test]
fn test_tangle_missing_root() {
    let registry = freeze(program());

    let err = Tangler::default()
        .tangle(&registry, "file:missing.c", None)
        .unwrap_err();

    assert_eq!(error_code(&err), Some(ErrorCode::E200));
}

#[test]
fn test_tangle_missing_reference() {
    let mut registry = Registry::new();
    registry
        .register_fragment(
            NewFragment::new("Main", SourceLocation::new("doc", 12)).with_lines(["{{Nowhere}}"]),
            Operation::New,
        )
        .expect("Failed to register");
    let registry = freeze(registry);

    let err = Tangler::default().tangle(&registry, "Main", None).unwrap_err();

    assert_eq!(error_code(&err), Some(ErrorCode::E200));
    let location = err.diagnostics()[0].primary_location().expect("location");
    assert_eq!(location.line(), 12);
}

#[test]
fn test_tangle_cyclic_reference() {
    let mut registry = Registry::new();
    registry
        .register_fragment(block("A", None, &["{{B}}"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("B", None, &["  {{A}}"]), Operation::New)
        .expect("Failed to register");
    let registry = freeze(registry);

    let err = Tangler::default().tangle(&registry, "A", None).unwrap_err();

    assert_eq!(error_code(&err), Some(ErrorCode::E202));
}

#[test]
fn test_tangle_self_insertion_is_cyclic() {
    let mut registry = Registry::new();
    registry
        .register_fragment(block("X", None, &["x"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(
            block("Y", None, &["y"]),
            Operation::insert("X", Placement::After, "x"),
        )
        .expect("Failed to register");
    registry
        .register_fragment(
            block("Z", None, &["z"]),
            Operation::insert("Y", Placement::After, "y"),
        )
        .expect("Failed to register");
    registry
        .register_fragment(block("Z", None, &["{{X}}"]), Operation::Append)
        .expect("Failed to register");
    let registry = freeze(registry);

    let err = Tangler::default().tangle(&registry, "X", None).unwrap_err();

    assert_eq!(error_code(&err), Some(ErrorCode::E202));
}

#[test]
fn test_prefix_propagates_to_every_line() {
    let mut registry = Registry::new();
    registry
        .register_fragment(block("Outer", None, &["> {{Inner}}"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("Inner", None, &["a", "- {{Leaf}}"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("Leaf", None, &["1", "2"]), Operation::New)
        .expect("Failed to register");
    let registry = freeze(registry);

    let lines = Tangler::default()
        .tangle(&registry, "Outer", None)
        .expect("Failed to tangle");

    assert_eq!(lines, ["> a", "> - 1", "> - 2"]);
}

#[test]
fn test_tangle_from_child_scope_uses_overrides() {
    let mut registry = Registry::new();
    registry
        .set_parent("B", "A", SourceLocation::unknown())
        .expect("Failed to set parent");
    registry
        .register_fragment(block("file:app.py", Some("A"), &["{{Body}}"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("Body", Some("A"), &["print('a')"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("Body", Some("B"), &["print('b')"]), Operation::Append)
        .expect("Failed to register");
    let registry = freeze(registry);
    let tangler = Tangler::default();

    let from_a = tangler
        .tangle(&registry, "file:app.py", Some(Id::new("A")))
        .expect("Failed to tangle");
    let from_b = tangler
        .tangle(&registry, "file:app.py", Some(Id::new("B")))
        .expect("Failed to tangle");

    assert_eq!(from_a, ["print('a')"]);
    assert_eq!(from_b, ["print('a')", "print('b')"]);
}

#[test]
fn test_tangle_from_child_scope_ignores_unrelated_new() {
    let mut registry = Registry::new();
    registry
        .set_parent("B", "A", SourceLocation::unknown())
        .expect("Failed to set parent");
    registry
        .register_fragment(block("file:app.py", Some("A"), &["{{Body}}"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("Body", Some("A"), &["print('a')"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("Body", Some("B"), &["print('b')"]), Operation::New)
        .expect("Failed to register");
    let registry = freeze(registry);

    let lines = Tangler::default()
        .tangle(&registry, "file:app.py", Some(Id::new("B")))
        .expect("Failed to tangle");

    assert_eq!(lines, ["print('a')"]);
}

#[test]
fn test_inherited_files() {
    let mut registry = Registry::new();
    registry
        .set_parent("B", "A", SourceLocation::unknown())
        .expect("Failed to set parent");
    registry
        .register_fragment(block("file:foo.txt", Some("A"), &["Lorem ipsum"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("file: bar.txt ", None, &["Dolor sit amet"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("Helper", None, &["unused"]), Operation::New)
        .expect("Failed to register");

    assert_eq!(
        registry.lookup_recursive(Id::new("file: bar.txt "), Some(Id::new("A")), None),
        None
    );
    let scopes = registry.scopes();
    assert!(scopes.contains(&Some(Id::new("A"))));
    assert!(scopes.contains(&Some(Id::new("B"))));
    assert!(scopes.contains(&None));

    let registry = freeze(registry);
    let tangler = Tangler::default();

    let files_a = tangler
        .tangle_files(&registry, Some(Id::new("A")))
        .expect("Failed to tangle");
    let files_b = tangler
        .tangle_files(&registry, Some(Id::new("B")))
        .expect("Failed to tangle");
    let files_default = tangler.tangle_files(&registry, None).expect("Failed to tangle");

    assert_eq!(files_a.len(), 1);
    assert_eq!(files_a[0].path(), "foo.txt");
    assert_eq!(files_a[0].lines(), ["Lorem ipsum"]);
    assert_eq!(files_b, files_a);
    assert_eq!(files_default.len(), 1);
    assert_eq!(files_default[0].path(), "bar.txt");
    assert_eq!(files_default[0].contents(), "Dolor sit amet\n");
}

#[test]
fn test_custom_delimiters() {
    let mut registry = Registry::new();
    registry
        .register_fragment(block("Main", None, &["  <<Body>>", "{{Body}}"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(block("Body", None, &["x"]), Operation::New)
        .expect("Failed to register");
    let registry = freeze(registry);

    let tangler = Tangler::new(AppConfig::new(ReferenceConfig::new("<<", ">>")));
    let lines = tangler.tangle(&registry, "Main", None).expect("Failed to tangle");

    assert_eq!(lines, ["  x", "{{Body}}"]);
}

#[test]
fn test_invalid_delimiters() {
    let registry = freeze(program());

    let tangler = Tangler::new(AppConfig::new(ReferenceConfig::new("", "}}")));
    let err = tangler
        .tangle(&registry, "file:main.c", None)
        .unwrap_err();

    assert_eq!(error_code(&err), Some(ErrorCode::E300));
}

#[test]
fn test_unmatched_insertion_fails_tangle() {
    let mut registry = Registry::new();
    registry
        .register_fragment(block("Base", None, &["Hello, world"]), Operation::New)
        .expect("Failed to register");
    registry
        .register_fragment(
            block("Extra", None, &["Inserted"]),
            Operation::insert("Base", Placement::Before, "Goodbye"),
        )
        .expect("Failed to register");
    let registry = freeze(registry);

    let err = Tangler::default().tangle(&registry, "Base", None).unwrap_err();

    assert_eq!(error_code(&err), Some(ErrorCode::E201));
    assert!(err.to_string().contains("Goodbye"));
}

#[test]
fn test_frozen_registry_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FrozenRegistry>();

    let registry = freeze(program());
    let tangler = Tangler::default();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| tangler.tangle(&registry, "file:main.c", None)))
            .collect();
        for handle in handles {
            let lines = handle
                .join()
                .expect("Tangling thread panicked")
                .expect("Failed to tangle");
            assert_eq!(lines.len(), 6);
        }
    });
}
