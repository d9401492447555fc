//! Builds two content units, merges them and tangles a file from a child
//! scope that inserts into an inherited fragment.
//!
//! Run with `cargo run -p litloom --example from_fragments`.

use litloom::{
    LitloomError, Tangler,
    fragment::{NewFragment, Operation, Placement},
    identifier::Id,
    location::SourceLocation,
    registry::Registry,
};

fn base_unit() -> Result<Registry, LitloomError> {
    let mut registry = Registry::new();
    registry.register_fragment(
        NewFragment::new("file:main.c", SourceLocation::new("base", 1))
            .with_scope(Some("tutorial"))
            .with_lexer("c")
            .with_lines(["#include <stdio.h>", "", "int main() {", "    {{Main content}}", "}"]),
        Operation::New,
    )?;
    registry.register_fragment(
        NewFragment::new("Main content", SourceLocation::new("base", 9))
            .with_scope(Some("tutorial"))
            .with_lines(["printf(\"Hello\\n\");", "return 0;"]),
        Operation::New,
    )?;
    Ok(registry)
}

fn extension_unit() -> Result<Registry, LitloomError> {
    let mut registry = Registry::new();
    registry.set_parent("step-2", "tutorial", SourceLocation::new("extension", 1))?;
    registry.register_fragment(
        NewFragment::new("Goodbye", SourceLocation::new("extension", 3))
            .with_scope(Some("step-2"))
            .with_lines(["printf(\"Goodbye\\n\");"]),
        Operation::insert("Main content", Placement::Before, "return"),
    )?;
    Ok(registry)
}

fn main() -> Result<(), LitloomError> {
    let mut registry = base_unit()?;
    registry.merge(extension_unit()?)?;
    let registry = registry.freeze()?;

    let tangler = Tangler::default();
    for scope in ["tutorial", "step-2"] {
        println!("== {scope} ==");
        for file in tangler.tangle_files(&registry, Some(Id::new(scope)))? {
            println!("-- {}", file.path());
            print!("{}", file.contents());
        }
    }
    Ok(())
}
