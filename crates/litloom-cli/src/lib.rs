//! CLI logic for the litloom tangler.
//!
//! Each content unit manifest is loaded into its own registry, the
//! registries are merged in the order given on the command line, and the
//! frozen result is tangled.

pub mod error_adapter;

mod args;
mod config;
mod manifest;

pub use args::Args;
pub use manifest::Manifest;

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use log::info;

use litloom::{LitloomError, Tangler, identifier::Id, registry::Registry};

/// Run the litloom CLI application
///
/// This function builds the registry of every content unit, merges them and
/// then lists, tangles one root, or writes every `file:` fragment of the
/// selected scope.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `LitloomError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed content units
/// - Registry conflicts and unresolved overrides
/// - Tangling errors
pub fn run(args: &Args) -> Result<(), LitloomError> {
    info!(units = args.units.len(); "Processing content units");

    let app_config = config::load_config(args.config.as_ref())?;
    let syntax = app_config.reference_syntax()?;

    let mut registry = Registry::new();
    for unit in &args.units {
        let source = fs::read_to_string(unit)?;
        let unit_registry = Manifest::parse(unit, &source)?.into_registry(&syntax)?;
        registry.merge(unit_registry)?;
    }
    let registry = registry.freeze()?;

    let scope = args.scope.as_deref().map(Id::new);
    let tangler = Tangler::new(app_config);

    if args.list {
        let mut stdout = io::stdout().lock();
        for id in registry.visible_fragments(scope) {
            if let Some(fragment) = registry.fragment(id) {
                writeln!(stdout, "{}", fragment.name())?;
            }
        }
        return Ok(());
    }

    match &args.root {
        Some(root) => {
            let lines = tangler.tangle(&registry, root.as_str(), scope)?;
            let contents: String = lines.iter().map(|line| format!("{line}\n")).collect();
            match &args.output {
                Some(output) => {
                    fs::write(output, contents)?;
                    info!(output_file = output; "Fragment written");
                }
                None => io::stdout().lock().write_all(contents.as_bytes())?,
            }
        }
        None => {
            let out_dir = Path::new(&args.out_dir);
            for file in tangler.tangle_files(&registry, scope)? {
                let path = out_dir.join(file.path());
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, file.contents())?;
                info!(output_file = path.display().to_string(); "File written");
            }
        }
    }

    Ok(())
}
