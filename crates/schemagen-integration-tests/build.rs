//! Generates the fixture packages the tests `include!`.
//!
//! - `OUT_DIR/per_type`: `fixtures/schemas` in the per-type layout.
//! - `OUT_DIR/bundled`: `fixtures/schemas` in the bundled layout.
//! - `OUT_DIR/recursive`: `fixtures/recursive` in the bundled layout.

use std::env;
use std::path::PathBuf;

use schemagen_codegen::{generate, GenerateOptions, Layout};

fn main() {
    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").unwrap_or_default());
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap_or_default());
    let fixtures = manifest_dir.join("fixtures");
    println!("cargo:rerun-if-changed={}", fixtures.display());

    let runs = [
        ("schemas", Layout::PerType, "per_type"),
        ("schemas", Layout::Bundled, "bundled"),
        ("recursive", Layout::Bundled, "recursive"),
    ];
    for (input, layout, output) in runs {
        let options = GenerateOptions::new(fixtures.join(input))
            .with_layout(layout)
            .with_output_dir(out_dir.join(output))
            .with_package_name(format!("fixture-{output}"));
        if let Err(e) = generate(&options) {
            panic!("generating {output} from fixtures/{input}: {e}");
        }
    }
}
