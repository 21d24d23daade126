// Build script for bridge-test-utils
// Generates the fixture's C header using cbindgen

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-changed=src");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let output_path = PathBuf::from(&crate_dir).join("include/bridge_fixture.h");

    std::fs::create_dir_all(output_path.parent().unwrap()).ok();

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(cbindgen::Config::from_file("cbindgen.toml").unwrap_or_default())
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&output_path);
        }
        Err(e) => {
            // The header is informational for the fixture; tests load symbols directly.
            println!("cargo:warning=Failed to generate C header: {}", e);
        }
    }
}
