use codeforge_core::compile;
use wasm_bindgen::prelude::*;

/// Runs the whole pipeline and returns the compile result as JSON: tokens,
/// symbols, diagnostics, assembly, three-address code and program output.
#[wasm_bindgen]
pub fn compile_json(source: String) -> Result<String, String> {
    compile(&source)
        .to_json()
        .map_err(|e| format!("Error: {e}"))
}

#[wasm_bindgen]
pub fn get_cfc_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
