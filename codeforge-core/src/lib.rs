mod compiler;
mod op;
mod parser;
mod semantic;
mod tests;

pub mod backends;
pub mod diagnostics;
pub mod symbols;
pub mod tokens;
pub mod toolchain;

pub use toolchain::{compile, compile_with, CompileResult, Options};
