mod semantic;
mod symbols;
mod tokens;
mod toolchain;
