use codeforge_vm::{DEFAULT_MAX_STEPS, VM};
use serde::{Deserialize, Serialize};

use super::{
    backends::{AssemblyBackend, Backend, Tac, TacBackend},
    compiler,
    diagnostics::{Diagnostic, Phase},
    parser, semantic,
    symbols::{self, SymbolTable},
    tokens::{self, TokenSpan},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Instructions the VM may execute before the run is aborted.
    pub max_steps: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Everything one compile-and-run produced. Assembly, IR and output stay empty
/// unless the lexical, syntax and semantic phases found nothing.
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    pub tokens: Vec<TokenSpan>,
    pub symbols: SymbolTable,
    pub errors: Vec<Diagnostic>,
    pub assembly: String,
    pub ir: Vec<Tac>,
    pub output: Vec<String>,
}

impl CompileResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub fn compile(source: &str) -> CompileResult {
    compile_with(
        source,
        &Options::default(),
        &mut |_: &str| {},
        &mut |_: &str| -> Option<String> { None },
    )
}

/// Runs the whole pipeline. Every line the program prints is handed to `print`
/// as soon as the VM produces it, and is also kept in [`CompileResult::output`].
pub fn compile_with(
    source: &str,
    options: &Options,
    print: &mut dyn FnMut(&str),
    prompt: &mut dyn FnMut(&str) -> Option<String>,
) -> CompileResult {
    let (tokens, mut errors) = tokens::tokenize(source);
    let parsed = parser::parse(&tokens);
    errors.extend(parsed.errors);
    let symbols = symbols::build(&tokens, &symbols::builtin_names());
    errors.extend(semantic::analyze(&symbols, &tokens));

    let mut result = CompileResult {
        tokens,
        symbols,
        errors,
        assembly: String::new(),
        ir: vec![],
        output: vec![],
    };
    if result.has_errors() {
        return result;
    }

    let instructions = compiler::compile(&parsed.program, &result.symbols);
    let mut assembly = AssemblyBackend::default();
    assembly.process(instructions.clone());
    let mut tac = TacBackend::default();
    tac.process(instructions);
    result.assembly = assembly.text();
    result.ir = tac.code;

    let mut output = vec![];
    let run = {
        let mut print = |line: String| {
            print(&line);
            output.push(line);
        };
        VM::new(&mut print, prompt)
            .with_max_steps(options.max_steps)
            .eval(&result.assembly)
    };
    result.output = output;
    if let Err(e) = run {
        result
            .errors
            .push(Diagnostic::new(Phase::Runtime, e.to_string(), None));
    }
    result
}
