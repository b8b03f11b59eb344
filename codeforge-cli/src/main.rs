use anyhow::{Context, Result};
use codeforge_core::{compile_with, CompileResult, Options};
use color_print::cprintln;
use std::path::{Path, PathBuf};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Source file
    input: PathBuf,

    /// Recompile whenever the source file changes
    #[clap(short, long)]
    watch: bool,

    /// Print the token stream
    #[clap(long)]
    tokens: bool,

    /// Print the symbol table
    #[clap(long)]
    symbols: bool,

    /// Print the generated assembly
    #[clap(long)]
    asm: bool,

    /// Print the three-address code
    #[clap(long)]
    ir: bool,

    /// Print the whole compile result as JSON
    #[clap(long)]
    json: bool,

    /// Write <input>.asm and <input>.ir next to the source file
    #[clap(short, long)]
    emit: bool,

    /// Instructions the VM may execute before giving up
    #[clap(long)]
    max_steps: Option<usize>,

    /// JSON file with compiler options
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Print program output only
    #[clap(short, long)]
    quiet: bool,
}

fn load_options(args: &Args) -> Result<Options> {
    let mut options = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => Options::default(),
    };
    if let Some(max_steps) = args.max_steps {
        options.max_steps = max_steps;
    }
    Ok(options)
}

/// Answers `enter` from stdin. End of input counts as no answer.
fn stdin_prompt(message: &str) -> Option<String> {
    use std::io::{stdin, stdout, Write};

    print!("{message} ");
    let _ = stdout().flush();
    let mut line = String::new();
    match stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
    }
}

fn banner(title: &str) {
    cprintln!("<bold>== {} ==</>", title);
}

fn report(args: &Args, result: &CompileResult) -> Result<()> {
    if args.json {
        println!("{}", result.to_json()?);
        return Ok(());
    }
    if args.quiet {
        return Ok(());
    }

    if args.tokens {
        banner("Tokens");
        for token in &result.tokens {
            println!(
                "{:>4}:{:<3} {:<10} {}",
                token.line,
                token.start,
                token.kind.to_string(),
                token.lexeme
            );
        }
    }
    if args.symbols {
        banner("Symbols");
        for entry in result.symbols.entries() {
            let ty = entry
                .declared_type
                .map(|ty| ty.to_string())
                .unwrap_or_default();
            let line = entry.line.map(|l| l.to_string()).unwrap_or_default();
            println!("{:<12} {:?} {:<6} {:>4}", entry.name, entry.category, ty, line);
        }
    }
    if args.asm {
        banner("Assembly");
        println!("{}", result.assembly);
    }
    if args.ir {
        banner("Three-address code");
        for tac in &result.ir {
            println!("{tac}");
        }
    }
    for error in &result.errors {
        cprintln!("<red,bold>{}</>", error);
    }
    Ok(())
}

fn emit(path: &Path, result: &CompileResult) -> Result<()> {
    std::fs::write(path.with_extension("asm"), &result.assembly)?;
    let ir = result
        .ir
        .iter()
        .map(|tac| tac.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(path.with_extension("ir"), ir)?;
    Ok(())
}

/// Compiles and runs the input once. Returns `false` when any diagnostic was reported.
fn run(args: &Args, options: &Options) -> Result<bool> {
    let code = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    // program output goes straight to stdout so it interleaves with prompts
    let stream = !args.json;
    let result = compile_with(
        &code,
        options,
        &mut |line: &str| {
            if stream {
                println!("{line}");
            }
        },
        &mut stdin_prompt,
    );
    report(args, &result)?;
    if args.emit && !result.assembly.is_empty() {
        emit(&args.input, &result)?;
    }
    Ok(!result.has_errors())
}

fn watch(args: &Args, options: &Options) -> Result<()> {
    use std::time::{Duration, SystemTime};

    let mut last_modified = args.input.metadata()?.modified()?;

    loop {
        let metadata = args.input.metadata()?;
        if metadata.modified()? != last_modified {
            last_modified = metadata.modified()?;
            let time = SystemTime::now();
            match run(args, options) {
                Err(e) => cprintln!("<red,bold>error</>: {:#}", e),
                Ok(true) if !args.quiet => cprintln!(
                    "<green,bold>Compiled successfully</> in {}ms",
                    time.elapsed()?.as_millis()
                ),
                Ok(_) => {}
            }
        }

        std::thread::sleep(Duration::from_secs(1));
    }
}

fn main() -> Result<()> {
    use clap::Parser;

    let args = Args::parse();
    let options = load_options(&args)?;

    let ok = match run(&args, &options) {
        Ok(ok) => ok,
        Err(e) => {
            cprintln!("<red,bold>error</>: {:#}", e);
            false
        }
    };
    if args.watch {
        if !args.quiet {
            println!("Watching for changes... Press Ctrl+C to stop.");
        }
        watch(&args, &options)?;
    }
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
