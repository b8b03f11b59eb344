use anyhow::{Context, Result};
use codeforge_core::{compile_with, Options};
use std::{
    env,
    io::{stdin, stdout, Write},
    path::Path,
};

fn read_line() -> Option<String> {
    let mut s = String::new();
    match stdin().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            if let Some('\n') = s.chars().next_back() {
                s.pop();
            }
            if let Some('\r') = s.chars().next_back() {
                s.pop();
            }
            Some(s)
        }
    }
}

fn eval(input: &str) {
    let mut prompt = |message: &str| {
        print!("{message} ");
        let _ = stdout().flush();
        read_line()
    };
    let result = compile_with(
        input,
        &Options::default(),
        &mut |line: &str| println!("{line}"),
        &mut prompt,
    );
    for error in &result.errors {
        println!("{error}");
    }
}

fn main() -> Result<()> {
    let args: Vec<_> = env::args().collect();
    // read from input file
    if args.len() > 1 {
        let code = std::fs::read_to_string(Path::new(&args[1]))
            .with_context(|| format!("Failed to open {}", args[1]))?;
        eval(&code);
        return Ok(());
    }

    // read from stdin, one program per line
    loop {
        print!("Enter statements: ");
        stdout().flush()?;
        match read_line() {
            Some(s) if !s.is_empty() => eval(&s),
            _ => break,
        }
    }
    Ok(())
}
