use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

mod casm;
mod compile;
mod error;
mod intrinsics;
mod lex;
mod parse;
mod peephole;
mod preprocess;
mod token;
mod typectx;

#[cfg(test)]
mod tests;

use compile::CompileOptions;

/// Compile blended C/C++/Python sources into CASM stack bytecode.
#[derive(Parser, Debug)]
#[command(name = "soulc", version, about, long_about = None)]
struct Cli {
    /// Input source file
    input: PathBuf,

    /// Output path (defaults to the input with a .casm extension)
    #[arg(short = 'o', long = "out", value_name = "PATH")]
    out: Option<PathBuf>,

    /// Output path as a second positional argument
    #[arg(value_name = "OUTPUT")]
    output_pos: Option<PathBuf>,

    /// Additional include search paths (repeatable)
    #[arg(short = 'I', value_name = "PATH", action = clap::ArgAction::Append)]
    include: Vec<PathBuf>,

    /// Verbose parse trace on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Force indentation-mode lexing
    #[arg(long, conflicts_with = "cpp")]
    python: bool,

    /// Force brace-mode lexing
    #[arg(long)]
    cpp: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version render on stdout and exit 0; real usage
            // errors exit 1.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    // Lowering is best-effort and should never panic; if it does anyway,
    // report and exit 1 like any other compilation failure.
    match std::panic::catch_unwind(|| run(cli)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("error: internal compiler error");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let python_mode = if cli.python {
        true
    } else if cli.cpp {
        false
    } else {
        compile::python_mode_for_path(&cli.input)
    };

    let opts = CompileOptions {
        include_paths: cli.include,
        python_mode,
        verbose: cli.verbose,
    };

    let program = compile::compile_file(&cli.input, &opts)?;

    let out = cli.out.or(cli.output_pos).unwrap_or_else(|| {
        let mut p = cli.input.clone();
        p.set_extension("casm");
        p
    });
    compile::write_artifact_file(&out, &program.code)?;

    if cli.verbose {
        eprintln!(
            "soulc: wrote {} ({} bytes, {} symbols)",
            out.display(),
            program.code.len() + 4,
            program.symbols.len()
        );
    }
    Ok(())
}
