//! The minc driver binary.
//!
//! Reads a source file (or stdin), compiles it to SSA, verifies, and
//! optionally renders the result. Exit code 0 on success, 1 on any
//! compile error, 2 on I/O failure. Log verbosity follows `RUST_LOG`.

use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use minc_core::{dump, TypeTable};

/// Compiler front end: source text to verified SSA.
#[derive(Parser)]
#[command(name = "minc", about = "minc compiler front end")]
struct Cli {
    /// Source file, or `-` for stdin.
    input: PathBuf,

    /// Print the textual IR after compilation.
    #[arg(long)]
    dump: bool,

    /// Print the IR as JSON instead of the textual form.
    #[arg(long)]
    json: bool,

    /// Echo the source as it is consumed.
    #[arg(long)]
    dump_source: bool,

    /// Skip the IR verifier.
    #[arg(long)]
    no_verify: bool,
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let source = match read_source(&cli.input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: can't read {}: {}", cli.input.display(), e);
            return 2;
        }
    };

    let mut types = TypeTable::new();
    let func = match minc_front::parse(&mut types, &source, cli.dump_source) {
        Ok(func) => func,
        Err(e) => {
            eprintln!("{}: {}", cli.input.display(), e);
            return 1;
        }
    };

    if !cli.no_verify {
        func.verify(&types);
    }
    tracing::info!(
        blocks = func.block_count(),
        insts = func.inst_count(),
        "compiled {}",
        cli.input.display()
    );

    if cli.json {
        match serde_json::to_string_pretty(&func) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: can't serialize the function: {e}");
                return 2;
            }
        }
    } else if cli.dump {
        println!("{}", dump(&func, &types));
    }
    0
}

fn read_source(path: &PathBuf) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
    }
}
