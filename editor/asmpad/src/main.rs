//! asmpad headless launcher.
//!
//! Stands in for the GUI host: loads a document, drives the external
//! toolchain pipeline, and prints the program's output. CLI flags live
//! here, never in the core crates.

mod commands;

use std::sync::Once;

use commands::RunOptions;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "run" => {
            let (path, options) = parse_run_args(&args[2..]);
            commands::run_file(&path, &options);
        }
        "clean" => {
            let (path, options) = parse_run_args(&args[2..]);
            commands::clean_file(&path, &options);
        }
        "lines" => {
            if args.len() < 3 {
                eprintln!("Usage: asmpad lines <file.asm>");
                std::process::exit(1);
            }
            commands::print_gutter(&args[2]);
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("unknown command '{other}'");
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Parse `[options] <file.asm>` for the `run` and `clean` commands.
fn parse_run_args(args: &[String]) -> (String, RunOptions) {
    let mut options = RunOptions::default();
    let mut file: Option<&str> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--format=") {
            options.object_format = v.to_string();
        } else if let Some(v) = arg.strip_prefix("--entry=") {
            options.entry_symbol = v.to_string();
        } else if let Some(v) = arg.strip_prefix("--assembler=") {
            options.assembler = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--linker=") {
            options.linker = Some(v.to_string());
        } else if arg == "--no-static" {
            options.static_link = false;
        } else if arg == "--verbose" || arg == "-v" {
            options.verbose = true;
        } else if !arg.starts_with('-') && file.is_none() {
            file = Some(arg);
        } else {
            eprintln!("unknown option '{arg}'");
            std::process::exit(1);
        }
    }

    let Some(path) = file else {
        eprintln!("error: missing file path");
        eprintln!("Usage: asmpad run <file.asm> [options]");
        std::process::exit(1);
    };
    (path.to_string(), options)
}

fn print_usage() {
    eprintln!("asmpad - assembly editor core, headless");
    eprintln!();
    eprintln!("Usage: asmpad <command> [arguments]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file.asm>     Assemble, link, and execute the file");
    eprintln!("  clean <file.asm>   Remove the file's build artifacts");
    eprintln!("  lines <file.asm>   Print the line-number gutter content");
    eprintln!();
    eprintln!("Run options:");
    eprintln!("  --format=<fmt>       Object format (elf64, macho64, win64, ...)");
    eprintln!("  --entry=<symbol>     Entry-point symbol for the linker");
    eprintln!("  --assembler=<path>   Assembler executable (default: nasm)");
    eprintln!("  --linker=<path>      Linker executable (default: ld)");
    eprintln!("  --no-static          Do not pass -static to the linker");
    eprintln!("  -v, --verbose        Also print assembler/linker output");
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output. Safe to call multiple times.
///
/// Enabled only when `RUST_LOG` is set, e.g. `RUST_LOG=asmpad=debug`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
