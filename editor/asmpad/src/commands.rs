//! Command handlers for the asmpad launcher.

use std::path::Path;

use asmpad_document::Document;
use asmpad_toolchain::{Runner, Stage, ToolchainConfig};

/// Options for the `run` and `clean` commands.
pub struct RunOptions {
    pub object_format: String,
    pub entry_symbol: String,
    pub assembler: Option<String>,
    pub linker: Option<String>,
    pub static_link: bool,
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        let (object_format, entry_symbol) = platform_defaults();
        Self {
            object_format: object_format.to_string(),
            entry_symbol: entry_symbol.to_string(),
            assembler: None,
            linker: None,
            static_link: true,
            verbose: false,
        }
    }
}

/// Default object format and entry point for the host platform; both are
/// overridable with `--format=` and `--entry=`.
fn platform_defaults() -> (&'static str, &'static str) {
    if cfg!(target_os = "macos") {
        ("macho64", "_main")
    } else if cfg!(target_os = "windows") {
        ("win64", "_main")
    } else {
        ("elf64", "_start")
    }
}

fn build_config(options: &RunOptions) -> ToolchainConfig {
    let mut config = ToolchainConfig::new(&options.object_format, &options.entry_symbol)
        .with_static_link(options.static_link);
    if let Some(assembler) = &options.assembler {
        config = config.with_assembler(assembler);
    }
    if let Some(linker) = &options.linker {
        config = config.with_linker(linker);
    }
    config
}

/// Load `path` as a document and run assemble → link → execute on it,
/// printing the program's stdout. With `verbose`, assembler and linker
/// chatter goes to stderr even on success.
pub fn run_file(path: &str, options: &RunOptions) {
    let mut document = Document::new();
    if let Err(e) = document.open(path) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let runner = Runner::new(build_config(options));
    match runner.run(document.path()) {
        Ok(output) => {
            tracing::debug!(stages = output.reports.len(), "pipeline finished");
            if options.verbose {
                for report in &output.reports {
                    if report.stage == Stage::Execute {
                        continue;
                    }
                    if !report.stdout.is_empty() {
                        eprint!("{}: {}", report.stage, report.stdout);
                    }
                    if !report.stderr.is_empty() {
                        eprint!("{}: {}", report.stage, report.stderr);
                    }
                }
            }
            print!("{}", output.stdout);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Best-effort removal of the artifacts derived from `path`.
pub fn clean_file(path: &str, options: &RunOptions) {
    Runner::new(build_config(options)).clean(Path::new(path));
}

/// Print the line-number gutter content for `path` (one number per line).
pub fn print_gutter(path: &str) {
    let mut document = Document::new();
    if let Err(e) = document.open(path) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    for n in 1..=document.line_count() {
        println!("{n}");
    }
}
