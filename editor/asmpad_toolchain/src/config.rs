//! Toolchain configuration: which tools to run and how to invoke them.
//!
//! The command-line grammar for the assembler and linker lives here, not in
//! the runner — the tools are external collaborators and their invocation is
//! configuration, not core logic.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Extension of the executable artifact.
#[cfg(windows)]
const EXECUTABLE_EXT: &str = "exe";
#[cfg(not(windows))]
const EXECUTABLE_EXT: &str = "out";

/// Configuration shared by the assemble, link, and execute stages.
///
/// Object format, entry-point symbol, and tool paths are caller-supplied so
/// one runner works across object formats (ELF, Mach-O, COFF) instead of
/// baking in a single developer machine's toolchain.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    assembler: PathBuf,
    linker: PathBuf,
    object_format: String,
    entry_symbol: String,
    static_link: bool,
    extra_assembler_args: Vec<String>,
    extra_linker_args: Vec<String>,
}

impl ToolchainConfig {
    /// Configuration for the given object format and entry-point symbol,
    /// with `nasm`/`ld` resolved from `PATH` and static linking on.
    #[must_use]
    pub fn new(object_format: impl Into<String>, entry_symbol: impl Into<String>) -> Self {
        Self {
            assembler: PathBuf::from("nasm"),
            linker: PathBuf::from("ld"),
            object_format: object_format.into(),
            entry_symbol: entry_symbol.into(),
            static_link: true,
            extra_assembler_args: Vec::new(),
            extra_linker_args: Vec::new(),
        }
    }

    /// Use a specific assembler executable.
    #[must_use]
    pub fn with_assembler(mut self, assembler: impl Into<PathBuf>) -> Self {
        self.assembler = assembler.into();
        self
    }

    /// Use a specific linker executable.
    #[must_use]
    pub fn with_linker(mut self, linker: impl Into<PathBuf>) -> Self {
        self.linker = linker.into();
        self
    }

    /// Toggle passing `-static` to the linker.
    #[must_use]
    pub fn with_static_link(mut self, static_link: bool) -> Self {
        self.static_link = static_link;
        self
    }

    /// Append an extra assembler argument.
    #[must_use]
    pub fn with_assembler_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_assembler_args.push(arg.into());
        self
    }

    /// Append an extra linker argument.
    #[must_use]
    pub fn with_linker_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_linker_args.push(arg.into());
        self
    }

    pub fn assembler(&self) -> &Path {
        &self.assembler
    }

    pub fn linker(&self) -> &Path {
        &self.linker
    }

    pub fn object_format(&self) -> &str {
        &self.object_format
    }

    pub fn entry_symbol(&self) -> &str {
        &self.entry_symbol
    }

    /// Derived object-file path: the source with an `.o` extension.
    #[must_use]
    pub fn object_path(&self, source: &Path) -> PathBuf {
        source.with_extension("o")
    }

    /// Derived executable path: the source with the platform's executable
    /// extension (`.out`, or `.exe` on Windows).
    #[must_use]
    pub fn executable_path(&self, source: &Path) -> PathBuf {
        source.with_extension(EXECUTABLE_EXT)
    }

    /// Working directory for every stage: the source file's parent, so
    /// relative includes and outputs resolve next to the source.
    #[must_use]
    pub fn work_dir<'a>(&self, source: &'a Path) -> Option<&'a Path> {
        source.parent().filter(|dir| !dir.as_os_str().is_empty())
    }

    /// `assembler -f <format> <source> -o <object> [extra...]`
    #[must_use]
    pub fn assemble_command(&self, source: &Path) -> Command {
        let mut cmd = Command::new(&self.assembler);
        cmd.arg("-f")
            .arg(&self.object_format)
            .arg(source)
            .arg("-o")
            .arg(self.object_path(source));
        cmd.args(&self.extra_assembler_args);
        if let Some(dir) = self.work_dir(source) {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// `linker -e <entry> [-static] <object> -o <executable> [extra...]`
    #[must_use]
    pub fn link_command(&self, source: &Path) -> Command {
        let mut cmd = Command::new(&self.linker);
        cmd.arg("-e").arg(&self.entry_symbol);
        if self.static_link {
            cmd.arg("-static");
        }
        cmd.arg(self.object_path(source))
            .arg("-o")
            .arg(self.executable_path(source));
        cmd.args(&self.extra_linker_args);
        if let Some(dir) = self.work_dir(source) {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// The produced executable, run with no arguments.
    #[must_use]
    pub fn execute_command(&self, source: &Path) -> Command {
        let mut cmd = Command::new(self.executable_path(source));
        if let Some(dir) = self.work_dir(source) {
            cmd.current_dir(dir);
        }
        cmd
    }
}
