//! External toolchain pipeline for asmpad.
//!
//! Given a saved assembly source file, runs an external assembler, an
//! external linker, and finally the produced executable, capturing stdout,
//! stderr, and exit status at each stage. The pipeline is strictly
//! sequential — a later stage never starts after an earlier failure — and
//! every run begins with a best-effort cleanup of stale artifacts left by a
//! previous one.
//!
//! # Architecture
//!
//! ```text
//! Idle → Cleanup → Assembling → Linking → Executing → Done(stdout)
//!            │          │           │          │
//!            └ never    └──────────┴──────────┴──→ Failed(stage, diagnostic)
//!              fails
//! ```
//!
//! Which assembler, linker, object format, and entry point to use is
//! configuration supplied by the caller ([`ToolchainConfig`]); the runner
//! bakes in no OS, architecture, or tool path. Its only interface to the
//! outside world is "invoke executable X with argument list A in working
//! directory D; receive exit code, stdout bytes, stderr bytes".

mod cancel;
mod config;
mod error;
mod runner;

pub use cancel::CancelToken;
pub use config::ToolchainConfig;
pub use error::ToolchainError;
pub use runner::{RunOutput, Runner, Stage, StageReport};
