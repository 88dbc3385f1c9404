//! Document state for the asmpad editor core.
//!
//! Owns the in-memory text, the associated file path, and the dirty flag;
//! derives the line count for a line-number gutter and 1-based line/column
//! positions for a status readout. The buffer is stored verbatim (no
//! line-ending normalization), so opening a file and saving it unmodified
//! reproduces byte-identical content.
//!
//! This crate is pure state plus filesystem I/O: it has no dependency on any
//! UI event loop. The host (GUI or headless CLI) calls these methods from
//! whatever event system it provides.

mod clipboard;
mod document;
mod error;
pub mod lines;

pub use clipboard::{Clipboard, SlotClipboard};
pub use document::{Document, ExitDecision};
pub use error::DocumentError;
pub use lines::Position;
