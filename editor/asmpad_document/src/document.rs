//! The document: buffer, path, and modification state.

use std::path::{Path, PathBuf};

use crate::clipboard::Clipboard;
use crate::error::DocumentError;
use crate::lines::{self, Position};

/// Host's answer to the unsaved-changes prompt on exit.
///
/// Presenting the prompt is the host's job; [`Document::prepare_exit`] only
/// enforces the contract that unsaved work is never silently discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    /// Save to the current path, then exit.
    SaveThenExit,
    /// Exit without saving.
    DiscardAndExit,
    /// Abort the exit.
    Cancel,
}

/// An editable text document with an optional backing file.
///
/// The buffer is replaced wholesale on [`open`](Document::open) and written
/// verbatim on [`save`](Document::save). The dirty flag is cleared exactly on
/// successful load or save and set by every text mutation. Each document is
/// independently owned — there is no shared state between instances.
#[derive(Debug, Clone, Default)]
pub struct Document {
    path: Option<PathBuf>,
    text: String,
    dirty: bool,
}

impl Document {
    /// Empty untitled document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backing file path, if the document has ever been saved or opened.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Full buffer content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the buffer has changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reset to an empty untitled buffer.
    pub fn reset(&mut self) {
        self.path = None;
        self.text.clear();
        self.dirty = false;
    }

    /// Replace the buffer from a file.
    ///
    /// On failure the buffer, path, and dirty flag are all unchanged.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Read`] if the file is missing, unreadable, or not
    /// valid UTF-8.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), DocumentError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|source| DocumentError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "opened document");
        self.text = text;
        self.path = Some(path);
        self.dirty = false;
        Ok(())
    }

    /// Write the buffer verbatim to the current path.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NoPath`] if the document has never been saved — the
    /// host must route through [`save_as`](Document::save_as), since only it
    /// can supply a path. [`DocumentError::Write`] on an I/O failure; the
    /// dirty flag stays set so the work is not considered persisted.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let path = self.path.clone().ok_or(DocumentError::NoPath)?;
        std::fs::write(&path, &self.text).map_err(|source| DocumentError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = self.text.len(), "saved document");
        self.dirty = false;
        Ok(())
    }

    /// Adopt `path` as the backing file, then save.
    ///
    /// The path sticks even if the write fails, matching the save-as flow:
    /// a retry goes to the newly chosen file.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), DocumentError> {
        self.path = Some(path.into());
        self.save()
    }

    /// Replace the whole buffer (the host text widget's change event).
    pub fn replace_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty = true;
    }

    /// Mark the buffer modified. Idempotent: marking twice keeps the flag
    /// set, it never toggles.
    pub fn mark_modified(&mut self) {
        self.dirty = true;
    }

    /// Number of logical lines (minimum 1, even for the empty buffer).
    pub fn line_count(&self) -> usize {
        lines::line_count(&self.text)
    }

    /// 1-based line/column of a byte offset, for the status readout.
    pub fn position_at(&self, offset: usize) -> Position {
        lines::position_at(&self.text, offset)
    }

    /// Content of 1-based line `line_no`, without its terminator.
    pub fn line(&self, line_no: usize) -> Option<&str> {
        lines::line_span(&self.text, line_no).map(|span| &self.text[span])
    }

    /// Remove the whole line at `line_no`, placing its content (without the
    /// terminator) in the clipboard. Returns the removed text.
    ///
    /// Cutting the final line when it lacks a trailing terminator removes
    /// through end-of-buffer; the separator joining it to the previous line
    /// goes with it, so a matching [`insert_line`](Document::insert_line)
    /// restores the buffer exactly.
    ///
    /// # Errors
    ///
    /// [`DocumentError::LineOutOfRange`] if the line does not exist. The
    /// buffer and clipboard are unchanged in that case.
    pub fn cut_line(
        &mut self,
        line_no: usize,
        clipboard: &mut dyn Clipboard,
    ) -> Result<String, DocumentError> {
        let span = lines::line_span(&self.text, line_no).ok_or_else(|| {
            DocumentError::LineOutOfRange {
                line: line_no,
                line_count: lines::line_count(&self.text),
            }
        })?;
        let removed = self.text[span.clone()].to_string();
        // Take a separator with the content: the trailing one for a
        // terminated line, the leading one for a final unterminated line.
        let range = if span.end < self.text.len() {
            span.start..span.end + 1
        } else if span.start > 0 {
            span.start - 1..span.end
        } else {
            span
        };
        self.text.replace_range(range, "");
        clipboard.set(&removed);
        self.dirty = true;
        Ok(removed)
    }

    /// Insert `line` as a new line immediately before `line_no`, shifting
    /// subsequent lines down. `line_no == line_count() + 1` appends after
    /// the last line.
    ///
    /// # Errors
    ///
    /// [`DocumentError::LineOutOfRange`] if `line_no` is 0 or past the
    /// append position.
    pub fn insert_line(&mut self, line_no: usize, line: &str) -> Result<(), DocumentError> {
        let count = self.line_count();
        if line_no == 0 || line_no > count + 1 {
            return Err(DocumentError::LineOutOfRange {
                line: line_no,
                line_count: count,
            });
        }
        if let Some(span) = lines::line_span(&self.text, line_no) {
            let mut inserted = String::with_capacity(line.len() + 1);
            inserted.push_str(line);
            inserted.push('\n');
            self.text.insert_str(span.start, &inserted);
        } else {
            // Append position: the terminator becomes the separator that
            // joins the new final line to the buffer.
            self.text.push('\n');
            self.text.push_str(line);
        }
        self.dirty = true;
        Ok(())
    }

    /// Insert the clipboard slot's content as a line before `line_no`.
    ///
    /// Returns `false` (and leaves the buffer untouched) when the clipboard
    /// is empty.
    ///
    /// # Errors
    ///
    /// Same range check as [`insert_line`](Document::insert_line).
    pub fn paste_line(
        &mut self,
        line_no: usize,
        clipboard: &dyn Clipboard,
    ) -> Result<bool, DocumentError> {
        match clipboard.get() {
            Some(line) => {
                self.insert_line(line_no, line)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Name for the host's status readout: the file's basename or
    /// `"New File"`, with a `(modified)` marker while dirty.
    pub fn display_name(&self) -> String {
        let base = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| String::from("New File"), |n| n.to_string_lossy().into_owned());
        if self.dirty {
            format!("{base} (modified)")
        } else {
            base
        }
    }

    /// Whether the host must prompt before exiting.
    pub fn needs_save_prompt(&self) -> bool {
        self.dirty
    }

    /// Apply the host's exit decision. Returns `Ok(true)` when it is safe to
    /// exit, `Ok(false)` when the exit is cancelled. A clean document always
    /// exits regardless of the decision.
    ///
    /// # Errors
    ///
    /// The save leg propagates [`save`](Document::save) errors (including
    /// [`DocumentError::NoPath`] for an untitled document); the exit does
    /// not proceed in that case.
    pub fn prepare_exit(&mut self, decision: ExitDecision) -> Result<bool, DocumentError> {
        if !self.dirty {
            return Ok(true);
        }
        match decision {
            ExitDecision::SaveThenExit => {
                self.save()?;
                Ok(true)
            }
            ExitDecision::DiscardAndExit => Ok(true),
            ExitDecision::Cancel => Ok(false),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::clipboard::SlotClipboard;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_document_is_clean_and_untitled() {
        let doc = Document::new();
        assert_eq!(doc.path(), None);
        assert_eq!(doc.text(), "");
        assert!(!doc.is_dirty());
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.display_name(), "New File");
    }

    #[test]
    fn mark_modified_is_idempotent() {
        let mut doc = Document::new();
        doc.mark_modified();
        doc.mark_modified();
        assert!(doc.is_dirty());
    }

    #[test]
    fn replace_text_sets_dirty() {
        let mut doc = Document::new();
        doc.replace_text("mov eax, 1\n");
        assert!(doc.is_dirty());
        assert_eq!(doc.line_count(), 2);
    }

    #[test]
    fn display_name_tracks_modification() {
        let mut doc = Document::new();
        doc.mark_modified();
        assert_eq!(doc.display_name(), "New File (modified)");
    }

    // === Cut and insert ===

    #[test]
    fn cut_interior_line() {
        let mut doc = Document::new();
        let mut clipboard = SlotClipboard::new();
        doc.replace_text("one\ntwo\nthree\n");

        let removed = doc.cut_line(2, &mut clipboard).unwrap();
        assert_eq!(removed, "two");
        assert_eq!(doc.text(), "one\nthree\n");
        assert_eq!(clipboard.get(), Some("two"));
        assert!(doc.is_dirty());
    }

    #[test]
    fn cut_final_unterminated_line() {
        let mut doc = Document::new();
        let mut clipboard = SlotClipboard::new();
        doc.replace_text("one\ntwo");

        let removed = doc.cut_line(2, &mut clipboard).unwrap();
        assert_eq!(removed, "two");
        assert_eq!(doc.text(), "one");
    }

    #[test]
    fn cut_only_line_leaves_empty_buffer() {
        let mut doc = Document::new();
        let mut clipboard = SlotClipboard::new();
        doc.replace_text("solo");

        let removed = doc.cut_line(1, &mut clipboard).unwrap();
        assert_eq!(removed, "solo");
        assert_eq!(doc.text(), "");
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn cut_out_of_range_is_an_error() {
        let mut doc = Document::new();
        let mut clipboard = SlotClipboard::new();
        doc.replace_text("only\n");

        let err = doc.cut_line(5, &mut clipboard).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::LineOutOfRange { line: 5, line_count: 2 }
        ));
        assert_eq!(doc.text(), "only\n");
        assert_eq!(clipboard.get(), None);
    }

    #[test]
    fn cut_then_insert_restores_buffer() {
        for original in ["one\ntwo\nthree\n", "one\ntwo", "solo", "a\n\nb"] {
            for line_no in 1..=crate::lines::line_count(original) {
                let mut doc = Document::new();
                let mut clipboard = SlotClipboard::new();
                doc.replace_text(original);

                let removed = doc.cut_line(line_no, &mut clipboard).unwrap();
                doc.insert_line(line_no, &removed).unwrap();
                assert_eq!(doc.text(), original, "line {line_no} of {original:?}");
            }
        }
    }

    #[test]
    fn insert_shifts_lines_down() {
        let mut doc = Document::new();
        doc.replace_text("one\nthree\n");
        doc.insert_line(2, "two").unwrap();
        assert_eq!(doc.text(), "one\ntwo\nthree\n");
    }

    #[test]
    fn insert_at_append_position() {
        let mut doc = Document::new();
        doc.replace_text("one");
        doc.insert_line(2, "two").unwrap();
        assert_eq!(doc.text(), "one\ntwo");
    }

    #[test]
    fn insert_past_append_position_is_an_error() {
        let mut doc = Document::new();
        doc.replace_text("one");
        assert!(doc.insert_line(4, "x").is_err());
        assert!(doc.insert_line(0, "x").is_err());
    }

    #[test]
    fn paste_inserts_clipboard_content() {
        let mut doc = Document::new();
        let mut clipboard = SlotClipboard::new();
        doc.replace_text("keep\ncut me\n");
        doc.cut_line(2, &mut clipboard).unwrap();

        doc.paste_line(1, &clipboard).unwrap();
        assert_eq!(doc.text(), "cut me\nkeep\n");
    }

    #[test]
    fn paste_with_empty_clipboard_is_a_no_op() {
        let mut doc = Document::new();
        let clipboard = SlotClipboard::new();
        doc.replace_text("text");

        assert!(!doc.paste_line(1, &clipboard).unwrap());
        assert_eq!(doc.text(), "text");
    }

    // === File I/O ===

    #[test]
    fn open_replaces_buffer_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.asm");
        std::fs::write(&path, "section .text\n").unwrap();

        let mut doc = Document::new();
        doc.mark_modified();
        doc.open(&path).unwrap();
        assert_eq!(doc.text(), "section .text\n");
        assert_eq!(doc.path(), Some(path.as_path()));
        assert!(!doc.is_dirty());
        assert_eq!(doc.display_name(), "hello.asm");
    }

    #[test]
    fn open_failure_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::new();
        doc.replace_text("unsaved work");

        let err = doc.open(dir.path().join("missing.asm")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
        assert_eq!(doc.text(), "unsaved work");
        assert_eq!(doc.path(), None);
        assert!(doc.is_dirty());
    }

    #[test]
    fn save_round_trips_bytes_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.asm");
        // CRLF line endings and no trailing newline survive untouched.
        let content = "mov eax, 1\r\nret";
        std::fs::write(&path, content).unwrap();

        let mut doc = Document::new();
        doc.open(&path).unwrap();
        doc.save().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn save_without_path_is_an_error() {
        let mut doc = Document::new();
        doc.replace_text("text");
        assert!(matches!(doc.save().unwrap_err(), DocumentError::NoPath));
        assert!(doc.is_dirty());
    }

    #[test]
    fn save_as_adopts_path_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.asm");

        let mut doc = Document::new();
        doc.replace_text("global _start\n");
        doc.save_as(&path).unwrap();
        assert_eq!(doc.path(), Some(path.as_path()));
        assert!(!doc.is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "global _start\n");
    }

    // === Exit contract ===

    #[test]
    fn clean_document_always_exits() {
        let mut doc = Document::new();
        assert!(doc.prepare_exit(ExitDecision::Cancel).unwrap());
    }

    #[test]
    fn cancel_aborts_exit_with_unsaved_work() {
        let mut doc = Document::new();
        doc.replace_text("unsaved");
        assert!(!doc.prepare_exit(ExitDecision::Cancel).unwrap());
        assert!(doc.is_dirty());
    }

    #[test]
    fn discard_exits_without_saving() {
        let mut doc = Document::new();
        doc.replace_text("unsaved");
        assert!(doc.prepare_exit(ExitDecision::DiscardAndExit).unwrap());
    }

    #[test]
    fn save_then_exit_persists_the_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exit.asm");

        let mut doc = Document::new();
        doc.save_as(&path).unwrap();
        doc.replace_text("final words\n");
        assert!(doc.prepare_exit(ExitDecision::SaveThenExit).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "final words\n");
    }

    #[test]
    fn save_then_exit_on_untitled_document_fails() {
        let mut doc = Document::new();
        doc.replace_text("unsaved");
        assert!(matches!(
            doc.prepare_exit(ExitDecision::SaveThenExit).unwrap_err(),
            DocumentError::NoPath
        ));
        assert!(doc.is_dirty());
    }
}
