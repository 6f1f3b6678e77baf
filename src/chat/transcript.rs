//! Render surface the sync engine writes to.

use std::sync::{Mutex, PoisonError};

/// Append-only chat transcript plus a presence list.
///
/// Both poll drivers call into it, so implementations serialize writes.
pub trait Transcript: Send + Sync {
    /// Append one line (which may itself contain newlines).
    fn append_line(&self, line: &str);

    /// Replace the list of present users.
    fn set_presence_list(&self, names: &[String]);

    /// Append a line for a failure the session survives.
    fn append_error(&self, error: &crate::ChatError) {
        self.append_line(&error.transcript_line());
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    lines: Vec<String>,
    presence: Vec<String>,
}

/// Transcript kept in memory.
#[derive(Debug, Default)]
pub struct MemoryTranscript {
    state: Mutex<MemoryState>,
}

impl MemoryTranscript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All lines appended so far.
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    /// Remove and return the lines appended so far.
    pub fn take_lines(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().lines)
    }

    /// Presence list as last set.
    pub fn presence(&self) -> Vec<String> {
        self.lock().presence.clone()
    }
}

impl Transcript for MemoryTranscript {
    fn append_line(&self, line: &str) {
        self.lock().lines.push(line.to_string());
    }

    fn set_presence_list(&self, names: &[String]) {
        self.lock().presence = names.to_vec();
    }
}
