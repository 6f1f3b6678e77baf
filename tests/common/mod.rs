//! Test helpers for session tests.
//!
//! Provides a participant harness over an in-memory room.

#![allow(dead_code)]

use std::sync::Arc;

use gistchat::{
    CursorStrategy, MemoryRoom, MemoryTranscript, SessionAction, SessionOptions, SyncEngine,
};

/// Room identifier used throughout the tests.
pub const ROOM_ID: &str = "test-room";

/// One participant: an engine plus the transcript it renders into.
pub struct Participant {
    pub engine: Arc<SyncEngine>,
    pub transcript: Arc<MemoryTranscript>,
}

impl Participant {
    /// Create a participant in `room` with default options.
    pub fn new(room: &Arc<MemoryRoom>, username: &str) -> Self {
        Self::with_options(room, username, SessionOptions::default())
    }

    /// Create a participant in `room` with the given options.
    pub fn with_options(room: &Arc<MemoryRoom>, username: &str, options: SessionOptions) -> Self {
        let transcript = Arc::new(MemoryTranscript::new());
        let engine = Arc::new(SyncEngine::new(
            ROOM_ID,
            username,
            Arc::new(room.store_for(username)),
            transcript.clone(),
            options,
        ));
        Self { engine, transcript }
    }

    /// Handle one input line and wait for its follow-up poll.
    pub async fn send(&self, line: &str) -> SessionAction {
        let outcome = self.engine.handle_input(line).await;
        if let Some(refresh) = outcome.refresh {
            refresh.await.expect("refresh task panicked");
        }
        outcome.action
    }

    /// Lines rendered so far.
    pub fn lines(&self) -> Vec<String> {
        self.transcript.lines()
    }
}

/// Room pre-filled with `count` chat lines from `author`.
pub fn filled_room(strategy: CursorStrategy, author: &str, count: usize) -> Arc<MemoryRoom> {
    let room = MemoryRoom::with_strategy(strategy);
    for i in 0..count {
        room.push(author, &format!("message {i}"));
    }
    room
}
