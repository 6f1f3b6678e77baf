//! In-process comment store.
//!
//! A [`MemoryRoom`] holds the shared feed; each participant talks to it
//! through a [`MemoryStore`] handle carrying their login.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::{CommentStore, CursorStrategy, Message, PageCursor, PageEntry};
use crate::{ChatError, Result};

#[derive(Debug, Clone)]
enum StoredEntry {
    Message(Message),
    Malformed { id: Option<u64>, reason: String },
}

impl StoredEntry {
    fn id(&self) -> Option<u64> {
        match self {
            StoredEntry::Message(msg) => Some(msg.id),
            StoredEntry::Malformed { id, .. } => *id,
        }
    }

    fn to_page_entry(&self) -> PageEntry {
        match self {
            StoredEntry::Message(msg) => PageEntry::Message(msg.clone()),
            StoredEntry::Malformed { id, reason } => PageEntry::Malformed {
                id: *id,
                reason: reason.clone(),
            },
        }
    }
}

#[derive(Debug)]
struct RoomState {
    entries: Vec<StoredEntry>,
    next_id: u64,
    failing: bool,
    fetch_count: usize,
}

/// Shared in-memory room feed.
#[derive(Debug)]
pub struct MemoryRoom {
    state: Mutex<RoomState>,
    strategy: CursorStrategy,
}

impl MemoryRoom {
    /// Create an empty room paged by id.
    pub fn new() -> Arc<Self> {
        Self::with_strategy(CursorStrategy::AfterId)
    }

    /// Create an empty room that declares the given cursor strategy.
    pub fn with_strategy(strategy: CursorStrategy) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RoomState {
                entries: Vec::new(),
                next_id: 1,
                failing: false,
                fetch_count: 0,
            }),
            strategy,
        })
    }

    /// Get a store handle that publishes as `author`.
    pub fn store_for(self: &Arc<Self>, author: impl Into<String>) -> MemoryStore {
        MemoryStore {
            room: Arc::clone(self),
            author: author.into(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a comment directly, bypassing the failure switch.
    pub fn push(&self, author: &str, body: &str) -> u64 {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state
            .entries
            .push(StoredEntry::Message(Message::new(id, author, body)));
        id
    }

    /// Append an undecodable entry that still carries an id.
    pub fn push_malformed(&self, reason: &str) -> u64 {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.entries.push(StoredEntry::Malformed {
            id: Some(id),
            reason: reason.to_string(),
        });
        id
    }

    /// Append an undecodable entry without any id.
    pub fn push_malformed_without_id(&self, reason: &str) {
        self.lock().entries.push(StoredEntry::Malformed {
            id: None,
            reason: reason.to_string(),
        });
    }

    /// Make every publish and fetch fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Bodies of all well-formed comments, in posting order.
    pub fn bodies(&self) -> Vec<String> {
        self.lock()
            .entries
            .iter()
            .filter_map(|entry| match entry {
                StoredEntry::Message(msg) => Some(msg.body.clone()),
                StoredEntry::Malformed { .. } => None,
            })
            .collect()
    }

    /// Number of fetch calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.lock().fetch_count
    }

    fn page(&self, cursor: PageCursor, page_size: u32) -> Result<Vec<PageEntry>> {
        let mut state = self.lock();
        if state.failing {
            return Err(ChatError::Remote("store unavailable".to_string()));
        }
        state.fetch_count += 1;

        let page_size = page_size as usize;
        let page = match cursor {
            PageCursor::AfterId(after) => state
                .entries
                .iter()
                .filter(|entry| match (entry.id(), after) {
                    (Some(id), Some(last)) => id > last,
                    (Some(_), None) => true,
                    (None, _) => false,
                })
                .take(page_size)
                .map(StoredEntry::to_page_entry)
                .collect(),
            PageCursor::Page(number) => {
                let skip = (number.max(1) as usize - 1) * page_size;
                state
                    .entries
                    .iter()
                    .skip(skip)
                    .take(page_size)
                    .map(StoredEntry::to_page_entry)
                    .collect()
            }
        };
        Ok(page)
    }
}

/// One participant's handle on a [`MemoryRoom`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    room: Arc<MemoryRoom>,
    author: String,
}

impl MemoryStore {
    /// The room this handle writes to.
    pub fn room(&self) -> &Arc<MemoryRoom> {
        &self.room
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn publish(&self, body: &str) -> Result<u64> {
        if self.room.lock().failing {
            return Err(ChatError::Remote("store unavailable".to_string()));
        }
        Ok(self.room.push(&self.author, body))
    }

    async fn fetch_page(&self, cursor: PageCursor, page_size: u32) -> Result<Vec<PageEntry>> {
        // Give a concurrent poller the chance to interleave, like a real round trip.
        tokio::task::yield_now().await;
        self.room.page(cursor, page_size)
    }

    fn cursor_strategy(&self) -> CursorStrategy {
        self.room.strategy
    }

    fn supports(&self, _strategy: CursorStrategy) -> bool {
        true
    }
}
