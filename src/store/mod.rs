//! Comment store boundary for gistchat.
//!
//! A room is an append-only feed of comments. This module defines the
//! message shape and the narrow publish/fetch contract the sync engine
//! depends on, plus two implementations:
//! - [`GistClient`]: comments on a secret GitHub gist
//! - [`MemoryStore`]: an in-process room for tests and offline use

mod github;
mod memory;

use async_trait::async_trait;

use crate::Result;

pub use github::{GistClient, GistComments};
pub use memory::{MemoryRoom, MemoryStore};

/// One posted comment.
///
/// `id` is assigned by the backing store, unique and increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Store-assigned identifier.
    pub id: u64,
    /// Raw comment body.
    pub body: String,
    /// Login of the author.
    pub author: String,
}

impl Message {
    /// Create a new message.
    pub fn new(id: u64, author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
            author: author.into(),
        }
    }
}

/// One entry of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEntry {
    /// A well-formed message.
    Message(Message),
    /// An entry that could not be decoded.
    Malformed {
        /// Identifier, when the entry carried one.
        id: Option<u64>,
        /// Why decoding failed.
        reason: String,
    },
}

/// Which kind of cursor a store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStrategy {
    /// Everything with an id greater than the last seen id.
    AfterId,
    /// Page number derived from the number of seen messages.
    ///
    /// Only correct when the store's ordering is stable and earlier pages
    /// hold exactly the already-seen messages.
    PageCount,
}

/// Position to fetch from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    /// Messages with id strictly greater than the given id (`None` = from the start).
    AfterId(Option<u64>),
    /// One-based page number.
    Page(u32),
}

/// Remote comment feed of a single room.
///
/// Implementations are a pure boundary: no retries, no caching.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Publish one comment, returning its id.
    async fn publish(&self, body: &str) -> Result<u64>;

    /// Fetch one page of comments in store order.
    async fn fetch_page(&self, cursor: PageCursor, page_size: u32) -> Result<Vec<PageEntry>>;

    /// Cursor strategy this store supports natively.
    fn cursor_strategy(&self) -> CursorStrategy {
        CursorStrategy::AfterId
    }

    /// Whether the store can serve cursors of the given kind.
    fn supports(&self, strategy: CursorStrategy) -> bool {
        strategy == self.cursor_strategy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_new() {
        let msg = Message::new(3, "alice", "hello");
        assert_eq!(msg.id, 3);
        assert_eq!(msg.author, "alice");
        assert_eq!(msg.body, "hello");
    }
}
