//! gistchat - ad-hoc group chat over a gist's comment feed
//!
//! One participant creates a secret gist, everyone else comments on it, and
//! each client polls the comments to rebuild a shared timeline.

pub mod banner;
pub mod chat;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod store;

pub use banner::{BannerRenderer, FigletBanner};
pub use chat::{
    classify, parse_input, ChatCommand, ChatEvent, ChatInput, EventKind, InputOutcome,
    MemoryTranscript, PresenceTracker, SeenTracker, SessionAction, SessionOptions, SessionState,
    SyncEngine, Transcript,
};
pub use config::Config;
pub use error::{ChatError, Result};
pub use store::{
    CommentStore, CursorStrategy, GistClient, GistComments, MemoryRoom, MemoryStore, Message,
    PageCursor, PageEntry,
};
