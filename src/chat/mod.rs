//! Chat module for gistchat.
//!
//! This module turns a room's comment feed into a chat session:
//! - Event decoding (join, part, system line, chat line)
//! - Delivered-message ledger and presence tracking
//! - Slash commands (/help, /quit, /invite, /banner, /banner-font, /me)
//! - The sync engine polling the feed on a timer and after every send

mod classify;
mod command;
mod engine;
mod presence;
mod seen;
mod transcript;

pub use classify::{classify, ChatEvent, EventKind, JOIN_SENTINEL, PART_SENTINEL, SYSTEM_PREFIX};
pub use command::{
    format_help, format_usage, get_command_help, parse_input, ChatCommand, ChatInput, CommandInfo,
};
pub use engine::{InputOutcome, SessionAction, SessionOptions, SessionState, SyncEngine};
pub use presence::PresenceTracker;
pub use seen::SeenTracker;
pub use transcript::{MemoryTranscript, Transcript};
