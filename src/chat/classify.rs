//! In-band event decoding for gistchat.
//!
//! Every structural event travels inside an ordinary comment body:
//! - `LOLJOIN` / `LOLPART`: a participant joined or left
//! - a body starting with `~`: a system/action line shown without an author
//! - anything else: a chat line shown as `<author>: <body>`

use crate::store::Message;

/// Body announcing that the author joined.
pub const JOIN_SENTINEL: &str = "LOLJOIN";

/// Body announcing that the author left.
pub const PART_SENTINEL: &str = "LOLPART";

/// Prefix marking a system/action line.
pub const SYSTEM_PREFIX: char = '~';

/// Kind of a decoded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Participant joined.
    Join,
    /// Participant left.
    Part,
    /// System/action line.
    System,
    /// Regular chat line.
    Chat,
}

impl EventKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Join => "join",
            EventKind::Part => "part",
            EventKind::System => "system",
            EventKind::Chat => "chat",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message decoded into its chat meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// `user` joined the room.
    Join { user: String },
    /// `user` left the room.
    Part { user: String },
    /// Line shown verbatim.
    System { line: String },
    /// Line shown with its author.
    Chat { author: String, body: String },
}

impl ChatEvent {
    /// Get the event kind.
    pub fn kind(&self) -> EventKind {
        match self {
            ChatEvent::Join { .. } => EventKind::Join,
            ChatEvent::Part { .. } => EventKind::Part,
            ChatEvent::System { .. } => EventKind::System,
            ChatEvent::Chat { .. } => EventKind::Chat,
        }
    }

    /// Format the event for the transcript.
    pub fn display(&self) -> String {
        match self {
            ChatEvent::Join { user } => format!("whoa {user} has joined!"),
            ChatEvent::Part { user } => format!("aw, {user} left ;_;"),
            ChatEvent::System { line } => line.clone(),
            ChatEvent::Chat { author, body } => format!("{author}: {body}"),
        }
    }
}

/// Decode a message.
///
/// Sentinels are matched first, then the system prefix, then everything
/// else is a chat line.
pub fn classify(message: &Message) -> ChatEvent {
    match message.body.as_str() {
        JOIN_SENTINEL => ChatEvent::Join {
            user: message.author.clone(),
        },
        PART_SENTINEL => ChatEvent::Part {
            user: message.author.clone(),
        },
        body if body.starts_with(SYSTEM_PREFIX) => ChatEvent::System {
            line: body.to_string(),
        },
        body => ChatEvent::Chat {
            author: message.author.clone(),
            body: body.to_string(),
        },
    }
}
