//! Chat command parser for gistchat.
//!
//! This module provides parsing of local input lines into chat text or one
//! of the slash commands: /help, /quit, /invite, /banner, /banner-font, /me.

/// Result of parsing a chat input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    /// Nothing but whitespace.
    Empty,
    /// Regular chat message, published verbatim.
    Message(String),
    /// Parsed command.
    Command(ChatCommand),
}

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Show help lines locally.
    Help,
    /// Leave the room with an optional reason.
    Quit(Option<String>),
    /// Invite a user to the room.
    Invite(String),
    /// Render text as an ASCII banner with the default font.
    Banner(String),
    /// Render text as an ASCII banner with a named font.
    BannerFont { font: String, text: String },
    /// Send an action line (e.g., "/me waves" -> "~ user waves").
    Me(String),
    /// A known command missing its required argument.
    Incomplete(&'static str),
    /// Unknown command.
    Unknown(String),
}

impl ChatCommand {
    /// Get the command name.
    pub fn name(&self) -> &str {
        match self {
            ChatCommand::Help => "help",
            ChatCommand::Quit(_) => "quit",
            ChatCommand::Invite(_) => "invite",
            ChatCommand::Banner(_) => "banner",
            ChatCommand::BannerFont { .. } => "banner-font",
            ChatCommand::Me(_) => "me",
            ChatCommand::Incomplete(name) => *name,
            ChatCommand::Unknown(cmd) => cmd.as_str(),
        }
    }
}

impl std::fmt::Display for ChatCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatCommand::Help => write!(f, "/help"),
            ChatCommand::Quit(None) => write!(f, "/quit"),
            ChatCommand::Quit(Some(reason)) => write!(f, "/quit {reason}"),
            ChatCommand::Invite(user) => write!(f, "/invite {user}"),
            ChatCommand::Banner(text) => write!(f, "/banner {text}"),
            ChatCommand::BannerFont { font, text } => write!(f, "/banner-font {font} {text}"),
            ChatCommand::Me(action) => write!(f, "/me {action}"),
            ChatCommand::Incomplete(name) => write!(f, "/{name}"),
            ChatCommand::Unknown(cmd) => write!(f, "/{cmd}"),
        }
    }
}

/// Parse a chat input line into a message or command.
///
/// Only a `/` in the very first column starts a command. Trailing line
/// terminators are dropped; everything else in a message is kept as typed.
pub fn parse_input(input: &str) -> ChatInput {
    let line = input.trim_end_matches(&['\r', '\n'][..]);

    if line.trim().is_empty() {
        return ChatInput::Empty;
    }

    let Some(without_slash) = line.strip_prefix('/') else {
        return ChatInput::Message(line.to_string());
    };

    let (cmd, args) = match without_slash.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (without_slash, ""),
    };

    let command = match cmd.to_lowercase().as_str() {
        "help" => ChatCommand::Help,
        "quit" => {
            if args.is_empty() {
                ChatCommand::Quit(None)
            } else {
                ChatCommand::Quit(Some(args.to_string()))
            }
        }
        "invite" => {
            let user = args
                .split_whitespace()
                .next()
                .map(|user| user.strip_prefix('@').unwrap_or(user))
                .unwrap_or("");
            if user.is_empty() {
                ChatCommand::Incomplete("invite")
            } else {
                ChatCommand::Invite(user.to_string())
            }
        }
        "banner" => {
            if args.is_empty() {
                ChatCommand::Incomplete("banner")
            } else {
                ChatCommand::Banner(args.to_string())
            }
        }
        "banner-font" => match args.split_once(char::is_whitespace) {
            Some((font, text)) if !text.trim().is_empty() => ChatCommand::BannerFont {
                font: font.to_string(),
                text: text.trim().to_string(),
            },
            _ => ChatCommand::Incomplete("banner-font"),
        },
        "me" => {
            if args.is_empty() {
                ChatCommand::Incomplete("me")
            } else {
                ChatCommand::Me(args.to_string())
            }
        }
        _ => ChatCommand::Unknown(cmd.to_string()),
    };

    ChatInput::Command(command)
}

/// Chat command information for help display.
pub struct CommandInfo {
    /// Command name.
    pub name: &'static str,
    /// Command syntax.
    pub syntax: &'static str,
    /// Command description.
    pub description: &'static str,
}

/// Get all available command information.
pub fn get_command_help() -> Vec<CommandInfo> {
    vec![
        CommandInfo {
            name: "help",
            syntax: "/help",
            description: "show this help",
        },
        CommandInfo {
            name: "quit",
            syntax: "/quit (<message>)",
            description: "leave chat with an optional part message",
        },
        CommandInfo {
            name: "invite",
            syntax: "/invite <username>",
            description: "invite a github user to the chat. they'll get a notification on github.",
        },
        CommandInfo {
            name: "banner",
            syntax: "/banner <msg>",
            description: "render an ascii banner",
        },
        CommandInfo {
            name: "banner-font",
            syntax: "/banner-font <font> <msg>",
            description: "render an ascii banner with the chosen font. try script or shadow.",
        },
        CommandInfo {
            name: "me",
            syntax: "/me <action>",
            description: "send an action line (e.g. /me waves -> ~ you waves)",
        },
    ]
}

/// Format the help message as transcript lines.
pub fn format_help() -> Vec<String> {
    let mut lines = vec!["system:".to_string()];
    for info in get_command_help() {
        lines.push(info.syntax.to_string());
        lines.push(format!("  {}", info.description));
    }
    lines
}

/// Format the usage hint for a command name.
pub fn format_usage(name: &str) -> String {
    let syntax = get_command_help()
        .into_iter()
        .find(|info| info.name == name)
        .map(|info| info.syntax)
        .unwrap_or("/help");
    format!("usage: {syntax}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regular_message() {
        let input = parse_input("Hello, world!");
        assert_eq!(input, ChatInput::Message("Hello, world!".to_string()));
    }

    #[test]
    fn test_parse_message_kept_verbatim() {
        assert_eq!(
            parse_input("  spaced  out  "),
            ChatInput::Message("  spaced  out  ".to_string())
        );
        assert_eq!(
            parse_input("line\r\n"),
            ChatInput::Message("line".to_string())
        );
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_input(""), ChatInput::Empty);
        assert_eq!(parse_input("   "), ChatInput::Empty);
        assert_eq!(parse_input("\n"), ChatInput::Empty);
    }

    #[test]
    fn test_leading_whitespace_is_not_a_command() {
        assert_eq!(
            parse_input(" /quit"),
            ChatInput::Message(" /quit".to_string())
        );
    }

    #[test]
    fn test_parse_help_command() {
        assert_eq!(parse_input("/help"), ChatInput::Command(ChatCommand::Help));
        assert_eq!(parse_input("/HELP"), ChatInput::Command(ChatCommand::Help));
    }

    #[test]
    fn test_parse_quit_command() {
        assert_eq!(
            parse_input("/quit"),
            ChatInput::Command(ChatCommand::Quit(None))
        );
        assert_eq!(
            parse_input("/quit   "),
            ChatInput::Command(ChatCommand::Quit(None))
        );
        assert_eq!(
            parse_input("/quit see ya"),
            ChatInput::Command(ChatCommand::Quit(Some("see ya".to_string())))
        );
    }

    #[test]
    fn test_parse_invite_command() {
        assert_eq!(
            parse_input("/invite bob"),
            ChatInput::Command(ChatCommand::Invite("bob".to_string()))
        );
        assert_eq!(
            parse_input("/invite @bob"),
            ChatInput::Command(ChatCommand::Invite("bob".to_string()))
        );
        assert_eq!(
            parse_input("/invite bob please"),
            ChatInput::Command(ChatCommand::Invite("bob".to_string()))
        );
        assert_eq!(
            parse_input("/invite"),
            ChatInput::Command(ChatCommand::Incomplete("invite"))
        );
        assert_eq!(
            parse_input("/invite @"),
            ChatInput::Command(ChatCommand::Incomplete("invite"))
        );
    }

    #[test]
    fn test_parse_banner_command() {
        assert_eq!(
            parse_input("/banner hi there"),
            ChatInput::Command(ChatCommand::Banner("hi there".to_string()))
        );
        assert_eq!(
            parse_input("/banner"),
            ChatInput::Command(ChatCommand::Incomplete("banner"))
        );
    }

    #[test]
    fn test_parse_banner_font_command() {
        assert_eq!(
            parse_input("/banner-font shadow hi there"),
            ChatInput::Command(ChatCommand::BannerFont {
                font: "shadow".to_string(),
                text: "hi there".to_string(),
            })
        );
        assert_eq!(
            parse_input("/banner-font shadow"),
            ChatInput::Command(ChatCommand::Incomplete("banner-font"))
        );
        assert_eq!(
            parse_input("/banner-font"),
            ChatInput::Command(ChatCommand::Incomplete("banner-font"))
        );
    }

    #[test]
    fn test_parse_me_command() {
        assert_eq!(
            parse_input("/me waves at everyone"),
            ChatInput::Command(ChatCommand::Me("waves at everyone".to_string()))
        );
        assert_eq!(
            parse_input("/me"),
            ChatInput::Command(ChatCommand::Incomplete("me"))
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_input("/foo bar"),
            ChatInput::Command(ChatCommand::Unknown("foo".to_string()))
        );
        assert_eq!(
            parse_input("/"),
            ChatInput::Command(ChatCommand::Unknown(String::new()))
        );
    }

    #[test]
    fn test_chat_command_name() {
        assert_eq!(ChatCommand::Help.name(), "help");
        assert_eq!(ChatCommand::Quit(None).name(), "quit");
        assert_eq!(ChatCommand::Invite("x".to_string()).name(), "invite");
        assert_eq!(
            ChatCommand::BannerFont {
                font: "f".to_string(),
                text: "t".to_string()
            }
            .name(),
            "banner-font"
        );
        assert_eq!(ChatCommand::Incomplete("me").name(), "me");
        assert_eq!(ChatCommand::Unknown("foo".to_string()).name(), "foo");
    }

    #[test]
    fn test_chat_command_display() {
        assert_eq!(
            ChatCommand::Quit(Some("bye".to_string())).to_string(),
            "/quit bye"
        );
        assert_eq!(ChatCommand::Me("waves".to_string()).to_string(), "/me waves");
        assert_eq!(
            ChatCommand::BannerFont {
                font: "script".to_string(),
                text: "yo".to_string()
            }
            .to_string(),
            "/banner-font script yo"
        );
    }

    #[test]
    fn test_format_help() {
        let help = format_help();
        assert_eq!(help[0], "system:");
        for info in get_command_help() {
            assert!(help.iter().any(|line| line == info.syntax));
        }
    }

    #[test]
    fn test_format_usage() {
        assert_eq!(format_usage("invite"), "usage: /invite <username>");
        assert_eq!(format_usage("nope"), "usage: /help");
    }
}
