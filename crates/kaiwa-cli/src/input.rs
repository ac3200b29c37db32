//! Slash commands for the interactive session.

/// A command typed at the prompt instead of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reset,
    /// `/model` lists the configured models; `/model <name>` selects one.
    Model(Option<String>),
    StreamOn,
    StreamOff,
    StreamShow,
    Usage,
    History,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Returns None for ordinary chat input.
    pub fn parse(line: &str) -> Option<Command> {
        let rest = line.trim().strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or("");
        let arg = parts.next();

        Some(match name {
            "reset" => Command::Reset,
            "model" => Command::Model(arg.map(str::to_string)),
            "stream" => match arg {
                None => Command::StreamShow,
                Some("on") => Command::StreamOn,
                Some("off") => Command::StreamOff,
                Some(other) => Command::Unknown(format!("stream {}", other)),
            },
            "usage" => Command::Usage,
            "history" => Command::History,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        })
    }
}
